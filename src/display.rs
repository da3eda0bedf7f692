//! # Tabular display for comparison reports
//!
//! Borrowing renderers printing a [`ComparisonReport`] as a table with `{}`.
//!
//! ## Overview
//!
//! The entry point is the display adaptor [`ReportDisplay`], created with
//! [`ReportDisplayExt::show`] (compact fixed-width lines) or [`ReportDisplayExt::table`]
//! (boxed layout built with [`comfy-table`]).
//!
//! Columns: `# | Time (UT) | Site | Obs RA | Obs Dec | Calc RA | Calc Dec | ΔRA["] | ΔDec["]
//! | Total["] | 3σ["] | Ratio | Verdict`.
//!
//! - Observed coordinates are printed as supplied, predicted coordinates are rendered with
//!   `with_seconds_precision(p)` fractional digits (default 3).
//! - A `~` before the 3σ value marks an uncertainty guessed by the band heuristic.
//! - The ratio is printed as `6.9×`, or `N/A` without a usable uncertainty.
//! - Rows that could not be compared print their error text after the verdict.
//! - A summary line with the tier counts closes the table.
//!
//! ```rust,ignore
//! use occheck::display::ReportDisplayExt;
//!
//! println!("{}", report.show());
//! println!("{}", report.table().with_seconds_precision(2).failed_only());
//! ```
//!
//! [`comfy-table`]: https://crates.io/crates/comfy-table
use std::fmt;

use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Row, Table};

use crate::{
    batch::{ComparisonReport, ComparisonRow},
    conversion::{format_dec_with, format_ra_with, SexagesimalStyle},
    ephemeris::uncertainty::UncertaintySource,
    residuals::{Residual, Verdict},
};

enum TableMode {
    Default,
    Boxed,
}

/// Display adaptor for a [`ComparisonReport`].
pub struct ReportDisplay<'a> {
    report: &'a ComparisonReport,
    mode: TableMode,
    sec_prec: usize,
    failed_only: bool,
}

struct RowFields {
    i: usize,
    timestamp: String,
    site: String,
    obs_ra: String,
    obs_dec: String,
    calc_ra: String,
    calc_dec: String,
    delta_ra: String,
    delta_dec: String,
    total: String,
    sigma: String,
    ratio: String,
    verdict: Verdict,
    error: Option<String>,
}

/// `6.9×`, or `N/A` when the ratio is absent.
pub fn ratio_label(ratio: Option<f64>) -> String {
    match ratio {
        Some(r) => format!("{r:.1}×"),
        None => "N/A".to_string(),
    }
}

fn arcsec(value: Option<f64>) -> String {
    value.map(|v| format!("{v:+.3}")).unwrap_or_default()
}

impl<'a> ReportDisplay<'a> {
    pub fn new(report: &'a ComparisonReport) -> Self {
        Self {
            report,
            mode: TableMode::Default,
            sec_prec: 3,
            failed_only: false,
        }
    }

    /// Switch to the boxed `comfy-table` layout.
    pub fn boxed(mut self) -> Self {
        self.mode = TableMode::Boxed;
        self
    }

    /// Fractional digits of the predicted RA/Dec seconds.
    pub fn with_seconds_precision(mut self, p: usize) -> Self {
        self.sec_prec = p;
        self
    }

    /// Only print rows with a FAILED verdict; the summary still covers the whole report.
    pub fn failed_only(mut self) -> Self {
        self.failed_only = true;
        self
    }

    fn row_iter(&self) -> impl Iterator<Item = (usize, &'a ComparisonRow)> + '_ {
        self.report
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| !self.failed_only || row.verdict() == Verdict::Failed)
    }

    fn format_row_fields(&self, i: usize, row: &ComparisonRow) -> RowFields {
        let sp = self.sec_prec;
        let (calc_ra, calc_dec, sigma) = match &row.calculated {
            Some(calc) => {
                let marker = match calc.uncertainty_source {
                    UncertaintySource::Heuristic => "~",
                    _ => "",
                };
                (
                    format_ra_with(calc.position.ra_deg, sp, SexagesimalStyle::Spaces),
                    format_dec_with(
                        calc.position.dec_deg,
                        sp.saturating_sub(1),
                        SexagesimalStyle::Spaces,
                    ),
                    calc.uncertainty_arcsec
                        .map(|u| format!("{marker}{u:.3}"))
                        .unwrap_or_else(|| "N/A".to_string()),
                )
            }
            None => (String::new(), String::new(), String::new()),
        };

        let residual: Option<&Residual> = row.residual.as_ref();
        RowFields {
            i,
            timestamp: row.observed.timestamp.clone(),
            site: row.observed.observatory_code.clone(),
            obs_ra: row.observed.ra.clone(),
            obs_dec: row.observed.dec.clone(),
            calc_ra,
            calc_dec,
            delta_ra: arcsec(residual.map(|r| r.delta_ra_arcsec)),
            delta_dec: arcsec(residual.map(|r| r.delta_dec_arcsec)),
            total: residual
                .map(|r| format!("{:.3}", r.total_separation_arcsec))
                .unwrap_or_default(),
            sigma,
            ratio: ratio_label(residual.and_then(|r| r.sigma_ratio)),
            verdict: row.verdict(),
            error: row.error.clone(),
        }
    }

    fn write_header(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>3}  {:<24}  {:>4}  {:>13}  {:>13}  {:>13}  {:>13}  {:>9}  {:>9}  {:>9}  {:>8}  {:>8}  {:<8}",
            "#",
            "Time (UT)",
            "Site",
            "Obs RA",
            "Obs Dec",
            "Calc RA",
            "Calc Dec",
            "ΔRA[\"]",
            "ΔDec[\"]",
            "Total[\"]",
            "3σ[\"]",
            "Ratio",
            "Verdict"
        )
    }

    fn write_row(&self, f: &mut fmt::Formatter<'_>, r: &RowFields) -> fmt::Result {
        write!(
            f,
            "{:>3}  {:<24}  {:>4}  {:>13}  {:>13}  {:>13}  {:>13}  {:>9}  {:>9}  {:>9}  {:>8}  {:>8}  {:<8}",
            r.i,
            r.timestamp,
            r.site,
            r.obs_ra,
            r.obs_dec,
            r.calc_ra,
            r.calc_dec,
            r.delta_ra,
            r.delta_dec,
            r.total,
            r.sigma,
            r.ratio,
            r.verdict
        )?;
        match &r.error {
            Some(e) => writeln!(f, "  {e}"),
            None => writeln!(f),
        }
    }

    fn render_boxed(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Disabled);

        table.set_header(vec![
            Cell::new("#"),
            Cell::new("Time (UT)"),
            Cell::new("Site"),
            Cell::new("Obs RA"),
            Cell::new("Obs Dec"),
            Cell::new("Calc RA"),
            Cell::new("Calc Dec"),
            Cell::new("ΔRA [\"]"),
            Cell::new("ΔDec [\"]"),
            Cell::new("Total [\"]"),
            Cell::new("3σ [\"]"),
            Cell::new("Ratio"),
            Cell::new("Verdict"),
        ]);

        let right = |s: String| Cell::new(s).set_alignment(CellAlignment::Right);
        for (i, row) in self.row_iter() {
            let r = self.format_row_fields(i, row);
            let verdict = match &r.error {
                Some(e) => format!("{} ({e})", r.verdict),
                None => r.verdict.to_string(),
            };
            table.add_row(Row::from(vec![
                Cell::new(r.i).set_alignment(CellAlignment::Right),
                Cell::new(r.timestamp),
                Cell::new(r.site),
                right(r.obs_ra),
                right(r.obs_dec),
                right(r.calc_ra),
                right(r.calc_dec),
                right(r.delta_ra),
                right(r.delta_dec),
                right(r.total),
                right(r.sigma),
                right(r.ratio),
                Cell::new(verdict),
            ]));
        }

        table.to_string()
    }

    fn write_summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.report.counts;
        let tiers = Verdict::ALL
            .iter()
            .map(|v| format!("{v}: {}", c.get(*v)))
            .collect::<Vec<_>>()
            .join("  ");
        writeln!(f, "{tiers}  (total {})", c.total())
    }
}

/// Builders of [`ReportDisplay`] adaptors.
pub trait ReportDisplayExt {
    /// Compact fixed-width table.
    fn show(&self) -> ReportDisplay<'_>;

    /// Boxed `comfy-table` layout.
    fn table(&self) -> ReportDisplay<'_>;

    fn show_string(&self) -> String {
        format!("{}", self.show())
    }
}

impl ReportDisplayExt for ComparisonReport {
    fn show(&self) -> ReportDisplay<'_> {
        ReportDisplay::new(self)
    }

    fn table(&self) -> ReportDisplay<'_> {
        ReportDisplay::new(self).boxed()
    }
}

impl fmt::Display for ReportDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = self.report.title.as_deref().unwrap_or("O-C comparison");
        let n = self.report.rows.len();
        writeln!(f, "{title} (n={n})")?;
        writeln!(f, "{}", "-".repeat(title.chars().count() + format!(" (n={n})").len()))?;

        match self.mode {
            TableMode::Boxed => {
                f.write_str(&self.render_boxed())?;
                writeln!(f)?;
            }
            TableMode::Default => {
                self.write_header(f)?;
                for (i, row) in self.row_iter() {
                    let fields = self.format_row_fields(i, row);
                    self.write_row(f, &fields)?;
                }
            }
        }
        self.write_summary(f)
    }
}

#[cfg(test)]
mod display_test {
    use super::*;
    use crate::{batch::compare_pairs, ephemeris::parse_data_line, observations::ObservedRecord};

    fn report() -> ComparisonReport {
        let obs = |t: &str| ObservedRecord::new(t, "G96", "11 05 53.640", "+05 24 55.44");
        compare_pairs(vec![
            (
                obs("2025-12-19 01:21:40"),
                parse_data_line(
                    "2025-Dec-19 01:21:40.000 11 05 53.5 +05 24 55.0 -3.1 1.2 0.2 0.2 0.31 0.12 97.5",
                    "G96",
                ),
            ),
            (
                obs("2025-12-19 01:22:40"),
                parse_data_line("2025-Dec-19 01:22:40.000 11 05", "G96"),
            ),
            (
                obs("2025-12-19 01:23:40"),
                parse_data_line(
                    "2025-Dec-19 01:23:40.000 11 05 53.5 +05 24 55.0 -15.2 0.42",
                    "G96",
                ),
            ),
        ])
        .with_title("C/2025 N1")
    }

    #[test]
    fn test_ratio_label() {
        assert_eq!(ratio_label(Some(6.8916)), "6.9×");
        assert_eq!(ratio_label(None), "N/A");
    }

    #[test]
    fn test_compact_display() {
        let out = report().show().to_string();
        assert!(out.starts_with("C/2025 N1 (n=3)\n"), "{out}");
        assert!(out.contains("11 05 53.500"), "{out}");
        assert!(out.contains("+05 24 55.00"), "{out}");
        assert!(out.contains("6.9×"), "{out}");
        assert!(out.contains("~0.420"), "{out}");
        assert!(out.contains("Insufficient fields"), "{out}");
        assert!(out.contains("WITHIN: 0  MARGINAL: 0  FAILED: 2  UNKNOWN: 1  (total 3)"), "{out}");
    }

    #[test]
    fn test_failed_only() {
        let rep = report();
        let out = rep.show().failed_only().to_string();
        assert!(!out.contains("Insufficient fields"), "{out}");
        assert_eq!(out.matches("FAILED").count(), 3, "{out}");
    }

    #[test]
    fn test_oversized_seconds_precision() {
        let out = report().show().with_seconds_precision(20).to_string();
        assert!(out.contains("11 05 53.500000000"), "{out}");
        assert!(out.contains("+05 24 55.000000000"), "{out}");
    }

    #[test]
    fn test_boxed_display() {
        let out = report().table().with_seconds_precision(2).to_string();
        assert!(out.contains("Verdict"), "{out}");
        assert!(out.contains("11 05 53.50"), "{out}");
        assert!(out.contains("UNKNOWN (Insufficient fields"), "{out}");
        assert!(out.contains("(total 3)"), "{out}");
    }
}
