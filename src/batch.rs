//! # Batch comparison
//!
//! Folds a sequence of observed positions and their predicted counterparts into a
//! [`ComparisonReport`]: one [`ComparisonRow`] per input, in input order, plus the number of
//! rows in each [`Verdict`] tier.
//!
//! A row that cannot be compared (malformed observed coordinates, fetch failure, unparsable
//! ephemeris text) does not stop the batch: it is kept with verdict
//! [`Verdict::Unknown`] and the error text, and the next row is processed.
use hifitime::Unit;
use log::{info, warn};

use crate::{
    ephemeris::{EphemerisParser, EphemerisRecord},
    horizons::client::EphemerisSource,
    observations::ObservedRecord,
    occheck_errors::OcError,
    params::OcParams,
    residuals::{Residual, ResidualCalculator, Verdict},
    time::parse_ut_timestamp,
};

/// Largest tolerated gap between the observed and the predicted epoch before a warning.
const EPOCH_MISMATCH_SECONDS: i64 = 1;

/// Outcome of one comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub observed: ObservedRecord,
    pub calculated: Option<EphemerisRecord>,
    pub residual: Option<Residual>,
    pub error: Option<String>,
}

impl ComparisonRow {
    pub fn verdict(&self) -> Verdict {
        self.residual
            .map(|r| r.verdict)
            .unwrap_or(Verdict::Unknown)
    }
}

/// Number of rows per verdict tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TierCounts {
    pub within: usize,
    pub marginal: usize,
    pub failed: usize,
    pub unknown: usize,
}

impl TierCounts {
    pub fn add(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Within => self.within += 1,
            Verdict::Marginal => self.marginal += 1,
            Verdict::Failed => self.failed += 1,
            Verdict::Unknown => self.unknown += 1,
        }
    }

    pub fn get(&self, verdict: Verdict) -> usize {
        match verdict {
            Verdict::Within => self.within,
            Verdict::Marginal => self.marginal,
            Verdict::Failed => self.failed,
            Verdict::Unknown => self.unknown,
        }
    }

    pub fn total(&self) -> usize {
        self.within + self.marginal + self.failed + self.unknown
    }
}

/// Ordered comparison rows and their tier counts.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComparisonReport {
    pub title: Option<String>,
    pub rows: Vec<ComparisonRow>,
    pub counts: TierCounts,
}

impl ComparisonReport {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    fn push(&mut self, row: ComparisonRow) {
        self.counts.add(row.verdict());
        self.rows.push(row);
    }

    /// Rows whose verdict is [`Verdict::Failed`].
    pub fn failed_rows(&self) -> impl Iterator<Item = &ComparisonRow> {
        self.rows
            .iter()
            .filter(|row| row.verdict() == Verdict::Failed)
    }

    /// Rows carrying an error.
    pub fn error_rows(&self) -> impl Iterator<Item = &ComparisonRow> {
        self.rows.iter().filter(|row| row.error.is_some())
    }
}

/// Batch driver: the parser and the calculator configured from one [`OcParams`].
#[derive(Debug, Clone, Default)]
pub struct BatchComparator {
    pub parser: EphemerisParser,
    pub calculator: ResidualCalculator,
}

impl BatchComparator {
    pub fn from_params(params: &OcParams) -> Self {
        BatchComparator {
            parser: EphemerisParser::from_params(params),
            calculator: ResidualCalculator::from_params(params),
        }
    }

    fn warn_on_epoch_mismatch(observed: &ObservedRecord, calculated: &EphemerisRecord) {
        let (Ok(obs), Ok(calc)) = (
            parse_ut_timestamp(&observed.timestamp),
            calculated.epoch(),
        ) else {
            return;
        };
        if (obs - calc).abs() > Unit::Second * EPOCH_MISMATCH_SECONDS {
            warn!(
                "epoch mismatch: observed {} vs predicted {}",
                observed.timestamp, calculated.timestamp
            );
        }
    }

    /// Compare one observation with its predicted record, or turn the failure into an
    /// UNKNOWN row.
    pub fn compare_pair(
        &self,
        observed: ObservedRecord,
        calculated: Result<EphemerisRecord, OcError>,
    ) -> ComparisonRow {
        let calc = match calculated {
            Ok(calc) => calc,
            Err(e) => return Self::downgrade(observed, None, e),
        };
        let obs_position = match observed.position() {
            Ok(p) => p,
            Err(e) => return Self::downgrade(observed, Some(calc), e),
        };

        Self::warn_on_epoch_mismatch(&observed, &calc);
        let residual =
            self.calculator
                .compute(&obs_position, &calc.position, calc.uncertainty_arcsec);
        ComparisonRow {
            observed,
            calculated: Some(calc),
            residual: Some(residual),
            error: None,
        }
    }

    /// UNKNOWN row carrying the error text; the predicted record is kept when it parsed.
    fn downgrade(
        observed: ObservedRecord,
        calculated: Option<EphemerisRecord>,
        error: OcError,
    ) -> ComparisonRow {
        warn!(
            "{} {}: comparison downgraded to UNKNOWN: {error}",
            observed.timestamp, observed.observatory_code
        );
        ComparisonRow {
            observed,
            calculated,
            residual: None,
            error: Some(error.to_string()),
        }
    }

    /// Compare already-fetched pairs, keeping the input order.
    pub fn compare_pairs<I>(&self, pairs: I) -> ComparisonReport
    where
        I: IntoIterator<Item = (ObservedRecord, Result<EphemerisRecord, OcError>)>,
    {
        let mut report = ComparisonReport::default();
        for (observed, calculated) in pairs {
            report.push(self.compare_pair(observed, calculated));
        }
        log_summary(&report);
        report
    }

    /// Fetch, parse and compare every observation in turn.
    ///
    /// The first data line of each fetched text is the predicted position.
    pub fn compare_with_source<S>(
        &self,
        observations: &[ObservedRecord],
        source: &S,
    ) -> ComparisonReport
    where
        S: EphemerisSource + ?Sized,
    {
        self.compare_pairs(observations.iter().map(|obs| {
            let calculated = source
                .fetch(&obs.timestamp, &obs.observatory_code)
                .and_then(|text| self.parser.parse_first(&text, &obs.observatory_code));
            (obs.clone(), calculated)
        }))
    }
}

fn log_summary(report: &ComparisonReport) {
    let c = &report.counts;
    info!(
        "compared {} observations: {} within, {} marginal, {} failed, {} unknown",
        c.total(),
        c.within,
        c.marginal,
        c.failed,
        c.unknown
    );
}

/// [`BatchComparator::compare_pairs`] with default parameters.
pub fn compare_pairs<I>(pairs: I) -> ComparisonReport
where
    I: IntoIterator<Item = (ObservedRecord, Result<EphemerisRecord, OcError>)>,
{
    BatchComparator::default().compare_pairs(pairs)
}

/// [`BatchComparator::compare_with_source`] with default parameters.
pub fn compare_with_source<S>(observations: &[ObservedRecord], source: &S) -> ComparisonReport
where
    S: EphemerisSource + ?Sized,
{
    BatchComparator::default().compare_with_source(observations, source)
}
