//! # Residual & significance calculator
//!
//! Turns an observed and a calculated [`Position`] into an O−C [`Residual`] and judges it
//! against the 3-σ uncertainty of the prediction.
//!
//! ## Overview
//!
//! - `ΔRA = (α_obs − α_calc) · 3600 · cos δ̄`, with `δ̄` the **mean** declination of the two
//!   positions (small-angle approximation, valid up to a few arcminutes). The RA difference
//!   is taken in `(−180°, 180°]`, so positions on both sides of `0h` stay close.
//! - `ΔDec = (δ_obs − δ_calc) · 3600`.
//! - Total separation: planar `sqrt(ΔRA² + ΔDec²)` by default, or the exact angle between
//!   the two unit vectors with [`SeparationMethod::GreatCircle`]. Component deltas always keep
//!   the planar definition.
//! - `ratio = total / uncertainty` when the uncertainty is present and strictly positive.
//! - Verdict, lower boundary inclusive: `ratio ≤ 1 → WITHIN`, `≤ 3 → MARGINAL`,
//!   `> 3 → FAILED`, no usable uncertainty `→ UNKNOWN`.
//!
//! Every function here is pure.
use std::fmt;

use crate::{
    constants::{ArcSec, Degree, ARCSEC_PER_ARCMIN, ARCSEC_PER_DEG, ARCSEC_PER_RAD, AU},
    occheck_errors::OcError,
    params::OcParams,
    position::Position,
};

/// Outcome of the significance test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Within,
    Marginal,
    Failed,
    Unknown,
}

impl Verdict {
    /// All tiers, in report order.
    pub const ALL: [Verdict; 4] = [
        Verdict::Within,
        Verdict::Marginal,
        Verdict::Failed,
        Verdict::Unknown,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Verdict::Within => "WITHIN",
            Verdict::Marginal => "MARGINAL",
            Verdict::Failed => "FAILED",
            Verdict::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Ratio bounds of the WITHIN and MARGINAL tiers (both inclusive).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignificanceThresholds {
    pub within: f64,
    pub marginal: f64,
}

impl Default for SignificanceThresholds {
    fn default() -> Self {
        SignificanceThresholds {
            within: crate::constants::DEFAULT_WITHIN_RATIO,
            marginal: crate::constants::DEFAULT_MARGINAL_RATIO,
        }
    }
}

impl SignificanceThresholds {
    pub fn classify(&self, sigma_ratio: Option<f64>) -> Verdict {
        match sigma_ratio {
            None => Verdict::Unknown,
            Some(r) if r.is_nan() => Verdict::Unknown,
            Some(r) if r <= self.within => Verdict::Within,
            Some(r) if r <= self.marginal => Verdict::Marginal,
            Some(_) => Verdict::Failed,
        }
    }
}

/// How the total separation is combined from the two positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeparationMethod {
    /// `sqrt(ΔRA² + ΔDec²)`.
    #[default]
    Planar,
    /// Angle between the unit vectors, `atan2(|a × b|, a · b)`.
    GreatCircle,
}

/// Qualitative reading of a sigma ratio beyond the 1× bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// ratio < 3
    Moderate,
    /// 3 ≤ ratio < 10
    Significant,
    /// 10 ≤ ratio < 100
    Severe,
    /// ratio ≥ 100
    Catastrophic,
}

impl Severity {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio < 3.0 {
            Severity::Moderate
        } else if ratio < 10.0 {
            Severity::Significant
        } else if ratio < 100.0 {
            Severity::Severe
        } else {
            Severity::Catastrophic
        }
    }

    /// Confidence that the prediction is wrong.
    pub fn confidence(self) -> &'static str {
        match self {
            Severity::Moderate => "~68-95%",
            Severity::Significant => "~99.7%",
            Severity::Severe => ">99.99%",
            Severity::Catastrophic => "overwhelmingly high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Moderate => "moderate",
            Severity::Significant => "significant",
            Severity::Severe => "severe",
            Severity::Catastrophic => "catastrophic",
        };
        f.pad(label)
    }
}

/// Observed minus calculated residual.
///
/// Fields
/// -----------------
/// * `delta_ra_arcsec` – signed, cos δ̄ corrected.
/// * `delta_dec_arcsec` – signed.
/// * `total_separation_arcsec` – non-negative.
/// * `uncertainty_arcsec` – 3-σ uncertainty used for the test, as given.
/// * `sigma_ratio` – `total / uncertainty`, `None` when the uncertainty is absent or `≤ 0`.
/// * `verdict` – tier of `sigma_ratio`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Residual {
    pub delta_ra_arcsec: ArcSec,
    pub delta_dec_arcsec: ArcSec,
    pub total_separation_arcsec: ArcSec,
    pub uncertainty_arcsec: Option<ArcSec>,
    pub sigma_ratio: Option<f64>,
    pub verdict: Verdict,
}

impl Residual {
    pub fn separation_arcmin(&self) -> f64 {
        self.total_separation_arcsec / ARCSEC_PER_ARCMIN
    }

    pub fn separation_deg(&self) -> Degree {
        self.total_separation_arcsec / ARCSEC_PER_DEG
    }

    /// Linear size of the separation at `distance_au`, in kilometers.
    pub fn projected_distance_km(&self, distance_au: f64) -> f64 {
        self.total_separation_arcsec / ARCSEC_PER_RAD * distance_au * AU
    }

    /// `None` unless the ratio exceeds the 1× bound.
    pub fn severity(&self) -> Option<Severity> {
        self.sigma_ratio
            .filter(|r| *r > 1.0)
            .map(Severity::from_ratio)
    }
}

impl fmt::Display for Residual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ΔRA = {:+.3}\"  ΔDec = {:+.3}\"  total = {:.3}\"",
            self.delta_ra_arcsec, self.delta_dec_arcsec, self.total_separation_arcsec
        )?;
        match self.sigma_ratio {
            Some(r) => write!(f, "  ratio = {r:.1}×  {}", self.verdict),
            None => write!(f, "  ratio = N/A  {}", self.verdict),
        }
    }
}

/// RA difference reduced to `(−180°, 180°]`; differences already in range are returned as is.
fn wrap_ra_difference(diff: Degree) -> Degree {
    if diff > 180.0 {
        diff - 360.0
    } else if diff <= -180.0 {
        diff + 360.0
    } else {
        diff
    }
}

/// Residual calculator bound to a set of thresholds and a separation method.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResidualCalculator {
    pub thresholds: SignificanceThresholds,
    pub method: SeparationMethod,
}

impl ResidualCalculator {
    pub fn new(thresholds: SignificanceThresholds, method: SeparationMethod) -> Self {
        ResidualCalculator { thresholds, method }
    }

    pub fn from_params(params: &OcParams) -> Self {
        ResidualCalculator {
            thresholds: SignificanceThresholds {
                within: params.within_ratio,
                marginal: params.marginal_ratio,
            },
            method: params.separation,
        }
    }

    /// Compute the O−C residual of `observed` against `calculated`.
    ///
    /// Arguments
    /// ---------
    /// * `observed`: measured position
    /// * `calculated`: predicted position
    /// * `uncertainty`: 3-σ uncertainty of the prediction in arcseconds, if known
    ///
    /// Return
    /// ------
    /// * the [`Residual`]; never fails
    pub fn compute(
        &self,
        observed: &Position,
        calculated: &Position,
        uncertainty: Option<ArcSec>,
    ) -> Residual {
        let mean_dec = ((observed.dec_deg + calculated.dec_deg) / 2.0).to_radians();
        let delta_ra = wrap_ra_difference(observed.ra_deg - calculated.ra_deg)
            * ARCSEC_PER_DEG
            * mean_dec.cos();
        let delta_dec = (observed.dec_deg - calculated.dec_deg) * ARCSEC_PER_DEG;

        let total = match self.method {
            SeparationMethod::Planar => delta_ra.hypot(delta_dec),
            SeparationMethod::GreatCircle => {
                let a = observed.unit_vector();
                let b = calculated.unit_vector();
                a.cross(&b).norm().atan2(a.dot(&b)) * ARCSEC_PER_RAD
            }
        };

        let sigma_ratio = uncertainty
            .filter(|u| u.is_finite() && *u > 0.0)
            .map(|u| total / u);

        Residual {
            delta_ra_arcsec: delta_ra,
            delta_dec_arcsec: delta_dec,
            total_separation_arcsec: total,
            uncertainty_arcsec: uncertainty,
            sigma_ratio,
            verdict: self.thresholds.classify(sigma_ratio),
        }
    }

    /// Same as [`ResidualCalculator::compute`] from four sexagesimal strings.
    pub fn compute_from_sexagesimal(
        &self,
        observed: (&str, &str),
        calculated: (&str, &str),
        uncertainty: Option<ArcSec>,
    ) -> Result<Residual, OcError> {
        let obs = Position::from_sexagesimal(observed.0, observed.1)?;
        let calc = Position::from_sexagesimal(calculated.0, calculated.1)?;
        Ok(self.compute(&obs, &calc, uncertainty))
    }
}

/// [`ResidualCalculator::compute`] with the default thresholds and the planar separation.
pub fn compute_residual(
    observed: &Position,
    calculated: &Position,
    uncertainty: Option<ArcSec>,
) -> Residual {
    ResidualCalculator::default().compute(observed, calculated, uncertainty)
}

/// [`compute_residual`] from `(ra, dec)` sexagesimal pairs.
///
/// Errors
/// ------
/// * [`OcError::InvalidSexagesimal`] for the first malformed coordinate
pub fn compute_from_sexagesimal(
    observed: (&str, &str),
    calculated: (&str, &str),
    uncertainty: Option<ArcSec>,
) -> Result<Residual, OcError> {
    ResidualCalculator::default().compute_from_sexagesimal(observed, calculated, uncertainty)
}

#[cfg(test)]
mod residuals_test {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use proptest::prelude::*;

    const OBS: (&str, &str) = ("11 05 53.640", "+05 24 55.44");
    const CALC: (&str, &str) = ("11 05 53.500", "+05 24 55.00");

    #[test]
    fn test_concrete_scenario() {
        let r = compute_from_sexagesimal(OBS, CALC, Some(0.31)).unwrap();

        assert_abs_diff_eq!(r.delta_ra_arcsec, 2.0906, epsilon = 2e-3);
        assert_abs_diff_eq!(r.delta_dec_arcsec, 0.44, epsilon = 1e-9);
        assert_abs_diff_eq!(r.total_separation_arcsec, 2.1364, epsilon = 5e-3);
        assert_abs_diff_eq!(r.sigma_ratio.unwrap(), 6.9, epsilon = 0.05);
        assert_eq!(r.verdict, Verdict::Failed);
        assert_eq!(r.severity(), Some(Severity::Significant));
        assert_eq!(r.uncertainty_arcsec, Some(0.31));
    }

    #[test]
    fn test_no_uncertainty() {
        for u in [None, Some(0.0), Some(-1.0), Some(f64::NAN)] {
            let r = compute_from_sexagesimal(OBS, CALC, u).unwrap();
            assert_eq!(r.sigma_ratio, None);
            assert_eq!(r.verdict, Verdict::Unknown);
            assert_eq!(r.severity(), None);
        }
    }

    #[test]
    fn test_malformed_input() {
        assert_eq!(
            compute_from_sexagesimal(("11 05", "+05 24 55.44"), CALC, Some(1.0)),
            Err(OcError::InvalidSexagesimal("11 05".into()))
        );
    }

    #[test]
    fn test_verdict_boundaries() {
        let t = SignificanceThresholds::default();
        assert_eq!(t.classify(Some(0.0)), Verdict::Within);
        assert_eq!(t.classify(Some(1.0)), Verdict::Within);
        assert_eq!(t.classify(Some(1.0 + 1e-12)), Verdict::Marginal);
        assert_eq!(t.classify(Some(3.0)), Verdict::Marginal);
        assert_eq!(t.classify(Some(3.0 + 1e-12)), Verdict::Failed);
        assert_eq!(t.classify(None), Verdict::Unknown);
    }

    #[test]
    fn test_ratio_at_boundary_through_compute() {
        let calc = Position::new(10.0, 0.0);
        let obs = Position::new(10.0, 1.0 / 3600.0);
        let r = compute_residual(&obs, &calc, Some(r_total(&obs, &calc)));
        assert_eq!(r.sigma_ratio, Some(1.0));
        assert_eq!(r.verdict, Verdict::Within);

        let r = compute_residual(&obs, &calc, Some(r_total(&obs, &calc) / 3.0));
        assert_relative_eq!(r.sigma_ratio.unwrap(), 3.0, epsilon = 1e-12);
    }

    fn r_total(obs: &Position, calc: &Position) -> f64 {
        compute_residual(obs, calc, None).total_separation_arcsec
    }

    #[test]
    fn test_great_circle_agrees_at_small_angles() {
        let obs = Position::from_sexagesimal(OBS.0, OBS.1).unwrap();
        let calc = Position::from_sexagesimal(CALC.0, CALC.1).unwrap();

        let planar = compute_residual(&obs, &calc, None);
        let gc = ResidualCalculator::new(
            SignificanceThresholds::default(),
            SeparationMethod::GreatCircle,
        )
        .compute(&obs, &calc, None);

        assert_eq!(gc.delta_ra_arcsec, planar.delta_ra_arcsec);
        assert_abs_diff_eq!(
            gc.total_separation_arcsec,
            planar.total_separation_arcsec,
            epsilon = 1e-4
        );
    }

    #[test]
    fn test_great_circle_large_angle() {
        let calc = ResidualCalculator::new(
            SignificanceThresholds::default(),
            SeparationMethod::GreatCircle,
        );
        let r = calc.compute(&Position::new(0.0, 0.0), &Position::new(90.0, 0.0), None);
        assert_abs_diff_eq!(r.separation_deg(), 90.0, epsilon = 1e-9);

        let r = calc.compute(&Position::new(359.5, 0.0), &Position::new(0.5, 0.0), None);
        assert_abs_diff_eq!(r.separation_deg(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_derived_units() {
        let r = compute_residual(&Position::new(0.0, 0.0), &Position::new(0.0, 0.5), None);
        assert_abs_diff_eq!(r.total_separation_arcsec, 1800.0, epsilon = 1e-9);
        assert_abs_diff_eq!(r.separation_arcmin(), 30.0, epsilon = 1e-9);
        assert_abs_diff_eq!(r.separation_deg(), 0.5, epsilon = 1e-12);
        // 1" at 1 AU is about 725.27 km
        assert_abs_diff_eq!(r.projected_distance_km(1.0) / 1800.0, 725.27, epsilon = 0.01);
    }

    #[test]
    fn test_severity_tiers() {
        assert_eq!(Severity::from_ratio(2.9), Severity::Moderate);
        assert_eq!(Severity::from_ratio(3.0), Severity::Significant);
        assert_eq!(Severity::from_ratio(10.0), Severity::Severe);
        assert_eq!(Severity::from_ratio(100.0), Severity::Catastrophic);
        assert_eq!(Severity::Significant.confidence(), "~99.7%");
    }

    #[test]
    fn test_display() {
        let r = compute_from_sexagesimal(OBS, CALC, Some(0.31)).unwrap();
        let s = r.to_string();
        assert!(s.contains("ratio = 6.9×"), "{s}");
        assert!(s.ends_with("FAILED"), "{s}");

        let r = compute_from_sexagesimal(OBS, CALC, None).unwrap();
        assert!(r.to_string().ends_with("ratio = N/A  UNKNOWN"));
    }

    #[test]
    fn test_ra_across_zero_hours() {
        let r = compute_from_sexagesimal(
            ("23 59 59.990", "+00 00 00.00"),
            ("00 00 00.010", "+00 00 00.00"),
            Some(0.5),
        )
        .unwrap();
        // 0.02 s of time on the equator
        assert_abs_diff_eq!(r.delta_ra_arcsec, -0.3, epsilon = 1e-6);
        assert_abs_diff_eq!(r.total_separation_arcsec, 0.3, epsilon = 1e-6);
        assert_eq!(r.verdict, Verdict::Within);

        let back = compute_from_sexagesimal(
            ("00 00 00.010", "+00 00 00.00"),
            ("23 59 59.990", "+00 00 00.00"),
            Some(0.5),
        )
        .unwrap();
        assert_abs_diff_eq!(back.delta_ra_arcsec, 0.3, epsilon = 1e-6);

        assert_eq!(wrap_ra_difference(180.0), 180.0);
        assert_eq!(wrap_ra_difference(-180.0), 180.0);
        assert_eq!(wrap_ra_difference(-0.25), -0.25);
    }

    proptest! {
        #[test]
        fn zero_residual_identity(ra in 0.0f64..360.0, dec in -90.0f64..=90.0, u in 1e-6f64..1e3) {
            let p = Position::new(ra, dec);
            let r = compute_residual(&p, &p, Some(u));
            prop_assert_eq!(r.delta_ra_arcsec, 0.0);
            prop_assert_eq!(r.delta_dec_arcsec, 0.0);
            prop_assert_eq!(r.total_separation_arcsec, 0.0);
            prop_assert_eq!(r.verdict, Verdict::Within);
        }

        #[test]
        fn swapping_keeps_magnitude(
            ra_a in 0.0f64..360.0, dec_a in -89.0f64..89.0,
            d_ra in -0.05f64..0.05, d_dec in -0.05f64..0.05,
        ) {
            let a = Position::new(ra_a, dec_a);
            let b = Position::new(ra_a + d_ra, dec_a + d_dec);
            let ab = compute_residual(&a, &b, Some(1.0));
            let ba = compute_residual(&b, &a, Some(1.0));
            prop_assert_eq!(ab.total_separation_arcsec, ba.total_separation_arcsec);
            prop_assert_eq!(ab.delta_ra_arcsec, -ba.delta_ra_arcsec);
            prop_assert_eq!(ab.delta_dec_arcsec, -ba.delta_dec_arcsec);
        }
    }
}
