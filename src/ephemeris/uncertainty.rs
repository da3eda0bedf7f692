//! Band heuristic for the 3-σ positional uncertainty.
//!
//! Used when the trailing columns of a data line cannot be matched against the configured
//! [`FieldTemplate`](super::field_template::FieldTemplate): the first numeric token after the
//! coordinates whose value lies strictly inside an [`UncertaintyBand`] is taken as the
//! uncertainty. Values obtained this way are tagged [`UncertaintySource::Heuristic`].
use log::debug;

use crate::constants::{ArcSec, DEFAULT_UNCERTAINTY_MAX, DEFAULT_UNCERTAINTY_MIN};

use super::field_template::numeric_token;

/// Open interval `(min, max)` of plausible uncertainties, in arcseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UncertaintyBand {
    pub min: ArcSec,
    pub max: ArcSec,
}

impl UncertaintyBand {
    pub fn new(min: ArcSec, max: ArcSec) -> Self {
        UncertaintyBand { min, max }
    }

    pub fn contains(&self, value: ArcSec) -> bool {
        value > self.min && value < self.max
    }
}

impl Default for UncertaintyBand {
    fn default() -> Self {
        UncertaintyBand::new(DEFAULT_UNCERTAINTY_MIN, DEFAULT_UNCERTAINTY_MAX)
    }
}

/// Provenance of the uncertainty carried by an ephemeris record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UncertaintySource {
    /// Read from a template-anchored column.
    Template,
    /// Guessed by the band heuristic; low confidence.
    Heuristic,
    /// No usable value.
    Unavailable,
}

impl UncertaintySource {
    pub fn is_low_confidence(self) -> bool {
        !matches!(self, UncertaintySource::Template)
    }
}

/// First trailing value inside `band`, scanning left to right.
///
/// Arguments
/// ---------
/// * `trailing`: tokens of the data line after the Dec triplet
/// * `band`: plausible uncertainty interval (bounds excluded)
///
/// Return
/// ------
/// * the candidate uncertainty in arcseconds, `None` when nothing falls in the band
pub fn heuristic_uncertainty(trailing: &[&str], band: &UncertaintyBand) -> Option<ArcSec> {
    let found = trailing
        .iter()
        .enumerate()
        .find_map(|(i, token)| {
            numeric_token(token)
                .filter(|v| band.contains(*v))
                .map(|v| (i, v))
        });

    match found {
        Some((i, v)) => {
            debug!(
                "heuristic uncertainty: token #{i} = {v} arcsec in ({}, {})",
                band.min, band.max
            );
            Some(v)
        }
        None => {
            debug!(
                "heuristic uncertainty: no value in ({}, {}) among {} trailing tokens",
                band.min,
                band.max,
                trailing.len()
            );
            None
        }
    }
}

#[cfg(test)]
mod uncertainty_test {
    use super::*;

    #[test]
    fn test_first_value_in_band() {
        let band = UncertaintyBand::default();
        let tail = ["-1523.7", "0.0", "n.a.", "0.42", "0.9"];
        assert_eq!(heuristic_uncertainty(&tail, &band), Some(0.42));
    }

    #[test]
    fn test_bounds_are_exclusive() {
        let band = UncertaintyBand::new(0.001, 1000.0);
        assert_eq!(heuristic_uncertainty(&["0.001", "1000"], &band), None);
        assert_eq!(heuristic_uncertainty(&["0.001", "999.9"], &band), Some(999.9));
    }

    #[test]
    fn test_nothing_found() {
        let band = UncertaintyBand::default();
        assert_eq!(heuristic_uncertainty(&[], &band), None);
        assert_eq!(heuristic_uncertainty(&["n.a.", "-2.0", "5000"], &band), None);
    }

    #[test]
    fn test_source_confidence() {
        assert!(!UncertaintySource::Template.is_low_confidence());
        assert!(UncertaintySource::Heuristic.is_low_confidence());
        assert!(UncertaintySource::Unavailable.is_low_confidence());
    }
}
