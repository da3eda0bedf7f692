//! # Comparison parameters
//!
//! [`OcParams`] gathers every tunable of the parser and of the significance test. Build it
//! with [`OcParams::builder`]; [`OcParamsBuilder::build`] validates the combination.
//!
//! ```rust,no_run
//! use occheck::params::OcParams;
//! use occheck::residuals::SeparationMethod;
//!
//! let params = OcParams::builder()
//!     .marginal_ratio(5.0)
//!     .separation(SeparationMethod::GreatCircle)
//!     .build()
//!     .unwrap();
//! ```
use std::fmt;

use crate::{
    constants::{
        ArcSec, DEFAULT_MARGINAL_RATIO, DEFAULT_UNCERTAINTY_MAX, DEFAULT_UNCERTAINTY_MIN,
        DEFAULT_WITHIN_RATIO,
    },
    ephemeris::{field_template::FieldTemplate, uncertainty::UncertaintyBand},
    occheck_errors::OcError,
    residuals::SeparationMethod,
};

/// Configuration of an O−C comparison run.
///
/// Defaults
/// -----------------
/// * `within_ratio`: 1.0
/// * `marginal_ratio`: 3.0
/// * `uncertainty_band`: (0.001, 1000.0) arcsec, bounds excluded
/// * `separation`: [`SeparationMethod::Planar`]
/// * `skip_presence_flags`: true
/// * `strict_coordinates`: false
/// * `field_template`: [`FieldTemplate::horizons_default`]
///
/// Validation
/// -----------------
/// * `0 < within_ratio ≤ marginal_ratio`, both finite.
/// * `0 ≤ uncertainty_band.min < uncertainty_band.max`.
/// * the field template must declare at least one column.
#[derive(Debug, Clone, PartialEq)]
pub struct OcParams {
    pub within_ratio: f64,
    pub marginal_ratio: f64,
    pub uncertainty_band: UncertaintyBand,
    pub separation: SeparationMethod,
    pub skip_presence_flags: bool,
    pub strict_coordinates: bool,
    pub field_template: FieldTemplate,
}

impl OcParams {
    pub fn builder() -> OcParamsBuilder {
        OcParamsBuilder::new()
    }
}

impl Default for OcParams {
    fn default() -> Self {
        OcParams {
            within_ratio: DEFAULT_WITHIN_RATIO,
            marginal_ratio: DEFAULT_MARGINAL_RATIO,
            uncertainty_band: UncertaintyBand::new(
                DEFAULT_UNCERTAINTY_MIN,
                DEFAULT_UNCERTAINTY_MAX,
            ),
            separation: SeparationMethod::Planar,
            skip_presence_flags: true,
            strict_coordinates: false,
            field_template: FieldTemplate::horizons_default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OcParamsBuilder {
    params: OcParams,
}

impl Default for OcParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OcParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: OcParams::default(),
        }
    }

    pub fn within_ratio(mut self, v: f64) -> Self {
        self.params.within_ratio = v;
        self
    }

    pub fn marginal_ratio(mut self, v: f64) -> Self {
        self.params.marginal_ratio = v;
        self
    }

    pub fn uncertainty_band(mut self, min: ArcSec, max: ArcSec) -> Self {
        self.params.uncertainty_band = UncertaintyBand::new(min, max);
        self
    }

    pub fn separation(mut self, v: SeparationMethod) -> Self {
        self.params.separation = v;
        self
    }

    pub fn skip_presence_flags(mut self, v: bool) -> Self {
        self.params.skip_presence_flags = v;
        self
    }

    pub fn strict_coordinates(mut self, v: bool) -> Self {
        self.params.strict_coordinates = v;
        self
    }

    pub fn field_template(mut self, v: FieldTemplate) -> Self {
        self.params.field_template = v;
        self
    }

    /// Validate and return the parameters.
    ///
    /// Errors
    /// ------
    /// * [`OcError::InvalidConfiguration`] naming the first violated constraint.
    pub fn build(self) -> Result<OcParams, OcError> {
        let p = &self.params;

        if !(p.within_ratio.is_finite() && p.within_ratio > 0.0) {
            return Err(OcError::InvalidConfiguration(
                "within_ratio must be finite and > 0".into(),
            ));
        }
        if !(p.marginal_ratio.is_finite() && p.marginal_ratio >= p.within_ratio) {
            return Err(OcError::InvalidConfiguration(
                "require within_ratio <= marginal_ratio < inf".into(),
            ));
        }

        let band = &p.uncertainty_band;
        if !(band.min >= 0.0 && band.min < band.max) {
            return Err(OcError::InvalidConfiguration(
                "require 0 <= uncertainty_band.min < uncertainty_band.max".into(),
            ));
        }

        if p.field_template.fields().is_empty() {
            return Err(OcError::InvalidConfiguration(format!(
                "field template '{}' declares no column",
                p.field_template.name()
            )));
        }

        Ok(self.params)
    }
}

impl fmt::Display for OcParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "O-C comparison parameters")?;
        writeln!(f, "-------------------------")?;
        writeln!(f, "  within_ratio        = {}", self.within_ratio)?;
        writeln!(f, "  marginal_ratio      = {}", self.marginal_ratio)?;
        writeln!(
            f,
            "  uncertainty_band    = ({}, {}) arcsec",
            self.uncertainty_band.min, self.uncertainty_band.max
        )?;
        writeln!(f, "  separation          = {:?}", self.separation)?;
        writeln!(f, "  skip_presence_flags = {}", self.skip_presence_flags)?;
        writeln!(f, "  strict_coordinates  = {}", self.strict_coordinates)?;
        write!(f, "  field_template      = {}", self.field_template.name())
    }
}

#[cfg(test)]
mod params_test {
    use super::*;
    use crate::ephemeris::field_template::UncertaintyRule;
    use crate::ephemeris::field_template::EphemerisField;

    #[test]
    fn test_default_is_valid() {
        let built = OcParams::builder().build().unwrap();
        assert_eq!(built, OcParams::default());
        assert_eq!(built.uncertainty_band, UncertaintyBand::default());
    }

    #[test]
    fn test_builder_setters() {
        let p = OcParams::builder()
            .within_ratio(2.0)
            .marginal_ratio(5.0)
            .uncertainty_band(0.0, 10.0)
            .separation(SeparationMethod::GreatCircle)
            .skip_presence_flags(false)
            .strict_coordinates(true)
            .field_template(FieldTemplate::horizons_uncertainty_only())
            .build()
            .unwrap();

        assert_eq!(p.within_ratio, 2.0);
        assert_eq!(p.marginal_ratio, 5.0);
        assert_eq!(p.uncertainty_band, UncertaintyBand::new(0.0, 10.0));
        assert_eq!(p.separation, SeparationMethod::GreatCircle);
        assert!(!p.skip_presence_flags);
        assert!(p.strict_coordinates);
        assert_eq!(p.field_template.name(), "horizons-1,36");
    }

    #[test]
    fn test_invalid_ratios() {
        assert!(matches!(
            OcParams::builder().within_ratio(0.0).build(),
            Err(OcError::InvalidConfiguration(_))
        ));
        assert!(OcParams::builder().within_ratio(f64::NAN).build().is_err());
        assert!(OcParams::builder()
            .within_ratio(3.0)
            .marginal_ratio(2.0)
            .build()
            .is_err());
        assert!(OcParams::builder()
            .marginal_ratio(f64::INFINITY)
            .build()
            .is_err());
        // equal bounds collapse the MARGINAL tier, still valid
        assert!(OcParams::builder()
            .within_ratio(2.0)
            .marginal_ratio(2.0)
            .build()
            .is_ok());
    }

    #[test]
    fn test_invalid_band_and_template() {
        assert!(OcParams::builder().uncertainty_band(1.0, 1.0).build().is_err());
        assert!(OcParams::builder().uncertainty_band(-1.0, 1.0).build().is_err());

        let empty = FieldTemplate::new("empty", UncertaintyRule::Field(EphemerisField::Theta));
        assert_eq!(
            OcParams::builder().field_template(empty).build(),
            Err(OcError::InvalidConfiguration(
                "field template 'empty' declares no column".into()
            ))
        );
    }

    #[test]
    fn test_display() {
        let s = OcParams::default().to_string();
        assert!(s.contains("marginal_ratio      = 3"));
        assert!(s.contains("horizons-1,3,36,37"));
    }
}
