//! # Trailing-field templates
//!
//! A Horizons observer-table data line always starts with the same eight tokens (date, time,
//! RA triplet, Dec triplet). What follows depends on the requested `QUANTITIES` and on the
//! table options, so the trailing columns are described by a [`FieldTemplate`]: an ordered list
//! of `(field, extraction rule)` pairs plus the rule that yields the record uncertainty.
//!
//! ## Overview
//!
//! - [`FieldTemplate::horizons_default`] – quantities `1,3,36,37`, anchored from the end of
//!   the line, uncertainty taken from the semi-major axis of the 3-σ error ellipse.
//! - [`FieldTemplate::horizons_uncertainty_only`] – quantities `1,36`, uncertainty is the
//!   root-sum-square of the RA and Dec 3-σ values.
//! - Custom layouts are built with [`FieldTemplate::new`] and [`FieldTemplate::with_field`].
//!
//! A template is only applied when the line carries at least
//! [`FieldTemplate::min_trailing`] trailing tokens; the parser otherwise falls back to the
//! band heuristic of [`super::uncertainty`].
use std::fmt;

use crate::constants::ArcSec;

/// Named trailing quantity of a Horizons observer table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EphemerisField {
    /// `dRA*cosD`, RA rate (arcsec/hour)
    DraCosD,
    /// `d(DEC)/dt`, Dec rate (arcsec/hour)
    DdecDt,
    /// `RA_3sigma` (arcsec)
    Ra3Sigma,
    /// `DEC_3sigma` (arcsec)
    Dec3Sigma,
    /// `SMAA_3sig`, semi-major axis of the error ellipse (arcsec)
    Smaa3Sigma,
    /// `SMIA_3sig`, semi-minor axis of the error ellipse (arcsec)
    Smia3Sigma,
    /// `Theta`, position angle of the error ellipse (deg)
    Theta,
}

impl fmt::Display for EphemerisField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EphemerisField::DraCosD => "dRA*cosD",
            EphemerisField::DdecDt => "d(DEC)/dt",
            EphemerisField::Ra3Sigma => "RA_3sigma",
            EphemerisField::Dec3Sigma => "DEC_3sigma",
            EphemerisField::Smaa3Sigma => "SMAA_3sig",
            EphemerisField::Smia3Sigma => "SMIA_3sig",
            EphemerisField::Theta => "Theta",
        };
        write!(f, "{label}")
    }
}

/// Where a field sits among the tokens following the coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// `n`-th token counted from the end of the line (`FromEnd(1)` is the last token).
    FromEnd(usize),
    /// `i`-th token right after the Dec triplet (0-based).
    FromStart(usize),
}

impl Extraction {
    /// Number of trailing tokens needed for this rule to resolve.
    fn required(self) -> usize {
        match self {
            Extraction::FromEnd(n) => n,
            Extraction::FromStart(i) => i + 1,
        }
    }

    fn pick<'a>(self, trailing: &[&'a str]) -> Option<&'a str> {
        match self {
            Extraction::FromEnd(0) => None,
            Extraction::FromEnd(n) => trailing.len().checked_sub(n).map(|i| trailing[i]),
            Extraction::FromStart(i) => trailing.get(i).copied(),
        }
    }
}

/// How the record uncertainty is derived from the extracted fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UncertaintyRule {
    /// Take one field as is.
    Field(EphemerisField),
    /// `sqrt(a² + b²)` of two fields.
    RootSumSquare(EphemerisField, EphemerisField),
}

/// Values extracted from the trailing columns; `None` when the column is missing or not
/// numeric (Horizons prints `n.a.`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EphemerisFields {
    pub dra_cosd: Option<f64>,
    pub ddec_dt: Option<f64>,
    pub ra_3sigma: Option<ArcSec>,
    pub dec_3sigma: Option<ArcSec>,
    pub smaa_3sigma: Option<ArcSec>,
    pub smia_3sigma: Option<ArcSec>,
    pub theta: Option<f64>,
}

impl EphemerisFields {
    pub fn get(&self, field: EphemerisField) -> Option<f64> {
        match field {
            EphemerisField::DraCosD => self.dra_cosd,
            EphemerisField::DdecDt => self.ddec_dt,
            EphemerisField::Ra3Sigma => self.ra_3sigma,
            EphemerisField::Dec3Sigma => self.dec_3sigma,
            EphemerisField::Smaa3Sigma => self.smaa_3sigma,
            EphemerisField::Smia3Sigma => self.smia_3sigma,
            EphemerisField::Theta => self.theta,
        }
    }

    fn slot(&mut self, field: EphemerisField) -> &mut Option<f64> {
        match field {
            EphemerisField::DraCosD => &mut self.dra_cosd,
            EphemerisField::DdecDt => &mut self.ddec_dt,
            EphemerisField::Ra3Sigma => &mut self.ra_3sigma,
            EphemerisField::Dec3Sigma => &mut self.dec_3sigma,
            EphemerisField::Smaa3Sigma => &mut self.smaa_3sigma,
            EphemerisField::Smia3Sigma => &mut self.smia_3sigma,
            EphemerisField::Theta => &mut self.theta,
        }
    }

    /// `true` when no field could be read.
    pub fn is_empty(&self) -> bool {
        *self == EphemerisFields::default()
    }
}

/// Numeric value of a trailing token, `None` for `n.a.` and other placeholders.
pub(crate) fn numeric_token(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Ordered description of the trailing columns of a data line.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldTemplate {
    name: String,
    fields: Vec<(EphemerisField, Extraction)>,
    uncertainty: UncertaintyRule,
}

impl FieldTemplate {
    /// Empty template; add columns with [`FieldTemplate::with_field`].
    pub fn new(name: impl Into<String>, uncertainty: UncertaintyRule) -> Self {
        FieldTemplate {
            name: name.into(),
            fields: Vec::new(),
            uncertainty,
        }
    }

    pub fn with_field(mut self, field: EphemerisField, extraction: Extraction) -> Self {
        self.fields.push((field, extraction));
        self
    }

    /// Layout of `QUANTITIES='1,3,36,37'`:
    ///
    /// ```text
    /// ... dRA*cosD d(DEC)/dt RA_3sigma DEC_3sigma SMAA_3sig SMIA_3sig Theta
    ///       -7        -6        -5        -4         -3        -2      -1
    /// ```
    pub fn horizons_default() -> Self {
        use EphemerisField::*;
        FieldTemplate::new("horizons-1,3,36,37", UncertaintyRule::Field(Smaa3Sigma))
            .with_field(Theta, Extraction::FromEnd(1))
            .with_field(Smia3Sigma, Extraction::FromEnd(2))
            .with_field(Smaa3Sigma, Extraction::FromEnd(3))
            .with_field(Dec3Sigma, Extraction::FromEnd(4))
            .with_field(Ra3Sigma, Extraction::FromEnd(5))
            .with_field(DdecDt, Extraction::FromEnd(6))
            .with_field(DraCosD, Extraction::FromEnd(7))
    }

    /// Layout of `QUANTITIES='1,36'`: `... RA_3sigma DEC_3sigma`.
    pub fn horizons_uncertainty_only() -> Self {
        use EphemerisField::*;
        FieldTemplate::new(
            "horizons-1,36",
            UncertaintyRule::RootSumSquare(Ra3Sigma, Dec3Sigma),
        )
        .with_field(Dec3Sigma, Extraction::FromEnd(1))
        .with_field(Ra3Sigma, Extraction::FromEnd(2))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[(EphemerisField, Extraction)] {
        &self.fields
    }

    pub fn uncertainty_rule(&self) -> UncertaintyRule {
        self.uncertainty
    }

    /// Smallest number of trailing tokens for which every rule resolves.
    pub fn min_trailing(&self) -> usize {
        self.fields
            .iter()
            .map(|(_, rule)| rule.required())
            .max()
            .unwrap_or(0)
    }

    /// Apply the template to the tokens that follow the coordinates.
    ///
    /// Return
    /// ------
    /// * `None` when fewer than [`FieldTemplate::min_trailing`] tokens are present, the
    ///   extracted fields otherwise (non-numeric columns are left to `None`).
    pub fn extract(&self, trailing: &[&str]) -> Option<EphemerisFields> {
        if self.fields.is_empty() || trailing.len() < self.min_trailing() {
            return None;
        }

        let mut out = EphemerisFields::default();
        for (field, rule) in &self.fields {
            *out.slot(*field) = rule.pick(trailing).and_then(numeric_token);
        }
        Some(out)
    }

    /// Record uncertainty according to the template rule; `None` when an input column is
    /// absent or the result is not strictly positive.
    pub fn uncertainty(&self, fields: &EphemerisFields) -> Option<ArcSec> {
        let value = match self.uncertainty {
            UncertaintyRule::Field(f) => fields.get(f)?,
            UncertaintyRule::RootSumSquare(a, b) => fields.get(a)?.hypot(fields.get(b)?),
        };
        (value > 0.0).then_some(value)
    }
}

impl Default for FieldTemplate {
    fn default() -> Self {
        FieldTemplate::horizons_default()
    }
}
