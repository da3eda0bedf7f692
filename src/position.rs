//! Angular position on the celestial sphere (equatorial, decimal degrees).
use std::fmt;

use nalgebra::Vector3;

use crate::{
    constants::Degree,
    conversion::{
        format_dec, format_ra, parse_dec_strict, parse_dec_to_deg, parse_ra_strict,
        parse_ra_to_deg,
    },
    occheck_errors::OcError,
};

/// Immutable equatorial position.
///
/// Fields
/// -----------------
/// * `ra_deg` – Right ascension in degrees, one winding (`[0, 360)` for valid sexagesimal input).
/// * `dec_deg` – Declination in degrees (`[-90, 90]`).
///
/// No wrapping is applied by [`Position::new`]; values produced by the sexagesimal parsers
/// from valid input are in range by construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub ra_deg: Degree,
    pub dec_deg: Degree,
}

impl Position {
    pub fn new(ra_deg: Degree, dec_deg: Degree) -> Self {
        Position { ra_deg, dec_deg }
    }

    /// Build a position from a right ascension (`HH MM SS.sss`) and a declination
    /// (`±DD MM SS.ss`) string.
    ///
    /// Arguments
    /// -----------------
    /// * `ra` – Right ascension, whitespace or colon separated.
    /// * `dec` – Declination, whitespace or colon separated.
    ///
    /// Return
    /// ----------
    /// * The parsed [`Position`], or [`OcError::InvalidSexagesimal`] for the first malformed input.
    pub fn from_sexagesimal(ra: &str, dec: &str) -> Result<Self, OcError> {
        Ok(Position {
            ra_deg: parse_ra_to_deg(ra)?,
            dec_deg: parse_dec_to_deg(dec)?,
        })
    }

    /// Same as [`Position::from_sexagesimal`] with range validation on every component.
    pub fn from_sexagesimal_strict(ra: &str, dec: &str) -> Result<Self, OcError> {
        Ok(Position {
            ra_deg: parse_ra_strict(ra)?,
            dec_deg: parse_dec_strict(dec)?,
        })
    }

    /// `(RA, Dec)` rendered as `("HH MM SS.sss", "±DD MM SS.ss")`.
    pub fn to_sexagesimal(&self) -> (String, String) {
        (format_ra(self.ra_deg), format_dec(self.dec_deg))
    }

    /// Unit vector on the celestial sphere pointing at this position.
    pub fn unit_vector(&self) -> Vector3<f64> {
        let (sin_ra, cos_ra) = self.ra_deg.to_radians().sin_cos();
        let (sin_dec, cos_dec) = self.dec_deg.to_radians().sin_cos();
        Vector3::new(cos_dec * cos_ra, cos_dec * sin_ra, sin_dec)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (ra, dec) = self.to_sexagesimal();
        write!(f, "RA {ra}  Dec {dec}")
    }
}
