//! # Constants and type definitions for occheck
//!
//! This module centralizes the **unit conversion factors**, the **sentinel markers** of the
//! Horizons text format, the **default thresholds** of the significance test, and the
//! **type aliases** shared by every other module.
//!
//! ## Overview
//!
//! - Angular unit conversions (hours ↔ degrees ↔ arcseconds)
//! - Start/end markers delimiting the ephemeris payload of a Horizons response
//! - Default verdict boundaries and heuristic uncertainty band
//! - Core type aliases used across the crate

// -------------------------------------------------------------------------------------------------
// Unit conversions
// -------------------------------------------------------------------------------------------------

/// Degrees of right ascension per hour of time
pub const DEG_PER_HOUR: f64 = 15.0;

/// Minutes (of time or of arc) per unit
pub const MINUTES_PER_UNIT: f64 = 60.0;

/// Seconds (of time or of arc) per unit
pub const SECONDS_PER_UNIT: f64 = 3600.0;

/// Arcseconds per degree
pub const ARCSEC_PER_DEG: f64 = 3600.0;

/// Arcseconds per arcminute
pub const ARCSEC_PER_ARCMIN: f64 = 60.0;

/// Arcseconds per radian (≈ 206 264.806)
pub const ARCSEC_PER_RAD: f64 = 648_000.0 / std::f64::consts::PI;

/// Astronomical Unit in kilometers (IAU 2012)
pub const AU: f64 = 149_597_870.7;

/// Number of seconds in a day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

// -------------------------------------------------------------------------------------------------
// Horizons text format
// -------------------------------------------------------------------------------------------------

/// Start-of-ephemeris marker of a Horizons text response
pub const START_OF_EPHEMERIS: &str = "$$SOE";

/// End-of-ephemeris marker of a Horizons text response
pub const END_OF_EPHEMERIS: &str = "$$EOE";

/// Number of leading tokens in a data line: date, time, RA triplet, Dec triplet
pub const LEADING_FIELDS: usize = 8;

/// Characters Horizons may print as solar/lunar presence flags after the timestamp
pub const PRESENCE_FLAG_CHARS: &[char] = &['*', 'C', 'N', 'A', 'm', 'r', 'e', 'x', 'u', 't', 's'];

// -------------------------------------------------------------------------------------------------
// Significance defaults
// -------------------------------------------------------------------------------------------------

/// Upper bound (inclusive) of the sigma ratio for a WITHIN verdict
pub const DEFAULT_WITHIN_RATIO: f64 = 1.0;

/// Upper bound (inclusive) of the sigma ratio for a MARGINAL verdict
pub const DEFAULT_MARGINAL_RATIO: f64 = 3.0;

/// Exclusive lower bound of a plausible 3-sigma uncertainty, arcseconds
pub const DEFAULT_UNCERTAINTY_MIN: ArcSec = 0.001;

/// Exclusive upper bound of a plausible 3-sigma uncertainty, arcseconds
pub const DEFAULT_UNCERTAINTY_MAX: ArcSec = 1000.0;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in arcseconds
pub type ArcSec = f64;
/// MPC code identifying an observatory (3 characters, e.g. `G96`)
pub type MpcCode = String;
