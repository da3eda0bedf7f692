//! # Sexagesimal coordinate codec
//!
//! Conversions between the sexagesimal notation used by ephemeris services and observation
//! reports (`HH MM SS.sss` for right ascension, `±DD MM SS.ss` for declination) and decimal
//! degrees.
//!
//! ## Parsing
//!
//! - Tokens may be separated by whitespace, colons, or any mix of both
//!   (`"11 05 53.640"`, `"11:05:53.640"`).
//! - Exactly three numeric tokens are required, otherwise
//!   [`OcError::InvalidSexagesimal`] is returned.
//! - The default parsers are **permissive**: components outside their nominal range
//!   (e.g. `75` minutes) are accepted and folded into the result. The `*_strict` variants
//!   reject them with [`OcError::CoordinateOutOfRange`].
//!
//! ## Formatting
//!
//! - [`format_ra`] renders `HH MM SS.sss` (3 decimals), [`format_dec`] renders `±DD MM SS.ss`
//!   (2 decimals, explicit sign).
//! - Rounding carries across fields: `59.9996 s` becomes the next minute, and a right
//!   ascension rounding up to `24h` wraps to `00h`.
//!
//! ## See also
//! ------------
//! * [`crate::position::Position`] – Value type built from a pair of parsed coordinates.
//! * [`crate::display`] – Table renderers using [`ra_hms_prec`] / [`dec_sdms_prec`].
use crate::{
    constants::{
        ArcSec, Degree, ARCSEC_PER_DEG, DEG_PER_HOUR, MINUTES_PER_UNIT, SECONDS_PER_UNIT,
    },
    occheck_errors::OcError,
};

/// Largest number of fractional second digits honoured by the formatters; larger requests
/// are clamped.
pub const MAX_SECONDS_PRECISION: usize = 9;

/// Separator used when rendering a sexagesimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SexagesimalStyle {
    /// `11 05 53.640`
    #[default]
    Spaces,
    /// `11:05:53.640`
    Colons,
}

impl SexagesimalStyle {
    fn separator(self) -> char {
        match self {
            SexagesimalStyle::Spaces => ' ',
            SexagesimalStyle::Colons => ':',
        }
    }
}

/// Split a sexagesimal string into exactly three tokens.
///
/// Whitespace and `:` are both accepted as separators, repeated separators are collapsed.
fn split_sexagesimal(text: &str) -> Result<[&str; 3], OcError> {
    let mut tokens = text
        .split(|c: char| c.is_whitespace() || c == ':')
        .filter(|t| !t.is_empty());

    match (tokens.next(), tokens.next(), tokens.next(), tokens.next()) {
        (Some(a), Some(b), Some(c), None) => Ok([a, b, c]),
        _ => Err(OcError::InvalidSexagesimal(text.to_string())),
    }
}

/// Parse one numeric token, rejecting non-finite values (`NaN`, `inf`).
fn parse_component(token: &str, text: &str) -> Result<f64, OcError> {
    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| OcError::InvalidSexagesimal(text.to_string()))
}

fn parse_triplet(text: &str) -> Result<([&str; 3], [f64; 3]), OcError> {
    let tokens = split_sexagesimal(text)?;
    let values = [
        parse_component(tokens[0], text)?,
        parse_component(tokens[1], text)?,
        parse_component(tokens[2], text)?,
    ];
    Ok((tokens, values))
}

/// Parse a right ascension string to degrees.
///
/// Arguments
/// ---------
/// * `ra`: a string representing the right ascension in the format `HH MM SS.sss` or `HH:MM:SS.sss`
///
/// Return
/// ------
/// * `(h + m/60 + s/3600) × 15` in degrees, or [`OcError::InvalidSexagesimal`] when the string
///   does not split into exactly three numeric tokens.
pub fn parse_ra_to_deg(ra: &str) -> Result<Degree, OcError> {
    let (_, [h, m, s]) = parse_triplet(ra)?;
    Ok((h + m / MINUTES_PER_UNIT + s / SECONDS_PER_UNIT) * DEG_PER_HOUR)
}

/// Parse a declination string to degrees.
///
/// The sign is read from the **first character of the degree token only**: `-` gives a
/// negative declination, anything else (`+` or a bare digit) gives a positive one. An unsigned
/// degree token is therefore always north, which is how upstream tooling has always read it.
///
/// Arguments
/// ---------
/// * `dec`: a string representing the declination in the format `±DD MM SS.ss` or `±DD:MM:SS.ss`
///
/// Return
/// ------
/// * `sign × (|d| + m/60 + s/3600)` in degrees, or [`OcError::InvalidSexagesimal`].
pub fn parse_dec_to_deg(dec: &str) -> Result<Degree, OcError> {
    let ([d_token, _, _], [d, m, s]) = parse_triplet(dec)?;
    let sign = if d_token.starts_with('-') { -1.0 } else { 1.0 };
    Ok(sign * (d.abs() + m / MINUTES_PER_UNIT + s / SECONDS_PER_UNIT))
}

fn check_range(
    value: f64,
    min: f64,
    max_exclusive: f64,
    what: &str,
    text: &str,
) -> Result<(), OcError> {
    if value < min || value >= max_exclusive {
        return Err(OcError::CoordinateOutOfRange(format!(
            "{what} = {value} not in [{min}, {max_exclusive}) for '{text}'"
        )));
    }
    Ok(())
}

/// Same as [`parse_ra_to_deg`] but validates `h ∈ [0,24)`, `m ∈ [0,60)` and `s ∈ [0,60)`.
pub fn parse_ra_strict(ra: &str) -> Result<Degree, OcError> {
    let (_, [h, m, s]) = parse_triplet(ra)?;
    check_range(h, 0.0, 24.0, "hours", ra)?;
    check_range(m, 0.0, 60.0, "minutes", ra)?;
    check_range(s, 0.0, 60.0, "seconds", ra)?;
    parse_ra_to_deg(ra)
}

/// Same as [`parse_dec_to_deg`] but validates `|d| ≤ 90`, `m ∈ [0,60)`, `s ∈ [0,60)`
/// and a final magnitude of at most 90°.
pub fn parse_dec_strict(dec: &str) -> Result<Degree, OcError> {
    let (_, [d, m, s]) = parse_triplet(dec)?;
    if d.abs() > 90.0 {
        return Err(OcError::CoordinateOutOfRange(format!(
            "degrees = {d} beyond 90 for '{dec}'"
        )));
    }
    check_range(m, 0.0, 60.0, "arcminutes", dec)?;
    check_range(s, 0.0, 60.0, "arcseconds", dec)?;
    let value = parse_dec_to_deg(dec)?;
    if value.abs() > 90.0 {
        return Err(OcError::CoordinateOutOfRange(format!(
            "declination {value} beyond the pole for '{dec}'"
        )));
    }
    Ok(value)
}

/// Estimate the accuracy of a numeric string based on its decimal precision.
///
/// Arguments
/// ---------------
/// * `field`: the seconds token (e.g. `"53.640"`)
/// * `factor`: scale applied to one unit of the last digit
fn compute_accuracy(field: &str, factor: f64) -> f64 {
    match field.trim().find('.') {
        Some(dot_pos) => {
            let digits_after_dot = field.trim().len() - dot_pos - 1;
            10f64.powi(-(digits_after_dot as i32)) * factor
        }
        None => factor,
    }
}

/// Precision implied by the seconds token of a right ascension string, in arcseconds.
///
/// One unit of the last printed digit of the seconds of time, scaled by 15
/// (`"11 05 53.640"` → `0.015"`).
pub fn ra_accuracy_arcsec(ra: &str) -> Result<ArcSec, OcError> {
    let [_, _, s] = split_sexagesimal(ra)?;
    Ok(compute_accuracy(s, DEG_PER_HOUR))
}

/// Precision implied by the seconds token of a declination string, in arcseconds
/// (`"+05 24 55.44"` → `0.01"`).
pub fn dec_accuracy_arcsec(dec: &str) -> Result<ArcSec, OcError> {
    let [_, _, s] = split_sexagesimal(dec)?;
    Ok(compute_accuracy(s, 1.0))
}

/// Decompose a right ascension into hours, minutes and seconds rounded at `prec` decimals.
///
/// Rounding is done on the total number of seconds so that the carry propagates to
/// minutes and hours; `24h` wraps to `0h`. Negative or over-wound inputs are reduced to one
/// winding first.
///
/// Arguments
/// -----------------
/// * `ra_deg`: right ascension in degrees
/// * `prec`: fractional digits kept on the seconds, at most [`MAX_SECONDS_PRECISION`]
///
/// Return
/// ----------
/// * `(hours, minutes, seconds)`
pub fn ra_hms_prec(ra_deg: Degree, prec: usize) -> (u32, u32, f64) {
    let prec = prec.min(MAX_SECONDS_PRECISION);
    let scale = 10u64.pow(prec as u32);
    let day_units = 24 * 3600 * scale;

    let hours = (ra_deg / DEG_PER_HOUR).rem_euclid(24.0);
    let total = ((hours * SECONDS_PER_UNIT * scale as f64).round() as u64) % day_units;

    let h = total / (3600 * scale);
    let m = (total % (3600 * scale)) / (60 * scale);
    let s = (total % (60 * scale)) as f64 / scale as f64;
    (h as u32, m as u32, s)
}

/// Decompose a declination into sign, degrees, arcminutes and arcseconds rounded at `prec`
/// decimals.
///
/// The sign is `'-'` only when the rounded magnitude is non-zero and the input is negative,
/// so that `-0.0000001°` renders as `+00 00 00.00`. `prec` is clamped to
/// [`MAX_SECONDS_PRECISION`].
///
/// Return
/// ----------
/// * `(sign, degrees, arcminutes, arcseconds)`
pub fn dec_sdms_prec(dec_deg: Degree, prec: usize) -> (char, u32, u32, f64) {
    let prec = prec.min(MAX_SECONDS_PRECISION);
    let scale = 10u64.pow(prec as u32);
    let total = (dec_deg.abs() * ARCSEC_PER_DEG * scale as f64).round() as u64;

    let sign = if dec_deg < 0.0 && total > 0 { '-' } else { '+' };
    let d = total / (3600 * scale);
    let m = (total % (3600 * scale)) / (60 * scale);
    let s = (total % (60 * scale)) as f64 / scale as f64;
    (sign, d as u32, m as u32, s)
}

/// Seconds string with a two-digit integer part: `"05.250"` for `5.25` at 3 decimals.
pub(crate) fn fmt_ss(seconds: f64, prec: usize) -> String {
    let width = if prec == 0 { 2 } else { prec + 3 };
    format!("{seconds:0width$.prec$}")
}

/// Render a right ascension with a chosen precision and separator.
pub fn format_ra_with(ra_deg: Degree, prec: usize, style: SexagesimalStyle) -> String {
    let prec = prec.min(MAX_SECONDS_PRECISION);
    let (h, m, s) = ra_hms_prec(ra_deg, prec);
    let sep = style.separator();
    format!("{h:02}{sep}{m:02}{sep}{}", fmt_ss(s, prec))
}

/// Render a declination with a chosen precision and separator.
pub fn format_dec_with(dec_deg: Degree, prec: usize, style: SexagesimalStyle) -> String {
    let prec = prec.min(MAX_SECONDS_PRECISION);
    let (sign, d, m, s) = dec_sdms_prec(dec_deg, prec);
    let sep = style.separator();
    format!("{sign}{d:02}{sep}{m:02}{sep}{}", fmt_ss(s, prec))
}

/// Render a right ascension as `HH MM SS.sss`.
pub fn format_ra(ra_deg: Degree) -> String {
    format_ra_with(ra_deg, 3, SexagesimalStyle::Spaces)
}

/// Render a declination as `±DD MM SS.ss`.
pub fn format_dec(dec_deg: Degree) -> String {
    format_dec_with(dec_deg, 2, SexagesimalStyle::Spaces)
}

#[cfg(test)]
mod conversion_test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn test_ra_to_deg() {
        assert_abs_diff_eq!(parse_ra_to_deg("22 52 23.37").unwrap(), 343.097375, epsilon = 1e-9);
        assert_abs_diff_eq!(
            parse_ra_to_deg("23 58 57.68").unwrap(),
            359.7403333333333,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(parse_ra_to_deg("04 41 04.77").unwrap(), 70.269875, epsilon = 1e-9);
        assert_abs_diff_eq!(
            parse_ra_to_deg("11:05:53.640").unwrap(),
            parse_ra_to_deg("11 05 53.640").unwrap(),
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            parse_ra_to_deg(" 11: 05  53.640 ").unwrap(),
            166.4735,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_ra_malformed() {
        assert_eq!(
            parse_ra_to_deg("11 05"),
            Err(OcError::InvalidSexagesimal("11 05".into()))
        );
        assert!(parse_ra_to_deg("1 2 3.4.5").is_err());
        assert!(parse_ra_to_deg("1 2 3 4").is_err());
        assert!(parse_ra_to_deg("").is_err());
        assert!(parse_ra_to_deg("xx 05 53.6").is_err());
        assert!(parse_ra_to_deg("11 05 NaN").is_err());
    }

    #[test]
    fn test_dec_to_deg() {
        assert_abs_diff_eq!(
            parse_dec_to_deg("-00 30 14.2").unwrap(),
            -0.5039444444444444,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            parse_dec_to_deg("+13 55 42.7").unwrap(),
            13.928527777777777,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            parse_dec_to_deg("89 15 50.2").unwrap(),
            89.26394444444445,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            parse_dec_to_deg("-14:47:05.4").unwrap(),
            -14.784833333333333,
            epsilon = 1e-12
        );
        assert!(parse_dec_to_deg("89 15 50.2.3").is_err());
        assert!(parse_dec_to_deg("89 15").is_err());
    }

    #[test]
    fn test_dec_unsigned_is_north() {
        assert_eq!(
            parse_dec_to_deg("05 24 55.44").unwrap(),
            parse_dec_to_deg("+05 24 55.44").unwrap()
        );
        assert!(parse_dec_to_deg("-05 24 55.44").unwrap() < 0.0);
    }

    #[test]
    fn test_strict_parsers() {
        assert!(parse_ra_strict("23 59 59.999").is_ok());
        assert!(matches!(
            parse_ra_strict("24 00 00.0"),
            Err(OcError::CoordinateOutOfRange(_))
        ));
        assert!(matches!(
            parse_ra_strict("11 75 00.0"),
            Err(OcError::CoordinateOutOfRange(_))
        ));
        // the permissive parser folds the same input
        assert_abs_diff_eq!(parse_ra_to_deg("11 75 00.0").unwrap(), 183.75, epsilon = 1e-9);

        assert!(parse_dec_strict("-90 00 00.0").is_ok());
        assert!(matches!(
            parse_dec_strict("+90 00 01.0"),
            Err(OcError::CoordinateOutOfRange(_))
        ));
        assert!(matches!(
            parse_dec_strict("+45 60 00.0"),
            Err(OcError::CoordinateOutOfRange(_))
        ));
        assert!(matches!(
            parse_dec_strict("+45 00"),
            Err(OcError::InvalidSexagesimal(_))
        ));
    }

    #[test]
    fn test_accuracy() {
        assert_abs_diff_eq!(ra_accuracy_arcsec("11 05 53.640").unwrap(), 0.015, epsilon = 1e-12);
        assert_abs_diff_eq!(ra_accuracy_arcsec("11 05 53.64").unwrap(), 0.15, epsilon = 1e-12);
        assert_abs_diff_eq!(dec_accuracy_arcsec("+05 24 55.44").unwrap(), 0.01, epsilon = 1e-12);
        assert_abs_diff_eq!(dec_accuracy_arcsec("+05 24 55").unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_format() {
        assert_eq!(format_ra(166.4735), "11 05 53.640");
        assert_eq!(format_dec(5.415400), "+05 24 55.44");
        assert_eq!(format_dec(-0.5039444444444444), "-00 30 14.20");
        assert_eq!(
            format_ra_with(166.4735, 2, SexagesimalStyle::Colons),
            "11:05:53.64"
        );
        assert_eq!(
            format_dec_with(-14.784833333333333, 1, SexagesimalStyle::Colons),
            "-14:47:05.4"
        );
    }

    #[test]
    fn test_format_carry() {
        // 59.9996 s rounds to the next minute
        let ra = (11.0 + 5.0 / 60.0 + 59.9996 / 3600.0) * 15.0;
        assert_eq!(format_ra(ra), "11 06 00.000");

        // rounding up to 24h wraps to 0h
        assert_eq!(format_ra(359.9999999), "00 00 00.000");

        let dec = 10.0 + 59.0 / 60.0 + 59.999 / 3600.0;
        assert_eq!(format_dec(dec), "+11 00 00.00");

        assert_eq!(format_dec(-0.0000001), "+00 00 00.00");
    }

    #[test]
    fn test_hms_decomposition() {
        assert_eq!(ra_hms_prec(166.4735, 3), (11, 5, 53.64));
        assert_eq!(ra_hms_prec(-15.0, 0), (23, 0, 0.0));
        assert_eq!(dec_sdms_prec(-14.784833333333333, 1), ('-', 14, 47, 5.4));
    }

    #[test]
    fn test_precision_is_clamped() {
        assert_eq!(
            format_ra_with(166.4735, 15, SexagesimalStyle::Spaces),
            "11 05 53.640000000"
        );
        assert_eq!(
            format_dec_with(5.4154, 20, SexagesimalStyle::Spaces),
            "+05 24 55.440000000"
        );
        assert_eq!(ra_hms_prec(166.4735, usize::MAX), ra_hms_prec(166.4735, 9));
        assert_eq!(dec_sdms_prec(-89.5, 64), dec_sdms_prec(-89.5, 9));
    }

    fn angular_gap_deg(a: f64, b: f64) -> f64 {
        let d = (a - b).rem_euclid(360.0);
        d.min(360.0 - d)
    }

    proptest! {
        #[test]
        fn prop_ra_round_trip(ra in 0.0..360.0f64) {
            let back = parse_ra_to_deg(&format_ra(ra)).unwrap();
            // half a unit of the last printed digit (0.001 s of time) plus float noise
            prop_assert!(angular_gap_deg(ra, back) <= 0.0005 * 15.0 / 3600.0 + 1e-9);
        }

        #[test]
        fn prop_dec_round_trip(dec in -90.0..=90.0f64) {
            let back = parse_dec_to_deg(&format_dec(dec)).unwrap();
            prop_assert!((dec - back).abs() <= 0.005 / 3600.0 + 1e-9);
        }

        #[test]
        fn prop_parsed_ra_in_one_winding(h in 0u32..24, m in 0u32..60, s in 0.0..59.999f64) {
            let ra = parse_ra_to_deg(&format!("{h:02} {m:02} {s:06.3}")).unwrap();
            prop_assert!((0.0..360.0).contains(&ra));
        }
    }
}
