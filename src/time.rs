use std::sync::LazyLock;

use hifitime::{Epoch, TimeScale, Unit};
use regex::Regex;

use crate::{constants::SECONDS_PER_DAY, occheck_errors::OcError};

static UT_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\d{4})-(\d{1,2}|[A-Za-z]{3})-(\d{1,2})[ T](\d{1,2}):(\d{2})(?::(\d{2}(?:\.\d+)?))?(?:\s*UTC?)?$",
    )
    .expect("UT timestamp regex is valid")
});

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

fn month_number(token: &str) -> Option<u8> {
    if let Ok(m) = token.parse::<u8>() {
        return Some(m);
    }
    let lower = token.to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == lower)
        .map(|idx| idx as u8 + 1)
}

/// Transformation from a date in the MPC format `YYYY MM DD.FFFFFF` (UTC) to a UTC [`Epoch`].
///
/// Argument
/// --------
/// * `date_str`: a string representing the date in the format `YYYY MM DD.FFFFFF`
///
/// Return
/// ------
/// * the epoch, rounded to the millisecond, or [`OcError::InvalidTimestamp`]
pub fn frac_date_to_epoch(date_str: &str) -> Result<Epoch, OcError> {
    let invalid = || OcError::InvalidTimestamp(date_str.to_string());

    let parts: Vec<&str> = date_str.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(invalid());
    }

    let year: i32 = parts[0].parse().map_err(|_| invalid())?;
    let month: u8 = parts[1].parse().map_err(|_| invalid())?;
    let day_fraction: f64 = parts[2].parse().map_err(|_| invalid())?;
    if !day_fraction.is_finite() || day_fraction < 1.0 {
        return Err(invalid());
    }

    let day = day_fraction.trunc() as u8;
    let millis = ((day_fraction - day_fraction.trunc()) * SECONDS_PER_DAY * 1000.0).round() as i64;

    let midnight = Epoch::maybe_from_gregorian(year, month, day, 0, 0, 0, 0, TimeScale::UTC)
        .map_err(|e| OcError::InvalidTimestamp(format!("{date_str}: {e}")))?;

    Ok(midnight + Unit::Millisecond * millis)
}

/// Render an epoch as a UT timestamp `YYYY-MM-DD HH:MM:SS.sss`, the form accepted by the
/// Horizons `TLIST` parameter.
pub fn format_ut_timestamp(epoch: &Epoch) -> String {
    let (y, m, d, hh, mm, ss, ns) = epoch.to_gregorian_utc();
    let millis = ns / 1_000_000;
    format!("{y:04}-{m:02}-{d:02} {hh:02}:{mm:02}:{ss:02}.{millis:03}")
}

/// Convert an MPC fractional date (`2025 12 19.056713`) to a UT timestamp
/// (`2025-12-19 01:21:40.003`).
///
/// Day roll-over from rounding is handled (`31.99999999999` becomes midnight of the next day).
pub fn frac_date_to_ut_timestamp(date_str: &str) -> Result<String, OcError> {
    frac_date_to_epoch(date_str).map(|epoch| format_ut_timestamp(&epoch))
}

/// Parse a UT timestamp as written in observation logs or Horizons data lines.
///
/// Accepted forms
/// -----------------
/// * `2025-12-19 01:21:40`, `2025-12-19T01:21:40.003`
/// * `2025-Dec-19 01:21:40.000` (Horizons calendar dates)
/// * `2025-12-19 01:21` (seconds omitted)
///
/// A trailing `UT` / `UTC` is tolerated.
pub fn parse_ut_timestamp(text: &str) -> Result<Epoch, OcError> {
    let invalid = || OcError::InvalidTimestamp(text.to_string());
    let caps = UT_TIMESTAMP.captures(text.trim()).ok_or_else(invalid)?;

    let year: i32 = caps[1].parse().map_err(|_| invalid())?;
    let month = month_number(&caps[2]).ok_or_else(invalid)?;
    let day: u8 = caps[3].parse().map_err(|_| invalid())?;
    let hour: u8 = caps[4].parse().map_err(|_| invalid())?;
    let minute: u8 = caps[5].parse().map_err(|_| invalid())?;
    let seconds: f64 = match caps.get(6) {
        Some(s) => s.as_str().parse().map_err(|_| invalid())?,
        None => 0.0,
    };
    let nanos = ((seconds - seconds.trunc()) * 1e9).round() as u32;

    Epoch::maybe_from_gregorian(
        year,
        month,
        day,
        hour,
        minute,
        seconds.trunc() as u8,
        nanos.min(999_999_999),
        TimeScale::UTC,
    )
    .map_err(|e| OcError::InvalidTimestamp(format!("{text}: {e}")))
}
