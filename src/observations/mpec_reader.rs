//! # MPEC observation listings
//!
//! Tab-separated lines as copied from a Minor Planet Electronic Circular observation table:
//!
//! ```text
//! 2025 12 20.006169<TAB>10 42 32.822<TAB>+07 23 50.46<TAB>13.3 R<TAB>C23 – Olmen<TAB>MPEC Y151
//! └─ date (UTC) ──┘     └─ RA ──────┘     └─ Dec ─────┘     └mag┘    └─ code – name ─┘
//! ```
//!
//! Lines with fewer than six tab-separated fields, or whose first field does not start with a
//! digit, are skipped (titles, column headers, blank lines).
//! The fractional date is converted with [`frac_date_to_ut_timestamp`], the observatory code
//! is the first word of the fifth field.
use camino::Utf8Path;

use crate::{occheck_errors::OcError, time::frac_date_to_ut_timestamp};

use super::ObservedRecord;

const MPEC_FIELDS: usize = 6;

/// One row of an MPEC listing.
#[derive(Debug, Clone, PartialEq)]
pub struct MpecEntry {
    pub record: ObservedRecord,
    pub magnitude: Option<f64>,
    pub band: Option<String>,
    pub observatory_name: Option<String>,
    pub reference: String,
}

/// Parse one listing line.
///
/// Return
/// ------
/// * `Ok(None)` for lines with fewer than six tab fields or without a leading date
/// * [`OcError::InvalidObservationLine`] when the date or the code cannot be read
pub fn parse_mpec_line(line: &str) -> Result<Option<MpecEntry>, OcError> {
    let parts: Vec<&str> = line.split('\t').map(str::trim).collect();
    if parts.len() < MPEC_FIELDS || !parts[0].starts_with(|c: char| c.is_ascii_digit()) {
        return Ok(None);
    }

    let timestamp = frac_date_to_ut_timestamp(parts[0])
        .map_err(|e| OcError::InvalidObservationLine(format!("{e}: {line}")))?;

    let mut site = parts[4].split_whitespace();
    let code = site
        .next()
        .ok_or_else(|| OcError::InvalidObservationLine(format!("missing observatory: {line}")))?;
    let name = parts[4]
        .split_once(['–', '-'])
        .map(|(_, name)| name.trim().to_string())
        .filter(|name| !name.is_empty());

    let mut photometry = parts[3].split_whitespace();
    let magnitude = photometry.next().and_then(|m| m.parse::<f64>().ok());
    let band = photometry.next().map(str::to_string);

    Ok(Some(MpecEntry {
        record: ObservedRecord::new(timestamp, code, parts[1], parts[2]),
        magnitude,
        band,
        observatory_name: name,
        reference: parts[5].to_string(),
    }))
}

/// Parse a whole listing; the first unreadable data line is an error.
pub fn parse_mpec_listing(text: &str) -> Result<Vec<MpecEntry>, OcError> {
    text.lines()
        .filter_map(|line| parse_mpec_line(line).transpose())
        .collect()
}

/// Read a listing from disk and keep the observed records only.
pub fn read_mpec_file(path: &Utf8Path) -> Result<Vec<ObservedRecord>, OcError> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_mpec_listing(&text)?
        .into_iter()
        .map(|entry| entry.record)
        .collect())
}
