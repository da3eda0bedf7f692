//! # Ephemeris record parser
//!
//! Extraction of predicted positions from the text answer of the JPL Horizons API
//! (`format=text`, observer table).
//!
//! ## Overview
//!
//! A response is a free-text header followed by a payload delimited by the
//! [`START_OF_EPHEMERIS`] and [`END_OF_EPHEMERIS`] markers. Each non-blank payload line is
//! split on whitespace and read as:
//!
//! ```text
//! 2025-Dec-19 01:21:40.000 [flags] 11 05 53.5012 +05 24 55.003 [trailing columns ...]
//! └─ date ──┘ └─ time ───┘         └─ RA ──────┘ └─ Dec ─────┘
//! ```
//!
//! 1. Date, time, RA triplet and Dec triplet are fixed (8 tokens, otherwise
//!    [`OcError::InsufficientFields`]). Solar/lunar presence flags printed between the time
//!    and the RA are skipped when [`OcParams::skip_presence_flags`] is set.
//! 2. Trailing columns are read with a [`FieldTemplate`] anchored from the end of the line.
//!    The record uncertainty comes from the template rule and is tagged
//!    [`UncertaintySource::Template`].
//! 3. When the template cannot be applied (too few trailing tokens, or the uncertainty column
//!    is `n.a.`), the band heuristic of [`uncertainty::heuristic_uncertainty`] is tried and
//!    its result is tagged [`UncertaintySource::Heuristic`].
//!
//! A missing start marker is [`OcError::NoEphemerisData`]; a payload without any data line is
//! [`OcError::EmptyEphemeris`]. When the end marker is missing, the payload runs to the end of
//! the text.
//!
//! ## See also
//! ------------
//! * [`crate::horizons`] – Builds the request producing this text.
//! * [`crate::residuals`] – Consumes the parsed [`EphemerisRecord`].
pub mod field_template;
pub mod uncertainty;

use std::sync::LazyLock;

use hifitime::Epoch;
use regex::Regex;

use crate::{
    constants::{
        ArcSec, MpcCode, END_OF_EPHEMERIS, LEADING_FIELDS, PRESENCE_FLAG_CHARS,
        START_OF_EPHEMERIS,
    },
    occheck_errors::OcError,
    params::OcParams,
    position::Position,
    time::parse_ut_timestamp,
};

use field_template::{EphemerisFields, FieldTemplate};
use uncertainty::{heuristic_uncertainty, UncertaintyBand, UncertaintySource};

static EPOCH_JD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{7}\.\d+)").expect("epoch regex is valid"));

/// Metadata read from the free-text header of a Horizons response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EphemerisHeader {
    /// Orbit solution label (`JPL#44`, `SPK-based ...`).
    pub solution: Option<String>,
    /// Epoch of the osculating elements, Julian date.
    pub epoch_jd: Option<f64>,
    /// Target designation as echoed by Horizons.
    pub target: Option<String>,
}

impl EphemerisHeader {
    /// Scan the text that precedes the payload. The first matching line wins for each field.
    pub fn from_text(text: &str) -> Self {
        let mut header = EphemerisHeader::default();

        for line in text.lines() {
            if line.contains(START_OF_EPHEMERIS) {
                break;
            }

            if header.target.is_none() {
                if let Some((_, rest)) = line.split_once("Target body name:") {
                    let name = rest.split('{').next().unwrap_or(rest).trim();
                    if !name.is_empty() {
                        header.target = Some(name.to_string());
                    }
                }
            }

            if header.solution.is_none()
                && (line.contains("Solution name") || line.contains("SPK"))
            {
                if let Some((_, value)) = line.split_once(':') {
                    let value = value.trim();
                    if !value.is_empty() {
                        header.solution = Some(value.to_string());
                    }
                }
            }

            if header.epoch_jd.is_none() && line.contains("Epoch") {
                header.epoch_jd = EPOCH_JD
                    .captures(line)
                    .and_then(|c| c[1].parse::<f64>().ok());
            }
        }

        header
    }
}

/// One predicted position, built from one data line.
#[derive(Debug, Clone, PartialEq)]
pub struct EphemerisRecord {
    /// UT date and time as printed by Horizons (`2025-Dec-19 01:21:40.000`).
    pub timestamp: String,
    pub observatory_code: MpcCode,
    pub position: Position,
    /// 3-σ positional uncertainty, arcseconds.
    pub uncertainty_arcsec: Option<ArcSec>,
    pub uncertainty_source: UncertaintySource,
    pub fields: EphemerisFields,
}

impl EphemerisRecord {
    /// Timestamp as a UTC epoch.
    pub fn epoch(&self) -> Result<Epoch, OcError> {
        parse_ut_timestamp(&self.timestamp)
    }

    /// `true` unless the uncertainty comes from a template column.
    pub fn is_low_confidence(&self) -> bool {
        self.uncertainty_source.is_low_confidence()
    }
}

/// Parsed Horizons response.
#[derive(Debug, Clone, PartialEq)]
pub struct Ephemeris {
    pub header: EphemerisHeader,
    pub records: Vec<EphemerisRecord>,
}

impl Ephemeris {
    pub fn first(&self) -> Option<&EphemerisRecord> {
        self.records.first()
    }
}

/// Non-blank lines between the start and end markers.
///
/// Return
/// ------
/// * the payload lines, possibly empty, or [`OcError::NoEphemerisData`] when the start marker
///   is missing
pub fn extract_payload(text: &str) -> Result<Vec<&str>, OcError> {
    let mut lines = text.lines();

    if !lines.any(|l| l.contains(START_OF_EPHEMERIS)) {
        return Err(OcError::NoEphemerisData);
    }

    Ok(lines
        .take_while(|l| !l.contains(END_OF_EPHEMERIS))
        .filter(|l| !l.trim().is_empty())
        .collect())
}

fn is_presence_flag(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| PRESENCE_FLAG_CHARS.contains(&c))
}

/// Data-line parser holding the template, the heuristic band and the coordinate policy.
#[derive(Debug, Clone, PartialEq)]
pub struct EphemerisParser {
    pub template: FieldTemplate,
    pub band: UncertaintyBand,
    pub skip_presence_flags: bool,
    pub strict_coordinates: bool,
}

impl Default for EphemerisParser {
    fn default() -> Self {
        EphemerisParser::from_params(&OcParams::default())
    }
}

impl EphemerisParser {
    pub fn from_params(params: &OcParams) -> Self {
        EphemerisParser {
            template: params.field_template.clone(),
            band: params.uncertainty_band,
            skip_presence_flags: params.skip_presence_flags,
            strict_coordinates: params.strict_coordinates,
        }
    }

    /// Parse one payload line.
    ///
    /// Arguments
    /// ---------
    /// * `line`: a data line of the observer table
    /// * `observatory_code`: site the ephemeris was computed for (not printed on the line)
    ///
    /// Return
    /// ------
    /// * the record, [`OcError::InsufficientFields`] when fewer than 8 tokens are left once
    ///   presence flags are skipped, or a codec error on the coordinate triplets
    pub fn parse_data_line(
        &self,
        line: &str,
        observatory_code: &str,
    ) -> Result<EphemerisRecord, OcError> {
        let mut tokens: Vec<&str> = line.split_whitespace().collect();

        if self.skip_presence_flags && tokens.len() > 2 {
            let flags = tokens[2..]
                .iter()
                .take_while(|t| is_presence_flag(t))
                .count();
            tokens.drain(2..2 + flags);
        }

        if tokens.len() < LEADING_FIELDS {
            return Err(OcError::InsufficientFields {
                found: tokens.len(),
                required: LEADING_FIELDS,
                line: line.trim().to_string(),
            });
        }

        let timestamp = format!("{} {}", tokens[0], tokens[1]);
        let ra = tokens[2..5].join(" ");
        let dec = tokens[5..8].join(" ");
        let position = if self.strict_coordinates {
            Position::from_sexagesimal_strict(&ra, &dec)?
        } else {
            Position::from_sexagesimal(&ra, &dec)?
        };

        let trailing = &tokens[LEADING_FIELDS..];
        let fields = self.template.extract(trailing).unwrap_or_default();

        let (uncertainty_arcsec, uncertainty_source) = match self.template.uncertainty(&fields) {
            Some(u) => (Some(u), UncertaintySource::Template),
            None => match heuristic_uncertainty(trailing, &self.band) {
                Some(u) => (Some(u), UncertaintySource::Heuristic),
                None => (None, UncertaintySource::Unavailable),
            },
        };

        Ok(EphemerisRecord {
            timestamp,
            observatory_code: observatory_code.to_string(),
            position,
            uncertainty_arcsec,
            uncertainty_source,
            fields,
        })
    }

    /// Lenient parse: one result per payload line, in order.
    ///
    /// Only the response-level failures ([`OcError::NoEphemerisData`],
    /// [`OcError::EmptyEphemeris`]) are returned as the outer error.
    pub fn parse_rows(
        &self,
        text: &str,
        observatory_code: &str,
    ) -> Result<Vec<Result<EphemerisRecord, OcError>>, OcError> {
        let payload = extract_payload(text)?;
        if payload.is_empty() {
            return Err(OcError::EmptyEphemeris);
        }

        Ok(payload
            .into_iter()
            .map(|line| self.parse_data_line(line, observatory_code))
            .collect())
    }

    /// Strict parse: header plus every payload line, the first malformed line is an error.
    pub fn parse(&self, text: &str, observatory_code: &str) -> Result<Ephemeris, OcError> {
        let records = self
            .parse_rows(text, observatory_code)?
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Ephemeris {
            header: EphemerisHeader::from_text(text),
            records,
        })
    }

    /// First payload line only, the shape of a single-epoch `TLIST` query.
    pub fn parse_first(
        &self,
        text: &str,
        observatory_code: &str,
    ) -> Result<EphemerisRecord, OcError> {
        let payload = extract_payload(text)?;
        let line = payload.first().ok_or(OcError::EmptyEphemeris)?;
        self.parse_data_line(line, observatory_code)
    }
}

/// [`EphemerisParser::parse`] with default parameters.
pub fn parse_ephemeris(text: &str, observatory_code: &str) -> Result<Ephemeris, OcError> {
    EphemerisParser::default().parse(text, observatory_code)
}

/// [`EphemerisParser::parse_rows`] with default parameters.
pub fn parse_ephemeris_rows(
    text: &str,
    observatory_code: &str,
) -> Result<Vec<Result<EphemerisRecord, OcError>>, OcError> {
    EphemerisParser::default().parse_rows(text, observatory_code)
}

/// [`EphemerisParser::parse_data_line`] with default parameters.
pub fn parse_data_line(line: &str, observatory_code: &str) -> Result<EphemerisRecord, OcError> {
    EphemerisParser::default().parse_data_line(line, observatory_code)
}
