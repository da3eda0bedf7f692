//! # Observed positions
//!
//! Measured positions handed to the comparison, as supplied by an observation log or an
//! MPEC listing: a UT timestamp, an MPC observatory code and the sexagesimal coordinates
//! exactly as reported.
//!
//! ## Readers
//!
//! - [`csv_reader`] – `timestamp,observatory,obs_ra,obs_dec` files (read and write).
//! - [`mpec_reader`] – tab-separated MPEC observation listings.
pub mod csv_reader;
pub mod mpec_reader;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{constants::MpcCode, occheck_errors::OcError, position::Position};

/// One observed position.
///
/// Coordinates are kept as text so that the reported precision survives until display;
/// [`ObservedRecord::position`] parses them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedRecord {
    /// UT, `YYYY-MM-DD HH:MM:SS[.sss]`
    pub timestamp: String,
    #[serde(rename = "observatory")]
    pub observatory_code: MpcCode,
    #[serde(rename = "obs_ra")]
    pub ra: String,
    #[serde(rename = "obs_dec")]
    pub dec: String,
}

impl ObservedRecord {
    pub fn new(
        timestamp: impl Into<String>,
        observatory_code: impl Into<MpcCode>,
        ra: impl Into<String>,
        dec: impl Into<String>,
    ) -> Self {
        ObservedRecord {
            timestamp: timestamp.into(),
            observatory_code: observatory_code.into(),
            ra: ra.into(),
            dec: dec.into(),
        }
    }

    pub fn position(&self) -> Result<Position, OcError> {
        Position::from_sexagesimal(&self.ra, &self.dec)
    }
}

/// Number of records per observatory, sorted by code.
pub fn count_by_observatory(records: &[ObservedRecord]) -> Vec<(MpcCode, usize)> {
    records
        .iter()
        .map(|r| r.observatory_code.clone())
        .counts()
        .into_iter()
        .sorted()
        .collect()
}
