//! # JPL Horizons requests
//!
//! [`HorizonsQuery`] assembles the parameters of a single-epoch observer-table request to the
//! Horizons API; [`client`] sends it.
//!
//! The defaults ask for astrometric RA/Dec, apparent rates and the 3-σ uncertainty columns
//! (`QUANTITIES='1,3,36,37'`), which is the layout of
//! [`FieldTemplate::horizons_default`](crate::ephemeris::field_template::FieldTemplate::horizons_default).
pub mod client;

use crate::{constants::MpcCode, occheck_errors::OcError};

pub const DEFAULT_QUANTITIES: &str = "1,3,36,37";

/// Parameters of one Horizons observer-table request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HorizonsQuery {
    /// Horizons target designation (`C/2025 N1`, `DES=1000351;`, ...)
    pub command: String,
    pub observatory_code: Option<MpcCode>,
    /// UT epoch, `YYYY-MM-DD HH:MM:SS[.sss]`
    pub timestamp: Option<String>,
    pub quantities: String,
    pub object_data: bool,
    pub extra_precision: bool,
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "'YES'"
    } else {
        "'NO'"
    }
}

impl HorizonsQuery {
    pub fn new(command: impl Into<String>) -> Self {
        HorizonsQuery {
            command: command.into(),
            observatory_code: None,
            timestamp: None,
            quantities: DEFAULT_QUANTITIES.to_string(),
            object_data: true,
            extra_precision: true,
        }
    }

    pub fn site(mut self, observatory_code: impl Into<MpcCode>) -> Self {
        self.observatory_code = Some(observatory_code.into());
        self
    }

    pub fn epoch(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn quantities(mut self, quantities: impl Into<String>) -> Self {
        self.quantities = quantities.into();
        self
    }

    pub fn object_data(mut self, v: bool) -> Self {
        self.object_data = v;
        self
    }

    pub fn extra_precision(mut self, v: bool) -> Self {
        self.extra_precision = v;
        self
    }

    /// Same target and options at another site and epoch.
    pub fn at(&self, timestamp: &str, observatory_code: &str) -> Self {
        self.clone().epoch(timestamp).site(observatory_code)
    }

    /// `CENTER` value: the site code prefixed with `@` unless it already names a body.
    fn center(code: &str) -> String {
        if code.contains('@') {
            format!("'{code}'")
        } else {
            format!("'@{code}'")
        }
    }

    /// Query-string pairs of the request.
    ///
    /// Errors
    /// ------
    /// * [`OcError::InvalidConfiguration`] when the command is blank or the site or the epoch
    ///   is missing
    pub fn to_params(&self) -> Result<Vec<(&'static str, String)>, OcError> {
        let command = self.command.trim();
        if command.is_empty() {
            return Err(OcError::InvalidConfiguration(
                "Horizons query without COMMAND".into(),
            ));
        }
        let site = self
            .observatory_code
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| OcError::InvalidConfiguration("Horizons query without site".into()))?;
        let timestamp = self
            .timestamp
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| OcError::InvalidConfiguration("Horizons query without epoch".into()))?;

        Ok(vec![
            ("format", "text".to_string()),
            ("COMMAND", format!("'{command}'")),
            ("OBJ_DATA", yes_no(self.object_data).to_string()),
            ("MAKE_EPHEM", "'YES'".to_string()),
            ("EPHEM_TYPE", "'OBSERVER'".to_string()),
            ("CENTER", Self::center(site.trim())),
            ("TLIST", format!("'{}'", timestamp.trim())),
            ("QUANTITIES", format!("'{}'", self.quantities)),
            ("TIME_DIGITS", "'SECONDS'".to_string()),
            ("EXTRA_PREC", yes_no(self.extra_precision).to_string()),
            ("CSV_FORMAT", "'NO'".to_string()),
        ])
    }
}
