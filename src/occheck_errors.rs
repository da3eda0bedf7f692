use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcError {
    #[error("Invalid sexagesimal coordinate: {0}")]
    InvalidSexagesimal(String),

    #[error("Sexagesimal coordinate out of range: {0}")]
    CoordinateOutOfRange(String),

    #[error("No ephemeris data: start marker not found in the response")]
    NoEphemerisData,

    #[error("Ephemeris payload is empty: no data line between the markers")]
    EmptyEphemeris,

    #[error("Insufficient fields in ephemeris line ({found} found, {required} required): {line}")]
    InsufficientFields {
        found: usize,
        required: usize,
        line: String,
    },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid observation line: {0}")]
    InvalidObservationLine(String),

    #[error("Horizons API request failed with status {status}: {body}")]
    HorizonsHttpStatus { status: u16, body: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("HTTP reqwest error: {0}")]
    ReqwestError(#[from] reqwest::Error),
}

impl PartialEq for OcError {
    fn eq(&self, other: &Self) -> bool {
        use OcError::*;
        match (self, other) {
            (InvalidSexagesimal(a), InvalidSexagesimal(b)) => a == b,
            (CoordinateOutOfRange(a), CoordinateOutOfRange(b)) => a == b,
            (
                InsufficientFields {
                    found: fa,
                    required: ra,
                    line: la,
                },
                InsufficientFields {
                    found: fb,
                    required: rb,
                    line: lb,
                },
            ) => fa == fb && ra == rb && la == lb,
            (InvalidTimestamp(a), InvalidTimestamp(b)) => a == b,
            (InvalidObservationLine(a), InvalidObservationLine(b)) => a == b,
            (
                HorizonsHttpStatus {
                    status: sa,
                    body: ba,
                },
                HorizonsHttpStatus {
                    status: sb,
                    body: bb,
                },
            ) => sa == sb && ba == bb,
            (InvalidConfiguration(a), InvalidConfiguration(b)) => a == b,

            // foreign payloads are not comparable: same variant is enough
            (IoError(_), IoError(_)) => true,
            (CsvError(_), CsvError(_)) => true,
            (ReqwestError(_), ReqwestError(_)) => true,

            (NoEphemerisData, NoEphemerisData) => true,
            (EmptyEphemeris, EmptyEphemeris) => true,

            _ => false,
        }
    }
}
