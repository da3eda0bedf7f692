//! Observed-minus-calculated residuals of astrometric positions against JPL Horizons
//! ephemerides, with a 3-σ significance verdict per observation.
pub mod batch;
pub mod constants;
pub mod conversion;
pub mod display;
pub mod ephemeris;
pub mod horizons;
pub mod observations;
pub mod occheck_errors;
pub mod params;
pub mod position;
pub mod residuals;
pub mod time;

pub use batch::{compare_pairs, compare_with_source, ComparisonReport, ComparisonRow, TierCounts};
pub use ephemeris::{parse_ephemeris, parse_ephemeris_rows, EphemerisRecord};
pub use horizons::client::EphemerisSource;
pub use observations::ObservedRecord;
pub use occheck_errors::OcError;
pub use params::OcParams;
pub use position::Position;
pub use residuals::{compute_residual, Residual, Verdict};
