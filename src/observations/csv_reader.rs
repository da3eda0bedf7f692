//! CSV observation logs.
//!
//! Header `timestamp,observatory,obs_ra,obs_dec`; surrounding whitespace of every field is
//! trimmed.
use std::io;

use camino::Utf8Path;

use crate::occheck_errors::OcError;

use super::ObservedRecord;

/// Deserialize observed records from any reader.
pub fn read_observations<R: io::Read>(reader: R) -> Result<Vec<ObservedRecord>, OcError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv_reader
        .deserialize::<ObservedRecord>()
        .map(|row| row.map_err(OcError::from))
        .collect()
}

/// Read an observation CSV file.
///
/// Arguments
/// ---------
/// * `path`: file with a `timestamp,observatory,obs_ra,obs_dec` header
///
/// Return
/// ------
/// * the records in file order, [`OcError::IoError`] if the file cannot be opened,
///   [`OcError::CsvError`] on the first malformed row
pub fn read_observations_csv(path: &Utf8Path) -> Result<Vec<ObservedRecord>, OcError> {
    let file = std::fs::File::open(path)?;
    read_observations(file)
}

/// Serialize records with the same header the reader expects.
pub fn write_observations<W: io::Write>(
    writer: W,
    records: &[ObservedRecord],
) -> Result<(), OcError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_observations_csv(path: &Utf8Path, records: &[ObservedRecord]) -> Result<(), OcError> {
    let file = std::fs::File::create(path)?;
    write_observations(file, records)
}
