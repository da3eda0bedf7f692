use approx::assert_abs_diff_eq;
use camino::Utf8PathBuf;
use occheck::{residuals::Residual, OcError};

pub fn fixture(name: &str) -> Utf8PathBuf {
    Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

pub fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture(name))
        .unwrap_or_else(|e| panic!("cannot read fixture {name}: {e}"))
}

/// Ephemeris source answering from the payload of the Horizons fixture: the data line whose
/// time token matches the requested time is wrapped in its own `$$SOE`/`$$EOE` block.
pub fn fixture_source(timestamp: &str, _code: &str) -> Result<String, OcError> {
    let text = read_fixture("horizons_c2025n1_g96.txt");
    let time = timestamp.split_whitespace().nth(1).unwrap_or_default();
    let line = text
        .lines()
        .skip_while(|l| !l.contains("$$SOE"))
        .find(|l| l.split_whitespace().nth(1) == Some(time))
        .ok_or(OcError::NoEphemerisData)?;
    Ok(format!("$$SOE\n{line}\n$$EOE\n"))
}

pub fn assert_residual_close(
    actual: &Residual,
    delta_ra: f64,
    delta_dec: f64,
    total: f64,
    epsilon: f64,
) {
    assert_abs_diff_eq!(actual.delta_ra_arcsec, delta_ra, epsilon = epsilon);
    assert_abs_diff_eq!(actual.delta_dec_arcsec, delta_dec, epsilon = epsilon);
    assert_abs_diff_eq!(actual.total_separation_arcsec, total, epsilon = epsilon);
}
