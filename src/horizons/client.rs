//! HTTP access to the Horizons API and the [`EphemerisSource`] seam used by the batch
//! aggregator.
use std::{
    cell::Cell,
    time::{Duration, Instant},
};

use log::info;
use tokio::runtime::Runtime;

use crate::occheck_errors::OcError;

use super::HorizonsQuery;

pub const HORIZONS_API_URL: &str = "https://ssd.jpl.nasa.gov/api/horizons.api";

/// Timeout of one Horizons request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Pause between two consecutive requests of a batch.
pub const DEFAULT_COURTESY_DELAY: Duration = Duration::from_millis(500);

/// Anything able to return the raw ephemeris text for one epoch and one site.
///
/// Implemented by [`BlockingHorizons`] for live queries and by any
/// `Fn(&str, &str) -> Result<String, OcError>` closure (fixtures, caches, tests).
pub trait EphemerisSource {
    fn fetch(&self, timestamp: &str, observatory_code: &str) -> Result<String, OcError>;
}

impl<F> EphemerisSource for F
where
    F: Fn(&str, &str) -> Result<String, OcError>,
{
    fn fetch(&self, timestamp: &str, observatory_code: &str) -> Result<String, OcError> {
        self(timestamp, observatory_code)
    }
}

/// Asynchronous Horizons client.
#[derive(Debug, Clone)]
pub struct HorizonsClient {
    http: reqwest::Client,
    base_url: String,
}

impl HorizonsClient {
    /// Client with the [`DEFAULT_TIMEOUT`] against the public API.
    pub fn new() -> Result<Self, OcError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, OcError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(HorizonsClient {
            http,
            base_url: HORIZONS_API_URL.to_string(),
        })
    }

    /// Point the client at another endpoint (mirror, local proxy).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send `query` and return the response body.
    ///
    /// Errors
    /// ------
    /// * [`OcError::InvalidConfiguration`] for an incomplete query
    /// * [`OcError::ReqwestError`] on transport failure or timeout
    /// * [`OcError::HorizonsHttpStatus`] when the status is not `200 OK`
    pub async fn fetch(&self, query: &HorizonsQuery) -> Result<String, OcError> {
        let params = query.to_params()?;
        info!(
            "Horizons request: {} at {} from {}",
            query.command,
            query.timestamp.as_deref().unwrap_or_default(),
            query.observatory_code.as_deref().unwrap_or_default()
        );

        let response = self.http.get(&self.base_url).query(&params).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status != reqwest::StatusCode::OK {
            return Err(OcError::HorizonsHttpStatus {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

/// Synchronous [`EphemerisSource`] driving a [`HorizonsClient`] on a private runtime.
///
/// Consecutive requests are spaced by at least the courtesy delay.
pub struct BlockingHorizons {
    client: HorizonsClient,
    query: HorizonsQuery,
    runtime: Runtime,
    delay: Duration,
    last_request: Cell<Option<Instant>>,
}

impl BlockingHorizons {
    /// Arguments
    /// ---------
    /// * `client`: the HTTP client
    /// * `query`: request prototype; site and epoch are filled in for every fetch
    pub fn new(client: HorizonsClient, query: HorizonsQuery) -> Result<Self, OcError> {
        Ok(BlockingHorizons {
            client,
            query,
            runtime: Runtime::new()?,
            delay: DEFAULT_COURTESY_DELAY,
            last_request: Cell::new(None),
        })
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn pending_delay(&self) -> Duration {
        self.last_request
            .get()
            .map(|t| self.delay.saturating_sub(t.elapsed()))
            .unwrap_or_default()
    }
}

impl EphemerisSource for BlockingHorizons {
    fn fetch(&self, timestamp: &str, observatory_code: &str) -> Result<String, OcError> {
        let query = self.query.at(timestamp, observatory_code);
        let wait = self.pending_delay();

        let result = self.runtime.block_on(async {
            if !wait.is_zero() {
                tokio::time::sleep(wait).await;
            }
            self.client.fetch(&query).await
        });

        self.last_request.set(Some(Instant::now()));
        result
    }
}

#[cfg(test)]
mod client_test {
    use super::*;

    #[test]
    fn test_closure_source() {
        let source = |ts: &str, code: &str| -> Result<String, OcError> {
            Ok(format!("{code}@{ts}"))
        };
        assert_eq!(source.fetch("2025-12-19", "G96").unwrap(), "G96@2025-12-19");
    }

    #[tokio::test]
    async fn test_incomplete_query_is_rejected_before_sending() {
        let client = HorizonsClient::new().unwrap();
        let res = client.fetch(&HorizonsQuery::new("C/2025 N1")).await;
        assert!(matches!(res, Err(OcError::InvalidConfiguration(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let client = HorizonsClient::with_timeout(Duration::from_secs(2))
            .unwrap()
            .with_base_url("http://127.0.0.1:9/api/horizons.api");
        let query = HorizonsQuery::new("C/2025 N1").at("2025-12-19 01:21:40", "G96");
        assert!(matches!(
            client.fetch(&query).await,
            Err(OcError::ReqwestError(_))
        ));
    }

    #[test]
    fn test_blocking_delay() {
        let source = BlockingHorizons::new(
            HorizonsClient::new().unwrap(),
            HorizonsQuery::new("C/2025 N1"),
        )
        .unwrap()
        .with_delay(Duration::from_secs(60));

        assert_eq!(source.pending_delay(), Duration::ZERO);
        source.last_request.set(Some(Instant::now()));
        assert!(source.pending_delay() > Duration::from_secs(59));
    }

    #[cfg(feature = "horizons-live")]
    #[test]
    fn test_live_horizons() {
        let source = BlockingHorizons::new(
            HorizonsClient::new().unwrap(),
            HorizonsQuery::new("C/2025 N1"),
        )
        .unwrap();
        let text = source.fetch("2025-12-19 01:21:40", "G96").unwrap();
        let record = crate::ephemeris::EphemerisParser::default()
            .parse_first(&text, "G96")
            .unwrap();
        assert!(record.uncertainty_arcsec.is_some());
    }
}
