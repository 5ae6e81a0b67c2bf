//! Reverse geocoding: turning a coordinate into a place name.
//!
//! Lookups go through the [`ReverseGeocoder`] trait so the gallery works the
//! same online, offline and in tests. [`resolve_name`] is the only place a
//! failed lookup is turned into the [`UNKNOWN_LOCATION`] placeholder.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use geogallery_store::geocode::{FixedGeocoder, resolve_name};
//! use geogallery_types::Coord;
//!
//! # async fn example() -> Result<(), geogallery_types::CoordError> {
//! let geocoder = FixedGeocoder::new("Lisbon, Portugal");
//! let name = resolve_name(&geocoder, Coord::new(38.72, -9.14)?, Duration::from_secs(5)).await;
//! assert_eq!(name, "Lisbon, Portugal");
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use geogallery_types::Coord;

/// Name stored when a lookup fails or times out.
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

/// Default upper bound on a single lookup.
pub const DEFAULT_GEOCODE_TIMEOUT: Duration = Duration::from_secs(5);

/// Public OpenStreetMap Nominatim instance.
pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

/// User-Agent sent to Nominatim, which rejects anonymous clients.
pub const DEFAULT_USER_AGENT: &str = concat!("geogallery/", env!("CARGO_PKG_VERSION"));

/// Why a lookup produced no name.
#[derive(Debug, thiserror::Error)]
pub enum EnrichmentError {
    /// The HTTP request failed (connection, TLS, body decoding).
    #[error("Geocoding request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("Geocoding service returned HTTP {0}")]
    Status(u16),

    /// The service knows no place at this coordinate.
    #[error("No place found at {0}")]
    NoMatch(Coord),

    /// The lookup did not finish in time.
    #[error("Geocoding timed out after {0:?}")]
    Timeout(Duration),

    /// Geocoding is turned off.
    #[error("Geocoding is disabled")]
    Disabled,

    /// The endpoint is not an http(s) URL.
    #[error("Invalid geocoding endpoint: {0}")]
    InvalidUrl(String),
}

/// Resolves coordinates into a human-readable place name.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    /// Look up the place name for a coordinate.
    async fn reverse(&self, coord: Coord) -> Result<String, EnrichmentError>;
}

/// Resolve a place name, falling back to [`UNKNOWN_LOCATION`].
///
/// Never fails and never waits longer than `timeout`.
pub async fn resolve_name<G>(geocoder: &G, coord: Coord, timeout: Duration) -> String
where
    G: ReverseGeocoder + ?Sized,
{
    let result = match tokio::time::timeout(timeout, geocoder.reverse(coord)).await {
        Ok(result) => result,
        Err(_) => Err(EnrichmentError::Timeout(timeout)),
    };

    match result {
        Ok(name) => {
            debug!("Resolved {} to {:?}", coord, name);
            name
        }
        Err(EnrichmentError::Disabled) => {
            debug!("Geocoding disabled for {}", coord);
            UNKNOWN_LOCATION.to_string()
        }
        Err(e) => {
            warn!("Reverse geocoding failed for {}: {}", coord, e);
            UNKNOWN_LOCATION.to_string()
        }
    }
}

/// Reverse geocoder backed by an OpenStreetMap Nominatim server.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

impl NominatimGeocoder {
    /// Create a geocoder for the public Nominatim instance.
    pub fn new() -> Result<Self, EnrichmentError> {
        Self::with_endpoint(
            DEFAULT_NOMINATIM_URL,
            DEFAULT_USER_AGENT,
            DEFAULT_GEOCODE_TIMEOUT,
        )
    }

    /// Create a geocoder for a specific server.
    ///
    /// `timeout` bounds each HTTP request.
    pub fn with_endpoint(
        base_url: &str,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, EnrichmentError> {
        let base_url = base_url.trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(EnrichmentError::InvalidUrl(format!(
                "URL must start with http:// or https://, got: {}",
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn reverse(&self, coord: Coord) -> Result<String, EnrichmentError> {
        let url = format!("{}/reverse", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("format", "jsonv2".to_string()),
                ("lat", coord.latitude.to_string()),
                ("lon", coord.longitude.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichmentError::Status(status.as_u16()));
        }

        let body: Value = response.json().await?;
        place_name_from_json(&body).ok_or(EnrichmentError::NoMatch(coord))
    }
}

/// Build a display name from a Nominatim `jsonv2` reverse response.
///
/// Prefers `"<locality>, <region>"` from the `address` object and falls back
/// to `display_name`. Returns `None` for error bodies and empty results.
pub fn place_name_from_json(body: &Value) -> Option<String> {
    if body.get("error").is_some() {
        return None;
    }

    let address = body.get("address");
    let field = |keys: &[&str]| -> Option<String> {
        let address = address?;
        keys.iter()
            .filter_map(|key| address.get(*key).and_then(Value::as_str))
            .map(str::trim)
            .find(|value| !value.is_empty())
            .map(str::to_string)
    };

    let locality = field(&["city", "town", "village", "hamlet", "suburb"]);
    let region = field(&["state", "county", "country"]);

    match (locality, region) {
        (Some(locality), Some(region)) if locality != region => {
            Some(format!("{}, {}", locality, region))
        }
        (Some(name), _) | (None, Some(name)) => Some(name),
        (None, None) => body
            .get("display_name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string),
    }
}

/// Geocoder used when lookups are turned off. Every lookup is `Disabled`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGeocoder;

#[async_trait]
impl ReverseGeocoder for OfflineGeocoder {
    async fn reverse(&self, _coord: Coord) -> Result<String, EnrichmentError> {
        Err(EnrichmentError::Disabled)
    }
}

/// Geocoder that answers every lookup with the same name.
#[derive(Debug, Clone)]
pub struct FixedGeocoder {
    name: String,
}

impl FixedGeocoder {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl ReverseGeocoder for FixedGeocoder {
    async fn reverse(&self, _coord: Coord) -> Result<String, EnrichmentError> {
        Ok(self.name.clone())
    }
}
