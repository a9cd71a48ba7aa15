//! Configuration for motomap
//!
//! Endpoints, batching policy and timeouts for the external services, plus
//! the default elevation credential. The core never reads the environment;
//! callers fill `default_credential` themselves.

use std::time::Duration;

/// Batch policy of an elevation service
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchPolicy {
    /// Maximum locations per request
    pub batch_size: usize,
    /// Delay between consecutive batch requests
    pub pause: Duration,
}

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Credential for the keyed elevation service when the caller gives none
    pub default_credential: Option<String>,

    /// Base URL of the Nominatim geocoder
    pub nominatim_url: String,

    /// Overpass interpreter endpoint
    pub overpass_url: String,

    /// Google Elevation API endpoint
    pub google_elevation_url: String,

    /// Open Topo Data dataset endpoint
    pub open_topo_url: String,

    /// Batching for the keyed service
    pub keyed_batch: BatchPolicy,

    /// Batching for the free service; at most one request per second
    pub free_batch: BatchPolicy,

    /// Overall timeout for elevation and geocoding requests
    pub request_timeout: Duration,

    /// Overall timeout for Overpass queries
    pub overpass_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_credential: None,
            nominatim_url: "https://nominatim.openstreetmap.org".to_string(),
            overpass_url: "https://overpass-api.de/api/interpreter".to_string(),
            google_elevation_url: "https://maps.googleapis.com/maps/api/elevation/json"
                .to_string(),
            open_topo_url: "https://api.opentopodata.org/v1/eudem25m".to_string(),
            keyed_batch: BatchPolicy {
                batch_size: 350,
                pause: Duration::ZERO,
            },
            free_batch: BatchPolicy {
                batch_size: 100,
                pause: Duration::from_secs(1),
            },
            request_timeout: Duration::from_secs(60),
            overpass_timeout: Duration::from_secs(180),
        }
    }
}

impl Config {
    /// Set the fallback elevation credential. Empty strings count as absent.
    pub fn with_default_credential(mut self, credential: Option<String>) -> Self {
        self.default_credential = credential.filter(|key| !key.trim().is_empty());
        self
    }

    /// Point every service at one base URL (mock servers, local mirrors)
    pub fn with_base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.nominatim_url = base.to_string();
        self.overpass_url = format!("{base}/api/interpreter");
        self.google_elevation_url = format!("{base}/maps/api/elevation/json");
        self.open_topo_url = format!("{base}/v1/eudem25m");
        self
    }
}
