//! Node elevation lookup for motomap
//!
//! Two tiers: the Google Elevation API when a key is available, and the free
//! Open Topo Data service (EU-DEM 25m) otherwise. A failing keyed lookup is
//! abandoned as a whole and the free service runs instead, so a disabled or
//! exhausted key never fails a build.
//!
//! Open Topo Data allows one request per second with at most 100 locations,
//! so the free tier is always batched and paced.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use reqwest::Client;
use serde::Deserialize;

use crate::core::config::{BatchPolicy, Config};
use crate::core::error::{Error, Result};
use crate::core::graph::RoadGraph;
use crate::core::http::{self, fetch_json};

/// Progress callback receiving (finished_batches, total_batches)
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// A location in the order elevation services expect it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

/// One elevation web service
#[allow(async_fn_in_trait)]
pub trait ElevationService {
    /// Batch size and pacing the service requires
    fn policy(&self) -> BatchPolicy;

    /// Look up a single batch. Returns one entry per location, in order;
    /// `None` where the service has no data.
    async fn lookup(
        &self,
        locations: &[Coordinate],
        credential: Option<&str>,
    ) -> Result<Vec<Option<f64>>>;
}

/// Which tier annotated the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElevationTier {
    Keyed,
    Free,
}

/// Elevation stage of the pipeline
#[allow(async_fn_in_trait)]
pub trait ElevationStage {
    /// Set `elevation` on every node of the graph
    async fn add_elevation(
        &self,
        graph: &mut RoadGraph,
        credential: Option<&str>,
    ) -> Result<ElevationTier>;
}

/// Keyed tier with free fallback
pub struct ElevationProvider<K = GoogleElevation, F = OpenTopoData> {
    keyed: K,
    free: F,
    progress: Option<ProgressCallback>,
}

impl ElevationProvider {
    /// Google + Open Topo Data, configured from `config`
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            GoogleElevation::new(http::client().clone(), config),
            OpenTopoData::new(http::client().clone(), config),
        )
    }
}

impl<K, F> ElevationProvider<K, F>
where
    K: ElevationService,
    F: ElevationService,
{
    pub fn new(keyed: K, free: F) -> Self {
        Self {
            keyed,
            free,
            progress: None,
        }
    }

    /// Report batch progress of each lookup
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }
}

impl<K, F> ElevationStage for ElevationProvider<K, F>
where
    K: ElevationService,
    F: ElevationService,
{
    async fn add_elevation(
        &self,
        graph: &mut RoadGraph,
        credential: Option<&str>,
    ) -> Result<ElevationTier> {
        let locations: Vec<Coordinate> = graph
            .nodes()
            .map(|node| Coordinate {
                lat: node.y,
                lng: node.x,
            })
            .collect();

        if let Some(key) = credential.filter(|key| !key.trim().is_empty()) {
            info!("Looking up {} node elevations with the keyed service", locations.len());
            match lookup_batched(&self.keyed, &locations, Some(key), self.progress.as_ref()).await
            {
                Ok(elevations) => {
                    apply_elevations(graph, elevations);
                    return Ok(ElevationTier::Keyed);
                }
                Err(err) => {
                    warn!("Keyed elevation lookup failed, falling back to Open Topo Data: {err}");
                }
            }
        }

        info!("Looking up {} node elevations with Open Topo Data", locations.len());
        let elevations =
            lookup_batched(&self.free, &locations, None, self.progress.as_ref()).await?;
        apply_elevations(graph, elevations);
        Ok(ElevationTier::Free)
    }
}

/// Query a service batch by batch, pausing between consecutive requests.
///
/// Either every batch succeeds or nothing is returned.
async fn lookup_batched<S: ElevationService>(
    service: &S,
    locations: &[Coordinate],
    credential: Option<&str>,
    progress: Option<&ProgressCallback>,
) -> Result<Vec<Option<f64>>> {
    let policy = service.policy();
    let batch_size = policy.batch_size.max(1);
    let total_batches = locations.len().div_ceil(batch_size) as u64;
    let mut elevations = Vec::with_capacity(locations.len());

    for (idx, batch) in locations.chunks(batch_size).enumerate() {
        if idx > 0 && !policy.pause.is_zero() {
            tokio::time::sleep(policy.pause).await;
        }

        let results = service.lookup(batch, credential).await?;
        if results.len() != batch.len() {
            return Err(Error::Elevation(format!(
                "requested {} locations but received {} results",
                batch.len(),
                results.len()
            )));
        }
        elevations.extend(results);

        debug!("Elevation batch {}/{} done", idx + 1, total_batches);
        if let Some(progress) = progress {
            progress(idx as u64 + 1, total_batches);
        }
    }

    Ok(elevations)
}

fn apply_elevations(graph: &mut RoadGraph, elevations: Vec<Option<f64>>) {
    let mut missing = 0usize;
    for (node, elevation) in graph.nodes_mut().zip(elevations) {
        if elevation.is_none() {
            missing += 1;
        }
        node.elevation = elevation.map(round_meters);
    }
    if missing > 0 {
        warn!("{missing} nodes fall outside the elevation dataset and have no elevation");
    }
}

/// Millimeter precision
fn round_meters(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// `lat,lng|lat,lng|...` as both services expect
fn encode_locations(locations: &[Coordinate]) -> String {
    locations
        .iter()
        .map(|c| format!("{:.6},{:.6}", c.lat, c.lng))
        .collect::<Vec<_>>()
        .join("|")
}

#[derive(Debug, Deserialize)]
struct ElevationResponse {
    status: String,
    #[serde(default)]
    results: Vec<ElevationResult>,
    #[serde(default, alias = "error_message")]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ElevationResult {
    elevation: Option<f64>,
}

impl ElevationResponse {
    fn into_elevations(self, service: &str) -> Result<Vec<Option<f64>>> {
        if self.status != "OK" {
            let detail = self.error.unwrap_or_default();
            return Err(Error::Elevation(format!(
                "{service} returned status {}: {detail}",
                self.status
            )));
        }
        Ok(self.results.into_iter().map(|r| r.elevation).collect())
    }
}

/// Google Elevation API. Requires a key, billed per request.
#[derive(Debug, Clone)]
pub struct GoogleElevation {
    client: Client,
    url: String,
    timeout: Duration,
    policy: BatchPolicy,
}

impl GoogleElevation {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            url: config.google_elevation_url.clone(),
            timeout: config.request_timeout,
            policy: config.keyed_batch,
        }
    }
}

impl ElevationService for GoogleElevation {
    fn policy(&self) -> BatchPolicy {
        self.policy
    }

    async fn lookup(
        &self,
        locations: &[Coordinate],
        credential: Option<&str>,
    ) -> Result<Vec<Option<f64>>> {
        let key = credential.ok_or_else(|| {
            Error::InvalidInput("Google Elevation API requires an API key".to_string())
        })?;

        let request = self
            .client
            .get(&self.url)
            .query(&[("locations", encode_locations(locations).as_str()), ("key", key)]);
        let response: ElevationResponse =
            fetch_json(request, self.timeout, "Google Elevation API").await?;
        response.into_elevations("Google Elevation API")
    }
}

/// Open Topo Data. Free, no key, rate limited.
#[derive(Debug, Clone)]
pub struct OpenTopoData {
    client: Client,
    url: String,
    timeout: Duration,
    policy: BatchPolicy,
}

impl OpenTopoData {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            url: config.open_topo_url.clone(),
            timeout: config.request_timeout,
            policy: config.free_batch,
        }
    }
}

impl ElevationService for OpenTopoData {
    fn policy(&self) -> BatchPolicy {
        self.policy
    }

    async fn lookup(
        &self,
        locations: &[Coordinate],
        _credential: Option<&str>,
    ) -> Result<Vec<Option<f64>>> {
        let request = self
            .client
            .get(&self.url)
            .query(&[("locations", encode_locations(locations))]);
        let response: ElevationResponse =
            fetch_json(request, self.timeout, "Open Topo Data").await?;
        response.into_elevations("Open Topo Data")
    }
}
