//! # Motomap Library
//!
//! Builds routable OpenStreetMap road graphs for a named place, with node
//! elevations, edge grades and normalized road attributes.
//!
//! ## Features
//!
//! - **Complete attributes**: every edge ends up with integer `lanes`,
//!   `maxspeed`, a `surface` and a directional `lanes_forward`
//! - **Two-tier elevation**: Google Elevation API when a key is available,
//!   free Open Topo Data otherwise or when the key fails
//! - **Rate-limit aware**: free lookups are batched and paced
//! - **Pluggable stages**: loader, elevation, grade and cleaning stages are
//!   traits, see [`Pipeline`]
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use motomap::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default()
//!         .with_default_credential(std::env::var("GOOGLE_MAPS_API_KEY").ok());
//!
//!     let graph = motomap::build("Moda, Kadikoy, Istanbul, Turkey", None, &config).await?;
//!     for edge in graph.edges() {
//!         println!("{} -> {}: {:?} lanes", edge.u, edge.v, edge.data.lanes_count());
//!     }
//!
//!     Ok(())
//! }
//! ```

// Re-export core types that users might need
pub use crate::core::cleaner::{clean_graph, AttributeNormalizer, CleanStats, GraphCleaner};
pub use crate::core::config::{BatchPolicy, Config};
pub use crate::core::elevation::{
    ElevationProvider, ElevationService, ElevationStage, ElevationTier, GoogleElevation,
    OpenTopoData, ProgressCallback,
};
pub use crate::core::error::{Error, Result};
pub use crate::core::grade::{EdgeGrades, GradeCalculator};
pub use crate::core::graph::{EdgeData, EdgeView, NodeData, RoadGraph, TagValue};
pub use crate::core::loader::{BoundingBox, NetworkLoader, OverpassLoader};
pub use crate::core::pipeline::Pipeline;

/// Default road attributes per highway class
pub use crate::core::defaults;

// Internal modules
mod core;

/// Build the road graph for a place
///
/// # Arguments
/// * `place` - Geocodable place name (e.g., "Kadıköy, İstanbul, Turkey")
/// * `credential` - Google Elevation API key. `None` falls back to
///   `config.default_credential`; with no key at all the free service is used
/// * `config` - Service endpoints and batching policy
///
/// # Errors
/// Fails when the place cannot be geocoded, has no drivable roads, or the
/// free elevation service is unavailable. A failing Google key is not an
/// error.
pub async fn build(place: &str, credential: Option<&str>, config: &Config) -> Result<RoadGraph> {
    Pipeline::from_config(config).build(place, credential).await
}

/// Build with elevation progress tracking
///
/// The callback receives (finished_batches, total_batches) for each
/// elevation tier that runs.
///
/// # Examples
/// ```rust,no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = motomap::Config::default();
/// let graph = motomap::build_with_progress("Moda, Istanbul", None, &config, |done, total| {
///     println!("Elevation batch {done}/{total}");
/// })
/// .await?;
/// println!("{} edges", graph.edge_count());
/// # Ok(())
/// # }
/// ```
pub async fn build_with_progress<F>(
    place: &str,
    credential: Option<&str>,
    config: &Config,
    progress: F,
) -> Result<RoadGraph>
where
    F: Fn(u64, u64) + Send + Sync + 'static,
{
    let elevation =
        ElevationProvider::from_config(config).with_progress(std::sync::Arc::new(progress));
    Pipeline::with_elevation(config, elevation)
        .build(place, credential)
        .await
}
