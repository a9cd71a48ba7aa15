//! Graph build pipeline for motomap
//!
//! Load → elevation → grades → cleaning, in that order, each stage working on
//! the graph produced by the previous one. Only loading (and a failing free
//! elevation service) can abort a build.

use log::{debug, info};

use crate::core::cleaner::{AttributeNormalizer, GraphCleaner};
use crate::core::config::Config;
use crate::core::elevation::{ElevationProvider, ElevationStage};
use crate::core::error::Result;
use crate::core::grade::{EdgeGrades, GradeCalculator};
use crate::core::graph::RoadGraph;
use crate::core::loader::{NetworkLoader, OverpassLoader};

/// The four-stage build
pub struct Pipeline<
    L = OverpassLoader,
    E = ElevationProvider,
    G = EdgeGrades,
    C = AttributeNormalizer,
> {
    loader: L,
    elevation: E,
    grades: G,
    cleaner: C,
    default_credential: Option<String>,
}

impl Pipeline {
    /// Default collaborators, configured from `config`
    pub fn from_config(config: &Config) -> Self {
        Self::with_elevation(config, ElevationProvider::from_config(config))
    }
}

impl<E: ElevationStage> Pipeline<OverpassLoader, E, EdgeGrades, AttributeNormalizer> {
    /// Default loader, grades and cleaner around a custom elevation stage
    pub fn with_elevation(config: &Config, elevation: E) -> Self {
        Pipeline::new(
            OverpassLoader::from_config(config),
            elevation,
            EdgeGrades,
            AttributeNormalizer,
        )
        .with_default_credential(config.default_credential.clone())
    }
}

impl<L, E, G, C> Pipeline<L, E, G, C>
where
    L: NetworkLoader,
    E: ElevationStage,
    G: GradeCalculator,
    C: GraphCleaner,
{
    pub fn new(loader: L, elevation: E, grades: G, cleaner: C) -> Self {
        Self {
            loader,
            elevation,
            grades,
            cleaner,
            default_credential: None,
        }
    }

    /// Credential used when [`Pipeline::build`] receives none
    pub fn with_default_credential(mut self, credential: Option<String>) -> Self {
        self.default_credential = credential;
        self
    }

    /// The explicit credential if given, otherwise the configured default
    pub fn resolve_credential<'a>(&'a self, credential: Option<&'a str>) -> Option<&'a str> {
        credential.or(self.default_credential.as_deref())
    }

    /// Build a fully enriched and normalized graph for `place`
    pub async fn build(&self, place: &str, credential: Option<&str>) -> Result<RoadGraph> {
        let credential = self.resolve_credential(credential);

        let mut graph = self.loader.load(place).await?;

        let tier = self.elevation.add_elevation(&mut graph, credential).await?;
        debug!("Elevations resolved by the {tier:?} tier");

        self.grades.add_grades(&mut graph);
        self.cleaner.clean(&mut graph);

        info!(
            "Built graph for '{place}': {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }
}
