use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use eframe::egui::Vec2;

use crate::data::{ClusterAssignment, DataSource, DatasetId, MatrixVariant, NodeInfo};
use crate::layout::{
    ConnectivityMatrix, Embedder, GlobalInput, GlobalLayout, Layout, LayoutConfig, LayoutError,
    LayoutRequest, RadialInput, RadialLayout, compute, restrict_neighbors,
};

#[derive(Clone)]
pub struct Pipeline {
    source: Arc<dyn DataSource>,
    embedder: Arc<dyn Embedder>,
    config: LayoutConfig,
}

impl Pipeline {
    pub fn new(
        source: Arc<dyn DataSource>,
        embedder: Arc<dyn Embedder>,
        config: LayoutConfig,
    ) -> Self {
        Self {
            source,
            embedder,
            config,
        }
    }

    pub fn cluster_assignment(&self, dataset: &DatasetId) -> Result<ClusterAssignment> {
        self.source
            .fetch_cluster_assignment(dataset)
            .with_context(|| format!("failed to load clusters for {dataset}"))
    }

    pub fn matrix(&self, dataset: &DatasetId, variant: &MatrixVariant) -> Result<ConnectivityMatrix> {
        self.source
            .fetch_connectivity_matrix(dataset, variant)
            .with_context(|| format!("failed to load {} matrix for {dataset}", variant.label()))
    }

    pub fn global_request(
        &self,
        dataset: &DatasetId,
        variant: &MatrixVariant,
        clusters: &[Vec<String>],
    ) -> Result<LayoutRequest> {
        Ok(LayoutRequest::Global(GlobalInput {
            matrix: self.matrix(dataset, variant)?,
            clusters: clusters.to_vec(),
        }))
    }

    pub fn radial_request(&self, focal: &str, universe: &[String]) -> Result<LayoutRequest> {
        let neighbors = self
            .source
            .fetch_neighbor_similarities(focal, universe)
            .with_context(|| format!("failed to load similarities for {focal}"))?;
        let allowed = universe.iter().cloned().collect::<HashSet<_>>();

        Ok(LayoutRequest::Radial(RadialInput {
            focal: focal.to_string(),
            neighbors: restrict_neighbors(&neighbors, &allowed),
        }))
    }

    pub fn layout(&self, request: &LayoutRequest, viewport: Vec2) -> Result<Layout> {
        compute(request, viewport, self.embedder.as_ref(), &self.config).with_context(|| {
            match request {
                LayoutRequest::Global(input) => {
                    format!("no cluster map for {} nodes", input.matrix.dimension())
                }
                LayoutRequest::Radial(input) => format!("no neighborhood for {}", input.focal),
            }
        })
    }

    pub fn global_layout(
        &self,
        dataset: &DatasetId,
        variant: &MatrixVariant,
        clusters: &[Vec<String>],
        viewport: Vec2,
    ) -> Result<GlobalLayout> {
        let request = self.global_request(dataset, variant, clusters)?;
        match self.layout(&request, viewport).with_context(|| format!("dataset {dataset}"))? {
            Layout::Global(layout) => Ok(layout),
            Layout::Radial(_) => Err(anyhow!("cluster map request produced a neighborhood")),
        }
    }

    pub fn radial_layout(
        &self,
        focal: &str,
        universe: &[String],
        viewport: Vec2,
    ) -> Result<RadialLayout> {
        match self.layout(&self.radial_request(focal, universe)?, viewport)? {
            Layout::Radial(layout) => Ok(layout),
            Layout::Global(_) => Err(anyhow!("neighborhood request produced a cluster map")),
        }
    }

    pub fn node_info(&self, node: &str) -> Result<NodeInfo> {
        self.source
            .fetch_node_info(node)
            .with_context(|| format!("no details for {node}"))
    }
}

pub fn failure_reason(error: &anyhow::Error) -> &'static str {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<LayoutError>())
        .map_or("fetch-failed", LayoutError::reason_code)
}
