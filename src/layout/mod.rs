mod embed;
mod global;
mod radial;

use eframe::egui::{Pos2, Vec2};
use thiserror::Error;

pub use embed::{
    DEFAULT_MIN_DIST, DEFAULT_NEIGHBORS, DEFAULT_SEED, Embedder, EmbeddingParams, UmapEmbedder,
};
pub use global::{cluster_index_of, compute_global_layout, validate_matrix};
pub use radial::{compute_radial_layout, restrict_neighbors};

pub const DEFAULT_MARGIN: f32 = 100.0;
pub const RADIAL_MIN: f32 = 100.0;
pub const RADIAL_SPAN: f32 = 325.0;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConnectivityMatrix {
    pub rows: Vec<Vec<f64>>,
    pub sorted_nodes: Vec<String>,
}

impl ConnectivityMatrix {
    pub fn dimension(&self) -> usize {
        self.rows.len()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NeighborSimilarity {
    pub id: String,
    pub similarity: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlacedNode {
    pub id: String,
    pub position: Pos2,
    pub cluster: Option<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimilarityEdge {
    pub from: String,
    pub to: String,
    pub similarity: f64,
    pub midpoint: Pos2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Degradation {
    TooFewNodes { nodes: usize, neighbors: usize },
}

#[derive(Clone, Debug, PartialEq)]
pub struct GlobalLayout {
    pub nodes: Vec<PlacedNode>,
    pub degraded: Option<Degradation>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RadialNeighbor {
    pub id: String,
    pub similarity: f64,
    pub radius: f32,
    pub angle: f32,
    pub position: Pos2,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RadialLayout {
    pub focal: PlacedNode,
    pub neighbors: Vec<RadialNeighbor>,
    pub edges: Vec<SimilarityEdge>,
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum LayoutError {
    #[error("connectivity matrix is empty")]
    EmptyMatrix,
    #[error("matrix row {row} has {len} entries, expected {expected}")]
    NotSquare {
        row: usize,
        len: usize,
        expected: usize,
    },
    #[error("matrix entry ({row}, {col}) is not a finite number")]
    NonFinite { row: usize, col: usize },
    #[error("matrix has {matrix} rows but {nodes} node ids were supplied")]
    NodeCountMismatch { matrix: usize, nodes: usize },
    #[error("embedding failed: {0}")]
    Embedding(String),
}

impl LayoutError {
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::EmptyMatrix => "empty-matrix",
            Self::NotSquare { .. } => "not-square",
            Self::NonFinite { .. } => "non-finite",
            Self::NodeCountMismatch { .. } => "node-count-mismatch",
            Self::Embedding(_) => "embedding-failed",
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        !matches!(self, Self::Embedding(_))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
    pub margin: f32,
    pub radial_min: f32,
    pub radial_span: f32,
    pub embedding: EmbeddingParams,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin: DEFAULT_MARGIN,
            radial_min: RADIAL_MIN,
            radial_span: RADIAL_SPAN,
            embedding: EmbeddingParams::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GlobalInput {
    pub matrix: ConnectivityMatrix,
    pub clusters: Vec<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RadialInput {
    pub focal: String,
    pub neighbors: Vec<NeighborSimilarity>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LayoutRequest {
    Global(GlobalInput),
    Radial(RadialInput),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Layout {
    Global(GlobalLayout),
    Radial(RadialLayout),
}

pub fn compute(
    request: &LayoutRequest,
    viewport: Vec2,
    embedder: &dyn Embedder,
    config: &LayoutConfig,
) -> Result<Layout, LayoutError> {
    match request {
        LayoutRequest::Global(input) => compute_global_layout(
            &input.matrix,
            &input.clusters,
            viewport,
            embedder,
            config,
        )
        .map(Layout::Global),
        LayoutRequest::Radial(input) => Ok(Layout::Radial(compute_radial_layout(
            &input.focal,
            &input.neighbors,
            viewport,
            config,
        ))),
    }
}
