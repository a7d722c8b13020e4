mod files;
mod parse;

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::{ConnectivityMatrix, NeighborSimilarity};

pub use files::FileDataSource;
pub use parse::{
    parse_cluster_file, parse_matrix, parse_node_info, parse_similarity_table, split_csv_line,
};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DatasetId {
    Standard(String),
    Custom(String),
}

impl DatasetId {
    pub fn name(&self) -> &str {
        match self {
            Self::Standard(name) | Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard(name) => write!(f, "{name}"),
            Self::Custom(id) => write!(f, "custom:{id}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MatrixVariant {
    Adjacency,
    Connectivity { alpha: Option<String> },
}

impl MatrixVariant {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Adjacency => "adj",
            Self::Connectivity { .. } => "con",
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Adjacency => "adjacency".to_string(),
            Self::Connectivity { alpha: None } => "connectivity".to_string(),
            Self::Connectivity { alpha: Some(alpha) } => format!("connectivity (α = {alpha})"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClusterAssignment {
    pub algorithm: String,
    /// Presentation order; also drives colors and legend order.
    pub clusters: Vec<Vec<String>>,
    /// Lexically sorted union of all members.
    pub sorted_nodes: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeInfo {
    #[serde(rename = "GOID")]
    pub id: String,
    #[serde(default, rename = "NAME")]
    pub name: String,
    #[serde(default, rename = "ORGANISM")]
    pub organism: String,
    #[serde(default, rename = "SIZE")]
    pub size: String,
    #[serde(default, rename = "LINK")]
    pub link: String,
    #[serde(default, rename = "DESCRIPTION")]
    pub description: String,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{what} not found")]
    NotFound { what: String },
    #[error("malformed data in {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub trait DataSource: Send + Sync {
    fn fetch_connectivity_matrix(
        &self,
        dataset: &DatasetId,
        variant: &MatrixVariant,
    ) -> Result<ConnectivityMatrix, FetchError>;

    fn fetch_neighbor_similarities(
        &self,
        focal: &str,
        allowed: &[String],
    ) -> Result<Vec<NeighborSimilarity>, FetchError>;

    fn fetch_cluster_assignment(&self, dataset: &DatasetId)
    -> Result<ClusterAssignment, FetchError>;

    fn fetch_node_info(&self, node: &str) -> Result<NodeInfo, FetchError>;
}
