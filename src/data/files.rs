use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::layout::{ConnectivityMatrix, NeighborSimilarity};

use super::parse::{parse_cluster_file, parse_matrix, parse_node_info, parse_similarity_table};
use super::{ClusterAssignment, DataSource, DatasetId, FetchError, MatrixVariant, NodeInfo};

const SIMILARITIES_FILE: &str = "similarities.tsv";
const NODE_INFO_FILE: &str = "node_info.csv";

#[derive(Clone, Debug)]
pub struct FileDataSource {
    root: PathBuf,
}

impl FileDataSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn matrix_path(&self, dataset: &DatasetId, variant: &MatrixVariant) -> PathBuf {
        let file = match (dataset, variant) {
            (DatasetId::Standard(name), MatrixVariant::Connectivity { alpha: Some(alpha) }) => {
                format!("{name}_{}_{alpha}.csv", variant.kind())
            }
            (DatasetId::Standard(name), _) => format!("{name}_{}.csv", variant.kind()),
            (DatasetId::Custom(id), _) => format!("{}_{id}.csv", variant.kind()),
        };
        self.root.join("matrices").join(file)
    }

    pub fn cluster_path(&self, dataset: &DatasetId) -> PathBuf {
        match dataset {
            DatasetId::Standard(name) => self.root.join("data").join(format!("{name}.csv")),
            DatasetId::Custom(id) => self
                .root
                .join("outputs")
                .join(id)
                .join(format!("clusters_{id}.csv")),
        }
    }

    fn read(&self, path: &Path) -> Result<String, FetchError> {
        debug!(path = %path.display(), "reading data file");
        fs::read_to_string(path).map_err(|source| {
            let failure = if source.kind() == ErrorKind::NotFound {
                FetchError::NotFound {
                    what: path.display().to_string(),
                }
            } else {
                FetchError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            };
            error!(error = %failure, "data fetch failed");
            failure
        })
    }
}

impl DataSource for FileDataSource {
    fn fetch_connectivity_matrix(
        &self,
        dataset: &DatasetId,
        variant: &MatrixVariant,
    ) -> Result<ConnectivityMatrix, FetchError> {
        let path = self.matrix_path(dataset, variant);
        let rows = parse_matrix(&self.read(&path)?, &path)?;
        let sorted_nodes = self.fetch_cluster_assignment(dataset)?.sorted_nodes;

        Ok(ConnectivityMatrix { rows, sorted_nodes })
    }

    fn fetch_neighbor_similarities(
        &self,
        focal: &str,
        allowed: &[String],
    ) -> Result<Vec<NeighborSimilarity>, FetchError> {
        let raw = self.read(&self.root.join(SIMILARITIES_FILE))?;
        let allowed = allowed.iter().map(String::as_str).collect::<HashSet<_>>();

        Ok(parse_similarity_table(&raw, focal, &allowed))
    }

    fn fetch_cluster_assignment(
        &self,
        dataset: &DatasetId,
    ) -> Result<ClusterAssignment, FetchError> {
        let path = self.cluster_path(dataset);
        parse_cluster_file(&self.read(&path)?, &path)
    }

    fn fetch_node_info(&self, node: &str) -> Result<NodeInfo, FetchError> {
        let path = self.root.join(NODE_INFO_FILE);
        parse_node_info(&self.read(&path)?, node, &path)?.ok_or_else(|| FetchError::NotFound {
            what: format!("node {node}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_and_custom_paths() {
        let source = FileDataSource::new("/srv/pag");
        let standard = DatasetId::Standard("kegg".to_string());
        let custom = DatasetId::Custom("run42".to_string());

        assert_eq!(
            source.matrix_path(&standard, &MatrixVariant::Adjacency),
            Path::new("/srv/pag/matrices/kegg_adj.csv")
        );
        assert_eq!(
            source.matrix_path(
                &standard,
                &MatrixVariant::Connectivity {
                    alpha: Some("0.5".to_string())
                }
            ),
            Path::new("/srv/pag/matrices/kegg_con_0.5.csv")
        );
        assert_eq!(
            source.matrix_path(&custom, &MatrixVariant::Connectivity { alpha: None }),
            Path::new("/srv/pag/matrices/con_run42.csv")
        );
        assert_eq!(
            source.cluster_path(&custom),
            Path::new("/srv/pag/outputs/run42/clusters_run42.csv")
        );
    }

    #[test]
    fn missing_file_is_not_found() {
        let source = FileDataSource::new("/definitely/not/here");
        let error = source
            .fetch_cluster_assignment(&DatasetId::Standard("none".to_string()))
            .unwrap_err();
        assert!(error.is_not_found());
    }
}
