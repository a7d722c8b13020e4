use eframe::egui::Vec2;
use tracing::{info, warn};

use crate::geometry::{BoundingBox, FitTransform};

use super::{
    ConnectivityMatrix, Degradation, Embedder, GlobalLayout, LayoutConfig, LayoutError,
    PlacedNode,
};

pub fn validate_matrix(rows: &[Vec<f64>]) -> Result<(), LayoutError> {
    if rows.is_empty() {
        return Err(LayoutError::EmptyMatrix);
    }

    let expected = rows.len();
    for (row_index, row) in rows.iter().enumerate() {
        if row.len() != expected {
            return Err(LayoutError::NotSquare {
                row: row_index,
                len: row.len(),
                expected,
            });
        }
        if let Some(col) = row.iter().position(|value| !value.is_finite()) {
            return Err(LayoutError::NonFinite {
                row: row_index,
                col,
            });
        }
    }

    Ok(())
}

/// Index of the first cluster listing `node`. Overlapping memberships resolve to the earliest
/// cluster in presentation order.
pub fn cluster_index_of(node: &str, clusters: &[Vec<String>]) -> Option<usize> {
    clusters
        .iter()
        .position(|members| members.iter().any(|member| member == node))
}

pub fn compute_global_layout(
    matrix: &ConnectivityMatrix,
    clusters: &[Vec<String>],
    viewport: Vec2,
    embedder: &dyn Embedder,
    config: &LayoutConfig,
) -> Result<GlobalLayout, LayoutError> {
    validate_matrix(&matrix.rows)?;
    let node_count = matrix.dimension();
    if matrix.sorted_nodes.len() != node_count {
        return Err(LayoutError::NodeCountMismatch {
            matrix: node_count,
            nodes: matrix.sorted_nodes.len(),
        });
    }

    let neighbors = config.embedding.neighbors;
    let degraded = (neighbors >= node_count).then(|| {
        warn!(
            nodes = node_count,
            neighbors, "fewer nodes than embedding neighbors; layout quality is reduced"
        );
        Degradation::TooFewNodes {
            nodes: node_count,
            neighbors,
        }
    });

    let mut coords = embedder.embed(&matrix.rows, &config.embedding)?;
    if coords.len() != node_count {
        return Err(LayoutError::Embedding(format!(
            "embedder returned {} points for {node_count} nodes",
            coords.len()
        )));
    }
    if coords
        .iter()
        .any(|point| !point[0].is_finite() || !point[1].is_finite())
    {
        return Err(LayoutError::Embedding(
            "embedder returned non-finite coordinates".to_string(),
        ));
    }

    let mut bbox = BoundingBox::from_points(&coords).ok_or(LayoutError::EmptyMatrix)?;
    if node_count > 1 && bbox.width() <= f64::EPSILON && bbox.height() <= f64::EPSILON {
        // Every point collapsed onto one spot; spread them on a line so they stay pickable.
        warn!(nodes = node_count, "embedding collapsed to a single point");
        for (index, point) in coords.iter_mut().enumerate() {
            *point = [index as f64, 0.0];
        }
        bbox = BoundingBox::from_points(&coords).ok_or(LayoutError::EmptyMatrix)?;
    }

    let fit = FitTransform::fit(&bbox, viewport, config.margin);
    let nodes = matrix
        .sorted_nodes
        .iter()
        .zip(coords.iter())
        .map(|(id, point)| PlacedNode {
            id: id.clone(),
            position: fit.apply(*point),
            cluster: cluster_index_of(id, clusters),
        })
        .collect::<Vec<_>>();

    info!(
        nodes = nodes.len(),
        clusters = clusters.len(),
        scale = fit.scale,
        "global layout computed"
    );

    Ok(GlobalLayout { nodes, degraded })
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::super::EmbeddingParams;
    use super::*;

    struct ColumnsEmbedder;

    impl Embedder for ColumnsEmbedder {
        fn embed(
            &self,
            rows: &[Vec<f64>],
            _params: &EmbeddingParams,
        ) -> Result<Vec<[f64; 2]>, LayoutError> {
            Ok(rows
                .iter()
                .map(|row| [row[0], row.get(1).copied().unwrap_or(0.0)])
                .collect())
        }
    }

    struct FailingEmbedder;

    impl Embedder for FailingEmbedder {
        fn embed(
            &self,
            _rows: &[Vec<f64>],
            _params: &EmbeddingParams,
        ) -> Result<Vec<[f64; 2]>, LayoutError> {
            Err(LayoutError::Embedding("boom".to_string()))
        }
    }

    fn names(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn rejects_ragged_matrix() {
        let rows = vec![vec![0.0, 1.0], vec![1.0]];
        assert_eq!(
            validate_matrix(&rows),
            Err(LayoutError::NotSquare {
                row: 1,
                len: 1,
                expected: 2
            })
        );
    }

    #[test]
    fn rejects_nan_entries() {
        let rows = vec![vec![0.0, f64::NAN], vec![1.0, 0.0]];
        assert_eq!(
            validate_matrix(&rows),
            Err(LayoutError::NonFinite { row: 0, col: 1 })
        );
    }

    #[test]
    fn first_cluster_wins_on_overlap() {
        let clusters = vec![names(&["A", "B"]), names(&["B", "C"])];
        assert_eq!(cluster_index_of("B", &clusters), Some(0));
        assert_eq!(cluster_index_of("C", &clusters), Some(1));
        assert_eq!(cluster_index_of("Z", &clusters), None);
    }

    #[test]
    fn fits_embedding_into_margin_box() {
        let matrix = ConnectivityMatrix {
            rows: vec![vec![0.0, 0.0, 0.0], vec![2.0, 1.0, 0.0], vec![4.0, 2.0, 0.0]],
            sorted_nodes: names(&["A", "B", "C"]),
        };
        let clusters = vec![names(&["C"]), names(&["A"])];
        let layout = compute_global_layout(
            &matrix,
            &clusters,
            vec2(800.0, 600.0),
            &ColumnsEmbedder,
            &LayoutConfig::default(),
        )
        .unwrap();

        let ids = layout.nodes.iter().map(|node| node.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, ["A", "B", "C"]);
        for node in &layout.nodes {
            assert!((100.0..=700.0).contains(&node.position.x));
            assert!((100.0..=500.0).contains(&node.position.y));
        }
        assert_eq!(layout.nodes[0].cluster, Some(1));
        assert_eq!(layout.nodes[1].cluster, None);
        assert_eq!(layout.nodes[2].cluster, Some(0));
        assert_eq!(
            layout.degraded,
            Some(Degradation::TooFewNodes {
                nodes: 3,
                neighbors: 15
            })
        );
    }

    #[test]
    fn node_count_must_match_matrix() {
        let matrix = ConnectivityMatrix {
            rows: vec![vec![0.0, 1.0], vec![1.0, 0.0]],
            sorted_nodes: names(&["A"]),
        };
        let error = compute_global_layout(
            &matrix,
            &[],
            vec2(800.0, 600.0),
            &ColumnsEmbedder,
            &LayoutConfig::default(),
        )
        .unwrap_err();
        assert_eq!(error.reason_code(), "node-count-mismatch");
    }

    #[test]
    fn embedder_failure_is_distinguishable() {
        let matrix = ConnectivityMatrix {
            rows: vec![vec![0.0, 1.0], vec![1.0, 0.0]],
            sorted_nodes: names(&["A", "B"]),
        };
        let error = compute_global_layout(
            &matrix,
            &[],
            vec2(800.0, 600.0),
            &FailingEmbedder,
            &LayoutConfig::default(),
        )
        .unwrap_err();
        assert!(!error.is_invalid_input());
    }

    #[test]
    fn collapsed_embedding_is_spread_out() {
        let matrix = ConnectivityMatrix {
            rows: vec![vec![1.0, 1.0], vec![1.0, 1.0]],
            sorted_nodes: names(&["A", "B"]),
        };
        let layout = compute_global_layout(
            &matrix,
            &[],
            vec2(800.0, 600.0),
            &ColumnsEmbedder,
            &LayoutConfig::default(),
        )
        .unwrap();
        assert_ne!(layout.nodes[0].position, layout.nodes[1].position);
    }
}
