use std::collections::HashSet;
use std::f64::consts::TAU;

use eframe::egui::{Vec2, pos2};
use tracing::debug;

use crate::geometry::{midpoint, polar};

use super::{
    LayoutConfig, NeighborSimilarity, PlacedNode, RadialLayout, RadialNeighbor, SimilarityEdge,
};

pub fn restrict_neighbors(
    neighbors: &[NeighborSimilarity],
    allowed: &HashSet<String>,
) -> Vec<NeighborSimilarity> {
    neighbors
        .iter()
        .filter(|neighbor| allowed.contains(&neighbor.id))
        .cloned()
        .collect()
}

/// Angles follow input order. `radius = radial_min + radial_span * (1 - clamp(similarity, 0, 1))`.
pub fn compute_radial_layout(
    focal: &str,
    neighbors: &[NeighborSimilarity],
    viewport: Vec2,
    config: &LayoutConfig,
) -> RadialLayout {
    let center = pos2(viewport.x / 2.0, viewport.y / 2.0);
    let ring = neighbors
        .iter()
        .filter(|neighbor| neighbor.id != focal)
        .collect::<Vec<_>>();
    let count = ring.len();

    let placed = ring
        .iter()
        .enumerate()
        .map(|(index, neighbor)| {
            let similarity = if neighbor.similarity.is_nan() {
                0.0
            } else {
                neighbor.similarity.clamp(0.0, 1.0)
            };
            let radius = config.radial_min + config.radial_span * (1.0 - similarity as f32);
            let angle = (TAU * index as f64 / count as f64) as f32;

            RadialNeighbor {
                id: neighbor.id.clone(),
                similarity: neighbor.similarity,
                radius,
                angle,
                position: polar(center, radius, angle),
            }
        })
        .collect::<Vec<_>>();

    let edges = placed
        .iter()
        .map(|neighbor| SimilarityEdge {
            from: focal.to_string(),
            to: neighbor.id.clone(),
            similarity: neighbor.similarity,
            midpoint: midpoint(center, neighbor.position),
        })
        .collect::<Vec<_>>();

    debug!(focal, neighbors = count, "radial layout computed");

    RadialLayout {
        focal: PlacedNode {
            id: focal.to_string(),
            position: center,
            cluster: None,
        },
        neighbors: placed,
        edges,
    }
}
