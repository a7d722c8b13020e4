use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::Vec2;
use serde::Serialize;

use crate::layout::{Layout, SimilarityEdge};
use crate::palette::{cluster_entry, similarity_color};
use crate::selection::VisualizationMode;

#[derive(Debug, Serialize)]
pub struct LayoutExport {
    pub dataset: String,
    pub mode: VisualizationMode,
    pub width: f32,
    pub height: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focal: Option<String>,
    pub nodes: Vec<ExportedNode>,
    pub edges: Vec<ExportedEdge>,
}

#[derive(Debug, Serialize)]
pub struct ExportedNode {
    pub id: String,
    pub x: f32,
    pub y: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<usize>,
    pub color: String,
}

#[derive(Debug, Serialize)]
pub struct ExportedEdge {
    pub from: String,
    pub to: String,
    pub similarity: f64,
    pub label_x: f32,
    pub label_y: f32,
}

impl From<&SimilarityEdge> for ExportedEdge {
    fn from(edge: &SimilarityEdge) -> Self {
        Self {
            from: edge.from.clone(),
            to: edge.to.clone(),
            similarity: edge.similarity,
            label_x: edge.midpoint.x,
            label_y: edge.midpoint.y,
        }
    }
}

fn hex(color: eframe::egui::Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}

impl LayoutExport {
    pub fn new(dataset: &str, layout: &Layout, viewport: Vec2) -> Self {
        let (mode, focal, nodes, edges) = match layout {
            Layout::Global(global) => {
                let nodes = global
                    .nodes
                    .iter()
                    .map(|node| ExportedNode {
                        id: node.id.clone(),
                        x: node.position.x,
                        y: node.position.y,
                        cluster: node.cluster,
                        color: cluster_entry(node.cluster).name.to_string(),
                    })
                    .collect();
                (VisualizationMode::Global, None, nodes, Vec::new())
            }
            Layout::Radial(radial) => {
                let focal = ExportedNode {
                    id: radial.focal.id.clone(),
                    x: radial.focal.position.x,
                    y: radial.focal.position.y,
                    cluster: None,
                    color: "black".to_string(),
                };
                let nodes = std::iter::once(focal)
                    .chain(radial.neighbors.iter().map(|neighbor| ExportedNode {
                        id: neighbor.id.clone(),
                        x: neighbor.position.x,
                        y: neighbor.position.y,
                        cluster: None,
                        color: hex(similarity_color(neighbor.similarity)),
                    }))
                    .collect();
                let edges = radial.edges.iter().map(ExportedEdge::from).collect();
                (
                    VisualizationMode::Radial,
                    Some(radial.focal.id.clone()),
                    nodes,
                    edges,
                )
            }
        };

        Self {
            dataset: dataset.to_string(),
            mode,
            width: viewport.x,
            height: viewport.y,
            focal,
            nodes,
            edges,
        }
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize layout")?;
        fs::write(path, json)
            .with_context(|| format!("failed to write layout export to {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;
    use crate::layout::{GlobalLayout, PlacedNode};

    #[test]
    fn global_export_names_cluster_colors() {
        let layout = Layout::Global(GlobalLayout {
            nodes: vec![
                PlacedNode {
                    id: "GO:1".to_string(),
                    position: pos2(100.0, 100.0),
                    cluster: Some(9),
                },
                PlacedNode {
                    id: "GO:2".to_string(),
                    position: pos2(700.0, 500.0),
                    cluster: None,
                },
            ],
            degraded: None,
        });

        let export = LayoutExport::new("kegg", &layout, vec2(800.0, 600.0));
        let json = serde_json::to_value(&export).unwrap();

        assert_eq!(json["mode"], "Global");
        assert_eq!(json["nodes"][0]["color"], "green");
        assert_eq!(json["nodes"][1]["color"], "red");
        assert!(json["nodes"][1].get("cluster").is_none());
        assert!(json.get("focal").is_none());
    }
}
