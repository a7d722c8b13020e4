use std::collections::HashSet;

use eframe::egui::Pos2;
use serde::{Deserialize, Serialize};

use crate::layout::SimilarityEdge;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisualizationMode {
    #[default]
    Global,
    Radial,
}

impl VisualizationMode {
    pub const ALL: [Self; 2] = [Self::Global, Self::Radial];

    pub fn label(self) -> &'static str {
        match self {
            Self::Global => "Cluster map",
            Self::Radial => "Neighborhood",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EdgeKey {
    pub from: String,
    pub to: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SelectedEdge {
    pub key: EdgeKey,
    pub similarity: f64,
    pub midpoint: Pos2,
}

impl From<&SimilarityEdge> for SelectedEdge {
    fn from(edge: &SimilarityEdge) -> Self {
        Self {
            key: EdgeKey {
                from: edge.from.clone(),
                to: edge.to.clone(),
            },
            similarity: edge.similarity,
            midpoint: edge.midpoint,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FocusChange {
    Unchanged,
    Selected,
    /// The radial layout around the previous focal node is stale and must be recomputed.
    Refocus(String),
}

#[derive(Clone, Debug, Default)]
pub struct SelectionState {
    mode: VisualizationMode,
    selected_node: Option<String>,
    hovered_node: Option<String>,
    selected_edge: Option<SelectedEdge>,
    hovered_edge: Option<EdgeKey>,
    hovered_cluster: Option<usize>,
    hovered_cluster_members: HashSet<String>,
    edges: Vec<SimilarityEdge>,
}

impl SelectionState {
    pub fn new(mode: VisualizationMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> VisualizationMode {
        self.mode
    }

    pub fn selected_node(&self) -> Option<&str> {
        self.selected_node.as_deref()
    }

    pub fn hovered_node(&self) -> Option<&str> {
        self.hovered_node.as_deref()
    }

    pub fn selected_edge(&self) -> Option<&SelectedEdge> {
        self.selected_edge.as_ref()
    }

    pub fn hovered_edge(&self) -> Option<&EdgeKey> {
        self.hovered_edge.as_ref()
    }

    pub fn hovered_cluster(&self) -> Option<usize> {
        self.hovered_cluster
    }

    pub fn edges(&self) -> &[SimilarityEdge] {
        &self.edges
    }

    /// Switching modes always drops the edge selection. Edges only survive when entering the
    /// radial view with its neighborhood already loaded.
    pub fn set_mode(&mut self, mode: VisualizationMode, radial_loaded: bool) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        self.selected_edge = None;
        self.hovered_edge = None;
        if mode == VisualizationMode::Global || !radial_loaded {
            self.edges.clear();
        }
    }

    pub fn select_node(&mut self, node: &str) -> FocusChange {
        if self.selected_node.as_deref() == Some(node) {
            return FocusChange::Unchanged;
        }
        self.selected_node = Some(node.to_string());

        match self.mode {
            VisualizationMode::Global => FocusChange::Selected,
            VisualizationMode::Radial => {
                self.edges.clear();
                self.selected_edge = None;
                self.hovered_edge = None;
                FocusChange::Refocus(node.to_string())
            }
        }
    }

    pub fn clear_node(&mut self) {
        self.selected_node = None;
        self.selected_edge = None;
        self.edges.clear();
    }

    pub fn select_edge(&mut self, edge: &SimilarityEdge) {
        self.selected_edge = Some(SelectedEdge::from(edge));
    }

    pub fn clear_edge(&mut self) {
        self.selected_edge = None;
    }

    pub fn hover_node(&mut self, node: Option<&str>) {
        self.hovered_node = node.map(str::to_string);
    }

    pub fn hover_edge(&mut self, edge: Option<EdgeKey>) {
        self.hovered_edge = edge;
    }

    pub fn hover_cluster(&mut self, cluster: Option<(usize, &[String])>) {
        self.hovered_cluster_members.clear();
        self.hovered_cluster = None;
        if let Some((index, members)) = cluster {
            self.hovered_cluster_members.extend(members.iter().cloned());
            self.hovered_cluster = Some(index);
        }
    }

    pub fn set_edges(&mut self, edges: Vec<SimilarityEdge>) {
        self.edges = edges;
        if let Some(selected) = &self.selected_edge {
            let still_present = self
                .edges
                .iter()
                .any(|edge| edge.from == selected.key.from && edge.to == selected.key.to);
            if !still_present {
                self.selected_edge = None;
            }
        }
    }

    /// Clears everything tied to the previous dataset. The selected node survives when it is
    /// part of `universe`, otherwise the first node of the universe becomes selected.
    pub fn reset_for_dataset(&mut self, universe: &[String]) {
        self.hovered_node = None;
        self.selected_edge = None;
        self.hovered_edge = None;
        self.hovered_cluster = None;
        self.hovered_cluster_members.clear();
        self.edges.clear();

        let keep = self
            .selected_node
            .as_ref()
            .is_some_and(|node| universe.contains(node));
        if !keep {
            self.selected_node = universe.first().cloned();
        }
    }

    pub fn is_node_active(&self, node: &str) -> bool {
        self.hovered_node.as_deref() == Some(node)
            || self.selected_node.as_deref() == Some(node)
            || self.hovered_cluster_members.contains(node)
    }

    pub fn is_edge_active(&self, edge: &EdgeKey) -> bool {
        self.hovered_edge.as_ref() == Some(edge)
            || self
                .selected_edge
                .as_ref()
                .is_some_and(|selected| &selected.key == edge)
    }

    pub fn is_cluster_hovered(&self, cluster: usize) -> bool {
        self.hovered_cluster == Some(cluster)
    }
}
