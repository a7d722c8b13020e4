use eframe::egui::{self, PointerButton, Pos2, Rect, Ui};

use crate::layout::SimilarityEdge;
use crate::selection::{EdgeKey, VisualizationMode};

use super::super::render_utils::{circle_visible, local};
use super::super::{FrameHover, Workspace};
use super::{FOCAL_RADIUS, LABEL_HIT_RADIUS, NEIGHBOR_RADIUS, NODE_RADIUS};

pub(in crate::app) enum GraphHit {
    Node(String),
    Edge(SimilarityEdge),
}

fn nearest(pointer: Pos2, candidates: impl Iterator<Item = (usize, Pos2, f32)>) -> Option<usize> {
    candidates
        .filter_map(|(index, position, radius)| {
            let distance = position.distance(pointer);
            (distance <= radius).then_some((index, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}

impl Workspace {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        self.viewport
            .zoom_at(local(rect, pointer), scroll.signum(), rect.size());
    }

    pub(in crate::app) fn handle_graph_drag(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
        over_target: bool,
    ) {
        if response.drag_started_by(PointerButton::Primary) && !over_target {
            let origin = ui
                .input(|input| input.pointer.press_origin())
                .or_else(|| response.interact_pointer_pos());
            if let Some(origin) = origin {
                self.drag.pointer_down(local(rect, origin), &self.viewport);
            }
        }

        if !self.drag.is_dragging() {
            return;
        }

        match ui.input(|input| input.pointer.latest_pos()) {
            Some(pointer) if rect.contains(pointer) => {
                self.drag
                    .pointer_move(local(rect, pointer), &mut self.viewport, rect.size());
            }
            _ => self.drag.pointer_leave(),
        }

        if response.drag_stopped() || !ui.input(|input| input.pointer.primary_down()) {
            self.drag.pointer_up();
        }

        ui.ctx().request_repaint();
    }

    pub(in crate::app) fn hit_test(&self, rect: Rect, pointer: Option<Pos2>) -> Option<GraphHit> {
        let pointer = pointer.filter(|pointer| rect.contains(*pointer))?;
        let scale = self.viewport.scale();
        let to_screen = |model: Pos2| self.viewport.model_to_screen(rect.min, model);

        match self.selection.mode() {
            VisualizationMode::Global => {
                let layout = self.global.ready()?;
                let radius = NODE_RADIUS * scale + 2.0;
                let index = nearest(
                    pointer,
                    layout
                        .nodes
                        .iter()
                        .enumerate()
                        .map(|(index, node)| (index, to_screen(node.position), radius))
                        .filter(|(_, position, radius)| circle_visible(rect, *position, *radius)),
                )?;
                Some(GraphHit::Node(layout.nodes[index].id.clone()))
            }
            VisualizationMode::Radial => {
                let layout = self.radial.ready()?;
                if to_screen(layout.focal.position).distance(pointer) <= FOCAL_RADIUS * scale + 2.0
                {
                    return Some(GraphHit::Node(layout.focal.id.clone()));
                }

                let radius = NEIGHBOR_RADIUS * scale + 2.0;
                let neighbor = nearest(
                    pointer,
                    layout
                        .neighbors
                        .iter()
                        .enumerate()
                        .map(|(index, neighbor)| (index, to_screen(neighbor.position), radius)),
                );
                if let Some(index) = neighbor {
                    return Some(GraphHit::Node(layout.neighbors[index].id.clone()));
                }

                let edge = nearest(
                    pointer,
                    layout
                        .edges
                        .iter()
                        .enumerate()
                        .map(|(index, edge)| (index, to_screen(edge.midpoint), LABEL_HIT_RADIUS)),
                )?;
                Some(GraphHit::Edge(layout.edges[edge].clone()))
            }
        }
    }

    pub(in crate::app) fn apply_graph_hit(
        &mut self,
        hit: Option<GraphHit>,
        clicked: bool,
        hover: &mut FrameHover,
    ) {
        match hit {
            Some(GraphHit::Node(id)) => {
                if clicked {
                    self.focus_node(&id);
                }
                hover.node = Some(id);
            }
            Some(GraphHit::Edge(edge)) => {
                if clicked {
                    self.selection.select_edge(&edge);
                }
                hover.edge = Some(EdgeKey {
                    from: edge.from,
                    to: edge.to,
                });
            }
            None => {}
        }
    }
}
