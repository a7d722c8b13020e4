use eframe::egui::{
    self, Align2, Color32, FontId, Painter, PointerButton, Rect, Sense, Stroke, Ui, vec2,
};

use crate::layout::{Degradation, GlobalLayout, RadialLayout};
use crate::palette::{cluster_color, legend, similarity_color};
use crate::selection::{EdgeKey, VisualizationMode};
use crate::util::{format_similarity, short_label};

use super::super::render_utils::{blend_color, circle_visible, dim_color, draw_background, outline};
use super::super::{FrameHover, Slot, Workspace};
use super::{FOCAL_RADIUS, NEIGHBOR_RADIUS, NODE_RADIUS};

const SELECTED: Color32 = Color32::from_rgb(245, 206, 93);
const LABEL: Color32 = Color32::from_gray(238);
const LEGEND_ROW: f32 = 20.0;

impl Workspace {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui, hover: &mut FrameHover) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        if rect.size() != self.container {
            self.container = rect.size();
            self.viewport.fit_container(self.container);
        }
        if !self.layout_requested {
            self.layout_requested = true;
            self.request_active_layout();
        }

        let painter = ui.painter_at(rect);
        draw_background(&painter, rect, &self.viewport);

        self.handle_graph_zoom(ui, rect, &response);
        let pointer = response.hover_pos();
        let hit = self.hit_test(rect, pointer);
        self.handle_graph_drag(ui, rect, &response, hit.is_some());

        if hit.is_some() && !self.drag.is_dragging() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        } else if self.drag.is_dragging() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::Grabbing);
        }
        if response.hovered() {
            self.apply_graph_hit(hit, response.clicked_by(PointerButton::Primary), hover);
        }

        match self.selection.mode() {
            VisualizationMode::Global => match &self.global {
                Slot::Ready(layout) => {
                    self.draw_global(&painter, rect, layout);
                    self.draw_legend(&painter, rect, pointer, hover);
                }
                slot => self.draw_status(ui, &painter, rect, slot_status(slot)),
            },
            VisualizationMode::Radial => match &self.radial {
                Slot::Ready(layout) => self.draw_radial(&painter, rect, layout),
                Slot::Empty => self.draw_status(
                    ui,
                    &painter,
                    rect,
                    Status::Message("Select a node to see its neighborhood".to_owned()),
                ),
                slot => self.draw_status(ui, &painter, rect, slot_status(slot)),
            },
        }

        self.draw_zoom_controls(ui, rect);
    }

    fn draw_global(&self, painter: &Painter, rect: Rect, layout: &GlobalLayout) {
        let scale = self.viewport.scale();
        let cluster_focus = self.selection.hovered_cluster().is_some();

        for node in &layout.nodes {
            let position = self.viewport.model_to_screen(rect.min, node.position);
            let active = self.selection.is_node_active(&node.id);
            let radius = NODE_RADIUS * scale * if active { 1.6 } else { 1.0 };
            if !circle_visible(rect, position, radius) {
                continue;
            }

            let base = cluster_color(node.cluster);
            let selected = self.selection.selected_node() == Some(node.id.as_str());
            let color = if selected {
                blend_color(base, SELECTED, 0.55)
            } else if cluster_focus && !active {
                dim_color(base, 0.35)
            } else {
                base
            };

            painter.circle_filled(position, radius, color);
            painter.circle_stroke(position, radius, outline(if active { 1.8 } else { 1.0 }));
            if active {
                painter.text(
                    position + vec2(radius + 5.0, 0.0),
                    Align2::LEFT_CENTER,
                    short_label(&node.id, 28),
                    FontId::proportional(12.0),
                    LABEL,
                );
            }
        }

        if let Some(degraded) = layout.degraded {
            painter.text(
                rect.left_bottom() + vec2(10.0, -10.0),
                Align2::LEFT_BOTTOM,
                match degraded {
                    Degradation::TooFewNodes { nodes, neighbors } => format!(
                        "Only {nodes} nodes for {neighbors} embedding neighbors; the map may be coarse"
                    ),
                },
                FontId::proportional(12.0),
                Color32::from_rgb(240, 180, 90),
            );
        }
    }

    fn draw_legend(
        &self,
        painter: &Painter,
        rect: Rect,
        pointer: Option<egui::Pos2>,
        hover: &mut FrameHover,
    ) {
        let entries = legend(self.assignment.clusters.len());
        if entries.is_empty() {
            return;
        }

        let origin = rect.left_top() + vec2(10.0, 10.0);
        let frame = Rect::from_min_size(origin, vec2(130.0, LEGEND_ROW * entries.len() as f32 + 8.0));
        painter.rect_filled(frame, 4.0, Color32::from_rgba_unmultiplied(12, 14, 18, 210));

        for (index, entry) in entries.iter().enumerate() {
            let row = Rect::from_min_size(
                origin + vec2(4.0, 4.0 + LEGEND_ROW * index as f32),
                vec2(122.0, LEGEND_ROW),
            );
            if pointer.is_some_and(|pointer| row.contains(pointer)) {
                hover.cluster = Some(index);
            }
            if self.selection.is_cluster_hovered(index) {
                painter.rect_filled(row, 3.0, Color32::from_rgba_unmultiplied(80, 90, 104, 120));
            }

            painter.circle_filled(row.left_center() + vec2(9.0, 0.0), 5.0, entry.color);
            painter.text(
                row.left_center() + vec2(22.0, 0.0),
                Align2::LEFT_CENTER,
                &entry.label,
                FontId::proportional(12.0),
                LABEL,
            );
        }
    }

    fn draw_radial(&self, painter: &Painter, rect: Rect, layout: &RadialLayout) {
        let scale = self.viewport.scale();
        let focal = self.viewport.model_to_screen(rect.min, layout.focal.position);
        let width = scale.sqrt();

        for edge in &layout.edges {
            let key = EdgeKey {
                from: edge.from.clone(),
                to: edge.to.clone(),
            };
            let active = self.selection.is_edge_active(&key);
            let Some(target) = layout.neighbors.iter().find(|neighbor| neighbor.id == edge.to)
            else {
                continue;
            };
            let end = self.viewport.model_to_screen(rect.min, target.position);
            let color = similarity_color(edge.similarity);

            let stroke = if active {
                Stroke::new(3.0 * width, color)
            } else {
                Stroke::new(1.2 * width, dim_color(color, 0.6))
            };
            painter.line_segment([focal, end], stroke);

            let label = self.viewport.model_to_screen(rect.min, edge.midpoint);
            let text_color = if active { SELECTED } else { LABEL };
            let bounds = painter.text(
                label,
                Align2::CENTER_CENTER,
                format_similarity(edge.similarity),
                FontId::proportional(if active { 13.0 } else { 11.0 }),
                text_color,
            );
            if active {
                painter.rect_stroke(
                    bounds.expand(3.0),
                    3.0,
                    Stroke::new(1.0, SELECTED),
                    egui::StrokeKind::Outside,
                );
            }
        }

        for neighbor in &layout.neighbors {
            let position = self.viewport.model_to_screen(rect.min, neighbor.position);
            let active = self.selection.is_node_active(&neighbor.id);
            let radius = NEIGHBOR_RADIUS * scale * if active { 1.4 } else { 1.0 };
            if !circle_visible(rect, position, radius) {
                continue;
            }

            painter.circle_filled(position, radius, similarity_color(neighbor.similarity));
            painter.circle_stroke(position, radius, outline(if active { 2.0 } else { 1.0 }));
            painter.text(
                position + vec2(radius + 5.0, 0.0),
                Align2::LEFT_CENTER,
                short_label(&neighbor.id, 24),
                FontId::proportional(if active { 13.0 } else { 11.0 }),
                LABEL,
            );
        }

        let radius = FOCAL_RADIUS * scale;
        painter.circle_filled(focal, radius, SELECTED);
        painter.circle_stroke(focal, radius, outline(2.0));
        painter.text(
            focal + vec2(0.0, radius + 6.0),
            Align2::CENTER_TOP,
            short_label(&layout.focal.id, 32),
            FontId::proportional(13.0),
            LABEL,
        );
    }

    fn draw_status(&self, ui: &mut Ui, painter: &Painter, rect: Rect, status: Status) {
        match status {
            Status::Loading => {
                ui.put(
                    Rect::from_center_size(rect.center(), vec2(32.0, 32.0)),
                    egui::Spinner::new().size(28.0),
                );
            }
            Status::Message(message) => {
                painter.text(
                    rect.center(),
                    Align2::CENTER_CENTER,
                    message,
                    FontId::proportional(15.0),
                    LABEL,
                );
            }
            Status::Failed { reason, message } => {
                painter.text(
                    rect.center(),
                    Align2::CENTER_BOTTOM,
                    format!("No layout ({reason})"),
                    FontId::proportional(16.0),
                    Color32::from_rgb(240, 120, 100),
                );
                painter.text(
                    rect.center() + vec2(0.0, 8.0),
                    Align2::CENTER_TOP,
                    message,
                    FontId::proportional(12.0),
                    LABEL,
                );
            }
        }
    }

    fn draw_zoom_controls(&mut self, ui: &mut Ui, rect: Rect) {
        let size = vec2(30.0, 26.0);
        let zoom_in = Rect::from_min_size(rect.right_top() + vec2(-40.0, 10.0), size);
        let zoom_out = zoom_in.translate(vec2(0.0, size.y + 6.0));
        let container = rect.size();

        let plus = ui
            .add_enabled_ui(self.viewport.can_zoom_in(), |ui| {
                ui.put(zoom_in, egui::Button::new("+"))
            })
            .inner;
        if plus.clicked() {
            self.viewport.zoom_step(1.0, container);
        }

        let minus = ui
            .add_enabled_ui(self.viewport.can_zoom_out(), |ui| {
                ui.put(zoom_out, egui::Button::new("−"))
            })
            .inner;
        if minus.clicked() {
            self.viewport.zoom_step(-1.0, container);
        }

        draw_scale_label(ui, zoom_out, self.viewport.scale());
    }
}

enum Status {
    Loading,
    Message(String),
    Failed {
        reason: &'static str,
        message: String,
    },
}

fn slot_status<T>(slot: &Slot<T>) -> Status {
    match slot {
        Slot::Empty | Slot::Loading | Slot::Ready(_) => Status::Loading,
        Slot::Failed { reason, message } => Status::Failed {
            reason: *reason,
            message: message.clone(),
        },
    }
}

fn draw_scale_label(ui: &Ui, below: Rect, scale: f32) {
    ui.painter().text(
        below.center_bottom() + vec2(0.0, 6.0),
        Align2::CENTER_TOP,
        format!("{:.0}%", scale * 100.0),
        FontId::proportional(11.0),
        LABEL,
    );
}
