use std::ops::Range;

use eframe::egui::{
    self, Align2, Color32, FontId, Painter, Rect, RichText, Sense, Stroke, StrokeKind, Ui, pos2,
    vec2,
};

use crate::layout::ConnectivityMatrix;
use crate::util::{format_matrix_cell, short_label};

use super::super::{Slot, Workspace};

const CELL_WIDTH: f32 = 100.0;
const CELL_HEIGHT: f32 = 35.0;
const HEADER_WIDTH: f32 = 120.0;
const HEADER_FILL: Color32 = Color32::from_gray(38);
const GRID_LINE: Color32 = Color32::from_gray(62);
const CELL_TEXT: Color32 = Color32::from_gray(226);
const HEADER_TEXT: Color32 = Color32::from_rgb(170, 200, 240);
const FAILED_TEXT: Color32 = Color32::from_rgb(232, 124, 112);

impl Workspace {
    pub(in crate::app) fn draw_matrix_info(&mut self, ui: &mut Ui) {
        ui.heading("Matrix");
        ui.add_space(4.0);
        self.draw_matrix_controls(ui);

        ui.separator();
        ui.label(RichText::new("Dimensions").strong());
        match &self.matrix {
            Slot::Ready(matrix) => {
                let (rows, columns) = dimensions(matrix);
                ui.label(format!("{rows} x {columns}"));
            }
            Slot::Loading => {
                ui.spinner();
            }
            Slot::Empty => {
                ui.weak("Select a matrix to load.");
            }
            Slot::Failed { message, .. } => {
                ui.colored_label(FAILED_TEXT, message.as_str());
            }
        }
    }

    pub(in crate::app) fn draw_matrix(&self, ui: &mut Ui) {
        match &self.matrix {
            Slot::Ready(matrix) if !matrix.rows.is_empty() => draw_matrix_grid(ui, matrix),
            Slot::Ready(_) => centered_message(ui, "The matrix has no rows."),
            Slot::Empty | Slot::Loading => {
                ui.centered_and_justified(|ui| {
                    ui.spinner();
                });
            }
            Slot::Failed { reason, .. } => {
                centered_message(ui, &format!("No matrix ({reason})"));
            }
        }
    }
}

fn centered_message(ui: &mut Ui, text: &str) {
    ui.centered_and_justified(|ui| {
        ui.label(RichText::new(text).size(18.0).strong());
    });
}

fn dimensions(matrix: &ConnectivityMatrix) -> (usize, usize) {
    let columns = matrix.rows.iter().map(Vec::len).max().unwrap_or(0);
    (matrix.rows.len(), columns)
}

fn draw_matrix_grid(ui: &mut Ui, matrix: &ConnectivityMatrix) {
    let (rows, columns) = dimensions(matrix);
    let content = vec2(
        HEADER_WIDTH + columns as f32 * CELL_WIDTH,
        CELL_HEIGHT + rows as f32 * CELL_HEIGHT,
    );

    egui::ScrollArea::both()
        .id_salt("matrix_grid")
        .auto_shrink([false, false])
        .show_viewport(ui, |ui, viewport| {
            let (content_rect, _) = ui.allocate_exact_size(content, Sense::hover());
            let origin = content_rect.min;
            let painter = ui.painter();

            let row_range =
                visible_range(viewport.min.y, viewport.max.y, CELL_HEIGHT, CELL_HEIGHT, rows);
            let column_range =
                visible_range(viewport.min.x, viewport.max.x, HEADER_WIDTH, CELL_WIDTH, columns);

            for row in row_range.clone() {
                let y = origin.y + CELL_HEIGHT + row as f32 * CELL_HEIGHT;
                for column in column_range.clone() {
                    let x = origin.x + HEADER_WIDTH + column as f32 * CELL_WIDTH;
                    let cell = Rect::from_min_size(pos2(x, y), vec2(CELL_WIDTH, CELL_HEIGHT));
                    painter.rect_stroke(cell, 0.0, Stroke::new(1.0, GRID_LINE), StrokeKind::Inside);
                    if let Some(value) = matrix.rows[row].get(column) {
                        painter.text(
                            cell.left_center() + vec2(6.0, 0.0),
                            Align2::LEFT_CENTER,
                            format_matrix_cell(*value),
                            FontId::monospace(12.0),
                            CELL_TEXT,
                        );
                    }
                }
            }

            let top = origin.y + viewport.min.y;
            let left = origin.x + viewport.min.x;
            for column in column_range {
                let x = origin.x + HEADER_WIDTH + column as f32 * CELL_WIDTH;
                let cell = Rect::from_min_size(pos2(x, top), vec2(CELL_WIDTH, CELL_HEIGHT));
                header_cell(painter, cell, &node_label(matrix, column, 13));
            }
            for row in row_range {
                let y = origin.y + CELL_HEIGHT + row as f32 * CELL_HEIGHT;
                let cell = Rect::from_min_size(pos2(left, y), vec2(HEADER_WIDTH, CELL_HEIGHT));
                header_cell(painter, cell, &node_label(matrix, row, 16));
            }
            header_cell(
                painter,
                Rect::from_min_size(pos2(left, top), vec2(HEADER_WIDTH, CELL_HEIGHT)),
                "",
            );
        });
}

fn header_cell(painter: &Painter, cell: Rect, text: &str) {
    painter.rect_filled(cell, 0.0, HEADER_FILL);
    painter.rect_stroke(cell, 0.0, Stroke::new(1.0, GRID_LINE), StrokeKind::Inside);
    painter.text(
        cell.left_center() + vec2(6.0, 0.0),
        Align2::LEFT_CENTER,
        text,
        FontId::monospace(12.0),
        HEADER_TEXT,
    );
}

fn node_label(matrix: &ConnectivityMatrix, index: usize, max_chars: usize) -> String {
    matrix
        .sorted_nodes
        .get(index)
        .map_or_else(|| (index + 1).to_string(), |id| short_label(id, max_chars))
}

/// Cells of `size` laid out after a `header` band that intersect `[start, end)`.
fn visible_range(start: f32, end: f32, header: f32, size: f32, count: usize) -> Range<usize> {
    let first = ((start - header) / size).floor().max(0.0) as usize;
    let last = (((end - header) / size).ceil().max(0.0) as usize).min(count);
    first.min(last)..last
}
