use eframe::egui::{RichText, Ui};

use crate::layout::cluster_index_of;
use crate::palette::cluster_color;
use crate::util::format_similarity;

use super::super::{NodeDetails, Workspace};

impl Workspace {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        let Some(selected_id) = self.selection.selected_node().map(str::to_string) else {
            ui.label("Select a node from the graph or the search results.");
            return;
        };

        ui.label(RichText::new(selected_id.as_str()).strong());
        match cluster_index_of(&selected_id, &self.assignment.clusters) {
            Some(index) => {
                ui.label(
                    RichText::new(format!("Cluster {}", index + 1))
                        .color(cluster_color(Some(index))),
                );
            }
            None => {
                ui.weak("Not assigned to a cluster");
            }
        }
        ui.add_space(6.0);

        match &self.details {
            NodeDetails::None => {}
            NodeDetails::Loading => {
                ui.spinner();
            }
            NodeDetails::Missing(message) => {
                ui.weak(message.as_str());
            }
            NodeDetails::Ready(info) => {
                if !info.name.is_empty() {
                    ui.label(RichText::new(info.name.as_str()).italics());
                }
                if !info.organism.is_empty() {
                    ui.label(format!("Organism: {}", info.organism));
                }
                if !info.size.is_empty() {
                    ui.label(format!("Gene set size: {}", info.size));
                }
                if !info.description.is_empty() {
                    ui.add_space(4.0);
                    ui.label(info.description.as_str());
                }
                if !info.link.is_empty() {
                    ui.hyperlink_to("Open source record", info.link.as_str());
                }
            }
        }

        ui.add_space(8.0);
        if ui.button("Clear selection").clicked() {
            self.clear_focus();
            return;
        }

        let Some(edge) = self.selection.selected_edge().cloned() else {
            return;
        };

        ui.separator();
        ui.label(RichText::new("Selected edge").strong());
        ui.label(format!("{} → {}", edge.key.from, edge.key.to));
        ui.label(format!("Similarity: {}", format_similarity(edge.similarity)));
        if ui.button("Clear edge").clicked() {
            self.selection.clear_edge();
        }
    }
}
