use eframe::egui::{self, Align, Context, Key, Layout, RichText, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::data::{DatasetId, MatrixVariant};
use crate::palette::cluster_color;
use crate::selection::{EdgeKey, VisualizationMode};
use crate::util::{format_similarity, short_label};

use super::super::{FrameHover, Screen, Workspace};

const SEARCH_RESULTS: usize = 12;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

impl Workspace {
    pub(in crate::app) fn draw_top_bar(&mut self, ctx: &Context) -> Option<DatasetId> {
        let mut open = None;

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("PAG explorer");
                    ui.separator();
                    let mut next_screen = None;
                    for screen in Screen::ALL {
                        if ui
                            .selectable_label(self.screen == screen, screen.label())
                            .clicked()
                        {
                            next_screen = Some(screen);
                        }
                    }
                    if let Some(screen) = next_screen {
                        self.set_screen(screen);
                    }
                    ui.separator();
                    ui.label(format!("dataset: {}", self.dataset));
                    ui.label(format!("algorithm: {}", self.assignment.algorithm));
                    ui.label(format!("nodes: {}", self.assignment.sorted_nodes.len()));
                    ui.label(format!("clusters: {}", self.assignment.clusters.len()));

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if ui.button("Open").clicked() && !self.dataset_input.trim().is_empty() {
                            let name = self.dataset_input.trim().to_string();
                            open = Some(if self.custom_input {
                                DatasetId::Custom(name)
                            } else {
                                DatasetId::Standard(name)
                            });
                        }
                        ui.checkbox(&mut self.custom_input, "custom run");
                        ui.add(
                            egui::TextEdit::singleline(&mut self.dataset_input)
                                .hint_text("dataset")
                                .desired_width(140.0),
                        );
                        ui.separator();
                        if ui.button("Re-layout").clicked() {
                            self.relayout();
                        }
                    });
                });
            });

        open.filter(|dataset| dataset != &self.dataset)
    }

    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui, hover: &mut FrameHover) {
        ui.heading("View");
        ui.add_space(4.0);

        let mut next_mode = None;
        ui.horizontal(|ui| {
            for mode in VisualizationMode::ALL {
                if ui
                    .selectable_label(self.selection.mode() == mode, mode.label())
                    .clicked()
                {
                    next_mode = Some(mode);
                }
            }
        });
        if let Some(mode) = next_mode {
            self.set_mode(mode);
        }

        ui.separator();
        self.draw_matrix_controls(ui);

        ui.separator();
        self.draw_search(ui, hover);

        ui.separator();
        match self.selection.mode() {
            VisualizationMode::Global => self.draw_cluster_list(ui, hover),
            VisualizationMode::Radial => self.draw_edge_table(ui, hover),
        }
    }

    pub(in crate::app) fn draw_matrix_controls(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Matrix").strong());

        let mut next = None;
        ui.horizontal(|ui| {
            if ui
                .radio(self.variant == MatrixVariant::Adjacency, "adjacency")
                .clicked()
            {
                next = Some(MatrixVariant::Adjacency);
            }
            if ui
                .radio(
                    matches!(self.variant, MatrixVariant::Connectivity { .. }),
                    "connectivity",
                )
                .clicked()
            {
                next = Some(self.connectivity_from_input());
            }
        });

        if matches!(self.variant, MatrixVariant::Connectivity { .. }) {
            ui.horizontal(|ui| {
                ui.label("α");
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.alpha_input)
                        .hint_text("default")
                        .desired_width(80.0),
                );
                let submitted =
                    response.lost_focus() && ui.input(|input| input.key_pressed(Key::Enter));
                if submitted || ui.button("Apply").clicked() {
                    next = Some(self.connectivity_from_input());
                }
            });
        }

        if let Some(variant) = next {
            self.set_variant(variant);
        }
    }

    fn connectivity_from_input(&self) -> MatrixVariant {
        let alpha = self.alpha_input.trim();
        MatrixVariant::Connectivity {
            alpha: (!alpha.is_empty()).then(|| alpha.to_string()),
        }
    }

    fn draw_search(&mut self, ui: &mut Ui, hover: &mut FrameHover) {
        ui.label(RichText::new("Find node").strong());
        ui.add(
            egui::TextEdit::singleline(&mut self.search)
                .hint_text("GO id")
                .desired_width(f32::INFINITY),
        );

        let query = self.search.trim();
        if query.is_empty() {
            return;
        }

        let matcher = SkimMatcherV2::default();
        let mut matches = self
            .assignment
            .sorted_nodes
            .iter()
            .filter_map(|node| {
                fuzzy_match_score(&matcher, node, query).map(|score| (score, node.clone()))
            })
            .collect::<Vec<_>>();
        matches.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        matches.truncate(SEARCH_RESULTS);

        if matches.is_empty() {
            ui.weak("No matching nodes.");
            return;
        }

        let mut focus = None;
        for (_, node) in &matches {
            let selected = self.selection.selected_node() == Some(node.as_str());
            let response = ui.selectable_label(selected, node.as_str());
            if response.hovered() {
                hover.node = Some(node.clone());
            }
            if response.clicked() {
                focus = Some(node.clone());
            }
        }
        if let Some(node) = focus {
            self.focus_node(&node);
        }
    }

    fn draw_cluster_list(&mut self, ui: &mut Ui, hover: &mut FrameHover) {
        ui.label(RichText::new("Clusters").strong());
        if self.assignment.clusters.is_empty() {
            ui.weak("This dataset has no clusters.");
            return;
        }

        let mut focus = None;
        egui::ScrollArea::vertical()
            .id_salt("cluster_list")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for (index, members) in self.assignment.clusters.iter().enumerate() {
                    let title = RichText::new(format!("Cluster {} ({})", index + 1, members.len()))
                        .color(cluster_color(Some(index)));
                    let collapsing = egui::CollapsingHeader::new(title)
                        .id_salt(("cluster", index))
                        .show(ui, |ui| {
                            for member in members {
                                if ui.link(short_label(member, 36)).on_hover_text(member.as_str()).clicked() {
                                    focus = Some(member.clone());
                                }
                            }
                        });
                    if collapsing.header_response.hovered() {
                        hover.cluster = Some(index);
                    }
                }
            });

        if let Some(node) = focus {
            self.focus_node(&node);
        }
    }

    fn draw_edge_table(&mut self, ui: &mut Ui, hover: &mut FrameHover) {
        ui.label(RichText::new("Neighbors").strong());
        if self.radial_loader.is_pending() {
            ui.spinner();
            return;
        }
        if self.selection.edges().is_empty() {
            ui.weak("No similarity edges for the selected node.");
            return;
        }

        let mut clicked = None;
        egui::ScrollArea::vertical()
            .id_salt("edge_table")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                egui::Grid::new("edge_grid")
                    .num_columns(2)
                    .striped(true)
                    .show(ui, |ui| {
                        for edge in self.selection.edges() {
                            let key = EdgeKey {
                                from: edge.from.clone(),
                                to: edge.to.clone(),
                            };
                            let active = self.selection.is_edge_active(&key);
                            let response =
                                ui.selectable_label(active, short_label(&edge.to, 30));
                            ui.label(format_similarity(edge.similarity));
                            ui.end_row();

                            if response.hovered() {
                                hover.edge = Some(key);
                            }
                            if response.clicked() {
                                clicked = Some(edge.clone());
                            }
                        }
                    });
            });

        if let Some(edge) = clicked {
            self.selection.select_edge(&edge);
        }
    }
}
