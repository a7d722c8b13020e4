use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use eframe::egui::{self, Context, Vec2, vec2};
use tracing::{error, info};

use crate::data::{ClusterAssignment, DatasetId, MatrixVariant, NodeInfo};
use crate::layout::{ConnectivityMatrix, GlobalLayout, RadialLayout};
use crate::pipeline::Pipeline;
use crate::request::Loader;
use crate::selection::{EdgeKey, FocusChange, SelectionState, VisualizationMode};
use crate::viewport::{DragGesture, Viewport};

mod graph;
mod render_utils;
mod ui;

const DEFAULT_CONTAINER: Vec2 = vec2(1000.0, 800.0);
const LOADER_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Clone, Debug)]
pub struct StartupView {
    pub dataset: DatasetId,
    pub mode: VisualizationMode,
    pub variant: MatrixVariant,
    pub node: Option<String>,
}

pub struct PagExplorerApp {
    pipeline: Pipeline,
    startup: StartupView,
    state: AppState,
}

enum AppState {
    Loading {
        dataset: DatasetId,
        previous: Option<SelectionState>,
        rx: Receiver<Result<ClusterAssignment, String>>,
    },
    Ready(Box<Workspace>),
    Error {
        dataset: DatasetId,
        message: String,
    },
}

enum Slot<T> {
    Empty,
    Loading,
    Ready(T),
    Failed { reason: &'static str, message: String },
}

impl<T> Slot<T> {
    fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(layout) => Self::Ready(layout),
            Err(failure) => {
                let reason = crate::pipeline::failure_reason(&failure);
                error!(reason, error = %format!("{failure:#}"), "background request failed");
                Self::Failed {
                    reason,
                    message: format!("{failure:#}"),
                }
            }
        }
    }

    fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(layout) => Some(layout),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Screen {
    Graph,
    Matrix,
}

impl Screen {
    const ALL: [Self; 2] = [Self::Graph, Self::Matrix];

    fn label(self) -> &'static str {
        match self {
            Self::Graph => "Graph",
            Self::Matrix => "Matrix",
        }
    }
}

enum NodeDetails {
    None,
    Loading,
    Ready(NodeInfo),
    Missing(String),
}

#[derive(Default)]
struct FrameHover {
    node: Option<String>,
    edge: Option<EdgeKey>,
    cluster: Option<usize>,
}

struct Workspace {
    pipeline: Pipeline,
    dataset: DatasetId,
    assignment: ClusterAssignment,
    variant: MatrixVariant,
    alpha_input: String,
    screen: Screen,
    viewport: Viewport,
    drag: DragGesture,
    selection: SelectionState,
    container: Vec2,
    global: Slot<GlobalLayout>,
    radial: Slot<RadialLayout>,
    details: NodeDetails,
    matrix: Slot<ConnectivityMatrix>,
    global_loader: Loader<Result<GlobalLayout>>,
    radial_loader: Loader<Result<RadialLayout>>,
    details_loader: Loader<Result<NodeInfo>>,
    matrix_loader: Loader<Result<ConnectivityMatrix>>,
    search: String,
    dataset_input: String,
    custom_input: bool,
    layout_requested: bool,
}

impl PagExplorerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, pipeline: Pipeline, startup: StartupView) -> Self {
        let state = Self::start_load(&pipeline, startup.dataset.clone(), None);
        Self {
            pipeline,
            startup,
            state,
        }
    }

    fn spawn_load(
        pipeline: &Pipeline,
        dataset: DatasetId,
    ) -> Receiver<Result<ClusterAssignment, String>> {
        let (tx, rx) = mpsc::channel();
        let pipeline = pipeline.clone();

        thread::spawn(move || {
            let result = pipeline
                .cluster_assignment(&dataset)
                .map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(
        pipeline: &Pipeline,
        dataset: DatasetId,
        previous: Option<SelectionState>,
    ) -> AppState {
        info!(%dataset, "loading dataset");
        AppState::Loading {
            rx: Self::spawn_load(pipeline, dataset.clone()),
            dataset,
            previous,
        }
    }
}

impl eframe::App for PagExplorerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading {
                dataset,
                previous,
                rx,
            } => {
                match rx.try_recv() {
                    Ok(Ok(assignment)) => {
                        let workspace = Workspace::new(
                            self.pipeline.clone(),
                            dataset.clone(),
                            assignment,
                            &self.startup,
                            previous.take(),
                        );
                        transition = Some(AppState::Ready(Box::new(workspace)));
                    }
                    Ok(Err(message)) => {
                        error!(%dataset, %message, "dataset failed to load");
                        transition = Some(AppState::Error {
                            dataset: dataset.clone(),
                            message,
                        });
                    }
                    Err(TryRecvError::Empty) => ctx.request_repaint_after(LOADER_POLL_INTERVAL),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(AppState::Error {
                            dataset: dataset.clone(),
                            message: "Background load worker disconnected".to_owned(),
                        });
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading(format!("Loading {dataset}..."));
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error { dataset, message } => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading(format!("Failed to load {dataset}"));
                    ui.add_space(6.0);
                    ui.label(message.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(&self.pipeline, dataset.clone(), None));
                    }
                });
            }
            AppState::Ready(workspace) => {
                if let Some(next) = workspace.show(ctx) {
                    // The selection is handed over so a node shared by both datasets stays selected.
                    let previous = Some(workspace.selection.clone());
                    transition = Some(Self::start_load(&self.pipeline, next, previous));
                }
            }
        }

        if let Some(next_state) = transition {
            self.state = next_state;
        }
    }
}

impl Workspace {
    fn new(
        pipeline: Pipeline,
        dataset: DatasetId,
        assignment: ClusterAssignment,
        startup: &StartupView,
        previous: Option<SelectionState>,
    ) -> Self {
        let first_load = previous.is_none();
        let mut selection = previous.unwrap_or_else(|| SelectionState::new(startup.mode));
        selection.reset_for_dataset(&assignment.sorted_nodes);
        if first_load
            && let Some(node) = &startup.node
            && assignment.sorted_nodes.contains(node)
        {
            selection.select_node(node);
        }

        let alpha_input = match &startup.variant {
            MatrixVariant::Connectivity { alpha: Some(alpha) } => alpha.clone(),
            _ => String::new(),
        };
        let (dataset_input, custom_input) = match &dataset {
            DatasetId::Standard(name) => (name.clone(), false),
            DatasetId::Custom(id) => (id.clone(), true),
        };

        info!(
            %dataset,
            nodes = assignment.sorted_nodes.len(),
            clusters = assignment.clusters.len(),
            algorithm = assignment.algorithm.as_str(),
            "dataset ready"
        );

        let mut workspace = Self {
            pipeline,
            dataset,
            assignment,
            variant: startup.variant.clone(),
            alpha_input,
            screen: Screen::Graph,
            viewport: Viewport::default(),
            drag: DragGesture::default(),
            selection,
            container: DEFAULT_CONTAINER,
            global: Slot::Empty,
            radial: Slot::Empty,
            details: NodeDetails::None,
            matrix: Slot::Empty,
            global_loader: Loader::new("global-layout"),
            radial_loader: Loader::new("radial-layout"),
            details_loader: Loader::new("node-details"),
            matrix_loader: Loader::new("matrix"),
            search: String::new(),
            dataset_input,
            custom_input,
            layout_requested: false,
        };
        workspace.request_details();
        workspace
    }

    fn request_active_layout(&mut self) {
        match self.selection.mode() {
            VisualizationMode::Global => self.request_global(),
            VisualizationMode::Radial => self.request_radial(),
        }
    }

    fn request_global(&mut self) {
        let pipeline = self.pipeline.clone();
        let dataset = self.dataset.clone();
        let variant = self.variant.clone();
        let clusters = self.assignment.clusters.clone();
        let container = self.container;

        self.global = Slot::Loading;
        self.global_loader.request(move || {
            pipeline.global_layout(&dataset, &variant, &clusters, container)
        });
    }

    fn request_radial(&mut self) {
        let Some(focal) = self.selection.selected_node().map(str::to_string) else {
            self.radial_loader.cancel();
            self.radial = Slot::Empty;
            return;
        };
        let pipeline = self.pipeline.clone();
        let universe = self.assignment.sorted_nodes.clone();
        let container = self.container;

        self.radial = Slot::Loading;
        self.radial_loader
            .request(move || pipeline.radial_layout(&focal, &universe, container));
    }

    fn request_details(&mut self) {
        let Some(node) = self.selection.selected_node().map(str::to_string) else {
            self.details_loader.cancel();
            self.details = NodeDetails::None;
            return;
        };
        let pipeline = self.pipeline.clone();

        self.details = NodeDetails::Loading;
        self.details_loader.request(move || pipeline.node_info(&node));
    }

    fn request_matrix(&mut self) {
        let pipeline = self.pipeline.clone();
        let dataset = self.dataset.clone();
        let variant = self.variant.clone();

        self.matrix = Slot::Loading;
        self.matrix_loader.request(move || pipeline.matrix(&dataset, &variant));
    }

    fn poll_loaders(&mut self, ctx: &Context) {
        if self.receive_results() {
            ctx.request_repaint_after(LOADER_POLL_INTERVAL);
        }
    }

    /// Stores every finished result; returns whether a request is still in flight.
    fn receive_results(&mut self) -> bool {
        if let Some(result) = self.global_loader.poll() {
            self.global = Slot::from_result(result);
        }

        if let Some(result) = self.radial_loader.poll() {
            self.radial = Slot::from_result(result);
            if let Some(layout) = self.radial.ready()
                && self.selection.mode() == VisualizationMode::Radial
                && self.selection.selected_node() == Some(layout.focal.id.as_str())
            {
                self.selection.set_edges(layout.edges.clone());
            }
        }

        if let Some(result) = self.details_loader.poll() {
            self.details = match result {
                Ok(info) => NodeDetails::Ready(info),
                Err(error) => NodeDetails::Missing(format!("{error:#}")),
            };
        }

        if let Some(result) = self.matrix_loader.poll() {
            self.matrix = Slot::from_result(result);
        }

        self.global_loader.is_pending()
            || self.radial_loader.is_pending()
            || self.details_loader.is_pending()
            || self.matrix_loader.is_pending()
    }

    fn radial_focal(&self) -> Option<&str> {
        self.radial.ready().map(|layout| layout.focal.id.as_str())
    }

    fn set_mode(&mut self, mode: VisualizationMode) {
        if self.selection.mode() == mode {
            return;
        }
        let radial_loaded = self.radial_focal().is_some()
            && self.radial_focal() == self.selection.selected_node();
        self.selection.set_mode(mode, radial_loaded);

        match mode {
            VisualizationMode::Global => {
                if matches!(self.global, Slot::Empty) {
                    self.request_global();
                }
            }
            VisualizationMode::Radial => {
                if let Some(layout) = self.radial.ready().filter(|_| radial_loaded) {
                    let edges = layout.edges.clone();
                    self.selection.set_edges(edges);
                } else {
                    self.request_radial();
                }
            }
        }
    }

    fn focus_node(&mut self, node: &str) {
        match self.selection.select_node(node) {
            FocusChange::Unchanged => return,
            FocusChange::Selected => {}
            FocusChange::Refocus(_) => self.request_radial(),
        }
        self.request_details();
    }

    fn clear_focus(&mut self) {
        self.selection.clear_node();
        self.radial_loader.cancel();
        self.radial = Slot::Empty;
        self.details_loader.cancel();
        self.details = NodeDetails::None;
    }

    fn set_variant(&mut self, variant: MatrixVariant) {
        if self.variant == variant {
            return;
        }
        info!(variant = %variant.label(), "matrix variant changed");
        self.variant = variant;
        self.request_global();
        if self.screen == Screen::Matrix {
            self.request_matrix();
        } else {
            self.matrix_loader.cancel();
            self.matrix = Slot::Empty;
        }
    }

    fn set_screen(&mut self, screen: Screen) {
        self.screen = screen;
        if screen == Screen::Matrix && matches!(self.matrix, Slot::Empty) {
            self.request_matrix();
        }
    }

    fn relayout(&mut self) {
        self.viewport.fit_container(self.container);
        self.request_global();
        if self.selection.mode() == VisualizationMode::Radial {
            self.request_radial();
        } else {
            self.radial_loader.cancel();
            self.radial = Slot::Empty;
        }
    }

    fn apply_hover(&mut self, hover: FrameHover) {
        self.selection.hover_node(hover.node.as_deref());
        self.selection.hover_edge(hover.edge);

        if hover.cluster != self.selection.hovered_cluster() {
            let cluster = hover.cluster.and_then(|index| {
                self.assignment
                    .clusters
                    .get(index)
                    .map(|members| (index, members.as_slice()))
            });
            self.selection.hover_cluster(cluster);
        }
    }

    fn show(&mut self, ctx: &Context) -> Option<DatasetId> {
        self.poll_loaders(ctx);

        let mut hover = FrameHover::default();
        let switch = self.draw_top_bar(ctx);

        match self.screen {
            Screen::Graph => {
                egui::SidePanel::left("controls")
                    .resizable(true)
                    .default_width(320.0)
                    .show(ctx, |ui| self.draw_controls(ui, &mut hover));

                egui::SidePanel::right("details")
                    .resizable(true)
                    .default_width(320.0)
                    .show(ctx, |ui| self.draw_details(ui));

                egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui, &mut hover));
            }
            Screen::Matrix => {
                egui::SidePanel::left("matrix_info")
                    .resizable(true)
                    .default_width(280.0)
                    .show(ctx, |ui| self.draw_matrix_info(ui));

                egui::CentralPanel::default().show(ctx, |ui| self.draw_matrix(ui));
            }
        }

        self.apply_hover(hover);
        switch
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    use crate::data::{DataSource, FetchError};
    use crate::layout::{LayoutConfig, NeighborSimilarity, UmapEmbedder};

    use super::*;

    struct TinySource;

    impl DataSource for TinySource {
        fn fetch_connectivity_matrix(
            &self,
            _dataset: &DatasetId,
            variant: &MatrixVariant,
        ) -> Result<ConnectivityMatrix, FetchError> {
            let rows = match variant {
                MatrixVariant::Adjacency => vec![vec![0.0, 1.0]],
                MatrixVariant::Connectivity { .. } => vec![vec![1.0, 0.25], vec![0.25, 1.0]],
            };
            Ok(ConnectivityMatrix {
                rows,
                sorted_nodes: nodes(),
            })
        }

        fn fetch_neighbor_similarities(
            &self,
            _focal: &str,
            _allowed: &[String],
        ) -> Result<Vec<NeighborSimilarity>, FetchError> {
            Ok(Vec::new())
        }

        fn fetch_cluster_assignment(
            &self,
            _dataset: &DatasetId,
        ) -> Result<ClusterAssignment, FetchError> {
            Ok(assignment())
        }

        fn fetch_node_info(&self, node: &str) -> Result<NodeInfo, FetchError> {
            Err(FetchError::NotFound {
                what: format!("node {node}"),
            })
        }
    }

    fn nodes() -> Vec<String> {
        vec!["GO:0001".to_string(), "GO:0002".to_string()]
    }

    fn assignment() -> ClusterAssignment {
        ClusterAssignment {
            algorithm: "toden-e".to_string(),
            clusters: vec![nodes()],
            sorted_nodes: nodes(),
        }
    }

    fn workspace() -> Workspace {
        let pipeline = Pipeline::new(
            Arc::new(TinySource),
            Arc::new(UmapEmbedder),
            LayoutConfig::default(),
        );
        let startup = StartupView {
            dataset: DatasetId::Standard("tiny".to_string()),
            mode: VisualizationMode::Global,
            variant: MatrixVariant::Connectivity { alpha: None },
            node: None,
        };
        Workspace::new(
            pipeline,
            startup.dataset.clone(),
            assignment(),
            &startup,
            None,
        )
    }

    fn settle(workspace: &mut Workspace) {
        let started = Instant::now();
        while workspace.receive_results() && started.elapsed() < Duration::from_secs(5) {
            thread::sleep(Duration::from_millis(5));
        }
    }

    fn matrix_rows(workspace: &Workspace) -> Option<usize> {
        workspace.matrix.ready().map(|matrix| matrix.rows.len())
    }

    #[test]
    fn relayout_keeps_zoom_and_pan() {
        let mut workspace = workspace();
        let container = workspace.container;
        workspace.viewport.set_scale(3.0, container);
        workspace.viewport.pan_by(vec2(-400.0, -300.0), container);
        let before = workspace.viewport;

        workspace.relayout();
        assert_eq!(workspace.viewport, before);

        settle(&mut workspace);
        assert!(workspace.global.ready().is_some());
        assert_eq!(workspace.viewport, before);
    }

    #[test]
    fn matrix_screen_follows_the_selected_variant() {
        let mut workspace = workspace();
        assert!(matches!(workspace.matrix, Slot::Empty));

        workspace.set_screen(Screen::Matrix);
        settle(&mut workspace);
        assert_eq!(matrix_rows(&workspace), Some(2));

        workspace.set_variant(MatrixVariant::Adjacency);
        assert!(matches!(workspace.matrix, Slot::Loading));
        settle(&mut workspace);
        assert_eq!(matrix_rows(&workspace), Some(1));
    }

    #[test]
    fn graph_screen_drops_a_stale_matrix() {
        let mut workspace = workspace();
        workspace.set_screen(Screen::Matrix);
        settle(&mut workspace);

        workspace.set_screen(Screen::Graph);
        workspace.set_variant(MatrixVariant::Adjacency);
        assert!(matches!(workspace.matrix, Slot::Empty));

        workspace.set_screen(Screen::Matrix);
        settle(&mut workspace);
        assert_eq!(matrix_rows(&workspace), Some(1));
    }
}
