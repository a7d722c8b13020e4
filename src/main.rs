use std::path::Path;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use clap::Parser;
use eframe::egui::vec2;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use pag_explorer::app::{PagExplorerApp, StartupView};
use pag_explorer::config::Args;
use pag_explorer::data::FileDataSource;
use pag_explorer::export::LayoutExport;
use pag_explorer::layout::UmapEmbedder;
use pag_explorer::pipeline::Pipeline;
use pag_explorer::selection::VisualizationMode;

fn init_tracing(directive: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

fn export_headless(args: &Args, pipeline: &Pipeline, path: &Path) -> Result<()> {
    let dataset = args.dataset_id();
    let size = match args.size.as_slice() {
        [width, height] => vec2(*width, *height),
        _ => return Err(anyhow!("--size takes exactly a width and a height")),
    };
    let assignment = pipeline.cluster_assignment(&dataset)?;

    let request = match VisualizationMode::from(args.mode) {
        VisualizationMode::Global => {
            pipeline.global_request(&dataset, &args.matrix_variant(), &assignment.clusters)?
        }
        VisualizationMode::Radial => {
            let focal = args
                .node
                .clone()
                .or_else(|| assignment.sorted_nodes.first().cloned())
                .ok_or_else(|| anyhow!("{dataset} has no nodes to focus"))?;
            pipeline.radial_request(&focal, &assignment.sorted_nodes)?
        }
    };
    let layout = pipeline.layout(&request, size)?;

    LayoutExport::new(dataset.name(), &layout, size).write_to(path)?;
    info!(path = %path.display(), "layout exported");
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log);

    let pipeline = Pipeline::new(
        Arc::new(FileDataSource::new(&args.data_dir)),
        Arc::new(UmapEmbedder),
        args.layout_config(),
    );

    if let Some(path) = &args.export {
        return export_headless(&args, &pipeline, path);
    }

    let startup = StartupView {
        dataset: args.dataset_id(),
        mode: args.mode.into(),
        variant: args.matrix_variant(),
        node: args.node.clone(),
    };
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "PAG explorer",
        options,
        Box::new(move |cc| Ok(Box::new(PagExplorerApp::new(cc, pipeline, startup)))),
    )
    .map_err(|error| anyhow!("failed to start the window: {error}"))
}
