use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::data::{DatasetId, MatrixVariant};
use crate::layout::{DEFAULT_NEIGHBORS, DEFAULT_SEED, EmbeddingParams, LayoutConfig};
use crate::selection::VisualizationMode;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Global,
    Radial,
}

impl From<ModeArg> for VisualizationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Global => Self::Global,
            ModeArg::Radial => Self::Radial,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum VariantArg {
    Adj,
    Con,
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Directory holding `matrices/`, `data/`, `outputs/` and the similarity tables.
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Dataset name, or a run id together with `--custom`.
    #[arg(long)]
    pub dataset: String,

    #[arg(long)]
    pub custom: bool,

    #[arg(long, value_enum, default_value_t = ModeArg::Global)]
    pub mode: ModeArg,

    #[arg(long, value_enum, default_value_t = VariantArg::Con)]
    pub variant: VariantArg,

    /// Restart probability suffix of precomputed connectivity matrices.
    #[arg(long)]
    pub alpha: Option<String>,

    /// Initially selected node; the first node of the dataset otherwise.
    #[arg(long)]
    pub node: Option<String>,

    #[arg(long, default_value_t = DEFAULT_NEIGHBORS)]
    pub neighbors: usize,

    #[arg(long, default_value = DEFAULT_SEED)]
    pub seed: String,

    /// Write the computed layout as JSON and exit without opening a window.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Width and height used for headless layout export.
    #[arg(long, num_args = 2, value_names = ["WIDTH", "HEIGHT"], default_values_t = [1200.0, 800.0])]
    pub size: Vec<f32>,

    /// Tracing filter directive, e.g. `pag_explorer=debug`.
    #[arg(long, default_value = "info")]
    pub log: String,
}

impl Args {
    pub fn dataset_id(&self) -> DatasetId {
        if self.custom {
            DatasetId::Custom(self.dataset.clone())
        } else {
            DatasetId::Standard(self.dataset.clone())
        }
    }

    pub fn matrix_variant(&self) -> MatrixVariant {
        match self.variant {
            VariantArg::Adj => MatrixVariant::Adjacency,
            VariantArg::Con => MatrixVariant::Connectivity {
                alpha: self.alpha.clone(),
            },
        }
    }

    pub fn layout_config(&self) -> LayoutConfig {
        LayoutConfig {
            embedding: EmbeddingParams {
                neighbors: self.neighbors,
                seed: self.seed.clone(),
                ..EmbeddingParams::default()
            },
            ..LayoutConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_layout_constants() {
        let args = Args::try_parse_from(["pag-explorer", "--dataset", "kegg"]).unwrap();

        assert_eq!(args.dataset_id(), DatasetId::Standard("kegg".to_string()));
        assert_eq!(
            args.matrix_variant(),
            MatrixVariant::Connectivity { alpha: None }
        );
        assert_eq!(args.layout_config(), LayoutConfig::default());
        assert_eq!(args.size, vec![1200.0, 800.0]);
    }

    #[test]
    fn custom_runs_and_adjacency() {
        let args = Args::try_parse_from([
            "pag-explorer",
            "--dataset",
            "run7",
            "--custom",
            "--variant",
            "adj",
            "--mode",
            "radial",
            "--neighbors",
            "5",
        ])
        .unwrap();

        assert_eq!(args.dataset_id(), DatasetId::Custom("run7".to_string()));
        assert_eq!(args.matrix_variant(), MatrixVariant::Adjacency);
        assert_eq!(VisualizationMode::from(args.mode), VisualizationMode::Radial);
        assert_eq!(args.layout_config().embedding.neighbors, 5);
    }

    #[test]
    fn dataset_is_required() {
        assert!(Args::try_parse_from(["pag-explorer"]).is_err());
    }
}
