//! `matchscore train`

use matchscore_model::{ArtifactPaths, Trainer, TrainingConfig};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Command-line overrides applied on top of the YAML configuration
#[derive(Debug, Default)]
pub struct TrainOverrides {
    pub data: Option<PathBuf>,
    pub model_out: Option<PathBuf>,
    pub features_out: Option<PathBuf>,
    pub target: Option<String>,
    pub test_size: Option<f64>,
    pub seed: Option<u64>,
    pub trees: Option<usize>,
    pub max_depth: Option<usize>,
    pub max_features: Option<usize>,
}

impl TrainOverrides {
    pub fn apply(self, mut config: TrainingConfig) -> TrainingConfig {
        if let Some(data) = self.data {
            config.data_path = data;
        }
        if let Some(model) = self.model_out {
            config.model_path = model;
        }
        if let Some(features) = self.features_out {
            config.features_path = features;
        }
        if let Some(target) = self.target {
            config.target = target;
        }
        if let Some(test_size) = self.test_size {
            config.test_size = test_size;
        }
        if let Some(seed) = self.seed {
            config.forest.seed = seed;
        }
        if let Some(trees) = self.trees {
            config.forest.n_estimators = trees;
        }
        if self.max_depth.is_some() {
            config.forest.max_depth = self.max_depth;
        }
        if self.max_features.is_some() {
            config.forest.max_features = self.max_features;
        }
        config
    }
}

/// Train, print the preview and report to `out`, and write both artifacts
pub fn run(config: TrainingConfig, out: &mut impl Write) -> anyhow::Result<ArtifactPaths> {
    info!("Loading dataset from {}", config.data_path.display());
    let trainer = Trainer::new(config);

    let dataset = trainer.load_dataset()?;
    writeln!(out, "Loaded {} rows", dataset.n_rows())?;
    writeln!(out, "{}", dataset.head(5))?;

    let outcome = trainer.fit(&dataset)?;
    writeln!(out, "{}", outcome.report)?;

    let paths = trainer.persist(&outcome)?;
    writeln!(out, "Model saved to {}", paths.model.display())?;
    writeln!(out, "Features saved to {}", paths.features.display())?;

    Ok(paths)
}
