//! Offline training procedure: CSV in, classifier and schema artifacts out

use crate::artifact::{ArtifactPaths, DEFAULT_FEATURES_PATH, DEFAULT_MODEL_PATH};
use crate::dataset::TabularDataset;
use crate::forest::{RandomForest, RandomForestParams};
use crate::report::ClassificationReport;
use crate::split::stratified_split;
use matchscore_core::{Error, FeatureSchema, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Training configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Input CSV
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,

    /// Where the fitted classifier is written
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Where the feature schema is written
    #[serde(default = "default_features_path")]
    pub features_path: PathBuf,

    /// Target column
    #[serde(default = "default_target")]
    pub target: String,

    /// Identifier columns removed before training, when present
    #[serde(default = "default_drop_columns")]
    pub drop_columns: Vec<String>,

    /// Share of each class held out for evaluation
    #[serde(default = "default_test_size")]
    pub test_size: f64,

    /// Forest hyperparameters; the seed also drives the split
    #[serde(default)]
    pub forest: RandomForestParams,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            model_path: default_model_path(),
            features_path: default_features_path(),
            target: default_target(),
            drop_columns: default_drop_columns(),
            test_size: default_test_size(),
            forest: RandomForestParams::default(),
        }
    }
}

impl TrainingConfig {
    /// Load a YAML training configuration, or defaults when the file is absent
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No training config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content)
            .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data/matches.csv")
}

fn default_model_path() -> PathBuf {
    PathBuf::from(DEFAULT_MODEL_PATH)
}

fn default_features_path() -> PathBuf {
    PathBuf::from(DEFAULT_FEATURES_PATH)
}

fn default_target() -> String {
    "Result".to_string()
}

fn default_drop_columns() -> Vec<String> {
    vec!["Date".to_string(), "Opponent".to_string()]
}

fn default_test_size() -> f64 {
    0.2
}

/// Everything a training run produces
#[derive(Debug)]
pub struct TrainingOutcome {
    pub model: RandomForest,
    pub schema: FeatureSchema,
    pub report: ClassificationReport,
    /// Rows used for fitting
    pub train_rows: Vec<usize>,
    /// Held-out rows, aligned with `test_predictions`
    pub test_rows: Vec<usize>,
    pub test_predictions: Vec<i64>,
}

/// Runs the training procedure for one configuration
pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Read the configured CSV
    pub fn load_dataset(&self) -> Result<TabularDataset> {
        TabularDataset::from_csv_path(
            &self.config.data_path,
            &self.config.target,
            &self.config.drop_columns,
        )
    }

    /// Split, fit and evaluate on an already loaded dataset
    pub fn fit(&self, dataset: &TabularDataset) -> Result<TrainingOutcome> {
        let seed = self.config.forest.seed;
        let split = stratified_split(dataset.targets(), self.config.test_size, seed)?;
        info!(
            "Split {} rows into {} train / {} test (seed {})",
            dataset.n_rows(),
            split.train.len(),
            split.test.len(),
            seed
        );

        let (train_records, train_targets) = dataset.select(&split.train);
        let model = RandomForest::fit(&self.config.forest, &train_records, &train_targets)?;

        let (test_records, test_targets) = dataset.select(&split.test);
        let test_predictions = model.predict_records(&test_records)?;
        let report = ClassificationReport::new(&test_targets, &test_predictions)?;
        info!("Hold-out accuracy: {:.4}", report.accuracy);

        Ok(TrainingOutcome {
            model,
            schema: dataset.schema().clone(),
            report,
            train_rows: split.train,
            test_rows: split.test,
            test_predictions,
        })
    }

    /// Persist the classifier and the training column order
    pub fn persist(&self, outcome: &TrainingOutcome) -> Result<ArtifactPaths> {
        let paths = ArtifactPaths {
            model: self.config.model_path.clone(),
            features: self.config.features_path.clone(),
        };
        paths.save(&outcome.model, &outcome.schema)?;
        Ok(paths)
    }
}
