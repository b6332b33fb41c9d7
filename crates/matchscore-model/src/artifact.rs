//! Persisted artifacts: the fitted classifier and the feature schema

use crate::classifier::Classifier;
use crate::forest::RandomForest;
use matchscore_core::{Error, FeatureSchema, Result};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Default classifier location relative to the deployment root
pub const DEFAULT_MODEL_PATH: &str = "model/match_model.json";

/// Default schema location relative to the deployment root
pub const DEFAULT_FEATURES_PATH: &str = "model/features.json";

/// Locations of the two artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub features: PathBuf,
}

impl ArtifactPaths {
    /// Resolve both paths against `root`; absolute paths are kept as-is
    pub fn resolve(root: impl AsRef<Path>, model: impl AsRef<Path>, features: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            model: root.join(model),
            features: root.join(features),
        }
    }

    /// Default artifact layout under `root`
    pub fn under(root: impl AsRef<Path>) -> Self {
        Self::resolve(root, DEFAULT_MODEL_PATH, DEFAULT_FEATURES_PATH)
    }

    /// Write both artifacts
    pub fn save(&self, model: &RandomForest, schema: &FeatureSchema) -> Result<()> {
        save_model(model, &self.model)?;
        info!("Model saved to {}", self.model.display());
        schema.save(&self.features)?;
        info!("Features saved to {}", self.features.display());
        Ok(())
    }
}

/// Serialize a forest to JSON, creating parent directories
pub fn save_model(model: &RandomForest, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(std::fs::File::create(path)?);
    serde_json::to_writer(&mut writer, model)?;
    writer.flush()?;
    Ok(())
}

/// Deserialize and validate a forest
pub fn load_model(path: impl AsRef<Path>) -> Result<RandomForest> {
    let path = path.as_ref();
    let reader = BufReader::new(std::fs::File::open(path)?);
    let model: RandomForest = serde_json::from_reader(reader)
        .map_err(|e| Error::model(format!("cannot parse {}: {}", path.display(), e)))?;
    model.validate()?;
    Ok(model)
}

/// Load a classifier artifact behind the [`Classifier`] trait
pub fn load_classifier(path: impl AsRef<Path>) -> Result<Arc<dyn Classifier>> {
    let model = load_model(path)?;
    Ok(Arc::new(model))
}
