//! Shared application state
//!
//! Artifacts are loaded once at startup and never reloaded. A failed load
//! leaves the corresponding slot empty so that handlers can answer with a
//! "not ready" error instead of the process exiting.

use crate::config::ServerConfig;
use crate::error::AppError;
use matchscore_core::{FeatureSchema, Prediction, ScoringRequest};
use matchscore_model::{last_class_probability, load_classifier, ArtifactPaths, Classifier};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Application state shared across request handlers
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,

    /// Classifier and feature schema
    pub artifacts: Arc<Artifacts>,

    /// Prometheus metrics handle for rendering
    pub metrics_handle: PrometheusHandle,
}

impl AppState {
    /// Load artifacts from the configured paths
    pub fn new(config: ServerConfig, metrics_handle: PrometheusHandle) -> Self {
        info!("Initializing application state");
        let artifacts = Artifacts::load(&config.artifact_paths());
        Self::with_artifacts(config, artifacts, metrics_handle)
    }

    /// Build state around artifacts that are already in memory
    pub fn with_artifacts(
        config: ServerConfig,
        artifacts: Artifacts,
        metrics_handle: PrometheusHandle,
    ) -> Self {
        Self {
            config: Arc::new(config),
            artifacts: Arc::new(artifacts),
            metrics_handle,
        }
    }
}

/// The two artifacts produced by training
pub struct Artifacts {
    classifier: Option<Arc<dyn Classifier>>,
    schema: Option<FeatureSchema>,
    /// Cached result of [`Classifier::supports_probability`]
    supports_probability: bool,
}

impl Artifacts {
    /// Pair a classifier with its schema.
    ///
    /// When both are present but disagree on the number of columns the
    /// classifier is dropped and the service reports itself not ready.
    pub fn new(classifier: Option<Arc<dyn Classifier>>, schema: Option<FeatureSchema>) -> Self {
        let classifier = match (classifier, &schema) {
            (Some(classifier), Some(schema)) if classifier.n_features() != schema.len() => {
                error!(
                    "Classifier '{}' expects {} features but the schema lists {}; model disabled",
                    classifier.name(),
                    classifier.n_features(),
                    schema.len()
                );
                None
            }
            (classifier, _) => classifier,
        };

        let supports_probability = classifier
            .as_ref()
            .map(|c| c.supports_probability())
            .unwrap_or(false);

        Self {
            classifier,
            schema,
            supports_probability,
        }
    }

    /// No classifier and no schema
    pub fn empty() -> Self {
        Self::new(None, None)
    }

    /// Load both artifacts, logging and skipping whichever fails
    pub fn load(paths: &ArtifactPaths) -> Self {
        let classifier = match load_classifier(&paths.model) {
            Ok(classifier) => {
                info!("Model loaded: {}", paths.model.display());
                Some(classifier)
            }
            Err(e) => {
                error!("Failed to load model from {}: {}", paths.model.display(), e);
                None
            }
        };

        let schema = match FeatureSchema::from_file(&paths.features) {
            Ok(schema) => {
                let preview: Vec<&str> = schema.iter().take(5).collect();
                info!("Features loaded ({}): {:?}", schema.len(), preview);
                Some(schema)
            }
            Err(e) => {
                error!(
                    "Failed to load features from {}: {}",
                    paths.features.display(),
                    e
                );
                None
            }
        };

        Self::new(classifier, schema)
    }

    pub fn model_loaded(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn schema(&self) -> Option<&FeatureSchema> {
        self.schema.as_ref()
    }

    pub fn supports_probability(&self) -> bool {
        self.supports_probability
    }

    /// Both artifacts, or the "not ready" error for the first one missing
    pub fn ready(&self) -> Result<(&dyn Classifier, &FeatureSchema), AppError> {
        let classifier = self
            .classifier
            .as_deref()
            .ok_or(AppError::NotReady("model not loaded"))?;
        let schema = self
            .schema
            .as_ref()
            .ok_or(AppError::NotReady("features not loaded"))?;
        Ok((classifier, schema))
    }

    /// Validate a request against the schema and run the classifier
    pub fn score(&self, request: &ScoringRequest) -> Result<Prediction, AppError> {
        let (classifier, schema) = self.ready()?;

        let features = schema.vectorize(request)?;
        debug!("Scoring vector of {} features", features.len());

        let start = Instant::now();
        let prediction = classifier.predict(&features)?;

        let probability = if self.supports_probability {
            let probabilities = classifier.predict_proba(&features)?;
            let probability = last_class_probability(&probabilities);
            if probability.is_none() {
                warn!("Classifier '{}' returned no probabilities", classifier.name());
            }
            probability
        } else {
            None
        };

        metrics::histogram!("matchscore_predict_latency_us")
            .record(start.elapsed().as_micros() as f64);

        Ok(Prediction::new(prediction, probability))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matchscore_core::{FeatureVector, Result};

    struct Threshold {
        classes: Vec<i64>,
    }

    impl Classifier for Threshold {
        fn name(&self) -> &str {
            "threshold"
        }

        fn n_features(&self) -> usize {
            2
        }

        fn classes(&self) -> &[i64] {
            &self.classes
        }

        fn predict(&self, features: &FeatureVector) -> Result<i64> {
            Ok(if features.as_slice()[0] > features.as_slice()[1] { 1 } else { 0 })
        }

        fn supports_probability(&self) -> bool {
            true
        }

        fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>> {
            let p = if self.predict(features)? == 1 { 0.9 } else { 0.2 };
            Ok(vec![1.0 - p, p])
        }
    }

    fn threshold() -> Option<Arc<dyn Classifier>> {
        Some(Arc::new(Threshold {
            classes: vec![0, 1],
        }))
    }

    fn schema(names: &[&str]) -> Option<FeatureSchema> {
        Some(FeatureSchema::new(names.iter().copied()).unwrap())
    }

    fn request(pairs: &[(&str, serde_json::Value)]) -> ScoringRequest {
        pairs.iter().map(|(k, v)| (*k, v.clone())).collect()
    }

    #[test]
    fn test_score_reports_last_class_probability() {
        let artifacts = Artifacts::new(threshold(), schema(&["Goals", "Opponent Goals"]));
        assert!(artifacts.supports_probability());

        let prediction = artifacts
            .score(&request(&[
                ("Goals", serde_json::json!(3)),
                ("Opponent Goals", serde_json::json!("1")),
                ("Unused", serde_json::json!("ignored")),
            ]))
            .unwrap();

        assert_eq!(prediction.prediction, 1);
        assert_eq!(prediction.probability, Some(0.9));
    }

    #[test]
    fn test_width_mismatch_disables_model() {
        let artifacts = Artifacts::new(threshold(), schema(&["Goals", "Opponent Goals", "xG"]));

        assert!(!artifacts.model_loaded());
        assert!(!artifacts.supports_probability());
        assert!(matches!(
            artifacts.ready(),
            Err(AppError::NotReady("model not loaded"))
        ));
    }

    #[test]
    fn test_missing_schema_is_not_ready() {
        let artifacts = Artifacts::new(threshold(), None);
        assert!(matches!(
            artifacts.score(&ScoringRequest::new()),
            Err(AppError::NotReady("features not loaded"))
        ));
    }

    #[test]
    fn test_missing_features_listed_in_schema_order() {
        let artifacts = Artifacts::new(threshold(), schema(&["Goals", "Opponent Goals"]));

        match artifacts.score(&ScoringRequest::new()) {
            Err(AppError::MissingFeatures(missing)) => {
                assert_eq!(missing, vec!["Goals", "Opponent Goals"]);
            }
            other => panic!("expected missing features, got {:?}", other.map(|p| p.prediction)),
        }
    }

    #[test]
    fn test_load_from_missing_files_leaves_slots_empty() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = Artifacts::load(&ArtifactPaths::under(dir.path()));

        assert!(!artifacts.model_loaded());
        assert!(artifacts.schema().is_none());
    }
}
