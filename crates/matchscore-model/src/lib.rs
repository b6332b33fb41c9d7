//! matchscore model
//!
//! Tabular classification for match outcome scoring.
//!
//! - [`Classifier`]: the two operations the server needs (predict, and
//!   optionally per-class probabilities)
//! - [`RandomForest`]: bagged `linfa-trees` decision trees, serializable to JSON
//! - [`TabularDataset`], [`stratified_split`], [`ClassificationReport`] and
//!   [`Trainer`]: the offline training procedure
//! - [`ArtifactPaths`]: where the classifier and feature schema live on disk

pub mod artifact;
pub mod classifier;
pub mod dataset;
pub mod forest;
pub mod report;
pub mod split;
pub mod trainer;

pub use artifact::{load_classifier, load_model, save_model, ArtifactPaths};
pub use classifier::{last_class_probability, Classifier};
pub use dataset::TabularDataset;
pub use forest::{RandomForest, RandomForestParams};
pub use report::{AverageMetrics, ClassMetrics, ClassificationReport};
pub use split::{stratified_split, TrainTestSplit};
pub use trainer::{Trainer, TrainingConfig, TrainingOutcome};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::Classifier;
    pub use crate::forest::{RandomForest, RandomForestParams};
    pub use crate::trainer::{Trainer, TrainingConfig};
}
