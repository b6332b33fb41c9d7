//! matchscore core
//!
//! Types shared by the scoring server and the trainer.
//!
//! This crate provides:
//! - The feature schema contract (ordered, unique column names)
//! - Scoring request validation and feature vector construction
//! - Error types and result handling
//! - The example match payload

pub mod error;
pub mod example;
pub mod schema;
pub mod types;

pub use error::{Error, Result};
pub use example::{example_feature_names, example_payload};
pub use schema::FeatureSchema;
pub use types::{coerce_to_f64, FeatureVector, Prediction, ScoringRequest};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::schema::FeatureSchema;
    pub use crate::types::{FeatureVector, Prediction, ScoringRequest};
}
