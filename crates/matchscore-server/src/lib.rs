//! matchscore server
//!
//! HTTP front end for a pre-trained match outcome classifier. The classifier
//! and its feature schema are loaded once at startup; `/score` validates a
//! JSON object against the schema, builds the feature vector in schema
//! order and returns the predicted class with an optional probability.

pub mod cli;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use config::ServerConfig;
pub use error::AppError;
pub use routes::create_router;
pub use state::{AppState, Artifacts};
