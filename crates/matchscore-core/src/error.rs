//! Error types for matchscore

/// Result type alias using matchscore's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for matchscore operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Feature schema is malformed (duplicates, empty names, bad file)
    #[error("schema error: {0}")]
    Schema(String),

    /// Scoring request lacks one or more required features
    #[error("missing required features: {}", .0.join(", "))]
    MissingFeatures(Vec<String>),

    /// A request value could not be coerced to a number
    #[error("could not convert feature '{feature}' to a number: {reason}")]
    Conversion { feature: String, reason: String },

    /// Classifier errors (shape mismatch, unsupported operation, bad artifact)
    #[error("model error: {0}")]
    Model(String),

    /// Dataset parsing errors
    #[error("dataset error: {0}")]
    Dataset(String),

    /// Fitting errors
    #[error("training error: {0}")]
    Training(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a new schema error
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    /// Create a new conversion error for the given feature
    pub fn conversion(feature: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Conversion {
            feature: feature.into(),
            reason: reason.into(),
        }
    }

    /// Create a new model error
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    /// Create a new dataset error
    pub fn dataset(msg: impl Into<String>) -> Self {
        Self::Dataset(msg.into())
    }

    /// Create a new training error
    pub fn training(msg: impl Into<String>) -> Self {
        Self::Training(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True for errors caused by the caller's input rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MissingFeatures(_) | Self::Conversion { .. })
    }
}
