//! Feature schema: the ordered column contract between training and serving
//!
//! The schema is written once by the trainer and read verbatim by the server.
//! Its order is the column order the classifier was fitted on, so every
//! scoring request is vectorized by walking the schema, never the request.

use crate::error::{Error, Result};
use crate::types::{coerce_to_f64, FeatureVector, ScoringRequest};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Ordered, unique feature names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct FeatureSchema {
    names: Vec<String>,
}

impl FeatureSchema {
    /// Build a schema, rejecting empty lists, blank names and duplicates
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Result<Self> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();

        if names.is_empty() {
            return Err(Error::schema("feature schema must contain at least one name"));
        }

        let mut seen = HashSet::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(Error::schema(format!("feature name at position {index} is empty")));
            }
            if !seen.insert(name.as_str()) {
                return Err(Error::schema(format!("duplicate feature name '{name}'")));
            }
        }

        Ok(Self { names })
    }

    /// Read a schema from a JSON array file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let schema: Self = serde_json::from_str(&content)?;
        debug!("Read {} feature names from {}", schema.len(), path.display());
        Ok(schema)
    }

    /// Write the schema as a pretty-printed JSON array, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut content = serde_json::to_string_pretty(&self.names)?;
        content.push('\n');
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Names the request does not carry, in schema order
    pub fn missing(&self, request: &ScoringRequest) -> Vec<String> {
        self.names
            .iter()
            .filter(|name| !request.contains(name))
            .cloned()
            .collect()
    }

    /// Build the feature vector for a request.
    ///
    /// Presence of every name is checked before any value is coerced, so a
    /// request with both absent and malformed fields reports the absent ones.
    pub fn vectorize(&self, request: &ScoringRequest) -> Result<FeatureVector> {
        let missing = self.missing(request);
        if !missing.is_empty() {
            return Err(Error::MissingFeatures(missing));
        }

        let mut values = Vec::with_capacity(self.names.len());
        for name in &self.names {
            // presence checked above
            let value = request
                .get(name)
                .ok_or_else(|| Error::MissingFeatures(vec![name.clone()]))?;
            values.push(coerce_to_f64(name, value)?);
        }

        Ok(FeatureVector::from(values))
    }
}

impl TryFrom<Vec<String>> for FeatureSchema {
    type Error = Error;

    fn try_from(names: Vec<String>) -> Result<Self> {
        Self::new(names)
    }
}

impl From<FeatureSchema> for Vec<String> {
    fn from(schema: FeatureSchema) -> Self {
        schema.names
    }
}
