//! Request, vector and prediction types shared by the server and the trainer

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A scoring request: feature name to raw JSON value.
///
/// Keys beyond the feature schema are allowed and ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoringRequest(Map<String, Value>);

impl ScoringRequest {
    /// Create an empty request
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the raw value for a feature
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Check whether the request carries a feature
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Set a feature value, returning the previous one
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    /// Remove a feature value
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    /// Number of keys in the request
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the raw entries
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Borrow the underlying JSON object
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for ScoringRequest {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for ScoringRequest {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(Error::schema(format!(
                "scoring request must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ScoringRequest {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Ordered numeric input row for a classifier
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

/// Result of scoring one request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted class label
    pub prediction: i64,

    /// Probability of the last (positive) class, when the classifier estimates one
    pub probability: Option<f64>,
}

impl Prediction {
    pub fn new(prediction: i64, probability: Option<f64>) -> Self {
        Self {
            prediction,
            probability,
        }
    }
}

/// Coerce a raw request value into a finite `f64`.
///
/// Numbers pass through, booleans map to 1.0/0.0 and strings are parsed
/// after trimming. Anything else, or a non-finite result, is rejected.
pub fn coerce_to_f64(feature: &str, value: &Value) -> Result<f64> {
    let number = match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| Error::conversion(feature, format!("{n} is not representable as f64")))?,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| {
            Error::conversion(feature, format!("could not parse string {s:?} as a number"))
        })?,
        other => {
            return Err(Error::conversion(
                feature,
                format!("expected a number, got {}", json_kind(other)),
            ))
        }
    };

    if !number.is_finite() {
        return Err(Error::conversion(
            feature,
            format!("{number} is not a finite number"),
        ));
    }

    Ok(number)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_numbers_and_booleans() {
        assert_eq!(coerce_to_f64("a", &json!(2)).unwrap(), 2.0);
        assert_eq!(coerce_to_f64("a", &json!(82.5)).unwrap(), 82.5);
        assert_eq!(coerce_to_f64("a", &json!(-3)).unwrap(), -3.0);
        assert_eq!(coerce_to_f64("a", &json!(true)).unwrap(), 1.0);
        assert_eq!(coerce_to_f64("a", &json!(false)).unwrap(), 0.0);
    }

    #[test]
    fn test_coerce_numeric_strings() {
        assert_eq!(coerce_to_f64("a", &json!("3.5")).unwrap(), 3.5);
        assert_eq!(coerce_to_f64("a", &json!(" 2 ")).unwrap(), 2.0);
        assert_eq!(coerce_to_f64("a", &json!("1e3")).unwrap(), 1000.0);
    }

    #[test]
    fn test_coerce_rejects_non_numeric() {
        for value in [json!("abc"), json!(""), json!(null), json!([1]), json!({"x": 1})] {
            let err = coerce_to_f64("Goals", &value).unwrap_err();
            assert!(
                matches!(err, Error::Conversion { ref feature, .. } if feature == "Goals"),
                "unexpected error for {value}: {err}"
            );
        }
    }

    #[test]
    fn test_coerce_rejects_non_finite_strings() {
        assert!(coerce_to_f64("a", &json!("nan")).is_err());
        assert!(coerce_to_f64("a", &json!("inf")).is_err());
    }

    #[test]
    fn test_request_from_value() {
        let request = ScoringRequest::try_from(json!({"Goals": 2, "extra": "x"})).unwrap();
        assert_eq!(request.len(), 2);
        assert!(request.contains("Goals"));

        assert!(ScoringRequest::try_from(json!([1, 2, 3])).is_err());
    }

    #[test]
    fn test_prediction_serializes_null_probability() {
        let body = serde_json::to_value(Prediction::new(1, None)).unwrap();
        assert_eq!(body, json!({"prediction": 1, "probability": null}));
    }
}
