//! Classifier trait and common helpers

use matchscore_core::{Error, FeatureVector, Result};

/// Trait for tabular classifiers served by matchscore
pub trait Classifier: Send + Sync {
    /// Get the classifier name
    fn name(&self) -> &str;

    /// Number of input columns the classifier was fitted on
    fn n_features(&self) -> usize;

    /// Class labels in the classifier's internal (ascending) order
    fn classes(&self) -> &[i64];

    /// Predict the class label of one row
    fn predict(&self, features: &FeatureVector) -> Result<i64>;

    /// Whether [`Classifier::predict_proba`] is implemented.
    ///
    /// Callers query this once and skip probability estimation entirely
    /// when it is false.
    fn supports_probability(&self) -> bool {
        false
    }

    /// Per-class probabilities for one row, aligned with [`Classifier::classes`]
    fn predict_proba(&self, _features: &FeatureVector) -> Result<Vec<f64>> {
        Err(Error::model(format!(
            "classifier '{}' does not estimate probabilities",
            self.name()
        )))
    }
}

/// Probability of the last class in the classifier's ordering.
///
/// For binary problems with 0/1 labels this is the probability of class 1.
pub fn last_class_probability(probabilities: &[f64]) -> Option<f64> {
    probabilities.last().copied()
}

/// Reject rows whose width differs from what the classifier was fitted on
pub fn check_width(classifier: &dyn Classifier, features: &FeatureVector) -> Result<()> {
    if features.len() != classifier.n_features() {
        return Err(Error::model(format!(
            "classifier '{}' expects {} features, got {}",
            classifier.name(),
            classifier.n_features(),
            features.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Constant;

    impl Classifier for Constant {
        fn name(&self) -> &str {
            "constant"
        }

        fn n_features(&self) -> usize {
            2
        }

        fn classes(&self) -> &[i64] {
            &[0, 1]
        }

        fn predict(&self, features: &FeatureVector) -> Result<i64> {
            check_width(self, features)?;
            Ok(1)
        }
    }

    #[test]
    fn test_probability_unsupported_by_default() {
        let classifier = Constant;
        assert!(!classifier.supports_probability());

        let row = FeatureVector::from(vec![1.0, 2.0]);
        assert_eq!(classifier.predict(&row).unwrap(), 1);
        assert!(classifier.predict_proba(&row).is_err());
    }

    #[test]
    fn test_width_mismatch() {
        let row = FeatureVector::from(vec![1.0]);
        assert!(matches!(Constant.predict(&row), Err(Error::Model(_))));
    }

    #[test]
    fn test_last_class_probability() {
        assert_eq!(last_class_probability(&[0.25, 0.75]), Some(0.75));
        assert_eq!(last_class_probability(&[]), None);
    }
}
