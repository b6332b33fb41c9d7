//! Random forest classifier built from bagged `linfa-trees` decision trees
//!
//! Each tree is fitted on a bootstrap sample of the training rows and,
//! optionally, a random subset of the columns. Prediction is a majority vote
//! and probability estimation is the share of trees voting for each class.
//! All randomness comes from one RNG seeded from the parameters, so fitting
//! the same data with the same parameters yields the same forest.

use crate::classifier::{check_width, Classifier};
use linfa::Dataset;
use linfa_trees::{DecisionTree, SplitQuality};
use matchscore_core::{Error, FeatureVector, Result};
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Hyperparameters for [`RandomForest::fit`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestParams {
    /// Number of trees
    #[serde(default = "default_n_estimators")]
    pub n_estimators: usize,

    /// Maximum tree depth, unlimited when `None`
    #[serde(default)]
    pub max_depth: Option<usize>,

    /// Columns sampled per tree, all columns when `None`
    #[serde(default)]
    pub max_features: Option<usize>,

    /// Seed for bootstrap and column sampling
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for RandomForestParams {
    fn default() -> Self {
        Self {
            n_estimators: default_n_estimators(),
            max_depth: None,
            max_features: None,
            seed: default_seed(),
        }
    }
}

impl RandomForestParams {
    pub fn with_n_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

fn default_n_estimators() -> usize {
    200
}

fn default_seed() -> u64 {
    42
}

/// One fitted tree and the columns it was fitted on
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ForestTree {
    columns: Vec<usize>,
    tree: DecisionTree<f64, usize>,
}

/// Fitted random forest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    params: RandomForestParams,
    n_features: usize,
    /// Distinct labels, ascending; trees predict indices into this list
    classes: Vec<i64>,
    trees: Vec<ForestTree>,
}

impl RandomForest {
    /// Fit a forest on `records` (rows x columns) and integer `targets`
    pub fn fit(params: &RandomForestParams, records: &Array2<f64>, targets: &[i64]) -> Result<Self> {
        use linfa::traits::Fit;

        let (n_rows, n_features) = records.dim();

        if n_rows == 0 || n_features == 0 {
            return Err(Error::training("cannot fit a forest on an empty dataset"));
        }
        if n_rows != targets.len() {
            return Err(Error::training(format!(
                "{} rows but {} targets",
                n_rows,
                targets.len()
            )));
        }
        if params.n_estimators == 0 {
            return Err(Error::training("n_estimators must be at least 1"));
        }
        if params.max_features == Some(0) {
            return Err(Error::training("max_features must be at least 1"));
        }

        let classes: Vec<i64> = targets.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        let encoded: Vec<usize> = targets
            .iter()
            .map(|label| classes.binary_search(label).unwrap_or_default())
            .collect();

        let columns_per_tree = params
            .max_features
            .map_or(n_features, |k| k.min(n_features));

        info!(
            "Fitting random forest: {} trees, {} rows, {} features, {} classes",
            params.n_estimators,
            n_rows,
            n_features,
            classes.len()
        );

        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut trees = Vec::with_capacity(params.n_estimators);

        for index in 0..params.n_estimators {
            let rows: Vec<usize> = (0..n_rows).map(|_| rng.gen_range(0..n_rows)).collect();
            let columns = if columns_per_tree < n_features {
                let mut picked = rand::seq::index::sample(&mut rng, n_features, columns_per_tree).into_vec();
                picked.sort_unstable();
                picked
            } else {
                (0..n_features).collect()
            };

            let sample = records.select(Axis(0), &rows).select(Axis(1), &columns);
            let sample_targets: Array1<usize> = rows.iter().map(|&row| encoded[row]).collect();
            let dataset = Dataset::new(sample, sample_targets);

            let tree = DecisionTree::params()
                .split_quality(SplitQuality::Gini)
                .max_depth(params.max_depth)
                .fit(&dataset)
                .map_err(|e| Error::training(format!("tree {index}: {e}")))?;

            trees.push(ForestTree { columns, tree });

            if (index + 1) % 50 == 0 {
                debug!("Fitted {}/{} trees", index + 1, params.n_estimators);
            }
        }

        Ok(Self {
            params: params.clone(),
            n_features,
            classes,
            trees,
        })
    }

    pub fn params(&self) -> &RandomForestParams {
        &self.params
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Check invariants of a deserialized forest
    pub fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(Error::model("forest contains no trees"));
        }
        if self.classes.is_empty() {
            return Err(Error::model("forest has no classes"));
        }
        if self.classes.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::model("forest classes are not strictly ascending"));
        }
        for (index, tree) in self.trees.iter().enumerate() {
            if tree.columns.is_empty() || tree.columns.iter().any(|&c| c >= self.n_features) {
                return Err(Error::model(format!(
                    "tree {index} references columns outside 0..{}",
                    self.n_features
                )));
            }
            // Split indices are relative to the tree's own column subset
            if let Some(feature) = tree
                .tree
                .features()
                .into_iter()
                .find(|&f| f >= tree.columns.len())
            {
                return Err(Error::model(format!(
                    "tree {index} splits on feature {feature} but was fitted on {} columns",
                    tree.columns.len()
                )));
            }
        }
        Ok(())
    }

    /// Vote counts per row (rows x classes)
    fn votes(&self, records: &Array2<f64>) -> Result<Array2<usize>> {
        use linfa::traits::Predict;

        if records.ncols() != self.n_features {
            return Err(Error::model(format!(
                "forest expects {} features, got {}",
                self.n_features,
                records.ncols()
            )));
        }

        let mut votes = Array2::<usize>::zeros((records.nrows(), self.classes.len()));
        for tree in &self.trees {
            let view = records.select(Axis(1), &tree.columns);
            let predicted: Array1<usize> = tree.tree.predict(&view);
            for (row, class) in predicted.iter().enumerate() {
                if *class < self.classes.len() {
                    votes[[row, *class]] += 1;
                }
            }
        }
        Ok(votes)
    }

    /// Majority-vote labels for every row; ties go to the lowest label
    pub fn predict_records(&self, records: &Array2<f64>) -> Result<Vec<i64>> {
        let votes = self.votes(records)?;
        Ok(votes
            .rows()
            .into_iter()
            .map(|row| {
                let mut best = 0;
                for (class, &count) in row.iter().enumerate() {
                    if count > row[best] {
                        best = class;
                    }
                }
                self.classes[best]
            })
            .collect())
    }

    /// Share of trees voting for each class (rows x classes)
    pub fn predict_proba_records(&self, records: &Array2<f64>) -> Result<Array2<f64>> {
        let votes = self.votes(records)?;
        let n_trees = self.trees.len() as f64;
        Ok(votes.mapv(|count| count as f64 / n_trees))
    }

    fn single_row(&self, features: &FeatureVector) -> Result<Array2<f64>> {
        check_width(self, features)?;
        Array2::from_shape_vec((1, features.len()), features.as_slice().to_vec())
            .map_err(|e| Error::model(e.to_string()))
    }
}

impl Classifier for RandomForest {
    fn name(&self) -> &str {
        "random_forest"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn classes(&self) -> &[i64] {
        &self.classes
    }

    fn predict(&self, features: &FeatureVector) -> Result<i64> {
        let row = self.single_row(features)?;
        self.predict_records(&row)?
            .pop()
            .ok_or_else(|| Error::model("forest returned no prediction"))
    }

    fn supports_probability(&self) -> bool {
        true
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        let row = self.single_row(features)?;
        Ok(self.predict_proba_records(&row)?.row(0).to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn separable() -> (Array2<f64>, Vec<i64>) {
        let records = array![
            [0.0, 1.0],
            [0.5, 1.5],
            [1.0, 0.5],
            [1.5, 1.0],
            [8.0, 9.0],
            [8.5, 9.5],
            [9.0, 8.5],
            [9.5, 9.0],
        ];
        (records, vec![0, 0, 0, 0, 1, 1, 1, 1])
    }

    fn params() -> RandomForestParams {
        RandomForestParams::default().with_n_estimators(15)
    }

    #[test]
    fn test_fit_separates_classes() {
        let (records, targets) = separable();
        let forest = RandomForest::fit(&params(), &records, &targets).unwrap();

        assert_eq!(forest.n_trees(), 15);
        assert_eq!(forest.classes(), &[0, 1]);
        assert_eq!(forest.predict(&vec![0.2, 0.8].into()).unwrap(), 0);
        assert_eq!(forest.predict(&vec![9.2, 9.1].into()).unwrap(), 1);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let (records, targets) = separable();
        let forest = RandomForest::fit(&params(), &records, &targets).unwrap();

        let proba = forest.predict_proba(&vec![9.0, 9.0].into()).unwrap();
        assert_eq!(proba.len(), 2);
        assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(proba[1] > 0.5);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (records, targets) = separable();
        let a = RandomForest::fit(&params(), &records, &targets).unwrap();
        let b = RandomForest::fit(&params(), &records, &targets).unwrap();

        let probe = array![[4.0, 5.0], [5.0, 4.0], [3.0, 3.0]];
        assert_eq!(
            a.predict_proba_records(&probe).unwrap(),
            b.predict_proba_records(&probe).unwrap()
        );
    }

    #[test]
    fn test_non_contiguous_labels() {
        let (records, _) = separable();
        let targets = vec![-1, -1, -1, -1, 7, 7, 7, 7];
        let forest = RandomForest::fit(&params(), &records, &targets).unwrap();

        assert_eq!(forest.classes(), &[-1, 7]);
        assert_eq!(forest.predict(&vec![9.0, 9.0].into()).unwrap(), 7);
    }

    #[test]
    fn test_max_features_subsets_columns() {
        let (records, targets) = separable();
        let forest = RandomForest::fit(
            &params().with_max_features(Some(1)),
            &records,
            &targets,
        )
        .unwrap();

        assert!(forest.trees.iter().all(|t| t.columns.len() == 1));
        forest.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_split_outside_tree_columns() {
        // Column 0 is constant, so every split is on column 1
        let records = array![
            [1.0, 0.0],
            [1.0, 0.5],
            [1.0, 1.0],
            [1.0, 1.5],
            [1.0, 8.0],
            [1.0, 8.5],
            [1.0, 9.0],
            [1.0, 9.5],
        ];
        let targets = vec![0, 0, 0, 0, 1, 1, 1, 1];
        let mut forest = RandomForest::fit(&params(), &records, &targets).unwrap();
        forest.validate().unwrap();

        for tree in &mut forest.trees {
            tree.columns = vec![0];
        }
        assert!(matches!(forest.validate(), Err(Error::Model(_))));
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let (records, targets) = separable();
        assert!(RandomForest::fit(&params(), &records, &targets[..3]).is_err());
        assert!(RandomForest::fit(&params().with_n_estimators(0), &records, &targets).is_err());

        let forest = RandomForest::fit(&params(), &records, &targets).unwrap();
        assert!(matches!(
            forest.predict(&vec![1.0].into()),
            Err(Error::Model(_))
        ));
    }
}
