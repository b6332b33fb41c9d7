//! Stratified train/test split

use matchscore_core::{Error, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;

/// Row indices of each partition, ascending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Split row indices so every class keeps its share in both partitions.
///
/// Per class, `round(count * test_size)` rows go to the test partition,
/// clamped so each partition receives at least one row of the class.
pub fn stratified_split(targets: &[i64], test_size: f64, seed: u64) -> Result<TrainTestSplit> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(Error::training(format!(
            "test_size must be in (0, 1), got {test_size}"
        )));
    }

    let mut by_class: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (row, label) in targets.iter().enumerate() {
        by_class.entry(*label).or_default().push(row);
    }

    if let Some((label, rows)) = by_class.iter().find(|(_, rows)| rows.len() < 2) {
        return Err(Error::training(format!(
            "class {label} has only {} row(s); stratified split needs at least 2 per class",
            rows.len()
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(targets.len());
    let mut test = Vec::new();

    for rows in by_class.values_mut() {
        rows.shuffle(&mut rng);
        let count = rows.len();
        let n_test = ((count as f64 * test_size).round() as usize).clamp(1, count - 1);
        test.extend_from_slice(&rows[..n_test]);
        train.extend_from_slice(&rows[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();

    Ok(TrainTestSplit { train, test })
}
