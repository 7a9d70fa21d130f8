//! Random Forest
//!
//! Bagged CART trees with per-split feature subsampling. Trees are fitted in
//! parallel; each tree draws from its own RNG seeded from the master seed, so
//! the fitted forest does not depend on thread scheduling.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::tree::{argmax, DecisionTree, FeatureRow, TreeParams};
use crate::error::{AdvisorError, Result};

#[derive(Debug, Clone, Copy)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub seed: u64,
    pub tree: TreeParams,
}

impl Default for ForestParams {
    fn default() -> Self {
        ForestParams {
            n_estimators: 100,
            seed: 42,
            tree: TreeParams::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    n_classes: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Fit on `rows` with class indices `labels` in `0..n_classes`.
    pub fn fit(rows: &[FeatureRow], labels: &[usize], n_classes: usize, params: ForestParams) -> Result<Self> {
        if rows.is_empty() {
            return Err(AdvisorError::Model("cannot fit a forest on an empty dataset".to_string()));
        }
        if rows.len() != labels.len() {
            return Err(AdvisorError::Model(format!(
                "{} feature rows but {} labels",
                rows.len(),
                labels.len()
            )));
        }
        if let Some(&bad) = labels.iter().find(|&&l| l >= n_classes) {
            return Err(AdvisorError::Model(format!("label index {} outside {} classes", bad, n_classes)));
        }
        if params.n_estimators == 0 {
            return Err(AdvisorError::Model("n_estimators must be at least 1".to_string()));
        }

        let mut master = StdRng::seed_from_u64(params.seed);
        let seeds: Vec<u64> = (0..params.n_estimators).map(|_| master.gen()).collect();

        let n = rows.len();
        let trees: Vec<DecisionTree> = seeds
            .par_iter()
            .map(|&seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                DecisionTree::fit(rows, labels, n_classes, bootstrap, params.tree, &mut rng)
            })
            .collect();

        Ok(RandomForest { n_classes, trees })
    }

    /// Majority vote across trees; ties go to the lowest class index.
    pub fn predict(&self, row: &FeatureRow) -> usize {
        argmax(&self.votes(row))
    }

    /// Per-class vote counts
    pub fn votes(&self, row: &FeatureRow) -> Vec<usize> {
        let mut votes = vec![0usize; self.n_classes];
        for tree in &self.trees {
            votes[tree.predict(row)] += 1;
        }
        votes
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(AdvisorError::Model("forest has no trees".to_string()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_classes)
                .map_err(|e| AdvisorError::Model(format!("tree {}: {}", i, e)))?;
        }
        Ok(())
    }
}
