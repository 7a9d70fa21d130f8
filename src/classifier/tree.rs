//! CART Decision Tree
//!
//! Binary splits on `feature <= threshold`, chosen by weighted Gini impurity
//! over a random subset of features at every node. Nodes live in a flat arena;
//! index 0 is the root.

use rand::seq::index::sample;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of input features (pH, N, P, K, Moisture)
pub const N_FEATURES: usize = 5;

pub type FeatureRow = [f64; N_FEATURES];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Node {
    Leaf {
        class: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    /// Features considered per split
    pub max_features: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        TreeParams {
            max_features: (N_FEATURES as f64).sqrt() as usize,
            max_depth: None,
            min_samples_split: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

struct Grower<'a, R: Rng> {
    rows: &'a [FeatureRow],
    labels: &'a [usize],
    n_classes: usize,
    params: TreeParams,
    rng: &'a mut R,
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Fit a tree on the rows selected by `indices` (duplicates allowed, as in
    /// a bootstrap sample).
    pub fn fit<R: Rng>(
        rows: &[FeatureRow],
        labels: &[usize],
        n_classes: usize,
        indices: Vec<usize>,
        params: TreeParams,
        rng: &mut R,
    ) -> Self {
        let mut grower = Grower {
            rows,
            labels,
            n_classes,
            params: TreeParams {
                max_features: params.max_features.clamp(1, N_FEATURES),
                ..params
            },
            rng,
            nodes: Vec::new(),
        };
        grower.grow(indices, 0);
        DecisionTree { nodes: grower.nodes }
    }

    /// Class index for one feature row
    pub fn predict(&self, row: &FeatureRow) -> usize {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf { class } => return class,
                Node::Split { feature, threshold, left, right } => {
                    idx = if row[feature] <= threshold { left } else { right };
                }
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, left).max(walk(nodes, right)),
            }
        }
        if self.nodes.is_empty() { 0 } else { walk(&self.nodes, 0) }
    }

    /// Structural check for deserialized trees: non-empty, children in bounds
    /// and after their parent, features and classes in range.
    pub fn validate(&self, n_classes: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match *node {
                Node::Leaf { class } if class >= n_classes => {
                    return Err(format!("node {} predicts unknown class {}", idx, class));
                }
                Node::Split { feature, threshold, left, right } => {
                    if feature >= N_FEATURES {
                        return Err(format!("node {} splits on unknown feature {}", idx, feature));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {} has non-finite threshold", idx));
                    }
                    // Children after parent keeps predict() loop-free
                    for child in [left, right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(format!("node {} has invalid child {}", idx, child));
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

impl<R: Rng> Grower<'_, R> {
    fn grow(&mut self, indices: Vec<usize>, depth: usize) -> usize {
        let counts = self.class_counts(&indices);
        let majority = argmax(&counts);
        let node_idx = self.nodes.len();

        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        let too_small = indices.len() < self.params.min_samples_split;
        let too_deep = self.params.max_depth.map_or(false, |d| depth >= d);

        if pure || too_small || too_deep {
            self.nodes.push(Node::Leaf { class: majority });
            return node_idx;
        }

        let Some((feature, threshold)) = self.best_split(&indices) else {
            self.nodes.push(Node::Leaf { class: majority });
            return node_idx;
        };

        // Placeholder until both children exist
        self.nodes.push(Node::Leaf { class: majority });

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| self.rows[i][feature] <= threshold);

        let left = self.grow(left_idx, depth + 1);
        let right = self.grow(right_idx, depth + 1);
        self.nodes[node_idx] = Node::Split { feature, threshold, left, right };
        node_idx
    }

    fn class_counts(&self, indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes];
        for &i in indices {
            counts[self.labels[i]] += 1;
        }
        counts
    }

    /// Lowest weighted Gini over randomly ordered features. Features are visited
    /// until `max_features` non-constant ones have been scored; constant features
    /// do not count towards that budget. None when every feature is constant.
    fn best_split(&mut self, indices: &[usize]) -> Option<(usize, f64)> {
        let n = indices.len() as f64;
        let total = self.class_counts(indices);
        let mut best: Option<(f64, usize, f64)> = None;
        let mut scored = 0;

        let order = sample(&mut *self.rng, N_FEATURES, N_FEATURES);

        for feature in order.iter() {
            if scored >= self.params.max_features {
                break;
            }

            let mut sorted: Vec<usize> = indices.to_vec();
            sorted.sort_by(|&a, &b| self.rows[a][feature].total_cmp(&self.rows[b][feature]));

            let mut left = vec![0usize; self.n_classes];
            let mut right = total.clone();
            let mut has_candidate = false;

            for pos in 0..sorted.len() - 1 {
                let label = self.labels[sorted[pos]];
                left[label] += 1;
                right[label] -= 1;

                let here = self.rows[sorted[pos]][feature];
                let next = self.rows[sorted[pos + 1]][feature];
                if here == next {
                    continue;
                }
                has_candidate = true;

                let n_left = (pos + 1) as f64;
                let n_right = n - n_left;
                let score = (n_left * gini(&left, n_left) + n_right * gini(&right, n_right)) / n;

                if best.map_or(true, |(s, _, _)| score < s) {
                    best = Some((score, feature, midpoint(here, next)));
                }
            }

            if has_candidate {
                scored += 1;
            }
        }

        best.map(|(_, feature, threshold)| (feature, threshold))
    }
}

/// Split point strictly below `next`, so `x <= threshold` keeps `next` on the right.
fn midpoint(here: f64, next: f64) -> f64 {
    let mid = here / 2.0 + next / 2.0;
    if mid >= next || !mid.is_finite() {
        here
    } else {
        mid
    }
}

fn gini(counts: &[usize], total: f64) -> f64 {
    if total == 0.0 {
        return 0.0;
    }
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

/// Index of the largest count; ties go to the lowest index.
pub(crate) fn argmax(counts: &[usize]) -> usize {
    let mut best = 0;
    for (i, &c) in counts.iter().enumerate() {
        if c > counts[best] {
            best = i;
        }
    }
    best
}
