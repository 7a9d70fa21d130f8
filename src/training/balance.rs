//! Class Balancing
//!
//! Every class is resampled to exactly `per_class` rows, drawing WITH
//! replacement. Minority classes therefore contain repeated rows, and majority
//! classes can also repeat some rows while never drawing others. Repeated rows
//! may land on both sides of a later train/test split, which inflates held-out
//! accuracy; the training report logs how many distinct source rows survived.

use rand::Rng;

use super::dataset::Dataset;

/// Outcome of balancing: the new dataset plus how many source rows it covers
#[derive(Debug, Clone)]
pub struct Balanced {
    pub dataset: Dataset,
    pub distinct_source_rows: usize,
}

/// Resample each class to `per_class` rows with replacement.
///
/// Classes are emitted in sorted label order, each block contiguous.
pub fn balance_classes<R: Rng>(dataset: &Dataset, per_class: usize, rng: &mut R) -> Balanced {
    let mut picked: Vec<usize> = Vec::with_capacity(per_class * dataset.classes().len());

    for (_, members) in dataset.indices_by_class() {
        for _ in 0..per_class {
            picked.push(members[rng.gen_range(0..members.len())]);
        }
    }

    let mut distinct = picked.clone();
    distinct.sort_unstable();
    distinct.dedup();

    Balanced {
        dataset: dataset.select(&picked),
        distinct_source_rows: distinct.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn skewed() -> Dataset {
        let mut ds = Dataset::default();
        for i in 0..50 {
            ds.rows.push([6.0, i as f64, 0.0, 0.0, 0.0]);
            ds.labels.push("Urea".to_string());
        }
        for i in 0..3 {
            ds.rows.push([7.0, 0.0, i as f64, 0.0, 0.0]);
            ds.labels.push("DAP".to_string());
        }
        ds
    }

    #[test]
    fn test_every_class_gets_exact_count() {
        let mut rng = StdRng::seed_from_u64(42);
        let balanced = balance_classes(&skewed(), 100, &mut rng);

        assert_eq!(balanced.dataset.len(), 200);
        let groups = balanced.dataset.indices_by_class();
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|(_, idx)| idx.len() == 100));
    }

    #[test]
    fn test_minority_class_is_duplicated() {
        let mut rng = StdRng::seed_from_u64(42);
        let balanced = balance_classes(&skewed(), 100, &mut rng);

        let dap_rows: Vec<_> = balanced
            .dataset
            .rows
            .iter()
            .zip(&balanced.dataset.labels)
            .filter(|(_, l)| l.as_str() == "DAP")
            .map(|(r, _)| r[2])
            .collect();
        // Only 3 distinct DAP rows exist
        let mut distinct = dap_rows.clone();
        distinct.sort_by(f64::total_cmp);
        distinct.dedup();
        assert!(distinct.len() <= 3);
        assert!(balanced.distinct_source_rows <= 53);
    }

    #[test]
    fn test_same_seed_same_sample() {
        let a = balance_classes(&skewed(), 20, &mut StdRng::seed_from_u64(1));
        let b = balance_classes(&skewed(), 20, &mut StdRng::seed_from_u64(1));
        assert_eq!(a.dataset, b.dataset);
    }

    #[test]
    fn test_zero_per_class_is_empty() {
        let balanced = balance_classes(&skewed(), 0, &mut StdRng::seed_from_u64(1));
        assert!(balanced.dataset.is_empty());
        assert_eq!(balanced.distinct_source_rows, 0);
    }
}
