//! Training Dataset Loading
//!
//! Reads the labelled soil CSV with Polars. Required columns: pH, N, P, K,
//! Moisture (numeric) and Fertilizer (string). Extra columns are ignored.

use anyhow::{Context, Result};
use polars::prelude::*;

use crate::classifier::FeatureRow;
use crate::soil::FEATURE_NAMES;

pub const LABEL_COLUMN: &str = "Fertilizer";

/// Feature rows with their string labels, row-aligned
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub rows: Vec<FeatureRow>,
    pub labels: Vec<String>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sorted distinct labels; position is the class index used by the forest.
    pub fn classes(&self) -> Vec<String> {
        let mut classes = self.labels.clone();
        classes.sort();
        classes.dedup();
        classes
    }

    /// Row indices grouped by class, in `classes()` order
    pub fn indices_by_class(&self) -> Vec<(String, Vec<usize>)> {
        self.classes()
            .into_iter()
            .map(|class| {
                let idx = self
                    .labels
                    .iter()
                    .enumerate()
                    .filter(|(_, l)| **l == class)
                    .map(|(i, _)| i)
                    .collect();
                (class, idx)
            })
            .collect()
    }

    /// Subset by row index (duplicates allowed)
    pub fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            rows: indices.iter().map(|&i| self.rows[i]).collect(),
            labels: indices.iter().map(|&i| self.labels[i].clone()).collect(),
        }
    }

    /// Label strings as class indices into `classes`
    pub fn encode_labels(&self, classes: &[String]) -> Result<Vec<usize>> {
        self.labels
            .iter()
            .map(|l| {
                classes
                    .binary_search(l)
                    .map_err(|_| anyhow::anyhow!("label '{}' not in class list", l))
            })
            .collect()
    }

    /// Build from a DataFrame. Rows with a null in any required column are
    /// rejected rather than silently dropped.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let mut columns: Vec<Vec<f64>> = Vec::with_capacity(FEATURE_NAMES.len());
        for name in FEATURE_NAMES {
            let values = df
                .column(name)
                .with_context(|| format!("Column '{}' not found", name))?
                .cast(&DataType::Float64)
                .with_context(|| format!("Column '{}' is not numeric", name))?
                .f64()
                .with_context(|| format!("Column '{}' is not numeric", name))?
                .into_iter()
                .enumerate()
                .map(|(row, v)| {
                    v.filter(|x| x.is_finite())
                        .ok_or_else(|| anyhow::anyhow!("Column '{}' row {}: missing or non-finite value", name, row))
                })
                .collect::<Result<Vec<f64>>>()?;
            columns.push(values);
        }

        let labels = df
            .column(LABEL_COLUMN)
            .with_context(|| format!("Column '{}' not found", LABEL_COLUMN))?
            .str()
            .with_context(|| format!("Column '{}' is not string type", LABEL_COLUMN))?
            .into_iter()
            .enumerate()
            .map(|(row, v)| {
                v.map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| anyhow::anyhow!("Column '{}' row {}: missing label", LABEL_COLUMN, row))
            })
            .collect::<Result<Vec<String>>>()?;

        let rows = (0..df.height())
            .map(|i| [columns[0][i], columns[1][i], columns[2][i], columns[3][i], columns[4][i]])
            .collect();

        Ok(Dataset { rows, labels })
    }

    /// Load the training CSV
    pub fn from_csv(path: &str) -> Result<Self> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.into()))
            .with_context(|| format!("Failed to create CSV reader: {}", path))?
            .finish()
            .with_context(|| format!("Failed to load training CSV: {}", path))?;

        Self::from_dataframe(&df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_dataframe() {
        let df = df! {
            "pH" => &[6.5, 7.0, 5.8],
            "N" => &[20i64, 80, 35],
            "P" => &[30.0, 12.0, 50.0],
            "K" => &[40.0, 45.0, 10.0],
            "Moisture" => &[55.0, 60.0, 40.0],
            "Fertilizer" => &["Urea", "DAP", "Urea"]
        }
        .unwrap();

        let ds = Dataset::from_dataframe(&df).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.rows[1], [7.0, 80.0, 12.0, 45.0, 60.0]);
        assert_eq!(ds.classes(), vec!["DAP".to_string(), "Urea".to_string()]);
        assert_eq!(ds.encode_labels(&ds.classes()).unwrap(), vec![1, 0, 1]);
    }

    #[test]
    fn test_missing_column() {
        let df = df! {
            "pH" => &[6.5],
            "N" => &[20.0],
            "P" => &[30.0],
            "K" => &[40.0],
            "Fertilizer" => &["Urea"]
        }
        .unwrap();

        let err = Dataset::from_dataframe(&df).unwrap_err();
        assert!(err.to_string().contains("Moisture"));
    }

    #[test]
    fn test_null_value_rejected() {
        let df = df! {
            "pH" => &[Some(6.5), None],
            "N" => &[20.0, 21.0],
            "P" => &[30.0, 31.0],
            "K" => &[40.0, 41.0],
            "Moisture" => &[50.0, 51.0],
            "Fertilizer" => &["Urea", "Urea"]
        }
        .unwrap();

        assert!(Dataset::from_dataframe(&df).is_err());
    }

    #[test]
    fn test_from_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "pH,N,P,K,Moisture,Fertilizer").unwrap();
        writeln!(file, "6.5,20,30,40,55,Urea").unwrap();
        writeln!(file, "7.1,80,12,45,60,DAP").unwrap();
        file.flush().unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let ds = Dataset::from_csv(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.labels, vec!["Urea".to_string(), "DAP".to_string()]);
    }

    #[test]
    fn test_indices_by_class() {
        let ds = Dataset {
            rows: vec![[0.0; 5]; 4],
            labels: vec!["b".into(), "a".into(), "b".into(), "c".into()],
        };
        let groups = ds.indices_by_class();
        assert_eq!(groups[0], ("a".to_string(), vec![1]));
        assert_eq!(groups[1], ("b".to_string(), vec![0, 2]));
    }
}
