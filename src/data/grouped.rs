//! Two-level grouped results: comparison -> cluster -> result table

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::ResultTable;
use crate::error::{PrepError, Result};

/// Result table of one cluster within a comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterResult {
    pub name: String,
    pub table: ResultTable,
}

/// All cluster tables of one comparison, in insertion order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub name: String,
    pub clusters: Vec<ClusterResult>,
}

impl Comparison {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            clusters: Vec::new(),
        }
    }

    /// Add a cluster table; cluster names must be unique within a comparison
    pub fn add_cluster(&mut self, cluster: &str, table: ResultTable) -> Result<()> {
        if self.cluster(cluster).is_some() {
            return Err(PrepError::InvalidInput {
                reason: format!(
                    "Cluster '{}' already present in comparison '{}'",
                    cluster, self.name
                ),
            });
        }
        self.clusters.push(ClusterResult {
            name: cluster.to_string(),
            table,
        });
        Ok(())
    }

    pub fn cluster(&self, name: &str) -> Option<&ResultTable> {
        self.clusters.iter().find(|c| c.name == name).map(|c| &c.table)
    }

    pub fn cluster_mut(&mut self, name: &str) -> Option<&mut ResultTable> {
        self.clusters
            .iter_mut()
            .find(|c| c.name == name)
            .map(|c| &mut c.table)
    }

    pub fn cluster_names(&self) -> Vec<&str> {
        self.clusters.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Per-comparison, per-cluster result tables
///
/// Iteration order of comparisons and of clusters is insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupedResults {
    comparisons: Vec<Comparison>,
}

impl GroupedResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a table, creating the comparison on first use
    pub fn insert(&mut self, comparison: &str, cluster: &str, table: ResultTable) -> Result<()> {
        let idx = match self.comparisons.iter().position(|c| c.name == comparison) {
            Some(idx) => idx,
            None => {
                self.comparisons.push(Comparison::new(comparison));
                self.comparisons.len() - 1
            }
        };
        self.comparisons[idx].add_cluster(cluster, table)
    }

    pub fn n_comparisons(&self) -> usize {
        self.comparisons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comparisons.is_empty()
    }

    pub fn comparisons(&self) -> &[Comparison] {
        &self.comparisons
    }

    pub fn comparisons_mut(&mut self) -> &mut [Comparison] {
        &mut self.comparisons
    }

    pub fn comparison_names(&self) -> Vec<&str> {
        self.comparisons.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn comparison(&self, name: &str) -> Option<&Comparison> {
        self.comparisons.iter().find(|c| c.name == name)
    }

    /// Table for (comparison, cluster)
    pub fn get(&self, comparison: &str, cluster: &str) -> Option<&ResultTable> {
        self.comparison(comparison)?.cluster(cluster)
    }

    /// Cluster names shared by every comparison, in the first comparison's order
    ///
    /// Fails with a shape error when the cluster sets differ.
    pub fn cluster_names(&self) -> Result<Vec<String>> {
        let first = match self.comparisons.first() {
            Some(first) => first,
            None => return Ok(Vec::new()),
        };
        let reference: HashSet<&str> = first.cluster_names().into_iter().collect();

        for comparison in &self.comparisons[1..] {
            let clusters: HashSet<&str> = comparison.cluster_names().into_iter().collect();
            if clusters != reference {
                let mut missing: Vec<&str> = reference.difference(&clusters).copied().collect();
                let mut extra: Vec<&str> = clusters.difference(&reference).copied().collect();
                missing.sort_unstable();
                extra.sort_unstable();
                return Err(PrepError::ShapeError {
                    reason: format!(
                        "Comparison '{}' clusters differ from '{}': missing {:?}, extra {:?}",
                        comparison.name, first.name, missing, extra
                    ),
                });
            }
        }

        Ok(first.clusters.iter().map(|c| c.name.clone()).collect())
    }

    /// Check name uniqueness and every table's internal consistency
    ///
    /// Repeated comparison or cluster names are a shape error.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for comparison in &self.comparisons {
            if !seen.insert(comparison.name.as_str()) {
                return Err(PrepError::ShapeError {
                    reason: format!("Comparison '{}' appears more than once", comparison.name),
                });
            }
            let mut clusters = HashSet::new();
            for cluster in &comparison.clusters {
                if !clusters.insert(cluster.name.as_str()) {
                    return Err(PrepError::ShapeError {
                        reason: format!(
                            "Cluster '{}' appears more than once in comparison '{}'",
                            cluster.name, comparison.name
                        ),
                    });
                }
                cluster.table.validate()?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Column;

    fn table(pvalues: Vec<f64>) -> ResultTable {
        let rows = (0..pvalues.len()).map(|i| format!("gene{}", i)).collect();
        ResultTable::new(rows, vec![Column::numeric("p_val", pvalues)]).unwrap()
    }

    #[test]
    fn test_insert_preserves_order() {
        let mut results = GroupedResults::new();
        results.insert("B_vs_A", "c1", table(vec![0.1])).unwrap();
        results.insert("C_vs_A", "c1", table(vec![0.2])).unwrap();
        results.insert("B_vs_A", "c0", table(vec![0.3])).unwrap();

        assert_eq!(results.comparison_names(), vec!["B_vs_A", "C_vs_A"]);
        assert_eq!(
            results.comparison("B_vs_A").unwrap().cluster_names(),
            vec!["c1", "c0"]
        );
        assert_eq!(
            results.get("C_vs_A", "c1").unwrap().numeric_column("p_val").unwrap(),
            &[0.2]
        );
    }

    #[test]
    fn test_duplicate_cluster_rejected() {
        let mut results = GroupedResults::new();
        results.insert("B_vs_A", "c1", table(vec![0.1])).unwrap();
        assert!(results.insert("B_vs_A", "c1", table(vec![0.2])).is_err());
    }

    #[test]
    fn test_cluster_names_order_independent() {
        let mut results = GroupedResults::new();
        results.insert("B_vs_A", "c0", table(vec![0.1])).unwrap();
        results.insert("B_vs_A", "c1", table(vec![0.1])).unwrap();
        results.insert("C_vs_A", "c1", table(vec![0.1])).unwrap();
        results.insert("C_vs_A", "c0", table(vec![0.1])).unwrap();

        assert_eq!(results.cluster_names().unwrap(), vec!["c0", "c1"]);
    }

    #[test]
    fn test_cluster_names_mismatch() {
        let mut results = GroupedResults::new();
        results.insert("B_vs_A", "c0", table(vec![0.1])).unwrap();
        results.insert("B_vs_A", "c1", table(vec![0.1])).unwrap();
        results.insert("C_vs_A", "c0", table(vec![0.1])).unwrap();

        assert!(matches!(
            results.cluster_names(),
            Err(PrepError::ShapeError { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_repeated_cluster() {
        let mut results = GroupedResults::new();
        results.insert("B_vs_A", "c0", table(vec![0.1])).unwrap();
        results.comparisons_mut()[0].clusters.push(ClusterResult {
            name: "c0".to_string(),
            table: table(vec![0.2]),
        });

        assert!(matches!(results.validate(), Err(PrepError::ShapeError { .. })));
    }

    #[test]
    fn test_empty_results() {
        let results = GroupedResults::new();
        assert!(results.is_empty());
        assert!(results.cluster_names().unwrap().is_empty());
    }
}
