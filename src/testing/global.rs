//! Global p-value adjustment pooled across comparisons
//!
//! Marker tables are usually corrected within each (comparison, cluster)
//! table. The global adjustment instead pools, for every cluster, the raw
//! p-values of all comparisons, corrects them together and writes the
//! corrected values back next to the local adjustment.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::fdr::{p_adjust, PAdjustMethod};
use crate::data::{Column, GroupedResults, ResultTable};
use crate::error::{PrepError, Result};

/// Column names and correction method for the global adjustment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalAdjustParams {
    /// Raw per-test p-values (correction input)
    pub pvalue_column: String,
    /// Locally adjusted p-values; the new column is inserted right after it
    pub padj_column: String,
    /// Name of the inserted column
    pub output_column: String,
    pub method: PAdjustMethod,
}

impl Default for GlobalAdjustParams {
    fn default() -> Self {
        Self {
            pvalue_column: "p_val".to_string(),
            padj_column: "p_val_adj".to_string(),
            output_column: "p_val_adj_global".to_string(),
            method: PAdjustMethod::BenjaminiHochberg,
        }
    }
}

/// Add a globally adjusted p-value column with default parameters
///
/// See [`adjust_globally_with`].
pub fn adjust_globally(results: &GroupedResults) -> Result<GroupedResults> {
    adjust_globally_with(results, &GlobalAdjustParams::default())
}

/// Add a globally adjusted p-value column to every table
///
/// For each cluster, the raw p-values of all comparisons are concatenated in
/// comparison order, adjusted once with `params.method`, split back into the
/// per-comparison segments and inserted as `params.output_column` directly
/// after `params.padj_column`. Row order and all other columns are kept.
///
/// Fails with a shape error if the comparisons do not share the same set of
/// clusters or repeat a cluster name, and with a schema error if a table
/// lacks either p-value column, has a non-numeric raw p-value column or
/// already has the output column. Nothing is modified on failure.
pub fn adjust_globally_with(
    results: &GroupedResults,
    params: &GlobalAdjustParams,
) -> Result<GroupedResults> {
    results.validate()?;
    let clusters = results.cluster_names()?;

    for comparison in results.comparisons() {
        for cluster in &comparison.clusters {
            check_schema(&cluster.table, params).map_err(|e| PrepError::SchemaError {
                reason: format!(
                    "comparison '{}', cluster '{}': {}",
                    comparison.name,
                    cluster.name,
                    schema_reason(e)
                ),
            })?;
        }
    }

    log::info!(
        "Global {} adjustment of '{}' over {} clusters x {} comparisons",
        params.method,
        params.pvalue_column,
        clusters.len(),
        results.n_comparisons()
    );

    let adjusted: Vec<Vec<Vec<f64>>> = clusters
        .par_iter()
        .map(|cluster| -> Result<Vec<Vec<f64>>> {
            let segments = results
                .comparisons()
                .iter()
                .map(|comparison| {
                    comparison
                        .cluster(cluster)
                        .ok_or_else(|| PrepError::ShapeError {
                            reason: format!(
                                "Cluster '{}' missing from comparison '{}'",
                                cluster, comparison.name
                            ),
                        })
                        .and_then(|table| table.numeric_column(&params.pvalue_column))
                })
                .collect::<Result<Vec<&[f64]>>>()?;

            let corrected = pooled_adjust(&segments, params.method);
            log::debug!(
                "Cluster '{}': {} pooled tests",
                cluster,
                corrected.iter().map(Vec::len).sum::<usize>()
            );
            Ok(corrected)
        })
        .collect::<Result<_>>()?;

    let mut output = results.clone();
    for (cluster, segments) in clusters.iter().zip(adjusted) {
        for (comparison, segment) in output.comparisons_mut().iter_mut().zip(segments) {
            let name = comparison.name.clone();
            let table = comparison
                .cluster_mut(cluster)
                .ok_or_else(|| PrepError::ShapeError {
                    reason: format!("Cluster '{}' missing from comparison '{}'", cluster, name),
                })?;
            insert_after_anchor(table, params, segment)?;
        }
    }

    Ok(output)
}

/// Adjust the concatenation of `segments` as one family and split the result
/// back into segments of the original lengths
pub fn pooled_adjust(segments: &[&[f64]], method: PAdjustMethod) -> Vec<Vec<f64>> {
    let pooled: Vec<f64> = segments.iter().flat_map(|s| s.iter().copied()).collect();
    let corrected = p_adjust(&pooled, method);

    let mut offset = 0;
    segments
        .iter()
        .map(|segment| {
            let part = corrected[offset..offset + segment.len()].to_vec();
            offset += segment.len();
            part
        })
        .collect()
}

fn check_schema(table: &ResultTable, params: &GlobalAdjustParams) -> Result<()> {
    table.numeric_column(&params.pvalue_column)?;
    if table.column_position(&params.padj_column).is_none() {
        return Err(PrepError::SchemaError {
            reason: format!("Missing column '{}'", params.padj_column),
        });
    }
    if table.column_position(&params.output_column).is_some() {
        return Err(PrepError::SchemaError {
            reason: format!("Column '{}' already exists", params.output_column),
        });
    }
    Ok(())
}

fn schema_reason(error: PrepError) -> String {
    match error {
        PrepError::SchemaError { reason } => reason,
        other => other.to_string(),
    }
}

fn insert_after_anchor(
    table: &mut ResultTable,
    params: &GlobalAdjustParams,
    segment: Vec<f64>,
) -> Result<()> {
    let anchor = table
        .column_position(&params.padj_column)
        .ok_or_else(|| PrepError::SchemaError {
            reason: format!("Missing column '{}'", params.padj_column),
        })?;
    table.insert_column(anchor + 1, Column::numeric(&params.output_column, segment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ClusterResult;
    use crate::testing::benjamini_hochberg;
    use approx::assert_relative_eq;

    fn marker_table(pvalues: Vec<f64>) -> ResultTable {
        let n = pvalues.len();
        let genes: Vec<String> = (0..n).map(|i| format!("gene{}", i)).collect();
        let padj = benjamini_hochberg(&pvalues);
        ResultTable::new(
            genes.clone(),
            vec![
                Column::numeric("p_val", pvalues),
                Column::numeric("avg_log2FC", vec![1.0; n]),
                Column::numeric("p_val_adj", padj),
                Column::numeric("pct.1", vec![0.5; n]),
                Column::categorical("gene", genes),
            ],
        )
        .unwrap()
    }

    fn two_comparisons() -> GroupedResults {
        let mut results = GroupedResults::new();
        results.insert("B_vs_A", "c0", marker_table(vec![0.01, 0.2])).unwrap();
        results.insert("B_vs_A", "c1", marker_table(vec![0.5, 0.04, 0.001])).unwrap();
        results.insert("C_vs_A", "c0", marker_table(vec![0.03])).unwrap();
        results.insert("C_vs_A", "c1", marker_table(vec![0.9, 0.002])).unwrap();
        results
    }

    fn global(results: &GroupedResults, comparison: &str, cluster: &str) -> Vec<f64> {
        results
            .get(comparison, cluster)
            .unwrap()
            .numeric_column("p_val_adj_global")
            .unwrap()
            .to_vec()
    }

    #[test]
    fn test_pooling_matches_single_correction() {
        let adjusted = adjust_globally(&two_comparisons()).unwrap();

        let expected = benjamini_hochberg(&[0.01, 0.2, 0.03]);
        let first = global(&adjusted, "B_vs_A", "c0");
        let second = global(&adjusted, "C_vs_A", "c0");

        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 1);
        assert_relative_eq!(first[0], expected[0], epsilon = 1e-12);
        assert_relative_eq!(first[1], expected[1], epsilon = 1e-12);
        assert_relative_eq!(second[0], expected[2], epsilon = 1e-12);
    }

    #[test]
    fn test_clusters_pooled_independently() {
        let adjusted = adjust_globally(&two_comparisons()).unwrap();

        let expected = benjamini_hochberg(&[0.5, 0.04, 0.001, 0.9, 0.002]);
        let mut pooled = global(&adjusted, "B_vs_A", "c1");
        pooled.extend(global(&adjusted, "C_vs_A", "c1"));

        assert_eq!(pooled.len(), expected.len());
        for (got, want) in pooled.iter().zip(expected.iter()) {
            assert_relative_eq!(*got, *want, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_column_inserted_after_local_adjustment() {
        let adjusted = adjust_globally(&two_comparisons()).unwrap();

        for comparison in adjusted.comparisons() {
            for cluster in &comparison.clusters {
                assert_eq!(
                    cluster.table.column_names(),
                    vec!["p_val", "avg_log2FC", "p_val_adj", "p_val_adj_global", "pct.1", "gene"]
                );
            }
        }
    }

    #[test]
    fn test_rows_and_keys_preserved() {
        let input = two_comparisons();
        let adjusted = adjust_globally(&input).unwrap();

        assert_eq!(adjusted.comparison_names(), input.comparison_names());
        for (before, after) in input.comparisons().iter().zip(adjusted.comparisons()) {
            assert_eq!(before.cluster_names(), after.cluster_names());
            for (b, a) in before.clusters.iter().zip(after.clusters.iter()) {
                assert_eq!(a.table.row_names(), b.table.row_names());
                assert_eq!(a.table.n_columns(), b.table.n_columns() + 1);
                assert_eq!(
                    a.table.numeric_column("p_val").unwrap(),
                    b.table.numeric_column("p_val").unwrap()
                );
            }
        }
    }

    #[test]
    fn test_pooled_adjust_segments() {
        let segments: Vec<&[f64]> = vec![&[0.01, 0.2][..], &[][..], &[0.03][..]];
        let corrected = pooled_adjust(&segments, PAdjustMethod::Bonferroni);

        assert_eq!(corrected.len(), 3);
        assert_relative_eq!(corrected[0][0], 0.03, epsilon = 1e-12);
        assert_relative_eq!(corrected[0][1], 0.6, epsilon = 1e-12);
        assert!(corrected[1].is_empty());
        assert_relative_eq!(corrected[2][0], 0.09, epsilon = 1e-12);
    }

    #[test]
    fn test_custom_columns_and_method() {
        let mut results = GroupedResults::new();
        let table = ResultTable::new(
            vec!["g0".to_string()],
            vec![
                Column::numeric("pvalue", vec![0.02]),
                Column::numeric("padj", vec![0.02]),
            ],
        )
        .unwrap();
        results.insert("B_vs_A", "c0", table.clone()).unwrap();
        results.insert("C_vs_A", "c0", table).unwrap();

        let params = GlobalAdjustParams {
            pvalue_column: "pvalue".to_string(),
            padj_column: "padj".to_string(),
            output_column: "padj_global".to_string(),
            method: PAdjustMethod::Bonferroni,
        };
        let adjusted = adjust_globally_with(&results, &params).unwrap();

        let table = adjusted.get("C_vs_A", "c0").unwrap();
        assert_eq!(table.column_names(), vec!["pvalue", "padj", "padj_global"]);
        assert_relative_eq!(table.numeric_column("padj_global").unwrap()[0], 0.04, epsilon = 1e-12);
    }

    #[test]
    fn test_mismatched_clusters_is_shape_error() {
        let mut results = two_comparisons();
        results.insert("D_vs_A", "c0", marker_table(vec![0.1])).unwrap();

        assert!(matches!(
            adjust_globally(&results),
            Err(PrepError::ShapeError { .. })
        ));
    }

    #[test]
    fn test_missing_anchor_is_schema_error() {
        let mut results = two_comparisons();
        let table = ResultTable::new(
            vec!["g0".to_string()],
            vec![Column::numeric("p_val", vec![0.1])],
        )
        .unwrap();
        results.insert("D_vs_A", "c0", table.clone()).unwrap();
        results.insert("D_vs_A", "c1", table).unwrap();

        assert!(matches!(
            adjust_globally(&results),
            Err(PrepError::SchemaError { .. })
        ));
    }

    #[test]
    fn test_missing_pvalues_is_schema_error() {
        let mut results = GroupedResults::new();
        let table = ResultTable::new(
            vec!["g0".to_string()],
            vec![Column::numeric("p_val_adj", vec![0.1])],
        )
        .unwrap();
        results.insert("B_vs_A", "c0", table).unwrap();

        assert!(matches!(
            adjust_globally(&results),
            Err(PrepError::SchemaError { .. })
        ));
    }

    #[test]
    fn test_existing_output_column_is_schema_error() {
        let adjusted = adjust_globally(&two_comparisons()).unwrap();
        assert!(matches!(
            adjust_globally(&adjusted),
            Err(PrepError::SchemaError { .. })
        ));
    }

    #[test]
    fn test_repeated_cluster_is_shape_error() {
        let mut results = two_comparisons();
        results.comparisons_mut()[1].clusters.push(ClusterResult {
            name: "c0".to_string(),
            table: marker_table(vec![0.07]),
        });

        assert!(matches!(
            adjust_globally(&results),
            Err(PrepError::ShapeError { .. })
        ));
    }

    #[test]
    fn test_cluster_order_differs_between_comparisons() {
        let mut results = GroupedResults::new();
        results.insert("B_vs_A", "c0", marker_table(vec![0.01, 0.2])).unwrap();
        results.insert("B_vs_A", "c1", marker_table(vec![0.5])).unwrap();
        results.insert("C_vs_A", "c1", marker_table(vec![0.04, 0.9])).unwrap();
        results.insert("C_vs_A", "c0", marker_table(vec![0.03])).unwrap();

        let adjusted = adjust_globally_with(
            &results,
            &GlobalAdjustParams {
                method: PAdjustMethod::Bonferroni,
                ..GlobalAdjustParams::default()
            },
        )
        .unwrap();

        // c0 pools [0.01, 0.2, 0.03], c1 pools [0.5, 0.04, 0.9]
        let b_c0 = global(&adjusted, "B_vs_A", "c0");
        let c_c0 = global(&adjusted, "C_vs_A", "c0");
        let b_c1 = global(&adjusted, "B_vs_A", "c1");
        let c_c1 = global(&adjusted, "C_vs_A", "c1");

        assert_eq!(b_c0.len(), 2);
        assert_relative_eq!(b_c0[0], 0.03, epsilon = 1e-12);
        assert_relative_eq!(b_c0[1], 0.6, epsilon = 1e-12);
        assert_eq!(c_c0.len(), 1);
        assert_relative_eq!(c_c0[0], 0.09, epsilon = 1e-12);
        assert_eq!(b_c1, vec![1.0]);
        assert_eq!(c_c1.len(), 2);
        assert_relative_eq!(c_c1[0], 0.12, epsilon = 1e-12);
        assert_eq!(c_c1[1], 1.0);

        // Cluster order inside each comparison is untouched
        assert_eq!(
            adjusted.comparison("C_vs_A").unwrap().cluster_names(),
            vec!["c1", "c0"]
        );
    }

    #[test]
    fn test_categorical_anchor_accepted() {
        let table = ResultTable::new(
            vec!["g0".to_string()],
            vec![
                Column::numeric("p_val", vec![0.02]),
                Column::categorical("p_val_adj", vec!["NA".to_string()]),
            ],
        )
        .unwrap();
        let mut results = GroupedResults::new();
        results.insert("B_vs_A", "c0", table).unwrap();

        let adjusted = adjust_globally(&results).unwrap();
        assert_eq!(
            adjusted.get("B_vs_A", "c0").unwrap().column_names(),
            vec!["p_val", "p_val_adj", "p_val_adj_global"]
        );
    }

    #[test]
    fn test_categorical_pvalues_is_schema_error() {
        let table = ResultTable::new(
            vec!["g0".to_string()],
            vec![
                Column::categorical("p_val", vec!["0.02".to_string()]),
                Column::numeric("p_val_adj", vec![0.02]),
            ],
        )
        .unwrap();
        let mut results = GroupedResults::new();
        results.insert("B_vs_A", "c0", table).unwrap();

        assert!(matches!(
            adjust_globally(&results),
            Err(PrepError::SchemaError { .. })
        ));
    }

    #[test]
    fn test_empty_results_unchanged() {
        let results = GroupedResults::new();
        assert_eq!(adjust_globally(&results).unwrap(), results);
    }
}
