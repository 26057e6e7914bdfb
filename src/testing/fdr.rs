//! P-value adjustment methods for multiple testing correction
//!
//! Implements the p.adjust() methods used on marker tables:
//! - Benjamini-Hochberg (BH) FDR correction (default)
//! - Benjamini-Yekutieli (BY) FDR correction under dependence
//! - Bonferroni family-wise error rate correction
//! - Holm step-down family-wise error rate correction
//!
//! NaN p-values stay NaN and do not count towards the number of tests.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PrepError;

/// Multiple testing correction method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PAdjustMethod {
    #[default]
    BenjaminiHochberg,
    BenjaminiYekutieli,
    Bonferroni,
    Holm,
}

impl FromStr for PAdjustMethod {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bh" | "fdr" => Ok(PAdjustMethod::BenjaminiHochberg),
            "by" => Ok(PAdjustMethod::BenjaminiYekutieli),
            "bonferroni" => Ok(PAdjustMethod::Bonferroni),
            "holm" => Ok(PAdjustMethod::Holm),
            _ => Err(PrepError::InvalidInput {
                reason: format!(
                    "Unknown p-value adjustment method '{}'. Use BH, BY, bonferroni or holm.",
                    s
                ),
            }),
        }
    }
}

impl fmt::Display for PAdjustMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PAdjustMethod::BenjaminiHochberg => "BH",
            PAdjustMethod::BenjaminiYekutieli => "BY",
            PAdjustMethod::Bonferroni => "bonferroni",
            PAdjustMethod::Holm => "holm",
        };
        f.write_str(name)
    }
}

/// Adjust p-values with the given method
/// R equivalent: p.adjust(pvalues, method)
pub fn p_adjust(pvalues: &[f64], method: PAdjustMethod) -> Vec<f64> {
    match method {
        PAdjustMethod::BenjaminiHochberg => benjamini_hochberg(pvalues),
        PAdjustMethod::BenjaminiYekutieli => benjamini_yekutieli(pvalues),
        PAdjustMethod::Bonferroni => bonferroni(pvalues),
        PAdjustMethod::Holm => holm(pvalues),
    }
}

/// Indices of the finite p-values, sorted by ascending p-value
fn sorted_finite_indices(pvalues: &[f64]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..pvalues.len())
        .filter(|&i| pvalues[i].is_finite())
        .collect();
    indices.sort_by(|&a, &b| pvalues[a].total_cmp(&pvalues[b]));
    indices
}

/// Step-up adjustment shared by BH and BY: p * m * scale / rank, cumulative
/// minimum from the largest p-value down
fn step_up(pvalues: &[f64], scale: impl Fn(usize) -> f64) -> Vec<f64> {
    let indices = sorted_finite_indices(pvalues);
    let m = indices.len();
    let mut padj = vec![f64::NAN; pvalues.len()];
    if m == 0 {
        return padj;
    }

    let factor = m as f64 * scale(m);
    let mut cummin = f64::INFINITY;
    for (pos, &i) in indices.iter().enumerate().rev() {
        let rank = (pos + 1) as f64;
        let adj = (pvalues[i] * factor / rank).min(1.0);
        cummin = cummin.min(adj);
        padj[i] = cummin;
    }
    padj
}

/// Apply Benjamini-Hochberg FDR correction to p-values
/// R equivalent: p.adjust(method="BH")
///
/// Returns adjusted p-values (q-values) that control the false discovery rate.
pub fn benjamini_hochberg(pvalues: &[f64]) -> Vec<f64> {
    step_up(pvalues, |_| 1.0)
}

/// Apply Benjamini-Yekutieli FDR correction to p-values
/// R equivalent: p.adjust(method="BY")
///
/// BH scaled by the harmonic sum over the number of tests, valid under
/// arbitrary dependence between tests.
pub fn benjamini_yekutieli(pvalues: &[f64]) -> Vec<f64> {
    step_up(pvalues, |m| (1..=m).map(|i| 1.0 / i as f64).sum())
}

/// Apply Bonferroni correction to p-values
/// R equivalent: p.adjust(method="bonferroni")
///
/// Simple and conservative: multiplies each p-value by the number of tests.
/// Controls the family-wise error rate (FWER) rather than the FDR.
pub fn bonferroni(pvalues: &[f64]) -> Vec<f64> {
    let m = pvalues.iter().filter(|p| p.is_finite()).count();
    pvalues
        .iter()
        .map(|&p| {
            if p.is_finite() {
                (p * m as f64).min(1.0)
            } else {
                f64::NAN
            }
        })
        .collect()
}

/// Apply Holm step-down correction to p-values
/// R equivalent: p.adjust(method="holm")
pub fn holm(pvalues: &[f64]) -> Vec<f64> {
    let indices = sorted_finite_indices(pvalues);
    let m = indices.len();
    let mut padj = vec![f64::NAN; pvalues.len()];

    let mut cummax: f64 = 0.0;
    for (pos, &i) in indices.iter().enumerate() {
        let adj = (pvalues[i] * (m - pos) as f64).min(1.0);
        cummax = cummax.max(adj);
        padj[i] = cummax;
    }
    padj
}
