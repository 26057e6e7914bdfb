//! Multiple testing correction

mod fdr;
mod global;

pub use fdr::{benjamini_hochberg, benjamini_yekutieli, bonferroni, holm, p_adjust, PAdjustMethod};
pub use global::{adjust_globally, adjust_globally_with, pooled_adjust, GlobalAdjustParams};
