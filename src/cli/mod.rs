//! Command-line interface for rust_pseudobulk

use clap::{Parser, Subcommand};

use crate::testing::PAdjustMethod;

#[derive(Parser)]
#[command(name = "rust_pseudobulk")]
#[command(version)]
#[command(about = "Count matrix pruning and pooled p-value adjustment")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Prune low-count rows and columns from a matrix
    #[command(
        long_about = "Prune low-count rows and columns from a matrix\n\n\
            Repeatedly removes the row or column with the smallest total among those\n\
            holding an entry below the threshold, until every entry reaches the\n\
            threshold or a single row or column is left.",
        after_long_help = "\
Examples:
  rust_pseudobulk prune -i counts.tsv -t 10 -o pruned.tsv"
    )]
    Prune {
        /// Input matrix (CSV or TSV, first column = row labels)
        #[arg(short, long)]
        input: String,

        /// Minimum value every remaining entry must reach
        #[arg(short, long)]
        threshold: f64,

        /// Output TSV file
        #[arg(short, long, default_value = "pruned.tsv")]
        output: String,
    },

    /// Add a p-value adjustment pooled across comparisons
    #[command(
        long_about = "Add a p-value adjustment pooled across comparisons\n\n\
            For every cluster, raw p-values from all comparisons are adjusted together\n\
            and written into each table right after the local adjusted p-value column.",
        after_long_help = "\
Examples:
  rust_pseudobulk adjust -i markers.json -o markers_global.json
  rust_pseudobulk adjust -i markers.json --method holm --threads 4
  rust_pseudobulk adjust -i markers.json --tsv-dir markers_global"
    )]
    Adjust {
        /// Grouped results JSON (comparison -> cluster -> table)
        #[arg(short, long)]
        input: String,

        /// Output JSON file
        #[arg(short, long, default_value = "adjusted.json")]
        output: String,

        /// Correction method: BH, BY, bonferroni, holm
        #[arg(short, long, default_value = "BH")]
        method: PAdjustMethod,

        /// Raw p-value column
        #[arg(long, default_value = "p_val")]
        pvalue_column: String,

        /// Local adjusted p-value column (insertion anchor)
        #[arg(long, default_value = "p_val_adj")]
        padj_column: String,

        /// Name of the added column
        #[arg(long, default_value = "p_val_adj_global")]
        output_column: String,

        /// Number of threads (0 = all available)
        #[arg(long, default_value_t = 0)]
        threads: usize,

        /// Also write every adjusted table as <DIR>/<comparison>/<cluster>.tsv
        #[arg(long, value_name = "DIR")]
        tsv_dir: Option<String>,
    },
}
