//! rust_pseudobulk command-line interface

use clap::Parser;
use log::{info, LevelFilter};

use rust_pseudobulk::cli::{Cli, Commands};
use rust_pseudobulk::prelude::*;

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        Commands::Prune {
            input,
            threshold,
            output,
        } => run_prune(&input, threshold, &output),
        Commands::Adjust {
            input,
            output,
            method,
            pvalue_column,
            padj_column,
            output_column,
            threads,
            tsv_dir,
        } => run_adjust(
            &input,
            &output,
            &GlobalAdjustParams {
                pvalue_column,
                padj_column,
                output_column,
                method,
            },
            threads,
            tsv_dir.as_deref(),
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_prune(input_path: &str, threshold: f64, output_path: &str) -> Result<()> {
    info!("Loading matrix from: {}", input_path);
    let matrix = read_matrix(input_path)?;
    info!("  {} rows, {} columns", matrix.n_rows(), matrix.n_cols());

    let outcome = prune_matrix_with_trace(&matrix, threshold)?;
    if !outcome.removals.is_empty() {
        info!("  Removed rows: {}", outcome.removed_rows().join(", "));
        info!("  Removed columns: {}", outcome.removed_cols().join(", "));
    }

    write_matrix(output_path, &outcome.matrix)?;
    info!("Pruned matrix written to: {}", output_path);
    Ok(())
}

fn run_adjust(
    input_path: &str,
    output_path: &str,
    params: &GlobalAdjustParams,
    threads: usize,
    tsv_dir: Option<&str>,
) -> Result<()> {
    if threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .ok();
    }

    info!("Loading grouped results from: {}", input_path);
    let results = read_grouped_results(input_path)?;
    info!("  {} comparisons", results.n_comparisons());

    let adjusted = adjust_globally_with(&results, params)?;

    write_grouped_results(output_path, &adjusted)?;
    info!("Adjusted results written to: {}", output_path);

    if let Some(dir) = tsv_dir {
        write_grouped_tables(dir, &adjusted)?;
        info!("Adjusted tables written under: {}", dir);
    }
    Ok(())
}
