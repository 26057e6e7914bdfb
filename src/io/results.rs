//! JSON reading and writing for grouped result tables

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::data::GroupedResults;
use crate::error::Result;

/// Read grouped results from a JSON file
///
/// Expected shape:
/// `{"comparisons": [{"name": .., "clusters": [{"name": .., "table": {"row_names": [..], "columns": [{"name": .., "values": [..]}]}}]}]}`
pub fn read_grouped_results<P: AsRef<Path>>(path: P) -> Result<GroupedResults> {
    let reader = BufReader::new(File::open(path)?);
    let results: GroupedResults = serde_json::from_reader(reader)?;
    results.validate()?;
    Ok(results)
}

/// Write grouped results as pretty-printed JSON
pub fn write_grouped_results<P: AsRef<Path>>(path: P, results: &GroupedResults) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, results)?;
    writer.flush()?;
    Ok(())
}
