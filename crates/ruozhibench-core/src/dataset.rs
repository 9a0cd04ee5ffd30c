//! Row-oriented dataset I/O. JSONL is the source of truth; the CSV written
//! next to it is a flat projection of the same in-memory record set, never
//! read back.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::errors::Error;
use crate::model::Record;

/// Read a line-delimited JSON file. Blank lines are skipped; a malformed
/// line is a fatal input error, reported with its line number.
pub fn read_jsonl(path: &Path) -> anyhow::Result<Vec<Record>> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();
    for (i, line_res) in reader.lines().enumerate() {
        let line = line_res.map_err(|e| Error::io(path, e))?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let record: Record = serde_json::from_str(line).map_err(|e| {
            anyhow::anyhow!(
                "{}: line {}: invalid JSONL record: {}",
                path.display(),
                i + 1,
                e
            )
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Write records as compact JSONL. Non-ASCII text stays unescaped. The file
/// is written in one shot, so readers never observe a half-written state.
pub fn write_jsonl(path: &Path, records: &[Record]) -> anyhow::Result<()> {
    let mut out = String::new();
    for record in records {
        out.push_str(&serde_json::to_string(record)?);
        out.push('\n');
    }
    std::fs::write(path, out)?;
    Ok(())
}

/// Flat tabular projection: header is the union of record keys in first-seen
/// order; scalar values render plainly, composite values as JSON.
pub fn write_csv(path: &Path, records: &[Record]) -> anyhow::Result<()> {
    let mut columns: Vec<&str> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for record in records {
        for key in record.0.keys() {
            if seen.insert(key) {
                columns.push(key);
            }
        }
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&columns)?;
    for record in records {
        let row: Vec<String> = columns
            .iter()
            .map(|col| match record.get(col) {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) => s.clone(),
                Some(Value::Bool(b)) => b.to_string(),
                Some(Value::Number(n)) => n.to_string(),
                Some(composite) => composite.to_string(),
            })
            .collect();
        writer.write_record(&row)?;
    }
    let buf = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("failed to flush csv buffer: {}", e))?;
    std::fs::write(path, buf)?;
    Ok(())
}

/// The CSV sibling of a JSONL output path.
pub fn csv_sibling(jsonl_path: &Path) -> PathBuf {
    jsonl_path.with_extension("csv")
}
