//! Pipeline drivers. Each run follows the same shape: resolve the output
//! path, short-circuit if it already exists, load the input records, render
//! prompts, dispatch once (twice for pairwise), attach extracted fields, and
//! persist JSONL plus its CSV projection in a single final write.
//!
//! There is no per-record checkpointing: an interrupted run redoes its whole
//! batch. The whole-file existence check is the only rerun guard, and two
//! simultaneous runs against one target are an accepted hazard.

mod collect;
mod pairwise;
mod rubric;

pub use collect::run_collect;
pub use pairwise::run_pairwise;
pub use rubric::run_rubric;

use std::path::{Path, PathBuf};

use crate::dataset;
use crate::model::Record;

/// Result of one pipeline run: where the records landed and whether the run
/// was an idempotent skip (output already present, zero dispatch calls).
#[derive(Debug)]
pub struct RunOutcome {
    pub path: PathBuf,
    pub records: Vec<Record>,
    pub skipped: bool,
}

/// File-name identity for a model: the basename after the last `/`, so
/// `meta-llama/Llama-3.1-70B-Instruct` and a bare model name both work.
pub(crate) fn model_basename(model: &str) -> &str {
    model.rsplit('/').next().unwrap_or(model)
}

/// Persist the record set to `<path>.jsonl` and its CSV sibling.
pub(crate) fn persist(path: &Path, records: &[Record]) -> anyhow::Result<()> {
    dataset::write_jsonl(path, records)?;
    dataset::write_csv(&dataset::csv_sibling(path), records)?;
    Ok(())
}

/// Idempotent skip: the output file exists, so the run is already done.
/// Returns the existing contents unchanged.
pub(crate) fn skip_existing(path: &Path) -> anyhow::Result<RunOutcome> {
    tracing::info!(path = %path.display(), "results file already exists, skipping");
    println!("Results file {} already exists. Skipping.", path.display());
    let records = dataset::read_jsonl(path)?;
    Ok(RunOutcome {
        path: path.to_path_buf(),
        records,
        skipped: true,
    })
}
