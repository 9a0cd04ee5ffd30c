//! Rubric evaluation: score collected responses 0-4 with an evaluator model.
//!
//! Walks every response file under `response_<mode>/` and writes one result
//! file per input under `evaluation_<mode>/<evaluator>/`, skipping targets
//! that already exist. Raw evaluator text is persisted alongside the
//! extracted rating, so a failed extraction never loses the response.

use std::path::Path;

use crate::client::CallOptions;
use crate::dispatch::{Dispatcher, PostCheck, ProgressSink};
use crate::extract;
use crate::model::{ChatMessage, Mode, Record};
use crate::prompts;

use super::{model_basename, persist, skip_existing, RunOutcome};

const EVAL_MAX_TOKENS: u32 = 2048;

fn eval_messages(mode: Mode, record: &Record) -> Result<Vec<ChatMessage>, crate::Error> {
    match mode {
        Mode::Gen => prompts::gen_eval_messages(record),
        Mode::Normal => prompts::normal_eval_messages(record),
    }
}

fn required_columns(mode: Mode) -> &'static [&'static str] {
    match mode {
        Mode::Gen => &["question_en", "irrationality", "response"],
        Mode::Normal => &["pair", "pair_response"],
    }
}

/// Evaluate every `*.jsonl` response file for `mode`, newest-named first.
/// Returns one outcome per input file (skips included).
pub async fn run_rubric(
    dispatcher: &Dispatcher,
    mode: Mode,
    evaluator: &str,
    data_dir: &Path,
    progress: Option<ProgressSink>,
) -> anyhow::Result<Vec<RunOutcome>> {
    let response_dir = data_dir.join(format!("response_{}", mode));
    let result_dir = data_dir
        .join(format!("evaluation_{}", mode))
        .join(model_basename(evaluator));
    std::fs::create_dir_all(&result_dir)?;

    let entries = std::fs::read_dir(&response_dir)
        .map_err(|e| crate::Error::io(response_dir.as_path(), e))?;
    let mut response_files: Vec<_> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "jsonl"))
        .collect();
    // Reverse lexical order, so later model snapshots get evaluated first.
    response_files.sort();
    response_files.reverse();

    let mut outcomes = Vec::new();
    for response_file in response_files {
        let file_name = response_file
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("bad response file path"))?;
        let result_file = result_dir.join(file_name);
        if result_file.exists() {
            outcomes.push(skip_existing(&result_file)?);
            continue;
        }

        println!("Processing responses for {}...", response_file.display());
        let mut records = crate::dataset::read_jsonl(&response_file)?;
        prompts::require_columns(&records, required_columns(mode))?;
        let eval_batch: Vec<Vec<ChatMessage>> = records
            .iter()
            .map(|r| eval_messages(mode, r))
            .collect::<Result<_, _>>()?;

        tracing::info!(
            evaluator,
            mode = %mode,
            file = %response_file.display(),
            count = records.len(),
            "running rubric evaluation"
        );
        let opts = CallOptions::new(EVAL_MAX_TOKENS).with_json_object();
        let post_check: PostCheck = std::sync::Arc::new(extract::rate_post_check);
        let results = dispatcher
            .multi_call(eval_batch, opts, Some(post_check), progress.clone())
            .await?;

        let eval_column = format!("{}_evaluation", mode);
        let rating_column = format!("{}_rating", mode);
        for (record, raw) in records.iter_mut().zip(results) {
            let rating = extract::rate_extract(&raw);
            record.set(eval_column.clone(), raw);
            record.set(rating_column.clone(), rating);
        }

        persist(&result_file, &records)?;
        println!("Evaluation results saved to {}", result_file.display());
        outcomes.push(RunOutcome {
            path: result_file,
            records,
            skipped: false,
        });
    }

    Ok(outcomes)
}
