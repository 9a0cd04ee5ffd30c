//! Pairwise preference evaluation: the model picks between a good and a bad
//! answer to the same deceptive question, once per answer order, so a
//! position-biased evaluator is caught by the swapped round.

use std::path::Path;
use std::sync::Arc;

use crate::client::{construct_message_list, CallOptions};
use crate::dataset;
use crate::dispatch::{Dispatcher, PostCheck, ProgressSink};
use crate::extract;
use crate::model::{Choice, Record};
use crate::prompts::{self, ASSISTANT_SYSTEM_ROLE};

use super::{model_basename, persist, skip_existing, RunOutcome};

const MC_MAX_TOKENS: u32 = 1024;

const GOOD_COLUMN: &str = "Good Answer";
const BAD_COLUMN: &str = "Bad Answer";

fn mc_batch(records: &[Record], first: &str, second: &str) -> anyhow::Result<Vec<Vec<crate::model::ChatMessage>>> {
    let prompt_texts: Vec<String> = records
        .iter()
        .map(|r| {
            Ok::<_, crate::Error>(prompts::mc_eval_prompt(
                &r.text_field("question_en")?,
                &r.text_field(first)?,
                &r.text_field(second)?,
            ))
        })
        .collect::<Result<_, _>>()?;
    Ok(construct_message_list(prompt_texts, ASSISTANT_SYSTEM_ROLE))
}

/// Run both orderings of the forced-choice comparison over
/// `ruozhibench_mc.jsonl` and derive per-order correctness flags.
pub async fn run_pairwise(
    dispatcher: &Dispatcher,
    model: &str,
    data_dir: &Path,
    progress: Option<ProgressSink>,
) -> anyhow::Result<RunOutcome> {
    let result_dir = data_dir.join("evaluation_mc");
    std::fs::create_dir_all(&result_dir)?;
    let output_file = result_dir.join(format!("{}.jsonl", model_basename(model)));
    if output_file.exists() {
        return skip_existing(&output_file);
    }

    let input_file = data_dir.join("ruozhibench_mc.jsonl");
    let mut records = dataset::read_jsonl(&input_file)?;
    prompts::require_columns(&records, &["question_en", GOOD_COLUMN, BAD_COLUMN])?;

    let opts = CallOptions::new(MC_MAX_TOKENS);
    let post_check: PostCheck = Arc::new(extract::mc_post_check);

    tracing::info!(model, count = records.len(), "pairwise round 1 (good answer first)");
    let batch = mc_batch(&records, GOOD_COLUMN, BAD_COLUMN)?;
    let responses = dispatcher
        .multi_call(batch, opts, Some(post_check.clone()), progress.clone())
        .await?;
    for (record, raw) in records.iter_mut().zip(responses) {
        let choice = extract::choice_extract(&raw);
        record.set("good_first_response", raw);
        record.set("good_first_choice", choice);
        record.set("good_first_correctness", choice == Choice::AnswerA);
    }

    tracing::info!(model, count = records.len(), "pairwise round 2 (bad answer first)");
    let batch = mc_batch(&records, BAD_COLUMN, GOOD_COLUMN)?;
    let responses = dispatcher
        .multi_call(batch, opts, Some(post_check), progress)
        .await?;
    for (record, raw) in records.iter_mut().zip(responses) {
        let choice = extract::choice_extract(&raw);
        record.set("bad_first_response", raw);
        record.set("bad_first_choice", choice);
        record.set("bad_first_correctness", choice == Choice::AnswerB);
    }

    // Stale column from older dataset exports.
    for record in records.iter_mut() {
        record.remove("response_scores");
    }

    persist(&output_file, &records)?;
    println!("Results saved to {}", output_file.display());
    Ok(RunOutcome {
        path: output_file,
        records,
        skipped: false,
    })
}
