//! Response collection: send benchmark questions to the model under test and
//! record its answers.

use std::path::Path;

use crate::client::{construct_message_list, CallOptions};
use crate::dataset;
use crate::dispatch::{Dispatcher, ProgressSink};
use crate::model::{Mode, Record};
use crate::prompts::{self, ASSISTANT_SYSTEM_ROLE};

use super::{model_basename, persist, skip_existing, RunOutcome};

const COLLECT_MAX_TOKENS: u32 = 1024;

/// Collect responses for every record of `ruozhibench_gen.jsonl`.
///
/// Gen mode prompts with the deceptive question (`question_en`); normal mode
/// drops records without a paired ordinary question (`pair`) and prompts with
/// that instead. The answer lands in `response` / `pair_response`.
pub async fn run_collect(
    dispatcher: &Dispatcher,
    mode: Mode,
    model: &str,
    data_dir: &Path,
    progress: Option<ProgressSink>,
) -> anyhow::Result<RunOutcome> {
    let results_dir = data_dir.join(format!("response_{}", mode));
    std::fs::create_dir_all(&results_dir)?;

    let output_file = results_dir.join(format!("{}.jsonl", model_basename(model)));
    if output_file.exists() {
        return skip_existing(&output_file);
    }

    let input_file = data_dir.join("ruozhibench_gen.jsonl");
    let records = dataset::read_jsonl(&input_file)?;
    let mut records: Vec<Record> = match mode {
        Mode::Gen => records,
        // Normal mode only covers records that carry a paired question.
        Mode::Normal => records.into_iter().filter(|r| r.has("pair")).collect(),
    };

    let prompt_column = match mode {
        Mode::Gen => "question_en",
        Mode::Normal => "pair",
    };
    prompts::require_columns(&records, &[prompt_column])?;
    let prompt_texts: Vec<String> = records
        .iter()
        .map(|r| r.text_field(prompt_column).map(|s| s.into_owned()))
        .collect::<Result<_, _>>()?;

    tracing::info!(
        model,
        mode = %mode,
        count = records.len(),
        "collecting responses"
    );
    let messages_list = construct_message_list(prompt_texts, ASSISTANT_SYSTEM_ROLE);
    let responses = dispatcher
        .multi_call(
            messages_list,
            CallOptions::new(COLLECT_MAX_TOKENS),
            None,
            progress,
        )
        .await?;

    let response_column = match mode {
        Mode::Gen => "response",
        Mode::Normal => "pair_response",
    };
    for (record, response) in records.iter_mut().zip(responses) {
        record.set(response_column, response);
    }

    persist(&output_file, &records)?;
    println!("Results saved to {}", output_file.display());
    Ok(RunOutcome {
        path: output_file,
        records,
        skipped: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::LlmClient;
    use crate::model::ChatMessage;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::tempdir;

    struct CannedClient {
        calls: AtomicUsize,
        reply: String,
    }

    impl CannedClient {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                reply: reply.to_string(),
            })
        }
    }

    #[async_trait]
    impl LlmClient for CannedClient {
        async fn complete(
            &self,
            _messages: &[ChatMessage],
            _opts: &CallOptions,
        ) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }

        fn provider_name(&self) -> &'static str {
            "canned"
        }
    }

    fn write_gen_dataset(data_dir: &Path) {
        let rows = [
            json!({"question_en": "q1", "irrationality": "a1", "pair": "p1"}),
            json!({"question_en": "q2", "irrationality": "a2", "pair": null}),
        ];
        let body: String = rows.iter().map(|r| format!("{r}\n")).collect();
        std::fs::write(data_dir.join("ruozhibench_gen.jsonl"), body).unwrap();
    }

    #[tokio::test]
    async fn gen_collect_attaches_response_column() {
        let tmp = tempdir().unwrap();
        write_gen_dataset(tmp.path());
        let client = CannedClient::new("an answer");
        let dispatcher = Dispatcher::new(client.clone(), 2, 1);

        let outcome = run_collect(&dispatcher, Mode::Gen, "gpt-4o-mini", tmp.path(), None)
            .await
            .unwrap();
        assert!(!outcome.skipped);
        assert_eq!(outcome.records.len(), 2);
        for rec in &outcome.records {
            assert_eq!(rec.get("response").unwrap(), "an answer");
        }
        assert!(tmp.path().join("response_gen/gpt-4o-mini.jsonl").exists());
        assert!(tmp.path().join("response_gen/gpt-4o-mini.csv").exists());
    }

    #[tokio::test]
    async fn normal_collect_drops_unpaired_records() {
        let tmp = tempdir().unwrap();
        write_gen_dataset(tmp.path());
        let client = CannedClient::new("paired answer");
        let dispatcher = Dispatcher::new(client.clone(), 2, 1);

        let outcome = run_collect(&dispatcher, Mode::Normal, "m", tmp.path(), None)
            .await
            .unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            outcome.records[0].get("pair_response").unwrap(),
            "paired answer"
        );
    }

    #[tokio::test]
    async fn existing_output_short_circuits_without_calls() {
        let tmp = tempdir().unwrap();
        write_gen_dataset(tmp.path());
        let out_dir = tmp.path().join("response_gen");
        std::fs::create_dir_all(&out_dir).unwrap();
        let existing = "{\"question_en\":\"q1\",\"response\":\"cached\"}\n";
        std::fs::write(out_dir.join("m.jsonl"), existing).unwrap();

        let client = CannedClient::new("fresh");
        let dispatcher = Dispatcher::new(client.clone(), 2, 1);
        let outcome = run_collect(&dispatcher, Mode::Gen, "m", tmp.path(), None)
            .await
            .unwrap();

        assert!(outcome.skipped);
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].get("response").unwrap(), "cached");
        // File contents untouched.
        let raw = std::fs::read_to_string(out_dir.join("m.jsonl")).unwrap();
        assert_eq!(raw, existing);
    }
}
