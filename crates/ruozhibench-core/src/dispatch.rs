//! Validated batch dispatch: send N prompts, get back N strings, in input
//! order, each retried until a validity predicate accepts it or the attempt
//! budget runs out. Items run concurrently under a semaphore; results are
//! collected in completion order and slotted back by index.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::client::{CallOptions, LlmClient};
use crate::model::ChatMessage;

/// One progress update: how many prompts have resolved and the batch total.
#[derive(Debug, Clone, Copy)]
pub struct ProgressEvent {
    pub done: usize,
    pub total: usize,
}

/// Sink for progress events, called once per completed prompt.
pub type ProgressSink = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Validity predicate: maps raw response text to cleaned text, or `None` to
/// signal "retry-worthy". Runs before persistence, gating retries only.
pub type PostCheck = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

pub struct Dispatcher {
    client: Arc<dyn LlmClient>,
    parallel: usize,
    max_attempts: u32,
}

impl Dispatcher {
    pub fn new(client: Arc<dyn LlmClient>, parallel: usize, max_attempts: u32) -> Self {
        Self {
            client,
            parallel: parallel.max(1),
            max_attempts: max_attempts.max(1),
        }
    }

    /// Dispatch the whole batch and block until every prompt has resolved.
    /// `out[i]` always corresponds to `batch[i]`. An item whose every attempt
    /// failed at the transport level resolves to an empty string; an item
    /// that exhausted its predicate retries keeps the last raw response,
    /// which downstream extraction may still reject with a sentinel.
    pub async fn multi_call(
        &self,
        batch: Vec<Vec<ChatMessage>>,
        opts: CallOptions,
        post_check: Option<PostCheck>,
        progress: Option<ProgressSink>,
    ) -> anyhow::Result<Vec<String>> {
        let total = batch.len();
        let sem = Arc::new(Semaphore::new(self.parallel));
        let mut join_set = JoinSet::new();

        for (idx, messages) in batch.into_iter().enumerate() {
            let permit = sem.clone().acquire_owned().await?;
            let client = self.client.clone();
            let post_check = post_check.clone();
            let max_attempts = self.max_attempts;
            join_set.spawn(async move {
                let _permit = permit;
                let text =
                    call_with_retries(client, &messages, &opts, post_check, max_attempts).await;
                (idx, text)
            });
        }

        let mut out: Vec<Option<String>> = vec![None; total];
        let mut done = 0usize;
        while let Some(res) = join_set.join_next().await {
            let (idx, text) = res?;
            out[idx] = Some(text);
            done += 1;
            if let Some(sink) = &progress {
                sink(ProgressEvent { done, total });
            }
        }

        Ok(out.into_iter().map(Option::unwrap_or_default).collect())
    }
}

async fn call_with_retries(
    client: Arc<dyn LlmClient>,
    messages: &[ChatMessage],
    opts: &CallOptions,
    post_check: Option<PostCheck>,
    max_attempts: u32,
) -> String {
    let mut last = String::new();
    for attempt in 1..=max_attempts {
        match client.complete(messages, opts).await {
            Ok(text) => match &post_check {
                None => return text,
                Some(check) => {
                    if let Some(cleaned) = check(&text) {
                        return cleaned;
                    }
                    tracing::debug!(
                        attempt,
                        provider = client.provider_name(),
                        "response failed post-check, retrying"
                    );
                    last = text;
                }
            },
            Err(e) => {
                tracing::warn!(
                    attempt,
                    provider = client.provider_name(),
                    error = %e,
                    "model call failed"
                );
            }
        }
    }
    // Best-effort: last raw response, or empty if no call ever succeeded.
    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::construct_message_list;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Echoes the user content back, optionally failing the first N calls
    /// per prompt so the retry path is exercised.
    struct EchoClient {
        calls: AtomicUsize,
        reject_first: usize,
        seen: std::sync::Mutex<std::collections::HashMap<String, usize>>,
    }

    impl EchoClient {
        fn new(reject_first: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                reject_first,
                seen: std::sync::Mutex::new(std::collections::HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl LlmClient for EchoClient {
        async fn complete(
            &self,
            messages: &[ChatMessage],
            _opts: &CallOptions,
        ) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let user = messages.last().unwrap().content.clone();
            let mut seen = self.seen.lock().unwrap();
            let n = seen.entry(user.clone()).or_insert(0);
            *n += 1;
            if *n <= self.reject_first {
                Ok(format!("bad:{}", user))
            } else {
                Ok(format!("ok:{}", user))
            }
        }

        fn provider_name(&self) -> &'static str {
            "echo"
        }
    }

    fn accepts_ok(text: &str) -> Option<String> {
        text.strip_prefix("ok:").map(|rest| rest.to_string())
    }

    #[tokio::test]
    async fn output_order_matches_input_order() {
        let client = Arc::new(EchoClient::new(0));
        let dispatcher = Dispatcher::new(client, 4, 1);
        let prompts: Vec<String> = (0..32).map(|i| format!("p{}", i)).collect();
        let batch = construct_message_list(prompts.clone(), "sys");
        let out = dispatcher
            .multi_call(batch, CallOptions::new(64), None, None)
            .await
            .unwrap();
        for (i, prompt) in prompts.iter().enumerate() {
            assert_eq!(out[i], format!("ok:{}", prompt));
        }
    }

    #[tokio::test]
    async fn predicate_rejection_triggers_retry_and_cleaning() {
        let client = Arc::new(EchoClient::new(1));
        let dispatcher = Dispatcher::new(client.clone(), 2, 3);
        let batch = construct_message_list(vec!["q".into()], "sys");
        let out = dispatcher
            .multi_call(
                batch,
                CallOptions::new(64),
                Some(Arc::new(accepts_ok)),
                None,
            )
            .await
            .unwrap();
        // Predicate returned the cleaned text, not the raw "ok:q".
        assert_eq!(out, vec!["q".to_string()]);
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn exhausted_retries_keep_best_effort_response() {
        let client = Arc::new(EchoClient::new(usize::MAX));
        let dispatcher = Dispatcher::new(client.clone(), 1, 2);
        let batch = construct_message_list(vec!["q".into()], "sys");
        let out = dispatcher
            .multi_call(
                batch,
                CallOptions::new(64),
                Some(Arc::new(accepts_ok)),
                None,
            )
            .await
            .unwrap();
        assert_eq!(out, vec!["bad:q".to_string()]);
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn progress_reaches_total() {
        let client = Arc::new(EchoClient::new(0));
        let dispatcher = Dispatcher::new(client, 3, 1);
        let batch = construct_message_list((0..7).map(|i| i.to_string()).collect(), "sys");
        let max_done = Arc::new(AtomicUsize::new(0));
        let events = Arc::new(AtomicUsize::new(0));
        let sink: ProgressSink = {
            let max_done = max_done.clone();
            let events = events.clone();
            Arc::new(move |ev: ProgressEvent| {
                assert_eq!(ev.total, 7);
                max_done.fetch_max(ev.done, Ordering::SeqCst);
                events.fetch_add(1, Ordering::SeqCst);
            })
        };
        dispatcher
            .multi_call(batch, CallOptions::new(64), None, Some(sink))
            .await
            .unwrap();
        assert_eq!(max_done.load(Ordering::SeqCst), 7);
        assert_eq!(events.load(Ordering::SeqCst), 7);
    }
}
