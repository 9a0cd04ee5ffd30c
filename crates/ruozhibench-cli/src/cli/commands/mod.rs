mod collect;
mod evaluate;
mod pairwise;

use std::path::Path;
use std::sync::Arc;

use ruozhibench_core::client::{build_client, ClientKind};
use ruozhibench_core::config::ApiConfig;
use ruozhibench_core::dispatch::{Dispatcher, ProgressEvent, ProgressSink};

use super::args::{Cli, Command, DispatchArgs};

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Collect(args) => collect::run(args).await,
        Command::Evaluate(args) => evaluate::run(args).await,
        Command::Pairwise(args) => pairwise::run(args).await,
    }
}

/// Resolve client kind + api config into a ready dispatcher. All selection
/// errors here are fatal configuration errors.
pub(crate) fn build_dispatcher(
    client: &str,
    model: &str,
    api_config: &Path,
    opts: &DispatchArgs,
) -> anyhow::Result<Dispatcher> {
    let kind: ClientKind = client.parse()?;
    let config = ApiConfig::load(api_config)?;
    let client = build_client(kind, model, &config)?;
    Ok(Dispatcher::new(client, opts.parallel, opts.max_attempts))
}

/// Progress line on stderr, one update per completed prompt.
pub(crate) fn stderr_progress() -> ProgressSink {
    Arc::new(|ev: ProgressEvent| {
        eprint!("\r{}/{} responses", ev.done, ev.total);
        if ev.done == ev.total {
            eprintln!();
        }
    })
}
