use ruozhibench_core::model::Mode;
use ruozhibench_core::pipeline::run_collect;

use super::super::args::CollectArgs;
use super::{build_dispatcher, stderr_progress};

pub async fn run(args: CollectArgs) -> anyhow::Result<i32> {
    let mode: Mode = args.mode.parse()?;
    let dispatcher = build_dispatcher(
        &args.client,
        &args.model,
        &args.api_config,
        &args.dispatch,
    )?;
    run_collect(
        &dispatcher,
        mode,
        &args.model,
        &args.data_dir,
        Some(stderr_progress()),
    )
    .await?;
    Ok(0)
}
