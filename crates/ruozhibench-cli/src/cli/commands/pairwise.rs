use ruozhibench_core::pipeline::run_pairwise;

use super::super::args::PairwiseArgs;
use super::{build_dispatcher, stderr_progress};

pub async fn run(args: PairwiseArgs) -> anyhow::Result<i32> {
    let dispatcher = build_dispatcher(
        &args.client,
        &args.model,
        &args.api_config,
        &args.dispatch,
    )?;
    run_pairwise(
        &dispatcher,
        &args.model,
        &args.data_dir,
        Some(stderr_progress()),
    )
    .await?;
    Ok(0)
}
