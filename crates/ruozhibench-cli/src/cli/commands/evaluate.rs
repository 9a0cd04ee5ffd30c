use ruozhibench_core::model::Mode;
use ruozhibench_core::pipeline::run_rubric;

use super::super::args::EvaluateArgs;
use super::{build_dispatcher, stderr_progress};

pub async fn run(args: EvaluateArgs) -> anyhow::Result<i32> {
    let mode: Mode = args.mode.parse()?;
    let dispatcher = build_dispatcher(
        &args.client,
        &args.evaluator,
        &args.api_config,
        &args.dispatch,
    )?;
    run_rubric(
        &dispatcher,
        mode,
        &args.evaluator,
        &args.data_dir,
        Some(stderr_progress()),
    )
    .await?;
    Ok(0)
}
