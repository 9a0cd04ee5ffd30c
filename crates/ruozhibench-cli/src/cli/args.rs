use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "ruozhibench",
    version,
    about = "Evaluation harness for the ruozhibench deceptive-question benchmark"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Collect responses from a model under test
    Collect(CollectArgs),
    /// Rubric-score collected responses with an evaluator model (0-4 scale)
    Evaluate(EvaluateArgs),
    /// Pairwise good-vs-bad forced-choice evaluation, both answer orders
    Pairwise(PairwiseArgs),
}

/// Dispatcher knobs shared by every subcommand.
#[derive(Debug, clap::Args, Clone)]
pub struct DispatchArgs {
    /// Max in-flight model calls
    #[arg(long, default_value_t = 8)]
    pub parallel: usize,

    /// Attempts per prompt before keeping the best-effort response
    #[arg(long, default_value_t = 3)]
    pub max_attempts: u32,
}

#[derive(Debug, Parser, Clone)]
pub struct CollectArgs {
    /// Evaluation mode: gen | normal
    #[arg(long, default_value = "gen")]
    pub mode: String,

    /// Name of the model to collect responses from
    #[arg(long, default_value = "gpt-4o-mini")]
    pub model: String,

    /// Client kind: openai | next | local
    #[arg(long, default_value = "openai")]
    pub client: String,

    /// Data directory holding datasets and results
    #[arg(long, default_value = "../data/")]
    pub data_dir: PathBuf,

    /// Path to the API config file
    #[arg(long, default_value = "config/api_config.json")]
    pub api_config: PathBuf,

    #[command(flatten)]
    pub dispatch: DispatchArgs,
}

#[derive(Debug, Parser, Clone)]
pub struct EvaluateArgs {
    /// Evaluation mode: gen | normal
    #[arg(long)]
    pub mode: String,

    /// Name of the model to use as evaluator
    #[arg(long)]
    pub evaluator: String,

    /// Client kind: openai | next | local
    #[arg(long, default_value = "next")]
    pub client: String,

    /// Data directory holding datasets and results
    #[arg(long, default_value = "../data/")]
    pub data_dir: PathBuf,

    /// Path to the API config file
    #[arg(long, default_value = "config/api_config.json")]
    pub api_config: PathBuf,

    #[command(flatten)]
    pub dispatch: DispatchArgs,
}

#[derive(Debug, Parser, Clone)]
pub struct PairwiseArgs {
    /// Name of the model judging the pair
    #[arg(long)]
    pub model: String,

    /// Client kind: openai | next | local
    #[arg(long, default_value = "next")]
    pub client: String,

    /// Data directory holding datasets and results
    #[arg(long, default_value = "../data/")]
    pub data_dir: PathBuf,

    /// Path to the API config file
    #[arg(long, default_value = "config/api_config.json")]
    pub api_config: PathBuf,

    #[command(flatten)]
    pub dispatch: DispatchArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn evaluate_requires_mode_and_evaluator() {
        let err = Cli::try_parse_from(["ruozhibench", "evaluate"]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("--mode"));
        assert!(msg.contains("--evaluator"));
    }

    #[test]
    fn collect_defaults_to_openai_client() {
        let cli = Cli::try_parse_from(["ruozhibench", "collect", "--model", "m"]).unwrap();
        match cli.cmd {
            Command::Collect(args) => {
                assert_eq!(args.client, "openai");
                assert_eq!(args.mode, "gen");
                assert_eq!(args.dispatch.parallel, 8);
            }
            _ => panic!("wrong subcommand"),
        }
    }
}
