use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about = "Fit cognitive task simulations against human reference data")]
pub struct Args {
    /// Task to evaluate: prp, subitizing, practice or all
    #[arg(long, default_value = "all")]
    pub task: String,

    /// Base seed; runs are reproducible with the same seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Runs per task (overrides each task's own count)
    #[arg(long)]
    pub iterations: Option<usize>,

    /// Append the RMSE to every fit line
    #[arg(long, default_value_t = false)]
    pub show_rmse: bool,

    /// Path to a JSON batch config
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Also write the results as JSON to this path
    #[arg(long, value_name = "PATH")]
    pub json: Option<PathBuf>,

    /// Log per-trial detail
    #[arg(long, short, default_value_t = false)]
    pub verbose: bool,
}
