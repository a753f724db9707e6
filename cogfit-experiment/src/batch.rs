use crate::config::BatchConfig;
use crate::error::TaskError;
use crate::model::Model;
use crate::scheduler::{RunLimits, RunSummary, TrialScheduler};
use crate::task::Task;
use cogfit_core::Environment;
use cogfit_stats::TaskResult;
use rand::Rng;
use tracing::{info, warn};

/// Keeps a run's participant noise independent of the task's own draws.
const MODEL_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOptions {
    pub seed: Option<u64>,
    pub iterations: Option<usize>,
    pub limits: RunLimits,
}

impl BatchOptions {
    pub fn from_config(config: &BatchConfig) -> Self {
        Self {
            seed: config.seed,
            iterations: config.iterations,
            limits: RunLimits {
                max_sim_time: config.max_sim_time,
            },
        }
    }
}

pub fn task_seed(base: u64, run: usize) -> u64 {
    base.wrapping_add(run as u64)
}

pub fn model_seed(base: u64, run: usize) -> u64 {
    task_seed(base, run) ^ MODEL_SALT
}

/// Completed runs of one task, ready for analysis.
pub struct Batch<T: Task> {
    pub runs: Vec<T>,
    pub summaries: Vec<RunSummary>,
    pub seed: u64,
    pub skipped: usize,
}

impl<T: Task> Batch<T> {
    /// Executes independent runs, each with its own task and participant.
    ///
    /// The number of runs is `options.iterations` or else the task's own
    /// `analysis_iterations`. A run that fails is logged and left out.
    pub fn run<M, F, G>(mut make_task: F, mut make_model: G, options: &BatchOptions) -> Self
    where
        M: Model,
        F: FnMut(u64) -> T,
        G: FnMut(u64) -> M,
    {
        let seed = options.seed.unwrap_or_else(|| {
            let drawn = rand::rng().random::<u64>();
            info!(seed = drawn, "no seed given, results are reproducible with this one");
            drawn
        });

        let first = make_task(task_seed(seed, 0));
        let iterations = options
            .iterations
            .unwrap_or_else(|| first.analysis_iterations());
        let name = first.name().to_string();
        let mut first = Some(first);
        info!(task = %name, iterations, seed, "batch started");

        let mut runs = Vec::with_capacity(iterations);
        let mut summaries = Vec::with_capacity(iterations);
        let mut skipped = 0;
        for i in 0..iterations {
            let task = first.take().unwrap_or_else(|| make_task(task_seed(seed, i)));
            let model = make_model(model_seed(seed, i));
            let mut scheduler = TrialScheduler::new(task, model).with_limits(options.limits);
            match scheduler.run() {
                Ok(summary) => {
                    summaries.push(summary);
                    runs.push(scheduler.into_task());
                }
                Err(err) => {
                    warn!(task = %name, run = i, %err, "run failed, skipped");
                    skipped += 1;
                }
            }
        }

        let misuse: u64 = summaries.iter().map(|s| s.misuse).sum();
        info!(task = %name, runs = runs.len(), skipped, misuse, "batch finished");
        Self {
            runs,
            summaries,
            seed,
            skipped,
        }
    }

    pub fn analyze(&self, out: Option<&mut dyn Environment>) -> Result<TaskResult, TaskError> {
        T::analyze(&self.runs, out)
    }
}
