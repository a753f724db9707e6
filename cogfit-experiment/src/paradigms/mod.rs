pub mod practice;
pub mod prp;
pub mod subitizing;

pub use practice::PracticeTask;
pub use prp::PrpTask;
pub use subitizing::SubitizingTask;

use crate::batch::{Batch, BatchOptions};
use crate::config::BatchConfig;
use crate::error::TaskError;
use crate::model::BottleneckModel;
use crate::task::Task;
use cogfit_core::Environment;
use cogfit_stats::TaskResult;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Prp,
    Subitizing,
    Practice,
}

impl TaskKind {
    pub const ALL: [TaskKind; 3] = [TaskKind::Prp, TaskKind::Subitizing, TaskKind::Practice];

    pub fn name(&self) -> &'static str {
        match self {
            TaskKind::Prp => "prp",
            TaskKind::Subitizing => "subitizing",
            TaskKind::Practice => "practice",
        }
    }

    /// Runs a full batch of this paradigm against the stand-in participant
    /// and analyzes it.
    pub fn evaluate(
        &self,
        config: &BatchConfig,
        out: Option<&mut dyn Environment>,
    ) -> Result<TaskResult, TaskError> {
        let options = BatchOptions::from_config(config);
        let model = |seed| BottleneckModel::new(config.model.clone(), seed);
        match self {
            TaskKind::Prp => evaluate_with(
                |seed| PrpTask::new(config.prp.clone(), StdRng::seed_from_u64(seed)),
                model,
                &options,
                out,
            ),
            TaskKind::Subitizing => evaluate_with(
                |seed| SubitizingTask::new(config.subitizing.clone(), StdRng::seed_from_u64(seed)),
                model,
                &options,
                out,
            ),
            TaskKind::Practice => evaluate_with(
                |seed| PracticeTask::new(config.practice.clone(), StdRng::seed_from_u64(seed)),
                model,
                &options,
                out,
            ),
        }
    }
}

fn evaluate_with<T, F, G>(
    make_task: F,
    make_model: G,
    options: &BatchOptions,
    out: Option<&mut dyn Environment>,
) -> Result<TaskResult, TaskError>
where
    T: Task,
    F: FnMut(u64) -> T,
    G: FnMut(u64) -> BottleneckModel,
{
    Batch::run(make_task, make_model, options).analyze(out)
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TaskKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskKind::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown task '{s}'"))
    }
}
