pub mod batch;
pub mod conditions;
pub mod config;
pub mod error;
pub mod model;
pub mod paradigms;
pub mod reduce;
pub mod scheduler;
pub mod task;
pub mod trial;

pub use batch::{Batch, BatchOptions};
pub use conditions::ConditionCycle;
pub use config::{BatchConfig, ModelParams, PracticeConfig, PrpConfig, SubitizingConfig};
pub use error::{ConfigError, TaskError};
pub use model::{BottleneckModel, Model, Reply};
pub use paradigms::{PracticeTask, PrpTask, SubitizingTask, TaskKind};
pub use reduce::{ConditionMeans, GridMeans};
pub use scheduler::{RunLimits, RunSummary, TrialScheduler};
pub use task::{Action, Context, Task};
pub use trial::{TrialLog, TrialSlot};
