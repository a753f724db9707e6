use cogfit_stats::StatsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskError {
    /// A response arrived while no trial was open.
    #[error("{hook} called with no open trial")]
    NoOpenTrial { hook: &'static str },
    /// A late answer to a stimulus shown before the open trial began.
    #[error("{hook} answers a stimulus from {onset:.3}, but the open trial began at {opened:.3}")]
    StaleResponse {
        hook: &'static str,
        onset: f64,
        opened: f64,
    },
    #[error("run already started")]
    AlreadyStarted,
    #[error(transparent)]
    Stats(#[from] StatsError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}
