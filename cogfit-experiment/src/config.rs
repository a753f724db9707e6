use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything a batch analysis can be tuned with. Every field has a default,
/// so a config file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Base seed; run `i` uses `seed + i`. Absent means a fresh random seed.
    pub seed: Option<u64>,
    /// Overrides each task's own `analysis_iterations`.
    pub iterations: Option<usize>,
    pub show_rmse: bool,
    /// Runs still going at this simulated time are stopped.
    pub max_sim_time: f64,
    pub model: ModelParams,
    pub prp: PrpConfig,
    pub subitizing: SubitizingConfig,
    pub practice: PracticeConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            seed: None,
            iterations: None,
            show_rmse: false,
            max_sim_time: 7_200.0,
            model: ModelParams::default(),
            prp: PrpConfig::default(),
            subitizing: SubitizingConfig::default(),
            practice: PracticeConfig::default(),
        }
    }
}

impl BatchConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }
}

/// Stage durations of the stand-in simulated participant, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParams {
    pub visual_encoding: f64,
    pub aural_encoding: f64,
    /// Response selection; one at a time across all tasks in flight.
    pub central: f64,
    /// Per-item enumeration cost within the subitizing range.
    pub subitize_item: f64,
    /// Per-item cost beyond the subitizing range.
    pub count_item: f64,
    pub subitize_limit: usize,
    /// Chance per item beyond the limit of being off by one.
    pub count_error: f64,
    pub key_motor: f64,
    pub speech_motor: f64,
    /// Central time scales with `(1 + responses)^-practice_exponent`.
    pub practice_exponent: f64,
    /// Uniform noise in `[-jitter, jitter]` added to every response.
    pub jitter: f64,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            visual_encoding: 0.085,
            aural_encoding: 0.12,
            central: 0.2,
            subitize_item: 0.05,
            count_item: 0.3,
            subitize_limit: 4,
            count_error: 0.02,
            key_motor: 0.21,
            speech_motor: 0.25,
            practice_exponent: 0.1,
            jitter: 0.02,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrpConfig {
    /// Stimulus onset asynchronies between tone and letter, in seconds.
    pub soas: Vec<f64>,
    pub trials_per_soa: usize,
    pub inter_trial_interval: f64,
    pub iterations: usize,
}

impl Default for PrpConfig {
    fn default() -> Self {
        Self {
            soas: vec![0.05, 0.15, 0.25, 0.5, 1.0],
            trials_per_soa: 10,
            inter_trial_interval: 3.0,
            iterations: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubitizingConfig {
    pub max_items: usize,
    pub trials_per_numerosity: usize,
    pub inter_trial_interval: f64,
    /// Trials without an answer by then are closed unanswered.
    pub response_timeout: f64,
    pub min_accuracy: f64,
    pub iterations: usize,
}

impl Default for SubitizingConfig {
    fn default() -> Self {
        Self {
            max_items: 8,
            trials_per_numerosity: 5,
            inter_trial_interval: 1.5,
            response_timeout: 6.0,
            min_accuracy: 0.9,
            iterations: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PracticeConfig {
    pub sessions: usize,
    pub blocks_per_session: usize,
    pub trials_per_block: usize,
    /// A new trial starts every `trial_period` seconds within a block.
    pub trial_period: f64,
    pub session_break: f64,
    pub keys: Vec<char>,
    pub iterations: usize,
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            sessions: 3,
            blocks_per_session: 4,
            trials_per_block: 20,
            trial_period: 1.5,
            session_break: 600.0,
            keys: vec!['a', 's', 'd', 'f'],
            iterations: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = BatchConfig::from_json_str(
            r#"{ "seed": 42, "show_rmse": true, "prp": { "trials_per_soa": 2 } }"#,
        )
        .unwrap();
        assert_eq!(cfg.seed, Some(42));
        assert!(cfg.show_rmse);
        assert_eq!(cfg.prp.trials_per_soa, 2);
        assert_eq!(cfg.prp.soas, PrpConfig::default().soas);
        assert_eq!(cfg.model, ModelParams::default());
    }

    #[test]
    fn empty_object_is_default() {
        assert_eq!(BatchConfig::from_json_str("{}").unwrap(), BatchConfig::default());
    }

    #[test]
    fn bad_json_is_a_parse_error() {
        let err = BatchConfig::from_json_str("{ seed: }").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = BatchConfig::load(Path::new("/nonexistent/cogfit.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
