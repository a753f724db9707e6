use serde::{Deserialize, Serialize};

/// A response produced by the simulated participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Response {
    Key(char),
    Speech(String),
}

/// Recorded outcome of one trial, keyed by its condition index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    pub trial_id: usize,
    pub condition: usize,
    /// Simulated time the trial opened.
    pub start: f64,
    pub response_time: Option<f64>,
    pub correct: Option<bool>,
}

impl TrialResult {
    pub fn new(trial_id: usize, condition: usize, start: f64) -> Self {
        Self {
            trial_id,
            condition,
            start,
            response_time: None,
            correct: None,
        }
    }

    pub fn responded(&self) -> bool {
        self.response_time.is_some()
    }

    /// Stores the latency relative to `start` and returns it.
    pub fn record(&mut self, now: f64, correct: bool) -> f64 {
        let rt = now - self.start;
        self.response_time = Some(rt);
        self.correct = Some(correct);
        rt
    }
}
