//! Four-choice reaction time over several sessions of practice.
//!
//! Trials within a block are paced by a periodic ticker; sessions are
//! separated by a break during which the ticker is cancelled. Latency falls
//! with practice, fast at first and then more slowly.

use crate::config::PracticeConfig;
use crate::error::TaskError;
use crate::reduce::GridMeans;
use crate::task::{Context, Task};
use crate::trial::{TrialSlot, check_onset};
use cogfit_core::{Environment, TrialResult, VisualItem, VisualKind};
use cogfit_stats::{stats, TaskResult};
use cogfit_timing::{CallbackId, SimTime};
use rand::Rng;
use tracing::debug;

/// Mean latency (s) per session (rows) and block (columns).
pub const HUMAN_RT: [[f64; 4]; 3] = [
    [0.712, 0.664, 0.633, 0.611],
    [0.603, 0.584, 0.571, 0.562],
    [0.552, 0.545, 0.538, 0.533],
];

const NEXT_SESSION: u32 = 1;
const FIT_NAME: &str = "Practice RT";

/// Per-trial counters of one block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    pub trials: usize,
    pub responded: usize,
    pub correct: usize,
    pub rt_sum: f64,
}

impl Block {
    fn absorb(&mut self, trial: &TrialResult) {
        self.trials += 1;
        if let Some(rt) = trial.response_time {
            self.responded += 1;
            self.rt_sum += rt;
        }
        if trial.correct == Some(true) {
            self.correct += 1;
        }
    }

    /// 0 when nothing was answered.
    pub fn mean_rt(&self) -> f64 {
        if self.responded == 0 {
            0.0
        } else {
            self.rt_sum / self.responded as f64
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub blocks: Vec<Block>,
}

pub struct PracticeTask<R: Rng> {
    pub config: PracticeConfig,
    rng: R,
    sessions: Vec<Session>,
    session: Session,
    block: Block,
    trial: TrialSlot<TrialResult>,
    ticker: Option<CallbackId>,
    trial_count: usize,
}

impl<R: Rng> PracticeTask<R> {
    pub fn new(mut config: PracticeConfig, rng: R) -> Self {
        config.sessions = config.sessions.max(1);
        config.blocks_per_session = config.blocks_per_session.max(1);
        config.trials_per_block = config.trials_per_block.max(1);
        if config.keys.is_empty() {
            config.keys = PracticeConfig::default().keys;
        }
        Self {
            config,
            rng,
            sessions: Vec::new(),
            session: Session::default(),
            block: Block::default(),
            trial: TrialSlot::Closed,
            ticker: None,
            trial_count: 0,
        }
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Archives the current block and, when full, the current session.
    /// Returns true when a session was completed.
    fn roll_over(&mut self) -> bool {
        if self.block.trials < self.config.trials_per_block {
            return false;
        }
        self.session.blocks.push(std::mem::take(&mut self.block));
        if self.session.blocks.len() < self.config.blocks_per_session {
            return false;
        }
        self.sessions.push(std::mem::take(&mut self.session));
        true
    }
}

impl<R: Rng> Task for PracticeTask<R> {
    fn name(&self) -> &str {
        "Practice"
    }

    fn start(&mut self, ctx: &mut Context<'_>) {
        self.sessions.clear();
        self.session = Session::default();
        self.block = Block::default();
        self.trial = TrialSlot::Closed;
        self.trial_count = 0;
        self.ticker = Some(ctx.schedule_repeating(self.config.trial_period));
    }

    fn update(&mut self, ctx: &mut Context<'_>) {
        if let Some(done) = self.trial.close() {
            self.block.absorb(&done);
        }
        ctx.clear_visuals();

        if self.roll_over() {
            if let Some(id) = self.ticker.take() {
                ctx.cancel(id);
            }
            debug!(session = self.sessions.len(), at = ctx.now(), "session complete");
            if self.sessions.len() >= self.config.sessions {
                ctx.stop();
            } else {
                ctx.schedule_once(self.config.session_break, NEXT_SESSION);
            }
            return;
        }

        let choice = self.rng.random_range(0..self.config.keys.len());
        let key = self.config.keys[choice];
        self.trial
            .open(TrialResult::new(self.trial_count, choice, ctx.now()));
        self.trial_count += 1;
        ctx.present_visual(VisualItem::new("choice", VisualKind::Target, key).at(300.0, 300.0));
    }

    fn on_callback(&mut self, tag: u32, ctx: &mut Context<'_>) {
        if tag == NEXT_SESSION {
            self.ticker = Some(ctx.schedule_repeating(self.config.trial_period));
        }
    }

    fn on_key(&mut self, key: char, onset: SimTime, ctx: &mut Context<'_>) -> Result<(), TaskError> {
        let trial = self
            .trial
            .current_mut()
            .ok_or(TaskError::NoOpenTrial { hook: "on_key" })?;
        check_onset("on_key", onset, trial.start)?;
        if !trial.responded() {
            let expected = self.config.keys[trial.condition];
            trial.record(ctx.now(), key == expected);
        }
        Ok(())
    }

    fn analysis_iterations(&self) -> usize {
        self.config.iterations
    }

    fn analyze(runs: &[Self], out: Option<&mut dyn Environment>) -> Result<TaskResult, TaskError> {
        let config = runs
            .first()
            .map(|r| r.config.clone())
            .unwrap_or_default();
        let mut grid = GridMeans::new(config.sessions, config.blocks_per_session);
        for run in runs {
            for (s, session) in run.sessions().iter().enumerate() {
                for (b, block) in session.blocks.iter().enumerate() {
                    if block.responded > 0 {
                        grid.add(s, b, block.mean_rt());
                    }
                }
            }
        }
        let means = grid.means();

        if let Some(out) = out {
            for (s, row) in means.iter().enumerate() {
                let cells: Vec<String> = row.iter().map(|m| format!("{m:.3}")).collect();
                out.emit_line(&format!("session {}  {}", s + 1, cells.join("  ")));
            }
        }

        let mut result = TaskResult::new();
        if grid.observations() == 0 {
            result.add_fit(FIT_NAME, &[], &stats::flatten(&HUMAN_RT)?);
            result.add_boolean("Practice speed-up", false);
            return Ok(result);
        }
        result.add_fit_2d(FIT_NAME, &means, &HUMAN_RT)?;
        let flat = stats::flatten(&means)?;
        let sped_up = match (flat.first(), flat.last()) {
            (Some(first), Some(last)) => first > last,
            _ => false,
        };
        result.add_boolean("Practice speed-up", sped_up);
        Ok(result)
    }
}
