//! Enumeration of briefly shown dot displays.
//!
//! Naming how many dots are shown is fast and flat up to about four items and
//! slow and steep beyond.

use crate::conditions::ConditionCycle;
use crate::config::SubitizingConfig;
use crate::error::TaskError;
use crate::reduce::ConditionMeans;
use crate::task::{Context, Task};
use crate::trial::TrialLog;
use cogfit_core::{Environment, TrialResult, VisualItem, VisualKind};
use cogfit_stats::{stats, TaskResult};
use cogfit_timing::{CallbackId, SimTime};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

/// Mean naming latency (s) for 1..=8 items.
pub const HUMAN_RT: [f64; 8] = [0.60, 0.65, 0.70, 0.86, 1.12, 1.50, 1.79, 2.13];

const GRID_COLUMNS: usize = 5;
const GRID_ROWS: usize = 4;
const CELL: f64 = 60.0;

pub struct SubitizingTask<R: Rng> {
    pub config: SubitizingConfig,
    rng: R,
    order: ConditionCycle<usize>,
    trials: TrialLog<TrialResult>,
    timeout: Option<CallbackId>,
}

impl<R: Rng> SubitizingTask<R> {
    pub fn new(config: SubitizingConfig, mut rng: R) -> Self {
        let max_items = config.max_items.min(GRID_COLUMNS * GRID_ROWS);
        let numerosities: Vec<usize> = (1..=max_items).collect();
        let order = ConditionCycle::balanced(&numerosities, config.trials_per_numerosity, &mut rng);
        Self {
            config,
            rng,
            order,
            trials: TrialLog::new(),
            timeout: None,
        }
    }

    pub fn trials(&self) -> &[TrialResult] {
        self.trials.completed()
    }

    fn show_dots(&mut self, n: usize, ctx: &mut Context<'_>) {
        let mut cells: Vec<usize> = (0..GRID_COLUMNS * GRID_ROWS).collect();
        cells.shuffle(&mut self.rng);
        for (i, cell) in cells.into_iter().take(n).enumerate() {
            let x = 100.0 + (cell % GRID_COLUMNS) as f64 * CELL;
            let y = 100.0 + (cell / GRID_COLUMNS) as f64 * CELL;
            ctx.present_visual(VisualItem::new(&format!("dot{i}"), VisualKind::Dot, "").at(x, y));
        }
    }
}

impl<R: Rng> Task for SubitizingTask<R> {
    fn name(&self) -> &str {
        "Subitizing"
    }

    fn start(&mut self, ctx: &mut Context<'_>) {
        self.trials.clear();
        self.order.reset();
        self.timeout = None;
        ctx.schedule_update(1.0);
    }

    /// Opens the next trial, or closes an unanswered one on timeout.
    fn update(&mut self, ctx: &mut Context<'_>) {
        self.timeout = None;
        if self.trials.close_trial() {
            debug!(at = ctx.now(), "trial timed out");
        }
        ctx.clear_visuals();

        let Some(n) = self.order.next() else {
            ctx.stop();
            return;
        };
        self.show_dots(n, ctx);
        ctx.present_visual(VisualItem::new("prompt", VisualKind::Prompt, "how many?").at(100.0, 20.0));
        self.trials
            .begin(TrialResult::new(self.order.drawn() - 1, n - 1, ctx.now()), ctx.now());
        self.timeout = Some(ctx.schedule_update(self.config.response_timeout));
    }

    /// An answer to a display that already timed out is rejected, so it
    /// cannot be credited to the trial shown since.
    fn on_speech(
        &mut self,
        text: &str,
        onset: SimTime,
        ctx: &mut Context<'_>,
    ) -> Result<(), TaskError> {
        let trial = self.trials.respond("on_speech", onset)?;
        let expected = trial.condition + 1;
        let said = text.trim().parse::<usize>().ok();
        let rt = trial.record(ctx.now(), said == Some(expected));
        debug!(n = expected, ?said, rt, "counted");

        self.trials.close_trial();
        ctx.clear_visuals();
        if let Some(id) = self.timeout.take() {
            ctx.cancel(id);
        }
        ctx.schedule_update(self.config.inter_trial_interval);
        Ok(())
    }

    fn finish(&mut self, _ctx: &mut Context<'_>) {
        self.trials.close_trial();
    }

    fn analysis_iterations(&self) -> usize {
        self.config.iterations
    }

    fn analyze(runs: &[Self], out: Option<&mut dyn Environment>) -> Result<TaskResult, TaskError> {
        let config = runs
            .first()
            .map(|r| r.config.clone())
            .unwrap_or_default();
        let n = config.max_items.min(GRID_COLUMNS * GRID_ROWS);
        let mut rts = ConditionMeans::new(n);
        let mut accuracy = Vec::new();
        for run in runs {
            for trial in run.trials() {
                let correct = trial.correct == Some(true);
                accuracy.push(if correct { 1.0 } else { 0.0 });
                if let (Some(rt), true) = (trial.response_time, correct) {
                    rts.add(trial.condition, rt);
                }
            }
        }
        let proportion_correct = stats::mean(&accuracy);

        if let Some(out) = out {
            out.emit_line("Items    RT       N");
            for (i, m) in rts.means().iter().enumerate() {
                out.emit_line(&format!("{:<8} {:.3}    {}", i + 1, m, rts.count(i)));
            }
            out.emit_line(&format!("accuracy {proportion_correct:.3}"));
        }

        let mut result = TaskResult::new();
        result.add_fit("Subitizing RT", &rts.series(), &HUMAN_RT);
        result.add_boolean(
            "Subitizing accuracy",
            !runs.is_empty() && proportion_correct >= config.min_accuracy,
        );
        Ok(result)
    }
}
