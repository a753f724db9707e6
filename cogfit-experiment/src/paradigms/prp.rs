//! Psychological refractory period dual task.
//!
//! Each trial plays a high or low tone (task 1, answered by naming it) and,
//! after a stimulus onset asynchrony (SOA), shows a letter (task 2, answered
//! with its key). Task-2 latency rises as the SOA shrinks.

use crate::conditions::ConditionCycle;
use crate::config::PrpConfig;
use crate::error::TaskError;
use crate::reduce::ConditionMeans;
use crate::task::{Context, Task};
use crate::trial::TrialLog;
use cogfit_core::{AuralItem, AuralKind, Environment, VisualItem, VisualKind};
use cogfit_stats::TaskResult;
use cogfit_timing::SimTime;
use rand::Rng;
use tracing::debug;

/// Mean task-1 latency per SOA (s) for the default SOA table.
pub const HUMAN_RT1: [f64; 5] = [0.656, 0.642, 0.638, 0.631, 0.627];
/// Mean task-2 latency per SOA (s) for the default SOA table.
pub const HUMAN_RT2: [f64; 5] = [0.874, 0.781, 0.698, 0.553, 0.497];

const SHOW_LETTER: u32 = 1;
const TONES: [&str; 2] = ["high", "low"];
const LETTERS: [char; 2] = ['j', 'k'];

#[derive(Debug, Clone, PartialEq)]
pub struct PrpTrial {
    pub id: usize,
    pub soa_index: usize,
    pub start: f64,
    pub tone: &'static str,
    pub letter: char,
    pub letter_onset: Option<f64>,
    pub rt1: Option<f64>,
    pub rt2: Option<f64>,
    pub correct1: bool,
    pub correct2: bool,
}

pub struct PrpTask<R: Rng> {
    pub config: PrpConfig,
    rng: R,
    order: ConditionCycle<usize>,
    trials: TrialLog<PrpTrial>,
}

impl<R: Rng> PrpTask<R> {
    pub fn new(config: PrpConfig, mut rng: R) -> Self {
        let conditions: Vec<usize> = (0..config.soas.len()).collect();
        let order = ConditionCycle::balanced(&conditions, config.trials_per_soa, &mut rng);
        Self {
            config,
            rng,
            order,
            trials: TrialLog::new(),
        }
    }

    pub fn trials(&self) -> &[PrpTrial] {
        self.trials.completed()
    }
}

impl<R: Rng> Task for PrpTask<R> {
    fn name(&self) -> &str {
        "PRP"
    }

    fn start(&mut self, ctx: &mut Context<'_>) {
        self.trials.clear();
        self.order.reset();
        ctx.schedule_update(1.0);
    }

    fn update(&mut self, ctx: &mut Context<'_>) {
        self.trials.close_trial();
        ctx.clear_visuals();

        let Some(soa_index) = self.order.next() else {
            debug!(trials = self.trials.len(), "prp run complete");
            ctx.stop();
            return;
        };
        let soa = self.config.soas[soa_index];
        let tone = TONES[self.rng.random_range(0..TONES.len())];
        let letter = LETTERS[self.rng.random_range(0..LETTERS.len())];
        let now = ctx.now();

        let trial = PrpTrial {
            id: self.order.drawn() - 1,
            soa_index,
            start: now,
            tone,
            letter,
            letter_onset: None,
            rt1: None,
            rt2: None,
            correct1: false,
            correct2: false,
        };
        self.trials.begin(trial, now);
        ctx.present_visual(VisualItem::new("fixation", VisualKind::Fixation, "+").at(300.0, 300.0));
        ctx.present_aural(AuralItem::new("tone", AuralKind::Tone, tone));
        ctx.schedule_once(soa, SHOW_LETTER);
        ctx.schedule_update(soa + self.config.inter_trial_interval);
    }

    fn on_callback(&mut self, tag: u32, ctx: &mut Context<'_>) {
        if tag != SHOW_LETTER {
            return;
        }
        let Some(trial) = self.trials.current_mut() else {
            return;
        };
        trial.letter_onset = Some(ctx.now());
        let letter = trial.letter.to_string();
        ctx.present_visual(VisualItem::new("letter", VisualKind::Target, letter).at(300.0, 300.0));
    }

    fn on_speech(
        &mut self,
        text: &str,
        onset: SimTime,
        ctx: &mut Context<'_>,
    ) -> Result<(), TaskError> {
        let trial = self.trials.respond("on_speech", onset)?;
        if trial.rt1.is_none() {
            trial.rt1 = Some(ctx.now() - trial.start);
            trial.correct1 = text == trial.tone;
        }
        Ok(())
    }

    fn on_key(&mut self, key: char, onset: SimTime, ctx: &mut Context<'_>) -> Result<(), TaskError> {
        let trial = self.trials.respond("on_key", onset)?;
        // A key before the letter is an anticipation and is not timed.
        if let (Some(shown), None) = (trial.letter_onset, trial.rt2) {
            trial.rt2 = Some(ctx.now() - shown);
            trial.correct2 = key == trial.letter;
        }
        Ok(())
    }

    fn finish(&mut self, _ctx: &mut Context<'_>) {
        self.trials.close_trial();
    }

    fn analysis_iterations(&self) -> usize {
        self.config.iterations
    }

    fn analyze(runs: &[Self], out: Option<&mut dyn Environment>) -> Result<TaskResult, TaskError> {
        let soas = runs
            .first()
            .map(|r| r.config.soas.clone())
            .unwrap_or_else(|| PrpConfig::default().soas);
        let mut rt1 = ConditionMeans::new(soas.len());
        let mut rt2 = ConditionMeans::new(soas.len());
        for run in runs {
            for trial in run.trials() {
                if let (Some(t), true) = (trial.rt1, trial.correct1) {
                    rt1.add(trial.soa_index, t);
                }
                if let (Some(t), true) = (trial.rt2, trial.correct2) {
                    rt2.add(trial.soa_index, t);
                }
            }
        }

        if let Some(out) = out {
            out.emit_line("SOA      RT1      RT2     (+/-)");
            let (m1, m2, ci2) = (rt1.means(), rt2.means(), rt2.confidence_widths());
            for (i, soa) in soas.iter().enumerate() {
                out.emit_line(&format!(
                    "{:<8.2} {:.3}    {:.3}   {:.3}",
                    soa, m1[i], m2[i], ci2[i]
                ));
            }
        }

        let mut result = TaskResult::new();
        result.add_fit("PRP RT1", &rt1.series(), &HUMAN_RT1);
        result.add_fit("PRP RT2", &rt2.series(), &HUMAN_RT2);
        Ok(result)
    }
}
