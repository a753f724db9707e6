use crate::config::ModelParams;
use cogfit_core::{AuralKind, Percept, Response, Stage, VisualKind};
use cogfit_timing::SimTime;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

/// A response the simulated participant will give `delay` seconds after the
/// percept that triggered it.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub delay: SimTime,
    pub response: Response,
}

/// The simulated participant a task runs against.
pub trait Model {
    /// Forget everything learned in a previous run.
    fn reset(&mut self);

    /// Told about one stage change at `now`; may answer with a response.
    fn perceive(&mut self, now: SimTime, percept: &Percept, stage: &Stage) -> Option<Reply>;
}

/// Perceive, select, act, with a single-channel selection stage.
///
/// Encoding runs in parallel per modality, but response selection handles
/// one stimulus at a time: a second stimulus arriving while the first is
/// being selected waits. That wait is what produces dual-task interference.
#[derive(Debug, Clone)]
pub struct BottleneckModel {
    pub params: ModelParams,
    rng: StdRng,
    seed: u64,
    central_free_at: SimTime,
    responses: u64,
}

impl BottleneckModel {
    pub fn new(params: ModelParams, seed: u64) -> Self {
        Self {
            params,
            rng: StdRng::seed_from_u64(seed),
            seed,
            central_free_at: 0.0,
            responses: 0,
        }
    }

    pub fn responses(&self) -> u64 {
        self.responses
    }

    fn practice_factor(&self) -> f64 {
        (1.0 + self.responses as f64).powf(-self.params.practice_exponent)
    }

    fn noise(&mut self) -> f64 {
        let j = self.params.jitter;
        if j > 0.0 {
            self.rng.random_range(-j..=j)
        } else {
            0.0
        }
    }

    fn enumeration_cost(&self, n: usize) -> f64 {
        let limit = self.params.subitize_limit;
        let subitized = n.min(limit) as f64;
        let counted = n.saturating_sub(limit) as f64;
        subitized * self.params.subitize_item + counted * self.params.count_item
    }

    fn enumerate(&mut self, n: usize) -> usize {
        let beyond = n.saturating_sub(self.params.subitize_limit) as f64;
        let p_err = (beyond * self.params.count_error).clamp(0.0, 1.0);
        if p_err > 0.0 && self.rng.random_bool(p_err) {
            if self.rng.random_bool(0.5) { n + 1 } else { n.saturating_sub(1) }
        } else {
            n
        }
    }

    /// Runs selection for a stimulus encoded at `encoded` and returns the
    /// response time, in absolute simulated time.
    fn select(&mut self, encoded: SimTime, extra: f64, motor: f64) -> SimTime {
        let start = encoded.max(self.central_free_at);
        let end = start + (self.params.central + extra) * self.practice_factor();
        self.central_free_at = end;
        self.responses += 1;
        end + motor + self.noise()
    }

    fn reply(now: SimTime, at: SimTime, response: Response) -> Reply {
        Reply {
            delay: (at - now).max(0.0),
            response,
        }
    }
}

impl Model for BottleneckModel {
    fn reset(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
        self.central_free_at = 0.0;
        self.responses = 0;
    }

    fn perceive(&mut self, now: SimTime, percept: &Percept, stage: &Stage) -> Option<Reply> {
        match percept {
            Percept::Visual(item) if item.kind == VisualKind::Target => {
                let key = item.value.chars().next()?;
                let encoded = now + self.params.visual_encoding;
                let at = self.select(encoded, 0.0, self.params.key_motor);
                trace!(now, at, %key, "target");
                Some(Self::reply(now, at, Response::Key(key)))
            }
            Percept::Visual(item) if item.kind == VisualKind::Prompt => {
                let n = stage.count(VisualKind::Dot);
                let encoded = now + self.params.visual_encoding;
                let cost = self.enumeration_cost(n);
                let answer = self.enumerate(n);
                let at = self.select(encoded, cost, self.params.speech_motor);
                trace!(now, at, n, answer, "prompt");
                Some(Self::reply(now, at, Response::Speech(answer.to_string())))
            }
            Percept::Aural { delay, item } if item.kind == AuralKind::Tone => {
                let encoded = now + delay + self.params.aural_encoding;
                let at = self.select(encoded, 0.0, self.params.speech_motor);
                trace!(now, at, tone = %item.content, "tone");
                Some(Self::reply(now, at, Response::Speech(item.content.clone())))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cogfit_core::{AuralItem, Environment, VisualItem};

    fn quiet() -> ModelParams {
        ModelParams {
            jitter: 0.0,
            practice_exponent: 0.0,
            count_error: 0.0,
            ..ModelParams::default()
        }
    }

    #[test]
    fn target_presses_its_key() {
        let mut model = BottleneckModel::new(quiet(), 1);
        let stage = Stage::new();
        let target = Percept::Visual(VisualItem::new("model-t", VisualKind::Target, "j"));
        let reply = model.perceive(1.0, &target, &stage).expect("reply");
        assert_eq!(reply.response, Response::Key('j'));
        let p = quiet();
        let expected = p.visual_encoding + p.central + p.key_motor;
        assert!((reply.delay - expected).abs() < 1e-9);
    }

    #[test]
    fn second_stimulus_waits_for_selection() {
        let mut model = BottleneckModel::new(quiet(), 1);
        let stage = Stage::new();
        let tone = Percept::Aural {
            delay: 0.0,
            item: AuralItem::new("model-tone", AuralKind::Tone, "high"),
        };
        let target = Percept::Visual(VisualItem::new("model-t2", VisualKind::Target, "k"));
        let first = model.perceive(0.0, &tone, &stage).expect("tone reply");
        let short = model.perceive(0.05, &target, &stage).expect("t2 reply");

        let mut fresh = BottleneckModel::new(quiet(), 1);
        let alone = fresh.perceive(0.05, &target, &stage).expect("alone");

        assert_eq!(first.response, Response::Speech("high".into()));
        assert!(short.delay > alone.delay + 0.05);
    }

    #[test]
    fn prompt_counts_dots_with_growing_cost() {
        let mut model = BottleneckModel::new(quiet(), 1);
        let prompt = Percept::Visual(VisualItem::new("model-prompt", VisualKind::Prompt, "?"));
        let mut delays = Vec::new();
        for n in [2usize, 6] {
            let mut stage = Stage::new();
            for i in 0..n {
                stage.present_visual(VisualItem::new(&format!("model-dot{i}"), VisualKind::Dot, ""));
            }
            model.reset();
            let reply = model.perceive(0.0, &prompt, &stage).expect("count");
            assert_eq!(reply.response, Response::Speech(n.to_string()));
            delays.push(reply.delay);
        }
        assert!(delays[1] - delays[0] > 0.5);
    }

    #[test]
    fn practice_speeds_selection() {
        let params = ModelParams {
            practice_exponent: 0.5,
            ..quiet()
        };
        let mut model = BottleneckModel::new(params, 1);
        let stage = Stage::new();
        let target = Percept::Visual(VisualItem::new("model-p", VisualKind::Target, "a"));
        let first = model.perceive(0.0, &target, &stage).expect("first").delay;
        let mut last = first;
        for i in 1..50 {
            last = model.perceive(i as f64 * 10.0, &target, &stage).expect("later").delay;
        }
        assert!(last < first);
    }

    #[test]
    fn other_percepts_are_ignored() {
        let mut model = BottleneckModel::new(quiet(), 1);
        let stage = Stage::new();
        assert!(model.perceive(0.0, &Percept::Cleared, &stage).is_none());
        let fix = Percept::Visual(VisualItem::new("model-fix", VisualKind::Fixation, "+"));
        assert!(model.perceive(0.0, &fix, &stage).is_none());
    }

    #[test]
    fn reset_replays_the_same_noise() {
        let mut model = BottleneckModel::new(ModelParams::default(), 9);
        let stage = Stage::new();
        let target = Percept::Visual(VisualItem::new("model-r", VisualKind::Target, "f"));
        let a = model.perceive(0.0, &target, &stage).expect("a");
        model.reset();
        let b = model.perceive(0.0, &target, &stage).expect("b");
        assert_eq!(a, b);
    }
}
