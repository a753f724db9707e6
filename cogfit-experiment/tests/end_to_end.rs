use cogfit_core::{Environment, Percept, Response, Stage, TrialResult, VisualItem, VisualKind};
use cogfit_experiment::{
    Batch, BatchOptions, ConditionCycle, ConditionMeans, Context, Model, Reply, Task, TaskError,
    TrialLog, TrialScheduler,
};
use cogfit_stats::{Measure, RenderOptions, TaskResult};

const HUMAN: [f64; 3] = [0.45, 0.55, 0.65];

/// Three conditions shown once each, one trial every two seconds.
struct ThreeConditions {
    order: ConditionCycle<usize>,
    trials: TrialLog<TrialResult>,
}

impl ThreeConditions {
    fn new() -> Self {
        Self {
            order: ConditionCycle::new(vec![0, 1, 2]).with_limit(3),
            trials: TrialLog::new(),
        }
    }
}

impl Task for ThreeConditions {
    fn name(&self) -> &str {
        "Three conditions"
    }

    fn start(&mut self, ctx: &mut Context<'_>) {
        self.trials.clear();
        self.order.reset();
        ctx.schedule_update(0.5);
    }

    fn update(&mut self, ctx: &mut Context<'_>) {
        self.trials.close_trial();
        ctx.clear_visuals();
        let Some(condition) = self.order.next() else {
            ctx.stop();
            return;
        };
        let id = self.trials.len();
        self.trials.begin(TrialResult::new(id, condition, ctx.now()), ctx.now());
        ctx.present_visual(VisualItem::new("e2e-target", VisualKind::Target, "g"));
        ctx.schedule_update(2.0);
    }

    fn on_key(&mut self, key: char, onset: f64, ctx: &mut Context<'_>) -> Result<(), TaskError> {
        let trial = self.trials.respond("on_key", onset)?;
        trial.record(ctx.now(), key == 'g');
        Ok(())
    }

    fn analysis_iterations(&self) -> usize {
        2
    }

    fn analyze(runs: &[Self], out: Option<&mut dyn Environment>) -> Result<TaskResult, TaskError> {
        let mut means = ConditionMeans::new(3);
        for run in runs {
            for trial in run.trials.completed() {
                if let (Some(rt), Some(true)) = (trial.response_time, trial.correct) {
                    means.add(trial.condition, rt);
                }
            }
        }
        if let Some(out) = out {
            out.emit_line(&format!("{:?}", means.means()));
        }
        let mut result = TaskResult::new();
        result.add_fit("Three RT", &means.series(), &HUMAN);
        result.add_boolean("Three answered", means.observations() == 3 * runs.len());
        Ok(result)
    }
}

/// Answers each target with a latency taken from a fixed script.
struct Scripted {
    latencies: Vec<f64>,
    next: usize,
}

impl Scripted {
    fn new(latencies: Vec<f64>) -> Self {
        Self { latencies, next: 0 }
    }
}

impl Model for Scripted {
    fn reset(&mut self) {
        self.next = 0;
    }

    fn perceive(&mut self, _now: f64, percept: &Percept, _stage: &Stage) -> Option<Reply> {
        let Percept::Visual(item) = percept else {
            return None;
        };
        if item.kind != VisualKind::Target {
            return None;
        }
        let delay = *self.latencies.get(self.next)?;
        self.next += 1;
        Some(Reply {
            delay,
            response: Response::Key('g'),
        })
    }
}

fn fit_of(result: &TaskResult) -> (f64, f64, usize) {
    match &result.measures()[0] {
        Measure::Fit {
            correlation,
            normalized_error,
            sample_count,
            ..
        } => (*correlation, *normalized_error, *sample_count),
        other => panic!("expected a fit, got {other:?}"),
    }
}

fn run_with(latencies: Vec<f64>) -> ThreeConditions {
    let mut scheduler = TrialScheduler::new(ThreeConditions::new(), Scripted::new(latencies));
    let summary = scheduler.run().unwrap();
    assert_eq!(summary.responses, 3);
    assert_eq!(summary.misuse, 0);
    scheduler.into_task()
}

#[test]
fn two_runs_average_onto_reference() {
    let runs = vec![run_with(vec![0.4, 0.5, 0.6]), run_with(vec![0.5, 0.6, 0.7])];

    let mut stage = Stage::new();
    let result = ThreeConditions::analyze(&runs, Some(&mut stage)).unwrap();
    assert_eq!(stage.transcript().len(), 1);

    let (r, err, n) = fit_of(&result);
    assert!((r - 1.0).abs() < 1e-9, "correlation {r}");
    assert!(err < 1e-9, "normalized error {err}");
    assert_eq!(n, 3);
    assert!(result.passed());

    let line = result.measures()[0].render(RenderOptions::default());
    assert_eq!(line, "Three RT            >.99    0.00    3");
}

#[test]
fn batch_runs_each_script_once() {
    let mut scripts = vec![vec![0.4, 0.5, 0.6], vec![0.5, 0.6, 0.7]].into_iter();
    let options = BatchOptions {
        seed: Some(11),
        ..BatchOptions::default()
    };
    let batch = Batch::run(
        |_| ThreeConditions::new(),
        |_| Scripted::new(scripts.next().unwrap_or_default()),
        &options,
    );
    assert_eq!(batch.runs.len(), 2);
    assert_eq!(batch.skipped, 0);
    assert_eq!(batch.seed, 11);

    let (r, err, _) = fit_of(&batch.analyze(None).unwrap());
    assert!((r - 1.0).abs() < 1e-9);
    assert!(err < 1e-9);
}

#[test]
fn silent_participant_yields_zero_statistics() {
    let runs = vec![run_silent(), run_silent()];
    let result = ThreeConditions::analyze(&runs, None).unwrap();
    assert_eq!(fit_of(&result), (0.0, 0.0, 0));
    assert!(!result.passed());
    assert_eq!(
        result.render(RenderOptions { show_rmse: true }),
        "Three RT            0.00    0.00    0   (RMSE = 0.000)\nThree answered      XXXX"
    );
}

fn run_silent() -> ThreeConditions {
    let mut scheduler = TrialScheduler::new(ThreeConditions::new(), Scripted::new(Vec::new()));
    let summary = scheduler.run().unwrap();
    assert_eq!(summary.responses, 0);
    scheduler.into_task()
}

#[test]
fn no_runs_still_report_every_measure() {
    let result = ThreeConditions::analyze(&[], None).unwrap();
    assert_eq!(result.len(), 2);
    assert_eq!(fit_of(&result), (0.0, 0.0, 0));
}
