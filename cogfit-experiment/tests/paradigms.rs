use cogfit_core::Stage;
use cogfit_experiment::{
    BatchConfig, BottleneckModel, ModelParams, PracticeConfig, PracticeTask, PrpConfig, PrpTask,
    SubitizingConfig, SubitizingTask, Task, TaskError, TaskKind, TrialScheduler,
};
use cogfit_stats::{Measure, StatsError, TaskResult};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn small_config() -> BatchConfig {
    BatchConfig {
        seed: Some(42),
        iterations: Some(2),
        prp: PrpConfig {
            trials_per_soa: 4,
            ..PrpConfig::default()
        },
        subitizing: SubitizingConfig {
            trials_per_numerosity: 3,
            ..SubitizingConfig::default()
        },
        practice: PracticeConfig {
            trials_per_block: 5,
            ..PracticeConfig::default()
        },
        ..BatchConfig::default()
    }
}

fn names(result: &TaskResult) -> Vec<&str> {
    result.measures().iter().map(Measure::name).collect()
}

fn correlation(result: &TaskResult, name: &str) -> f64 {
    result
        .measures()
        .iter()
        .find_map(|m| match m {
            Measure::Fit {
                name: n,
                correlation,
                ..
            } if n == name => Some(*correlation),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no fit named {name}"))
}

#[test]
fn prp_second_task_slows_at_short_soa() {
    let result = TaskKind::Prp.evaluate(&small_config(), None).unwrap();
    assert_eq!(names(&result), vec!["PRP RT1", "PRP RT2"]);
    assert!(correlation(&result, "PRP RT2") > 0.8);
}

#[test]
fn subitizing_latency_rises_with_numerosity() {
    let mut stage = Stage::new();
    let result = TaskKind::Subitizing
        .evaluate(&small_config(), Some(&mut stage))
        .unwrap();
    assert_eq!(names(&result), vec!["Subitizing RT", "Subitizing accuracy"]);
    assert!(correlation(&result, "Subitizing RT") > 0.8);
    assert_eq!(stage.transcript().first().map(String::as_str), Some("Items    RT       N"));
    assert!(stage.transcript().last().is_some_and(|l| l.starts_with("accuracy")));
}

#[test]
fn practice_speeds_up_across_sessions() {
    let result = TaskKind::Practice.evaluate(&small_config(), None).unwrap();
    assert_eq!(names(&result), vec!["Practice RT", "Practice speed-up"]);
    assert!(result.passed());
    match &result.measures()[0] {
        Measure::Fit { sample_count, .. } => assert_eq!(*sample_count, 12),
        other => panic!("expected a fit, got {other:?}"),
    }
}

#[test]
fn practice_grid_of_wrong_shape_is_an_error() {
    let mut config = small_config();
    config.practice.sessions = 2;
    let err = TaskKind::Practice.evaluate(&config, None).unwrap_err();
    assert!(matches!(
        err,
        TaskError::Stats(StatsError::ShapeMismatch {
            left: (2, 4),
            right: (3, 4)
        })
    ));
}

#[test]
fn same_seed_same_result() {
    let config = small_config();
    for kind in TaskKind::ALL {
        let a = kind.evaluate(&config, None).unwrap();
        let b = kind.evaluate(&config, None).unwrap();
        assert_eq!(a, b, "{kind} is not reproducible");
    }
}

#[test]
fn empty_run_set_reports_zero_fits() {
    let prp = PrpTask::<StdRng>::analyze(&[], None).unwrap();
    let subitizing = SubitizingTask::<StdRng>::analyze(&[], None).unwrap();
    let practice = PracticeTask::<StdRng>::analyze(&[], None).unwrap();

    for result in [&prp, &subitizing, &practice] {
        for measure in result.measures() {
            match measure {
                Measure::Fit {
                    correlation,
                    normalized_error,
                    rmse,
                    sample_count,
                    ..
                } => {
                    assert_eq!(
                        (*correlation, *normalized_error, *rmse, *sample_count),
                        (0.0, 0.0, 0.0, 0)
                    );
                }
                Measure::Boolean { passed, .. } => assert!(!passed),
            }
        }
    }
    assert_eq!(prp.len(), 2);
    assert_eq!(subitizing.len(), 2);
    assert_eq!(practice.len(), 2);
}

#[test]
fn one_prp_run_completes_every_trial() {
    let config = PrpConfig {
        trials_per_soa: 2,
        ..PrpConfig::default()
    };
    let task = PrpTask::new(config, StdRng::seed_from_u64(5));
    let model = BottleneckModel::new(Default::default(), 6);
    let mut scheduler = TrialScheduler::new(task, model);
    let summary = scheduler.run().unwrap();
    assert_eq!(summary.misuse, 0);
    assert!(!summary.timed_out);

    let task = scheduler.into_task();
    assert_eq!(task.trials().len(), 10);
    for trial in task.trials() {
        assert!(trial.rt1.is_some() && trial.rt2.is_some());
        assert!(trial.correct1 && trial.correct2);
    }
}

#[test]
fn subitizing_timeout_closes_unanswered_trials() {
    let config = SubitizingConfig {
        max_items: 3,
        trials_per_numerosity: 1,
        response_timeout: 0.1,
        ..SubitizingConfig::default()
    };
    let task = SubitizingTask::new(config, StdRng::seed_from_u64(1));
    let model = BottleneckModel::new(Default::default(), 2);
    let mut scheduler = TrialScheduler::new(task, model);
    let summary = scheduler.run().unwrap();

    // Every trial times out before its answer is due, and the run ends with
    // the answers still queued.
    assert_eq!(summary.responses, 0);
    let task = scheduler.into_task();
    assert_eq!(task.trials().len(), 3);
    assert!(task.trials().iter().all(|t| t.response_time.is_none()));
}

fn steady_params() -> ModelParams {
    ModelParams {
        count_error: 0.0,
        practice_exponent: 0.0,
        jitter: 0.0,
        ..ModelParams::default()
    }
}

#[test]
fn late_count_is_not_credited_to_the_next_display() {
    // Subitized displays are answered within the timeout, counted ones from
    // six dots up are not, and their answers arrive after the next display.
    let config = SubitizingConfig {
        trials_per_numerosity: 2,
        response_timeout: 1.2,
        ..SubitizingConfig::default()
    };
    let params = steady_params();
    let task = SubitizingTask::new(config, StdRng::seed_from_u64(3));
    let mut scheduler = TrialScheduler::new(task, BottleneckModel::new(params.clone(), 4));
    let summary = scheduler.run().unwrap();
    assert!(summary.misuse > 0);

    let latency = |n: usize| {
        let cost = n.min(4) as f64 * params.subitize_item
            + n.saturating_sub(4) as f64 * params.count_item;
        params.visual_encoding + params.central + cost + params.speech_motor
    };
    let task = scheduler.into_task();
    assert_eq!(task.trials().len(), 16);
    let answered: Vec<_> = task
        .trials()
        .iter()
        .filter(|t| t.response_time.is_some())
        .collect();
    assert!(!answered.is_empty());
    for trial in answered {
        let n = trial.condition + 1;
        let rt = trial.response_time.unwrap();
        assert_eq!(trial.correct, Some(true), "{n} dots");
        assert!(rt >= latency(n) - 1e-9, "{n} dots answered in {rt}");
        assert!(rt < 1.2, "{n} dots answered after the timeout");
    }
}

#[test]
fn answers_slower_than_the_trial_period_are_all_rejected() {
    let config = PracticeConfig {
        sessions: 1,
        blocks_per_session: 1,
        trials_per_block: 4,
        trial_period: 0.3,
        ..PracticeConfig::default()
    };
    let task = PracticeTask::new(config, StdRng::seed_from_u64(8));
    let mut scheduler = TrialScheduler::new(task, BottleneckModel::new(steady_params(), 9));
    let summary = scheduler.run().unwrap();
    assert!(summary.responses > 0);
    assert_eq!(summary.misuse, summary.responses);

    let task = scheduler.into_task();
    let blocks = &task.sessions()[0].blocks;
    assert_eq!(blocks[0].trials, 4);
    assert_eq!(blocks[0].responded, 0);
}
