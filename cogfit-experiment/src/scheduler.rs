use crate::error::TaskError;
use crate::model::Model;
use crate::task::{Action, Context, Task};
use cogfit_core::{RunState, Stage};
use cogfit_timing::{CallbackKind, Clock, ClockStats, EventClock, RealTimePacer, SimTime};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunLimits {
    /// Callbacks due after this simulated time are not dispatched.
    pub max_sim_time: SimTime,
}

impl Default for RunLimits {
    fn default() -> Self {
        Self {
            max_sim_time: 7_200.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub end_time: SimTime,
    pub callbacks: u64,
    pub responses: u64,
    /// Responses that arrived with no open trial, or that answered a
    /// stimulus from an earlier trial.
    pub misuse: u64,
    pub timed_out: bool,
}

/// Drives one run of a task: owns the clock, the stage and the simulated
/// participant, and dispatches due callbacks into the task one at a time.
pub struct TrialScheduler<T: Task, M: Model> {
    task: T,
    model: M,
    clock: EventClock<Action>,
    stage: Stage,
    state: RunState,
    limits: RunLimits,
    pacer: Option<RealTimePacer>,
    summary: RunSummary,
}

impl<T: Task, M: Model> TrialScheduler<T, M> {
    pub fn new(task: T, model: M) -> Self {
        Self {
            task,
            model,
            clock: EventClock::new(),
            stage: Stage::new(),
            state: RunState::Idle,
            limits: RunLimits::default(),
            pacer: None,
            summary: RunSummary::default(),
        }
    }

    pub fn with_limits(mut self, limits: RunLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = stage;
        self
    }

    /// Paces dispatch against wall time instead of running flat out.
    pub fn with_pacer(mut self, pacer: RealTimePacer) -> Self {
        self.pacer = Some(pacer);
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    pub fn task(&self) -> &T {
        &self.task
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn clock_stats(&self) -> ClockStats {
        self.clock.stats()
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    pub fn into_task(self) -> T {
        self.task
    }

    /// Idle -> Started. Resets the participant and lets the task arm its
    /// first callback.
    pub fn start(&mut self) -> Result<(), TaskError> {
        if !self.state.is_idle() {
            return Err(TaskError::AlreadyStarted);
        }
        self.state = RunState::Started;
        self.stage.reset();
        self.model.reset();
        debug!(task = self.task.name(), "run started");
        {
            let mut ctx = Context::new(&mut self.clock, &mut self.stage);
            self.task.start(&mut ctx);
        }
        self.deliver_percepts();
        self.sync_stopped();
        Ok(())
    }

    /// Dispatches the next due callback. Returns false once the run is over.
    pub fn step(&mut self) -> bool {
        if !self.state.accepts_callbacks() {
            return false;
        }
        let Some(callback) = self.clock.pop_due() else {
            self.mark_stopped();
            return false;
        };
        if callback.fire_time > self.limits.max_sim_time {
            warn!(
                task = self.task.name(),
                at = callback.fire_time,
                limit = self.limits.max_sim_time,
                "run exceeded its time limit, stopping"
            );
            self.summary.timed_out = true;
            self.mark_stopped();
            return false;
        }
        if let Some(pacer) = &self.pacer {
            pacer.wait_until(callback.fire_time);
        }

        self.state = RunState::Running;
        self.summary.callbacks += 1;
        let periodic = matches!(callback.kind, CallbackKind::Periodic { .. });
        {
            let mut ctx = Context::new(&mut self.clock, &mut self.stage);
            let outcome = match &callback.action {
                Action::Update => {
                    self.task.update(&mut ctx);
                    Ok(())
                }
                Action::Callback(tag) => {
                    self.task.on_callback(*tag, &mut ctx);
                    Ok(())
                }
                Action::Key { key, onset } => {
                    self.summary.responses += 1;
                    self.task.on_key(*key, *onset, &mut ctx)
                }
                Action::Speech { text, onset } => {
                    self.summary.responses += 1;
                    self.task.on_speech(text, *onset, &mut ctx)
                }
            };
            if let Err(err) = outcome {
                self.summary.misuse += 1;
                if cfg!(debug_assertions) {
                    error!(task = self.task.name(), at = callback.fire_time, %err, "response dropped");
                } else {
                    warn!(task = self.task.name(), at = callback.fire_time, %err, "response dropped");
                }
            }
        }
        if periodic {
            self.clock.requeue(callback);
        }
        self.deliver_percepts();
        self.sync_stopped();
        true
    }

    /// Starts the run, dispatches until it stops, then lets the task finish.
    pub fn run(&mut self) -> Result<RunSummary, TaskError> {
        self.start()?;
        while self.step() {}
        self.mark_stopped();
        {
            let mut ctx = Context::new(&mut self.clock, &mut self.stage);
            self.task.finish(&mut ctx);
        }
        self.summary.end_time = self.clock.now();
        info!(
            task = self.task.name(),
            end = self.summary.end_time,
            callbacks = self.summary.callbacks,
            responses = self.summary.responses,
            misuse = self.summary.misuse,
            "run finished"
        );
        Ok(self.summary.clone())
    }

    /// Hands every stage change of the last hook to the participant and
    /// queues its responses.
    fn deliver_percepts(&mut self) {
        let now = self.clock.now();
        for percept in self.stage.take_percepts() {
            if let Some(reply) = self.model.perceive(now, &percept, &self.stage) {
                let action = Action::response(reply.response, now);
                self.clock.schedule(now + reply.delay, CallbackKind::Once, action);
            }
        }
    }

    fn sync_stopped(&mut self) {
        if self.clock.is_stopped() {
            self.state = RunState::Stopped;
        }
    }

    fn mark_stopped(&mut self) {
        self.clock.stop();
        self.state = RunState::Stopped;
    }
}
