use crate::error::TaskError;
use cogfit_core::{AuralItem, Environment, Response, StimulusId, VisualItem};
use cogfit_stats::TaskResult;
use cogfit_timing::{CallbackId, CallbackKind, Clock, SimTime};

/// Payload of a scheduled callback.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Calls [`Task::update`].
    Update,
    /// Calls [`Task::on_callback`] with a task-defined tag.
    Callback(u32),
    /// A key press answering a stimulus that appeared at `onset`.
    Key { key: char, onset: SimTime },
    Speech { text: String, onset: SimTime },
}

impl Action {
    pub fn response(response: Response, onset: SimTime) -> Self {
        match response {
            Response::Key(key) => Action::Key { key, onset },
            Response::Speech(text) => Action::Speech { text, onset },
        }
    }
}

/// What a hook sees of the run: the clock and the stimulus channel.
pub struct Context<'a> {
    clock: &'a mut dyn Clock<Action = Action>,
    env: &'a mut dyn Environment,
}

impl<'a> Context<'a> {
    pub fn new(clock: &'a mut dyn Clock<Action = Action>, env: &'a mut dyn Environment) -> Self {
        Self { clock, env }
    }

    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    /// One-shot [`Task::update`] after `delay`.
    pub fn schedule_update(&mut self, delay: SimTime) -> CallbackId {
        let at = self.now() + delay;
        self.clock.schedule(at, CallbackKind::Once, Action::Update)
    }

    /// One-shot [`Task::on_callback`] with `tag` after `delay`.
    pub fn schedule_once(&mut self, delay: SimTime, tag: u32) -> CallbackId {
        let at = self.now() + delay;
        self.clock.schedule(at, CallbackKind::Once, Action::Callback(tag))
    }

    /// Calls [`Task::update`] now and then every `period` until the returned
    /// id is cancelled or the run stops.
    ///
    /// "Now" means at the current simulated time, once the hook that asked
    /// for it has returned and any callbacks already due at this time have
    /// run.
    pub fn schedule_repeating(&mut self, period: SimTime) -> CallbackId {
        let at = self.now();
        self.clock
            .schedule(at, CallbackKind::Periodic { period }, Action::Update)
    }

    pub fn cancel(&mut self, id: CallbackId) -> bool {
        self.clock.cancel(id)
    }

    /// Ends the run. Nothing further is dispatched.
    pub fn stop(&mut self) {
        self.clock.stop();
    }

    pub fn is_stopped(&self) -> bool {
        self.clock.is_stopped()
    }
}

impl Environment for Context<'_> {
    fn present_visual(&mut self, item: VisualItem) {
        self.env.present_visual(item);
    }

    fn move_visual(&mut self, id: StimulusId, x: f64, y: f64) {
        self.env.move_visual(id, x, y);
    }

    fn clear_visuals(&mut self) {
        self.env.clear_visuals();
    }

    fn present_aural_after(&mut self, delay: f64, item: AuralItem) {
        self.env.present_aural_after(delay, item);
    }

    fn emit_line(&mut self, text: &str) {
        self.env.emit_line(text);
    }
}

/// One behavioral paradigm.
///
/// A value of the implementing type is one run: it is started, driven by
/// scheduled updates and responses until it stops the clock, and then handed,
/// together with its sibling runs, to [`Task::analyze`].
pub trait Task {
    fn name(&self) -> &str;

    /// Resets per-run state and arms the first update.
    fn start(&mut self, ctx: &mut Context<'_>);

    fn update(&mut self, ctx: &mut Context<'_>);

    fn on_callback(&mut self, tag: u32, ctx: &mut Context<'_>) {
        let _ = (tag, ctx);
    }

    /// `onset` is when the stimulus being answered appeared, which can be
    /// earlier than the currently open trial.
    fn on_key(&mut self, key: char, onset: SimTime, ctx: &mut Context<'_>) -> Result<(), TaskError> {
        let _ = (key, onset, ctx);
        Ok(())
    }

    fn on_speech(
        &mut self,
        text: &str,
        onset: SimTime,
        ctx: &mut Context<'_>,
    ) -> Result<(), TaskError> {
        let _ = (text, onset, ctx);
        Ok(())
    }

    /// Called once after the run has stopped.
    fn finish(&mut self, ctx: &mut Context<'_>) {
        let _ = ctx;
    }

    /// How many independent runs an analysis needs.
    fn analysis_iterations(&self) -> usize;

    /// Reduces completed runs and fits them against the reference data.
    /// Detail lines go to `out` when given.
    fn analyze(runs: &[Self], out: Option<&mut dyn Environment>) -> Result<TaskResult, TaskError>
    where
        Self: Sized;
}
