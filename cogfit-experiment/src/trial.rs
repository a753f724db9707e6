use crate::error::TaskError;
use cogfit_timing::SimTime;

/// The one mutable "current" trial of a run, or none.
#[derive(Debug, Clone, PartialEq)]
pub enum TrialSlot<T> {
    Closed,
    Open(T),
}

impl<T> Default for TrialSlot<T> {
    fn default() -> Self {
        TrialSlot::Closed
    }
}

impl<T> TrialSlot<T> {
    pub fn is_open(&self) -> bool {
        matches!(self, TrialSlot::Open(_))
    }

    /// Opens `trial`, handing back whatever was open before.
    pub fn open(&mut self, trial: T) -> Option<T> {
        match std::mem::replace(self, TrialSlot::Open(trial)) {
            TrialSlot::Open(prev) => Some(prev),
            TrialSlot::Closed => None,
        }
    }

    pub fn close(&mut self) -> Option<T> {
        match std::mem::replace(self, TrialSlot::Closed) {
            TrialSlot::Open(trial) => Some(trial),
            TrialSlot::Closed => None,
        }
    }

    pub fn current(&self) -> Option<&T> {
        match self {
            TrialSlot::Open(trial) => Some(trial),
            TrialSlot::Closed => None,
        }
    }

    pub fn current_mut(&mut self) -> Option<&mut T> {
        match self {
            TrialSlot::Open(trial) => Some(trial),
            TrialSlot::Closed => None,
        }
    }
}

/// Rejects an answer to a stimulus that appeared before the trial it would
/// be recorded against was opened at `opened`.
pub fn check_onset(hook: &'static str, onset: SimTime, opened: SimTime) -> Result<(), TaskError> {
    if onset < opened {
        return Err(TaskError::StaleResponse {
            hook,
            onset,
            opened,
        });
    }
    Ok(())
}

/// Completed trials of a run plus the currently open one.
///
/// Completed trials are append-only. A trial moves from the slot to the
/// completed list exactly once, either when the next trial opens or through
/// an explicit [`close_trial`](Self::close_trial).
#[derive(Debug, Clone)]
pub struct TrialLog<T> {
    slot: TrialSlot<T>,
    opened_at: SimTime,
    completed: Vec<T>,
}

impl<T> Default for TrialLog<T> {
    fn default() -> Self {
        Self {
            slot: TrialSlot::Closed,
            opened_at: 0.0,
            completed: Vec::new(),
        }
    }
}

impl<T> TrialLog<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Archives the open trial, if any. Returns true if one was archived.
    pub fn close_trial(&mut self) -> bool {
        match self.slot.close() {
            Some(trial) => {
                self.completed.push(trial);
                true
            }
            None => false,
        }
    }

    /// Archives the open trial and opens `trial` in its place at `at`.
    pub fn begin(&mut self, trial: T, at: SimTime) {
        self.close_trial();
        self.slot.open(trial);
        self.opened_at = at;
    }

    pub fn is_open(&self) -> bool {
        self.slot.is_open()
    }

    pub fn current(&self) -> Option<&T> {
        self.slot.current()
    }

    pub fn current_mut(&mut self) -> Option<&mut T> {
        self.slot.current_mut()
    }

    /// The open trial for a response hook named `hook`, answering a stimulus
    /// that appeared at `onset`.
    pub fn respond(&mut self, hook: &'static str, onset: SimTime) -> Result<&mut T, TaskError> {
        let opened = self.opened_at;
        let trial = self
            .slot
            .current_mut()
            .ok_or(TaskError::NoOpenTrial { hook })?;
        check_onset(hook, onset, opened)?;
        Ok(trial)
    }

    pub fn completed(&self) -> &[T] {
        &self.completed
    }

    pub fn len(&self) -> usize {
        self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
    }

    pub fn clear(&mut self) {
        self.slot = TrialSlot::Closed;
        self.completed.clear();
    }
}
