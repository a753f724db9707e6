/// Lifecycle of one run of a task against the simulated clock.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    /// `start` has been called; nothing has fired yet.
    Started,
    /// At least one scheduled callback has been dispatched.
    Running,
    /// Terminal. No callback is dispatched after this.
    Stopped,
}

impl RunState {
    pub fn accepts_callbacks(&self) -> bool {
        matches!(self, Self::Started | Self::Running)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }
}
