use crate::stimulus::{AuralItem, Percept, VisualItem, VisualKind};
use cogfit_cache::StimulusId;
use tracing::{debug, info};

/// Stimulus delivery sinks a task presents through.
pub trait Environment {
    fn present_visual(&mut self, item: VisualItem);
    fn move_visual(&mut self, id: StimulusId, x: f64, y: f64);
    fn clear_visuals(&mut self);
    fn present_aural(&mut self, item: AuralItem) {
        self.present_aural_after(0.0, item);
    }
    fn present_aural_after(&mut self, delay: f64, item: AuralItem);
    fn emit_line(&mut self, text: &str);
}

/// In-memory display and audio channel.
///
/// Keeps the visuals currently shown and queues a [`Percept`] for every
/// change so the simulated observer can be told about it once the hook that
/// caused it returns. Emitted lines are kept as a transcript.
#[derive(Debug, Default)]
pub struct Stage {
    visuals: Vec<VisualItem>,
    pending: Vec<Percept>,
    transcript: Vec<String>,
    echo: bool,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also log every emitted line at info level.
    pub fn echoing() -> Self {
        Self {
            echo: true,
            ..Self::default()
        }
    }

    pub fn visuals(&self) -> &[VisualItem] {
        &self.visuals
    }

    pub fn count(&self, kind: VisualKind) -> usize {
        self.visuals.iter().filter(|v| v.kind == kind).count()
    }

    pub fn find(&self, id: StimulusId) -> Option<&VisualItem> {
        self.visuals.iter().find(|v| v.id == id)
    }

    pub fn take_percepts(&mut self) -> Vec<Percept> {
        std::mem::take(&mut self.pending)
    }

    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// Drops visuals, pending percepts and transcript between runs.
    pub fn reset(&mut self) {
        self.visuals.clear();
        self.pending.clear();
        self.transcript.clear();
    }
}

impl Environment for Stage {
    fn present_visual(&mut self, item: VisualItem) {
        debug!(id = %item.id, kind = ?item.kind, value = %item.value, "visual");
        self.visuals.retain(|v| v.id != item.id);
        self.visuals.push(item.clone());
        self.pending.push(Percept::Visual(item));
    }

    fn move_visual(&mut self, id: StimulusId, x: f64, y: f64) {
        if let Some(v) = self.visuals.iter_mut().find(|v| v.id == id) {
            v.x = x;
            v.y = y;
            self.pending.push(Percept::Moved { id, x, y });
        } else {
            debug!(id = %id, "move of a visual that is not shown");
        }
    }

    fn clear_visuals(&mut self) {
        self.visuals.clear();
        self.pending.push(Percept::Cleared);
    }

    fn present_aural_after(&mut self, delay: f64, item: AuralItem) {
        debug!(id = %item.id, delay, content = %item.content, "aural");
        self.pending.push(Percept::Aural {
            delay: delay.max(0.0),
            item,
        });
    }

    fn emit_line(&mut self, text: &str) {
        if self.echo {
            info!("{text}");
        }
        self.transcript.push(text.to_string());
    }
}
