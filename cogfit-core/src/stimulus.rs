use cogfit_cache::StimulusId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualKind {
    Fixation,
    /// Something the model must respond to; `value` holds the key to press.
    Target,
    /// One countable element of an enumeration display.
    Dot,
    /// Asks for a spoken answer about what is currently on screen.
    Prompt,
    Text,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisualItem {
    pub id: StimulusId,
    pub kind: VisualKind,
    pub value: String,
    pub x: f64,
    pub y: f64,
}

impl VisualItem {
    pub fn new(id: &str, kind: VisualKind, value: impl Into<String>) -> Self {
        Self {
            id: StimulusId::intern(id),
            kind,
            value: value.into(),
            x: 0.0,
            y: 0.0,
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuralKind {
    Tone,
    Word,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuralItem {
    pub id: StimulusId,
    pub kind: AuralKind,
    pub content: String,
}

impl AuralItem {
    pub fn new(id: &str, kind: AuralKind, content: impl Into<String>) -> Self {
        Self {
            id: StimulusId::intern(id),
            kind,
            content: content.into(),
        }
    }
}

/// What the simulated observer is told about after a hook returns.
#[derive(Debug, Clone, PartialEq)]
pub enum Percept {
    Visual(VisualItem),
    Moved { id: StimulusId, x: f64, y: f64 },
    Cleared,
    /// Heard `delay` seconds after the presenting hook ran.
    Aural { delay: f64, item: AuralItem },
}
