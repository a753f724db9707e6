pub mod phase;
pub mod stage;
pub mod stimulus;
pub mod trial;

pub use cogfit_cache::StimulusId;
pub use phase::RunState;
pub use stage::{Environment, Stage};
pub use stimulus::{AuralItem, AuralKind, Percept, VisualItem, VisualKind};
pub use trial::{Response, TrialResult};
