pub mod clock;
pub mod pacer;

pub use clock::{
    CallbackId, CallbackKind, Clock, ClockStats, EventClock, ScheduledCallback, SimTime,
};
pub use pacer::RealTimePacer;
