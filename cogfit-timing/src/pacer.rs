use crate::clock::SimTime;
use std::time::{Duration, Instant};

/// Holds the dispatch loop back so simulated time tracks wall time.
///
/// Batch analysis never paces; a single demonstration run can, so that a
/// person watching the stage sees trials unfold at their simulated speed.
#[derive(Debug, Clone)]
pub struct RealTimePacer {
    pub start: Instant,
    /// Wall seconds per simulated second. 1.0 is real time, 0.5 twice as fast.
    pub scale: f64,
}

impl RealTimePacer {
    pub fn new(scale: f64) -> Self {
        Self {
            start: Instant::now(),
            scale: scale.max(0.0),
        }
    }

    /// Wall-clock delay still owed before `sim_time` may be dispatched.
    pub fn lag(&self, sim_time: SimTime) -> Duration {
        let target = Duration::try_from_secs_f64((sim_time * self.scale).max(0.0))
            .unwrap_or(Duration::MAX);
        target.saturating_sub(self.start.elapsed())
    }

    pub fn wait_until(&self, sim_time: SimTime) {
        let lag = self.lag(sim_time);
        if !lag.is_zero() {
            precise_sleep(lag);
        }
    }
}

impl Default for RealTimePacer {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(target_os = "linux")]
fn precise_sleep(duration: Duration) {
    use libc::{clock_nanosleep, timespec, CLOCK_MONOTONIC};

    let req = timespec {
        tv_sec: duration.as_secs() as libc::time_t,
        tv_nsec: duration.subsec_nanos() as libc::c_long,
    };

    // SAFETY: `req` is a valid timespec and the remainder pointer may be null.
    unsafe {
        clock_nanosleep(CLOCK_MONOTONIC, 0, &req, std::ptr::null_mut());
    }
}

#[cfg(not(target_os = "linux"))]
fn precise_sleep(duration: Duration) {
    std::thread::sleep(duration);
}
