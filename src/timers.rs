//! Timing for reconciliation phases.
//!
//! An RAII timer adds the time it was alive to a `Duration` slot when dropped,
//! so a phase that bails out early with `?` is still accounted for.

use std::time::{Duration, Instant};

/// RAII timer that records elapsed time to a mutable slot on Drop.
///
/// ```rust,ignore
/// let mut discover = Duration::ZERO;
/// {
///     let _timer = PhaseTimer::new(&mut discover);
///     // ... list backends, read bindings ...
/// }
/// ```
pub struct PhaseTimer<'a> {
    start: Instant,
    slot: &'a mut Duration,
}

impl<'a> PhaseTimer<'a> {
    pub fn new(slot: &'a mut Duration) -> Self {
        Self {
            start: Instant::now(),
            slot,
        }
    }
}

impl Drop for PhaseTimer<'_> {
    fn drop(&mut self) {
        *self.slot += self.start.elapsed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_phase_timer_records_elapsed() {
        let mut duration = Duration::ZERO;
        {
            let _timer = PhaseTimer::new(&mut duration);
            thread::sleep(Duration::from_millis(10));
        }
        assert!(duration.as_millis() >= 10);
    }

    #[test]
    fn test_phase_timer_records_on_early_return() {
        fn failing_phase(slot: &mut Duration) -> Result<(), String> {
            let _timer = PhaseTimer::new(slot);
            thread::sleep(Duration::from_millis(5));
            Err("discovery failed".to_string())
        }

        let mut duration = Duration::ZERO;
        assert!(failing_phase(&mut duration).is_err());
        assert!(duration.as_millis() >= 5);
    }
}
