//! Refresh scheduling
//!
//! A scheduler holds at most one pending tick. The controller arms it after
//! each completed refresh cycle and polls it from the event loop; nothing runs
//! on another thread.

use std::time::{Duration, Instant};

/// "Schedule a refresh after D, cancellable"
pub trait RefreshScheduler {
    /// Arm the next tick, replacing any pending one
    fn schedule(&mut self, after: Duration);

    /// Drop the pending tick, if any
    fn cancel(&mut self);

    fn is_scheduled(&self) -> bool;

    /// Consume the pending tick if it has fallen due
    fn take_due(&mut self) -> bool;

    /// Time left until the pending tick, `None` when nothing is scheduled
    fn time_until_due(&self) -> Option<Duration>;
}

/// Wall-clock scheduler used by the terminal session
#[derive(Debug, Default)]
pub struct TickScheduler {
    deadline: Option<Instant>,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RefreshScheduler for TickScheduler {
    fn schedule(&mut self, after: Duration) {
        self.deadline = Some(Instant::now() + after);
    }

    fn cancel(&mut self) {
        self.deadline = None;
    }

    fn is_scheduled(&self) -> bool {
        self.deadline.is_some()
    }

    fn take_due(&mut self) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= Instant::now() => {
                self.deadline = None;
                true
            },
            _ => false,
        }
    }

    fn time_until_due(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }
}

/// Scheduler whose ticks fall due only when a test fires them
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ManualScheduler {
    pending: Option<Duration>,
    due: bool,
    /// Every interval ever scheduled, in order
    pub history: Vec<Duration>,
}

#[cfg(test)]
impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let the pending tick fall due, false when nothing was scheduled
    pub fn fire(&mut self) -> bool {
        if self.pending.take().is_some() {
            self.due = true;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
impl RefreshScheduler for ManualScheduler {
    fn schedule(&mut self, after: Duration) {
        self.pending = Some(after);
        self.due = false;
        self.history.push(after);
    }

    fn cancel(&mut self) {
        self.pending = None;
        self.due = false;
    }

    fn is_scheduled(&self) -> bool {
        self.pending.is_some() || self.due
    }

    fn take_due(&mut self) -> bool {
        std::mem::take(&mut self.due)
    }

    fn time_until_due(&self) -> Option<Duration> {
        if self.due {
            Some(Duration::ZERO)
        } else {
            self.pending
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_scheduler_due_and_cancel() {
        let mut scheduler = TickScheduler::new();
        assert!(!scheduler.take_due());
        assert_eq!(scheduler.time_until_due(), None);

        scheduler.schedule(Duration::ZERO);
        assert!(scheduler.is_scheduled());
        assert!(scheduler.take_due());
        assert!(!scheduler.take_due());

        scheduler.schedule(Duration::from_secs(60));
        assert!(!scheduler.take_due());
        assert!(scheduler.time_until_due().unwrap_or_default() > Duration::from_secs(50));
        scheduler.cancel();
        assert!(!scheduler.is_scheduled());
    }

    #[test]
    fn test_manual_scheduler() {
        let mut scheduler = ManualScheduler::new();
        assert!(!scheduler.fire());

        scheduler.schedule(Duration::from_secs(1));
        assert!(!scheduler.take_due());
        assert!(scheduler.fire());
        assert!(scheduler.take_due());
        assert!(!scheduler.take_due());

        scheduler.schedule(Duration::from_secs(1));
        scheduler.cancel();
        assert!(!scheduler.fire());
        assert_eq!(scheduler.history.len(), 2);
    }
}
