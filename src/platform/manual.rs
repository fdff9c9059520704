//! Manually advanced clock and timer queue
//!
//! Used by the native host and by tests: nothing fires until the caller
//! advances time, and firings come out in due order.

use super::{Scheduler, TimerHandle, TimerKind};

#[derive(Debug, Clone)]
struct PendingTimer {
    handle: TimerHandle,
    kind: TimerKind,
    due_ms: u64,
    /// Repeat period for `every` timers
    period_ms: Option<u32>,
}

/// Deterministic `Scheduler` driven by explicit time steps
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    now_ms: u64,
    next_handle: u32,
    /// Kept in scheduling order so equal due times fire first-come
    pending: Vec<PendingTimer>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock value (ms)
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Whether a timer of this kind is waiting to fire
    pub fn is_pending(&self, kind: TimerKind) -> bool {
        self.pending.iter().any(|t| t.kind == kind)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Pop the earliest timer due at or before `until_ms`
    ///
    /// Moves the clock to the timer's due time; repeating timers are re-armed.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<TimerKind> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= until_ms)
            .min_by_key(|(_, t)| t.due_ms)
            .map(|(i, _)| i)?;

        let mut timer = self.pending.remove(idx);
        self.now_ms = self.now_ms.max(timer.due_ms);
        let kind = timer.kind;
        if let Some(period) = timer.period_ms {
            timer.due_ms += u64::from(period.max(1));
            self.pending.push(timer);
        }
        Some(kind)
    }

    /// Move the clock forward without firing anything
    pub fn set_now(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }

    fn schedule(&mut self, delay_ms: u32, kind: TimerKind, period_ms: Option<u32>) -> TimerHandle {
        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        self.pending.push(PendingTimer {
            handle,
            kind,
            due_ms: self.now_ms + u64::from(delay_ms),
            period_ms,
        });
        handle
    }
}

impl Scheduler for ManualScheduler {
    fn after(&mut self, delay_ms: u32, kind: TimerKind) -> TimerHandle {
        self.schedule(delay_ms, kind, None)
    }

    fn every(&mut self, period_ms: u32, kind: TimerKind) -> TimerHandle {
        self.schedule(period_ms, kind, Some(period_ms))
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.pending.retain(|t| t.handle != handle);
    }
}
