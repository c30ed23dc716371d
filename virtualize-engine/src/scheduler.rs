use alloc::vec::Vec;
use core::mem;

/// Deterministic stand-in for the event loop's timers (`T`) and animation frames (`F`).
///
/// Timers fire from `take_due(now_ms)` in deadline order (ties in scheduling order). Frame
/// callbacks requested while a frame runs land in the next frame.
#[derive(Debug)]
pub(crate) struct Scheduler<T, F> {
    timers: Vec<Timer<T>>,
    frames: Vec<F>,
    seq: u64,
}

#[derive(Debug)]
struct Timer<T> {
    due_ms: u64,
    seq: u64,
    task: T,
}

impl<T, F> Default for Scheduler<T, F> {
    fn default() -> Self {
        Self {
            timers: Vec::new(),
            frames: Vec::new(),
            seq: 0,
        }
    }
}

impl<T, F> Scheduler<T, F> {
    pub(crate) fn set_timeout(&mut self, now_ms: u64, delay_ms: u64, task: T) {
        self.seq = self.seq.wrapping_add(1);
        self.timers.push(Timer {
            due_ms: now_ms.saturating_add(delay_ms),
            seq: self.seq,
            task,
        });
    }

    pub(crate) fn request_frame(&mut self, task: F) {
        self.frames.push(task);
    }

    pub(crate) fn take_due(&mut self, now_ms: u64) -> Vec<T> {
        let (mut due, pending): (Vec<_>, Vec<_>) = mem::take(&mut self.timers)
            .into_iter()
            .partition(|t| t.due_ms <= now_ms);
        self.timers = pending;
        due.sort_by_key(|t| (t.due_ms, t.seq));
        due.into_iter().map(|t| t.task).collect()
    }

    pub(crate) fn take_frame(&mut self) -> Vec<F> {
        mem::take(&mut self.frames)
    }

    pub(crate) fn next_deadline(&self) -> Option<u64> {
        self.timers.iter().map(|t| t.due_ms).min()
    }

    pub(crate) fn has_frames(&self) -> bool {
        !self.frames.is_empty()
    }
}
