use std::collections::VecDeque;

use parking_lot::Mutex;

/// Finite, pre-loaded job source shared by all workers.
///
/// Every job is pushed at construction time and there is no way to add
/// more, so the queue is closed from the start. `next` never blocks on
/// anything but the short internal lock.
#[derive(Debug)]
pub struct JobQueue {
    jobs: Mutex<VecDeque<usize>>,
}

impl JobQueue {
    /// Loads job indices `0..count`.
    pub fn preloaded(count: usize) -> Self {
        let mut jobs = VecDeque::with_capacity(count);
        jobs.extend(0..count);
        Self {
            jobs: Mutex::new(jobs),
        }
    }

    /// `None` once the queue is exhausted.
    pub fn next(&self) -> Option<usize> {
        self.jobs.lock().pop_front()
    }
}
