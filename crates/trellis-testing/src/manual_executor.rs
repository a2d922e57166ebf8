//! Drainable executor simulating a main-thread queue.

use std::collections::VecDeque;
use std::sync::Mutex;

use trellis_core::{LayoutExecutor, LayoutJob};

/// Executor whose queue only advances when the test drains it.
///
/// Posted work accumulates until [`run_to_end_of_tasks`] (or [`run_one`])
/// is called, which is exactly what a race test needs: schedule an async
/// layout, mutate the holder, then let the stale completion run and assert
/// it was discarded.
///
/// [`run_to_end_of_tasks`]: ManualExecutor::run_to_end_of_tasks
/// [`run_one`]: ManualExecutor::run_one
#[derive(Default)]
pub struct ManualExecutor {
    queue: Mutex<VecDeque<LayoutJob>>,
}

impl ManualExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs queued jobs until the queue is empty, including jobs posted by
    /// the jobs themselves. Returns how many ran.
    pub fn run_to_end_of_tasks(&self) -> usize {
        let mut ran = 0;
        while let Some(job) = self.pop() {
            job();
            ran += 1;
        }
        ran
    }

    /// Runs the oldest queued job, if any.
    pub fn run_one(&self) -> bool {
        match self.pop() {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }

    /// Number of jobs waiting in the queue.
    pub fn pending(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }

    // Jobs run with the queue lock dropped so they can post more work.
    fn pop(&self) -> Option<LayoutJob> {
        self.queue.lock().unwrap().pop_front()
    }
}

impl LayoutExecutor for ManualExecutor {
    fn post(&self, job: LayoutJob) {
        self.queue.lock().unwrap().push_back(job);
    }
}
