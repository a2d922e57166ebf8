//! Standard library backed runtime services for Trellis.
//!
//! Provides the [`LayoutExecutor`] implementations used outside of tests:
//! a dedicated layout thread for real asynchronous work and an inline
//! executor for single-threaded embeddings.

use std::sync::mpsc::{channel, Sender};
use std::thread;

use trellis_core::{LayoutExecutor, LayoutJob};

/// Runs posted work on a dedicated layout thread in FIFO order.
///
/// Dropping the executor closes the queue; the worker drains whatever was
/// already posted and exits, and the drop blocks until it has.
pub struct ThreadExecutor {
    tx: Option<Sender<LayoutJob>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl ThreadExecutor {
    /// Spawns the layout thread under the given name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let (tx, rx) = channel::<LayoutJob>();
        let worker = thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                log::debug!("layout thread `{name}` started");
                while let Ok(job) = rx.recv() {
                    job();
                }
                log::debug!("layout thread `{name}` exiting");
            })
            .expect("failed to spawn layout thread");
        Self {
            tx: Some(tx),
            worker: Some(worker),
        }
    }
}

impl LayoutExecutor for ThreadExecutor {
    fn post(&self, job: LayoutJob) {
        // Send only fails once the worker has exited, which cannot happen
        // while the sender is still alive.
        if let Some(tx) = &self.tx {
            let _ = tx.send(job);
        }
    }
}

impl Drop for ThreadExecutor {
    fn drop(&mut self) {
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Runs posted work immediately on the calling thread.
///
/// Turns asynchronous layout into synchronous layout, which is what
/// single-threaded hosts want.
#[derive(Clone, Copy, Debug, Default)]
pub struct InlineExecutor;

impl LayoutExecutor for InlineExecutor {
    fn post(&self, job: LayoutJob) {
        job();
    }
}
