//! Background evaluation worker pool

use std::io;
use std::sync::Arc;
use std::thread::{Builder, JoinHandle};

use core_types::Value;
use crossbeam::channel::{self, Sender};

use crate::handle::EvalHandle;
use crate::job::EvalJob;

/// The closure a pool runs for each submitted script.
pub type EvalRunner = Arc<dyn Fn(&str) -> Value + Send + Sync>;

/// A fixed set of worker threads draining a shared job queue.
///
/// Jobs are handed out in submission order. Shutting down closes the
/// queue and joins every worker; workers finish the jobs already
/// queued before exiting, so no accepted submission is dropped.
pub struct WorkerPool {
    sender: Option<Sender<EvalJob>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Start `count` workers that evaluate scripts with `runner`.
    pub fn spawn(count: usize, runner: EvalRunner) -> io::Result<WorkerPool> {
        let (sender, receiver) = channel::unbounded::<EvalJob>();
        let mut workers = Vec::with_capacity(count);
        for index in 0..count {
            let receiver = receiver.clone();
            let runner = Arc::clone(&runner);
            let worker = Builder::new()
                .name(format!("eval-worker-{}", index))
                .spawn(move || {
                    while let Ok(job) = receiver.recv() {
                        let value = runner(job.source());
                        job.complete(value);
                    }
                })?;
            workers.push(worker);
        }
        Ok(WorkerPool {
            sender: Some(sender),
            workers,
        })
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Queue a script and return the handle observing its result.
    ///
    /// If the pool is already shut down the job is dropped, which
    /// resolves the handle to `undefined`.
    pub fn submit(&self, source: impl Into<String>) -> EvalHandle {
        let (job, handle) = EvalJob::new(source);
        if let Some(sender) = &self.sender {
            let _ = sender.send(job);
        }
        handle
    }

    /// Close the queue and join every worker.
    ///
    /// Already queued jobs still run to completion. Calling this more
    /// than once is harmless.
    pub fn shutdown(&mut self) {
        self.sender.take();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers.len())
            .field("accepting", &self.sender.is_some())
            .finish()
    }
}
