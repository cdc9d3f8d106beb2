//! Evaluation jobs

use core_types::Value;
use crossbeam::channel;

use crate::handle::EvalHandle;

/// A script queued for background evaluation.
///
/// Each job carries the source text and a one-shot reply channel whose
/// receiving half lives in the [`EvalHandle`] returned alongside the
/// job. Dropping an unfinished job resolves its handle to `undefined`.
pub struct EvalJob {
    source: String,
    reply: channel::Sender<Value>,
}

impl EvalJob {
    /// Package a script into a job and the handle that will observe its
    /// result.
    pub fn new(source: impl Into<String>) -> (EvalJob, EvalHandle) {
        let (reply, receiver) = channel::bounded(1);
        let job = EvalJob {
            source: source.into(),
            reply,
        };
        (job, EvalHandle::new(receiver))
    }

    /// The script to evaluate.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Deliver the evaluation result to the job's handle.
    ///
    /// The send is best-effort: if the handle was dropped, nobody is
    /// waiting and the value is discarded.
    pub fn complete(self, value: Value) {
        let _ = self.reply.send(value);
    }
}

impl std::fmt::Debug for EvalJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvalJob")
            .field("source", &self.source)
            .finish()
    }
}
