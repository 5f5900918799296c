//! Job orchestration: one worker thread per export or import, a progress
//! channel to whoever is watching, and a cooperative cancellation flag.
//!
//! The job itself is a plain synchronous function. It receives the model by
//! `&mut` for its whole run, so no other job can touch the model meanwhile.

use crate::error::{BridgeError, BridgeResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Shared cancellation flag, checked per sheet, row, field and group run.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Status messages pushed to observers.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    Started { sheets: usize },
    Sheet { name: String, index: usize, total: usize },
    Row { current: usize, total: usize },
    Issue { source_name: String, message: String },
    Cancelled,
    Finished,
}

/// How a job ended when it did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Completed(T),
    Cancelled,
}

impl<T> Outcome<T> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled)
    }

    pub fn completed(self) -> Option<T> {
        match self {
            Outcome::Completed(value) => Some(value),
            Outcome::Cancelled => None,
        }
    }
}

/// What a running job sees: the cancellation flag and the progress sink.
#[derive(Debug, Clone, Default)]
pub struct JobContext {
    cancel: CancellationToken,
    progress: Option<Sender<Progress>>,
}

impl JobContext {
    pub fn new(cancel: CancellationToken, progress: Option<Sender<Progress>>) -> Self {
        Self { cancel, progress }
    }

    /// A context nobody observes or cancels.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Fire and forget: a closed channel is not the job's problem.
    pub fn report(&self, progress: Progress) {
        if let Some(tx) = &self.progress {
            let _ = tx.send(progress);
        }
    }
}

/// Owns the cancellation flag and the progress channel of one job.
pub struct Session {
    cancel: CancellationToken,
    progress_tx: Sender<Progress>,
    progress_rx: Receiver<Progress>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        let (progress_tx, progress_rx) = channel();
        Self {
            cancel: CancellationToken::new(),
            progress_tx,
            progress_rx,
        }
    }

    /// Handle to cancel the running job from another thread.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn progress(&self) -> &Receiver<Progress> {
        &self.progress_rx
    }

    pub fn context(&self) -> JobContext {
        JobContext::new(self.cancel.clone(), Some(self.progress_tx.clone()))
    }

    /// Run `job` on a worker thread that owns `model` until it finishes.
    pub fn spawn<M, T, F>(&self, mut model: M, job: F) -> Worker<M, T>
    where
        M: Send + 'static,
        T: Send + 'static,
        F: FnOnce(&mut M, &JobContext) -> BridgeResult<Outcome<T>> + Send + 'static,
    {
        let cx = self.context();
        let handle = thread::spawn(move || {
            let result = job(&mut model, &cx);
            match &result {
                Ok(Outcome::Cancelled) => cx.report(Progress::Cancelled),
                Ok(Outcome::Completed(_)) => cx.report(Progress::Finished),
                Err(e) => tracing::error!("Job failed: {}", e),
            }
            (model, result)
        });
        Worker { handle }
    }
}

pub struct Worker<M, T> {
    handle: JoinHandle<(M, BridgeResult<Outcome<T>>)>,
}

impl<M, T> Worker<M, T> {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the job and hand the model back with the outcome.
    pub fn join(self) -> BridgeResult<(M, Outcome<T>)> {
        let (model, result) = self
            .handle
            .join()
            .map_err(|_| BridgeError::Host("Worker thread panicked".to_string()))?;
        Ok((model, result?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_returns_model_and_reports() {
        let session = Session::new();
        let worker = session.spawn(vec![1, 2, 3], |model: &mut Vec<i32>, cx| {
            cx.report(Progress::Started { sheets: 1 });
            model.push(4);
            Ok(Outcome::Completed(model.len()))
        });
        let (model, outcome) = worker.join().unwrap();
        assert_eq!(model, vec![1, 2, 3, 4]);
        assert_eq!(outcome, Outcome::Completed(4));

        let messages: Vec<Progress> = session.progress().try_iter().collect();
        assert_eq!(messages, vec![Progress::Started { sheets: 1 }, Progress::Finished]);
    }

    #[test]
    fn test_cancel_before_start() {
        let session = Session::new();
        session.cancel_token().cancel();
        let worker = session.spawn(0u32, |_: &mut u32, cx| {
            if cx.is_cancelled() {
                return Ok(Outcome::<()>::Cancelled);
            }
            Ok(Outcome::Completed(()))
        });
        let (_, outcome) = worker.join().unwrap();
        assert!(outcome.is_cancelled());
        assert_eq!(session.progress().try_iter().last(), Some(Progress::Cancelled));
    }

    #[test]
    fn test_job_error_is_returned() {
        let session = Session::new();
        let worker = session.spawn((), |_: &mut (), _| {
            Err::<Outcome<()>, _>(BridgeError::Host("boom".into()))
        });
        assert!(matches!(worker.join(), Err(BridgeError::Host(_))));
    }

    #[test]
    fn test_report_without_observer() {
        let cx = JobContext::detached();
        cx.report(Progress::Finished);
        assert!(!cx.is_cancelled());
    }
}
