//! Serial operation queue
//!
//! Every backend request runs through one worker task, one at a time, in
//! submission order. An operation that fails reports to its own callbacks and
//! the worker moves on; a panicking operation is caught and logged.

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use parking_lot::Mutex;
use purchases_domain::TransportError;
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Unit of work executed by the queue.
#[async_trait]
pub trait Operation: Send {
    /// Short label for log events.
    fn name(&self) -> &'static str;

    /// Perform the work and deliver the outcome to the operation's callbacks.
    async fn execute(self: Box<Self>);

    /// Deliver `error` to the operation's callbacks without running it.
    fn reject(self: Box<Self>, error: TransportError);
}

/// Lifecycle failures of the [`OperationQueue`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// `start` was called outside a tokio runtime.
    #[error("operation queue must be started inside a tokio runtime")]
    NoRuntime,

    /// `shutdown` was called more than once.
    #[error("operation queue already shut down")]
    AlreadyShutDown,

    /// The worker was still draining when the join timeout elapsed.
    #[error("operation queue worker did not finish within {0:?}")]
    JoinTimeout(Duration),

    /// The worker task itself panicked outside an operation.
    #[error("operation queue worker panicked: {0}")]
    WorkerPanicked(String),
}

/// Single-worker FIFO queue with explicit lifecycle management.
pub struct OperationQueue {
    sender: Mutex<Option<UnboundedSender<Box<dyn Operation>>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    join_timeout: Duration,
}

impl OperationQueue {
    /// Spawn the worker on the current tokio runtime.
    pub fn start() -> Result<Self, QueueError> {
        Self::start_with_join_timeout(DEFAULT_JOIN_TIMEOUT)
    }

    /// Like [`start`](Self::start), bounding how long `shutdown` waits for
    /// the worker.
    pub fn start_with_join_timeout(join_timeout: Duration) -> Result<Self, QueueError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| QueueError::NoRuntime)?;
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = runtime.spawn(Self::process_loop(receiver));

        info!("Operation queue started");
        Ok(Self {
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
            join_timeout,
        })
    }

    /// Enqueue `operation`. After shutdown the operation is handed back
    /// unexecuted so the caller can reject it.
    pub fn submit(&self, operation: Box<dyn Operation>) -> Result<(), Box<dyn Operation>> {
        let sender = self.sender.lock();
        match sender.as_ref() {
            Some(sender) => {
                let name = operation.name();
                sender.send(operation).map_err(|rejected| rejected.0)?;
                debug!(operation = name, "Operation enqueued");
                Ok(())
            }
            None => Err(operation),
        }
    }

    /// Whether the queue still accepts operations.
    pub fn is_running(&self) -> bool {
        self.sender.lock().is_some()
    }

    /// Close the intake, let the worker finish everything already queued and
    /// wait for it to exit.
    pub async fn shutdown(&self) -> Result<(), QueueError> {
        if self.sender.lock().take().is_none() {
            return Err(QueueError::AlreadyShutDown);
        }
        info!("Stopping operation queue");

        let worker = self.worker.lock().take();
        if let Some(handle) = worker {
            match tokio::time::timeout(self.join_timeout, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!("Operation queue worker panicked: {}", e);
                    return Err(QueueError::WorkerPanicked(e.to_string()));
                }
                Err(_) => {
                    warn!("Operation queue worker did not complete within timeout");
                    return Err(QueueError::JoinTimeout(self.join_timeout));
                }
            }
        }

        info!("Operation queue stopped");
        Ok(())
    }

    async fn process_loop(mut receiver: UnboundedReceiver<Box<dyn Operation>>) {
        while let Some(operation) = receiver.recv().await {
            let name = operation.name();
            debug!(operation = name, "Executing operation");

            if AssertUnwindSafe(operation.execute()).catch_unwind().await.is_err() {
                error!(operation = name, "Operation panicked; continuing with next operation");
            }
        }
        debug!("Operation queue drained");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::oneshot;

    use super::*;

    struct Record {
        id: usize,
        log: Arc<Mutex<Vec<usize>>>,
        delay: Duration,
        rejected: Option<oneshot::Sender<TransportError>>,
    }

    impl Record {
        fn new(id: usize, log: &Arc<Mutex<Vec<usize>>>) -> Box<Self> {
            Box::new(Self { id, log: Arc::clone(log), delay: Duration::ZERO, rejected: None })
        }
    }

    #[async_trait]
    impl Operation for Record {
        fn name(&self) -> &'static str {
            "record"
        }

        async fn execute(self: Box<Self>) {
            tokio::time::sleep(self.delay).await;
            self.log.lock().push(self.id);
        }

        fn reject(self: Box<Self>, error: TransportError) {
            if let Some(sender) = self.rejected {
                let _ = sender.send(error);
            }
        }
    }

    struct Explode;

    #[async_trait]
    impl Operation for Explode {
        fn name(&self) -> &'static str {
            "explode"
        }

        async fn execute(self: Box<Self>) {
            panic!("operation blew up");
        }

        fn reject(self: Box<Self>, _error: TransportError) {}
    }

    #[test]
    fn start_outside_runtime_fails() {
        assert_eq!(OperationQueue::start().err(), Some(QueueError::NoRuntime));
    }

    #[tokio::test]
    async fn executes_in_submission_order() {
        let queue = OperationQueue::start().unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));

        let mut slow = Record::new(0, &log);
        slow.delay = Duration::from_millis(20);
        assert!(queue.submit(slow).is_ok());
        for id in 1..5 {
            assert!(queue.submit(Record::new(id, &log)).is_ok());
        }

        queue.shutdown().await.unwrap();
        assert_eq!(*log.lock(), vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn panicking_operation_does_not_stop_the_worker() {
        let queue = OperationQueue::start().unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));

        assert!(queue.submit(Box::new(Explode)).is_ok());
        assert!(queue.submit(Record::new(7, &log)).is_ok());

        queue.shutdown().await.unwrap();
        assert_eq!(*log.lock(), vec![7]);
    }

    #[tokio::test]
    async fn submit_after_shutdown_hands_operation_back() {
        let queue = OperationQueue::start().unwrap();
        queue.shutdown().await.unwrap();
        assert!(!queue.is_running());

        let log = Arc::new(Mutex::new(Vec::new()));
        let (sender, receiver) = oneshot::channel();
        let mut operation = Record::new(1, &log);
        operation.rejected = Some(sender);

        let returned = queue.submit(operation).err().unwrap();
        returned.reject(TransportError::Unavailable("queue closed".into()));

        assert_eq!(receiver.await.unwrap(), TransportError::Unavailable("queue closed".into()));
        assert!(log.lock().is_empty());
    }

    #[tokio::test]
    async fn second_shutdown_reports_already_shut_down() {
        let queue = OperationQueue::start().unwrap();
        queue.shutdown().await.unwrap();
        assert_eq!(queue.shutdown().await, Err(QueueError::AlreadyShutDown));
    }

    #[tokio::test]
    async fn shutdown_times_out_on_stuck_operation() {
        let queue = OperationQueue::start_with_join_timeout(Duration::from_millis(10)).unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut stuck = Record::new(0, &log);
        stuck.delay = Duration::from_secs(60);
        assert!(queue.submit(stuck).is_ok());

        assert!(matches!(queue.shutdown().await, Err(QueueError::JoinTimeout(_))));
    }
}
