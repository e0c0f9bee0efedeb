use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::{mpsc, Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use folio_application::{
    ApplicationError, Clock, IntakeHandler, IntakeItem, IntakeQueue, Offer, ProcessOutcome,
    QueueState,
};
use tracing::{debug, error, info};

struct Shared {
    queue: Mutex<IntakeQueue>,
    idle: Condvar,
}

impl Shared {
    fn lock(&self) -> Result<MutexGuard<'_, IntakeQueue>, ApplicationError> {
        self.queue
            .lock()
            .map_err(|_| ApplicationError::Io("intake queue lock poisoned".to_string()))
    }
}

/// Feeds offered paths to a handler on one background thread, strictly one
/// at a time and in arrival order. Each path is stamped with its discovery
/// time when submitted.
pub struct BackgroundIntakeWorker {
    shared: Arc<Shared>,
    clock: Box<dyn Clock>,
    start_tx: Option<mpsc::Sender<IntakeItem>>,
    join: Option<JoinHandle<()>>,
}

impl BackgroundIntakeWorker {
    pub fn new(handler: Arc<dyn IntakeHandler>, clock: Box<dyn Clock>) -> Self {
        Self::spawn(handler, clock, None)
    }

    /// Like [`BackgroundIntakeWorker::new`], also forwarding every outcome.
    pub fn with_observer(
        handler: Arc<dyn IntakeHandler>,
        clock: Box<dyn Clock>,
        observer: mpsc::Sender<ProcessOutcome>,
    ) -> Self {
        Self::spawn(handler, clock, Some(observer))
    }

    fn spawn(
        handler: Arc<dyn IntakeHandler>,
        clock: Box<dyn Clock>,
        observer: Option<mpsc::Sender<ProcessOutcome>>,
    ) -> Self {
        let shared = Arc::new(Shared {
            queue: Mutex::new(IntakeQueue::new()),
            idle: Condvar::new(),
        });
        let (start_tx, start_rx) = mpsc::channel::<IntakeItem>();
        let worker_shared = Arc::clone(&shared);
        let join = thread::spawn(move || run_worker(start_rx, worker_shared, handler, observer));

        Self {
            shared,
            clock,
            start_tx: Some(start_tx),
            join: Some(join),
        }
    }

    pub fn submit(&self, path: PathBuf) -> Result<Offer, ApplicationError> {
        let item = IntakeItem::new(path, self.clock.now_timestamp_string());
        let offer = self.shared.lock()?.offer(item);
        match &offer {
            Offer::Start(item) => {
                let start_tx = self
                    .start_tx
                    .as_ref()
                    .ok_or_else(|| ApplicationError::Io("intake worker is shut down".to_string()))?;
                start_tx.send(item.clone()).map_err(|error| {
                    ApplicationError::Io(format!("failed to start intake item: {error}"))
                })?;
            }
            Offer::Queued { position } => {
                info!(position, "source queued behind the in-flight item");
            }
        }
        Ok(offer)
    }

    pub fn pending_len(&self) -> Result<usize, ApplicationError> {
        Ok(self.shared.lock()?.pending_len())
    }

    /// Drops queued items that have not started. Returns how many were dropped.
    pub fn clear_pending(&self) -> Result<usize, ApplicationError> {
        Ok(self.shared.lock()?.clear_pending())
    }

    pub fn wait_until_idle(&self) -> Result<(), ApplicationError> {
        let guard = self.shared.lock()?;
        let _guard = self
            .shared
            .idle
            .wait_while(guard, |queue| queue.state() == QueueState::Processing)
            .map_err(|_| ApplicationError::Io("intake queue lock poisoned".to_string()))?;
        Ok(())
    }

    /// Abandons pending items, lets the in-flight one finish, and joins the
    /// worker thread.
    pub fn shutdown(mut self) -> Result<usize, ApplicationError> {
        self.stop()
    }

    fn stop(&mut self) -> Result<usize, ApplicationError> {
        let dropped = self.clear_pending()?;
        self.start_tx.take();
        if let Some(join) = self.join.take() {
            join.join()
                .map_err(|_| ApplicationError::Io("intake worker panicked".to_string()))?;
        }
        if dropped > 0 {
            info!(dropped, "abandoned pending intake items");
        }
        Ok(dropped)
    }
}

impl Drop for BackgroundIntakeWorker {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

fn run_worker(
    start_rx: mpsc::Receiver<IntakeItem>,
    shared: Arc<Shared>,
    handler: Arc<dyn IntakeHandler>,
    observer: Option<mpsc::Sender<ProcessOutcome>>,
) {
    while let Ok(first) = start_rx.recv() {
        let mut current = first;
        loop {
            debug!(path = %current.path.display(), "intake item started");
            let outcome = handle_isolated(handler.as_ref(), &current);
            if let Some(observer) = &observer {
                let _ = observer.send(outcome);
            }

            let Ok(mut queue) = shared.lock() else {
                return;
            };
            match queue.complete() {
                Some(next) => current = next,
                None => {
                    shared.idle.notify_all();
                    break;
                }
            }
        }
    }
}

/// A panicking handler fails its item instead of taking the worker down.
fn handle_isolated(handler: &dyn IntakeHandler, item: &IntakeItem) -> ProcessOutcome {
    match catch_unwind(AssertUnwindSafe(|| handler.handle(item))) {
        Ok(outcome) => outcome,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(path = %item.path.display(), panic = %message, "intake handler panicked");
            ProcessOutcome::Failed {
                source: item.path.clone(),
                error: format!("handler panicked: {message}"),
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
