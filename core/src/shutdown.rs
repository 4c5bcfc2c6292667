//! One-shot stop signal observed by every task of a run

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

/// Receiving side of the run-wide stop signal
///
/// Wraps a `broadcast::Receiver<()>` and remembers once the signal has been
/// seen, so a task can both `await` it inside `select!` and cheaply poll it
/// at loop boundaries. A dropped sender counts as a stop.
#[derive(Debug)]
pub struct Shutdown {
    triggered: bool,
    notify: broadcast::Receiver<()>,
}

impl Shutdown {
    /// Wrap a receiver subscribed before the signal is sent
    pub fn new(notify: broadcast::Receiver<()>) -> Self {
        Self {
            triggered: false,
            notify,
        }
    }

    /// Non-blocking check of the stop signal
    pub fn is_triggered(&mut self) -> bool {
        if !self.triggered {
            match self.notify.try_recv() {
                Err(TryRecvError::Empty) => {}
                _ => self.triggered = true,
            }
        }
        self.triggered
    }

    /// Wait until the stop signal fires
    pub async fn recv(&mut self) {
        if self.triggered {
            return;
        }
        let _ = self.notify.recv().await;
        self.triggered = true;
    }
}
