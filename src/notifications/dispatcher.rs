use crate::config::NotificationConfig;
use crate::error::Result;
use crate::metrics::NOTIFICATIONS_TOTAL;
use crate::models::{Incident, NotificationMessage, NotificationStats};
use crate::notifications::{NotificationSender, WebhookSender};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

#[derive(Default)]
struct DispatchCounters {
    queued: AtomicU64,
    sent: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

/// Best-effort, at-most-once notification dispatch for new incidents.
///
/// Messages go onto a bounded queue drained by detached worker tasks. The
/// caller never waits for delivery, and delivery failures are logged and
/// counted but never returned. Workers stop once the dispatcher is dropped
/// and the queue is drained.
pub struct NotificationDispatcher {
    queue_tx: mpsc::Sender<NotificationMessage>,
    source_service: String,
    destination: String,
    counters: Arc<DispatchCounters>,
}

impl NotificationDispatcher {
    /// Build a webhook-backed dispatcher from configuration.
    ///
    /// Must be called from within a tokio runtime.
    pub fn from_config(config: &NotificationConfig) -> Result<Self> {
        let sender = WebhookSender::new(config.url.clone(), config.timeout_secs)?;
        Ok(Self::new(Arc::new(sender), config))
    }

    /// Create a dispatcher around any sender and start its workers
    pub fn new(sender: Arc<dyn NotificationSender>, config: &NotificationConfig) -> Self {
        let (queue_tx, queue_rx) = mpsc::channel(config.queue_size.max(1));
        let queue_rx = Arc::new(Mutex::new(queue_rx));
        let counters = Arc::new(DispatchCounters::default());
        let workers = config.workers.max(1);

        for worker_id in 0..workers {
            spawn_worker(worker_id, queue_rx.clone(), sender.clone(), counters.clone());
        }

        info!(
            destination = %sender.destination(),
            workers,
            queue_size = config.queue_size,
            "Notification dispatcher initialized"
        );

        Self {
            queue_tx,
            source_service: config.source_service.clone(),
            destination: sender.destination().to_string(),
            counters,
        }
    }

    /// Queue a notification if the incident is severe enough.
    ///
    /// Never blocks and never fails; returns whether a message was queued.
    pub fn maybe_notify(&self, incident: &Incident) -> bool {
        if !incident.severity.should_notify() {
            return false;
        }

        let message = NotificationMessage::for_new_incident(incident, &self.source_service);

        match self.queue_tx.try_send(message) {
            Ok(()) => {
                self.counters.queued.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(TrySendError::Full(message)) => {
                self.record_drop(&message, "queue full");
                false
            }
            Err(TrySendError::Closed(message)) => {
                self.record_drop(&message, "dispatcher stopped");
                false
            }
        }
    }

    fn record_drop(&self, message: &NotificationMessage, reason: &str) {
        self.counters.dropped.fetch_add(1, Ordering::Relaxed);
        NOTIFICATIONS_TOTAL.with_label_values(&["dropped"]).inc();
        warn!(
            incident_id = message.incident_id,
            reason,
            "Dropping notification"
        );
    }

    /// Where notifications are delivered
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Snapshot of delivery counters
    pub fn stats(&self) -> NotificationStats {
        NotificationStats {
            queued: self.counters.queued.load(Ordering::Relaxed),
            sent: self.counters.sent.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
        }
    }
}

fn spawn_worker(
    worker_id: usize,
    queue_rx: Arc<Mutex<mpsc::Receiver<NotificationMessage>>>,
    sender: Arc<dyn NotificationSender>,
    counters: Arc<DispatchCounters>,
) {
    tokio::spawn(async move {
        info!(worker_id, "Notification worker started");

        loop {
            // Only the receive is under the lock; delivery runs unlocked
            let next = queue_rx.lock().await.recv().await;
            let Some(message) = next else {
                break;
            };

            match sender.send(&message).await {
                Ok(()) => {
                    counters.sent.fetch_add(1, Ordering::Relaxed);
                    NOTIFICATIONS_TOTAL.with_label_values(&["sent"]).inc();
                    info!(
                        worker_id,
                        incident_id = message.incident_id,
                        "Successfully triggered notification"
                    );
                }
                Err(e) => {
                    counters.failed.fetch_add(1, Ordering::Relaxed);
                    NOTIFICATIONS_TOTAL.with_label_values(&["failed"]).inc();
                    error!(
                        worker_id,
                        incident_id = message.incident_id,
                        destination = %sender.destination(),
                        error = %e,
                        "Notification delivery failed"
                    );
                }
            }
        }

        info!(worker_id, "Notification worker stopped");
    });
}
