//! Recurring trigger: a cron loop running as a background tokio task.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::cron;

/// One independently scheduled recurring trigger.
///
/// The callback is the unit of work for a tick. Any error it returns is
/// caught and logged here; a failed tick never disables future ticks. A
/// [`Ticker::stop`] takes effect at the next scheduled occurrence, never
/// mid-flight.
pub struct Ticker {
    name: String,
    expression: String,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn new(name: &str, expression: &str) -> Self {
        Self {
            name: name.to_string(),
            expression: expression.to_string(),
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// Spawn the cron loop. Calling start on an already-started ticker is a
    /// no-op.
    pub fn start<F, Fut>(&mut self, callback: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = commish_core::Result<()>> + Send,
    {
        if self.handle.is_some() {
            tracing::warn!("Ticker '{}' already started", self.name);
            return;
        }
        self.running.store(true, Ordering::SeqCst);

        let name = self.name.clone();
        let expression = self.expression.clone();
        let running = Arc::clone(&self.running);

        self.handle = Some(tokio::spawn(async move {
            tracing::info!("⏰ Ticker '{name}' started ({expression})");
            loop {
                let Some(next) = cron::next_run_after(&expression, Utc::now()) else {
                    tracing::error!(
                        "Ticker '{name}': no next fire time for '{expression}', giving up"
                    );
                    running.store(false, Ordering::SeqCst);
                    break;
                };

                let wait = (next - Utc::now())
                    .to_std()
                    .unwrap_or(std::time::Duration::ZERO);
                tokio::time::sleep(wait).await;

                // Stop requests land here, at the occurrence boundary.
                if !running.load(Ordering::SeqCst) {
                    tracing::info!("Ticker '{name}' stopped");
                    break;
                }

                tracing::debug!("Ticker '{name}' fired");
                if let Err(e) = callback().await {
                    tracing::error!("⚠️ Ticker '{name}' tick failed: {e}");
                }
            }
        }));
    }

    /// Request a stop. Effective at the next scheduled occurrence; idempotent.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// A cloneable handle that can stop this ticker from elsewhere.
    pub fn handle(&self) -> TickerHandle {
        TickerHandle {
            running: Arc::clone(&self.running),
        }
    }
}

/// Stop handle detached from the [`Ticker`] that owns the loop.
#[derive(Clone)]
pub struct TickerHandle {
    running: Arc<AtomicBool>,
}

impl TickerHandle {
    /// Request a stop. Effective at the next scheduled occurrence; idempotent.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
