use crate::logger::{ self, LogTag };
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Waits for either the given duration or a shutdown signal.
/// Returns true if shutdown was signaled, false if timeout completed.
pub async fn check_shutdown_or_delay(shutdown: &Notify, duration: Duration) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(duration) => false,
        _ = shutdown.notified() => true,
    }
}

/// Handle to a periodic background sweep
///
/// `stop` signals the task and waits for it to finish. Dropping the handle
/// without calling `stop` aborts the task, so a sweep never outlives its owner.
#[derive(Debug)]
pub struct SweepHandle {
    name: &'static str,
    shutdown: Arc<Notify>,
    handle: Option<JoinHandle<()>>,
}

impl SweepHandle {
    /// Signal the sweep to exit and wait for it
    pub async fn stop(mut self) {
        self.shutdown.notify_one();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    logger::error(LogTag::System, &format!("Sweep '{}' panicked: {}", self.name, e));
                }
            }
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map(|h| h.is_finished()).unwrap_or(true)
    }
}

impl Drop for SweepHandle {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Spawn `tick` every `interval` until the returned handle is stopped or dropped
///
/// Must be called from within a tokio runtime.
pub fn spawn_sweep<F, Fut>(name: &'static str, interval: Duration, mut tick: F) -> SweepHandle
    where F: FnMut() -> Fut + Send + 'static, Fut: Future<Output = ()> + Send + 'static
{
    let shutdown = Arc::new(Notify::new());
    let signal = shutdown.clone();

    let handle = tokio::spawn(async move {
        logger::debug(LogTag::System, &format!("Sweep '{}' started ({:?} interval)", name, interval));
        loop {
            if check_shutdown_or_delay(&signal, interval).await {
                logger::debug(LogTag::System, &format!("Sweep '{}' shutting down", name));
                break;
            }
            tick().await;
        }
    });

    SweepHandle { name, shutdown, handle: Some(handle) }
}
