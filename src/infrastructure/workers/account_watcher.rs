use std::sync::Arc;

use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::application::services::SessionBridge;

/// Background poll of the wallet's active account. Stands in for the
/// provider's `accountsChanged` event, which a JSON-RPC wallet cannot push.
pub struct AccountWatcher {
    shutdown: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl AccountWatcher {
    pub fn start(bridge: Arc<RwLock<SessionBridge>>, poll_interval: Duration) -> Self {
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = interval(poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!("Account watcher started, polling every {:?}", poll_interval);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        Self::poll_once(&bridge).await;
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("Account watcher stopped");
        });

        Self {
            shutdown,
            handle: Some(handle),
        }
    }

    async fn poll_once(bridge: &Arc<RwLock<SessionBridge>>) {
        // nothing to watch until the session has connected once
        if bridge.read().await.current_account().is_none() {
            debug!("No session account yet; skipping account poll");
            return;
        }

        match SessionBridge::sync_shared(bridge).await {
            Ok(change) if change.changed() => {
                info!("Session account now {:?}", change.current);
            }
            Ok(_) => {}
            Err(e) => warn!("Account poll failed: {}", e),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub async fn stop(&mut self) {
        let _ = self.shutdown.send(true);
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}
