pub mod account_watcher;

use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::Duration;
use tracing::info;

use crate::application::services::SessionBridge;

pub use self::account_watcher::AccountWatcher;

/// Owns the background tasks of the gateway process.
pub struct WorkerManager {
    account_watcher: Option<AccountWatcher>,
    running: bool,
}

impl WorkerManager {
    pub fn new() -> Self {
        Self {
            account_watcher: None,
            running: false,
        }
    }

    /// Start the account watcher when `account_poll_interval` is set.
    pub fn start(&mut self, bridge: Arc<RwLock<SessionBridge>>, account_poll_interval: Option<Duration>) {
        if self.running {
            return;
        }

        self.running = true;
        info!("Starting worker manager...");

        match account_poll_interval {
            Some(every) => self.account_watcher = Some(AccountWatcher::start(bridge, every)),
            None => info!("Account watcher disabled (ACCOUNT_POLL_SECS=0)"),
        }
    }

    pub async fn stop(&mut self) {
        if !self.running {
            return;
        }

        self.running = false;
        info!("Stopping worker manager...");

        if let Some(mut watcher) = self.account_watcher.take() {
            watcher.stop().await;
        }

        info!("Worker manager stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn watcher_running(&self) -> bool {
        self.account_watcher.as_ref().is_some_and(AccountWatcher::is_running)
    }
}

impl Default for WorkerManager {
    fn default() -> Self {
        Self::new()
    }
}
