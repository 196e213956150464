// Backend health polling
//
// One probe at startup, then one per interval. The probe is bounded by the
// configured health timeout; any non-2xx, transport failure or timeout
// counts as offline.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::http::ApiClient;
use super::models::BackendHealth;

/// Single bounded probe of the health route. Never fails.
pub async fn check_backend_health(client: &ApiClient) -> bool {
    let config = client.config();
    log::debug!("[Health] Checking backend health...");

    match client
        .probe(&config.routes.health, config.health_timeout())
        .await
    {
        Ok(status) => {
            log::debug!("[Health] Backend health check status: {}", status);
            status.is_success()
        }
        Err(e) => {
            log::warn!("[Health] Backend health check failed: {}", e);
            false
        }
    }
}

/// Owns the only polling timer; dropping it cancels the timer.
pub struct HealthPoller {
    handle: JoinHandle<()>,
    status: watch::Receiver<BackendHealth>,
}

impl HealthPoller {
    /// Start polling with the client's configured interval.
    pub fn spawn(client: ApiClient) -> Self {
        let interval = client.config().health_interval();
        Self::spawn_with_interval(client, interval)
    }

    pub fn spawn_with_interval(client: ApiClient, interval: Duration) -> Self {
        let (tx, status) = watch::channel(BackendHealth::Checking);
        let period = interval.max(Duration::from_millis(1));

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // A slow probe pushes the next one back instead of bunching them up
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let health = if check_backend_health(&client).await {
                    BackendHealth::Online
                } else {
                    BackendHealth::Offline
                };

                let previous = tx.send_replace(health);
                if previous != health {
                    log::info!("[Health] Backend {} -> {}", previous, health);
                }
            }
        });

        Self { handle, status }
    }

    pub fn status(&self) -> BackendHealth {
        *self.status.borrow()
    }

    /// Receiver notified on every probe result
    pub fn subscribe(&self) -> watch::Receiver<BackendHealth> {
        self.status.clone()
    }

    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for HealthPoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
