use std::{sync::Arc, time::Duration};
use tokio::sync::oneshot;
use tracing::warn;

use crate::api::DashboardApi;

/// Host side of the readiness signal: hands the API to a waiting dashboard.
#[derive(Debug)]
pub struct ApiProvider(oneshot::Sender<Arc<dyn DashboardApi>>);

impl ApiProvider {
    /// Returns `false` if the dashboard already stopped waiting.
    pub fn provide(self, api: Arc<dyn DashboardApi>) -> bool {
        self.0.send(api).is_ok()
    }
}

/// Dashboard side of the readiness signal.
#[derive(Debug)]
pub struct ApiReady(oneshot::Receiver<Arc<dyn DashboardApi>>);

pub fn api_ready_channel() -> (ApiProvider, ApiReady) {
    let (tx, rx) = oneshot::channel();
    (ApiProvider(tx), ApiReady(rx))
}

impl ApiReady {
    /// A signal that is already satisfied.
    pub fn immediate(api: Arc<dyn DashboardApi>) -> Self {
        let (provider, ready) = api_ready_channel();
        provider.provide(api);
        ready
    }

    /// Wait for the API, giving up after `timeout` or when the provider is dropped.
    pub async fn wait(self, timeout: Duration) -> Option<Arc<dyn DashboardApi>> {
        match tokio::time::timeout(timeout, self.0).await {
            Ok(Ok(api)) => Some(api),
            Ok(Err(_)) => {
                warn!("dashboard API provider went away before providing an API");
                None
            }
            Err(_) => {
                warn!(?timeout, "dashboard API was not ready in time");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::backend::BackendApi;

    fn api() -> Arc<dyn DashboardApi> {
        Arc::new(BackendApi::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_signal_resolves() {
        let ready = ApiReady::immediate(api());
        assert!(ready.wait(Duration::from_secs(5)).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn late_provider_within_timeout_resolves() {
        let (provider, ready) = api_ready_channel();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            provider.provide(api());
        });
        assert!(ready.wait(Duration::from_secs(5)).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_without_provider() {
        let (_provider, ready) = api_ready_channel();
        assert!(ready.wait(Duration::from_secs(5)).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_provider_resolves_to_none() {
        let (provider, ready) = api_ready_channel();
        drop(provider);
        assert!(ready.wait(Duration::from_secs(5)).await.is_none());
    }
}
