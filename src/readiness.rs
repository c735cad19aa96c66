//! Startup health check
//!
//! The only retrying step of a run: every store is probed with `GET /`
//! until all of them answer 200, or the attempt budget runs out.

use std::time::Duration;

use crate::common::config::ReadinessConfig;
use crate::common::{Error, Result};
use crate::router::ServiceRouter;

/// Poll the stores until all are healthy
///
/// Returns the number of the attempt that succeeded.
pub async fn wait_for_services(
    client: &reqwest::Client,
    router: &ServiceRouter,
    config: &ReadinessConfig,
    probe_timeout: Duration,
) -> Result<u32> {
    for attempt in 1..=config.max_attempts {
        if all_healthy(client, router, probe_timeout).await {
            tracing::info!("Services ready after {} attempt(s)", attempt);
            return Ok(attempt);
        }
        tracing::debug!("Services not ready (attempt {}/{})", attempt, config.max_attempts);
        tokio::time::sleep(config.interval()).await;
    }

    Err(Error::ServicesUnavailable {
        attempts: config.max_attempts,
    })
}

async fn all_healthy(client: &reqwest::Client, router: &ServiceRouter, timeout: Duration) -> bool {
    for (id, endpoint) in router.stores() {
        let probe = client.get(endpoint.url("/")).timeout(timeout).send().await;
        match probe {
            Ok(response) if response.status() == reqwest::StatusCode::OK => {}
            Ok(response) => {
                tracing::debug!("Store {} answered {}", id, response.status());
                return false;
            }
            Err(e) => {
                tracing::debug!("Store {} unreachable: {}", id, e);
                return false;
            }
        }
    }
    true
}
