//! Command execution against the pet services
//!
//! [`CommandExecutor::execute`] is total: every outcome, including
//! timeouts and refused connections, comes back as a [`CommandResult`].
//! Exactly one HTTP call is made per command and nothing is retried.

use serde_json::Value;
use std::time::Duration;

use crate::command::{Command, CommandResult};
use crate::common::Result;
use crate::router::ServiceRouter;

/// Executes commands one at a time against routed endpoints
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    client: reqwest::Client,
    router: ServiceRouter,
}

impl CommandExecutor {
    /// Create an executor whose calls are each bounded by `timeout`
    pub fn new(router: ServiceRouter, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pet-query-runner/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, router })
    }

    /// Execute one command
    pub async fn execute(&self, command: Command) -> CommandResult {
        let success = command.success_status();

        let request = match &command {
            Command::Query {
                store,
                field,
                value,
            } => {
                let Some(endpoint) = self.router.store(*store) else {
                    tracing::warn!("No service for store {}, skipping call", store);
                    return CommandResult::transport_failure();
                };
                self.client
                    .get(endpoint.url("/pet-types"))
                    .query(&[(field.as_str(), value.as_str())])
            }
            Command::Purchase { payload } => self
                .client
                .post(self.router.orders().url("/purchases"))
                .json(payload),
        };

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("{} failed: {}", command.kind(), e);
                return CommandResult::transport_failure();
            }
        };

        let status = response.status().as_u16();
        if status != success {
            tracing::debug!("{} returned {}", command.kind(), status);
            return CommandResult::failure(status);
        }

        match response.json::<Value>().await {
            Ok(payload) => CommandResult::success(status, payload),
            Err(e) => {
                tracing::warn!("{} returned an unreadable body: {}", command.kind(), e);
                CommandResult::transport_failure()
            }
        }
    }
}
