//! Feed connector supervision
//!
//! Runs every connector on its own task and restarts sessions with
//! exponential backoff. One connector failing never stops the others.

use crate::config::SupervisorConfig;
use crate::feed::{Exchange, FeedConnector};
use crate::price::SampleSink;
use crate::telemetry;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

/// Restart policy for connector sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Consecutive failed connects before giving up (0 = infinite)
    pub max_attempts: u32,
    /// Minimum session lifetime that resets the backoff
    pub stable_session: Duration,
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self::from(&SupervisorConfig::default())
    }
}

impl From<&SupervisorConfig> for RestartPolicy {
    fn from(config: &SupervisorConfig) -> Self {
        Self {
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            max_attempts: config.max_attempts,
            stable_session: Duration::from_millis(config.stable_session_ms),
        }
    }
}

/// Exponential reconnect delay.
///
/// Only a session that stayed up for `stable_session` brings the delay back
/// to `initial_delay`; a venue that accepts and then drops at once keeps
/// backing off.
#[derive(Debug, Clone, Copy)]
struct Backoff {
    policy: RestartPolicy,
    delay: Duration,
}

impl Backoff {
    fn new(policy: RestartPolicy) -> Self {
        Self {
            policy,
            delay: policy.initial_delay,
        }
    }

    /// Account for a session that connected and lived for `lifetime`
    fn session_ended(&mut self, lifetime: Duration) {
        if lifetime >= self.policy.stable_session {
            self.delay = self.policy.initial_delay;
        }
    }

    /// Delay to sleep now; the following one doubles up to `max_delay`
    fn next_delay(&mut self) -> Duration {
        let delay = self.delay;
        self.delay = (delay * 2).min(self.policy.max_delay);
        delay
    }
}

/// Why a connector task stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorExit {
    /// Shutdown was requested
    Cancelled,
    /// Too many consecutive connect failures
    GaveUp { attempts: u32 },
}

/// Owns the connector tasks
pub struct Supervisor {
    connectors: Vec<Arc<dyn FeedConnector>>,
    sink: Arc<dyn SampleSink>,
    policy: RestartPolicy,
    shutdown: CancellationToken,
}

impl Supervisor {
    pub fn new(sink: Arc<dyn SampleSink>, policy: RestartPolicy) -> Self {
        Self {
            connectors: Vec::new(),
            sink,
            policy,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_connector(mut self, connector: Arc<dyn FeedConnector>) -> Self {
        self.connectors.push(connector);
        self
    }

    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }

    /// Token that stops every connector when cancelled
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Run until every connector has stopped
    pub async fn run(self) -> Vec<(Exchange, ConnectorExit)> {
        let mut tasks = JoinSet::new();

        for connector in self.connectors {
            let sink = self.sink.clone();
            let policy = self.policy;
            let shutdown = self.shutdown.clone();
            tasks.spawn(async move {
                let exchange = connector.exchange();
                let exit = supervise(connector, sink, policy, shutdown).await;
                (exchange, exit)
            });
        }

        let mut exits = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((exchange, exit)) => {
                    tracing::info!(exchange = %exchange, ?exit, "Connector stopped");
                    exits.push((exchange, exit));
                }
                Err(e) => tracing::error!(error = %e, "Connector task panicked"),
            }
        }
        exits
    }
}

async fn supervise(
    connector: Arc<dyn FeedConnector>,
    sink: Arc<dyn SampleSink>,
    policy: RestartPolicy,
    shutdown: CancellationToken,
) -> ConnectorExit {
    let exchange = connector.exchange();
    let mut failures = 0u32;
    let mut backoff = Backoff::new(policy);

    loop {
        tracing::info!(exchange = %exchange, "Starting feed session");

        let started = Instant::now();
        let result = tokio::select! {
            biased;
            () = shutdown.cancelled() => return ConnectorExit::Cancelled,
            result = connector.run(sink.clone()) => result,
        };

        match result {
            Ok(()) => {
                tracing::info!(exchange = %exchange, "Feed session ended");
                failures = 0;
                backoff.session_ended(started.elapsed());
            }
            Err(e) if e.was_connected() => {
                let lifetime = started.elapsed();
                tracing::warn!(
                    exchange = %exchange,
                    error = %e,
                    lifetime_ms = lifetime.as_millis() as u64,
                    "Feed session dropped"
                );
                failures = 0;
                backoff.session_ended(lifetime);
            }
            Err(e) => {
                failures += 1;
                tracing::warn!(
                    exchange = %exchange,
                    error = %e,
                    attempt = failures,
                    "Feed connect failed"
                );

                // 0 = infinite
                if policy.max_attempts > 0 && failures >= policy.max_attempts {
                    tracing::error!(exchange = %exchange, "Max reconnection attempts reached");
                    return ConnectorExit::GaveUp { attempts: failures };
                }
            }
        }

        telemetry::record_reconnect(exchange);
        let delay = backoff.next_delay();
        tracing::debug!(exchange = %exchange, delay_ms = delay.as_millis() as u64, "Reconnecting");
        tokio::select! {
            biased;
            () = shutdown.cancelled() => return ConnectorExit::Cancelled,
            () = sleep(delay) => {}
        }
    }
}
