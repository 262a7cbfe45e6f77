//! # Poll Loop
//!
//! Repeatedly fetches the status of one order and renders it into the panel
//! until the order is paid.
//!
//! Each loop runs in its own task and owns the identifier it was started for.
//! It is stopped through a [`PollHandle`]; cancellation is observed both while
//! a fetch is in flight and while waiting for the next tick.
//!
//! A failed fetch does not end the loop. The error is shown as the panel alert
//! and the fetch is retried with exponential backoff; after a success the
//! regular cadence resumes.

use crate::clients::{ApiError, OrderApi};
use crate::model::{OrderId, OrderStatus};
use crate::panel::Panel;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Instrument};

/// Timing and retry policy of the poll loop.
#[derive(Debug, Clone, PartialEq)]
pub struct PollConfig {
    /// Delay between successful status checks.
    pub interval: Duration,
    /// Delay before the first retry after a failed check.
    pub initial_backoff: Duration,
    /// Upper bound for the retry delay.
    pub max_backoff: Duration,
    /// Consecutive failures after which the loop gives up. `0` never gives up.
    pub max_consecutive_failures: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(5000),
            initial_backoff: Duration::from_millis(1000),
            max_backoff: Duration::from_millis(30_000),
            max_consecutive_failures: 10,
        }
    }
}

impl PollConfig {
    /// Retry delay after `failures` consecutive failed checks (`failures >= 1`).
    pub fn backoff(&self, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1).min(20);
        self.initial_backoff
            .saturating_mul(1u32 << exponent)
            .min(self.max_backoff)
    }
}

/// How a poll loop ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The backend reported the order as paid.
    Paid(OrderStatus),
    /// The loop was stopped from outside.
    Cancelled,
    /// Too many consecutive checks failed; carries the last error.
    GaveUp(ApiError),
}

/// Handle to a running poll loop.
///
/// Dropping the handle does not stop the loop; call [`PollHandle::stop`].
pub struct PollHandle {
    order_id: OrderId,
    token: CancellationToken,
    task: JoinHandle<PollOutcome>,
}

impl PollHandle {
    /// Spawns a poll loop for `order_id`. The first check happens immediately.
    pub fn spawn(
        order_id: OrderId,
        api: Arc<dyn OrderApi>,
        panel: Panel,
        config: PollConfig,
    ) -> Self {
        let token = CancellationToken::new();
        let span = tracing::info_span!("poll_loop", order_id = %order_id);
        let task = tokio::spawn(
            run_poll_loop(order_id.clone(), api, panel, config, token.clone()).instrument(span),
        );
        Self {
            order_id,
            token,
            task,
        }
    }

    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancels the loop and waits for it to exit.
    ///
    /// A loop that already finished reports its real outcome.
    pub async fn stop(self) -> PollOutcome {
        self.token.cancel();
        self.join().await
    }

    /// Waits for the loop to end on its own.
    pub async fn join(self) -> PollOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(order_id = %self.order_id, error = %e, "Poll task aborted");
                PollOutcome::Cancelled
            }
        }
    }
}

async fn run_poll_loop(
    order_id: OrderId,
    api: Arc<dyn OrderApi>,
    panel: Panel,
    config: PollConfig,
    token: CancellationToken,
) -> PollOutcome {
    info!(interval_ms = config.interval.as_millis() as u64, "Polling started");
    let mut failures: u32 = 0;

    loop {
        let result = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            result = api.fetch_status(&order_id) => result,
        };

        let delay = match result {
            Ok(status) => {
                failures = 0;
                panel.set_status(&status.status);
                if status.is_paid() {
                    info!(status = %status.status, "Order paid, polling stopped");
                    return PollOutcome::Paid(status);
                }
                debug!(status = %status.status, "Not paid yet");
                config.interval
            }
            Err(e) => {
                failures += 1;
                panel.alert(format!("Status check failed: {e}"));
                if config.max_consecutive_failures > 0 && failures >= config.max_consecutive_failures
                {
                    warn!(failures, error = %e, "Giving up on status checks");
                    return PollOutcome::GaveUp(e);
                }
                let delay = config.backoff(failures);
                warn!(
                    failures,
                    error = %e,
                    retry_in_ms = delay.as_millis() as u64,
                    "Status check failed"
                );
                delay
            }
        };

        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }
    }

    info!("Polling cancelled");
    PollOutcome::Cancelled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::mock::MockOrderApi;

    fn config() -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(5000),
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(350),
            max_consecutive_failures: 3,
        }
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let config = config();
        assert_eq!(config.backoff(1), Duration::from_millis(100));
        assert_eq!(config.backoff(2), Duration::from_millis(200));
        assert_eq!(config.backoff(3), Duration::from_millis(350));
        assert_eq!(config.backoff(u32::MAX), Duration::from_millis(350));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_when_paid() {
        let mock = MockOrderApi::new();
        mock.expect_status("A1").return_ok(OrderStatus::new("pending"));
        mock.expect_status("A1").return_ok(OrderStatus::new("Paid"));
        let panel = Panel::new();

        let handle = PollHandle::spawn(
            OrderId::new("A1"),
            Arc::new(mock.clone()),
            panel.clone(),
            config(),
        );
        let outcome = handle.join().await;

        assert_eq!(outcome, PollOutcome::Paid(OrderStatus::new("Paid")));
        assert_eq!(
            panel.snapshot().status_text.as_deref(),
            Some("Status: Paid")
        );
        mock.verify();
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_interval_between_checks() {
        let mock = MockOrderApi::new();
        mock.expect_status("A1").return_ok(OrderStatus::new("pending"));
        mock.expect_status("A1").return_ok(OrderStatus::new("pending"));
        let panel = Panel::new();

        let handle = PollHandle::spawn(OrderId::new("A1"), Arc::new(mock.clone()), panel, config());

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(mock.status_calls(), 1);

        tokio::time::sleep(Duration::from_millis(4980)).await;
        assert_eq!(mock.status_calls(), 1);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(mock.status_calls(), 2);

        assert_eq!(handle.stop().await, PollOutcome::Cancelled);
        mock.verify();
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_retried_with_backoff() {
        let mock = MockOrderApi::new();
        mock.expect_status("A1")
            .return_err(ApiError::Transport("connection refused".into()));
        mock.expect_status("A1").return_ok(OrderStatus::new("PAID"));
        let panel = Panel::new();
        let mut rx = panel.subscribe();

        let handle = PollHandle::spawn(
            OrderId::new("A1"),
            Arc::new(mock.clone()),
            panel.clone(),
            config(),
        );

        rx.changed().await.unwrap();
        let alert = rx.borrow_and_update().alert.clone();
        assert!(alert.unwrap().contains("connection refused"));

        let started = tokio::time::Instant::now();
        let outcome = handle.join().await;
        assert_eq!(outcome, PollOutcome::Paid(OrderStatus::new("PAID")));
        assert!(started.elapsed() >= Duration::from_millis(90));
        assert!(started.elapsed() < Duration::from_millis(5000));
        assert_eq!(panel.snapshot().alert, None);
        mock.verify();
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_consecutive_failures() {
        let mock = MockOrderApi::new();
        for _ in 0..3 {
            mock.expect_status("A1").return_err(ApiError::Status {
                code: 500,
                detail: "boom".into(),
            });
        }

        let handle = PollHandle::spawn(
            OrderId::new("A1"),
            Arc::new(mock.clone()),
            Panel::new(),
            config(),
        );

        assert!(matches!(
            handle.join().await,
            PollOutcome::GaveUp(ApiError::Status { code: 500, .. })
        ));
        mock.verify();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_while_fetch_in_flight() {
        let mock = MockOrderApi::new();
        mock.expect_status("A1")
            .after(Duration::from_secs(60))
            .return_ok(OrderStatus::new("PAID"));
        let panel = Panel::new();

        let handle = PollHandle::spawn(
            OrderId::new("A1"),
            Arc::new(mock.clone()),
            panel.clone(),
            config(),
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(mock.status_calls(), 1);

        assert_eq!(handle.stop().await, PollOutcome::Cancelled);
        assert_eq!(panel.snapshot().status_text, None);
    }
}
