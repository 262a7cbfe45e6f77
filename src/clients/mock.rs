//! # Mock Order API
//!
//! An in-memory [`OrderApi`] with expectation tracking, for testing the widget
//! without a backend.
//!
//! | Feature | MockOrderApi | HttpOrderApi |
//! |---------|--------------|--------------|
//! | **Speed** | Instant (in-memory) | Network round trip |
//! | **Determinism** | Scripted responses | Depends on the backend |
//! | **Error Injection** | Easy (`return_err`) | Hard |
//!
//! Expectations are consumed in order. A request that does not match the next
//! expectation is answered with a transport error and recorded, so
//! [`MockOrderApi::verify`] can fail the test afterwards instead of panicking
//! inside a background task.
//!
//! ```rust
//! use std::sync::Arc;
//! use topup_widget::clients::mock::MockOrderApi;
//! use topup_widget::clients::OrderApi;
//! use topup_widget::model::{CreatedOrder, OrderId, OrderStatus, TopupRequest};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mock = MockOrderApi::new();
//!     mock.expect_create().return_ok(CreatedOrder::new("A1", "http://pay/A1"));
//!     mock.expect_status("A1").return_ok(OrderStatus::new("PAID"));
//!
//!     let api: Arc<dyn OrderApi> = Arc::new(mock.clone());
//!     let created = api.create_order(&TopupRequest::new("0811", "X", "10000")).await.unwrap();
//!     let status = api.fetch_status(&created.id).await.unwrap();
//!     assert!(status.is_paid());
//!
//!     mock.verify();
//! }
//! ```

use crate::clients::order_api::{ApiError, OrderApi};
use crate::model::{CreatedOrder, OrderId, OrderStatus, TopupRequest};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

enum Expectation {
    Create {
        delay: Option<Duration>,
        response: Result<CreatedOrder, ApiError>,
    },
    Status {
        id: OrderId,
        delay: Option<Duration>,
        response: Result<OrderStatus, ApiError>,
    },
}

/// A request observed by the mock.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Create(TopupRequest),
    Status(OrderId),
}

#[derive(Default)]
struct MockState {
    expectations: VecDeque<Expectation>,
    calls: Vec<MockCall>,
    unexpected: Vec<String>,
}

/// Scripted [`OrderApi`]. Clones share the same script.
#[derive(Clone, Default)]
pub struct MockOrderApi {
    state: Arc<Mutex<MockState>>,
}

impl MockOrderApi {
    /// Creates a mock with no expectations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects a `create_order` call.
    pub fn expect_create(&self) -> CreateExpectationBuilder {
        CreateExpectationBuilder {
            delay: None,
            state: self.state.clone(),
        }
    }

    /// Expects a `fetch_status` call for `id`.
    pub fn expect_status(&self, id: impl Into<OrderId>) -> StatusExpectationBuilder {
        StatusExpectationBuilder {
            id: id.into(),
            delay: None,
            state: self.state.clone(),
        }
    }

    /// Every request received so far, in arrival order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of status fetches received so far.
    pub fn status_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, MockCall::Status(_)))
            .count()
    }

    /// Number of expectations not yet consumed.
    pub fn remaining(&self) -> usize {
        self.state.lock().unwrap().expectations.len()
    }

    /// Verifies that all expectations were met and nothing unexpected arrived.
    pub fn verify(&self) {
        let state = self.state.lock().unwrap();
        if !state.unexpected.is_empty() {
            panic!("Unexpected requests: {:?}", state.unexpected);
        }
        if !state.expectations.is_empty() {
            panic!(
                "Not all expectations were met. {} remaining",
                state.expectations.len()
            );
        }
    }

    fn unexpected(state: &mut MockState, what: String) -> ApiError {
        let err = ApiError::Transport(format!("unexpected request: {what}"));
        state.unexpected.push(what);
        err
    }
}

#[async_trait]
impl OrderApi for MockOrderApi {
    async fn create_order(&self, request: &TopupRequest) -> Result<CreatedOrder, ApiError> {
        let (delay, response) = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(MockCall::Create(request.clone()));
            match state.expectations.pop_front() {
                Some(Expectation::Create { delay, response }) => (delay, response),
                Some(other) => {
                    state.expectations.push_front(other);
                    (None, Err(Self::unexpected(&mut state, format!("create {request:?}"))))
                }
                None => (None, Err(Self::unexpected(&mut state, format!("create {request:?}")))),
            }
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        response
    }

    async fn fetch_status(&self, id: &OrderId) -> Result<OrderStatus, ApiError> {
        let (delay, response) = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(MockCall::Status(id.clone()));
            match state.expectations.pop_front() {
                Some(Expectation::Status {
                    id: expected,
                    delay,
                    response,
                }) if &expected == id => (delay, response),
                Some(other) => {
                    state.expectations.push_front(other);
                    (None, Err(Self::unexpected(&mut state, format!("status {id}"))))
                }
                None => (None, Err(Self::unexpected(&mut state, format!("status {id}")))),
            }
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        response
    }
}

/// Builder for `create_order` expectations.
pub struct CreateExpectationBuilder {
    delay: Option<Duration>,
    state: Arc<Mutex<MockState>>,
}

impl CreateExpectationBuilder {
    /// Holds the response back for `delay`.
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, created: CreatedOrder) {
        self.push(Ok(created));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: ApiError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<CreatedOrder, ApiError>) {
        self.state
            .lock()
            .unwrap()
            .expectations
            .push_back(Expectation::Create {
                delay: self.delay,
                response,
            });
    }
}

/// Builder for `fetch_status` expectations.
pub struct StatusExpectationBuilder {
    id: OrderId,
    delay: Option<Duration>,
    state: Arc<Mutex<MockState>>,
}

impl StatusExpectationBuilder {
    /// Holds the response back for `delay`.
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, status: OrderStatus) {
        self.push(Ok(status));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: ApiError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<OrderStatus, ApiError>) {
        self.state
            .lock()
            .unwrap()
            .expectations
            .push_back(Expectation::Status {
                id: self.id,
                delay: self.delay,
                response,
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_consumes_in_order() {
        let mock = MockOrderApi::new();
        mock.expect_create()
            .return_ok(CreatedOrder::new("A1", "http://pay/A1"));
        mock.expect_status("A1").return_ok(OrderStatus::new("pending"));

        let created = mock
            .create_order(&TopupRequest::new("0811", "X", "10000"))
            .await
            .unwrap();
        assert_eq!(created.id, OrderId::new("A1"));

        let status = mock.fetch_status(&created.id).await.unwrap();
        assert_eq!(status.status, "pending");

        assert_eq!(mock.status_calls(), 1);
        mock.verify();
    }

    #[tokio::test]
    #[should_panic(expected = "Unexpected requests")]
    async fn test_mismatched_request_is_recorded() {
        let mock = MockOrderApi::new();
        mock.expect_status("A1").return_ok(OrderStatus::new("pending"));

        let result = mock.fetch_status(&OrderId::new("B2")).await;
        assert!(matches!(result, Err(ApiError::Transport(_))));
        assert_eq!(mock.remaining(), 1);

        mock.verify();
    }
}
