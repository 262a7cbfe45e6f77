//! # Widget Client
//!
//! Provides a high‑level API for driving the widget actor.
//! Each method sends one request and waits for the actor's reply.
use crate::model::{CreatedOrder, OrderId, OrderStatus, TopupRequest};
use crate::widget_actor::{PollOutcome, PollState, Response, WidgetError, WidgetRequest};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

/// Cloneable handle to the widget actor.
///
/// The actor shuts down once every clone has been dropped.
#[derive(Clone)]
pub struct WidgetClient {
    sender: mpsc::Sender<WidgetRequest>,
}

impl WidgetClient {
    pub fn new(sender: mpsc::Sender<WidgetRequest>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(Response<T>) -> WidgetRequest,
    ) -> Result<T, WidgetError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(make(respond_to))
            .await
            .map_err(|_| WidgetError::ActorClosed)?;
        response.await.map_err(|_| WidgetError::ActorDropped)?
    }

    /// Re-adopts the persisted order and renders its status once.
    ///
    /// Returns `None` when no order was ever persisted.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> Result<Option<OrderStatus>, WidgetError> {
        debug!("Sending request");
        self.request(|respond_to| WidgetRequest::Restore { respond_to })
            .await
    }

    /// Creates an order paid with QRIS and starts polling it.
    #[instrument(skip(self))]
    pub async fn create_order(
        &self,
        phone: &str,
        provider: &str,
        nominal: &str,
    ) -> Result<CreatedOrder, WidgetError> {
        self.create_order_with(TopupRequest::new(phone, provider, nominal))
            .await
    }

    /// Creates an order from a full request and starts polling it.
    #[instrument(skip(self))]
    pub async fn create_order_with(
        &self,
        request: TopupRequest,
    ) -> Result<CreatedOrder, WidgetError> {
        debug!("Sending request");
        self.request(|respond_to| WidgetRequest::CreateOrder {
            request,
            respond_to,
        })
        .await
    }

    /// Starts polling the tracked order.
    ///
    /// Returns `false` (and does nothing) when no order is tracked.
    #[instrument(skip(self))]
    pub async fn poll(&self) -> Result<bool, WidgetError> {
        self.request(|respond_to| WidgetRequest::Poll { respond_to })
            .await
    }

    #[instrument(skip(self))]
    pub async fn close_panel(&self) -> Result<(), WidgetError> {
        self.request(|respond_to| WidgetRequest::ClosePanel { respond_to })
            .await
    }

    /// Shows the panel again, or fails with [`WidgetError::NoTransaction`].
    #[instrument(skip(self))]
    pub async fn reopen_panel(&self) -> Result<(), WidgetError> {
        self.request(|respond_to| WidgetRequest::ReopenPanel { respond_to })
            .await
    }

    pub async fn current_order(&self) -> Result<Option<OrderId>, WidgetError> {
        self.request(|respond_to| WidgetRequest::CurrentOrder { respond_to })
            .await
    }

    pub async fn poll_state(&self) -> Result<PollState, WidgetError> {
        self.request(|respond_to| WidgetRequest::PollState { respond_to })
            .await
    }

    /// Stops the live poll loop, returning how it ended.
    #[instrument(skip(self))]
    pub async fn stop_polling(&self) -> Result<Option<PollOutcome>, WidgetError> {
        self.request(|respond_to| WidgetRequest::StopPolling { respond_to })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_closed_actor_reports_actor_closed() {
        let (sender, receiver) = mpsc::channel(1);
        drop(receiver);
        let client = WidgetClient::new(sender);

        assert_eq!(client.poll().await, Err(WidgetError::ActorClosed));
    }

    #[tokio::test]
    async fn test_dropped_reply_reports_actor_dropped() {
        let (sender, mut receiver) = mpsc::channel(1);
        let client = WidgetClient::new(sender);

        let call = tokio::spawn(async move { client.current_order().await });
        match receiver.recv().await {
            Some(WidgetRequest::CurrentOrder { respond_to }) => drop(respond_to),
            other => panic!("Expected CurrentOrder request, got {other:?}"),
        }

        assert_eq!(call.await.unwrap(), Err(WidgetError::ActorDropped));
    }

    #[tokio::test]
    async fn test_create_order_sends_qris_request() {
        let (sender, mut receiver) = mpsc::channel(1);
        let client = WidgetClient::new(sender);

        let call = tokio::spawn(async move { client.create_order("0811", "X", "10000").await });
        let Some(WidgetRequest::CreateOrder {
            request,
            respond_to,
        }) = receiver.recv().await
        else {
            panic!("Expected CreateOrder request");
        };
        assert_eq!(request, TopupRequest::new("0811", "X", "10000"));
        assert_eq!(request.method.as_str(), "QRIS");
        respond_to
            .send(Ok(CreatedOrder::new("A1", "http://pay/A1")))
            .unwrap();

        assert_eq!(call.await.unwrap().unwrap().id, OrderId::new("A1"));
    }
}
