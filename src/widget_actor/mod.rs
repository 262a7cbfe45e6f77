//! # Widget Actor
//!
//! The controller behind the order status panel. It owns the session (the
//! tracked order identifier and the live poll loop) and processes requests
//! one at a time, so there is exactly one writer of session state.
//!
//! Requests arrive over an mpsc channel from [`WidgetClient`]; each carries a
//! oneshot sender for the reply. Dependencies (order API, storage, panel,
//! poll policy) are injected when the actor is run, not when it is created.
//!
//! ## Session rules
//!
//! - At most one order is tracked. Creating an order replaces it.
//! - At most one poll loop is live. A new order stops the previous loop
//!   before the new order is rendered, so a stale loop can never overwrite
//!   the new order's status.
//! - Closing the panel does not touch the session; polling carries on.
//! - When every client is dropped the actor stops its poll loop and exits.
//!
//! ## Remote calls
//!
//! Creating and restoring an order wait on the backend. Those calls run as
//! separate tasks; the actor keeps serving other requests (closing the panel,
//! querying the session) and applies each result when its task completes.
//! When creations overlap, the most recently requested order wins.

pub mod error;
pub mod poller;

pub use error::*;
pub use poller::{PollConfig, PollHandle, PollOutcome};

use crate::clients::{ApiError, OrderApi, WidgetClient};
use crate::model::{CreatedOrder, OrderId, OrderStatus, TopupRequest};
use crate::panel::Panel;
use crate::storage::SessionStore;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;
use tracing::{debug, info, warn, Instrument};

/// Warning shown when the panel is reopened with nothing to show.
pub const NO_TRANSACTION_MESSAGE: &str = "No transaction yet.";

/// Placeholder status rendered right after an order is created.
pub const PENDING_STATUS: &str = "pending";

/// Type alias for the one-shot response channel used by the actor.
pub type Response<T> = oneshot::Sender<Result<T, WidgetError>>;

/// Messages understood by the widget actor.
#[derive(Debug)]
pub enum WidgetRequest {
    Restore {
        respond_to: Response<Option<OrderStatus>>,
    },
    CreateOrder {
        request: TopupRequest,
        respond_to: Response<CreatedOrder>,
    },
    Poll {
        respond_to: Response<bool>,
    },
    ClosePanel {
        respond_to: Response<()>,
    },
    ReopenPanel {
        respond_to: Response<()>,
    },
    CurrentOrder {
        respond_to: Response<Option<OrderId>>,
    },
    PollState {
        respond_to: Response<PollState>,
    },
    StopPolling {
        respond_to: Response<Option<PollOutcome>>,
    },
}

/// Observable state of the poll loop.
#[derive(Debug, Clone, PartialEq)]
pub enum PollState {
    /// No loop was ever started in this session.
    Idle,
    /// A loop is polling the given order.
    Running(OrderId),
    /// The most recent loop for the given order ended.
    Finished(OrderId, PollOutcome),
}

/// Dependencies injected into the actor at run time.
#[derive(Clone)]
pub struct WidgetContext {
    pub api: Arc<dyn OrderApi>,
    pub store: SessionStore,
    pub panel: Panel,
    pub poll: PollConfig,
}

#[derive(Default)]
struct Session {
    order_id: Option<OrderId>,
    poller: Option<PollHandle>,
    last_outcome: Option<(OrderId, PollOutcome)>,
    /// Sequence number handed to the next create request.
    next_create: u64,
    /// Sequence number of the newest creation applied to the session.
    adopted_create: Option<u64>,
}

/// Result of a backend call that ran outside the receive loop.
enum Completion {
    Created {
        seq: u64,
        result: Result<CreatedOrder, ApiError>,
        respond_to: Response<CreatedOrder>,
    },
    Restored {
        id: OrderId,
        result: Result<OrderStatus, ApiError>,
        respond_to: Response<Option<OrderStatus>>,
    },
}

/// The server half of the widget. Run it with [`WidgetActor::run`].
pub struct WidgetActor {
    receiver: mpsc::Receiver<WidgetRequest>,
    session: Session,
    in_flight: JoinSet<Completion>,
}

/// Creates a new widget actor and its client.
pub fn new() -> (WidgetActor, WidgetClient) {
    WidgetActor::new(32)
}

impl WidgetActor {
    /// Creates the actor and a client connected to it.
    ///
    /// `buffer_size` bounds the request queue; senders wait when it is full.
    pub fn new(buffer_size: usize) -> (Self, WidgetClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            session: Session::default(),
            in_flight: JoinSet::new(),
        };
        (actor, WidgetClient::new(sender))
    }

    /// Processes requests until every client has been dropped.
    pub async fn run(mut self, ctx: WidgetContext) {
        info!(entity_type = "Widget", "Actor started");

        loop {
            tokio::select! {
                msg = self.receiver.recv() => match msg {
                    Some(msg) => self.handle(msg, &ctx).await,
                    None => break,
                },
                Some(done) = self.in_flight.join_next(), if !self.in_flight.is_empty() => {
                    match done {
                        Ok(completion) => self.complete(completion, &ctx).await,
                        Err(e) => warn!(error = %e, "Backend call task failed"),
                    }
                }
            }
        }

        self.in_flight.shutdown().await;
        self.stop_polling().await;
        info!(
            entity_type = "Widget",
            order_id = ?self.session.order_id,
            "Shutdown"
        );
    }

    async fn handle(&mut self, msg: WidgetRequest, ctx: &WidgetContext) {
        match msg {
            WidgetRequest::Restore { respond_to } => self.begin_restore(respond_to, ctx).await,
            WidgetRequest::CreateOrder {
                request,
                respond_to,
            } => self.begin_create(request, respond_to, ctx),
            WidgetRequest::Poll { respond_to } => {
                let result = self.poll(ctx).await;
                let _ = respond_to.send(Ok(result));
            }
            WidgetRequest::ClosePanel { respond_to } => {
                debug!("Close panel");
                ctx.panel.hide();
                let _ = respond_to.send(Ok(()));
            }
            WidgetRequest::ReopenPanel { respond_to } => {
                let _ = respond_to.send(self.reopen_panel(ctx));
            }
            WidgetRequest::CurrentOrder { respond_to } => {
                let _ = respond_to.send(Ok(self.session.order_id.clone()));
            }
            WidgetRequest::PollState { respond_to } => {
                let state = self.poll_state().await;
                let _ = respond_to.send(Ok(state));
            }
            WidgetRequest::StopPolling { respond_to } => {
                let outcome = self.stop_polling().await;
                let _ = respond_to.send(Ok(outcome));
            }
        }
    }

    async fn complete(&mut self, completion: Completion, ctx: &WidgetContext) {
        match completion {
            Completion::Created {
                seq,
                result,
                respond_to,
            } => {
                let result = self.finish_create(seq, result, ctx).await;
                let _ = respond_to.send(result);
            }
            Completion::Restored {
                id,
                result,
                respond_to,
            } => {
                let _ = respond_to.send(self.finish_restore(id, result, ctx));
            }
        }
    }

    async fn begin_restore(
        &mut self,
        respond_to: Response<Option<OrderStatus>>,
        ctx: &WidgetContext,
    ) {
        let id = match ctx.store.last_order().await {
            Ok(Some(id)) => id,
            Ok(None) => {
                debug!("Nothing to restore");
                let _ = respond_to.send(Ok(None));
                return;
            }
            Err(e) => {
                warn!(error = %e, "Could not read last order");
                let _ = respond_to.send(Err(e.into()));
                return;
            }
        };
        info!(order_id = %id, "Restoring last order");

        if self
            .session
            .poller
            .as_ref()
            .is_some_and(|poller| poller.order_id() != &id)
        {
            self.stop_polling().await;
        }
        self.session.order_id = Some(id.clone());

        let api = ctx.api.clone();
        self.in_flight.spawn(
            async move {
                let result = api.fetch_status(&id).await;
                Completion::Restored {
                    id,
                    result,
                    respond_to,
                }
            }
            .in_current_span(),
        );
    }

    fn finish_restore(
        &mut self,
        id: OrderId,
        result: Result<OrderStatus, ApiError>,
        ctx: &WidgetContext,
    ) -> Result<Option<OrderStatus>, WidgetError> {
        let still_tracked = self.session.order_id.as_ref() == Some(&id);
        match result {
            Ok(status) => {
                if still_tracked {
                    ctx.panel.set_status(&status.status);
                    if let Some(url) = &status.invoice_url {
                        ctx.panel.set_invoice_link(url);
                    }
                } else {
                    debug!(order_id = %id, "Order replaced during restore, not rendered");
                }
                Ok(Some(status))
            }
            Err(e) => {
                warn!(order_id = %id, error = %e, "Restore fetch failed");
                if still_tracked {
                    ctx.panel.alert(format!("Status check failed: {e}"));
                }
                Err(e.into())
            }
        }
    }

    fn begin_create(
        &mut self,
        request: TopupRequest,
        respond_to: Response<CreatedOrder>,
        ctx: &WidgetContext,
    ) {
        let seq = self.session.next_create;
        self.session.next_create += 1;
        debug!(?request, seq, "Create");

        let api = ctx.api.clone();
        self.in_flight.spawn(
            async move {
                let result = api.create_order(&request).await;
                Completion::Created {
                    seq,
                    result,
                    respond_to,
                }
            }
            .in_current_span(),
        );
    }

    async fn finish_create(
        &mut self,
        seq: u64,
        result: Result<CreatedOrder, ApiError>,
        ctx: &WidgetContext,
    ) -> Result<CreatedOrder, WidgetError> {
        let created = match result {
            Ok(created) => created,
            Err(e) => {
                warn!(error = %e, "Create failed");
                ctx.panel.alert(format!("Could not create order: {e}"));
                return Err(e.into());
            }
        };
        if self.session.adopted_create.is_some_and(|newest| newest > seq) {
            info!(order_id = %created.id, "Created after a newer order, not tracked");
            return Ok(created);
        }
        self.session.adopted_create = Some(seq);
        info!(order_id = %created.id, message = ?created.message, "Created");

        self.stop_polling().await;
        self.session.order_id = Some(created.id.clone());
        if let Err(e) = ctx.store.remember(&created.id).await {
            warn!(order_id = %created.id, error = %e, "Could not persist last order");
        }

        ctx.panel.show();
        ctx.panel.set_status(PENDING_STATUS);
        ctx.panel.set_invoice_link(&created.invoice_url);

        self.start_polling(created.id.clone(), ctx);
        Ok(created)
    }

    async fn poll(&mut self, ctx: &WidgetContext) -> bool {
        let Some(id) = self.session.order_id.clone() else {
            debug!("Poll requested with no tracked order");
            return false;
        };
        if let Some(poller) = &self.session.poller {
            if poller.order_id() == &id && !poller.is_finished() {
                debug!(order_id = %id, "Already polling");
                return true;
            }
        }
        self.stop_polling().await;
        self.start_polling(id, ctx);
        true
    }

    fn reopen_panel(&self, ctx: &WidgetContext) -> Result<(), WidgetError> {
        if self.session.order_id.is_none() {
            warn!("Reopen requested with no tracked order");
            ctx.panel.alert(NO_TRANSACTION_MESSAGE);
            return Err(WidgetError::NoTransaction);
        }
        debug!("Reopen panel");
        ctx.panel.dismiss_alert();
        ctx.panel.show();
        Ok(())
    }

    fn start_polling(&mut self, id: OrderId, ctx: &WidgetContext) {
        self.session.poller = Some(PollHandle::spawn(
            id,
            ctx.api.clone(),
            ctx.panel.clone(),
            ctx.poll.clone(),
        ));
    }

    async fn stop_polling(&mut self) -> Option<PollOutcome> {
        let poller = self.session.poller.take()?;
        let id = poller.order_id().clone();
        let outcome = poller.stop().await;
        debug!(order_id = %id, ?outcome, "Poll loop stopped");
        self.session.last_outcome = Some((id, outcome.clone()));
        Some(outcome)
    }

    async fn poll_state(&mut self) -> PollState {
        if let Some(poller) = &self.session.poller {
            if !poller.is_finished() {
                return PollState::Running(poller.order_id().clone());
            }
        }
        if let Some(poller) = self.session.poller.take() {
            let id = poller.order_id().clone();
            let outcome = poller.join().await;
            self.session.last_outcome = Some((id, outcome));
        }
        match &self.session.last_outcome {
            Some((id, outcome)) => PollState::Finished(id.clone(), outcome.clone()),
            None => PollState::Idle,
        }
    }
}
