use crate::clients::{HttpOrderApi, OrderApi, WidgetClient};
use crate::lifecycle::config::WidgetConfig;
use crate::panel::Panel;
use crate::storage::{FileStore, SessionStore};
use crate::widget_actor::WidgetContext;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum SystemError {
    #[error("Failed to build order API client: {0}")]
    Api(#[from] crate::clients::ApiError),

    #[error("Actor task failed: {0}")]
    ActorTask(String),
}

/// Runtime orchestrator for the order status widget.
///
/// `WidgetSystem` is responsible for:
/// - **Dependency Wiring**: Handing the order API, session store, panel and
///   poll policy to the widget actor
/// - **Lifecycle Management**: Starting the actor and shutting it down
///
/// # Example
///
/// ```ignore
/// let system = WidgetSystem::from_config(&WidgetConfig::default())?;
///
/// system.widget_client.restore().await?;
/// system.widget_client.create_order("0812", "telkomsel", "10000").await?;
/// println!("{}", system.panel.snapshot());
///
/// system.shutdown().await?;
/// ```
pub struct WidgetSystem {
    /// Client for interacting with the widget actor
    pub widget_client: WidgetClient,

    /// The panel the actor renders into; subscribe to observe changes
    pub panel: Panel,

    handle: tokio::task::JoinHandle<()>,
}

impl WidgetSystem {
    /// Starts the widget actor with the given dependencies.
    ///
    /// The panel in `ctx` is the one exposed as [`WidgetSystem::panel`].
    pub fn new(ctx: WidgetContext) -> Self {
        let (actor, widget_client) = crate::widget_actor::new();
        let panel = ctx.panel.clone();
        let handle = tokio::spawn(actor.run(ctx));

        Self {
            widget_client,
            panel,
            handle,
        }
    }

    /// Wires the HTTP order API and the file-backed session store from `config`.
    pub fn from_config(config: &WidgetConfig) -> Result<Self, SystemError> {
        let api: Arc<dyn OrderApi> = Arc::new(HttpOrderApi::new(
            &config.api_base_url,
            config.request_timeout(),
        )?);
        let store = SessionStore::new(Arc::new(FileStore::new(&config.storage_path)));
        info!(
            api = %config.api_base_url,
            storage = %config.storage_path.display(),
            "Widget configured"
        );

        Ok(Self::new(WidgetContext {
            api,
            store,
            panel: Panel::new(),
            poll: config.poll_config(),
        }))
    }

    /// Gracefully shuts down the widget.
    ///
    /// Dropping the client closes the actor's channel; the actor then stops
    /// any live poll loop and exits. Clones of the client held elsewhere keep
    /// the actor alive, so drop them first.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down widget...");
        drop(self.widget_client);

        if let Err(e) = self.handle.await {
            error!("Actor task failed: {:?}", e);
            return Err(SystemError::ActorTask(e.to_string()));
        }

        info!("Widget shutdown complete.");
        Ok(())
    }
}
