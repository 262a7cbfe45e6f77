//! Error types for the widget actor.

use crate::clients::ApiError;
use crate::storage::StorageError;
use thiserror::Error;

/// Errors that can occur during widget operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum WidgetError {
    /// The widget actor is no longer running.
    #[error("Widget actor closed")]
    ActorClosed,

    /// The widget actor stopped before answering.
    #[error("Widget actor dropped response channel")]
    ActorDropped,

    /// The panel was reopened before any order was created or restored.
    #[error("No transaction yet.")]
    NoTransaction,

    /// A call to the order backend failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The last order could not be read or written.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
