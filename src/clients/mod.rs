//! Clients: the remote order API seam and the typed handle to the widget actor.

pub mod mock;
pub mod order_api;
pub mod widget_client;

pub use order_api::*;
pub use widget_client::*;
