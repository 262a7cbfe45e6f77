//! Runtime orchestration and lifecycle management.
//!
//! This module contains the infrastructure around the widget actor:
//!
//! - **Configuration**: Defaults, TOML loading and validation
//! - **Actor lifecycle management**: Wiring dependencies, starting and shutting down
//! - **Observability setup**: Initializing tracing and logging
//!
//! # Main Components
//!
//! - [`WidgetConfig`] - Backend origin, storage location and poll policy
//! - [`WidgetSystem`] - Starts the widget actor and owns its task
//! - [`setup_tracing`] - Initializes the tracing/logging infrastructure

pub mod config;
pub mod tracing;
pub mod widget_system;

pub use self::config::*;
pub use self::tracing::*;
pub use self::widget_system::*;
