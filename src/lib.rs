//! # Top-up Order Status Widget
//!
//! > **Create a mobile top-up order, show where to pay, and watch it until it is paid.**
//!
//! The widget talks to a top-up backend over HTTP. It creates an order, renders
//! the invoice link into a status panel, and polls the order's status on a
//! fixed cadence until the backend reports it as paid. The identifier of the
//! last created order survives restarts, so a reopened widget picks up where
//! it left off.
//!
//! ## 🏗️ Design
//!
//! ### One actor owns the session
//! All session state (the tracked order and its poll loop) lives inside the
//! [`WidgetActor`](widget_actor::WidgetActor). Requests are processed one at a
//! time, so creating a new order, reopening the panel and restoring the last
//! order never race each other. A new order stops the previous poll loop
//! before it is rendered.
//!
//! ### The panel is observable
//! The [`Panel`](panel::Panel) is a `watch` channel of
//! [`PanelState`](model::PanelState). The actor and the poll loop write to it;
//! front ends and tests subscribe and render whatever they see.
//!
//! ### Seams are traits
//! The backend is behind [`OrderApi`](clients::OrderApi) and durable storage
//! behind [`KeyValueStore`](storage::KeyValueStore). Tests swap in
//! [`MockOrderApi`](clients::mock::MockOrderApi) and
//! [`MemoryStore`](storage::MemoryStore).
//!
//! ### Late binding
//! Dependencies are injected when the actor is run, via
//! [`WidgetContext`](widget_actor::WidgetContext), not when it is created.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Controller ([`widget_actor`])
//! - **Role**: Session rules, order creation, restore, panel open/close, the poll loop.
//! - **Key items**: [`WidgetActor`](widget_actor::WidgetActor), [`PollHandle`](widget_actor::PollHandle).
//!
//! ### 2. The Orchestrator ([`lifecycle`])
//! - **Role**: Configuration, wiring, tracing, graceful shutdown.
//! - **Key items**: [`WidgetSystem`](lifecycle::WidgetSystem), [`WidgetConfig`](lifecycle::WidgetConfig).
//!
//! ### 3. The Interface ([`clients`])
//! - **Role**: The typed handle to the actor and the backend API client.
//! - **Key items**: [`WidgetClient`](clients::WidgetClient), [`HttpOrderApi`](clients::HttpOrderApi).
//!
//! ### 4. Data ([`model`], [`panel`], [`storage`])
//! - **Role**: Wire types, the observable panel, the persisted last order.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Against a backend on http://127.0.0.1:8000
//! RUST_LOG=info cargo run
//!
//! # Somewhere else, polling every two seconds
//! cargo run -- --api-url https://topup.example.com --poll-ms 2000
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! cargo test
//! ```

pub mod clients;
pub mod lifecycle;
pub mod model;
pub mod panel;
pub mod storage;
pub mod widget_actor;
