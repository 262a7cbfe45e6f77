//! # Observability & Tracing
//!
//! [`setup_tracing`] installs the global subscriber: structured events with a
//! compact formatter, filtered by `RUST_LOG`.
//!
//! ## What Gets Traced
//!
//! - **Actor lifecycle**: `Actor started` and `Shutdown` with the session's order
//! - **Widget operations**: restore, create, poll, panel changes
//! - **Poll loop**: every check runs inside a `poll_loop{order_id=..}` span
//! - **Failures**: backend rejections and retries with their delay
//!
//! ```bash
//! RUST_LOG=info topup-widget     # lifecycle and order events
//! RUST_LOG=debug topup-widget    # request payloads and every status check
//! ```
//!
//! With `RUST_LOG=info` a paid order looks like:
//!
//! ```text
//! INFO Actor started entity_type="Widget"
//! INFO Created order_id=A1 message=Some("Invoice created")
//! INFO poll_loop: Polling started order_id=A1 interval_ms=5000
//! INFO poll_loop: Order paid, polling stopped order_id=A1 status=PAID
//! ```
//!
//! Log output goes to stderr so it never interleaves with the panel the
//! terminal front end prints on stdout.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "topup_widget=info";

pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
