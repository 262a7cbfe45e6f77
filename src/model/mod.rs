//! Pure data structures (DTOs) exchanged with the order API and rendered by the panel.

pub mod order;
pub mod panel;

pub use order::*;
pub use panel::*;
