#![forbid(unsafe_code)]

pub mod coordinator;
pub mod state;

#[cfg(test)]
mod coordinator_tests;

pub use coordinator::LayoutCoordinator;
pub use state::{LayoutContext, PinAction, PinState, WidgetAction, WidgetState, exclude_focused};
