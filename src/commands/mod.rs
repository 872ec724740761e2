//! CLI command implementations
//!
//! Every command works on a `BusHandle`, so the same code drives the CH341
//! and the dummy bus.

pub mod detect;
pub mod dump;
mod list;
pub mod transfer;

pub use list::{list_adapters, list_devices};
