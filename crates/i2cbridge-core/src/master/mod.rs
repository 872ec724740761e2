//! Bus master traits and abstractions
//!
//! This module defines the primitive-level trait that all bus adapters
//! implement, and the capability flags they report.

mod functionality;
mod traits;

pub use functionality::Functionality;
pub use traits::*;
