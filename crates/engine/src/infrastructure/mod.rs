//! Infrastructure implementations.
//!
//! Contains port traits and their implementations for external dependencies.

pub mod clock;
pub mod ports;
