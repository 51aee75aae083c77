//! Testing utilities and mock implementations
//!
//! Lets the driver be exercised end to end without a broker or network.

pub mod mocks;

pub use mocks::*;
