//! Standard implementations for the Courier message dispatch engine.
//!
//! - [`json`]: the default JSON inspector/view pair
//! - [`observe`]: ready-made tracing hooks for the router builder
//! - [`testing`]: recording/counting test doubles for router tests

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub mod json;
pub mod observe;
pub mod testing;
