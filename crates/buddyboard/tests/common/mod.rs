//! Shared test utilities for buddyboard integration tests.
//!
//! This module provides:
//! - `TestHarness` wiring a gateway over a switchable store and a fresh cache
//! - Builder patterns for drafts and configurations

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::*;
