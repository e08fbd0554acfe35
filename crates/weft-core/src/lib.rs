//! Weft Core
//!
//! Shared utilities for the Weft toolkit core: hash collections, logging
//! setup and profiling hooks.

pub mod alloc;
pub mod logging;
pub mod profiling;
