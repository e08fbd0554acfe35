//! Test utilities for Weft.
//!
//! This crate provides a small framework widget set and mock platform
//! handlers that record every call, so lifecycle, event and style behavior
//! can be verified without a real backend.
//!
//! # Example
//!
//! ```rust
//! use weft_test_utils::{Button, HandlerCall, mock_platform};
//!
//! let (platform, log) = mock_platform("mock");
//! let mut button = Button::new_on(&platform).unwrap();
//! button.set_text("OK").unwrap();
//!
//! assert_eq!(button.text().unwrap(), "OK");
//! assert!(log.contains(&HandlerCall::Initialized { kind: "button" }));
//! ```
//!
//! # Design
//!
//! Mock handlers share a [`CallLog`] behind a `parking_lot::Mutex`, since
//! the factories that create them must be `Send + Sync`.

pub mod forms;
pub mod mocks;

// Re-export main types at crate root
pub use forms::*;
pub use mocks::*;
