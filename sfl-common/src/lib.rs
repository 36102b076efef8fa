//! # SF6 Live Common Library
//!
//! Shared code for the SF6 Live overlay crates including:
//! - Error and Result types
//! - Root folder and TOML configuration resolution
//! - Clock abstraction for millisecond timestamps
//! - Overlay event types and the broadcast EventBus
//! - SSE stream helpers

pub mod config;
pub mod error;
pub mod events;
pub mod sse;
pub mod time;

pub use error::{Error, Result};
pub use events::{EventBus, OverlayEvent};
pub use time::{Clock, SystemClock};
