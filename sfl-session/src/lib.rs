//! # SF6 Live Session Engine
//!
//! Turns a stream of Match Rating (MR) observations into a bounded session:
//! win/loss inference from rating deltas, peak tracking and a capped history
//! buffer for charting.
//!
//! - [`model`]: Session, Match and HistoryPoint records
//! - [`engine`]: the serialized load → compute → save cycle
//! - [`store`]: single-slot persistence (memory, JSON file, SQLite)
//! - [`stats`]: win/loss projection
//! - [`rating`]: validation of raw intake values

pub mod engine;
pub mod model;
pub mod rating;
pub mod stats;
pub mod store;

pub use engine::{ChangeDescriptor, SessionEngine, Submission};
pub use model::{HistoryPoint, Match, Session, HISTORY_CAPACITY};
pub use stats::{compute_stats, SessionStats};
pub use store::{JsonFileStore, MemoryStore, SessionStore, SqliteStore};
