//! squiggle-core: incremental on-the-fly spell checking for a live text
//! buffer.
//!
//! This crate provides:
//! - `Document` trait for read-only buffer access, with a ropey-backed
//!   `RopeBuffer` implementation
//! - `OnTheFlyChecker` - the per-document engine fed by edit and viewport
//!   notifications
//! - `SpellOracle` trait for the word-checking backend, with a word-list
//!   implementation for tests and standalone hosts
//! - `WordBoundaries` trait for matching the oracle's tokenization
//!
//! The engine is single-threaded by design: the host calls `poll` when idle
//! and `tick` from its timer, and reads results back through the query
//! methods.

pub mod boundary;
pub mod checker;
pub mod config;
pub mod document;
pub mod edits;
pub mod oracle;
pub mod position;
pub mod queue;
pub mod registry;
pub mod session;
pub mod span;
pub mod viewport;

pub use boundary::{UnicodeWordBoundaries, WordBoundaries};
pub use checker::OnTheFlyChecker;
pub use config::{CheckerConfig, ConfigError};
pub use document::{Document, RopeBuffer};
pub use oracle::{OracleError, OracleEvent, SpellOracle, WordListOracle};
pub use position::{Position, Range};
pub use session::SessionState;
pub use smol_str::SmolStr;
pub use span::SpanId;
pub use viewport::ViewId;
