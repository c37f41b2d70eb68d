//! Core types for the riskline trade-planning overlay.
//!
//! This crate provides the pure domain layer with no I/O:
//! - `LevelSet` - entry / stop-loss / take-profit price levels with direction
//! - `geometry` - stateless validation, clamping and pip arithmetic
//! - `Signal` - the immutable outbound trade message

pub mod error;
pub mod geometry;
pub mod levels;
pub mod signal;

pub use error::{LevelError, SignalError};
pub use levels::{Direction, InstrumentSpec, LevelKind, LevelSet, ToolOptions};
pub use signal::{Signal, SignalType};
