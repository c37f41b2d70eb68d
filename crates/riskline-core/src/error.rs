//! Domain error types.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::levels::LevelKind;

/// Errors from level validation and geometry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LevelError {
    #[error("levels violate ordering for {direction} direction: sl={stop_loss}, entry={entry}, tp={take_profit}")]
    OrderingViolation {
        direction: crate::levels::Direction,
        stop_loss: Decimal,
        entry: Decimal,
        take_profit: Decimal,
    },
    #[error("{kind:?} price must be finite and positive, got {price}")]
    NonPositivePrice { kind: LevelKind, price: Decimal },
    #[error("risk distance is zero, ratio is undefined")]
    ZeroRisk,
}

/// Errors from [`Signal`](crate::Signal) construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    #[error("operation type is required for OPEN signals")]
    MissingOperationType,
    #[error("operation type must be absent for CLOSE signals")]
    UnexpectedOperationType,
    #[error("stop pips must be positive for OPEN signals")]
    NonPositiveStopPips,
    #[error("stop pips must be absent for CLOSE signals")]
    UnexpectedStopPips,
    #[error("instrument cannot be empty")]
    EmptyInstrument,
}
