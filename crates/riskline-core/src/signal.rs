//! Outbound trade signal.
//!
//! A [`Signal`] is the immutable message handed to the external trading
//! consumer once the user confirms the planned levels. Construction
//! validates the kind-dependent field contract up front; an invalid
//! combination never produces a value.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::error::SignalError;
use crate::levels::Direction;

/// Kind of signal on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalType {
    /// Open a new position.
    Open,
    /// Close an existing position.
    Close,
}

impl std::fmt::Display for SignalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalType::Open => write!(f, "OPEN"),
            SignalType::Close => write!(f, "CLOSE"),
        }
    }
}

/// Immutable trade signal.
///
/// Wire format (camelCase JSON): `uniqueId` (prefixed with `ORDER_`),
/// `signalType`, and for OPEN only `operationType` and `stopPips`
/// (one-decimal formatted). CLOSE signals omit both optional fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    unique_id: String,
    signal_type: SignalType,
    #[serde(skip_serializing_if = "Option::is_none")]
    operation_type: Option<Direction>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "one_decimal")]
    stop_pips: Option<Decimal>,
    #[serde(skip)]
    instrument: String,
}

/// Serialize stop pips as a number with exactly one decimal place.
fn one_decimal<S: Serializer>(pips: &Option<Decimal>, s: S) -> Result<S::Ok, S::Error> {
    match pips {
        Some(p) => s.serialize_f64(p.round_dp(1).to_f64().unwrap_or(0.0)),
        None => s.serialize_none(),
    }
}

impl Signal {
    /// Create a validated signal from raw parts.
    ///
    /// OPEN requires an operation type and positive stop pips; CLOSE
    /// forbids both. The instrument must be non-empty for either kind.
    pub fn new(
        signal_type: SignalType,
        operation_type: Option<Direction>,
        stop_pips: Option<Decimal>,
        instrument: &str,
    ) -> Result<Self, SignalError> {
        if instrument.trim().is_empty() {
            return Err(SignalError::EmptyInstrument);
        }
        match signal_type {
            SignalType::Open => {
                if operation_type.is_none() {
                    return Err(SignalError::MissingOperationType);
                }
                match stop_pips {
                    None => return Err(SignalError::NonPositiveStopPips),
                    Some(p) if p <= Decimal::ZERO => {
                        return Err(SignalError::NonPositiveStopPips)
                    }
                    Some(_) => {}
                }
            }
            SignalType::Close => {
                if operation_type.is_some() {
                    return Err(SignalError::UnexpectedOperationType);
                }
                if stop_pips.is_some() {
                    return Err(SignalError::UnexpectedStopPips);
                }
            }
        }

        Ok(Self {
            unique_id: generate_unique_id(),
            signal_type,
            operation_type,
            stop_pips,
            instrument: instrument.to_string(),
        })
    }

    /// Create an OPEN signal.
    pub fn open(
        direction: Direction,
        stop_pips: Decimal,
        instrument: &str,
    ) -> Result<Self, SignalError> {
        Self::new(SignalType::Open, Some(direction), Some(stop_pips), instrument)
    }

    /// Create a CLOSE signal.
    pub fn close(instrument: &str) -> Result<Self, SignalError> {
        Self::new(SignalType::Close, None, None, instrument)
    }

    /// Unique identifier, `ORDER_` prefixed.
    #[must_use]
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    #[must_use]
    pub fn signal_type(&self) -> SignalType {
        self.signal_type
    }

    /// Operation type; `None` for CLOSE signals.
    #[must_use]
    pub fn operation_type(&self) -> Option<Direction> {
        self.operation_type
    }

    /// Stop distance in pips; `None` for CLOSE signals.
    #[must_use]
    pub fn stop_pips(&self) -> Option<Decimal> {
        self.stop_pips
    }

    #[must_use]
    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    /// JSON wire representation.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signal[ID: {}, Type: {}", self.unique_id, self.signal_type)?;
        if let (Some(op), Some(pips)) = (self.operation_type, self.stop_pips) {
            write!(f, ", Operation: {}, StopPips: {:.1}", op, pips.round_dp(1))?;
        }
        write!(f, ", Instrument: {}]", self.instrument)
    }
}

/// 12 hex chars of a v4 UUID behind the `ORDER_` prefix.
fn generate_unique_id() -> String {
    let raw = Uuid::new_v4().simple().to_string();
    format!("ORDER_{}", &raw[..12])
}
