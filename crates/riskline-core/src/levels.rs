//! Price level data structures.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LevelError;

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    /// Get the opposite direction.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Direction::Buy => Direction::Sell,
            Direction::Sell => Direction::Buy,
        }
    }

    /// Signed unit for pip offsets: +1 for Buy, -1 for Sell.
    #[must_use]
    pub fn sign(self) -> Decimal {
        match self {
            Direction::Buy => Decimal::ONE,
            Direction::Sell => -Decimal::ONE,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Buy => write!(f, "BUY"),
            Direction::Sell => write!(f, "SELL"),
        }
    }
}

/// Which of the three horizontal price levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LevelKind {
    Entry,
    StopLoss,
    TakeProfit,
}

/// The three price levels of a planned trade plus its direction.
///
/// Ordering invariant:
/// - Buy: `stop_loss < entry < take_profit`
/// - Sell: `stop_loss > entry > take_profit`
///
/// Construction validates; an invalid combination never produces a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelSet {
    pub entry: Decimal,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
    pub direction: Direction,
}

impl LevelSet {
    /// Create a validated level set.
    pub fn new(
        entry: Decimal,
        stop_loss: Decimal,
        take_profit: Decimal,
        direction: Direction,
    ) -> Result<Self, LevelError> {
        for (kind, price) in [
            (LevelKind::Entry, entry),
            (LevelKind::StopLoss, stop_loss),
            (LevelKind::TakeProfit, take_profit),
        ] {
            if price <= Decimal::ZERO {
                return Err(LevelError::NonPositivePrice { kind, price });
            }
        }

        let set = Self {
            entry,
            stop_loss,
            take_profit,
            direction,
        };
        if !set.is_ordered() {
            return Err(LevelError::OrderingViolation {
                direction,
                stop_loss,
                entry,
                take_profit,
            });
        }
        Ok(set)
    }

    /// Check the directional ordering invariant.
    #[must_use]
    pub fn is_ordered(&self) -> bool {
        match self.direction {
            Direction::Buy => self.stop_loss < self.entry && self.entry < self.take_profit,
            Direction::Sell => self.stop_loss > self.entry && self.entry > self.take_profit,
        }
    }

    /// Get the price of one level.
    #[must_use]
    pub fn price(&self, kind: LevelKind) -> Decimal {
        match kind {
            LevelKind::Entry => self.entry,
            LevelKind::StopLoss => self.stop_loss,
            LevelKind::TakeProfit => self.take_profit,
        }
    }

    /// Risk distance: |entry - stop_loss|.
    #[must_use]
    pub fn risk_distance(&self) -> Decimal {
        (self.entry - self.stop_loss).abs()
    }

    /// Reward distance: |take_profit - entry|.
    #[must_use]
    pub fn reward_distance(&self) -> Decimal {
        (self.take_profit - self.entry).abs()
    }

    /// Lowest of the three prices.
    #[must_use]
    pub fn min_price(&self) -> Decimal {
        self.entry.min(self.stop_loss).min(self.take_profit)
    }

    /// Highest of the three prices.
    #[must_use]
    pub fn max_price(&self) -> Decimal {
        self.entry.max(self.stop_loss).max(self.take_profit)
    }
}

/// Pip definition and default level offsets for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSpec {
    /// Instrument name, e.g. "EURUSD".
    pub name: String,
    /// Minimum meaningful price increment.
    pub pip_size: Decimal,
    /// Default stop-loss offset from entry, in pips.
    pub default_stop_pips: Decimal,
    /// Default take-profit offset from entry, in pips.
    pub default_target_pips: Decimal,
}

impl InstrumentSpec {
    pub fn new(name: impl Into<String>, pip_size: Decimal) -> Self {
        Self {
            name: name.into(),
            pip_size,
            default_stop_pips: dec!(10),
            default_target_pips: dec!(20),
        }
    }
}

impl Default for InstrumentSpec {
    fn default() -> Self {
        Self::new("EURUSD", dec!(0.0001))
    }
}

/// Per-tool user preferences, independent of the level set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolOptions {
    /// Hide level labels while the pointer is outside the tool's bounding box.
    pub hide_labels_when_unfocused: bool,
    /// Hide level labels during an active level drag.
    pub hide_labels_while_editing: bool,
    /// Move the primary and confirm buttons together when one is dragged.
    pub linked_buttons: bool,
}

impl Default for ToolOptions {
    fn default() -> Self {
        Self {
            hide_labels_when_unfocused: false,
            hide_labels_while_editing: false,
            linked_buttons: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buy_ordering() {
        let set = LevelSet::new(dec!(1.10), dec!(1.09), dec!(1.12), Direction::Buy).unwrap();
        assert!(set.is_ordered());
        assert_eq!(set.risk_distance(), dec!(0.01));
        assert_eq!(set.reward_distance(), dec!(0.02));
    }

    #[test]
    fn test_sell_ordering() {
        let set = LevelSet::new(dec!(1.10), dec!(1.11), dec!(1.08), Direction::Sell).unwrap();
        assert!(set.is_ordered());
    }

    #[test]
    fn test_rejects_inverted_levels() {
        let err = LevelSet::new(dec!(1.10), dec!(1.11), dec!(1.12), Direction::Buy).unwrap_err();
        assert!(matches!(err, LevelError::OrderingViolation { .. }));
    }

    #[test]
    fn test_rejects_equal_levels() {
        assert!(LevelSet::new(dec!(1.10), dec!(1.10), dec!(1.12), Direction::Buy).is_err());
    }

    #[test]
    fn test_rejects_non_positive_price() {
        let err = LevelSet::new(dec!(1.10), dec!(0), dec!(1.12), Direction::Buy).unwrap_err();
        assert!(matches!(err, LevelError::NonPositivePrice { .. }));
    }

    #[test]
    fn test_direction_opposite() {
        assert_eq!(Direction::Buy.opposite(), Direction::Sell);
        assert_eq!(Direction::Sell.opposite().opposite(), Direction::Sell);
    }

    #[test]
    fn test_level_price_accessor() {
        let set = LevelSet::new(dec!(1.10), dec!(1.09), dec!(1.12), Direction::Buy).unwrap();
        assert_eq!(set.price(LevelKind::Entry), dec!(1.10));
        assert_eq!(set.price(LevelKind::StopLoss), dec!(1.09));
        assert_eq!(set.price(LevelKind::TakeProfit), dec!(1.12));
        assert_eq!(set.min_price(), dec!(1.09));
        assert_eq!(set.max_price(), dec!(1.12));
    }
}
