//! Stateless level geometry: ordering validation, drag clamping,
//! pip arithmetic and risk/reward computation.
//!
//! All functions are pure. Prices are exact decimals; no operation here
//! touches the rendering surface or mutates shared state.

use rust_decimal::Decimal;

use crate::error::LevelError;
use crate::levels::{Direction, InstrumentSpec, LevelKind, LevelSet};

/// Check the directional ordering invariant for a level set.
#[must_use]
pub fn validate_ordering(levels: &LevelSet) -> bool {
    levels.is_ordered()
}

/// Clamp a dragged level to the valid side of the entry price.
///
/// If applying `proposed` to `dragged` would violate ordering, the entry
/// price is returned instead so the dragged line sticks at the boundary
/// rather than jumping. Dragging the entry itself is a whole-set move and
/// is never clamped here.
#[must_use]
pub fn clamp_drag_target(levels: &LevelSet, dragged: LevelKind, proposed: Decimal) -> Decimal {
    let violates = match (levels.direction, dragged) {
        (Direction::Buy, LevelKind::StopLoss) => proposed >= levels.entry,
        (Direction::Buy, LevelKind::TakeProfit) => proposed <= levels.entry,
        (Direction::Sell, LevelKind::StopLoss) => proposed <= levels.entry,
        (Direction::Sell, LevelKind::TakeProfit) => proposed >= levels.entry,
        (_, LevelKind::Entry) => false,
    };
    if violates {
        levels.entry
    } else {
        proposed
    }
}

/// Clamp a price into the currently visible chart range.
#[must_use]
pub fn clamp_to_chart_bounds(price: Decimal, min_visible: Decimal, max_visible: Decimal) -> Decimal {
    price.clamp(min_visible, max_visible)
}

/// Unsigned distance between two prices, in pips.
#[must_use]
pub fn pips_between(a: Decimal, b: Decimal, pip_size: Decimal) -> Decimal {
    (a - b).abs() / pip_size
}

/// Price at a signed pip offset from `base`.
///
/// `sign` follows [`Direction::sign`]: +1 offsets upward, -1 downward.
#[must_use]
pub fn price_from_pips(base: Decimal, pips: Decimal, sign: Decimal, pip_size: Decimal) -> Decimal {
    base + sign * pips * pip_size
}

/// Reward distance divided by risk distance, both measured from entry.
pub fn compute_ratio(levels: &LevelSet) -> Result<Decimal, LevelError> {
    let risk = levels.risk_distance();
    if risk.is_zero() {
        return Err(LevelError::ZeroRisk);
    }
    Ok(levels.reward_distance() / risk)
}

/// Mirror the stop-loss and take-profit around the entry and flip direction.
///
/// Each level's distance from entry is preserved exactly; only the side
/// changes. Applying this twice yields the original set.
#[must_use]
pub fn mirror_on_flip(levels: &LevelSet) -> LevelSet {
    let two = Decimal::TWO;
    LevelSet {
        entry: levels.entry,
        stop_loss: two * levels.entry - levels.stop_loss,
        take_profit: two * levels.entry - levels.take_profit,
        direction: levels.direction.opposite(),
    }
}

/// Build a level set at the instrument's default pip offsets around `entry`.
pub fn default_levels(
    entry: Decimal,
    direction: Direction,
    instrument: &InstrumentSpec,
) -> Result<LevelSet, LevelError> {
    let sign = direction.sign();
    let stop_loss = price_from_pips(entry, instrument.default_stop_pips, -sign, instrument.pip_size);
    let take_profit =
        price_from_pips(entry, instrument.default_target_pips, sign, instrument.pip_size);
    LevelSet::new(entry, stop_loss, take_profit, direction)
}
