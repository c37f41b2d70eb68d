//! Level model: the mutable per-tool data holder.
//!
//! Holds the validated [`LevelSet`] plus the user's [`ToolOptions`]. Every
//! mutation either commits a fully valid set or returns the validation error
//! with the model untouched. Notification of collaborators is the
//! controller's job.

use rust_decimal::Decimal;

use riskline_core::geometry;
use riskline_core::{Direction, InstrumentSpec, LevelError, LevelKind, LevelSet, ToolOptions};

#[derive(Debug, Clone)]
pub struct LevelModel {
    levels: LevelSet,
    options: ToolOptions,
}

impl LevelModel {
    pub fn new(levels: LevelSet, options: ToolOptions) -> Self {
        Self { levels, options }
    }

    /// Build a model at the instrument's default offsets around `entry`.
    pub fn with_defaults(
        entry: Decimal,
        direction: Direction,
        instrument: &InstrumentSpec,
        options: ToolOptions,
    ) -> Result<Self, LevelError> {
        let levels = geometry::default_levels(entry, direction, instrument)?;
        Ok(Self::new(levels, options))
    }

    #[must_use]
    pub fn levels(&self) -> &LevelSet {
        &self.levels
    }

    #[must_use]
    pub fn options(&self) -> ToolOptions {
        self.options
    }

    pub fn set_options(&mut self, options: ToolOptions) {
        self.options = options;
    }

    /// Replace stop-loss and take-profit, keeping entry and direction.
    pub fn set_levels(
        &mut self,
        stop_loss: Decimal,
        take_profit: Decimal,
    ) -> Result<&LevelSet, LevelError> {
        let candidate = LevelSet::new(
            self.levels.entry,
            stop_loss,
            take_profit,
            self.levels.direction,
        )?;
        self.levels = candidate;
        Ok(&self.levels)
    }

    /// Move the whole set to a new entry, preserving pip distances.
    pub fn set_entry(&mut self, entry: Decimal) -> Result<&LevelSet, LevelError> {
        let delta = entry - self.levels.entry;
        let candidate = LevelSet::new(
            entry,
            self.levels.stop_loss + delta,
            self.levels.take_profit + delta,
            self.levels.direction,
        )?;
        self.levels = candidate;
        Ok(&self.levels)
    }

    /// Apply a dragged price to one level.
    ///
    /// Entry drags translate the whole set; stop/target drags replace that
    /// single level. The caller clamps the price beforehand; a price that
    /// still violates ordering leaves the model unchanged.
    pub fn apply_drag(&mut self, kind: LevelKind, price: Decimal) -> Result<&LevelSet, LevelError> {
        match kind {
            LevelKind::Entry => self.set_entry(price),
            LevelKind::StopLoss => self.set_levels(price, self.levels.take_profit),
            LevelKind::TakeProfit => self.set_levels(self.levels.stop_loss, price),
        }
    }

    /// Mirror the set around entry and invert direction.
    pub fn flip_direction(&mut self) -> Result<&LevelSet, LevelError> {
        let flipped = geometry::mirror_on_flip(&self.levels);
        // Mirroring a valid set stays valid; the constructor re-checks anyway.
        let candidate =
            LevelSet::new(flipped.entry, flipped.stop_loss, flipped.take_profit, flipped.direction)?;
        self.levels = candidate;
        Ok(&self.levels)
    }

    /// Reset to default offsets around a fresh entry price.
    pub fn reset(
        &mut self,
        entry: Decimal,
        direction: Direction,
        instrument: &InstrumentSpec,
    ) -> Result<&LevelSet, LevelError> {
        self.levels = geometry::default_levels(entry, direction, instrument)?;
        Ok(&self.levels)
    }
}
