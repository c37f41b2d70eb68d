//! Tool lifecycle state machine.
//!
//! Governs which pointer-driven operations are legal in each state. The
//! transition table is pure; [`ToolStateMachine`] just holds the current
//! state and applies it. A trigger with no defined transition is a no-op,
//! not an error.

use riskline_core::LevelKind;

/// Lifecycle state of one tool instance. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolState {
    /// Tool not shown; only the primary button reacts.
    #[default]
    Hidden,
    /// Levels drawn, idle.
    Visible,
    /// A stop or target line is being dragged.
    Editing,
    /// Transient popup anchored near the entry line.
    MenuOpen,
    /// Option panel opened from the popup's gear icon.
    ConfigOpen,
}

impl ToolState {
    /// Check whether any visuals exist in this state.
    #[must_use]
    pub fn is_shown(&self) -> bool {
        !matches!(self, ToolState::Hidden)
    }

    /// Check whether a popup (menu or config) is open.
    #[must_use]
    pub fn has_popup(&self) -> bool {
        matches!(self, ToolState::MenuOpen | ToolState::ConfigOpen)
    }
}

/// Inputs to the state machine, already classified by the event router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Primary-action button pressed.
    PrimaryPressed,
    /// Drag began on a level line.
    LevelDragBegan(LevelKind),
    /// Drag released.
    DragEnded,
    /// Double-click landed on the entry line.
    EntryDoubleClicked,
    /// Gear icon inside the popup clicked.
    GearClicked,
    /// Flip control inside the popup clicked.
    FlipClicked,
    /// Click landed outside the open popup.
    OutsideClicked,
    /// Confirm-action button pressed.
    ConfirmPressed,
}

/// Side effect the controller must perform alongside a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Reset levels to defaults around the current market price.
    ShowWithDefaults,
    /// Tear down all derived visuals.
    ReleaseVisuals,
    /// Entering edit; labels may be suppressed per options.
    BeginEdit,
    /// Leaving edit; labels restored, level change may be announced.
    EndEdit,
    /// Show the popup near the click point.
    OpenMenu,
    /// Swap the popup for the option panel.
    OpenConfig,
    /// Discard popup/config without touching levels.
    ClosePopup,
    /// Mirror levels around entry and invert direction.
    FlipDirection,
    /// Build a Signal from current levels and hand it to the consumer.
    EmitSignal,
}

/// The transition table. Returns `None` for undefined pairs.
#[must_use]
pub fn transition(state: ToolState, trigger: Trigger) -> Option<(ToolState, Effect)> {
    use Effect::*;
    use ToolState::*;

    match (state, trigger) {
        (Hidden, Trigger::PrimaryPressed) => Some((Visible, ShowWithDefaults)),
        (Visible, Trigger::PrimaryPressed) => Some((Hidden, ReleaseVisuals)),

        // Only stop and target lines are editable; the entry line moves the
        // whole tool without a state change.
        (Visible, Trigger::LevelDragBegan(LevelKind::StopLoss))
        | (Visible, Trigger::LevelDragBegan(LevelKind::TakeProfit)) => Some((Editing, BeginEdit)),
        (Editing, Trigger::DragEnded) => Some((Visible, EndEdit)),

        (Visible, Trigger::EntryDoubleClicked) => Some((MenuOpen, OpenMenu)),
        (MenuOpen, Trigger::GearClicked) => Some((ConfigOpen, OpenConfig)),
        (MenuOpen, Trigger::FlipClicked) => Some((MenuOpen, FlipDirection)),
        (MenuOpen, Trigger::OutsideClicked) | (ConfigOpen, Trigger::OutsideClicked) => {
            Some((Visible, ClosePopup))
        }

        (Visible, Trigger::ConfirmPressed) => Some((Visible, EmitSignal)),
        (Editing, Trigger::ConfirmPressed) => Some((Editing, EmitSignal)),

        _ => None,
    }
}

/// Holder for the current state of one tool instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolStateMachine {
    state: ToolState,
}

impl ToolStateMachine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> ToolState {
        self.state
    }

    /// Apply a trigger; returns the effect to perform, or `None` when the
    /// trigger is undefined in the current state.
    pub fn handle(&mut self, trigger: Trigger) -> Option<Effect> {
        let (next, effect) = transition(self.state, trigger)?;
        self.state = next;
        Some(effect)
    }
}
