//! Tool controller: one instance per tool on a chart.
//!
//! Owns the level model, state machine, router and view for a single tool
//! and wires routed intents into model mutations, view refreshes and the
//! outbound signal. Collaborator failures are caught here, logged, and the
//! triggering operation aborts with model and view in their pre-call state.

use riskline_config::{ButtonConfig, ConfigStore};
use riskline_core::geometry;
use riskline_core::{
    Direction, InstrumentSpec, LevelError, LevelKind, LevelSet, Signal, SignalError, ToolOptions,
};
use rust_decimal::Decimal;

use crate::machine::{Effect, ToolState, ToolStateMachine, Trigger};
use crate::model::LevelModel;
use crate::registry::ToolId;
use crate::router::{ButtonKind, EventRouter, Intent, PointerEvent};
use crate::surface::{RenderSurface, ScreenPos};
use crate::view::ToolView;

/// Callback receiving the confirmed trade signal.
pub type SignalConsumer = Box<dyn FnMut(Signal)>;
/// Callback announcing an accepted level change after an edit.
pub type LevelsChangedFn = Box<dyn FnMut(&LevelSet)>;

pub struct ToolController {
    id: ToolId,
    instrument: InstrumentSpec,
    model: LevelModel,
    machine: ToolStateMachine,
    router: EventRouter,
    view: ToolView,
    surface: Box<dyn RenderSurface>,
    store: Box<dyn ConfigStore>,
    buttons: ButtonConfig,
    consumer: Option<SignalConsumer>,
    on_levels_changed: Option<LevelsChangedFn>,
    labels_suppressed_in_edit: bool,
}

impl ToolController {
    /// Create a controller with default levels around the current market
    /// price. The tool starts hidden; only its buttons are drawn.
    pub fn new(
        id: ToolId,
        surface: Box<dyn RenderSurface>,
        store: Box<dyn ConfigStore>,
        instrument: InstrumentSpec,
        initial_direction: Direction,
    ) -> Result<Self, LevelError> {
        let stored = store.options();
        let options = ToolOptions {
            hide_labels_when_unfocused: stored.hide_labels_when_unfocused,
            hide_labels_while_editing: stored.hide_labels_while_editing,
            linked_buttons: stored.linked_buttons,
        };
        let model = LevelModel::with_defaults(
            surface.current_price(),
            initial_direction,
            &instrument,
            options,
        )?;
        let buttons = store.buttons();

        let mut controller = Self {
            id,
            instrument,
            model,
            machine: ToolStateMachine::new(),
            router: EventRouter::new(),
            view: ToolView::new(),
            surface,
            store,
            buttons,
            consumer: None,
            on_levels_changed: None,
            labels_suppressed_in_edit: false,
        };
        controller.refresh();
        Ok(controller)
    }

    #[must_use]
    pub fn id(&self) -> ToolId {
        self.id
    }

    #[must_use]
    pub fn state(&self) -> ToolState {
        self.machine.state()
    }

    #[must_use]
    pub fn levels(&self) -> &LevelSet {
        self.model.levels()
    }

    #[must_use]
    pub fn options(&self) -> ToolOptions {
        self.model.options()
    }

    #[must_use]
    pub fn instrument(&self) -> &InstrumentSpec {
        &self.instrument
    }

    /// Register the signal consumer. At most one is active; registering
    /// replaces the previous callback.
    pub fn set_consumer(&mut self, consumer: SignalConsumer) {
        self.consumer = Some(consumer);
    }

    /// Register a listener for accepted level changes after an edit.
    pub fn set_on_levels_changed(&mut self, callback: LevelsChangedFn) {
        self.on_levels_changed = Some(callback);
    }

    /// Update the user options, write them through to the store and redraw.
    pub fn set_options(&mut self, options: ToolOptions) {
        self.model.set_options(options);
        let mut stored = self.store.options();
        stored.hide_labels_when_unfocused = options.hide_labels_when_unfocused;
        stored.hide_labels_while_editing = options.hide_labels_while_editing;
        stored.linked_buttons = options.linked_buttons;
        self.store.set_options(stored);
        if let Err(e) = self.store.persist() {
            log::warn!("failed to persist options: {e}");
        }
        self.refresh();
    }

    /// Route one raw pointer event and apply the resulting intent.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        if let Some(intent) = self.router.route(event, &*self.surface) {
            self.apply(intent);
        }
    }

    /// Directly set stop-loss and take-profit, clamped toward the entry.
    ///
    /// Fails with the model unchanged when ordering cannot be satisfied
    /// even after clamping.
    pub fn adjust_levels(&mut self, stop_loss: Decimal, take_profit: Decimal) -> Result<(), LevelError> {
        let clamped_sl = geometry::clamp_drag_target(self.model.levels(), LevelKind::StopLoss, stop_loss);
        let clamped_tp =
            geometry::clamp_drag_target(self.model.levels(), LevelKind::TakeProfit, take_profit);
        self.model.set_levels(clamped_sl, clamped_tp)?;
        self.refresh();
        Ok(())
    }

    /// Confirm the planned trade.
    ///
    /// Legal in Visible and Editing; elsewhere a no-op. On success the
    /// registered consumer is invoked exactly once, synchronously. The
    /// controller performs no monitoring afterwards.
    pub fn confirm(&mut self) -> Result<(), SignalError> {
        match self.machine.handle(Trigger::ConfirmPressed) {
            Some(Effect::EmitSignal) => self.emit_signal(),
            _ => Ok(()),
        }
    }

    /// The chart was panned, zoomed or resized; re-derive all visuals.
    pub fn on_bounds_changed(&mut self) {
        self.refresh();
    }

    /// Tear down all derived visuals. Called on instance removal.
    pub fn remove(&mut self) {
        self.view.release(self.surface.as_mut());
    }

    fn apply(&mut self, intent: Intent) {
        match intent {
            Intent::TogglePrimary => self.trigger(Trigger::PrimaryPressed),
            Intent::Confirm => {
                if let Err(e) = self.confirm() {
                    log::warn!("confirm rejected: {e}");
                }
            }
            Intent::BeginLevelDrag(kind) => self.trigger(Trigger::LevelDragBegan(kind)),
            Intent::LevelDragTo(kind, price) => self.drag_level(kind, price),
            // The whole-tool move needs no state change; moves follow.
            Intent::BeginToolMove => {}
            Intent::MoveToolTo(price) => self.move_tool(price),
            Intent::EndDrag => self.trigger(Trigger::DragEnded),
            Intent::OpenMenu(pos) => self.open_menu(pos),
            Intent::GearPressed => self.trigger(Trigger::GearClicked),
            Intent::ToggleDirection => self.trigger(Trigger::FlipClicked),
            Intent::OutsidePressed => self.trigger(Trigger::OutsideClicked),
            Intent::ButtonDragTo(kind, pos) => self.drag_button(kind, pos, false),
            Intent::ButtonDragReleased(kind, pos) => self.drag_button(kind, pos, true),
            Intent::HoverChanged(_) => {
                if self.model.options().hide_labels_when_unfocused {
                    self.refresh();
                }
            }
        }
    }

    fn trigger(&mut self, trigger: Trigger) {
        if let Some(effect) = self.machine.handle(trigger) {
            self.perform(effect);
        }
    }

    fn perform(&mut self, effect: Effect) {
        match effect {
            Effect::ShowWithDefaults => {
                let price = self.surface.current_price();
                let direction = self.model.levels().direction;
                if let Err(e) = self.model.reset(price, direction, &self.instrument) {
                    log::warn!("cannot reset levels at market price {price}: {e}");
                }
                self.refresh();
            }
            Effect::ReleaseVisuals => {
                // Hidden state: the refresh redraws only the buttons.
                self.refresh();
            }
            Effect::BeginEdit => {
                self.labels_suppressed_in_edit = self.model.options().hide_labels_while_editing;
                self.refresh();
            }
            Effect::EndEdit => {
                self.refresh();
                if !self.labels_suppressed_in_edit {
                    let levels = *self.model.levels();
                    if let Some(callback) = &mut self.on_levels_changed {
                        callback(&levels);
                    }
                }
            }
            Effect::OpenMenu | Effect::OpenConfig => self.refresh(),
            Effect::ClosePopup => {
                self.view.clear_popup_anchor();
                self.refresh();
            }
            Effect::FlipDirection => match self.model.flip_direction() {
                Ok(_) => self.refresh(),
                Err(e) => log::warn!("flip rejected: {e}"),
            },
            Effect::EmitSignal => {
                if let Err(e) = self.emit_signal() {
                    log::warn!("signal construction failed: {e}");
                }
            }
        }
    }

    fn open_menu(&mut self, pos: ScreenPos) {
        self.view.set_popup_anchor(pos);
        if self.machine.state() == ToolState::Visible {
            self.trigger(Trigger::EntryDoubleClicked);
        } else {
            self.view.clear_popup_anchor();
        }
    }

    fn drag_level(&mut self, kind: LevelKind, proposed: Decimal) {
        if self.machine.state() != ToolState::Editing || kind == LevelKind::Entry {
            return;
        }
        let vis = self.surface.visible_bounds();
        let proposed = geometry::clamp_to_chart_bounds(proposed, vis.min_price, vis.max_price);
        let clamped = geometry::clamp_drag_target(self.model.levels(), kind, proposed);
        match self.model.apply_drag(kind, clamped) {
            Ok(_) => self.refresh(),
            // Proposal stuck at the entry boundary; the line keeps its
            // last valid position.
            Err(e) => log::debug!("drag rejected: {e}"),
        }
    }

    fn move_tool(&mut self, proposed: Decimal) {
        if self.machine.state() != ToolState::Visible {
            return;
        }
        let vis = self.surface.visible_bounds();
        let entry = geometry::clamp_to_chart_bounds(proposed, vis.min_price, vis.max_price);
        match self.model.set_entry(entry) {
            Ok(_) => self.refresh(),
            Err(e) => log::debug!("tool move rejected: {e}"),
        }
    }

    fn drag_button(&mut self, kind: ButtonKind, pos: ScreenPos, released: bool) {
        let (dx, dy) = match kind {
            ButtonKind::Primary => (pos.x - self.buttons.primary.x, pos.y - self.buttons.primary.y),
            ButtonKind::Confirm => (pos.x - self.buttons.confirm.x, pos.y - self.buttons.confirm.y),
        };
        let linked = self.model.options().linked_buttons;
        match kind {
            ButtonKind::Primary => {
                self.buttons.primary.x += dx;
                self.buttons.primary.y += dy;
                if linked {
                    self.buttons.confirm.x += dx;
                    self.buttons.confirm.y += dy;
                }
            }
            ButtonKind::Confirm => {
                self.buttons.confirm.x += dx;
                self.buttons.confirm.y += dy;
                if linked {
                    self.buttons.primary.x += dx;
                    self.buttons.primary.y += dy;
                }
            }
        }
        self.refresh();

        if released {
            self.store.set_buttons(self.buttons);
            if let Err(e) = self.store.persist() {
                log::warn!("failed to persist button positions: {e}");
            }
        }
    }

    fn emit_signal(&mut self) -> Result<(), SignalError> {
        let levels = self.model.levels();
        let stop_pips =
            geometry::pips_between(levels.entry, levels.stop_loss, self.instrument.pip_size)
                .round_dp(1);
        let signal = Signal::open(levels.direction, stop_pips, &self.instrument.name)?;
        log::info!("emitting {signal}");
        if let Some(consumer) = &mut self.consumer {
            consumer(signal);
        }
        Ok(())
    }

    fn refresh(&mut self) {
        // The router's hover flag is the single source of truth; it stays
        // current even through drags, which suppress the hover intent.
        let hover_inside = self.router.hover_inside();
        let bounds = self.view.refresh(
            &self.model,
            self.machine.state(),
            hover_inside,
            &self.buttons,
            &self.instrument,
            self.surface.as_mut(),
        );
        self.router.set_bounds(bounds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{MockSurface, VisibleBounds};
    use riskline_config::{Config, MemoryConfigStore};
    use rust_decimal_macros::dec;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn surface() -> MockSurface {
        MockSurface::new(
            VisibleBounds {
                min_price: dec!(1.08),
                max_price: dec!(1.12),
                pixel_width: 800.0,
                pixel_height: 400.0,
            },
            dec!(1.10000),
        )
    }

    fn controller_with(surface: MockSurface) -> ToolController {
        ToolController::new(
            ToolId::new(),
            Box::new(surface),
            Box::new(MemoryConfigStore::default()),
            InstrumentSpec::default(),
            Direction::Buy,
        )
        .unwrap()
    }

    fn click(controller: &mut ToolController, pos: ScreenPos, time_ms: u64) {
        controller.handle_pointer(PointerEvent::Press { pos, time_ms });
        controller.handle_pointer(PointerEvent::Release {
            pos,
            time_ms: time_ms + 40,
        });
    }

    fn show(controller: &mut ToolController, time_ms: u64) {
        // Primary button defaults to (20, 20) 96x28.
        click(controller, ScreenPos::new(30.0, 30.0), time_ms);
    }

    #[test]
    fn test_primary_click_shows_and_hides() {
        let surface = surface();
        let log = surface.log();
        let mut controller = controller_with(surface);
        assert_eq!(controller.state(), ToolState::Hidden);
        assert_eq!(log.borrow().line_count(), 0);

        show(&mut controller, 0);
        assert_eq!(controller.state(), ToolState::Visible);
        assert_eq!(log.borrow().line_count(), 3);
        assert_eq!(controller.levels().stop_loss, dec!(1.09900));
        assert_eq!(controller.levels().take_profit, dec!(1.10200));

        show(&mut controller, 1000);
        assert_eq!(controller.state(), ToolState::Hidden);
        assert_eq!(log.borrow().line_count(), 0);
    }

    #[test]
    fn test_stop_drag_updates_level() {
        let mut controller = controller_with(surface());
        show(&mut controller, 0);

        // Stop line sits at y=210 (price 1.09900). Drag it to y=250
        // (price 1.09500).
        controller.handle_pointer(PointerEvent::Press {
            pos: ScreenPos::new(400.0, 210.0),
            time_ms: 1000,
        });
        assert_eq!(controller.state(), ToolState::Editing);
        controller.handle_pointer(PointerEvent::Move {
            pos: ScreenPos::new(400.0, 250.0),
            time_ms: 1016,
        });
        assert_eq!(controller.levels().stop_loss, dec!(1.095));
        controller.handle_pointer(PointerEvent::Release {
            pos: ScreenPos::new(400.0, 250.0),
            time_ms: 1050,
        });
        assert_eq!(controller.state(), ToolState::Visible);
    }

    #[test]
    fn test_stop_drag_above_entry_sticks() {
        let mut controller = controller_with(surface());
        show(&mut controller, 0);

        // Propose 1.10050, above the buy entry: the model must not apply it.
        controller.handle_pointer(PointerEvent::Press {
            pos: ScreenPos::new(400.0, 210.0),
            time_ms: 1000,
        });
        controller.handle_pointer(PointerEvent::Move {
            pos: ScreenPos::new(400.0, 195.0),
            time_ms: 1016,
        });
        assert_eq!(controller.levels().stop_loss, dec!(1.09900));
        assert_eq!(controller.levels().entry, dec!(1.10000));
    }

    #[test]
    fn test_entry_drag_moves_whole_set() {
        let mut controller = controller_with(surface());
        show(&mut controller, 0);

        // Entry line at y=200; drag to y=180 (price 1.10200).
        controller.handle_pointer(PointerEvent::Press {
            pos: ScreenPos::new(400.0, 200.0),
            time_ms: 1000,
        });
        controller.handle_pointer(PointerEvent::Move {
            pos: ScreenPos::new(400.0, 180.0),
            time_ms: 1016,
        });
        controller.handle_pointer(PointerEvent::Release {
            pos: ScreenPos::new(400.0, 180.0),
            time_ms: 1050,
        });
        assert_eq!(controller.levels().entry, dec!(1.10200));
        assert_eq!(controller.levels().stop_loss, dec!(1.10100));
        assert_eq!(controller.levels().take_profit, dec!(1.10400));
        assert_eq!(controller.state(), ToolState::Visible);
    }

    #[test]
    fn test_confirm_invokes_consumer_exactly_once() {
        let mut controller = controller_with(surface());
        let received: Rc<RefCell<Vec<Signal>>> = Rc::default();
        let sink = Rc::clone(&received);
        controller.set_consumer(Box::new(move |signal| sink.borrow_mut().push(signal)));

        show(&mut controller, 0);
        // Confirm button defaults to (20, 56) 96x28.
        click(&mut controller, ScreenPos::new(30.0, 60.0), 1000);

        let signals = received.borrow();
        assert_eq!(signals.len(), 1);
        let signal = &signals[0];
        assert_eq!(signal.operation_type(), Some(Direction::Buy));
        assert_eq!(signal.stop_pips(), Some(dec!(10.0)));
        assert_eq!(signal.instrument(), "EURUSD");
        let json = signal.to_json().unwrap();
        assert!(json.contains("\"stopPips\":10.0"));
        assert_eq!(controller.state(), ToolState::Visible);
    }

    #[test]
    fn test_confirm_while_hidden_is_noop() {
        let mut controller = controller_with(surface());
        let received: Rc<RefCell<Vec<Signal>>> = Rc::default();
        let sink = Rc::clone(&received);
        controller.set_consumer(Box::new(move |signal| sink.borrow_mut().push(signal)));

        controller.confirm().unwrap();
        click(&mut controller, ScreenPos::new(30.0, 60.0), 0);
        assert!(received.borrow().is_empty());
    }

    #[test]
    fn test_menu_flip_and_close() {
        let mut controller = controller_with(surface());
        show(&mut controller, 0);

        // Double-click the entry line at y=200.
        let entry = ScreenPos::new(400.0, 200.0);
        click(&mut controller, entry, 1000);
        click(&mut controller, entry, 1100);
        assert_eq!(controller.state(), ToolState::MenuOpen);

        // The flip control lives inside the popup anchored at the click.
        click(&mut controller, ScreenPos::new(420.0, 215.0), 2000);
        assert_eq!(controller.state(), ToolState::MenuOpen);
        assert_eq!(controller.levels().direction, Direction::Sell);
        assert_eq!(controller.levels().stop_loss, dec!(1.10100));
        assert_eq!(controller.levels().take_profit, dec!(1.09800));

        // Clicking outside discards the popup but keeps the flip.
        click(&mut controller, ScreenPos::new(700.0, 390.0), 3000);
        assert_eq!(controller.state(), ToolState::Visible);
        assert_eq!(controller.levels().direction, Direction::Sell);
    }

    #[test]
    fn test_adjust_levels_validation() {
        let mut controller = controller_with(surface());
        show(&mut controller, 0);

        controller.adjust_levels(dec!(1.09500), dec!(1.10500)).unwrap();
        assert_eq!(controller.levels().stop_loss, dec!(1.09500));
        assert_eq!(controller.levels().take_profit, dec!(1.10500));

        // Both proposals on the wrong side clamp to entry and then fail
        // validation; the model keeps its previous values.
        let err = controller.adjust_levels(dec!(1.11000), dec!(1.09000)).unwrap_err();
        assert!(matches!(err, LevelError::OrderingViolation { .. }));
        assert_eq!(controller.levels().stop_loss, dec!(1.09500));
    }

    #[test]
    fn test_levels_changed_announced_after_edit() {
        let mut controller = controller_with(surface());
        let changes: Rc<RefCell<Vec<LevelSet>>> = Rc::default();
        let sink = Rc::clone(&changes);
        controller.set_on_levels_changed(Box::new(move |levels| {
            sink.borrow_mut().push(*levels);
        }));
        show(&mut controller, 0);

        controller.handle_pointer(PointerEvent::Press {
            pos: ScreenPos::new(400.0, 210.0),
            time_ms: 1000,
        });
        controller.handle_pointer(PointerEvent::Move {
            pos: ScreenPos::new(400.0, 250.0),
            time_ms: 1016,
        });
        controller.handle_pointer(PointerEvent::Release {
            pos: ScreenPos::new(400.0, 250.0),
            time_ms: 1050,
        });

        let changes = changes.borrow();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].stop_loss, dec!(1.095));
    }

    #[test]
    fn test_button_drag_repositions_and_persists() {
        let mut controller = controller_with(surface());
        controller.handle_pointer(PointerEvent::Press {
            pos: ScreenPos::new(30.0, 30.0),
            time_ms: 0,
        });
        controller.handle_pointer(PointerEvent::Move {
            pos: ScreenPos::new(200.0, 120.0),
            time_ms: 16,
        });
        controller.handle_pointer(PointerEvent::Release {
            pos: ScreenPos::new(200.0, 120.0),
            time_ms: 40,
        });

        // The drag never turned into a click.
        assert_eq!(controller.state(), ToolState::Hidden);
        // Clicking at the new position works.
        click(&mut controller, ScreenPos::new(205.0, 125.0), 1000);
        assert_eq!(controller.state(), ToolState::Visible);
    }

    #[test]
    fn test_hover_stays_current_through_level_drag() {
        let surface = surface();
        let log = surface.log();
        let mut config = Config::default();
        config.options.hide_labels_when_unfocused = true;
        let mut controller = ToolController::new(
            ToolId::new(),
            Box::new(surface),
            Box::new(MemoryConfigStore::new(config)),
            InstrumentSpec::default(),
            Direction::Buy,
        )
        .unwrap();
        show(&mut controller, 0);

        // Hovering into the tool body reveals the labels.
        controller.handle_pointer(PointerEvent::Move {
            pos: ScreenPos::new(400.0, 195.0),
            time_ms: 500,
        });
        assert!(log.borrow().texts().iter().any(|t| t.contains("SL")));

        // Drag the stop line far above the entry; the proposal clamps and
        // the pointer leaves the bounding box before release.
        controller.handle_pointer(PointerEvent::Press {
            pos: ScreenPos::new(400.0, 210.0),
            time_ms: 1000,
        });
        controller.handle_pointer(PointerEvent::Move {
            pos: ScreenPos::new(400.0, 100.0),
            time_ms: 1016,
        });
        controller.handle_pointer(PointerEvent::Release {
            pos: ScreenPos::new(400.0, 100.0),
            time_ms: 1050,
        });

        // The release refresh must see the pointer as outside.
        assert_eq!(controller.state(), ToolState::Visible);
        assert!(!log.borrow().texts().iter().any(|t| t.contains("SL")));

        // Further outside movement keeps them hidden.
        controller.handle_pointer(PointerEvent::Move {
            pos: ScreenPos::new(400.0, 90.0),
            time_ms: 1100,
        });
        assert!(!log.borrow().texts().iter().any(|t| t.contains("SL")));
    }

    #[test]
    fn test_remove_releases_all_visuals() {
        let surface = surface();
        let log = surface.log();
        let mut controller = controller_with(surface);
        show(&mut controller, 0);
        assert!(!log.borrow().live.is_empty());
        controller.remove();
        assert!(log.borrow().live.is_empty());
    }
}
