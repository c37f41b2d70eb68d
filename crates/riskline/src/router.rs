//! Pointer event routing.
//!
//! Single entry point for raw pointer input. For every event the router
//! determines which drawable element the pointer targets, using the
//! element's last-known screen bounds, classifies the gesture (press,
//! double-press, drag past a small threshold, release, hover change) and
//! forwards exactly one typed [`Intent`] for the controller to apply.
//!
//! Gesture classification lives here so each mapping is testable without a
//! state machine or model attached.

use rust_decimal::Decimal;

use riskline_core::LevelKind;

use crate::surface::{RenderSurface, ScreenPos, ScreenRect};

/// Two presses within this window and distance count as a double-press.
pub const DOUBLE_PRESS_MS: u64 = 400;
pub const DOUBLE_PRESS_DIST: f32 = 5.0;
/// Movement past this distance turns a button press into a drag.
pub const DRAG_THRESHOLD: f32 = 3.0;

/// Raw pointer event, in screen coordinates with a host timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Press { pos: ScreenPos, time_ms: u64 },
    Move { pos: ScreenPos, time_ms: u64 },
    Release { pos: ScreenPos, time_ms: u64 },
}

impl PointerEvent {
    #[must_use]
    pub fn pos(&self) -> ScreenPos {
        match self {
            PointerEvent::Press { pos, .. }
            | PointerEvent::Move { pos, .. }
            | PointerEvent::Release { pos, .. } => *pos,
        }
    }
}

/// The two repositionable action buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonKind {
    Primary,
    Confirm,
}

/// Which drawable element a pointer position lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    GearIcon,
    FlipControl,
    Popup,
    PrimaryButton,
    ConfirmButton,
    EntryLine,
    StopLine,
    TargetLine,
    ToolBody,
    Outside,
}

/// Last-known screen bounds of every drawable element, published by the
/// view after each refresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementBounds {
    pub entry_line: Option<ScreenRect>,
    pub stop_line: Option<ScreenRect>,
    pub target_line: Option<ScreenRect>,
    /// Bounding box of the whole tool, drives hover.
    pub tool_bbox: Option<ScreenRect>,
    pub primary_button: Option<ScreenRect>,
    pub confirm_button: Option<ScreenRect>,
    pub popup: Option<ScreenRect>,
    pub gear_icon: Option<ScreenRect>,
    pub flip_control: Option<ScreenRect>,
}

impl ElementBounds {
    /// Classify a position against the element bounds.
    ///
    /// Popup internals win over everything, then buttons, then the level
    /// lines, then the tool body.
    #[must_use]
    pub fn hit_test(&self, pos: ScreenPos) -> HitTarget {
        let hit = |rect: Option<ScreenRect>| rect.is_some_and(|r| r.contains(pos));

        if hit(self.gear_icon) {
            HitTarget::GearIcon
        } else if hit(self.flip_control) {
            HitTarget::FlipControl
        } else if hit(self.popup) {
            HitTarget::Popup
        } else if hit(self.primary_button) {
            HitTarget::PrimaryButton
        } else if hit(self.confirm_button) {
            HitTarget::ConfirmButton
        } else if hit(self.entry_line) {
            HitTarget::EntryLine
        } else if hit(self.stop_line) {
            HitTarget::StopLine
        } else if hit(self.target_line) {
            HitTarget::TargetLine
        } else if hit(self.tool_bbox) {
            HitTarget::ToolBody
        } else {
            HitTarget::Outside
        }
    }
}

/// Typed intention produced from one pointer event.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Primary-action button clicked: show or hide the tool.
    TogglePrimary,
    /// Confirm-action button clicked.
    Confirm,
    /// A stop or target line drag started.
    BeginLevelDrag(LevelKind),
    /// Dragged level proposes a new price.
    LevelDragTo(LevelKind, Decimal),
    /// Entry line grabbed; the whole tool will move.
    BeginToolMove,
    /// Whole tool proposes a new entry price.
    MoveToolTo(Decimal),
    /// Active level/tool drag released.
    EndDrag,
    /// Entry line double-clicked; open the popup near this point.
    OpenMenu(ScreenPos),
    /// Gear icon clicked inside the popup.
    GearPressed,
    /// Flip control clicked inside the popup.
    ToggleDirection,
    /// Press landed outside the open popup.
    OutsidePressed,
    /// A button is being dragged; the position is its proposed top-left
    /// corner, pre-adjusted for where inside the button it was grabbed.
    ButtonDragTo(ButtonKind, ScreenPos),
    /// Button drag released; the position is the final top-left corner.
    ButtonDragReleased(ButtonKind, ScreenPos),
    /// Pointer crossed the tool's bounding box.
    HoverChanged(bool),
}

#[derive(Debug, Clone, Copy)]
enum ActiveDrag {
    Level(LevelKind),
    Tool,
    /// Grab offset from the button's top-left corner to the press point.
    Button(ButtonKind, ScreenPos),
}

#[derive(Debug, Clone, Copy)]
struct PendingPress {
    button: ButtonKind,
    start: ScreenPos,
}

/// Stateful gesture classifier for one tool instance.
#[derive(Debug, Default)]
pub struct EventRouter {
    bounds: ElementBounds,
    last_press: Option<(ScreenPos, u64)>,
    pending: Option<PendingPress>,
    drag: Option<ActiveDrag>,
    hover_inside: bool,
}

impl EventRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the element bounds after a view refresh.
    pub fn set_bounds(&mut self, bounds: ElementBounds) {
        self.bounds = bounds;
    }

    #[must_use]
    pub fn bounds(&self) -> &ElementBounds {
        &self.bounds
    }

    /// Whether the pointer was inside the tool bbox on the last move.
    #[must_use]
    pub fn hover_inside(&self) -> bool {
        self.hover_inside
    }

    /// Classify one pointer event into at most one intent.
    ///
    /// The surface converts drag positions into prices; everything else is
    /// pure screen-space logic.
    pub fn route(&mut self, event: PointerEvent, surface: &dyn RenderSurface) -> Option<Intent> {
        match event {
            PointerEvent::Press { pos, time_ms } => self.on_press(pos, time_ms),
            PointerEvent::Move { pos, .. } => self.on_move(pos, surface),
            PointerEvent::Release { pos, .. } => self.on_release(pos),
        }
    }

    fn on_press(&mut self, pos: ScreenPos, time_ms: u64) -> Option<Intent> {
        let double = self
            .last_press
            .is_some_and(|(prev_pos, prev_ms)| {
                time_ms.saturating_sub(prev_ms) <= DOUBLE_PRESS_MS
                    && prev_pos.distance_to(pos) <= DOUBLE_PRESS_DIST
            });
        // A consumed double-press must not chain into a triple.
        self.last_press = if double { None } else { Some((pos, time_ms)) };

        let hit = self.bounds.hit_test(pos);
        match hit {
            HitTarget::GearIcon => Some(Intent::GearPressed),
            HitTarget::FlipControl => Some(Intent::ToggleDirection),
            HitTarget::Popup => None,
            _ if self.bounds.popup.is_some() => Some(Intent::OutsidePressed),
            HitTarget::PrimaryButton => {
                self.pending = Some(PendingPress {
                    button: ButtonKind::Primary,
                    start: pos,
                });
                None
            }
            HitTarget::ConfirmButton => {
                self.pending = Some(PendingPress {
                    button: ButtonKind::Confirm,
                    start: pos,
                });
                None
            }
            HitTarget::EntryLine => {
                if double {
                    self.drag = None;
                    Some(Intent::OpenMenu(pos))
                } else {
                    self.drag = Some(ActiveDrag::Tool);
                    Some(Intent::BeginToolMove)
                }
            }
            HitTarget::StopLine => {
                self.drag = Some(ActiveDrag::Level(LevelKind::StopLoss));
                Some(Intent::BeginLevelDrag(LevelKind::StopLoss))
            }
            HitTarget::TargetLine => {
                self.drag = Some(ActiveDrag::Level(LevelKind::TakeProfit));
                Some(Intent::BeginLevelDrag(LevelKind::TakeProfit))
            }
            HitTarget::ToolBody | HitTarget::Outside => None,
        }
    }

    fn on_move(&mut self, pos: ScreenPos, surface: &dyn RenderSurface) -> Option<Intent> {
        // Hover is recomputed on every move; it only surfaces as an intent
        // when nothing else claims the event.
        let inside = self
            .bounds
            .tool_bbox
            .is_some_and(|bbox| bbox.contains(pos));
        let hover_changed = inside != self.hover_inside;
        self.hover_inside = inside;

        if let Some(drag) = self.drag {
            return Some(match drag {
                ActiveDrag::Level(kind) => Intent::LevelDragTo(kind, surface.pixel_to_price(pos.y)),
                ActiveDrag::Tool => Intent::MoveToolTo(surface.pixel_to_price(pos.y)),
                ActiveDrag::Button(kind, grab) => {
                    Intent::ButtonDragTo(kind, ScreenPos::new(pos.x - grab.x, pos.y - grab.y))
                }
            });
        }

        if let Some(pending) = self.pending {
            if pending.start.distance_to(pos) > DRAG_THRESHOLD {
                self.pending = None;
                let grab = self.button_grab(pending.button, pending.start);
                self.drag = Some(ActiveDrag::Button(pending.button, grab));
                return Some(Intent::ButtonDragTo(
                    pending.button,
                    ScreenPos::new(pos.x - grab.x, pos.y - grab.y),
                ));
            }
        }

        if hover_changed {
            return Some(Intent::HoverChanged(inside));
        }
        None
    }

    /// Offset from the button's top-left corner to the press point.
    fn button_grab(&self, button: ButtonKind, start: ScreenPos) -> ScreenPos {
        let rect = match button {
            ButtonKind::Primary => self.bounds.primary_button,
            ButtonKind::Confirm => self.bounds.confirm_button,
        };
        rect.map_or(ScreenPos::default(), |r| {
            ScreenPos::new(start.x - r.x, start.y - r.y)
        })
    }

    fn on_release(&mut self, pos: ScreenPos) -> Option<Intent> {
        if let Some(drag) = self.drag.take() {
            return Some(match drag {
                ActiveDrag::Level(_) | ActiveDrag::Tool => Intent::EndDrag,
                ActiveDrag::Button(kind, grab) => Intent::ButtonDragReleased(
                    kind,
                    ScreenPos::new(pos.x - grab.x, pos.y - grab.y),
                ),
            });
        }
        if let Some(pending) = self.pending.take() {
            return Some(match pending.button {
                ButtonKind::Primary => Intent::TogglePrimary,
                ButtonKind::Confirm => Intent::Confirm,
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{MockSurface, VisibleBounds};
    use rust_decimal_macros::dec;

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

    /// Bounds with entry at y=200, stop at y=300, target at y=100 and the
    /// buttons in the top-left corner.
    fn bounds() -> ElementBounds {
        ElementBounds {
            entry_line: Some(ScreenRect::around_y(200.0, 800.0, 4.0)),
            stop_line: Some(ScreenRect::around_y(300.0, 800.0, 4.0)),
            target_line: Some(ScreenRect::around_y(100.0, 800.0, 4.0)),
            tool_bbox: Some(ScreenRect::new(0.0, 90.0, 800.0, 220.0)),
            primary_button: Some(ScreenRect::new(20.0, 20.0, 96.0, 28.0)),
            confirm_button: Some(ScreenRect::new(20.0, 56.0, 96.0, 28.0)),
            ..ElementBounds::default()
        }
    }

    fn router() -> EventRouter {
        let mut router = EventRouter::new();
        router.set_bounds(bounds());
        router
    }

    fn press(pos: ScreenPos, time_ms: u64) -> PointerEvent {
        PointerEvent::Press { pos, time_ms }
    }

    fn mv(pos: ScreenPos, time_ms: u64) -> PointerEvent {
        PointerEvent::Move { pos, time_ms }
    }

    fn release(pos: ScreenPos, time_ms: u64) -> PointerEvent {
        PointerEvent::Release { pos, time_ms }
    }

    #[test]
    fn test_hit_test_priority() {
        let b = bounds();
        assert_eq!(b.hit_test(ScreenPos::new(400.0, 200.0)), HitTarget::EntryLine);
        assert_eq!(b.hit_test(ScreenPos::new(400.0, 300.0)), HitTarget::StopLine);
        assert_eq!(b.hit_test(ScreenPos::new(400.0, 100.0)), HitTarget::TargetLine);
        assert_eq!(b.hit_test(ScreenPos::new(30.0, 30.0)), HitTarget::PrimaryButton);
        assert_eq!(b.hit_test(ScreenPos::new(30.0, 60.0)), HitTarget::ConfirmButton);
        assert_eq!(b.hit_test(ScreenPos::new(400.0, 150.0)), HitTarget::ToolBody);
        assert_eq!(b.hit_test(ScreenPos::new(400.0, 390.0)), HitTarget::Outside);
    }

    #[test]
    fn test_stop_line_press_begins_level_drag() {
        let mut r = router();
        let s = surface();
        let intent = r.route(press(ScreenPos::new(400.0, 300.0), 0), &s);
        assert_eq!(intent, Some(Intent::BeginLevelDrag(LevelKind::StopLoss)));

        // y=250 maps to price 1.095.
        let intent = r.route(mv(ScreenPos::new(400.0, 250.0), 16), &s);
        assert_eq!(
            intent,
            Some(Intent::LevelDragTo(LevelKind::StopLoss, dec!(1.095)))
        );

        let intent = r.route(release(ScreenPos::new(400.0, 250.0), 32), &s);
        assert_eq!(intent, Some(Intent::EndDrag));
    }

    #[test]
    fn test_entry_drag_moves_whole_tool() {
        let mut r = router();
        let s = surface();
        assert_eq!(
            r.route(press(ScreenPos::new(400.0, 200.0), 0), &s),
            Some(Intent::BeginToolMove)
        );
        assert_eq!(
            r.route(mv(ScreenPos::new(400.0, 180.0), 16), &s),
            Some(Intent::MoveToolTo(dec!(1.102)))
        );
        assert_eq!(
            r.route(release(ScreenPos::new(400.0, 180.0), 32), &s),
            Some(Intent::EndDrag)
        );
    }

    #[test]
    fn test_double_press_on_entry_opens_menu() {
        let mut r = router();
        let s = surface();
        let pos = ScreenPos::new(400.0, 200.0);
        assert_eq!(r.route(press(pos, 0), &s), Some(Intent::BeginToolMove));
        assert_eq!(r.route(release(pos, 50), &s), Some(Intent::EndDrag));
        assert_eq!(r.route(press(pos, 200), &s), Some(Intent::OpenMenu(pos)));
    }

    #[test]
    fn test_slow_second_press_is_not_a_double() {
        let mut r = router();
        let s = surface();
        let pos = ScreenPos::new(400.0, 200.0);
        r.route(press(pos, 0), &s);
        r.route(release(pos, 50), &s);
        assert_eq!(
            r.route(press(pos, 0 + DOUBLE_PRESS_MS + 1), &s),
            Some(Intent::BeginToolMove)
        );
    }

    #[test]
    fn test_distant_second_press_is_not_a_double() {
        let mut r = router();
        let s = surface();
        r.route(press(ScreenPos::new(100.0, 200.0), 0), &s);
        r.route(release(ScreenPos::new(100.0, 200.0), 20), &s);
        assert_eq!(
            r.route(press(ScreenPos::new(300.0, 200.0), 100), &s),
            Some(Intent::BeginToolMove)
        );
    }

    #[test]
    fn test_button_click_fires_on_release() {
        let mut r = router();
        let s = surface();
        let pos = ScreenPos::new(30.0, 30.0);
        assert_eq!(r.route(press(pos, 0), &s), None);
        assert_eq!(r.route(release(pos, 40), &s), Some(Intent::TogglePrimary));

        let pos = ScreenPos::new(30.0, 60.0);
        assert_eq!(r.route(press(pos, 100), &s), None);
        assert_eq!(r.route(release(pos, 140), &s), Some(Intent::Confirm));
    }

    #[test]
    fn test_button_drag_suppresses_click() {
        let mut r = router();
        let s = surface();
        // Grabbed 10px inside the button at (20, 20).
        assert_eq!(r.route(press(ScreenPos::new(30.0, 30.0), 0), &s), None);
        // Move past the drag threshold converts the press into a drag; the
        // intent carries the proposed top-left corner.
        let intent = r.route(mv(ScreenPos::new(40.0, 30.0), 16), &s);
        assert_eq!(
            intent,
            Some(Intent::ButtonDragTo(ButtonKind::Primary, ScreenPos::new(30.0, 20.0)))
        );
        let intent = r.route(release(ScreenPos::new(60.0, 35.0), 32), &s);
        assert_eq!(
            intent,
            Some(Intent::ButtonDragReleased(ButtonKind::Primary, ScreenPos::new(50.0, 25.0)))
        );
    }

    #[test]
    fn test_tiny_button_move_still_clicks() {
        let mut r = router();
        let s = surface();
        r.route(press(ScreenPos::new(30.0, 30.0), 0), &s);
        assert_eq!(r.route(mv(ScreenPos::new(31.0, 30.0), 16), &s), None);
        assert_eq!(
            r.route(release(ScreenPos::new(31.0, 30.0), 32), &s),
            Some(Intent::TogglePrimary)
        );
    }

    #[test]
    fn test_hover_enter_and_exit() {
        let mut r = router();
        let s = surface();
        assert_eq!(
            r.route(mv(ScreenPos::new(400.0, 150.0), 0), &s),
            Some(Intent::HoverChanged(true))
        );
        assert!(r.hover_inside());
        // Moving within the bbox produces nothing further.
        assert_eq!(r.route(mv(ScreenPos::new(420.0, 160.0), 16), &s), None);
        assert_eq!(
            r.route(mv(ScreenPos::new(400.0, 390.0), 32), &s),
            Some(Intent::HoverChanged(false))
        );
        assert!(!r.hover_inside());
    }

    #[test]
    fn test_popup_click_routing() {
        let mut r = router();
        let s = surface();
        let mut b = bounds();
        b.popup = Some(ScreenRect::new(300.0, 150.0, 140.0, 70.0));
        b.gear_icon = Some(ScreenRect::new(410.0, 155.0, 20.0, 20.0));
        b.flip_control = Some(ScreenRect::new(310.0, 155.0, 60.0, 20.0));
        r.set_bounds(b);

        assert_eq!(
            r.route(press(ScreenPos::new(420.0, 160.0), 0), &s),
            Some(Intent::GearPressed)
        );
        assert_eq!(
            r.route(press(ScreenPos::new(320.0, 160.0), 500), &s),
            Some(Intent::ToggleDirection)
        );
        // Inside the popup body: consumed without an intent.
        assert_eq!(r.route(press(ScreenPos::new(350.0, 210.0), 1000), &s), None);
        // Anywhere else while the popup is open counts as outside.
        assert_eq!(
            r.route(press(ScreenPos::new(400.0, 300.0), 1500), &s),
            Some(Intent::OutsidePressed)
        );
    }

    #[test]
    fn test_press_outside_everything_is_silent() {
        let mut r = router();
        let s = surface();
        assert_eq!(r.route(press(ScreenPos::new(700.0, 395.0), 0), &s), None);
        assert_eq!(r.route(release(ScreenPos::new(700.0, 395.0), 30), &s), None);
    }
}
