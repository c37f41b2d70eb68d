//! Rendering surface boundary.
//!
//! The core never paints. It describes lines, rectangles and text to an
//! external [`RenderSurface`], which owns the actual drawing objects and the
//! pixel<->price mapping. Draw failures are boundary errors: callers log and
//! skip them, they never propagate as a crash.

use std::cell::RefCell;
use std::rc::Rc;

use rust_decimal::Decimal;
use thiserror::Error;

/// Screen coordinates in pixels from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPos {
    pub x: f32,
    pub y: f32,
}

impl ScreenPos {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Distance to another screen position.
    #[must_use]
    pub fn distance_to(self, other: ScreenPos) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Axis-aligned rectangle in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle centered vertically on `y` spanning the full `width`.
    #[must_use]
    pub fn around_y(y: f32, width: f32, half_height: f32) -> Self {
        Self::new(0.0, y - half_height, width, half_height * 2.0)
    }

    #[must_use]
    pub fn contains(&self, pos: ScreenPos) -> bool {
        pos.x >= self.x
            && pos.x < self.x + self.width
            && pos.y >= self.y
            && pos.y < self.y + self.height
    }

    #[must_use]
    pub fn center(&self) -> ScreenPos {
        ScreenPos::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Currently visible chart range reported by the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleBounds {
    pub min_price: Decimal,
    pub max_price: Decimal,
    pub pixel_width: f32,
    pub pixel_height: f32,
}

/// Opaque handle to a drawable object owned by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawHandle(pub u64);

/// RGBA color, components in 0..=1.
pub type Color = [f32; 4];

pub const ENTRY_COLOR: Color = [0.85, 0.7, 0.1, 1.0];
pub const STOP_COLOR: Color = [0.9, 0.3, 0.3, 1.0];
pub const TARGET_COLOR: Color = [0.2, 0.7, 0.4, 1.0];
pub const RISK_FILL: Color = [0.9, 0.3, 0.3, 0.12];
pub const REWARD_FILL: Color = [0.2, 0.7, 0.4, 0.12];
pub const BUTTON_FILL: Color = [0.2, 0.2, 0.25, 0.9];
pub const POPUP_FILL: Color = [0.15, 0.15, 0.18, 0.95];

/// Line drawing style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub color: Color,
    pub width: f32,
    pub dashed: bool,
}

impl LineStyle {
    #[must_use]
    pub const fn solid(color: Color) -> Self {
        Self {
            color,
            width: 1.5,
            dashed: false,
        }
    }

    #[must_use]
    pub const fn dashed(color: Color) -> Self {
        Self {
            color,
            width: 1.0,
            dashed: true,
        }
    }
}

/// Rectangle drawing style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectStyle {
    pub fill: Color,
    pub border: Option<Color>,
}

/// Text drawing style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub color: Color,
    pub size: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: [0.9, 0.9, 0.9, 1.0],
            size: 12.0,
        }
    }
}

/// Errors reported by the rendering surface.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SurfaceError {
    #[error("coordinate out of range: {0}")]
    OutOfRange(String),
    #[error("surface rejected draw call: {0}")]
    DrawFailed(String),
}

/// External rendering surface contract.
///
/// All methods are side-effecting but non-failing in the common path.
/// Implementations report failures as [`SurfaceError`]; the core logs and
/// skips the failed primitive.
pub trait RenderSurface {
    fn draw_line(
        &mut self,
        from: ScreenPos,
        to: ScreenPos,
        style: LineStyle,
    ) -> Result<DrawHandle, SurfaceError>;

    fn draw_rect(&mut self, rect: ScreenRect, style: RectStyle)
        -> Result<DrawHandle, SurfaceError>;

    fn draw_text(
        &mut self,
        pos: ScreenPos,
        text: &str,
        style: TextStyle,
    ) -> Result<DrawHandle, SurfaceError>;

    /// Tear down a previously drawn object.
    fn remove(&mut self, handle: DrawHandle);

    /// Currently visible price range and pixel dimensions.
    fn visible_bounds(&self) -> VisibleBounds;

    /// Vertical pixel position of a price.
    fn price_to_pixel(&self, price: Decimal) -> f32;

    /// Price at a vertical pixel position.
    fn pixel_to_price(&self, y: f32) -> Decimal;

    /// Last traded market price, used for default level placement.
    fn current_price(&self) -> Decimal;
}

/// One recorded draw call on the [`MockSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Line {
        handle: DrawHandle,
        from: ScreenPos,
        to: ScreenPos,
        style: LineStyle,
    },
    Rect {
        handle: DrawHandle,
        rect: ScreenRect,
        style: RectStyle,
    },
    Text {
        handle: DrawHandle,
        pos: ScreenPos,
        text: String,
        style: TextStyle,
    },
}

impl DrawCall {
    #[must_use]
    pub fn handle(&self) -> DrawHandle {
        match self {
            DrawCall::Line { handle, .. }
            | DrawCall::Rect { handle, .. }
            | DrawCall::Text { handle, .. } => *handle,
        }
    }
}

/// Shared recording of everything a [`MockSurface`] was asked to draw.
#[derive(Debug, Default)]
pub struct SurfaceLog {
    /// Currently live draw calls, insertion order.
    pub live: Vec<DrawCall>,
    /// Total number of draw calls ever issued.
    pub total_draws: usize,
    /// Total number of removals.
    pub total_removals: usize,
}

impl SurfaceLog {
    /// Live text contents, for label assertions.
    #[must_use]
    pub fn texts(&self) -> Vec<String> {
        self.live
            .iter()
            .filter_map(|c| match c {
                DrawCall::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of live line primitives.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.live
            .iter()
            .filter(|c| matches!(c, DrawCall::Line { .. }))
            .count()
    }
}

/// In-memory surface for tests and scripted sessions.
///
/// Maps prices linearly onto a fixed pixel viewport and records every call
/// into a shared log that outlives moves of the surface itself.
#[derive(Debug)]
pub struct MockSurface {
    bounds: VisibleBounds,
    current_price: Decimal,
    next_handle: u64,
    log: Rc<RefCell<SurfaceLog>>,
    /// When set, every draw call fails; exercises the boundary-error path.
    pub fail_draws: bool,
}

impl MockSurface {
    pub fn new(bounds: VisibleBounds, current_price: Decimal) -> Self {
        Self {
            bounds,
            current_price,
            next_handle: 1,
            log: Rc::new(RefCell::new(SurfaceLog::default())),
            fail_draws: false,
        }
    }

    /// Shared handle onto the recorded draw calls.
    #[must_use]
    pub fn log(&self) -> Rc<RefCell<SurfaceLog>> {
        Rc::clone(&self.log)
    }

    /// Simulate a chart pan/zoom.
    pub fn set_bounds(&mut self, bounds: VisibleBounds) {
        self.bounds = bounds;
    }

    pub fn set_current_price(&mut self, price: Decimal) {
        self.current_price = price;
    }

    /// Coordinates must be finite; NaN or infinity cannot be projected.
    fn check_coords(coords: &[f32]) -> Result<(), SurfaceError> {
        match coords.iter().find(|c| !c.is_finite()) {
            Some(c) => Err(SurfaceError::OutOfRange(format!(
                "non-finite coordinate {c}"
            ))),
            None => Ok(()),
        }
    }

    fn record(&mut self, call: DrawCall) -> Result<DrawHandle, SurfaceError> {
        if self.fail_draws {
            return Err(SurfaceError::DrawFailed("mock failure".to_string()));
        }
        let handle = call.handle();
        let mut log = self.log.borrow_mut();
        log.live.push(call);
        log.total_draws += 1;
        Ok(handle)
    }

    fn next(&mut self) -> DrawHandle {
        let handle = DrawHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }
}

impl RenderSurface for MockSurface {
    fn draw_line(
        &mut self,
        from: ScreenPos,
        to: ScreenPos,
        style: LineStyle,
    ) -> Result<DrawHandle, SurfaceError> {
        Self::check_coords(&[from.x, from.y, to.x, to.y])?;
        let handle = self.next();
        self.record(DrawCall::Line {
            handle,
            from,
            to,
            style,
        })
    }

    fn draw_rect(
        &mut self,
        rect: ScreenRect,
        style: RectStyle,
    ) -> Result<DrawHandle, SurfaceError> {
        Self::check_coords(&[rect.x, rect.y, rect.width, rect.height])?;
        let handle = self.next();
        self.record(DrawCall::Rect {
            handle,
            rect,
            style,
        })
    }

    fn draw_text(
        &mut self,
        pos: ScreenPos,
        text: &str,
        style: TextStyle,
    ) -> Result<DrawHandle, SurfaceError> {
        Self::check_coords(&[pos.x, pos.y])?;
        let handle = self.next();
        self.record(DrawCall::Text {
            handle,
            pos,
            text: text.to_string(),
            style,
        })
    }

    fn remove(&mut self, handle: DrawHandle) {
        let mut log = self.log.borrow_mut();
        let before = log.live.len();
        log.live.retain(|c| c.handle() != handle);
        if log.live.len() < before {
            log.total_removals += 1;
        }
    }

    fn visible_bounds(&self) -> VisibleBounds {
        self.bounds.clone()
    }

    fn price_to_pixel(&self, price: Decimal) -> f32 {
        let range = self.bounds.max_price - self.bounds.min_price;
        if range.is_zero() {
            return 0.0;
        }
        let fraction = (self.bounds.max_price - price) / range;
        fraction_to_f32(fraction) * self.bounds.pixel_height
    }

    fn pixel_to_price(&self, y: f32) -> Decimal {
        let range = self.bounds.max_price - self.bounds.min_price;
        let height = Decimal::try_from(f64::from(self.bounds.pixel_height.max(1.0)))
            .unwrap_or(Decimal::ONE);
        let y = Decimal::try_from(f64::from(y)).unwrap_or_default();
        (self.bounds.max_price - range * y / height).round_dp(6)
    }

    fn current_price(&self) -> Decimal {
        self.current_price
    }
}

fn fraction_to_f32(fraction: Decimal) -> f32 {
    use rust_decimal::prelude::ToPrimitive;
    fraction.to_f32().unwrap_or(0.0)
}
