//! View adapter: model state in, drawing primitives out.
//!
//! Purely derived. Every refresh tears down the previous primitives and
//! regenerates the full set from the model, so no drawable ever outlives
//! the state that produced it. The computed [`ElementBounds`] feed back
//! into the router for hit-testing.
//!
//! Surface failures are logged and the primitive skipped; a partially
//! drawn frame is preferable to a crash.

use riskline_config::ButtonConfig;
use riskline_core::geometry;
use riskline_core::{InstrumentSpec, LevelSet};

use crate::machine::ToolState;
use crate::model::LevelModel;
use crate::router::ElementBounds;
use crate::surface::{
    DrawHandle, LineStyle, RectStyle, RenderSurface, ScreenPos, ScreenRect, SurfaceError,
    TextStyle, BUTTON_FILL, ENTRY_COLOR, POPUP_FILL, REWARD_FILL, RISK_FILL, STOP_COLOR,
    TARGET_COLOR,
};

/// Half-height of the grab region around each level line.
const LINE_HIT_HALF_HEIGHT: f32 = 4.0;
/// Extra vertical margin added to the tool bounding box.
const BBOX_MARGIN: f32 = 10.0;

const POPUP_WIDTH: f32 = 140.0;
const POPUP_HEIGHT: f32 = 70.0;
const GEAR_SIZE: f32 = 20.0;

/// Thin adapter translating model + geometry into surface calls.
#[derive(Debug, Default)]
pub struct ToolView {
    handles: Vec<DrawHandle>,
    popup_anchor: Option<ScreenPos>,
}

impl ToolView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember where the popup should be anchored.
    pub fn set_popup_anchor(&mut self, pos: ScreenPos) {
        self.popup_anchor = Some(pos);
    }

    pub fn clear_popup_anchor(&mut self) {
        self.popup_anchor = None;
    }

    /// Tear down every primitive this view has drawn.
    pub fn release(&mut self, surface: &mut dyn RenderSurface) {
        for handle in self.handles.drain(..) {
            surface.remove(handle);
        }
    }

    /// Regenerate all primitives from the current model and state.
    pub fn refresh(
        &mut self,
        model: &LevelModel,
        state: ToolState,
        hover_inside: bool,
        buttons: &ButtonConfig,
        instrument: &InstrumentSpec,
        surface: &mut dyn RenderSurface,
    ) -> ElementBounds {
        self.release(surface);

        let mut bounds = ElementBounds::default();
        self.draw_buttons(buttons, &mut bounds, surface);

        if !state.is_shown() {
            return bounds;
        }

        let vis = surface.visible_bounds();
        let levels = model.levels();
        let width = vis.pixel_width;

        // Prices outside the visible range stick to the chart edge.
        let entry_y = surface.price_to_pixel(geometry::clamp_to_chart_bounds(
            levels.entry,
            vis.min_price,
            vis.max_price,
        ));
        let stop_y = surface.price_to_pixel(geometry::clamp_to_chart_bounds(
            levels.stop_loss,
            vis.min_price,
            vis.max_price,
        ));
        let target_y = surface.price_to_pixel(geometry::clamp_to_chart_bounds(
            levels.take_profit,
            vis.min_price,
            vis.max_price,
        ));

        self.draw_zone(entry_y, stop_y, width, RISK_FILL, surface);
        self.draw_zone(entry_y, target_y, width, REWARD_FILL, surface);

        self.draw_level_line(entry_y, width, LineStyle::solid(ENTRY_COLOR), surface);
        self.draw_level_line(stop_y, width, LineStyle::dashed(STOP_COLOR), surface);
        self.draw_level_line(target_y, width, LineStyle::dashed(TARGET_COLOR), surface);

        if self.labels_visible(model, state, hover_inside) {
            self.draw_labels(levels, instrument, entry_y, stop_y, target_y, surface);
        }

        bounds.entry_line = Some(ScreenRect::around_y(entry_y, width, LINE_HIT_HALF_HEIGHT));
        bounds.stop_line = Some(ScreenRect::around_y(stop_y, width, LINE_HIT_HALF_HEIGHT));
        bounds.target_line = Some(ScreenRect::around_y(target_y, width, LINE_HIT_HALF_HEIGHT));

        let top = entry_y.min(stop_y).min(target_y) - BBOX_MARGIN;
        let bottom = entry_y.max(stop_y).max(target_y) + BBOX_MARGIN;
        bounds.tool_bbox = Some(ScreenRect::new(0.0, top, width, bottom - top));

        if state.has_popup() {
            self.draw_popup(state, levels, &mut bounds, surface);
        }

        bounds
    }

    fn labels_visible(&self, model: &LevelModel, state: ToolState, hover_inside: bool) -> bool {
        let options = model.options();
        if options.hide_labels_while_editing && state == ToolState::Editing {
            return false;
        }
        if options.hide_labels_when_unfocused && !hover_inside && !state.has_popup() {
            return false;
        }
        true
    }

    fn draw_buttons(
        &mut self,
        buttons: &ButtonConfig,
        bounds: &mut ElementBounds,
        surface: &mut dyn RenderSurface,
    ) {
        let primary = ScreenRect::new(
            buttons.primary.x,
            buttons.primary.y,
            buttons.width,
            buttons.height,
        );
        let confirm = ScreenRect::new(
            buttons.confirm.x,
            buttons.confirm.y,
            buttons.width,
            buttons.height,
        );

        let style = RectStyle {
            fill: BUTTON_FILL,
            border: Some([0.5, 0.5, 0.55, 1.0]),
        };
        self.push(surface.draw_rect(primary, style));
        self.push(surface.draw_rect(confirm, style));
        self.push(surface.draw_text(primary.center(), "Plan", TextStyle::default()));
        self.push(surface.draw_text(confirm.center(), "Send", TextStyle::default()));

        bounds.primary_button = Some(primary);
        bounds.confirm_button = Some(confirm);
    }

    fn draw_zone(
        &mut self,
        from_y: f32,
        to_y: f32,
        width: f32,
        fill: [f32; 4],
        surface: &mut dyn RenderSurface,
    ) {
        let top = from_y.min(to_y);
        let height = (from_y - to_y).abs();
        self.push(surface.draw_rect(
            ScreenRect::new(0.0, top, width, height),
            RectStyle { fill, border: None },
        ));
    }

    fn draw_level_line(
        &mut self,
        y: f32,
        width: f32,
        style: LineStyle,
        surface: &mut dyn RenderSurface,
    ) {
        self.push(surface.draw_line(
            ScreenPos::new(0.0, y),
            ScreenPos::new(width, y),
            style,
        ));
    }

    fn draw_labels(
        &mut self,
        levels: &LevelSet,
        instrument: &InstrumentSpec,
        entry_y: f32,
        stop_y: f32,
        target_y: f32,
        surface: &mut dyn RenderSurface,
    ) {
        let stop_pips =
            geometry::pips_between(levels.entry, levels.stop_loss, instrument.pip_size).round_dp(1);
        let target_pips =
            geometry::pips_between(levels.take_profit, levels.entry, instrument.pip_size)
                .round_dp(1);

        let entry_text = format!("{} @ {}", levels.direction, levels.entry);
        let stop_text = format!("SL {stop_pips}p");
        let target_text = match geometry::compute_ratio(levels) {
            Ok(ratio) => format!("TP {target_pips}p  R:R {:.2}", ratio.round_dp(2)),
            Err(_) => format!("TP {target_pips}p"),
        };

        self.push(surface.draw_text(
            ScreenPos::new(8.0, entry_y - 6.0),
            &entry_text,
            TextStyle::default(),
        ));
        self.push(surface.draw_text(
            ScreenPos::new(8.0, stop_y - 6.0),
            &stop_text,
            TextStyle::default(),
        ));
        self.push(surface.draw_text(
            ScreenPos::new(8.0, target_y - 6.0),
            &target_text,
            TextStyle::default(),
        ));
    }

    fn draw_popup(
        &mut self,
        state: ToolState,
        levels: &LevelSet,
        bounds: &mut ElementBounds,
        surface: &mut dyn RenderSurface,
    ) {
        let anchor = self.popup_anchor.unwrap_or(ScreenPos::new(0.0, 0.0));
        let rect = ScreenRect::new(anchor.x, anchor.y, POPUP_WIDTH, POPUP_HEIGHT);
        self.push(surface.draw_rect(
            rect,
            RectStyle {
                fill: POPUP_FILL,
                border: Some([0.6, 0.6, 0.6, 1.0]),
            },
        ));
        bounds.popup = Some(rect);

        match state {
            ToolState::MenuOpen => {
                let flip = ScreenRect::new(rect.x + 8.0, rect.y + 8.0, 70.0, GEAR_SIZE);
                let gear = ScreenRect::new(
                    rect.x + rect.width - GEAR_SIZE - 8.0,
                    rect.y + 8.0,
                    GEAR_SIZE,
                    GEAR_SIZE,
                );
                let flip_label = format!("Flip to {}", levels.direction.opposite());
                self.push(surface.draw_text(flip.center(), &flip_label, TextStyle::default()));
                self.push(surface.draw_text(gear.center(), "*", TextStyle::default()));
                bounds.flip_control = Some(flip);
                bounds.gear_icon = Some(gear);
            }
            ToolState::ConfigOpen => {
                self.push(surface.draw_text(
                    ScreenPos::new(rect.x + 8.0, rect.y + 16.0),
                    "Options",
                    TextStyle::default(),
                ));
            }
            _ => {}
        }
    }

    /// Keep the handle on success; log and skip the primitive on failure.
    fn push(&mut self, result: Result<DrawHandle, SurfaceError>) {
        match result {
            Ok(handle) => self.handles.push(handle),
            Err(e) => log::warn!("surface draw failed, skipping primitive: {e}"),
        }
    }
}
