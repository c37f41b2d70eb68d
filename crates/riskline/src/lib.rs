//! Interactive trade-planning overlay.
//!
//! A chart host embeds one [`ToolRegistry`] and feeds it pointer events
//! plus a [`RenderSurface`] implementation. Each tool instance shows a
//! draggable entry/stop-loss/take-profit level set, validates and clamps
//! every edit, and on confirmation hands a wire-ready [`Signal`] to the
//! registered consumer. The crate draws nothing itself and opens no
//! network connections.

pub mod controller;
pub mod machine;
pub mod model;
pub mod registry;
pub mod router;
pub mod surface;
pub mod view;

pub use controller::{SignalConsumer, ToolController};
pub use machine::{Effect, ToolState, ToolStateMachine, Trigger};
pub use model::LevelModel;
pub use registry::{ToolId, ToolRegistry};
pub use router::{ElementBounds, EventRouter, Intent, PointerEvent};
pub use surface::{
    DrawHandle, MockSurface, RenderSurface, ScreenPos, ScreenRect, SurfaceError, VisibleBounds,
};
pub use view::ToolView;

pub use riskline_core::{
    Direction, InstrumentSpec, LevelError, LevelKind, LevelSet, Signal, SignalError, SignalType,
    ToolOptions,
};
