//! Tool instance registry.
//!
//! Multiple independent tools can coexist on one chart; each gets a unique
//! id and its own controller. Removing an instance tears down its visuals
//! before the controller is dropped.

use std::collections::HashMap;

use riskline_config::ConfigStore;
use riskline_core::{Direction, InstrumentSpec, LevelError};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::controller::ToolController;
use crate::surface::RenderSurface;

/// Global counter for generating unique tool IDs.
static NEXT_TOOL_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a tool instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToolId(u64);

impl ToolId {
    /// Generate a new unique tool ID.
    pub fn new() -> Self {
        Self(NEXT_TOOL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ToolId {
    fn default() -> Self {
        Self::new()
    }
}

/// Owner of every live tool controller on a chart.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<ToolId, ToolController>,
}

impl ToolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tool instance and return its id.
    pub fn create(
        &mut self,
        surface: Box<dyn RenderSurface>,
        store: Box<dyn ConfigStore>,
        instrument: InstrumentSpec,
        initial_direction: Direction,
    ) -> Result<ToolId, LevelError> {
        let id = ToolId::new();
        let controller = ToolController::new(id, surface, store, instrument, initial_direction)?;
        self.tools.insert(id, controller);
        Ok(id)
    }

    #[must_use]
    pub fn get(&self, id: ToolId) -> Option<&ToolController> {
        self.tools.get(&id)
    }

    pub fn get_mut(&mut self, id: ToolId) -> Option<&mut ToolController> {
        self.tools.get_mut(&id)
    }

    /// Remove an instance, releasing all of its visuals.
    ///
    /// Returns whether the id was known.
    pub fn remove(&mut self, id: ToolId) -> bool {
        match self.tools.remove(&id) {
            Some(mut controller) => {
                controller.remove();
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ToolId> + '_ {
        self.tools.keys().copied()
    }

    /// Notify every instance that the chart viewport changed.
    pub fn on_bounds_changed(&mut self) {
        for controller in self.tools.values_mut() {
            controller.on_bounds_changed();
        }
    }
}
