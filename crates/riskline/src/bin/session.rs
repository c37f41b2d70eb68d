//! Scripted planning session against the in-memory surface.
//!
//! Drives a tool instance through a realistic pointer sequence and prints
//! every signal it emits, as a smoke test of the full event path without a
//! chart host attached.

use anyhow::Result;
use rust_decimal_macros::dec;

use riskline::surface::{MockSurface, VisibleBounds};
use riskline::{Direction, InstrumentSpec, PointerEvent, ScreenPos, ToolRegistry};
use riskline_config::MemoryConfigStore;

fn pointer(registry: &mut ToolRegistry, id: riskline::ToolId, event: PointerEvent) {
    if let Some(controller) = registry.get_mut(id) {
        controller.handle_pointer(event);
    }
}

fn click(registry: &mut ToolRegistry, id: riskline::ToolId, pos: ScreenPos, time_ms: u64) {
    pointer(registry, id, PointerEvent::Press { pos, time_ms });
    pointer(
        registry,
        id,
        PointerEvent::Release {
            pos,
            time_ms: time_ms + 40,
        },
    );
}

fn run() -> Result<()> {
    env_logger::init();

    // EURUSD viewport: 1.08..1.12 over an 800x400 chart, market at 1.10.
    let surface = MockSurface::new(
        VisibleBounds {
            min_price: dec!(1.08),
            max_price: dec!(1.12),
            pixel_width: 800.0,
            pixel_height: 400.0,
        },
        dec!(1.10000),
    );
    let log = surface.log();

    let mut registry = ToolRegistry::new();
    let id = registry.create(
        Box::new(surface),
        Box::new(MemoryConfigStore::default()),
        InstrumentSpec::default(),
        Direction::Buy,
    )?;

    if let Some(controller) = registry.get_mut(id) {
        controller.set_consumer(Box::new(|signal| match signal.to_json() {
            Ok(json) => println!("signal: {json}"),
            Err(e) => eprintln!("serialization failed: {e}"),
        }));
    }

    // Show the tool via the primary button.
    click(&mut registry, id, ScreenPos::new(30.0, 30.0), 0);
    println!(
        "tool shown, {} level lines live",
        log.borrow().line_count()
    );

    // Widen the stop: drag the stop line from y=210 down to y=250.
    pointer(
        &mut registry,
        id,
        PointerEvent::Press {
            pos: ScreenPos::new(400.0, 210.0),
            time_ms: 1000,
        },
    );
    pointer(
        &mut registry,
        id,
        PointerEvent::Move {
            pos: ScreenPos::new(400.0, 250.0),
            time_ms: 1016,
        },
    );
    pointer(
        &mut registry,
        id,
        PointerEvent::Release {
            pos: ScreenPos::new(400.0, 250.0),
            time_ms: 1050,
        },
    );
    if let Some(controller) = registry.get(id) {
        let levels = controller.levels();
        println!(
            "levels after edit: entry {} sl {} tp {}",
            levels.entry, levels.stop_loss, levels.take_profit
        );
    }

    // Confirm the buy plan.
    click(&mut registry, id, ScreenPos::new(30.0, 60.0), 2000);

    // Flip to a sell via the entry-line menu, then confirm again.
    let entry = ScreenPos::new(400.0, 200.0);
    click(&mut registry, id, entry, 3000);
    click(&mut registry, id, entry, 3100);
    click(&mut registry, id, ScreenPos::new(420.0, 215.0), 4000);
    click(&mut registry, id, ScreenPos::new(700.0, 390.0), 5000);
    click(&mut registry, id, ScreenPos::new(30.0, 60.0), 6000);

    registry.remove(id);
    println!("tool removed, {} primitives live", log.borrow().live.len());

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
    }
}
