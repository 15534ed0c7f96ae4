//! Accretion disk example
//!
//! Seeds a heavy central body with a disk of light bodies on near-circular
//! orbits and runs the engine headless at a fixed tick rate. Bodies on crossing
//! orbits merge; every 25 ticks the surviving population is summarized.
//!
//! Run with: cargo run --package nbody --example collision_demo

use std::cell::Cell;
use std::rc::Rc;

use nbody::scenario::DiskScenario;
use nbody::{FixedRateScheduler, PhysicalSimulationEngine, SimulationSettings, TickEvent};
use tracing::{Level, info};

const TICKS: u64 = 200;

fn main() -> nbody::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let settings = SimulationSettings {
        real_bodies_min: 16,
        ..Default::default()
    };
    let scenario = DiskScenario {
        count: 300,
        ..DiskScenario::default()
    };
    let config = scenario.config(settings);

    let mut engine = PhysicalSimulationEngine::new(config, FixedRateScheduler::per_second(60))?;
    let initial_mass = engine.simulation().bodies().iter().map(|b| b.mass).sum::<f64>();

    let stop = engine.stop_handle();
    let merges = Rc::new(Cell::new(0usize));
    let last_count = Rc::new(Cell::new(scenario.count + 1));
    let counter = Rc::clone(&merges);
    engine.subscribe(move |event: &TickEvent| {
        let living = event.bodies.len();
        counter.set(counter.get() + last_count.get().saturating_sub(living));
        last_count.set(living);

        if event.tick % 25 == 0 {
            let largest = event.bodies.first().map_or(0.0, |b| b.mass);
            let runner_up = event.bodies.get(1).map_or(0.0, |b| b.mass);
            info!(
                tick = event.tick,
                living,
                largest,
                runner_up,
                merges = counter.get(),
                "disk summary"
            );
        }
        if event.tick >= TICKS {
            stop.stop();
        }
    });

    engine.run()?;

    info!(
        ticks = engine.tick(),
        living = engine.living_bodies().count(),
        real = engine.real_bodies().len(),
        pseudo = engine.pseudo_bodies().len(),
        merges = merges.get(),
        mass_drift = engine.total_mass() - initial_mass,
        "finished"
    );
    Ok(())
}
