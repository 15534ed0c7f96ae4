use std::cell::{Cell, RefCell};
use std::rc::Rc;

use approx::{assert_abs_diff_eq, assert_relative_eq};
use nalgebra::{Point2, Vector2};
use ordered_sequence::SequenceError;

use crate::body::{Body, BodyId, BodyKey};
use crate::engine::{PhysicalSimulationEngine, stop_on_error};
use crate::error::SimulationError;
use crate::integrator::{Integrator, SemiImplicitEuler};
use crate::scenario::DiskScenario;
use crate::scheduler::{ImmediateScheduler, Scheduler, StopHandle};
use crate::settings::{SimulationConfig, SimulationSettings};
use crate::simulation::{BodyDefinition, BodyFactory, TickEvent};

fn config(bodies: Vec<BodyDefinition>) -> SimulationConfig {
    SimulationConfig::new(SimulationSettings::default(), bodies)
}

fn colliding_pair() -> SimulationConfig {
    config(vec![
        BodyDefinition::new(0, 10.0, [0.0, 0.0], [1.0, 0.0]).with_radius(1.0),
        BodyDefinition::new(1, 2.0, [1.0, 0.0], [-5.0, 0.0]).with_radius(1.0),
    ])
}

/// Records every published tick
fn recorder<S: Scheduler>(engine: &mut PhysicalSimulationEngine<S>) -> Rc<RefCell<Vec<TickEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    engine.subscribe(move |event: &TickEvent| sink.borrow_mut().push(event.clone()));
    events
}

#[test]
fn test_two_body_merge() {
    let mut engine = PhysicalSimulationEngine::from_config(colliding_pair()).unwrap();
    let events = recorder(&mut engine);

    engine.start().unwrap();
    engine.update().unwrap();

    let events = events.borrow();
    assert_eq!(events.len(), 1);
    let tick = &events[0];
    assert_eq!(tick.tick, 1);
    assert_eq!(tick.bodies.len(), 1);
    assert!(!tick.contains(BodyId(1)));

    let survivor = tick.body(BodyId(0)).unwrap();
    assert_relative_eq!(survivor.mass, 12.0);
    // Net momentum is zero, so the merged body rests at the center of mass
    assert_abs_diff_eq!(survivor.velocity[0], 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(survivor.velocity[1], 0.0, epsilon = 1e-12);
    assert_relative_eq!(survivor.position[0], 2.0 / 12.0, epsilon = 1e-12);
    assert_relative_eq!(survivor.radius, 2.0_f64.sqrt());
}

#[test]
fn test_merge_conserves_mass_and_momentum() {
    let config = config(vec![
        BodyDefinition::new(0, 3.0, [0.0, 0.0], [1.0, 2.0]).with_radius(1.0),
        BodyDefinition::new(1, 5.0, [0.5, 0.5], [-1.0, 0.0]).with_radius(1.0),
        BodyDefinition::new(2, 1.0, [500.0, 0.0], [0.0, 0.0]).with_radius(1.0),
    ]);
    let mut engine = PhysicalSimulationEngine::from_config(config).unwrap();
    engine.start().unwrap();
    let mass = engine.total_mass();

    engine.step().unwrap();

    assert_eq!(engine.living_bodies().count(), 2);
    assert_relative_eq!(engine.total_mass(), mass);
    assert_relative_eq!(engine.body(BodyId(1)).unwrap().mass, 8.0);
    assert!(engine.body(BodyId(0)).unwrap().is_destroyed());
}

#[test]
fn test_single_body_drifts_freely() {
    let config = config(vec![
        BodyDefinition::new(0, 50.0, [3.0, -2.0], [0.0, 0.0]).with_radius(1.0),
    ]);
    let mut engine = PhysicalSimulationEngine::from_config(config).unwrap();

    engine.start().unwrap();
    for _ in 0..5 {
        engine.update().unwrap();
    }

    let body = engine.body(BodyId(0)).unwrap();
    assert_eq!(body.force, Vector2::zeros());
    assert_eq!(body.position, Point2::new(3.0, -2.0));
    assert_eq!(engine.tick(), 5);
}

#[test]
fn test_distant_bodies_attract() {
    let config = config(vec![
        BodyDefinition::new(0, 100.0, [0.0, 0.0], [0.0, 0.0]).with_radius(1.0),
        BodyDefinition::new(1, 1.0, [50.0, 0.0], [0.0, 0.0]).with_radius(1.0),
    ]);
    let mut engine = PhysicalSimulationEngine::from_config(config).unwrap();

    engine.start().unwrap();
    engine.update().unwrap();

    let light = engine.body(BodyId(1)).unwrap();
    assert!(light.position.x < 50.0);
    assert!(light.velocity.x < 0.0);
    assert_eq!(light.attractor, Some(BodyId(0)));
    // No external force: total momentum stays zero
    assert_abs_diff_eq!(engine.total_momentum().norm(), 0.0, epsilon = 1e-12);
}

#[test]
fn test_start_partitions_bodies() {
    let settings = SimulationSettings {
        real_bodies_min: 2,
        ..Default::default()
    };
    let config = SimulationConfig::new(
        settings,
        (0..5)
            .map(|i| {
                BodyDefinition::new(i, f64::from(i + 1), [f64::from(i) * 100.0, 0.0], [0.0, 0.0])
                    .with_radius(1.0)
            })
            .collect(),
    );
    let mut engine = PhysicalSimulationEngine::from_config(config).unwrap();

    engine.start().unwrap();

    let real: Vec<_> = engine.real_bodies().iter().map(|r| r.id.0).collect();
    let pseudo: Vec<_> = engine.pseudo_bodies().iter().map(|r| r.id.0).collect();
    assert_eq!(real, vec![4, 3]);
    assert_eq!(pseudo, vec![2, 1, 0]);

    // Pseudo bodies feel gravity from the first tick on
    engine.update().unwrap();
    assert!(engine.body(BodyId(0)).unwrap().velocity.x > 0.0);
}

#[test]
fn test_start_skips_destroyed_definitions() {
    let config = config(vec![
        BodyDefinition::new(0, 0.0, [0.0, 0.0], [0.0, 0.0]).with_radius(1.0),
        BodyDefinition::new(1, 3.0, [10.0, 0.0], [0.0, 0.0]).with_radius(1.0),
    ]);
    let mut engine = PhysicalSimulationEngine::from_config(config).unwrap();

    engine.start().unwrap();

    assert_eq!(engine.living().len(), 1);
    assert_eq!(engine.snapshot().bodies.len(), 1);
}

#[test]
fn test_snapshot_is_mass_ordered() {
    let config = config(vec![
        BodyDefinition::new(0, 1.0, [0.0, 0.0], [0.0, 0.0]).with_radius(1.0),
        BodyDefinition::new(1, 9.0, [100.0, 0.0], [0.0, 0.0]).with_radius(1.0),
        BodyDefinition::new(2, 4.0, [0.0, 100.0], [0.0, 0.0]).with_radius(1.0),
    ]);
    let mut engine = PhysicalSimulationEngine::from_config(config).unwrap();
    let events = recorder(&mut engine);

    engine.start().unwrap();
    engine.update().unwrap();

    let ids: Vec<_> = events.borrow()[0].bodies.iter().map(|b| b.id.0).collect();
    assert_eq!(ids, vec![1, 2, 0]);
}

/// Leaves every body where it is
struct Frozen;

impl Integrator for Frozen {
    fn integrate(&self, _body: &mut Body, _tick_duration: f64, _physics_steps: u32) {}
}

#[test]
fn test_overlaps_tracked_between_steps() {
    // Boxes overlap corner to corner without the disks touching
    let config = config(vec![
        BodyDefinition::new(0, 1.0, [0.0, 0.0], [0.0, 0.0]).with_radius(1.0),
        BodyDefinition::new(1, 1.0, [1.8, 1.8], [0.0, 0.0]).with_radius(1.0),
    ]);
    let mut engine = PhysicalSimulationEngine::from_config(config).unwrap();
    engine.set_integrator(Frozen);

    engine.start().unwrap();
    assert!(engine.overlaps().is_empty());

    engine.step().unwrap();
    assert_eq!(engine.overlaps().len(), 1);
    assert_eq!(engine.living_bodies().count(), 2);
}

#[test]
fn test_stop_from_listener_finishes_tick() {
    let mut engine = PhysicalSimulationEngine::from_config(colliding_pair()).unwrap();
    let events = recorder(&mut engine);
    let stop = engine.stop_handle();
    engine.subscribe(move |event: &TickEvent| {
        if event.tick == 3 {
            stop.stop();
        }
    });

    engine.run().unwrap();

    assert!(!engine.is_running());
    assert_eq!(engine.tick(), 3);
    assert_eq!(events.borrow().len(), 3);
}

#[test]
fn test_stop_from_scheduler() {
    let deferrals = Rc::new(Cell::new(0));
    let counter = Rc::clone(&deferrals);
    let holder: Rc<RefCell<Option<StopHandle>>> = Rc::new(RefCell::new(None));
    let handle = Rc::clone(&holder);

    let scheduler = move || {
        counter.set(counter.get() + 1);
        if counter.get() == 2 {
            if let Some(stop) = handle.borrow().as_ref() {
                stop.stop();
            }
        }
    };
    let mut engine = PhysicalSimulationEngine::new(colliding_pair(), scheduler).unwrap();
    *holder.borrow_mut() = Some(engine.stop_handle());
    let events = recorder(&mut engine);

    engine.run().unwrap();

    // The scheduler runs between ticks; no tick starts after it stops the engine
    assert_eq!(deferrals.get(), 2);
    assert_eq!(events.borrow().len(), 2);
}

#[test]
fn test_stop_before_run_is_harmless() {
    let mut engine = PhysicalSimulationEngine::from_config(colliding_pair()).unwrap();
    engine.stop();
    assert!(!engine.is_running());

    let stop = engine.stop_handle();
    engine.subscribe(move |_: &TickEvent| stop.stop());
    engine.run().unwrap();

    assert_eq!(engine.tick(), 1);
}

#[test]
fn test_settings_reach_engine() {
    let settings = SimulationSettings {
        physics_steps: 2,
        tick_duration: 0.5,
        ..Default::default()
    };
    let config = SimulationConfig::new(
        settings,
        vec![BodyDefinition::new(0, 1.0, [0.0, 0.0], [2.0, 0.0]).with_radius(1.0)],
    );
    let mut engine = PhysicalSimulationEngine::new(config, ImmediateScheduler).unwrap();

    engine.start().unwrap();
    engine.update().unwrap();

    // Two sub-steps of velocity / 2 each
    assert_relative_eq!(engine.body(BodyId(0)).unwrap().position, Point2::new(2.0, 0.0));
    assert_eq!(engine.settings().physics_steps, 2);
}

#[test]
fn test_alternative_integrator() {
    let config = config(vec![
        BodyDefinition::new(0, 100.0, [0.0, 0.0], [0.0, 0.0]).with_radius(1.0),
        BodyDefinition::new(1, 1.0, [50.0, 0.0], [0.0, 0.0]).with_radius(1.0),
    ]);
    let mut damped = PhysicalSimulationEngine::from_config(config.clone()).unwrap();
    let mut euler = PhysicalSimulationEngine::from_config(config).unwrap();
    euler.set_integrator(SemiImplicitEuler);

    for engine in [&mut damped, &mut euler] {
        engine.start().unwrap();
        engine.update().unwrap();
    }

    let damped_v = damped.body(BodyId(1)).unwrap().velocity.x;
    let euler_v = euler.body(BodyId(1)).unwrap().velocity.x;
    assert!(euler_v < damped_v);
}

struct FixedRadius(f64);

impl BodyFactory for FixedRadius {
    fn create(&self, key: BodyKey, definition: &BodyDefinition) -> Body {
        let [x, y] = definition.position;
        let [vx, vy] = definition.velocity;
        Body::new(
            definition.id,
            key,
            definition.mass,
            self.0,
            Point2::new(x, y),
            Vector2::new(vx, vy),
        )
    }
}

#[test]
fn test_with_factory() {
    let config = config(vec![
        BodyDefinition::new(0, 1.0, [0.0, 0.0], [0.0, 0.0]),
        BodyDefinition::new(1, 1.0, [30.0, 0.0], [0.0, 0.0]),
    ]);
    // Large enough that the two bodies touch from the start
    let mut engine =
        PhysicalSimulationEngine::with_factory(config, &FixedRadius(20.0), ImmediateScheduler)
            .unwrap();

    engine.start().unwrap();
    engine.update().unwrap();

    assert_eq!(engine.living_bodies().count(), 1);
    // Equal masses: the lower id survives
    assert_relative_eq!(engine.body(BodyId(0)).unwrap().mass, 2.0);
}

#[test]
fn test_invalid_config_rejected() {
    let config = config(vec![
        BodyDefinition::new(0, 1.0, [0.0, 0.0], [0.0, 0.0]),
        BodyDefinition::new(0, 1.0, [5.0, 0.0], [0.0, 0.0]),
    ]);

    let result = PhysicalSimulationEngine::from_config(config);

    assert!(matches!(result, Err(SimulationError::DuplicateBodyId(_))));
}

#[test]
fn test_disk_scenario_conserves_mass() {
    let config = DiskScenario {
        count: 120,
        disk_radius: 150.0,
        ..DiskScenario::default()
    }
    .config(SimulationSettings {
        real_bodies_min: 8,
        ..Default::default()
    });
    let mut engine = PhysicalSimulationEngine::from_config(config).unwrap();
    engine.start().unwrap();
    let mass = engine.total_mass();
    let momentum = engine.total_momentum();

    for _ in 0..20 {
        engine.update().unwrap();
    }

    assert_relative_eq!(engine.total_mass(), mass, max_relative = 1e-9);
    assert!(engine.living().is_safe());
    assert!(engine.living_bodies().all(|b| !b.is_destroyed()));
    assert_eq!(
        engine.real_bodies().len() + engine.pseudo_bodies().len(),
        engine.living().len()
    );
    // Approximate gravity is not symmetric, so momentum only stays bounded
    assert!((engine.total_momentum() - momentum).norm().is_finite());
}

#[test]
fn test_failed_tick_clears_running_flag() {
    let running = StopHandle::new();
    running.start();

    let ok: crate::Result<()> = Ok(());
    assert!(stop_on_error(&running, ok).is_ok());
    assert!(running.is_running());

    let failed: crate::Result<()> =
        Err(SequenceError::unsafe_collection("ordered_insert").into());
    assert!(matches!(
        stop_on_error(&running, failed),
        Err(SimulationError::Sequence(_))
    ));
    assert!(!running.is_running());
}
