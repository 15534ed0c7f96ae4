//! The physical stepping engine
//!
//! Each tick runs `physics_steps` sub-steps of:
//!
//! 1. Bounds refresh: bodies recompute their edges, the per-axis edge sequences
//!    are re-sorted and swept to update the overlap registry
//! 2. Collisions: touching pairs merge; any merge re-sorts and re-partitions
//!    the living bodies by mass
//! 3. Forces: approximate N-body gravity over the real/pseudo partition
//! 4. Integration
//!
//! and then publishes a [`TickEvent`] with the living bodies, heaviest first.

use nalgebra::Vector2;
use ordered_sequence::OrderedSequence;
use tracing::{debug, info, trace};

use crate::body::{Body, BodyId, BodyRank, by_mass};
use crate::collisions::{BoundingEdges, OverlapRegistry, apply_collisions};
use crate::error::Result;
use crate::forces::{ApproximateGravity, MassPartition, PartitionRule};
use crate::integrator::{DampedIntegrator, Integrator};
use crate::scheduler::{ImmediateScheduler, Scheduler, StopHandle};
use crate::settings::{SimulationConfig, SimulationSettings};
use crate::simulation::{BodyFactory, Simulation, TickEvent};

/// Steps a [`Simulation`] in ticks, yielding to a [`Scheduler`] between them
///
/// # Examples
///
/// ```
/// use nbody::engine::PhysicalSimulationEngine;
/// use nbody::settings::{SimulationConfig, SimulationSettings};
/// use nbody::simulation::BodyDefinition;
///
/// let config = SimulationConfig::new(
///     SimulationSettings::default(),
///     vec![
///         BodyDefinition::new(0, 10.0, [0.0, 0.0], [1.0, 0.0]).with_radius(1.0),
///         BodyDefinition::new(1, 2.0, [1.0, 0.0], [-5.0, 0.0]).with_radius(1.0),
///     ],
/// );
///
/// let mut engine = PhysicalSimulationEngine::from_config(config).unwrap();
/// let stop = engine.stop_handle();
/// engine.subscribe(move |_tick| stop.stop());
///
/// engine.run().unwrap();
///
/// assert!(!engine.is_running());
/// assert_eq!(engine.living_bodies().count(), 1);
/// ```
pub struct PhysicalSimulationEngine<S: Scheduler = ImmediateScheduler> {
    simulation: Simulation,
    living: OrderedSequence<BodyRank>,
    partition: MassPartition,
    bounds: BoundingEdges,
    gravity: ApproximateGravity,
    integrator: Box<dyn Integrator>,
    scheduler: S,
    running: StopHandle,
    tick: u64,
}

impl PhysicalSimulationEngine<ImmediateScheduler> {
    pub fn from_config(config: SimulationConfig) -> Result<Self> {
        Self::new(config, ImmediateScheduler)
    }
}

impl<S: Scheduler> PhysicalSimulationEngine<S> {
    pub fn new(config: SimulationConfig, scheduler: S) -> Result<Self> {
        Ok(Self::from_simulation(Simulation::new(config)?, scheduler))
    }

    pub fn with_factory(
        config: SimulationConfig,
        factory: &dyn BodyFactory,
        scheduler: S,
    ) -> Result<Self> {
        Ok(Self::from_simulation(
            Simulation::with_factory(config, factory)?,
            scheduler,
        ))
    }

    pub fn from_simulation(simulation: Simulation, scheduler: S) -> Self {
        let settings = simulation.settings();
        let gravity = ApproximateGravity::with_softening(settings.g, settings.softening);
        Self {
            simulation,
            living: OrderedSequence::with_comparator(by_mass),
            partition: MassPartition::new(),
            bounds: BoundingEdges::new(),
            gravity,
            integrator: Box::new(DampedIntegrator),
            scheduler,
            running: StopHandle::new(),
            tick: 0,
        }
    }

    pub fn set_integrator(&mut self, integrator: impl Integrator + 'static) {
        self.integrator = Box::new(integrator);
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&TickEvent) + 'static) {
        self.simulation.subscribe(listener);
    }

    pub fn settings(&self) -> &SimulationSettings {
        self.simulation.settings()
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn is_running(&self) -> bool {
        self.running.is_running()
    }

    /// Handle for stopping the engine from a tick listener or the scheduler
    pub fn stop_handle(&self) -> StopHandle {
        self.running.clone()
    }

    /// Stops after the in-flight tick, if any
    pub fn stop(&mut self) {
        if self.running.is_running() {
            info!(tick = self.tick, "stopping simulation");
        }
        self.running.stop();
    }

    /// Number of ticks published so far
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Snapshots the surviving population and marks the engine running
    ///
    /// Only needed by hosts that drive ticks with [`Self::update`]; [`Self::run`]
    /// calls it itself.
    pub fn start(&mut self) -> Result<()> {
        let bodies = &mut self.simulation.bodies;
        bodies.iter_mut().for_each(Body::update_bounds);

        self.living.clear();
        self.living.append_all(
            bodies
                .iter()
                .filter(|body| !body.is_destroyed())
                .map(Body::rank),
        );
        self.bounds
            .rebuild(bodies, self.living.iter().map(|rank| rank.key));

        self.sort_bodies()?;
        self.running.start();
        info!(
            bodies = self.living.len(),
            real = self.partition.real().len(),
            "simulation running"
        );
        Ok(())
    }

    /// Starts the engine and keeps ticking until stopped
    ///
    /// Between ticks control passes to the scheduler. A failing tick clears the
    /// running flag and returns the error.
    pub fn run(&mut self) -> Result<()> {
        self.start()?;
        while self.running.is_running() {
            self.update()?;
            if !self.running.is_running() {
                break;
            }
            self.scheduler.defer();
        }
        Ok(())
    }

    /// Runs one full tick and publishes it
    pub fn update(&mut self) -> Result<()> {
        let result = self.advance();
        stop_on_error(&self.running, result)
    }

    fn advance(&mut self) -> Result<()> {
        for _ in 0..self.simulation.settings.physics_steps {
            self.step()?;
        }
        self.tick += 1;

        let event = self.snapshot();
        trace!(tick = event.tick, bodies = event.bodies.len(), "tick");
        self.simulation.publish(&event);
        Ok(())
    }

    /// Runs one sub-step
    pub fn step(&mut self) -> Result<()> {
        self.update_bounds_and_overlaps();
        self.apply_collisions()?;
        self.calculate_forces();
        self.apply_forces();
        Ok(())
    }

    fn update_bounds_and_overlaps(&mut self) {
        let bodies = &mut self.simulation.bodies;
        for rank in &self.living {
            bodies[rank.key.0].update_bounds();
        }
        self.bounds.refresh(bodies);
    }

    fn apply_collisions(&mut self) -> Result<()> {
        let merges = apply_collisions(&mut self.simulation.bodies, &mut self.bounds)?;
        if !merges.is_empty() {
            debug!(merges = merges.len(), tick = self.tick, "resolved collisions");
            self.sort_bodies()?;
        }
        Ok(())
    }

    fn calculate_forces(&mut self) {
        self.gravity
            .compute(&mut self.simulation.bodies, &self.living, &self.partition);
    }

    fn apply_forces(&mut self) {
        let settings = &self.simulation.settings;
        let bodies = &mut self.simulation.bodies;
        for rank in &self.living {
            self.integrator.integrate(
                &mut bodies[rank.key.0],
                settings.tick_duration,
                settings.physics_steps,
            );
        }
    }

    /// Re-sorts the living bodies by current mass, re-partitions them and drops
    /// the destroyed ones
    fn sort_bodies(&mut self) -> Result<()> {
        let bodies = &self.simulation.bodies;
        self.living
            .update_each(|rank| rank.mass = bodies[rank.key.0].mass);
        self.living.resort();

        let settings = &self.simulation.settings;
        let rule = PartitionRule {
            real_bodies_min: settings.real_bodies_min,
            real_mass_threshold: settings.real_mass_threshold,
        };
        self.partition.rebuild(&mut self.living, &rule)
    }

    /// Living bodies, heaviest first
    pub fn living_bodies(&self) -> impl Iterator<Item = &Body> + '_ {
        self.living
            .iter()
            .map(|rank| &self.simulation.bodies[rank.key.0])
    }

    pub fn living(&self) -> &OrderedSequence<BodyRank> {
        &self.living
    }

    pub fn real_bodies(&self) -> &OrderedSequence<BodyRank> {
        self.partition.real()
    }

    pub fn pseudo_bodies(&self) -> &OrderedSequence<BodyRank> {
        self.partition.pseudo()
    }

    pub fn bounds(&self) -> &BoundingEdges {
        &self.bounds
    }

    pub fn overlaps(&self) -> &OverlapRegistry {
        self.bounds.overlaps()
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.simulation.find(id)
    }

    /// Tick event for the current state
    pub fn snapshot(&self) -> TickEvent {
        TickEvent {
            tick: self.tick,
            bodies: self.living_bodies().map(Body::snapshot).collect(),
        }
    }

    pub fn total_mass(&self) -> f64 {
        self.living_bodies().map(|b| b.mass).sum()
    }

    pub fn total_momentum(&self) -> Vector2<f64> {
        self.living_bodies()
            .map(Body::momentum)
            .fold(Vector2::zeros(), |acc, p| acc + p)
    }
}

/// Passes `result` through, clearing `running` when it is an error
pub(crate) fn stop_on_error<T>(running: &StopHandle, result: Result<T>) -> Result<T> {
    if result.is_err() {
        running.stop();
    }
    result
}
