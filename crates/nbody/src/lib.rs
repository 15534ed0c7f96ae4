//! Real-time 2D N-body gravity with inelastic merging
//!
//! A [`PhysicalSimulationEngine`] advances a population of circular bodies in
//! fixed sub-steps, merges bodies that touch and publishes one [`TickEvent`]
//! per tick to its subscribers.

pub mod body;
pub mod collisions;
pub mod engine;
pub mod error;
pub mod forces;
pub mod integrator;
pub mod scenario;
pub mod scheduler;
pub mod settings;
pub mod simulation;

#[cfg(test)]
mod engine_test;

pub use body::{Body, BodyId, BodyKey, BodySnapshot};
pub use engine::PhysicalSimulationEngine;
pub use error::{Result, SimulationError};
pub use scheduler::{FixedRateScheduler, ImmediateScheduler, Scheduler, StopHandle};
pub use settings::{SimulationConfig, SimulationSettings};
pub use simulation::{BodyDefinition, BodyFactory, DefaultBodyFactory, Simulation, TickEvent};
