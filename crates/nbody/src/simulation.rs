//! Body population, construction policy and tick subscription

use std::collections::HashSet;
use std::fmt;

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::body::{Body, BodyId, BodyKey, BodySnapshot, radius_from_mass};
use crate::error::{Result, SimulationError};
use crate::settings::{SimulationConfig, SimulationSettings};

/// Initial state of one body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyDefinition {
    pub id: BodyId,
    pub position: [f64; 2],
    #[serde(default)]
    pub velocity: [f64; 2],
    pub mass: f64,
    /// Physical radius; derived from mass when absent
    #[serde(default)]
    pub radius: Option<f64>,
}

impl BodyDefinition {
    pub fn new(id: u32, mass: f64, position: [f64; 2], velocity: [f64; 2]) -> Self {
        Self {
            id: BodyId(id),
            position,
            velocity,
            mass,
            radius: None,
        }
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn validate(&self) -> Result<()> {
        let finite = self
            .position
            .iter()
            .chain(self.velocity.iter())
            .all(|v| v.is_finite());
        if !finite {
            return Err(SimulationError::invalid_body(
                self.id,
                "position and velocity must be finite",
            ));
        }
        if !self.mass.is_finite() || self.mass < 0.0 {
            return Err(SimulationError::invalid_body(
                self.id,
                "mass must be finite and non-negative",
            ));
        }
        if let Some(radius) = self.radius {
            if !(radius.is_finite() && radius > 0.0) {
                return Err(SimulationError::invalid_body(
                    self.id,
                    "radius must be finite and positive",
                ));
            }
        }
        Ok(())
    }
}

/// Turns body definitions into simulated bodies
pub trait BodyFactory {
    fn create(&self, key: BodyKey, definition: &BodyDefinition) -> Body;
}

/// Uses the definition as given, deriving missing radii from mass
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultBodyFactory;

impl BodyFactory for DefaultBodyFactory {
    fn create(&self, key: BodyKey, definition: &BodyDefinition) -> Body {
        let [x, y] = definition.position;
        let [vx, vy] = definition.velocity;
        Body::new(
            definition.id,
            key,
            definition.mass,
            definition
                .radius
                .unwrap_or_else(|| radius_from_mass(definition.mass)),
            Point2::new(x, y),
            Vector2::new(vx, vy),
        )
    }
}

/// Published once per tick: the living bodies, heaviest first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickEvent {
    pub tick: u64,
    pub bodies: Vec<BodySnapshot>,
}

impl TickEvent {
    pub fn contains(&self, id: BodyId) -> bool {
        self.bodies.iter().any(|b| b.id == id)
    }

    pub fn body(&self, id: BodyId) -> Option<&BodySnapshot> {
        self.bodies.iter().find(|b| b.id == id)
    }
}

type TickListener = Box<dyn FnMut(&TickEvent)>;

/// Owns the body arena, the settings it was built with and the tick subscribers
///
/// Bodies are stored by [`BodyKey`]; a key is the body's index in the arena and
/// stays valid for the lifetime of the simulation, destroyed or not.
pub struct Simulation {
    pub(crate) settings: SimulationSettings,
    pub(crate) bodies: Vec<Body>,
    listeners: Vec<TickListener>,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        Self::with_factory(config, &DefaultBodyFactory)
    }

    pub fn with_factory(config: SimulationConfig, factory: &dyn BodyFactory) -> Result<Self> {
        config.settings.validate()?;

        let mut seen = HashSet::with_capacity(config.bodies.len());
        for definition in &config.bodies {
            definition.validate()?;
            if !seen.insert(definition.id) {
                return Err(SimulationError::DuplicateBodyId(definition.id));
            }
        }

        let bodies = config
            .bodies
            .iter()
            .enumerate()
            .map(|(i, definition)| factory.create(BodyKey(i), definition))
            .collect();

        Ok(Self {
            settings: config.settings,
            bodies,
            listeners: Vec::new(),
        })
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    /// Every body ever created, including destroyed ones
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, key: BodyKey) -> Option<&Body> {
        self.bodies.get(key.0)
    }

    pub fn find(&self, id: BodyId) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id == id)
    }

    /// Registers a listener called with every published tick
    pub fn subscribe(&mut self, listener: impl FnMut(&TickEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn publish(&mut self, event: &TickEvent) {
        for listener in &mut self.listeners {
            listener(event);
        }
    }
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("settings", &self.settings)
            .field("bodies", &self.bodies.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
