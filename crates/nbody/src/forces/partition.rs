//! Mass-based split of living bodies into real and pseudo bodies

use ordered_sequence::OrderedSequence;
use tracing::debug;

use crate::body::{BodyRank, by_mass};
use crate::error::Result;

/// Which bodies get exact pairwise gravity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartitionRule {
    /// The heaviest `real_bodies_min` living bodies are always real
    pub real_bodies_min: usize,
    /// Bodies at least this heavy are always real
    pub real_mass_threshold: f64,
}

impl PartitionRule {
    pub fn is_real(&self, rank: usize, mass: f64) -> bool {
        rank < self.real_bodies_min || mass >= self.real_mass_threshold
    }
}

/// Living bodies split by [`PartitionRule`], both halves heaviest first
#[derive(Debug, Clone)]
pub struct MassPartition {
    real: OrderedSequence<BodyRank>,
    pseudo: OrderedSequence<BodyRank>,
}

impl Default for MassPartition {
    fn default() -> Self {
        Self::new()
    }
}

impl MassPartition {
    pub fn new() -> Self {
        Self {
            real: OrderedSequence::with_comparator(by_mass),
            pseudo: OrderedSequence::with_comparator(by_mass),
        }
    }

    pub fn real(&self) -> &OrderedSequence<BodyRank> {
        &self.real
    }

    pub fn pseudo(&self) -> &OrderedSequence<BodyRank> {
        &self.pseudo
    }

    /// Classifies the living bodies and trims destroyed ones off its tail
    ///
    /// `living` must be freshly re-sorted by [`by_mass`], which puts every
    /// destroyed body after every living one.
    pub fn rebuild(
        &mut self,
        living: &mut OrderedSequence<BodyRank>,
        rule: &PartitionRule,
    ) -> Result<()> {
        self.real.clear();
        self.pseudo.clear();

        for (rank, body) in living.iter().enumerate() {
            if body.is_destroyed() {
                break;
            }
            if rule.is_real(rank, body.mass) {
                self.real.ordered_insert(*body)?;
            } else {
                self.pseudo.ordered_insert(*body)?;
            }
        }

        while living.last().is_some_and(BodyRank::is_destroyed) {
            living.pop();
        }

        debug!(
            real = self.real.len(),
            pseudo = self.pseudo.len(),
            "partitioned living bodies"
        );
        Ok(())
    }
}
