//! Random compositions for exercises.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Phase, PlateLayer, PlateSpec};
use crate::error::LayerResult;
use crate::geometry::Orientation;
use crate::kind::PlateKind;
use crate::serialized::PlatePrototype;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomConfig {
    /// Target plate count before deviation.
    pub size_mid: u32,
    /// The target count varies uniformly by up to this much either way.
    pub size_deviation: u32,
    /// Placement attempts per plate before that plate is abandoned.
    pub attempts_max: u32,
}

impl Default for RandomConfig {
    fn default() -> Self {
        RandomConfig { size_mid: 10, size_deviation: 2, attempts_max: 40 }
    }
}

impl PlateLayer {
    /// Replace the composition with randomly placed plates drawn from
    /// `prototypes`, each used at most `quantity` times. Returns how many
    /// plates were placed.
    ///
    /// A plate that finds no free spot within `attempts_max` tries is
    /// dropped and not replaced, so a crowded grid yields fewer plates than
    /// the target.
    pub fn set_random<R: Rng>(
        &mut self,
        rng: &mut R,
        prototypes: &[PlatePrototype],
        config: &RandomConfig,
    ) -> LayerResult<usize> {
        for proto in prototypes {
            PlateKind::from_alias(&proto.kind)?;
        }
        if self.phase != Phase::Idle {
            tracing::warn!(phase = ?self.phase, "random generation skipped during another operation");
            return Ok(0);
        }
        self.phase = Phase::Generating;
        let result = self.fill_random(rng, prototypes, config);
        self.phase = Phase::Idle;
        self.emit_composition();
        result
    }

    fn fill_random<R: Rng>(
        &mut self,
        rng: &mut R,
        prototypes: &[PlatePrototype],
        config: &RandomConfig,
    ) -> LayerResult<usize> {
        self.remove_all_plates();

        let dev = config.size_deviation as i64;
        let target = (config.size_mid as i64 + rng.random_range(-dev..=dev)).max(0) as usize;
        let mut pool: Vec<PlatePrototype> =
            prototypes.iter().filter(|p| p.quantity > 0).cloned().collect();
        let dim = self.grid.dim();
        let mut placed = 0;

        for _ in 0..target {
            if pool.is_empty() {
                break;
            }
            let idx = rng.random_range(0..pool.len());
            let proto = pool[idx].clone();
            pool[idx].quantity -= 1;
            if pool[idx].quantity == 0 {
                pool.remove(idx);
            }

            let mut found = false;
            for _ in 0..config.attempts_max {
                let orientation = Orientation::ALL[rng.random_range(0..4)];
                let x = rng.random_range(0..dim.x);
                let y = rng.random_range(0..dim.y);
                let spec = PlateSpec::new(&proto.kind)
                    .at(x, y)
                    .facing(orientation)
                    .properties(proto.properties.clone())
                    .quiet();
                let Some(id) = self.add_plate(&spec)? else {
                    continue;
                };
                if self.has_intersections(id)? {
                    self.remove_plate(id)?;
                    continue;
                }
                found = true;
                break;
            }
            if found {
                placed += 1;
            } else {
                tracing::debug!(kind = %proto.kind, attempts = config.attempts_max, "no free spot, plate abandoned");
            }
        }
        tracing::debug!(target, placed, "random composition generated");
        Ok(placed)
    }
}
