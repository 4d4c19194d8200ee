//! Weighted-rarity reward draw.
//!
//! A draw first picks a tier by weight, then picks uniformly among the pool
//! items of that tier. When the tier has no items the draw falls back to the
//! pool items of any selectable tier, and only then to the whole pool, so a
//! non-empty pool always yields an item.

use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use super::weights::{uniform_pick, RarityWeights};
use crate::catalog::{Rarity, RewardItem};
use crate::error::RewardError;

/// Random source used by the app outside of tests.
pub type RewardRng = Mcg128Xsl64;

/// Seeded when `seed` is set, otherwise from OS entropy.
pub fn reward_rng(seed: Option<u64>) -> RewardRng {
    match seed {
        Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
        None => Mcg128Xsl64::from_entropy(),
    }
}

/// Result of one draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draw {
    pub item: RewardItem,
    pub rarity: Rarity,
}

#[derive(Debug, Clone)]
pub struct RewardEngine {
    weights: RarityWeights,
}

impl Default for RewardEngine {
    fn default() -> Self {
        Self {
            weights: RarityWeights::default(),
        }
    }
}

impl RewardEngine {
    /// Fails when no tier has a positive weight.
    pub fn new(weights: RarityWeights) -> Result<Self, RewardError> {
        weights.validate()?;
        Ok(Self { weights })
    }

    pub fn weights(&self) -> &RarityWeights {
        &self.weights
    }

    /// Draw from `pool` using `rng`. Returns `None` only for an empty pool.
    pub fn draw<R: Rng + ?Sized>(&self, pool: &[RewardItem], rng: &mut R) -> Option<Draw> {
        let tier_roll: f64 = rng.gen();
        let item_roll: f64 = rng.gen();
        self.draw_with(pool, tier_roll, item_roll)
    }

    /// Deterministic draw from two uniform samples in `[0, 1)`.
    pub fn draw_with(&self, pool: &[RewardItem], tier_roll: f64, item_roll: f64) -> Option<Draw> {
        if pool.is_empty() {
            return None;
        }
        let tier = self.weights.pick(tier_roll);
        let mut candidates: Vec<&RewardItem> =
            pool.iter().filter(|i| Some(i.rarity) == tier).collect();
        if candidates.is_empty() {
            candidates = pool
                .iter()
                .filter(|i| self.weights.is_selectable(i.rarity))
                .collect();
        }
        if candidates.is_empty() {
            candidates = pool.iter().collect();
        }
        let item = (*uniform_pick(&candidates, item_roll)?).clone();
        Some(Draw {
            rarity: item.rarity,
            item,
        })
    }
}
