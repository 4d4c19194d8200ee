//! Rarity weight table and the weighted tier pick.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::Rarity;
use crate::error::RewardError;

/// Relative draw weight per tier.
///
/// Tiers are walked in `Rarity` declaration order. A tier that is missing,
/// non-positive or non-finite can never be picked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RarityWeights(BTreeMap<Rarity, f64>);

impl Default for RarityWeights {
    fn default() -> Self {
        Self::from_pairs([
            (Rarity::Common, 70.0),
            (Rarity::Uncommon, 20.0),
            (Rarity::Rare, 7.0),
            (Rarity::Epic, 2.0),
            (Rarity::Legendary, 1.0),
            (Rarity::UltraRare, 0.5),
        ])
    }
}

impl RarityWeights {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Rarity, f64)>) -> Self {
        Self(pairs.into_iter().collect())
    }

    pub fn get(&self, rarity: Rarity) -> Option<f64> {
        self.0.get(&rarity).copied()
    }

    pub fn set(&mut self, rarity: Rarity, weight: f64) {
        self.0.insert(rarity, weight);
    }

    pub fn is_selectable(&self, rarity: Rarity) -> bool {
        self.get(rarity).is_some_and(usable)
    }

    /// Tiers that can be picked, with their weights, in walk order.
    pub fn selectable(&self) -> impl Iterator<Item = (Rarity, f64)> + '_ {
        self.0
            .iter()
            .filter(|(_, w)| usable(**w))
            .map(|(r, w)| (*r, *w))
    }

    /// Sum of all selectable weights, capped to stay finite.
    pub fn total(&self) -> f64 {
        self.selectable().map(|(_, w)| w).sum::<f64>().min(f64::MAX)
    }

    pub fn validate(&self) -> Result<(), RewardError> {
        if self.total() > 0.0 {
            Ok(())
        } else {
            Err(RewardError::NoPositiveWeight)
        }
    }

    /// Pick a tier from `unit`, a uniform sample in `[0, 1)`.
    ///
    /// The sample is scaled to `[0, total)` and each selectable weight is
    /// subtracted in order until the remainder drops to zero or below.
    /// Returns `None` only when no tier is selectable.
    pub fn pick(&self, unit: f64) -> Option<Rarity> {
        let total = self.total();
        if total <= 0.0 {
            return None;
        }
        let mut remainder = clamp_unit(unit) * total;
        let mut last = None;
        for (rarity, weight) in self.selectable() {
            remainder -= weight;
            last = Some(rarity);
            if remainder <= 0.0 {
                return Some(rarity);
            }
        }
        // Float rounding can leave a sliver past the final tier.
        last
    }
}

/// Pick one element from `items` using a uniform sample in `[0, 1)`.
pub fn uniform_pick<T>(items: &[T], unit: f64) -> Option<&T> {
    if items.is_empty() {
        return None;
    }
    let idx = (clamp_unit(unit) * items.len() as f64) as usize;
    items.get(idx.min(items.len() - 1))
}

fn usable(weight: f64) -> bool {
    weight.is_finite() && weight > 0.0
}

fn clamp_unit(unit: f64) -> f64 {
    if unit.is_nan() {
        0.0
    } else {
        unit.clamp(0.0, 1.0)
    }
}
