mod engine;
mod weights;

pub use engine::{reward_rng, Draw, RewardEngine, RewardRng};
pub use weights::{uniform_pick, RarityWeights};
