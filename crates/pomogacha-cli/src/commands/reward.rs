use std::path::Path;

use clap::Subcommand;
use pomogacha_core::reward::reward_rng;
use pomogacha_core::{Catalog, Config, Rarity, RewardEngine};
use serde_json::json;

use super::{print_json, CliResult};

#[derive(Subcommand)]
pub enum RewardAction {
    /// Draw from the catalog without recording anything
    Draw {
        /// Number of draws
        #[arg(long, short = 'n', default_value_t = 1)]
        count: u32,
        /// Seed for reproducible draws (overrides reward.seed)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the chance of each tier
    Odds,
    /// List the reward catalog
    Catalog,
}

fn engine_and_catalog(config: &Config) -> CliResult<(RewardEngine, Catalog)> {
    let engine = RewardEngine::new(config.reward.weights.clone())?;
    let catalog = match &config.reward.catalog_path {
        Some(path) => Catalog::from_json_file(Path::new(path))?,
        None => Catalog::builtin(),
    };
    Ok((engine, catalog))
}

pub fn run(action: RewardAction) -> CliResult {
    let config = Config::load()?;
    let (engine, catalog) = engine_and_catalog(&config)?;
    match action {
        RewardAction::Draw { count, seed } => {
            let mut rng = reward_rng(seed.or(config.reward.seed));
            let draws: Vec<_> = (0..count)
                .filter_map(|_| engine.draw(catalog.items(), &mut rng))
                .collect();
            print_json(&draws)?;
        }
        RewardAction::Odds => {
            let weights = engine.weights();
            let total = weights.total();
            let odds: Vec<_> = Rarity::ALL
                .iter()
                .map(|&rarity| {
                    let weight = if weights.is_selectable(rarity) {
                        weights.get(rarity).unwrap_or(0.0)
                    } else {
                        0.0
                    };
                    json!({
                        "rarity": rarity,
                        "weight": weight,
                        "chance": weight / total,
                        "items": catalog.by_rarity(rarity).count(),
                    })
                })
                .collect();
            print_json(&odds)?;
        }
        RewardAction::Catalog => print_json(catalog.items())?,
    }
    Ok(())
}
