use clap::Subcommand;
use pomogacha_core::Config;

use super::{print_json, CliResult};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one value by dotted key
    Get {
        /// Dotted key (e.g. "timer.tick_ms", "reward.weights.RARE")
        key: String,
    },
    /// Change one value; the file is only written if the result validates
    Set {
        key: String,
        value: String,
    },
    /// Print the whole config as JSON
    List,
    /// Print the config file location
    Path,
    /// Overwrite the config file with defaults
    Reset,
}

pub fn run(action: ConfigAction) -> CliResult {
    match action {
        ConfigAction::Get { key } => {
            let value = Config::load()?
                .get(&key)
                .ok_or_else(|| format!("unknown key: {key}"))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            tracing::info!(%key, %value, "config updated");
            println!("ok");
        }
        ConfigAction::List => print_json(&Config::load()?)?,
        ConfigAction::Path => println!("{}", Config::path()?.display()),
        ConfigAction::Reset => {
            let defaults = Config::default();
            defaults.save()?;
            print_json(&defaults)?;
        }
    }
    Ok(())
}
