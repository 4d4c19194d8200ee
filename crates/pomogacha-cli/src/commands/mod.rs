pub mod collection;
pub mod config;
pub mod course;
pub mod focus;
pub mod reward;
pub mod settings;
pub mod snapshot;

use pomogacha_core::{Config, Session};
use serde::Serialize;

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Open the session on the configured database.
pub async fn open_session() -> CliResult<Session> {
    let config = Config::load()?;
    Ok(Session::open_default(config).await?)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Whole minutes from the command line to milliseconds.
pub fn minutes_to_ms(minutes: u64) -> u64 {
    pomogacha_core::time::minutes(minutes)
}
