use clap::Subcommand;
use pomogacha_core::SettingsPatch;

use super::{minutes_to_ms, open_session, print_json, CliResult};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print the current settings as JSON
    Show,
    /// Change one or more settings
    Set {
        /// Default focus length in minutes
        #[arg(long)]
        focus: Option<u64>,
        /// Default break length in minutes
        #[arg(long = "break")]
        break_minutes: Option<u64>,
        #[arg(long)]
        vibration: Option<bool>,
        #[arg(long)]
        sound: Option<bool>,
    },
    /// Restore default settings
    Reset,
}

pub async fn run(action: SettingsAction) -> CliResult {
    let mut session = open_session().await?;
    match action {
        SettingsAction::Show => print_json(session.settings().get())?,
        SettingsAction::Set {
            focus,
            break_minutes,
            vibration,
            sound,
        } => {
            let patch = SettingsPatch {
                default_focus_ms: focus.map(minutes_to_ms),
                default_break_ms: break_minutes.map(minutes_to_ms),
                vibration,
                sound,
            };
            let updated = session.settings_mut().update(&patch).await?;
            print_json(updated)?;
        }
        SettingsAction::Reset => {
            let defaults = session.settings_mut().reset().await?;
            print_json(defaults)?;
        }
    }
    Ok(())
}
