use clap::{Subcommand, ValueEnum};
use pomogacha_core::SnapshotMode;

use super::{open_session, print_json, CliResult};

#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Focus,
    Break,
}

impl From<ModeArg> for SnapshotMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Focus => SnapshotMode::Focus,
            ModeArg::Break => SnapshotMode::Break,
        }
    }
}

#[derive(Subcommand)]
pub enum SnapshotAction {
    /// Save a snapshot as if the app went inactive now
    Save {
        #[arg(value_enum)]
        mode: ModeArg,
        /// Milliseconds left on the countdown
        remaining_ms: u64,
    },
    /// Print the stored snapshot
    Show,
    /// Reconcile the stored snapshot against the current course and clock
    Recover,
    /// Delete the stored snapshot
    Clear,
}

pub async fn run(action: SnapshotAction) -> CliResult {
    let mut session = open_session().await?;
    match action {
        SnapshotAction::Save { mode, remaining_ms } => {
            let snapshot = session.suspend(mode.into(), remaining_ms).await?;
            print_json(&snapshot)?;
        }
        SnapshotAction::Show => print_json(&session.recovery().load_snapshot().await)?,
        SnapshotAction::Recover => print_json(&session.resume().await?)?,
        SnapshotAction::Clear => {
            session.recovery().clear_snapshot().await?;
            println!("snapshot cleared");
        }
    }
    Ok(())
}
