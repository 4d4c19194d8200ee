use clap::Subcommand;
use pomogacha_core::{Event, Phase, Session, SnapshotMode, TimerDriver};

use super::{open_session, print_json, CliResult};

#[derive(Subcommand)]
pub enum FocusAction {
    /// Count down the next focus session, then draw its reward.
    /// Ctrl-C saves a snapshot instead of finishing.
    Run {
        /// Also count down the break that follows
        #[arg(long)]
        with_break: bool,
        /// Skip the break and go straight to the next focus
        #[arg(long, conflicts_with = "with_break")]
        skip_break: bool,
        /// Do not print every tick
        #[arg(long, short)]
        quiet: bool,
    },
}

enum CountdownEnd {
    Completed,
    Interrupted,
}

/// Drive one countdown to zero, printing its events.
async fn count_down(session: &mut Session, mode: SnapshotMode, quiet: bool) -> CliResult<CountdownEnd> {
    let mut driver = TimerDriver::new(session.countdown(mode))
        .on_complete(move || tracing::info!(%mode, "countdown finished"));
    let mut events = driver.subscribe();
    driver.start(None).await;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(Event::TimerCompleted { .. }) | None => return Ok(CountdownEnd::Completed),
                Some(Event::TimerTicked { .. }) if quiet => {}
                Some(event) => print_json(&event)?,
            },
            _ = &mut ctrl_c => {
                let remaining = driver.remaining_ms().await;
                driver.stop().await;
                let snapshot = session.suspend(mode, remaining).await?;
                print_json(&snapshot)?;
                return Ok(CountdownEnd::Interrupted);
            }
        }
    }
}

pub async fn run(action: FocusAction) -> CliResult {
    let FocusAction::Run {
        with_break,
        skip_break,
        quiet,
    } = action;
    let mut session = open_session().await?;

    if session.flow().phase() != Phase::Focusing {
        return Err(format!("no focus session to run (phase: {})", session.flow().phase()).into());
    }

    if let CountdownEnd::Interrupted = count_down(&mut session, SnapshotMode::Focus, quiet).await? {
        return Ok(());
    }
    let outcome = session.complete_focus().await?;
    print_json(&outcome)?;

    if session.flow().phase() != Phase::Rewarded {
        return Ok(());
    }
    if skip_break {
        print_json(&session.next_focus()?)?;
    } else if with_break {
        print_json(&session.take_break()?)?;
        if let CountdownEnd::Completed = count_down(&mut session, SnapshotMode::Break, quiet).await? {
            print_json(&session.complete_break().await?)?;
        }
    }
    Ok(())
}
