use clap::Subcommand;
use pomogacha_core::time::format_mmss;
use serde_json::json;

use super::{minutes_to_ms, open_session, print_json, CliResult};

#[derive(Subcommand)]
pub enum CourseAction {
    /// Start a new course (an unfinished one is archived first)
    Start {
        /// Number of focus sessions
        #[arg(long, short = 'n', default_value_t = 4)]
        sessions: u32,
        /// Focus length in minutes (defaults to settings)
        #[arg(long)]
        focus: Option<u64>,
        /// Break length in minutes (defaults to settings)
        #[arg(long = "break")]
        break_minutes: Option<u64>,
    },
    /// Print the current course and phase as JSON
    Status,
    /// Record a finished focus session and draw its reward
    Complete,
    /// End the current course and print its summary
    End,
    /// List ended courses
    History,
    /// Summary of the most recently ended course
    Summary,
}

pub async fn run(action: CourseAction) -> CliResult {
    let mut session = open_session().await?;
    match action {
        CourseAction::Start {
            sessions,
            focus,
            break_minutes,
        } => {
            let events = session
                .start_course(sessions, focus.map(minutes_to_ms), break_minutes.map(minutes_to_ms))
                .await?;
            print_json(&events)?;
        }
        CourseAction::Status => {
            let flow = session.flow();
            print_json(&json!({
                "phase": flow.phase(),
                "course": flow.course(),
                "remainingSessions": flow.course().map(|c| c.remaining_sessions()),
                "focusLength": flow.course().map(|c| format_mmss(c.focus_ms)),
                "breakLength": flow.course().map(|c| format_mmss(c.break_ms)),
            }))?;
        }
        CourseAction::Complete => {
            let outcome = session.complete_focus().await?;
            print_json(&outcome)?;
        }
        CourseAction::End => match session.end_course().await? {
            Some((summary, _)) => print_json(&summary)?,
            None => eprintln!("no current course"),
        },
        CourseAction::History => {
            let history: Vec<_> = session
                .flow()
                .book()
                .history()
                .iter()
                .map(|c| c.summary())
                .collect();
            print_json(&history)?;
        }
        CourseAction::Summary => match session.flow().book().last_summary() {
            Some(summary) => print_json(&summary)?,
            None => eprintln!("no ended course yet"),
        },
    }
    Ok(())
}
