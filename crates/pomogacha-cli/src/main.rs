use clap::{CommandFactory, Parser, Subcommand};
use pomogacha_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "pomogacha-cli", version, about = "Pomogacha CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Course lifecycle
    Course {
        #[command(subcommand)]
        action: commands::course::CourseAction,
    },
    /// Run focus and break countdowns
    Focus {
        #[command(subcommand)]
        action: commands::focus::FocusAction,
    },
    /// Preview reward draws
    Reward {
        #[command(subcommand)]
        action: commands::reward::RewardAction,
    },
    /// Collected rewards
    Collection {
        #[command(subcommand)]
        action: commands::collection::CollectionAction,
    },
    /// User settings
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Timer snapshots and recovery
    Snapshot {
        #[command(subcommand)]
        action: commands::snapshot::SnapshotAction,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

/// Logs go to stderr so stdout stays JSON.
fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "pomogacha-cli", &mut std::io::stdout());
        return;
    }

    init_tracing(&Config::load_or_default().log.filter);
    let result = match cli.command {
        Commands::Course { action } => commands::course::run(action).await,
        Commands::Focus { action } => commands::focus::run(action).await,
        Commands::Reward { action } => commands::reward::run(action),
        Commands::Collection { action } => commands::collection::run(action).await,
        Commands::Settings { action } => commands::settings::run(action).await,
        Commands::Config { action } => commands::config::run(action),
        Commands::Snapshot { action } => commands::snapshot::run(action).await,
        Commands::Completions { .. } => Ok(()),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
