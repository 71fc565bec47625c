use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "studydash", version, about = "StudyDash CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Local user profile
    Profile {
        #[command(subcommand)]
        action: commands::profile::ProfileAction,
    },
    /// Daily study goal
    Goal {
        #[command(subcommand)]
        action: commands::goal::GoalAction,
    },
    /// Seconds studied per day
    Activity {
        #[command(subcommand)]
        action: commands::activity::ActivityAction,
    },
    /// Daily reward
    Reward {
        #[command(subcommand)]
        action: commands::reward::RewardAction,
    },
    /// Inbox messages
    Inbox {
        #[command(subcommand)]
        action: commands::inbox::InboxAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Run a dashboard session
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("STUDYDASH_LOG")
                .unwrap_or_else(|_| "studydash=info,studydash_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Profile { action } => commands::profile::run(action).await,
        Commands::Goal { action } => commands::goal::run(action).await,
        Commands::Activity { action } => commands::activity::run(action).await,
        Commands::Reward { action } => commands::reward::run(action).await,
        Commands::Inbox { action } => commands::inbox::run(action).await,
        Commands::Config { action } => commands::config::run(action),
        Commands::Session { action } => commands::session::run(action).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
