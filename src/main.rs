use clap::{Parser, Subcommand};
use std::path::PathBuf;

use gymtrack::commands::{
    AnalyzeCommand, ConfigCommand, HistoryCommand, SessionCommand, SettingsCommand, SyncCommand,
    TemplateCommand,
};
use gymtrack::config::Config;
use gymtrack::db::init_db;
use gymtrack::store::DataStore;
use gymtrack::sync::{Companion, DetachedTransport};

#[derive(Parser)]
#[command(name = "gymtrack")]
#[command(version)]
#[command(about = "A workout tracking CLI with companion-device sync", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage template workouts (reusable plans)
    Template(TemplateCommand),

    /// Run a workout session
    Session(SessionCommand),

    /// Browse completed workouts
    History(HistoryCommand),

    /// Analyze weight trends
    Analyze(AnalyzeCommand),

    /// Per-device settings (weight unit, aggregation)
    Settings(SettingsCommand),

    /// Manage configuration
    Config(ConfigCommand),

    /// Sync with the paired device through the relay
    Sync(SyncCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config)?;

    // Config display needs no store
    if let Commands::Config(cmd) = &cli.command {
        return cmd.run(&config);
    }

    let pool = init_db(Some(config.database_path.value.clone())).await?;
    let mut store = DataStore::new(pool).await?;

    // Ordinary invocations never connect; outbound instructions queue for
    // the next `sync flush` when a pairing is configured.
    let transport = if config.sync.is_configured() {
        DetachedTransport::paired()
    } else {
        DetachedTransport::unpaired()
    };
    let mut companion = Companion::new(transport, config.role()?);

    match &cli.command {
        Commands::Template(cmd) => cmd.run(&mut store, &mut companion).await,
        Commands::Session(cmd) => cmd.run(&mut store, &mut companion).await,
        Commands::History(cmd) => cmd.run(&mut store, &mut companion).await,
        Commands::Analyze(cmd) => cmd.run(&store),
        Commands::Settings(cmd) => cmd.run(&mut store, &mut companion).await,
        Commands::Sync(cmd) => cmd.run(&mut store, &config).await,
        Commands::Config(_) => unreachable!("handled above"),
    }
}
