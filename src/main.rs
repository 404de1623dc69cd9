use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tosabendo::{api, config::Config, db};

const DEFAULT_PORT: u16 = 3000;

#[derive(Parser)]
#[command(name = "tosabendo")]
#[command(about = "Project dashboard analytics: KPIs, critical path and reports")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Database file (defaults to TOSABENDO_DB or the platform data directory)
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "tosabendo=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn serve(port: u16, db_path: Option<PathBuf>, config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting Tô Sabendo server on port {}", port);

    let database = match db_path.or_else(|| config.database_path.clone()) {
        Some(path) => db::Database::open(path)?,
        None => db::Database::open_default()?,
    };
    database.migrate()?;

    if config.narrative.url.is_none() {
        tracing::info!("Narrative service not configured, reports will use fallback observations");
    }

    let app = api::create_router(api::AppState::new(database, &config));

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("Tô Sabendo server listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = Config::from_env();

    match cli.command {
        Some(Commands::Serve { port, db }) => serve(port, db, config).await,
        None => serve(DEFAULT_PORT, None, config).await,
    }
}
