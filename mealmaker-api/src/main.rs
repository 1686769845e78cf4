use clap::{Parser, Subcommand};
use mealmaker_api::config::{build_state, ServeArgs, Settings, StoreArgs};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Meal Maker marketplace API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve(ServeArgs),
    /// Apply pending database migrations and exit
    Migrate(StoreArgs),
}

async fn serve(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.token_ttl_seconds != args.session_expires_in_seconds {
        tracing::warn!(
            token_ttl_seconds = args.token_ttl_seconds,
            session_expires_in_seconds = args.session_expires_in_seconds,
            "sign-in reports an expires_in that differs from the token lifetime"
        );
    }

    let store = args.store.open().await?;
    let state = build_state(store, Settings::from(&args));
    let app = mealmaker_api::app(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", args.port)).await?;
    info!("Meal Maker API listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve(args) => serve(args).await,
        Commands::Migrate(args) => {
            if args.in_memory {
                return Err("nothing to migrate for the in-memory store".into());
            }
            args.open().await?;
            info!("migrations applied");
            Ok(())
        }
    }
}
