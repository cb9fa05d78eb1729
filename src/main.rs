//! CineDB - movie and director catalogue API

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use std::path::Path;
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cinedb_backend::{
    auth::{AuthState, JwtHandler, UserStore},
    create_router,
    db::{Database, RecordStore},
    models::{Director, Movie, Resource},
    AppState, Config,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment and logging
    load_env();
    init_tracing();

    // Exits with a usage error when JWT_SECRET is absent
    let config = Config::parse();

    info!("Starting CineDB backend v{}", env!("CARGO_PKG_VERSION"));

    let user_store = UserStore::new(Database::open(&config.auth_db_path)?)
        .await
        .context("Failed to initialize credential store")?;
    let jwt_handler = Arc::new(JwtHandler::new(&config.jwt_secret));
    let auth_state = AuthState::new(user_store, jwt_handler);
    info!("Credential store at {}", config.auth_db_path.display());

    let movies: RecordStore<Movie> = RecordStore::new(Database::open(&config.movie_db_path)?)
        .await
        .context("Failed to initialize movie store")?;
    let directors: RecordStore<Director> =
        RecordStore::new(Database::open(&config.director_db_path)?)
            .await
            .context("Failed to initialize director store")?;
    info!(
        "Movie store at {}, director store at {}",
        config.movie_db_path.display(),
        config.director_db_path.display()
    );

    if !config.no_seed {
        movies
            .seed_if_empty(Movie::sample_data())
            .await
            .context("Failed to seed movies")?;
        directors
            .seed_if_empty(Director::sample_data())
            .await
            .context("Failed to seed directors")?;
    }

    let app = create_router(AppState {
        auth: auth_state,
        movies,
        directors,
    });

    // Start server
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("API server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Dropping the router released the last store handles
    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing from RUST_LOG, with a crate-level default
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cinedb_backend=debug,cinedb=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_env() {
    // 1) Standard dotenv search (cwd + parents)
    let _ = dotenv();

    // 2) Also try the crate directory when launched from elsewhere
    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Ctrl+C received, starting graceful shutdown"),
        _ = terminate => info!("SIGTERM received, starting graceful shutdown"),
    }
}
