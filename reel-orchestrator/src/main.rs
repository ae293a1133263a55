use std::sync::Arc;

use anyhow::Context;
use reel_client::{BuildServerClient, RemoteRunner};
use reel_orchestrator::config::Config;
use reel_orchestrator::repository::{InMemoryJobStore, JobStore, PgJobStore};
use reel_orchestrator::service::JobOrchestrator;
use reel_orchestrator::{api, db};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "reel_orchestrator=info,reel_client=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Reel Orchestrator...");

    let config = Config::from_env();
    config.validate().context("Invalid configuration")?;

    tracing::info!("Build server: {}", config.runner_url);

    let store: Arc<dyn JobStore> = match &config.database_url {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let pool = db::create_pool(database_url)
                .await
                .context("Failed to create database pool")?;
            db::run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;
            Arc::new(PgJobStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, jobs are kept in memory only");
            Arc::new(InMemoryJobStore::new())
        }
    };

    let http = reqwest::Client::builder()
        .timeout(config.runner_request_timeout)
        .build()
        .context("Failed to build HTTP client")?;
    let mut client = BuildServerClient::with_client(config.runner_url.clone(), http);
    if let (Some(user), Some(token)) = (&config.runner_user, &config.runner_api_token) {
        client = client.with_credentials(user.clone(), token.clone());
    }
    let runner: Arc<dyn RemoteRunner> = Arc::new(client);

    // Jobs left processing by a previous run are not resumed
    let orchestrator = JobOrchestrator::new(store, runner, config.orchestrator_settings());

    tokio::fs::create_dir_all(&config.downloads_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.downloads_dir.display()))?;
    tracing::info!("Serving downloads from {}", config.downloads_dir.display());

    let app = api::create_router(orchestrator, &config.downloads_dir);

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Orchestrator stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
