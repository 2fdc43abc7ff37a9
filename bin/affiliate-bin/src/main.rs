mod cli;

use crate::cli::{AffiliateCli, LogFormat};
use anyhow::Result;
use clap::Parser;
use dotenvy::dotenv;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use affiliate_api::{ApiService, AppState};
use affiliate_db::{init_pool, run_migrations};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let AffiliateCli {
        database_url,
        database_max_connections,
        api_host,
        api_port,
        payouts_excluded_program_id,
        log_format,
    } = AffiliateCli::parse();

    init_tracing(log_format);

    let app_name = "affiliate_api";
    let pool = init_pool(app_name, &database_url, database_max_connections)?;
    run_migrations(&pool).await?;

    let app_state = AppState {
        pool,
        excluded_program_id: payouts_excluded_program_id.filter(|id| !id.is_empty()),
    };

    let api_service = ApiService::new(app_state, &api_host, api_port);

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            wait_for_shutdown_signal().await;
            tracing::info!("Shutdown signal received");
            shutdown.cancel();
        }
    });

    api_service.run(shutdown).await?;

    tracing::info!("👋 Bye!");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Cannot listen for SIGTERM, waiting for Ctrl-C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
