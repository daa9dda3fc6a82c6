use anyhow::Result;
use haushalt_bridge::*;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    let (updates_tx, _) = broadcast::channel::<coordinator::CoordinatorUpdate>(
        app_config.publishing.broadcast_capacity,
    );

    let entry_repo = Arc::new(entry_repo::EntryRepo::connect(&app_config.database.path).await?);
    entry_repo.init().await?;

    let api = api_client::TerminalApi::new(
        Duration::from_secs(app_config.polling.auth_timeout_secs),
        Duration::from_secs(app_config.polling.fetch_timeout_secs),
    )?;
    let hub = Arc::new(hub::Hub::new(
        api,
        entry_repo.clone(),
        &app_config.polling,
        updates_tx,
    ));

    let loaded = hub.load_entries().await?;
    tracing::info!(entries = loaded, "config entries loaded");

    let created = hub.setup_households(&app_config.households).await;
    if !app_config.households.is_empty() {
        tracing::info!(
            created,
            listed = app_config.households.len(),
            "households from config file processed"
        );
    }

    let app = routes::app(hub.clone());
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = async {
            #[cfg(unix)]
            {
                let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                    Ok(s) => s,
                    Err(_) => {
                        let _ = tokio::signal::ctrl_c().await;
                        return;
                    }
                };
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            #[cfg(not(unix))]
            {
                let _ = tokio::signal::ctrl_c().await;
            }
        } => {
            tracing::info!("Received shutdown signal");
        }
    }

    hub.shutdown().await;
    entry_repo.close().await;
    Ok(())
}
