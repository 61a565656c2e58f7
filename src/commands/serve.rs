//! HTTP server command implementation.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::Result;
use tokio::signal;
use tokio::sync::Mutex;
use tracing::{info, warn};

use ironlog::background::BackgroundTasks;
use ironlog::config::SchedulerConfig;
use ironlog::scheduler::{
    Cadence, ReapAbandonedJob, RenewSubscriptionsJob, SchedulerHandle, SchedulerService,
    UpgradeReminderJob,
};
use ironlog::server;

use super::Runtime;

pub async fn run(
    config_path: &str,
    host_override: Option<IpAddr>,
    port_override: Option<u16>,
) -> Result<()> {
    let mut runtime = Runtime::load(config_path).await?;

    // CLI overrides config
    if let Some(host) = host_override {
        runtime.config.server.host = host.to_string();
    }
    if let Some(port) = port_override {
        runtime.config.server.port = port;
    }

    let background_tasks = BackgroundTasks::new();
    let scheduler = if runtime.config.scheduler.enabled {
        Some(start_scheduler(&runtime, &runtime.config.scheduler, background_tasks.clone())?)
    } else {
        info!("Scheduler disabled");
        None
    };

    // Create shutdown channel for HTTP-triggered shutdown
    let (shutdown_tx, shutdown_rx) = server::shutdown_channel();

    let server_config = &runtime.config.server;
    let state = server::AppState {
        workouts: runtime.workouts.clone(),
        scheduler: scheduler.clone(),
        admin_token: server_config.admin_token.clone(),
        api_token: server_config.api_token.clone(),
        max_connections: server_config.max_connections,
        shutdown_tx: Arc::new(Mutex::new(Some(shutdown_tx))),
    };

    let app = server::build_app(state, server_config.request_timeout_seconds);

    let ip: IpAddr = server_config.host.parse()?;
    let addr = SocketAddr::new(ip, server_config.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(addr = %addr, "Starting server");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(shutdown_rx))
    .await?;

    // Stop timers and wait for in-flight job runs
    if let Some(scheduler) = scheduler {
        scheduler.shutdown().await;
    }
    background_tasks.shutdown().await;

    info!("Server stopped");
    Ok(())
}

/// Register the maintenance jobs and start their timers.
fn start_scheduler(
    runtime: &Runtime,
    config: &SchedulerConfig,
    tasks: BackgroundTasks,
) -> Result<SchedulerHandle> {
    let mut service = SchedulerService::new(tasks);

    service.register(
        Arc::new(ReapAbandonedJob::new(runtime.reaper.clone())),
        Cadence::cron(&config.reaper_cron)?,
    );
    service.register(
        Arc::new(RenewSubscriptionsJob::new(runtime.renewals.clone())),
        Cadence::cron(&config.renewal_cron)?,
    );
    service.register_with_initial_run(
        Arc::new(UpgradeReminderJob::new(runtime.renewals.clone())),
        Cadence::every(chrono::Duration::days(
            config.upgrade_reminder_interval_days,
        ))?,
    );

    info!(
        reaper = %config.reaper_cron,
        renewal = %config.renewal_cron,
        reminder_days = config.upgrade_reminder_interval_days,
        "Scheduler service started"
    );
    Ok(service.start())
}

async fn shutdown_signal(http_shutdown: tokio::sync::oneshot::Receiver<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
        _ = http_shutdown => info!("Received shutdown request via HTTP, shutting down..."),
    }
}
