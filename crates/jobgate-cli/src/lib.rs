// src/lib.rs

pub mod api;
pub mod cli;
pub mod config;
pub mod logging;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::{mpsc, watch};
use tracing::info;

use jobgate_core::app::{App, AppBuilder};
use jobgate_core::ports::SystemClock;
use jobgate_http::{HttpInterruptionApi, HttpPublisher, HttpTaskStateApi};

use crate::api::ApiState;
use crate::cli::CliArgs;
use crate::config::{JobgateConfig, load_and_validate};

/// Pending task updates waiting for the auto-trigger consumer.
const TASK_UPDATE_BUFFER: usize = 256;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - HTTP adapters for the task-manager, interruption-server and bus
/// - the auto-trigger consumer and the scheduler (when enabled)
/// - the HTTP API
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_and_validate(&args.config)?;

    if args.dry_run {
        print_dry_run(&cfg)?;
        return Ok(());
    }

    let app = build_app(&cfg)?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut background = Vec::new();

    let task_updates = if cfg.auto.enabled {
        let (tx, rx) = mpsc::channel(TASK_UPDATE_BUFFER);
        background.push(tokio::spawn(
            app.auto_trigger.clone().run(rx, shutdown_rx.clone()),
        ));
        info!(trigger_file_types = ?cfg.auto.trigger_file_types, "automatic launch enabled");
        Some(tx)
    } else {
        None
    };

    if cfg.scheduler.enabled {
        background.push(tokio::spawn(app.scheduler.clone().run(shutdown_rx.clone())));
        info!(
            every_minutes = cfg.scheduler.frequency_in_minutes,
            start_hour = cfg.scheduler.start_hour,
            end_hour = cfg.scheduler.end_hour,
            timezone = %cfg.scheduler.timezone,
            "scheduler enabled"
        );
    }

    let router = api::router(ApiState::new(&app, task_updates));
    let addr: SocketAddr = cfg
        .server
        .listen
        .parse()
        .with_context(|| format!("parsing listen address {:?}", cfg.server.listen))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // ignore send error: loops may already be gone
    let _ = shutdown_tx.send(true);
    for handle in background {
        let _ = handle.await;
    }
    Ok(())
}

/// Build the application with the HTTP adapters described by `cfg`.
pub fn build_app(cfg: &JobgateConfig) -> Result<App> {
    let client = jobgate_http::client(cfg.request_timeout())?;
    let task_state = HttpTaskStateApi::new(
        client.clone(),
        &cfg.upstream.task_timestamp_url,
        &cfg.upstream.task_business_date_url,
    )?;
    let interruption = HttpInterruptionApi::new(client.clone(), &cfg.upstream.interrupt_run_url)?;
    let publisher = HttpPublisher::new(client, &cfg.bus.publish_url)?;

    let app = AppBuilder::new()
        .task_state(Arc::new(task_state))
        .interruption(Arc::new(interruption))
        .publisher(Arc::new(publisher))
        .clock(Arc::new(SystemClock))
        .retry(cfg.retry_policy())
        .auto_filter(cfg.auto_filter())
        .schedule(cfg.schedule_settings()?)
        .build()?;
    Ok(app)
}

fn print_dry_run(cfg: &JobgateConfig) -> Result<()> {
    let rendered = toml::to_string_pretty(cfg).context("rendering resolved config")?;
    println!("# resolved configuration");
    print!("{rendered}");
    Ok(())
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    info!("shutdown requested");
}
