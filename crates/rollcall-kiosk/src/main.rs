use std::process::ExitCode;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::prelude::*;

use rollcall_core::KioskConfig;
use rollcall_kiosk::{AttendanceController, devices};
use rollcall_network::{BackendConfig, HttpBackend};

#[tokio::main]
async fn main() -> ExitCode {
    let env_file_loaded = dotenvy::dotenv().is_ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,rollcall=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if env_file_loaded {
        info!("loaded .env file");
    }

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let config = KioskConfig::from_env().context("invalid configuration")?;
    info!(
        api_url = %config.api_url,
        has_token = !config.api_token.is_empty(),
        lcd = %format!("{}x{}", config.lcd_columns, config.lcd_rows),
        "configuration loaded"
    );
    if config.api_token.is_empty() {
        warn!("API_TOKEN is not set; the backend will likely reject lookups");
    }

    let reader = devices::open_reader(&config.reader)
        .await
        .context("card reader initialization failed")?;
    let display = devices::open_display(&config).context("display initialization failed")?;
    let backend = HttpBackend::new(BackendConfig::from(&config))
        .context("backend client initialization failed")?;

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(shutdown.clone()));

    let mut controller = AttendanceController::new(reader, display, backend, config.timings)
        .with_shutdown_token(shutdown);
    controller.run().await?;

    Ok(())
}

/// Cancel `token` on Ctrl-C, or SIGTERM on Unix.
async fn cancel_on_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl-C: {e}");
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
                warn!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl-C"),
        _ = terminate => info!("received SIGTERM"),
    }
    token.cancel();
}
