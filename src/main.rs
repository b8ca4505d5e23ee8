#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

use mensageria_server::config::Config;
use mensageria_server::{AppBuilder, telemetry};
use std::net::SocketAddr;
use tokio::sync::watch;
use tracing::Instrument;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load();
    let telemetry_guard = telemetry::init_telemetry(&config.telemetry)?;

    let boot_span = tracing::info_span!("boot_server");
    let (listener, app_router, shutdown_rx) = async {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        mensageria_server::spawn_signal_handler(shutdown_tx);

        let services = AppBuilder::new(config.clone()).build()?;
        let _janitor = services.rate_limit_service.spawn_janitor(shutdown_rx.clone());
        let app_router = mensageria_server::api::app_router(config.clone(), services);

        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
        tracing::info!(address = %addr, "listening");
        let listener = tokio::net::TcpListener::bind(addr).await?;

        Ok::<(tokio::net::TcpListener, axum::Router, watch::Receiver<bool>), anyhow::Error>((
            listener,
            app_router,
            shutdown_rx,
        ))
    }
    .instrument(boot_span)
    .await?;

    let mut server_rx = shutdown_rx.clone();
    let server = axum::serve(listener, app_router.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async move {
            let _ = server_rx.wait_for(|&s| s).await;
        })
        .into_future();

    // Connections still open after the grace period are dropped.
    let mut deadline_rx = shutdown_rx;
    tokio::select! {
        res = server => {
            if let Err(e) = res {
                tracing::error!(error = %e, "Server error");
            }
        }
        () = async {
            let _ = deadline_rx.wait_for(|&s| s).await;
            tokio::time::sleep(std::time::Duration::from_secs(config.server.shutdown_timeout_secs)).await;
        } => {
            tracing::warn!("Timeout waiting for in-flight requests to finish.");
        }
    }

    telemetry_guard.shutdown();
    Ok(())
}
