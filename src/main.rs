//! Header-filtering reverse proxy.
//!
//! Forwards every request, whatever its method or path, to one configured
//! upstream base URL.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use proxybench::config::load_config;
use proxybench::lifecycle::startup::bind_listener;
use proxybench::observability::{logging, metrics};
use proxybench::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "header-proxy")]
#[command(about = "Reverse proxy that forwards all requests to a fixed upstream", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "proxy.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(&args.config) {
        Ok(config) => config,
        Err(e) => {
            logging::init("info");
            tracing::error!(path = %args.config.display(), error = %e, "Invalid configuration, exiting");
            return ExitCode::FAILURE;
        }
    };

    logging::init(&config.observability.log_level);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        target_base = %config.target_base,
        bind_address = %config.bind_address(),
        rewrite_host = config.rewrite_host,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        "header-proxy starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let bind_address = config.bind_address();
    let server = match HttpServer::new(config) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize proxy");
            return ExitCode::FAILURE;
        }
    };

    let listener = match bind_listener(&bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(address = %bind_address, error = %e, "Failed to bind");
            return ExitCode::FAILURE;
        }
    };

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    if let Err(e) = server.run(listener, shutdown.subscribe()).await {
        tracing::error!(error = %e, "Proxy server failed");
        return ExitCode::FAILURE;
    }

    tracing::info!("Shutdown complete");
    ExitCode::SUCCESS
}
