//! Upload throughput simulator (server + client).

use clap::{CommandFactory, Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use proxybench::lifecycle::startup::bind_listener;
use proxybench::observability::logging;
use proxybench::upload::{ClientRecord, UploadClient, UploadRecord, UploadServer};
use proxybench::Shutdown;

#[derive(Parser, Debug)]
#[command(name = "upload-sim")]
#[command(about = "Upload throughput simulator (server + client)", long_about = None)]
struct Cli {
    /// Run mode
    #[arg(long, value_enum)]
    mode: Option<Mode>,

    /// Server host (server mode)
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Server port (server mode)
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Upload URL (client mode)
    #[arg(long, default_value = "http://localhost:8080/upload")]
    url: String,

    /// Number of parallel upload clients
    #[arg(long, default_value_t = 4)]
    clients: usize,

    /// Duration of the upload test in seconds
    #[arg(long, default_value_t = 10)]
    duration: u64,

    /// Bytes per request
    #[arg(long, default_value_t = 256 * 1024)]
    chunk_size: usize,

    /// Output CSV filename
    #[arg(long, default_value = "results.csv")]
    out: PathBuf,

    /// Run internal lightweight tests (no network) and exit
    #[arg(long)]
    run_tests: bool,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    Server,
    Client,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    if cli.run_tests {
        return match run_self_test().await {
            Ok(()) => {
                println!("All internal tests passed.");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Self-test failed: {e}");
                ExitCode::FAILURE
            }
        };
    }

    match cli.mode {
        Some(Mode::Server) => run_server(&cli).await,
        Some(Mode::Client) => run_client(&cli).await,
        None => {
            eprintln!("{}", Cli::command().render_help());
            eprintln!(
                "Error: --mode is required when not running --run-tests. Use --mode server or --mode client"
            );
            ExitCode::from(2)
        }
    }
}

async fn run_server(cli: &Cli) -> ExitCode {
    let address = format!("{}:{}", cli.host, cli.port);
    let listener = match bind_listener(&address).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(address = %address, error = %e, "Failed to bind");
            return ExitCode::FAILURE;
        }
    };

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    println!("[SERVER] Running on http://{address}");
    let server = UploadServer::new(&cli.out);
    if let Err(e) = server.run(listener, shutdown.subscribe()).await {
        tracing::error!(error = %e, "Upload server failed");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run_client(cli: &Cli) -> ExitCode {
    println!(
        "[CLIENT] Uploading to {} with {} clients for {}s...",
        cli.url, cli.clients, cli.duration
    );
    let client = UploadClient::new(
        cli.url.clone(),
        cli.clients,
        Duration::from_secs(cli.duration),
        cli.chunk_size,
        &cli.out,
    );

    match client.run().await {
        Ok(summary) => {
            for record in &summary.records {
                println!("[CLIENT-{}] {record}", record.client_id);
            }
            println!(
                "[CLIENT] Upload complete: {} bytes, {:.4} Mbps aggregate. Results saved to {}",
                summary.total_bytes(),
                summary.aggregate_throughput_mbps(),
                cli.out.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to save client results");
            ExitCode::FAILURE
        }
    }
}

/// Checks that need no network: argument defaults and both CSV writers.
async fn run_self_test() -> Result<(), String> {
    println!("Running internal tests...");

    let args = Cli::try_parse_from(["upload-sim"]).map_err(|e| e.to_string())?;
    ensure(args.mode.is_none(), "expected no mode when --mode is omitted")?;
    ensure(args.chunk_size == 256 * 1024, "unexpected default chunk size")?;

    let dir = tempfile::tempdir().map_err(|e| e.to_string())?;

    let server_out = dir.path().join("test_server.csv");
    let server = UploadServer::new(&server_out);
    server
        .record(UploadRecord::new(10, Duration::from_millis(100)))
        .await
        .map_err(|e| e.to_string())?;
    check_csv(&server_out, "timestamp,bytes_received,duration_s,throughput_Mbps", 1)?;

    let client_out = dir.path().join("test_client.csv");
    let client = UploadClient::new(
        "http://127.0.0.1:9000/upload",
        1,
        Duration::from_secs(1),
        8,
        &client_out,
    );
    client
        .save_results(vec![ClientRecord::finish(0, 16, Duration::from_secs(1))])
        .await
        .map_err(|e| e.to_string())?;
    check_csv(&client_out, "client_id,bytes_sent,throughput_Mbps", 1)?;

    Ok(())
}

fn check_csv(path: &Path, header: &str, rows: usize) -> Result<(), String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("{} should exist after saving: {e}", path.display()))?;
    let mut lines = text.lines();
    ensure(lines.next() == Some(header), "unexpected CSV header")?;
    ensure(lines.count() == rows, "unexpected CSV row count")
}

fn ensure(condition: bool, message: &str) -> Result<(), String> {
    if condition {
        Ok(())
    } else {
        Err(message.to_string())
    }
}
