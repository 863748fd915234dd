use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use zipsearch_core::config::{self, EngineConfig, SourceEncoding, StorageFormat};
use zipsearch_core::SearchEngine;
use zipsearch_server::api::create_router;
use zipsearch_server::api::handlers::AppState;
use zipsearch_server::api::models::{NO_HITS_MESSAGE, REBUILT_MESSAGE};

#[derive(Parser)]
#[command(name = "zipsearch", about = "Japanese postal address search over a bigram index")]
struct Args {
    /// Directory holding the record and index stores
    #[arg(short, long, env = "ZIPSEARCH_WORK_DIR", default_value = config::DEFAULT_WORK_DIR, global = true)]
    work_dir: PathBuf,

    /// Decompressed upstream CSV (defaults to KEN_ALL.CSV inside the work dir)
    #[arg(long, env = "ZIPSEARCH_SOURCE", global = true)]
    source: Option<PathBuf>,

    /// Encoding of the upstream CSV (shift_jis or utf8)
    #[arg(long, env = "ZIPSEARCH_SOURCE_ENCODING", default_value_t = SourceEncoding::default(), global = true)]
    source_encoding: SourceEncoding,

    /// Store format (csv or snapshot)
    #[arg(long, env = "ZIPSEARCH_STORAGE_FORMAT", default_value_t = StorageFormat::default(), global = true)]
    storage_format: StorageFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "ZIPSEARCH_PORT", default_value_t = config::DEFAULT_PORT)]
        port: u16,
    },
    /// Rebuild both stores from the upstream CSV
    Rebuild,
    /// Search the stores and print matching addresses
    Search {
        /// Keyword; whitespace is ignored
        keyword: String,
    },
}

impl Args {
    fn engine_config(&self) -> EngineConfig {
        let config = EngineConfig::new(&self.work_dir)
            .with_source_encoding(self.source_encoding)
            .with_storage_format(self.storage_format);
        match &self.source {
            Some(source) => config.with_source_file(source),
            None => config,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .json()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(
                    "zipsearch_server=info"
                        .parse()
                        .expect("valid directive literal"),
                )
                .add_directive(
                    "zipsearch_core=info"
                        .parse()
                        .expect("valid directive literal"),
                ),
        )
        .init();

    let args = Args::parse();

    if args.work_dir.exists() && !args.work_dir.is_dir() {
        eprintln!(
            "Error: work_dir '{}' exists but is not a directory",
            args.work_dir.display()
        );
        std::process::exit(1);
    }

    let engine = SearchEngine::open(args.engine_config());

    match args.command {
        Command::Serve { port } => {
            if port == 0 {
                eprintln!("Error: port must be > 0");
                std::process::exit(1);
            }
            serve(engine, port).await?;
        }
        Command::Rebuild => {
            let start = Instant::now();
            let (_, summary) = tokio::task::spawn_blocking(move || engine.rebuild()).await??;
            tracing::info!(
                rows = summary.rows,
                records = summary.records,
                bigrams = summary.bigrams,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "rebuild finished"
            );
            println!("{REBUILT_MESSAGE}");
        }
        Command::Search { keyword } => {
            let results = tokio::task::spawn_blocking(move || engine.search(&keyword)).await??;
            if results.is_empty() {
                println!("{NO_HITS_MESSAGE}");
            } else {
                for entry in &results {
                    println!("{entry}");
                }
                println!("{} hit(s)", results.len());
            }
        }
    }

    Ok(())
}

async fn serve(engine: SearchEngine, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let prometheus_handle =
        metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;

    let config = engine.config().clone();
    let state = AppState::new(engine, prometheus_handle);

    // Warm the catalogue if a previous build exists; otherwise wait for POST /index.
    let warm = state.clone();
    match tokio::task::spawn_blocking(move || warm.load_catalogue()).await? {
        Ok(catalogue) => tracing::info!(
            "Loaded catalogue: {} records, {} bigrams",
            catalogue.record_count(),
            catalogue.bigram_count()
        ),
        Err(e) => tracing::warn!("No catalogue loaded at startup: {}", e),
    }

    let app = create_router(state);
    let addr = format!("0.0.0.0:{}", port);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        port,
        work_dir = %config.work_dir.display(),
        source = %config.source_file.display(),
        storage_format = %config.storage_format,
        "zipsearch ready"
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }

    tracing::info!("Shutting down gracefully, draining in-flight requests...");
}
