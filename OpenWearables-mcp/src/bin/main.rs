use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use open_wearables_domain::database::{initialize_database_pool, DatabaseConfig};
use open_wearables_mcp::config::{load_env_file, resolve_base_dir, Args, TransportKind};
use open_wearables_mcp::transport::{self, StdioTransport};
use open_wearables_mcp::{McpServer, ServerContext};

/// Entry point for the Open Wearables MCP server
///
/// 1. Loads the .env file without overriding the inherited environment
/// 2. Sets up tracing on stderr (stdout belongs to the protocol under stdio)
/// 3. Opens the database pool, anchoring relative paths to the env file
/// 4. Serves the selected transport until EOF or a shutdown signal
fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let env_file = load_env_file(args.env_file.as_deref())?;
    // Parse again so values from the env file reach clap's env fallbacks
    let args = Args::parse();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_span_events(FmtSpan::CLOSE)
                .with_target(false)
                .with_ansi(args.transport == TransportKind::Sse)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .with(env_filter)
        .init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let result = runtime.block_on(run(args, env_file));

    // A stdin read parked on a blocking thread only returns on the next line
    // or EOF, so the runtime must not wait for it
    runtime.shutdown_background();

    if let Err(e) = result {
        error!("Server failed: {:#}", e);
        return Err(e);
    }
    Ok(())
}

async fn run(args: Args, env_file: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    info!("Starting Open Wearables MCP server ({:?} transport)", args.transport);
    match &env_file {
        Some(path) => info!("Loaded environment from {}", path.display()),
        None => info!("No .env file found, using inherited environment"),
    }

    let base_dir = resolve_base_dir(env_file.as_deref(), args.data_dir.as_deref())?;
    let db_config = DatabaseConfig::from_env()?.resolve_relative_to(&base_dir);
    let pool = initialize_database_pool(&db_config).context("Failed to open database")?;
    info!("Database pool initialized successfully");

    let ctx = Arc::new(ServerContext::from_pool(pool));

    match args.transport {
        TransportKind::Stdio => {
            let server = McpServer::new(ctx);
            let mut stdio = StdioTransport::stdio();
            transport::serve(&server, &mut stdio, transport::shutdown_signal()).await?;
        }
        TransportKind::Sse => {
            transport::run_sse(ctx, &args.host, args.port).await?;
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
