//! linkki-lsp - language server for linkki bindings over stdio

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use linkki_lsp::transport::StdioTransport;
use linkki_lsp::{ConfigLoader, LspServer, ServerConfig};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "linkki-lsp")]
#[command(version, about = "Language server for linkki UI bindings and their message bundles")]
struct Cli {
    /// YAML or JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable debug mode for verbose logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let config = match &cli.config {
        Some(path) => ConfigLoader::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => ServerConfig::default(),
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;

    let exit_code = runtime.block_on(async {
        info!("Starting linkki-lsp {}", env!("CARGO_PKG_VERSION"));
        let mut server = LspServer::with_javac(config);
        let mut transport = StdioTransport::stdio();

        match server.run(&mut transport).await {
            Ok(()) => {
                info!("LSP server shut down");
                Ok(server.exit_code())
            }
            Err(e) => {
                error!("LSP server error: {}", e);
                Err(anyhow::anyhow!("LSP server error: {}", e))
            }
        }
    })?;

    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}

/// Log to stderr; stdout carries the protocol
fn init_logging(cli: &Cli) {
    let level = match cli
        .log_level
        .as_deref()
        .unwrap_or(if cli.debug { "debug" } else { "info" })
        .to_lowercase()
        .as_str()
    {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(cli.debug)
        .with_thread_ids(cli.debug)
        .with_file(cli.debug)
        .with_line_number(cli.debug)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
