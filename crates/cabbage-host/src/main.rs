use std::path::PathBuf;

use cabbage_host::{HostConfig, Session, TransportBridge};
use cabbage_sync::JsonFormat;
use clap::{Parser, ValueEnum};
use tracing::info;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Compact,
    Expanded,
}

#[derive(Debug, Parser)]
#[command(
    name = "cabbage-host",
    version,
    about = "Relay Cabbage panel messages over stdio"
)]
struct Args {
    /// Workspace root used to find cabbage.toml.
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,
    /// Override the configured region layout.
    #[arg(long, value_enum)]
    format: Option<FormatArg>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let root = match args.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    let mut config = HostConfig::load(&root);
    if let Some(format) = args.format {
        config.editor.json_format = match format {
            FormatArg::Compact => JsonFormat::Compact,
            FormatArg::Expanded => JsonFormat::Expanded,
        };
    }
    match &config.config_path {
        Some(path) => info!("Starting cabbage-host with {}", path.display()),
        None => info!("Starting cabbage-host with default settings"),
    }

    let bridge = TransportBridge::new(Session::new(&config));
    bridge.run_stdio()?;
    Ok(())
}
