//! CLI entry point for blocks-rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "blocks-rs")]
#[command(version)]
#[command(about = "Block decoration and post listing for static sites", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decorate the pages of the public directory
    #[command(alias = "d")]
    Decorate {
        /// Write decorated pages here instead of in place
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Start a preview server that decorates pages per request
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,
    },

    /// List the posts the posts block would render
    List,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "blocks_rs=debug,info"
    } else {
        "blocks_rs=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Decorate { out } => {
            let site = blocks_rs::Site::new(&base_dir)?;
            tracing::info!("Decorating pages in {:?}", site.public_dir);
            let summary = blocks_rs::commands::decorate::run(&site, out.as_deref()).await?;
            println!(
                "Decorated {} pages ({} blocks enhanced, {} failed, {} skipped)",
                summary.pages, summary.enhanced, summary.failed, summary.skipped
            );
        }

        Commands::Server { port, ip, open } => {
            let site = blocks_rs::Site::new(&base_dir)?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            blocks_rs::server::start(&site, &ip, port, open).await?;
        }

        Commands::List => {
            let site = blocks_rs::Site::new(&base_dir)?;
            blocks_rs::commands::list::run(&site).await?;
        }

        Commands::Version => {
            println!("blocks-rs version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
