//! CLI entry point for docpress

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "docpress")]
#[command(version)]
#[command(about = "A fast dev server and content pipeline for markdown documentation sites", long_about = None)]
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
    /// Initialize a new documentation site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new page
    New {
        /// Title of the new page
        title: String,

        /// Category directory for the page
        #[arg(short, long, default_value = "guide")]
        category: String,

        /// Section path inside the category
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Start the dev server and dashboard
    #[command(alias = "s")]
    Server {
        /// Port to listen on (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Serve pages from an in-memory snapshot built at startup
        #[arg(long)]
        snapshot: bool,

        /// Enable static mode (no file watching)
        #[arg(long)]
        r#static: bool,
    },

    /// Print content-tree statistics
    Stats,

    /// List site content
    List {
        /// Type of content to list (post, category)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "docpress=debug,info"
    } else {
        "docpress=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(cwd) => cwd,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing documentation site in {:?}", target_dir);
            docpress::commands::init::init_site(&target_dir)?;
            println!("Initialized empty documentation site in {:?}", target_dir);
        }

        Commands::New {
            title,
            category,
            path,
        } => {
            let app = docpress::Docpress::new(&base_dir)?;
            tracing::info!("Creating new page in {}: {}", category, title);
            app.new_page(&title, &category, path.as_deref())?;
        }

        Commands::Server {
            port,
            ip,
            open,
            snapshot,
            r#static,
        } => {
            let app = docpress::Docpress::new(&base_dir)?;
            let port = port.unwrap_or(app.config.port);

            tracing::info!("Starting server at http://{}:{}", ip, port);
            docpress::server::start(&app, &ip, port, !r#static, open, snapshot).await?;
        }

        Commands::Stats => {
            let app = docpress::Docpress::new(&base_dir)?;
            let stats = app.stats();
            println!("Categories: {}", stats.categories);
            println!("Sections:   {}", stats.sections);
            println!("Posts:      {}", stats.posts);
        }

        Commands::List { r#type } => {
            let app = docpress::Docpress::new(&base_dir)?;
            docpress::commands::list::run(&app, &r#type)?;
        }

        Commands::Version => {
            println!("docpress version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
