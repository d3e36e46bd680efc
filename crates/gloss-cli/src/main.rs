//! gloss - streaming page summaries in your terminal

mod config;
mod injection;
mod page;
mod plain;
mod ui;

use std::sync::Arc;

use clap::Parser;
use tokio::sync::mpsc;

use gloss_broker::{Coordinator, Injector, TabId, relay_channel};
use gloss_stream::BackendClient;

use crate::injection::{CliInjector, InjectionParts, PanelNotice};
use crate::page::{PageSource, extract_page_content};

/// gloss - streaming page summaries
#[derive(Parser, Debug)]
#[command(name = "gloss")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Page to summarize: a URL or a local text/markdown file
    page: Option<String>,

    /// Backend base URL (default: http://localhost:8000)
    #[arg(short, long)]
    backend: Option<String>,

    /// Ask a question instead of requesting a summary
    #[arg(short, long)]
    question: Option<String>,

    /// Disable TUI mode (stream the response to stdout)
    #[arg(long)]
    no_tui: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup tracing
    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("gloss=debug")
            .with_writer(std::io::stderr)
            .init();
    }

    // Initialize config and exit
    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let Some(page_arg) = args.page else {
        eprintln!("Usage: gloss <url-or-file> [--question ...]");
        std::process::exit(2);
    };

    // Load config file, CLI args take precedence
    let cfg = config::Config::load();
    let backend = args
        .backend
        .or(cfg.backend.clone())
        .unwrap_or_else(|| config::Config::DEFAULT_BACKEND.to_string());
    let use_tui = !args.no_tui && cfg.tui.unwrap_or(true);

    // Pull the page content up front; nothing to coordinate without it.
    let source = PageSource::parse(&page_arg);
    let page = extract_page_content(&source).await?;
    tracing::debug!(url = %page.url, title = %page.title, "extracted page content");

    let client = BackendClient::new(&backend);
    let tab = TabId(1);

    // The coordinator injects the content context lazily, on the first
    // toggle; the injector just holds the pieces until then.
    let injector = Arc::new(CliInjector::new());
    let (coordinator, handle) = Coordinator::new(client, injector.clone() as Arc<dyn Injector>);

    let (panel_tx, panel_rx) = relay_channel();
    let (notice_tx, notice_rx) = mpsc::unbounded_channel::<PanelNotice>();
    injector.install(InjectionParts {
        tab,
        page,
        panel_relay: panel_tx,
        notice_rx,
        handle: handle.clone(),
    });

    tokio::spawn(coordinator.run());

    // First toggle injects the content context and opens the overlay.
    handle.toggle(tab).await;

    if use_tui {
        ui::run_tui(handle, tab, notice_tx, panel_rx, args.question).await
    } else {
        plain::run_plain(notice_tx, panel_rx, args.question).await
    }
}
