//! pagegraph: Command-line tool for deriving page views from a document store.
//!
//! Prints the table of contents, collection views or search results of a
//! page as JSON. Pages are fetched over HTTP, or read from a record map
//! JSON file with `--record-map`.

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use pagegraph_client::{
    ClientConfig, HttpDocumentStore, MemoryDocumentStore, PageError, PageResolver, SearchService,
};
use pagegraph_core::{logging, DocumentStore, PageView, RecordMap, RenderConfig};

#[derive(Parser)]
#[command(name = "pagegraph")]
#[command(author, version, about = "Derive tables of contents and collection views from pages")]
#[command(propagate_version = true)]
struct Cli {
    /// Read the page from a record map JSON file instead of the document store
    #[arg(long, global = true)]
    record_map: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the full derived view of a page
    View {
        /// Page id, slug or friendly path (default: root page)
        page: Option<String>,
    },

    /// Print the table of contents of a page
    Toc {
        /// Page id, slug or friendly path (default: root page)
        page: Option<String>,

        /// Minimum heading count before a table of contents is shown
        #[arg(long, env = "PAGEGRAPH_MIN_TOC_ITEMS")]
        min_items: Option<usize>,
    },

    /// Print the collection views (groups and board columns) of a page
    Collections {
        /// Page id, slug or friendly path (default: root page)
        page: Option<String>,
    },

    /// Search the pages below the root page
    Search {
        /// Search query
        query: String,
    },
}

/// A command failure: either a request outcome with a status code, or a
/// setup problem.
enum Failure {
    Page(PageError),
    Setup(anyhow::Error),
}

impl From<PageError> for Failure {
    fn from(e: PageError) -> Self {
        Failure::Page(e)
    }
}

impl From<anyhow::Error> for Failure {
    fn from(e: anyhow::Error) -> Self {
        Failure::Setup(e)
    }
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(Failure::Page(e)) => {
            error!(
                subsystem = "cli",
                status_code = e.status_code(),
                error = e.message(),
                "Command failed"
            );
            eprintln!(
                "{}",
                json!({ (logging::STATUS_CODE): e.status_code(), (logging::ERROR_MSG): e.message() })
            );
            ExitCode::FAILURE
        }
        Err(Failure::Setup(e)) => {
            error!(subsystem = "cli", error = %e, "Command failed");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout stays valid JSON.
///
/// Environment variables:
///   LOG_FORMAT  - "json" or "text" (default: "text")
///   RUST_LOG    - standard env filter (default: "pagegraph=info,pagegraph_client=info,pagegraph_core=warn")
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pagegraph=info,pagegraph_client=info,pagegraph_core=warn".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    if log_format == "json" {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(cli: Cli) -> Result<(), Failure> {
    let mut render_config = RenderConfig::from_env();

    match cli.command {
        Commands::View { page } => {
            render_config.validate().context("Invalid render configuration")?;
            let view = page_view(cli.record_map.as_deref(), page.as_deref(), render_config).await?;
            print_json(&view)?;
        }
        Commands::Toc { page, min_items } => {
            if let Some(min_items) = min_items {
                render_config = render_config.with_min_toc_items(min_items);
            }
            render_config.validate().context("Invalid render configuration")?;
            let view = page_view(cli.record_map.as_deref(), page.as_deref(), render_config).await?;
            print_json(&view.toc)?;
        }
        Commands::Collections { page } => {
            render_config.validate().context("Invalid render configuration")?;
            let view = page_view(cli.record_map.as_deref(), page.as_deref(), render_config).await?;
            print_json(&view.collections)?;
        }
        Commands::Search { query } => {
            render_config.validate().context("Invalid render configuration")?;
            let store = http_store()?;
            let search = SearchService::new(store, render_config.root_page_id.as_deref());
            let results = search.search(&query).await?;
            info!(
                subsystem = "cli",
                query = %query,
                result_count = results.results.len(),
                "Search complete"
            );
            print_json(&results)?;
        }
    }

    Ok(())
}

fn http_store() -> anyhow::Result<Arc<HttpDocumentStore>> {
    let store = HttpDocumentStore::new(ClientConfig::from_env())
        .context("Failed to create document store client")?;
    Ok(Arc::new(store))
}

async fn page_view(
    record_map_file: Option<&Path>,
    raw_page_id: Option<&str>,
    config: RenderConfig,
) -> Result<PageView, Failure> {
    let store: Arc<dyn DocumentStore> = match record_map_file {
        Some(path) => {
            let record_map = read_record_map(path)?;
            Arc::new(MemoryDocumentStore::new().with_record_map(record_map))
        }
        None => http_store()?,
    };
    let resolver = PageResolver::new(store, config);
    Ok(resolver.page_view(raw_page_id).await?)
}

fn read_record_map(path: &Path) -> anyhow::Result<RecordMap> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read record map {}", path.display()))?;
    let record_map: RecordMap = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse record map {}", path.display()))?;
    info!(
        subsystem = "cli",
        path = %path.display(),
        block_count = record_map.block.len(),
        "Record map loaded"
    );
    Ok(record_map)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", out);
    Ok(())
}
