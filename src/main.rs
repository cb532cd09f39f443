#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

mod analyzer;
mod assembler;
mod config;
mod corpus;
mod error;
mod extractor;
mod loader;
mod models;
mod ranker;
mod run_template;
mod scanner;
mod schema;
mod server;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use analyzer::Analyzer;
use config::{ferret_home, load_config, FerretConfig};
use loader::{RepoLoader, RepoSource};
use ranker::FastembedProvider;

#[derive(Parser)]
#[command(name = "ferret")]
#[command(about = "Repository analyzer: transport detection and tool extraction", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level filter (e.g. debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit structured JSON logs
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a repository and write the JSON report
    Analyze {
        /// Local repository path
        path: Option<PathBuf>,
        /// Git repository URL to clone
        #[arg(long)]
        git: Option<String>,
        /// Path to a .tar.gz archive to unpack
        #[arg(long)]
        archive: Option<PathBuf>,
        /// Checkout/report name
        #[arg(long)]
        name: Option<String>,
        /// Report output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
        /// Overall timeout in seconds; on expiry a truncated report is produced
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Detect the implied transport for a local repository
    DetectTransport { path: PathBuf },

    /// Extract tool candidates with schemas, without semantic ranking
    ExtractTools { path: PathBuf },

    /// Run the HTTP hosting layer
    Serve {
        #[arg(long, default_value = "127.0.0.1:8712")]
        addr: String,
        /// Report output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },

    /// Manage configuration (~/.ferret/config.toml)
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Create a default config.toml in ~/.ferret/
    Init,
    /// Show path to the config file
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let config = load_config(&ferret_home());

    match cli.command {
        Commands::Analyze {
            path,
            git,
            archive,
            name,
            out,
            timeout,
        } => handle_analyze(config, path, git, archive, name, out, timeout).await,
        Commands::DetectTransport { path } => handle_detect_transport(config, path),
        Commands::ExtractTools { path } => handle_extract_tools(config, path),
        Commands::Serve { addr, out } => handle_serve(config, addr, out).await,
        Commands::Config { action } => handle_config(action),
    }
}

fn init_tracing(cli: &Cli) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    if cli.log_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn resolve_source(
    path: Option<PathBuf>,
    git: Option<String>,
    archive: Option<PathBuf>,
) -> anyhow::Result<RepoSource> {
    match (path, git, archive) {
        (_, Some(url), _) => Ok(RepoSource::Git(url)),
        (_, None, Some(archive)) => Ok(RepoSource::Archive(archive)),
        (Some(path), None, None) => Ok(RepoSource::Local(path)),
        (None, None, None) => anyhow::bail!("provide a path, --git, or --archive"),
    }
}

async fn handle_analyze(
    config: FerretConfig,
    path: Option<PathBuf>,
    git: Option<String>,
    archive: Option<PathBuf>,
    name: Option<String>,
    out: PathBuf,
    timeout: Option<u64>,
) -> anyhow::Result<()> {
    let source = resolve_source(path, git, archive)?;
    let repo_ref = source.reference();

    let loader = RepoLoader::new(ferret_home().join("repos"));
    let repo_path = loader.acquire(&source, name.as_deref())?;

    let files = corpus::index_repo(&repo_path, &config.corpus);
    tracing::info!("Indexed {} files from {}", files.len(), repo_path.display());

    let provider = Arc::new(FastembedProvider::new(config.embedding.clone()));
    let analyzer = Analyzer::new(&config, provider);
    let report = analyzer
        .analyze(&repo_ref, files, timeout.map(Duration::from_secs))
        .await;

    let saved = assembler::save_report(&report, &out)?;
    println!(
        "Transport: {} (confidence {:.2})",
        report.transport.category, report.transport.confidence
    );
    println!(
        "Tools: {} | confidence_score {:.2} | notes: {}",
        report.tools.len(),
        report.confidence_score,
        report.notes.len()
    );
    println!("Report: {}", saved.display());
    Ok(())
}

fn handle_detect_transport(config: FerretConfig, path: PathBuf) -> anyhow::Result<()> {
    anyhow::ensure!(path.exists(), "path not found: {}", path.display());
    let files = corpus::index_repo(&path, &config.corpus);
    let scanner = scanner::PatternEvidenceScanner::new(&config.scanner);
    let verdict = scanner.scan(&files);
    println!("{}", serde_json::to_string_pretty(&verdict)?);
    Ok(())
}

fn handle_extract_tools(config: FerretConfig, path: PathBuf) -> anyhow::Result<()> {
    anyhow::ensure!(path.exists(), "path not found: {}", path.display());
    let files = corpus::index_repo(&path, &config.corpus);
    let extractor = extractor::SignatureExtractor::new(config.extractor.clone());
    let extraction = extractor.extract(&files);

    let tools: Vec<serde_json::Value> = extraction
        .candidates
        .iter()
        .map(|c| {
            let schema = schema::infer_schema(c);
            serde_json::json!({
                "name": c.name,
                "file": c.file,
                "lineRange": [c.line_start, c.line_end],
                "parameters": schema.parameters,
                "description": schema.description,
            })
        })
        .collect();

    let out = serde_json::json!({
        "tools": tools,
        "count": tools.len(),
        "eligible_files": extraction.eligible_files,
        "parsed_files": extraction.parsed_files,
        "notes": extraction.notes,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

async fn handle_serve(config: FerretConfig, addr: String, out: PathBuf) -> anyhow::Result<()> {
    let provider = Arc::new(FastembedProvider::new(config.embedding.clone()));
    let state = Arc::new(server::ServerState {
        analyzer: Analyzer::new(&config, provider),
        config,
        report_dir: out,
    });

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.cancel();
        }
    });

    server::serve(&addr, state, cancel).await
}

fn handle_config(action: Option<ConfigAction>) -> anyhow::Result<()> {
    let home = ferret_home();
    match action {
        Some(ConfigAction::Init) => {
            let path = config::write_default_config(&home)?;
            println!("Created {}", path.display());
        }
        Some(ConfigAction::Path) | None => {
            println!("{}", home.join("config.toml").display());
        }
    }
    Ok(())
}
