use clap::Parser;
use exn::ResultExt;
use repolang::api;
use repolang::error::{ErrorKind, Result};
use repolang_catalog::{BootstrapOptions, Service};
use repolang_config::{Config, GithubConfig};
use repolang_github::{GithubFetcher, GithubOptions};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// HTTP client and server crates that are too chatty at `info`.
const QUIET_CRATES: &str = "hyper=warn,hyper_util=warn,h2=warn,reqwest=warn,rustls=warn,tower_http=warn";

/// Serve language statistics for the most-starred GitHub repositories.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Opts {
    /// Configuration file (TOML). Defaults to the platform config directory.
    #[arg(short, long, env = "REPOLANG_CONFIG")]
    config: Option<PathBuf>,
    /// Address to listen on, overriding `server.bind`.
    #[arg(short, long)]
    bind: Option<SocketAddr>,
    /// Number of enrichment workers, overriding `enrich.workers`.
    #[arg(short, long)]
    workers: Option<usize>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let opts = Opts::parse();
    let config = match load_config(&opts) {
        Ok(config) => config,
        Err(err) => {
            init_tracing("info");
            tracing::error!(error = ?err, "Could not load configuration");
            return ExitCode::FAILURE;
        },
    };
    init_tracing(&config.log.level);
    tracing::debug!(?config, "Loaded configuration");

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = ?err, "Service stopped");
            ExitCode::FAILURE
        },
    }
}

fn load_config(opts: &Opts) -> Result<Config> {
    Config::load(opts.config.as_deref())
        .and_then(|config| config.with_overrides(opts.bind, opts.workers))
        .or_raise(|| ErrorKind::Config)
}

/// `RUST_LOG` wins; otherwise the configured level applies to everything
/// except the HTTP stack.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("{level},{QUIET_CRATES}")));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn github_options(config: &GithubConfig) -> GithubOptions {
    GithubOptions {
        api_url: config.api_url.clone(),
        token: config.token.clone().unwrap_or_default(),
        query: config.query.clone(),
        sort: config.sort.clone(),
        order: config.order.clone(),
        per_page: config.per_page,
        user_agent: config.user_agent.clone(),
    }
}

async fn run(config: Config) -> Result<()> {
    let fetcher = GithubFetcher::new(github_options(&config.github)).or_raise(|| ErrorKind::Config)?;
    let options = BootstrapOptions {
        max_repositories: config.github.max_repositories,
        workers: config.enrich.workers,
        timeout: config.enrich.timeout(),
    };
    let service = Service::bootstrap(Arc::new(fetcher), &options).await.or_raise(|| ErrorKind::Bootstrap)?;
    tracing::info!(repositories = service.len().await, "Catalog ready");

    let app = api::router(Arc::new(service), config.server.compression);
    let listener = TcpListener::bind(config.server.bind).await.or_raise(|| ErrorKind::Serve)?;
    tracing::info!(address = %config.server.bind, compression = %config.server.compression, "Listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await.or_raise(|| ErrorKind::Serve)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "Could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
