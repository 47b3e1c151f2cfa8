//! # Run Subcommand
//!
//! Mirrors one GitHub repository and serves it over HTTP until SIGINT or
//! SIGTERM. The first refresh must succeed; the server does not start
//! without a snapshot to serve.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use releaser_api::{AppState, ServeConfig, TracingEventSink};
use releaser_cache::{CacheConfig, ReleaseCache};
use releaser_github::{GithubClient, GithubConfig};

use crate::config::{Config, FileConfig};

/// Arguments for the run subcommand.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// YAML config file; flags override its values.
    #[arg(long, env = "RELEASER_CONFIG")]
    pub config: Option<PathBuf>,

    /// GitHub token, for private repositories and higher rate limits.
    #[arg(long, env = "RELEASER_GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// GitHub repository to mirror.
    #[arg(long, env = "RELEASER_REPOSITORY")]
    pub repository: Option<String>,

    /// Owner of the GitHub repository.
    #[arg(long, env = "RELEASER_REPOSITORY_OWNER")]
    pub repository_owner: Option<String>,

    /// Value of the `Server` response header.
    #[arg(long, env = "RELEASER_HOSTNAME")]
    pub hostname: Option<String>,

    /// Socket address to listen on [default: 0.0.0.0:8080].
    #[arg(long, env = "RELEASER_LISTEN_ADDRESS")]
    pub listen_address: Option<String>,

    /// Clients reach the mirror over HTTPS (TLS terminated in front of it).
    #[arg(long, env = "RELEASER_TLS", num_args = 0..=1, default_missing_value = "true")]
    pub tls: Option<bool>,

    /// Public domain rendered into install scripts [default: localhost].
    #[arg(long, env = "RELEASER_DOMAIN")]
    pub domain: Option<String>,

    /// Name of the installed executable [default: bin].
    #[arg(long, env = "RELEASER_BINARY")]
    pub binary: Option<String>,

    /// Seconds between refresh cycles [default: 60].
    #[arg(long, env = "RELEASER_REFRESH_INTERVAL_SECS")]
    pub refresh_interval_secs: Option<u64>,

    /// Downloads in flight per refresh cycle [default: 8].
    #[arg(long, env = "RELEASER_MAX_CONCURRENT_DOWNLOADS")]
    pub max_concurrent_downloads: Option<usize>,

    /// GitHub REST API root [default: https://api.github.com].
    #[arg(long, env = "RELEASER_GITHUB_API_URL")]
    pub github_api_url: Option<String>,

    /// Host historical downloads are redirected to [default: https://github.com].
    #[arg(long, env = "RELEASER_DOWNLOAD_BASE_URL")]
    pub download_base_url: Option<String>,
}

impl RunArgs {
    /// The values given on the command line, as a config layer.
    pub fn overrides(&self) -> FileConfig {
        FileConfig {
            github_token: self.github_token.clone(),
            repository: self.repository.clone(),
            repository_owner: self.repository_owner.clone(),
            hostname: self.hostname.clone(),
            listen_address: self.listen_address.clone(),
            tls: self.tls,
            domain: self.domain.clone(),
            binary: self.binary.clone(),
            refresh_interval_secs: self.refresh_interval_secs,
            max_concurrent_downloads: self.max_concurrent_downloads,
            github_api_url: self.github_api_url.clone(),
            download_base_url: self.download_base_url.clone(),
        }
    }

    /// Load the config file (if any), overlay flags, apply defaults and
    /// validate.
    pub fn resolve(&self) -> anyhow::Result<Config> {
        let file = match &self.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        let config = Config::resolve(file.merge(self.overrides()));
        config.validate()?;
        Ok(config)
    }
}

impl Config {
    pub fn cache_config(&self) -> CacheConfig {
        let mut cache = CacheConfig::new(&self.repository_owner, &self.repository);
        cache.refresh_interval = Duration::from_secs(self.refresh_interval_secs);
        cache.max_concurrent_downloads = self.max_concurrent_downloads;
        cache
    }

    pub fn serve_config(&self) -> ServeConfig {
        let mut serve = ServeConfig::new(&self.repository_owner, &self.repository);
        serve.hostname = self.hostname.clone();
        serve.domain = self.domain.clone();
        serve.tls = self.tls;
        serve.binary = self.binary.clone();
        serve.download_base = self.download_base_url.clone();
        serve
    }

    pub fn github_config(&self) -> anyhow::Result<GithubConfig> {
        Ok(GithubConfig::new(&self.github_api_url, self.github_token.clone())?)
    }
}

/// Execute the run subcommand.
pub async fn run(args: RunArgs) -> anyhow::Result<()> {
    let config = args.resolve()?;
    tracing::debug!(?config, "resolved configuration");

    let github = GithubClient::new(config.github_config()?)?;
    let cache = Arc::new(ReleaseCache::new(Arc::new(github), config.cache_config()));

    tracing::info!(
        owner = %config.repository_owner,
        repo = %config.repository,
        binary = %config.binary,
        "releaser starting"
    );
    let report = cache
        .start()
        .await
        .context("initial release refresh failed")?;
    tracing::info!(
        latest = %report.latest,
        releases = report.changed.len(),
        "initial release refresh complete"
    );

    let serve = config.serve_config();
    let prefix = serve.prefix();
    let state = AppState::new(cache.clone(), serve).with_events(Arc::new(TracingEventSink));

    let listener = tokio::net::TcpListener::bind(&config.listen_address)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_address))?;
    tracing::info!(
        "serving on {prefix}://{} (domain {})",
        config.listen_address,
        config.domain
    );

    let served = axum::serve(listener, releaser_api::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    cache.stop().await;
    served.context("HTTP server failed")?;
    tracing::info!("releaser stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("shutdown signal received");
}
