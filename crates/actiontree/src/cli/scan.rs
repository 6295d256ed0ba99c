use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use actiontree_core::{references_in_files, GitHubFetcher, LocalFetcher, ManifestFetcher, Scanner};

use crate::config::AppConfig;
use crate::render;

/// Exit status when at least one root could not be resolved.
pub const FAILED_ROOTS_EXIT: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Action references (owner/repo[/path]@revision)
    pub references: Vec<String>,

    /// Add every reference used by this workflow file as a root
    #[arg(short, long = "workflow", value_name = "FILE")]
    pub workflows: Vec<PathBuf>,

    /// Maximum expansion depth
    #[arg(short, long, env = "ACTIONTREE_MAX_DEPTH")]
    pub depth: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Read manifests from a local mirror laid out as owner/repo/revision/
    #[arg(short, long, env = "ACTIONTREE_MIRROR", value_name = "DIR")]
    pub mirror: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, env = "ACTIONTREE_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Per-manifest fetch timeout in seconds (0 disables it)
    #[arg(short, long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

impl ScanArgs {
    /// Apply flag values over the loaded config.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(depth) = self.depth {
            config.scan.max_depth = depth;
        }
        if let Some(seconds) = self.timeout {
            config.scan.fetch_timeout_seconds = (seconds > 0).then_some(seconds);
        }
        if let Some(mirror) = &self.mirror {
            config.mirror = Some(mirror.clone());
        }
    }

    /// Roots from the command line followed by those found in workflow files.
    pub async fn roots(&self) -> Result<Vec<String>> {
        let mut roots = self.references.clone();
        if !self.workflows.is_empty() {
            let found = references_in_files(&self.workflows)
                .await
                .context("failed to read workflow references")?;
            debug!(count = found.len(), "references from workflow files");
            roots.extend(found);
        }
        Ok(roots)
    }
}

pub async fn run(args: &ScanArgs, cancel: CancellationToken) -> Result<ExitCode> {
    let mut config = AppConfig::resolve(args.config.as_deref())?;
    args.apply(&mut config);

    let roots = args.roots().await?;
    if roots.is_empty() {
        bail!("nothing to scan: pass action references or --workflow files");
    }

    let fetcher = build_fetcher(&config)?;
    let scanner = Scanner::new(fetcher, config.scan).with_cancellation(cancel);
    let report = scanner.scan_all(&roots).await;

    let output = match args.format {
        OutputFormat::Text => render::text(&report),
        OutputFormat::Json => render::json(&report)?,
    };
    println!("{output}");

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(FAILED_ROOTS_EXIT)
    })
}

fn build_fetcher(config: &AppConfig) -> Result<Arc<dyn ManifestFetcher>> {
    if let Some(mirror) = &config.mirror {
        info!(mirror = %mirror.display(), "reading manifests from local mirror");
        return Ok(Arc::new(LocalFetcher::new(mirror)));
    }

    let fetcher = GitHubFetcher::new(&config.github)
        .context("failed to configure GitHub client")?;
    info!(base = %config.github.raw_base_url, "fetching manifests over HTTP");
    Ok(Arc::new(fetcher))
}
