use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

mod config;
use crate::config::{Config, StoreBackend};

mod payload;
mod report;

#[derive(Parser)]
#[command(about = "Copy container images from a remote repository into a trusted local one")]
struct Cli {
    #[arg(short, long)]
    config_file: Option<PathBuf>,

    /// Image reference to curate, eg `registry.example.com/demo-docker/library/nginx:1.25`.
    #[arg(short, long = "image")]
    images: Vec<String>,

    /// JSON object listing images under `images` (or `packages`).
    #[arg(long, env = "res_curatedocker_payload")]
    payload: Option<String>,

    #[arg(long, env = "int_artifactory_url")]
    url: Option<String>,
    #[arg(long, env = "int_artifactory_user")]
    user: Option<String>,
    #[arg(long, env = "int_artifactory_apikey", hide_env_values = true)]
    api_key: Option<String>,

    /// Log copy requests instead of sending them.
    #[arg(long)]
    dry_run: bool,

    /// Write images that were not fully curated to this file, one per line.
    #[arg(long)]
    failures_file: Option<PathBuf>,
    #[arg(long)]
    json_report: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(true)
        .compact()
        .init();

    // load configuration
    let config = Config::load(cli.config_file.as_deref())?.with_store_overrides(
        cli.url,
        cli.user,
        cli.api_key,
    );
    let images = payload::image_list(cli.images, cli.payload.as_deref())?;
    let dry_run = cli.dry_run || config.dry_run;

    let results = match &config.store {
        StoreBackend::Artifactory(cfg) => {
            let store = Arc::new(cfg.new_store(dry_run)?);
            tracing::info!(
                images = images.len(),
                local_repository = %config.curation.local_repository,
                dry_run,
                "starting curation"
            );
            curator_core::curate(images, store, &config.curation).await
        }
    };

    report::log_results(&results);
    if let Some(path) = &cli.failures_file {
        report::write_file(path, &results, |f, r| report::write_failures(f, r))?;
    }
    if let Some(path) = &cli.json_report {
        report::write_file(path, &results, |f, r| report::write_json_report(f, r))?;
    }

    if results.iter().all(|r| r.is_success()) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
