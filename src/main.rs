//! Updraft CLI - publish static sites to a CDN-backed subdomain
//!
//! Usage: updraft publish [flags]
//!
//! On first run a subdomain is generated (or taken from `--subdomain`), the
//! infrastructure stack is created, and the choice is saved to
//! `.updraft.toml`. Later runs update the same site.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::time::Instant;

use updraft::config::{ProjectConfig, CONFIG_FILE_NAME};
use updraft::error::PublishError;
use updraft::stack::{self, StackParams};
use updraft::store::S3Store;
use updraft::zones::{self, HostedZone};
use updraft::{invalidation, subdomain, sync, AwsClients};

/// Updraft - static site publisher
#[derive(Parser, Debug)]
#[command(name = "updraft")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output format for CI
    #[arg(long, default_value = "false")]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Provision the site stack and upload changed files
    Publish {
        /// Subdomain name (generated if not provided)
        #[arg(long)]
        subdomain: Option<String>,

        /// Directory containing files to upload
        #[arg(long, default_value = "./build")]
        build_dir: PathBuf,

        /// AWS profile name
        #[arg(long)]
        profile: Option<String>,

        /// AWS region (default from AWS config)
        #[arg(long)]
        region: Option<String>,
    },
}

/// Overall deadline for one publish run, stack wait included.
const PUBLISH_TIMEOUT: Duration = Duration::from_secs(30 * 60);

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Publish {
            subdomain,
            build_dir,
            profile,
            region,
        } => {
            cmd_publish(
                subdomain,
                &build_dir,
                profile.as_deref(),
                region.as_deref(),
                cli.json,
            )
            .await
        }
    }
}

async fn cmd_publish(
    subdomain: Option<String>,
    build_dir: &Path,
    profile: Option<&str>,
    region: Option<&str>,
    json: bool,
) -> Result<()> {
    tokio::select! {
        result = run_publish(subdomain, build_dir, profile, region, json) => result,
        _ = tokio::signal::ctrl_c() => Err(PublishError::Cancelled.into()),
    }
}

async fn run_publish(
    subdomain_flag: Option<String>,
    build_dir: &Path,
    profile: Option<&str>,
    region: Option<&str>,
    json: bool,
) -> Result<()> {
    let deadline = Instant::now() + PUBLISH_TIMEOUT;

    check_build_dir(build_dir)?;

    let project_dir = Path::new(".");
    let mut config = ProjectConfig::load(project_dir)?;

    eprintln!("Initializing AWS...");
    let clients = AwsClients::new(profile, region).await;

    // Hosted zone: saved in config, or discovered and selected once.
    let zone = if !config.publish.hosted_zone_id.is_empty() && !config.publish.domain_name.is_empty()
    {
        let zone = HostedZone {
            id: config.publish.hosted_zone_id.clone(),
            name: config.publish.domain_name.clone(),
        };
        eprintln!("Using saved zone: {}", zone.name);
        zone
    } else {
        eprintln!("Checking Route53 hosted zones...");
        let zones = zones::list_hosted_zones(&clients.route53).await?;
        let zone = zones::select_hosted_zone(zones)?;
        eprintln!("Using zone: {}", zone.name);
        zone
    };

    let subdomain = match subdomain_flag {
        Some(subdomain) => subdomain,
        None if !config.publish.subdomain.is_empty() => config.publish.subdomain.clone(),
        None => {
            let generated = subdomain::generate();
            eprintln!("Generated subdomain: {generated}");
            generated
        }
    };

    if config.publish.subdomain != subdomain
        || config.publish.hosted_zone_id != zone.id
        || config.publish.domain_name != zone.name
    {
        config.publish.subdomain = subdomain.clone();
        config.publish.hosted_zone_id = zone.id.clone();
        config.publish.domain_name = zone.name.clone();
        config.save(project_dir)?;
        eprintln!("Saved configuration to {CONFIG_FILE_NAME}");
    }

    let params = StackParams {
        stack_name: stack::stack_name_for(&subdomain),
        subdomain,
        domain_name: zone.name,
        hosted_zone_id: zone.id,
    };

    let started = stack::ensure_stack(&clients.cloudformation, &params).await?;
    if started {
        stack::wait_for_terminal(&clients.cloudformation, &params.stack_name, deadline).await?;
    }

    let outputs = stack::get_outputs(&clients.cloudformation, &params.stack_name).await?;
    if !outputs.is_usable() {
        return Err(PublishError::MissingOutputs {
            stack: params.stack_name.clone(),
        }
        .into());
    }

    let store = S3Store::new(clients.s3.clone(), outputs.bucket_name.clone());
    let summary = sync::sync_directory(&store, build_dir).await?;

    if summary.uploaded > 0 {
        invalidation::invalidate_distribution(&clients.cloudfront, &outputs.distribution_id, deadline)
            .await?;
    }

    if json {
        let event = serde_json::json!({
            "event": "publish",
            "site_url": outputs.site_url,
            "uploaded": summary.uploaded,
            "skipped": summary.skipped,
        });
        println!("{}", serde_json::to_string(&event)?);
    } else {
        eprintln!();
        eprintln!("Site published: {}", outputs.site_url);
    }

    Ok(())
}

fn check_build_dir(build_dir: &Path) -> Result<()> {
    match std::fs::metadata(build_dir) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(PublishError::NotADirectory {
            path: build_dir.to_path_buf(),
        }
        .into()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            Err(PublishError::BuildDirNotFound {
                path: build_dir.to_path_buf(),
            }
            .into())
        }
        Err(err) => Err(err.into()),
    }
}
