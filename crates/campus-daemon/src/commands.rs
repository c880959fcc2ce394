//! Command implementations for the campus daemon.
//!
//! Handles:
//! - anchors check/list/show: load the catalog once and report on it
//! - anchors watch: publish, then hot-reload on an interval until shutdown
//! - vector encode/decode: run the codec on command-line input

use std::fs;
use std::future::Future;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use tokio::signal;
use tracing::{debug, error, info, warn};

use campus_anchors::{
    AnchorCatalog, AnchorDetail, AnchorSummary, CatalogSnapshot, DetailOptions,
    InstructionsResolver, LoaderOptions,
};
use campus_types::Settings;
use campus_vector::VectorCodec;

use crate::cli::{AnchorCommands, VectorCommands};

/// Load configuration and apply CLI overrides.
pub fn load_settings(config_path: Option<&str>, log_level: Option<&str>) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    if let Some(level) = log_level {
        settings.log_level = Some(level.to_string());
    }
    Ok(settings)
}

/// Install the global tracing subscriber. Logs go to stderr so stdout stays JSON.
pub fn init_logging(settings: &Settings) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(settings.effective_log_level()));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Build the catalog for `settings`, optionally pointed at another directory.
pub fn build_catalog(settings: &Settings, dir_override: Option<&str>) -> AnchorCatalog {
    let dir = dir_override
        .map(PathBuf::from)
        .unwrap_or_else(|| settings.anchors_path());
    AnchorCatalog::new(dir, LoaderOptions::from_settings(settings))
}

/// Handle `anchors ...`.
pub async fn handle_anchors(
    settings: &Settings,
    dir_override: Option<&str>,
    command: AnchorCommands,
) -> Result<()> {
    let catalog = Arc::new(build_catalog(settings, dir_override));
    let resolver = InstructionsResolver::from_settings(settings);

    let snapshot = catalog
        .reload()
        .with_context(|| format!("Failed to load anchors from {:?}", catalog.dir()))?;

    match command {
        AnchorCommands::Check => {
            print_json(&check_report(&snapshot))?;
        }
        AnchorCommands::List { ghosts } => {
            print_json(&list_summaries(&snapshot, &resolver, ghosts))?;
        }
        AnchorCommands::Show {
            slug,
            ghost,
            include_reduced,
            include_html,
        } => {
            let options = DetailOptions {
                include_reduced,
                include_html,
            };
            print_json(&show_detail(&snapshot, &resolver, &slug, ghost, options)?)?;
        }
        AnchorCommands::Watch { interval_secs } => {
            let secs = interval_secs.unwrap_or(settings.reload_interval_secs).max(1);
            let interval = Duration::from_secs(secs);
            info!(dir = ?catalog.dir(), ?interval, "Watching anchor directory");
            watch_anchors(catalog, interval, shutdown_signal()).await?;
        }
    }
    Ok(())
}

/// Handle `vector ...`.
pub fn handle_vector(settings: &Settings, command: VectorCommands) -> Result<()> {
    let codec = VectorCodec::from_settings(settings);
    match command {
        VectorCommands::Encode { values, file } => {
            let values: Vec<f32> = match (values, file) {
                (Some(csv), None) => parse_csv(&csv)?,
                (None, Some(path)) => {
                    let text = fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read {}", path))?;
                    serde_json::from_str(&text)
                        .with_context(|| format!("{} must be a JSON array of numbers", path))?
                }
                _ => bail!("Provide either --values or --file"),
            };
            print_json(&encode_values(&codec, &values)?)?;
        }
        VectorCommands::Decode { data } => {
            let components: Vec<i8> = parse_csv(&data)?;
            print_json(&decode_components(&codec, &components)?)?;
        }
    }
    Ok(())
}

/// Summary of a successful load.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub generation: u64,
    pub source_dir: Option<String>,
    pub anchors: usize,
    pub ghosts: usize,
}

pub fn check_report(snapshot: &CatalogSnapshot) -> CheckReport {
    CheckReport {
        generation: snapshot.generation,
        source_dir: snapshot
            .source_dir
            .as_ref()
            .map(|d| d.display().to_string()),
        anchors: snapshot.anchor_count(),
        ghosts: snapshot.ghost_count(),
    }
}

pub fn list_summaries(
    snapshot: &CatalogSnapshot,
    resolver: &InstructionsResolver,
    ghosts: bool,
) -> Vec<AnchorSummary> {
    let anchors = if ghosts {
        snapshot.list_ghosts()
    } else {
        snapshot.list_anchors()
    };
    anchors
        .iter()
        .map(|a| AnchorSummary::from_anchor(a, resolver))
        .collect()
}

pub fn show_detail(
    snapshot: &CatalogSnapshot,
    resolver: &InstructionsResolver,
    slug: &str,
    ghost: bool,
    options: DetailOptions,
) -> Result<AnchorDetail> {
    let anchor = if ghost {
        snapshot.get_ghost(slug)
    } else {
        snapshot.get_anchor(slug)
    };
    let anchor = anchor.ok_or_else(|| {
        if ghost {
            anyhow!("ghost anchor not found: {}", slug)
        } else {
            anyhow!("anchor not found: {}", slug)
        }
    })?;
    Ok(AnchorDetail::from_anchor(&anchor, resolver, options))
}

/// Encoded vector as printed by `vector encode`.
#[derive(Debug, Serialize)]
pub struct EncodedVector {
    pub dim: usize,
    pub data: Vec<i8>,
}

pub fn encode_values(codec: &VectorCodec, values: &[f32]) -> Result<EncodedVector> {
    let data = codec.encode(values)?;
    Ok(EncodedVector {
        dim: data.len(),
        data: data.into_iter().map(|b| b as i8).collect(),
    })
}

pub fn decode_components(codec: &VectorCodec, components: &[i8]) -> Result<Vec<f32>> {
    let data: Vec<u8> = components.iter().map(|&c| c as u8).collect();
    Ok(codec.decode(&data)?)
}

/// Parse a comma-separated list, ignoring surrounding whitespace.
pub fn parse_csv<T>(input: &str) -> Result<Vec<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<T>().map_err(|e| anyhow!("invalid value {:?}: {}", s, e)))
        .collect()
}

/// Reload `catalog` every `interval` until `shutdown` resolves.
///
/// A failed reload is logged and the previous snapshot keeps serving.
pub async fn watch_anchors<F>(
    catalog: Arc<AnchorCatalog>,
    interval: Duration,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(interval);
    // The first tick completes immediately; the catalog is already loaded.
    ticker.tick().await;
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Stopping anchor watch");
                break;
            }
            _ = ticker.tick() => {
                let catalog = Arc::clone(&catalog);
                match tokio::task::spawn_blocking(move || catalog.reload()).await {
                    Ok(Ok(snapshot)) => {
                        debug!(generation = snapshot.generation, "Anchor catalog reloaded");
                    }
                    Ok(Err(e)) => {
                        warn!(error = %e, "Anchor reload failed, serving previous catalog");
                    }
                    Err(e) => {
                        error!(error = %e, "Anchor reload task panicked");
                    }
                }
            }
        }
    }
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
