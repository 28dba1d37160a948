//! keygate - rotate tenant gateway keys and serve the introspection API

mod config;
mod context;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use config::KeygateConfig;
use context::AppContext;
use keygate_api::{ApiState, router};
use keygate_credential::TenantId;
use keygate_redact::{LanguagePiiDetector, Redactor};
use std::io::Read;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "keygate", version, about = "Multi-tenant gateway key rotation")]
struct Cli {
    /// Path to the configuration file (default: ./keygate.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one rotation cycle for a tenant, or sweep all eligible tenants
    Rotate {
        /// Tenant slug to rotate
        #[arg(long, conflicts_with = "all")]
        tenant: Option<String>,

        /// Rotate every eligible tenant in the directory
        #[arg(long)]
        all: bool,

        /// Bypass the time-based cooldown
        #[arg(long)]
        force: bool,
    },

    /// Serve the tenant key introspection API
    Serve {
        /// Listen address, overriding the configured one
        #[arg(long)]
        bind: Option<SocketAddr>,
    },

    /// Redact PII from a file (or stdin) through the configured detector
    Redact {
        /// Input file; stdin when omitted
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = KeygateConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Rotate { tenant, all, force } => rotate(&config, tenant, all, force).await,
        Command::Serve { bind } => serve(&config, bind).await,
        Command::Redact { input } => redact(&config, input).await,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn rotate(
    config: &KeygateConfig,
    tenant: Option<String>,
    all: bool,
    force: bool,
) -> anyhow::Result<()> {
    let context = AppContext::build(config)?;
    let coordinator = context.coordinator(config);

    if all {
        let results = coordinator.rotate_all(force).await;
        let failures = results.iter().filter(|(_, r)| r.is_err()).count();
        tracing::info!(
            tenants = results.len(),
            failures,
            "rotation sweep finished"
        );
        if failures > 0 {
            bail!("{failures} tenant(s) failed to rotate");
        }
        return Ok(());
    }

    let Some(slug) = tenant else {
        bail!("pass --tenant <slug> or --all");
    };
    let tenant = TenantId::new(slug.as_str())
        .with_context(|| format!("invalid tenant slug '{slug}'"))?;
    let outcome = coordinator
        .rotate_tenant(&tenant, force)
        .await
        .with_context(|| format!("rotating tenant '{tenant}'"))?;

    let metadata = outcome.metadata();
    tracing::info!(
        tenant = %tenant,
        rotated = outcome.rotated(),
        rotation_number = metadata.rotation_number,
        safe_slot = %metadata.safe_slot,
        "rotation finished"
    );
    Ok(())
}

async fn serve(config: &KeygateConfig, bind: Option<SocketAddr>) -> anyhow::Result<()> {
    let context = AppContext::build(config)?;
    let state = ApiState::new(context.gateway.clone(), context.store.clone());
    let app = router(state);

    let addr = bind.unwrap_or(config.bind);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(addr = %addr, "introspection API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("failed to install ctrl-c handler; running until killed");
        std::future::pending::<()>().await;
    }
}

async fn redact(config: &KeygateConfig, input: Option<PathBuf>) -> anyhow::Result<()> {
    let Some(detector_config) = config.detector.clone() else {
        bail!("no [detector] section configured");
    };

    let content = match input {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("reading stdin")?;
            buffer
        }
    };

    let detector = LanguagePiiDetector::new(detector_config).context("building detector")?;
    let redactor = Redactor::new(Arc::new(detector), config.redaction.clone());
    let outcome = redactor.redact(&content).await?;

    tracing::info!(
        entities = outcome.entity_count,
        types = ?outcome.entity_types,
        changed = outcome.content_changed,
        status = outcome.status_code,
        "redaction finished"
    );
    println!("{}", outcome.content);
    Ok(())
}
