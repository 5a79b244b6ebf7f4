//! Protected resource server
//!
//! Usage: `protected-resource-server [config.json]`. Without an argument the
//! path comes from `PROTECTED_RESOURCE_CONFIG`, then the platform config
//! directory.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use protected_resource::config::{ServerConfig, CONFIG_PATH_ENV};
use protected_resource::delivery::DeliveryDispatcher;
use protected_resource::events::TracingEventSink;
use protected_resource::guard::SystemClock;
use protected_resource::locator::{InMemoryMetadataStore, ResourceLocator};
use protected_resource::logging::LoggingSystem;
use protected_resource::pipeline::AccessPipeline;
use protected_resource::server::ProtectedResourceServer;
use protected_resource::token::TokenAuthenticator;

fn config_path() -> PathBuf {
    std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
        .unwrap_or_else(ServerConfig::default_path)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = config_path();
    let config = ServerConfig::load(&path)
        .await
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;

    let logging = LoggingSystem::init(&config.logging).context("Failed to initialize logging")?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %path.display(),
        log_profile = %logging.profile(),
        log_level = %logging.settings().level,
        "Starting protected resource server"
    );
    if let Some(directory) = logging.log_directory() {
        tracing::info!(directory = %directory.display(), "Writing log files");
    }

    let registry = config.registry();
    config
        .validate(&registry)
        .context("Configuration rejected")?;

    let store = match &config.metadata_manifest {
        Some(manifest) => InMemoryMetadataStore::from_manifest(manifest)
            .await
            .with_context(|| format!("Failed to load metadata manifest {}", manifest.display()))?,
        None => {
            tracing::warn!("No metadataManifest configured; every token will resolve to not found");
            InMemoryMetadataStore::new()
        }
    };
    tracing::info!(resources = store.len(), "Metadata loaded");

    let pipeline = AccessPipeline::builder(
        TokenAuthenticator::new(&config.access.secret),
        ResourceLocator::new(&config.access.base_path, Arc::new(store)),
        DeliveryDispatcher::new(config.access.serve_strategy.clone(), Arc::new(registry)),
    )
    .clock(Arc::new(SystemClock))
    .fingerprints(config.fingerprint_provider())
    .events(Arc::new(TracingEventSink))
    .build();

    ProtectedResourceServer::new(pipeline, config.server.clone())
        .start()
        .await?;

    Ok(())
}
