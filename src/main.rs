//! Integrations service binary

use anyhow::Context;
use clap::Parser;

use integrations_service::api::{create_router, AppState, Translator};
use integrations_service::catalog::Catalog;
use integrations_service::cli::Args;
use integrations_service::config::AppConfig;
use integrations_service::logging::init_tracing;
use integrations_service::server;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load(&args.config).context("failed to load configuration")?;
    args.apply(&mut config.server);
    config
        .server
        .validate()
        .context("invalid server configuration")?;

    init_tracing(config.server.level_filter()?, config.logging.format)?;

    let mut runtime = tokio::runtime::Builder::new_multi_thread();
    runtime.enable_all();
    if let Some(workers) = config.server.workers {
        runtime.worker_threads(workers);
    }
    let runtime = runtime.build().context("failed to build runtime")?;

    runtime.block_on(run(config))
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    let catalog = Catalog::builtin().without(&config.integrations.disabled);
    tracing::info!(
        integrations = catalog.len(),
        workers = ?config.server.workers,
        "Starting integrations service"
    );

    // Compose before binding so route conflicts abort startup
    let router = create_router(AppState::dry_run(catalog), Translator::default())
        .context("failed to register routes")?;

    server::serve(&config.server, router)
        .await
        .context("server terminated with an error")?;

    Ok(())
}
