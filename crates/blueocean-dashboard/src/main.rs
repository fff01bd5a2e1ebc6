use anyhow::Context;
use blueocean_config::DashboardConfig;
use blueocean_store::StateStore;

use blueocean_dashboard::api::{FixtureApi, PipelineApi};
use blueocean_dashboard::{descriptors, logger, startup};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let (config, config_source) = DashboardConfig::load();
    let log_file = logger::init(&config)?;

    log::info!("Starting blueocean-dashboard, logging to {}", log_file.display());
    config_source.log();

    let api: Box<dyn PipelineApi> = match &config.fixtures_file {
        Some(path) => Box::new(FixtureApi::from_file(path)?),
        None => Box::new(FixtureApi::sample()),
    };

    // Initialize store with all state descriptors
    let store = StateStore::new();
    store
        .init(descriptors::all())
        .context("Failed to register state descriptors")?;

    let _subscription = {
        let reader = store.clone();
        store.subscribe(move || log::debug!("State changed: {}", reader.get_state()))
    };

    startup::run(&store, api.as_ref(), &config).await;

    println!("{}", serde_json::to_string_pretty(&store.get_state())?);

    log::info!("Exiting blueocean-dashboard");
    Ok(())
}
