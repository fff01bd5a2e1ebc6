use crate::api::PipelineApi;
use crate::descriptors::{pipeline_state, pipelines_state, root_app_state};
use blueocean_config::DashboardConfig;
use blueocean_store::StateStore;

/// Startup action sequence: root state, pipelines, then branches
pub async fn run(store: &StateStore, api: &dyn PipelineApi, config: &DashboardConfig) {
    root_app_state::set(store);
    pipelines_state::load(store, api).await;

    let names = if config.pipelines.is_empty() {
        pipelines_state::names(store)
    } else {
        config.pipelines.clone()
    };

    for name in &names {
        pipeline_state::load_branches(store, api, name).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FixtureApi;
    use crate::descriptors;

    #[tokio::test]
    async fn test_startup_sequence_loads_everything() {
        let store = StateStore::new();
        store.init(descriptors::all()).unwrap();

        run(&store, &FixtureApi::sample(), &DashboardConfig::default()).await;

        assert_eq!(
            pipelines_state::names(&store),
            vec!["blueocean", "jenkins core"]
        );
        assert_eq!(
            pipeline_state::branches(&store, "jenkins core").and_then(|b| b.len()),
            Some(1)
        );
    }

    #[tokio::test]
    async fn test_startup_sequence_limits_to_configured_pipelines() {
        let store = StateStore::new();
        store.init(descriptors::all()).unwrap();
        let config = DashboardConfig {
            pipelines: vec!["blueocean".to_string()],
            ..Default::default()
        };

        run(&store, &FixtureApi::sample(), &config).await;

        assert!(pipeline_state::branches(&store, "blueocean").is_some());
        assert!(pipeline_state::branches(&store, "jenkins core").is_none());
    }
}
