use crate::api::PipelineApi;
use blueocean_store::{
    Action, ConfigError, DispatchOutcome, ReducerTable, StateDescriptor, StatePath, StateStore,
    StateValue,
};
use serde_json::Value;

pub const ADD_PIPELINE: &str = "ADD_PIPELINE";
pub const UPDATE_PIPELINE: &str = "UPDATE_PIPELINE";
pub const SET_PIPELINES: &str = "SET_PIPELINES";

/// The collection of pipelines at `/pipelines`
pub struct PipelinesState;

impl StateDescriptor for PipelinesState {
    fn name(&self) -> &str {
        "PipelinesState"
    }

    fn action_sub_state_selector(&self, _action: &Action) -> anyhow::Result<StatePath> {
        Ok(StatePath::parse("/pipelines"))
    }

    fn add_reducers(&self, reducers: &mut ReducerTable) -> Result<(), ConfigError> {
        reducers.add_reducer(ADD_PIPELINE, |pipelines, action| {
            let pipeline = payload(action, "pipeline")?;
            let pipelines = pipelines.cloned().unwrap_or_else(StateValue::empty_array);
            Ok(Some(pipelines.with_pushed(pipeline)))
        })?;

        reducers.add_reducer(UPDATE_PIPELINE, |pipelines, action| {
            let pipeline = payload(action, "pipeline")?;
            let Some(items) = pipelines.and_then(StateValue::as_array) else {
                return Ok(pipelines.cloned());
            };

            let name = pipeline.get("name");
            let Some(index) = items.iter().position(|p| name.is_some() && p.get("name") == name) else {
                return Ok(pipelines.cloned());
            };

            let mut updated = items.to_vec();
            updated[index] = pipeline;
            Ok(Some(StateValue::from(updated)))
        })?;

        reducers.add_reducer(SET_PIPELINES, |_, action| {
            let pipelines = payload(action, "pipelines")?;
            anyhow::ensure!(
                pipelines.as_array().is_some(),
                "\"pipelines\" must be an array, got {}",
                pipelines.kind()
            );
            Ok(Some(pipelines))
        })
    }
}

/// A mandatory payload field converted into state
fn payload(action: &Action, key: &str) -> anyhow::Result<StateValue> {
    action
        .get(key)
        .map(StateValue::from)
        .ok_or_else(|| anyhow::anyhow!("{} action has no \"{}\" field", action.action_type(), key))
}

// Bounded action creators

pub fn add(store: &StateStore, pipeline: Value) -> DispatchOutcome {
    store.dispatch(Action::new(ADD_PIPELINE).with("pipeline", pipeline))
}

pub fn update(store: &StateStore, pipeline: Value) -> DispatchOutcome {
    store.dispatch(Action::new(UPDATE_PIPELINE).with("pipeline", pipeline))
}

pub fn set_all(store: &StateStore, pipelines: Vec<Value>) -> DispatchOutcome {
    store.dispatch(Action::new(SET_PIPELINES).with("pipelines", pipelines))
}

/// Fetch all pipelines and replace the collection.
///
/// Returns `None` if fetching failed; nothing is dispatched in that case.
pub async fn load(store: &StateStore, api: &dyn PipelineApi) -> Option<DispatchOutcome> {
    match api.fetch_pipelines().await {
        Ok(pipelines) => {
            log::info!("Loaded {} pipeline(s)", pipelines.len());
            Some(set_all(store, pipelines))
        }
        Err(e) => {
            log::error!("Failed to load pipelines: {:#}", e);
            None
        }
    }
}

/// Names of all pipelines currently in the store
pub fn names(store: &StateStore) -> Vec<String> {
    store
        .select("pipelines")
        .and_then(|p| {
            p.as_array().map(|items| {
                items
                    .iter()
                    .filter_map(|p| p.get("name").and_then(StateValue::as_str))
                    .map(str::to_string)
                    .collect()
            })
        })
        .unwrap_or_default()
}
