//! A single pipeline at `/pipelines/[name=<pipeline>]`
//!
//! Reducers here only update pipelines that already exist. Actions for a
//! pipeline that is not in the collection leave the state unchanged; the
//! pipeline has to be added through the pipelines collection first.

use crate::api::PipelineApi;
use blueocean_store::{
    Action, ConfigError, DispatchOutcome, ReducerTable, StateDescriptor, StatePath, StateStore,
    StateValue,
};
use serde_json::Value;

pub const INC_PIPELINE_PROPX: &str = "INC_PIPELINE_PROPX";
pub const SET_BRANCHES: &str = "SET_BRANCHES";
pub const ADD_BRANCH: &str = "ADD_BRANCH";
pub const UPDATE_BRANCH: &str = "UPDATE_BRANCH";

pub struct PipelineState;

/// Path of the named pipeline; the name may contain any character
pub fn pipeline_path(name: &str) -> StatePath {
    StatePath::parse(&format!("/pipelines/[name={}]", urlencoding::encode(name)))
}

impl StateDescriptor for PipelineState {
    fn name(&self) -> &str {
        "PipelineState"
    }

    fn action_sub_state_selector(&self, action: &Action) -> anyhow::Result<StatePath> {
        let name = action
            .get_str("pipelineName")
            .ok_or_else(|| anyhow::anyhow!("{} action has no \"pipelineName\"", action.action_type()))?;
        Ok(pipeline_path(name))
    }

    fn add_reducers(&self, reducers: &mut ReducerTable) -> Result<(), ConfigError> {
        reducers.add_reducer(INC_PIPELINE_PROPX, |pipeline, _| {
            Ok(pipeline.map(|p| {
                let prop_x = p.get("propX").and_then(StateValue::as_i64).unwrap_or(0);
                p.with_field("propX", prop_x + 1)
            }))
        })?;

        reducers.add_reducer(SET_BRANCHES, |pipeline, action| {
            let Some(branches) = action.get("branches") else {
                anyhow::bail!("SET_BRANCHES action has no \"branches\"");
            };
            let branches = StateValue::from(branches);
            Ok(pipeline.map(|p| p.with_field("branches", branches)))
        })?;

        reducers.add_reducer(ADD_BRANCH, |pipeline, action| {
            let Some(branch) = action.get("branch") else {
                anyhow::bail!("ADD_BRANCH action has no \"branch\"");
            };
            Ok(pipeline.map(|p| {
                let branches = p.get("branches").cloned().unwrap_or_else(StateValue::empty_array);
                p.with_field("branches", branches.with_pushed(StateValue::from(branch)))
            }))
        })?;

        reducers.add_reducer(UPDATE_BRANCH, |pipeline, action| {
            let Some(branch) = action.get("branch") else {
                anyhow::bail!("UPDATE_BRANCH action has no \"branch\"");
            };
            let branch = StateValue::from(branch);

            let Some(p) = pipeline else {
                return Ok(None);
            };
            let Some(items) = p.get("branches").and_then(StateValue::as_array) else {
                return Ok(Some(p.clone()));
            };
            let name = branch.get("name");
            let Some(index) = items.iter().position(|b| name.is_some() && b.get("name") == name) else {
                return Ok(Some(p.clone()));
            };

            let mut branches = items.to_vec();
            branches[index] = branch;
            Ok(Some(p.with_field("branches", branches)))
        })
    }
}

// Bounded action creators

pub fn inc_prop_x(store: &StateStore, pipeline_name: &str) -> DispatchOutcome {
    store.dispatch(Action::new(INC_PIPELINE_PROPX).with("pipelineName", pipeline_name))
}

pub fn set_branches(store: &StateStore, pipeline_name: &str, branches: Vec<Value>) -> DispatchOutcome {
    store.dispatch(
        Action::new(SET_BRANCHES)
            .with("pipelineName", pipeline_name)
            .with("branches", branches),
    )
}

pub fn add_branch(store: &StateStore, pipeline_name: &str, branch: Value) -> DispatchOutcome {
    store.dispatch(
        Action::new(ADD_BRANCH)
            .with("pipelineName", pipeline_name)
            .with("branch", branch),
    )
}

pub fn update_branch(store: &StateStore, pipeline_name: &str, branch: Value) -> DispatchOutcome {
    store.dispatch(
        Action::new(UPDATE_BRANCH)
            .with("pipelineName", pipeline_name)
            .with("branch", branch),
    )
}

/// Fetch the branches of a pipeline and store them on it.
///
/// Returns `None` if fetching failed; nothing is dispatched in that case.
pub async fn load_branches(
    store: &StateStore,
    api: &dyn PipelineApi,
    pipeline_name: &str,
) -> Option<DispatchOutcome> {
    match api.fetch_branches(pipeline_name).await {
        Ok(branches) => {
            log::info!("Loaded {} branch(es) of {}", branches.len(), pipeline_name);
            Some(set_branches(store, pipeline_name, branches))
        }
        Err(e) => {
            log::error!("Failed to load branches of {}: {:#}", pipeline_name, e);
            None
        }
    }
}

// State accessors

pub fn prop_x(store: &StateStore, pipeline_name: &str) -> Option<i64> {
    store
        .select(pipeline_path(pipeline_name).child("propX"))
        .and_then(|v| v.as_i64())
}

pub fn branches(store: &StateStore, pipeline_name: &str) -> Option<StateValue> {
    store.select(pipeline_path(pipeline_name).child("branches"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FixtureApi;
    use crate::descriptors::{all, pipelines_state, root_app_state};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn store_with(pipelines: &[&str]) -> StateStore {
        let store = StateStore::new();
        store.init(all()).unwrap();
        root_app_state::set(&store);
        for name in pipelines {
            pipelines_state::add(&store, json!({"name": name, "branches": [], "propX": 1}));
        }
        store
    }

    #[test]
    fn test_inc_prop_x() {
        let store = store_with(&["pipeline_1"]);

        inc_prop_x(&store, "pipeline_1");
        inc_prop_x(&store, "pipeline_1");

        assert_eq!(prop_x(&store, "pipeline_1"), Some(3));
    }

    #[test]
    fn test_unknown_pipeline_is_ignored() {
        let store = store_with(&["pipeline_1"]);
        let before = store.get_state();

        let outcome = inc_prop_x(&store, "pipeline_unknown");

        assert!(matches!(outcome, DispatchOutcome::Unchanged));
        assert!(StateValue::same(&before, &store.get_state()));
        assert_eq!(store.select("pipelines").and_then(|p| p.len()), Some(1));
    }

    #[test]
    fn test_names_with_reserved_characters() {
        let store = store_with(&["team/job [x=1] 50%"]);
        inc_prop_x(&store, "team/job [x=1] 50%");
        assert_eq!(prop_x(&store, "team/job [x=1] 50%"), Some(2));
    }

    #[test]
    fn test_branches_before_root_state_are_dropped() {
        let store = StateStore::new();
        store.init(all()).unwrap();

        let outcome = set_branches(&store, "p1", vec![json!({"name": "master"})]);

        assert!(outcome.error().is_some());
        assert!(branches(&store, "p1").is_none());
    }

    #[test]
    fn test_add_and_update_branch() {
        let store = store_with(&["p1", "p2"]);
        let p2 = store.select("pipelines/[name=p2]").unwrap();

        add_branch(&store, "p1", json!({"name": "master", "result": "SUCCESS"}));
        add_branch(&store, "p1", json!({"name": "dev", "result": "SUCCESS"}));
        update_branch(&store, "p1", json!({"name": "dev", "result": "FAILURE"}));

        assert_eq!(
            branches(&store, "p1").map(|b| b.to_json()),
            Some(json!([
                {"name": "master", "result": "SUCCESS"},
                {"name": "dev", "result": "FAILURE"}
            ]))
        );
        assert!(StateValue::same(&p2, &store.select("pipelines/[name=p2]").unwrap()));
    }

    #[test]
    fn test_set_branches_without_payload_is_dropped() {
        let store = store_with(&["p1"]);
        add_branch(&store, "p1", json!({"name": "master"}));
        let before = store.get_state();

        let outcome = store.dispatch(Action::new(SET_BRANCHES).with("pipelineName", "p1"));

        assert!(outcome.error().is_some());
        assert!(StateValue::same(&before, &store.get_state()));
        assert_eq!(branches(&store, "p1").and_then(|b| b.len()), Some(1));
    }

    #[test]
    fn test_update_unknown_branch_is_unchanged() {
        let store = store_with(&["p1"]);
        add_branch(&store, "p1", json!({"name": "master"}));

        let outcome = update_branch(&store, "p1", json!({"name": "ghost"}));
        assert!(matches!(outcome, DispatchOutcome::Unchanged));
    }

    #[tokio::test]
    async fn test_load_branches() {
        let store = store_with(&["blueocean"]);
        let api = FixtureApi::sample();

        let outcome = load_branches(&store, &api, "blueocean").await;
        assert!(outcome.is_some_and(|o| o.is_changed()));
        assert_eq!(
            store
                .select("pipelines/[name=blueocean]/branches/[1]/name")
                .and_then(|v| v.as_str().map(str::to_string)),
            Some("feature/redux-store".to_string())
        );

        assert!(load_branches(&store, &api, "missing").await.is_none());
    }
}
