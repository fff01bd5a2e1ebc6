use blueocean_store::{
    Action, ConfigError, DispatchOutcome, ReducerTable, StateDescriptor, StatePath, StateStore,
    StateValue,
};

pub const SET_ROOT_STATE: &str = "SET_ROOT_STATE";

/// The whole state tree
pub struct RootAppState;

impl StateDescriptor for RootAppState {
    fn name(&self) -> &str {
        "RootAppState"
    }

    fn action_sub_state_selector(&self, _action: &Action) -> anyhow::Result<StatePath> {
        Ok(StatePath::root())
    }

    fn add_reducers(&self, reducers: &mut ReducerTable) -> Result<(), ConfigError> {
        reducers.add_reducer(SET_ROOT_STATE, |_, _| {
            Ok(Some(StateValue::object([(
                "pipelines",
                StateValue::empty_array(),
            )])))
        })
    }
}

/// Reset the state tree to its initial shape
pub fn set(store: &StateStore) -> DispatchOutcome {
    store.dispatch(Action::new(SET_ROOT_STATE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_set_replaces_whole_state() {
        let store = StateStore::with_state(StateValue::from(serde_json::json!({"stale": true})));
        store.init([Rc::new(RootAppState) as Rc<dyn StateDescriptor>]).unwrap();

        assert!(set(&store).is_changed());
        assert_eq!(
            store.get_state().to_json(),
            serde_json::json!({"pipelines": []})
        );
    }
}
