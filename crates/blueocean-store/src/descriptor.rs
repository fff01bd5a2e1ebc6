//! State descriptors
//!
//! A descriptor is the unit of reducer registration for one logical slice of
//! the state tree ("root", "the pipelines collection", "one pipeline").
//! It tells the store where in the tree its actions apply, through
//! [`StateDescriptor::action_sub_state_selector`], and which reducer runs for
//! each action type, through [`StateDescriptor::add_reducers`].

use crate::action::Action;
use crate::error::ConfigError;
use crate::path::StatePath;
use crate::value::StateValue;
use std::fmt;
use std::rc::Rc;

/// Pure function from the current sub-state and an action to the new sub-state.
///
/// `None` as input means the sub-state does not exist yet. Returning the input
/// unchanged (the same reference) signals that nothing changed; returning
/// `None` for an existing sub-state removes it from its parent.
pub type Reducer = Rc<dyn Fn(Option<&StateValue>, &Action) -> anyhow::Result<Option<StateValue>>>;

/// Capability set every state slice must provide
pub trait StateDescriptor {
    /// Label used in diagnostics
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Path of the sub-state the given action operates on.
    ///
    /// [`StatePath::root`] hands the reducer the entire global state.
    fn action_sub_state_selector(&self, action: &Action) -> anyhow::Result<StatePath>;

    /// Register this descriptor's reducers.
    ///
    /// Called on every store initialization with a fresh table.
    fn add_reducers(&self, reducers: &mut ReducerTable) -> Result<(), ConfigError>;
}

#[derive(Clone)]
pub(crate) struct ReducerEntry {
    pub(crate) action_type: String,
    pub(crate) reducer: Reducer,
}

/// Ordered action type -> reducer pairs of one descriptor
#[derive(Clone, Default)]
pub struct ReducerTable {
    entries: Vec<ReducerEntry>,
}

impl ReducerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `reducer` for `action_type`.
    ///
    /// Each action type can be registered once per table.
    pub fn add_reducer<F>(&mut self, action_type: &str, reducer: F) -> Result<(), ConfigError>
    where
        F: Fn(Option<&StateValue>, &Action) -> anyhow::Result<Option<StateValue>> + 'static,
    {
        if action_type.is_empty() {
            return Err(ConfigError::EmptyActionType);
        }
        if self.handles(action_type) {
            return Err(ConfigError::DuplicateReducer {
                action_type: action_type.to_string(),
            });
        }

        self.entries.push(ReducerEntry {
            action_type: action_type.to_string(),
            reducer: Rc::new(reducer),
        });
        Ok(())
    }

    pub fn handles(&self, action_type: &str) -> bool {
        self.entries.iter().any(|e| e.action_type == action_type)
    }

    /// Registered action types in registration order
    pub fn action_types(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.action_type.as_str())
    }

    /// Registered pairs in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Reducer)> {
        self.entries
            .iter()
            .map(|e| (e.action_type.as_str(), &e.reducer))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn into_entries(self) -> Vec<ReducerEntry> {
        self.entries
    }
}

impl fmt::Debug for ReducerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.action_types()).finish()
    }
}
