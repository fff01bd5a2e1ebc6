//! Blue Ocean state store
//!
//! A single global state tree shared by independently developed feature
//! modules. Each module registers a [`StateDescriptor`]: a path selector that
//! says where in the tree its actions apply, plus one reducer per action type.
//! Modules never need to know the overall shape of the tree.
//!
//! # Example
//!
//! ```
//! use blueocean_store::{Action, ConfigError, ReducerTable, StateDescriptor, StatePath, StateStore, StateValue};
//! use std::rc::Rc;
//!
//! struct Counter;
//!
//! impl StateDescriptor for Counter {
//!     fn action_sub_state_selector(&self, _action: &Action) -> anyhow::Result<StatePath> {
//!         Ok(StatePath::parse("counter"))
//!     }
//!
//!     fn add_reducers(&self, reducers: &mut ReducerTable) -> Result<(), ConfigError> {
//!         reducers.add_reducer("INCREMENT", |count, _| {
//!             let n = count.and_then(StateValue::as_i64).unwrap_or(0);
//!             Ok(Some(StateValue::from(n + 1)))
//!         })
//!     }
//! }
//!
//! let store = StateStore::new();
//! store.init([Rc::new(Counter) as Rc<dyn StateDescriptor>])?;
//! store.dispatch(Action::new("INCREMENT"));
//! store.dispatch(Action::new("INCREMENT"));
//!
//! assert_eq!(store.select("counter").and_then(|v| v.as_i64()), Some(2));
//! # Ok::<(), ConfigError>(())
//! ```

mod action;
mod descriptor;
mod error;
pub mod path;
mod store;
mod value;

pub use action::Action;
pub use descriptor::{Reducer, ReducerTable, StateDescriptor};
pub use error::{ConfigError, DispatchError};
pub use path::{resolve, resolve_parent, tokenize, PathToken, StatePath, TokenKind};
pub use store::{DispatchOutcome, Listener, StateStore, Subscription};
pub use value::{StateMap, StateValue};
