//! Error types
//!
//! Two kinds, handled differently:
//!
//! - [`ConfigError`] is returned while descriptors are being registered and
//!   should abort application start.
//! - [`DispatchError`] describes why a single dispatched action was dropped.
//!   It is logged by the store and handed back inside
//!   [`DispatchOutcome::Dropped`](crate::DispatchOutcome::Dropped); it never
//!   affects the current state.

use thiserror::Error;

/// Misconfiguration detected while building the reducer table
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("The action type of a reducer must be a non-empty string")]
    EmptyActionType,

    #[error("A reducer function for action type {action_type} is already defined")]
    DuplicateReducer { action_type: String },
}

/// Reason a dispatched action was dropped
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(
        "Unable to process action: state at {path} cannot be added/updated because its parent container does not exist. A preceding action is probably required to create the parent state."
    )]
    ParentNotFound { path: String },

    #[error("Unable to process action: the parent of {path} is a {kind}, not an object or array")]
    ParentNotContainer { path: String, kind: &'static str },

    #[error("Sub-state selector of {descriptor} failed: {source}")]
    Selector {
        descriptor: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Reducer for action type {action_type} failed: {source}")]
    Reducer {
        action_type: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Reducer for action type {action_type} panicked: {message}")]
    Panicked { action_type: String, message: String },

    #[error("Action {action_type} dispatched while another action is being applied")]
    Reentrant { action_type: String },
}
