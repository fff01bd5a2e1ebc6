//! Blue Ocean dashboard shell
//!
//! Wires configuration, logging and the pipeline state descriptors around a
//! [`blueocean_store::StateStore`].

pub mod api;
pub mod descriptors;
pub mod logger;
pub mod startup;
