//! State descriptors of the dashboard
//!
//! Each module owns one slice of the global state tree together with its
//! bounded action creators (helpers that build and dispatch the actions) and
//! read accessors.

use blueocean_store::StateDescriptor;
use std::rc::Rc;

pub mod pipeline_state;
pub mod pipelines_state;
pub mod root_app_state;

pub use pipeline_state::PipelineState;
pub use pipelines_state::PipelinesState;
pub use root_app_state::RootAppState;

/// All dashboard descriptors in registration order
pub fn all() -> Vec<Rc<dyn StateDescriptor>> {
    vec![
        Rc::new(RootAppState) as Rc<dyn StateDescriptor>,
        Rc::new(PipelinesState) as Rc<dyn StateDescriptor>,
        Rc::new(PipelineState) as Rc<dyn StateDescriptor>,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use blueocean_store::StateStore;

    #[test]
    fn test_all_descriptors_register() {
        let store = StateStore::new();
        assert!(store.init(all()).is_ok());
    }
}
