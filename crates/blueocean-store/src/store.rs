use crate::action::Action;
use crate::descriptor::{Reducer, ReducerTable, StateDescriptor};
use crate::error::{ConfigError, DispatchError};
use crate::path::{locate, locate_child, rebuild, StatePath, Step};
use crate::value::StateValue;
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::{Rc, Weak};

/// Listener invoked after every state-changing dispatch
pub type Listener = Rc<dyn Fn()>;

/// What happened to a dispatched action
#[derive(Debug)]
pub enum DispatchOutcome {
    /// No registered reducer handles the action type
    Unhandled,
    /// The reducer returned the sub-state it was given
    Unchanged,
    /// The state was replaced and subscribers were notified
    Changed,
    /// The action was dropped; the state is untouched
    Dropped(DispatchError),
}

impl DispatchOutcome {
    pub fn is_changed(&self) -> bool {
        matches!(self, DispatchOutcome::Changed)
    }

    pub fn error(&self) -> Option<&DispatchError> {
        match self {
            DispatchOutcome::Dropped(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Applying,
    Notifying,
}

/// One action type bound to the descriptor that registered it
struct Route {
    action_type: String,
    reducer: Reducer,
    descriptor: Rc<dyn StateDescriptor>,
}

struct Inner {
    state: RefCell<StateValue>,
    routes: RefCell<Vec<Rc<Route>>>,
    subscribers: RefCell<Vec<(u64, Listener)>>,
    next_subscriber_id: Cell<u64>,
    phase: Cell<Phase>,
}

/// Store - holds the global state tree and routes actions to descriptors
///
/// The store is a cheap handle: clones share the same state, reducers and
/// subscribers. It is meant to be created once at application start and
/// handed to whatever needs it.
///
/// Dispatch is synchronous. Selectors, reducers and subscribers must not
/// dispatch themselves; such nested dispatches are refused with
/// [`DispatchError::Reentrant`].
#[derive(Clone)]
pub struct StateStore {
    inner: Rc<Inner>,
}

impl StateStore {
    /// A store whose state is an empty mapping
    pub fn new() -> Self {
        Self::with_state(StateValue::empty_object())
    }

    pub fn with_state(initial_state: StateValue) -> Self {
        Self {
            inner: Rc::new(Inner {
                state: RefCell::new(initial_state),
                routes: RefCell::new(Vec::new()),
                subscribers: RefCell::new(Vec::new()),
                next_subscriber_id: Cell::new(0),
                phase: Cell::new(Phase::Idle),
            }),
        }
    }

    /// Register descriptors, replacing any previous registration.
    ///
    /// Reducers are looked up in descriptor order, then in each descriptor's
    /// registration order. A descriptor that registers no reducers is logged
    /// and skipped. On error the previous registration stays in place.
    pub fn init<I>(&self, descriptors: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = Rc<dyn StateDescriptor>>,
    {
        let mut routes: Vec<Rc<Route>> = Vec::new();

        for descriptor in descriptors {
            let mut table = ReducerTable::new();
            descriptor.add_reducers(&mut table)?;

            if table.is_empty() {
                log::error!(
                    "store.init() called with descriptor {} which registers no reducers, skipping it",
                    descriptor.name()
                );
                continue;
            }

            log::debug!(
                "Registering {} reducer(s) for {}: {:?}",
                table.len(),
                descriptor.name(),
                table
            );

            for entry in table.into_entries() {
                if let Some(existing) = routes.iter().find(|r| r.action_type == entry.action_type) {
                    log::warn!(
                        "Action type {} is handled by both {} and {}; only {} will run",
                        entry.action_type,
                        existing.descriptor.name(),
                        descriptor.name(),
                        existing.descriptor.name()
                    );
                }
                routes.push(Rc::new(Route {
                    action_type: entry.action_type,
                    reducer: entry.reducer,
                    descriptor: Rc::clone(&descriptor),
                }));
            }
        }

        *self.inner.routes.borrow_mut() = routes;
        Ok(())
    }

    /// Current global state
    pub fn get_state(&self) -> StateValue {
        self.inner.state.borrow().clone()
    }

    /// Value at `path` in the current state, if any
    pub fn select(&self, path: impl Into<StatePath>) -> Option<StateValue> {
        let state = self.inner.state.borrow();
        crate::path::resolve(&state, path).cloned()
    }

    /// Apply an action to the state tree.
    ///
    /// At most one reducer runs: the first registered for the action type.
    /// Failures never reach the caller as a panic or error; they are logged and
    /// reported as [`DispatchOutcome::Dropped`] with the state left untouched.
    pub fn dispatch(&self, action: Action) -> DispatchOutcome {
        if self.inner.phase.get() != Phase::Idle {
            let err = DispatchError::Reentrant {
                action_type: action.action_type().to_string(),
            };
            log::error!("{}", err);
            return DispatchOutcome::Dropped(err);
        }

        log::debug!("Action: {:?}", action);

        let Some(route) = self.route_for(action.action_type()) else {
            log::trace!("No reducer registered for action type {}", action.action_type());
            return DispatchOutcome::Unhandled;
        };

        let applied = {
            let _phase = PhaseGuard::enter(&self.inner.phase, Phase::Applying);
            self.apply(&route, &action)
        };

        match applied {
            Ok(Some(new_state)) => {
                *self.inner.state.borrow_mut() = new_state;
                self.notify();
                DispatchOutcome::Changed
            }
            Ok(None) => DispatchOutcome::Unchanged,
            Err(err) => {
                log::error!(
                    "Unexpected error while applying {} for action {:?}: {}",
                    route.descriptor.name(),
                    action,
                    err
                );
                DispatchOutcome::Dropped(err)
            }
        }
    }

    /// Register a listener called after every state change.
    pub fn subscribe(&self, listener: impl Fn() + 'static) -> Subscription {
        let id = self.inner.next_subscriber_id.get();
        self.inner.next_subscriber_id.set(id + 1);
        self.inner
            .subscribers
            .borrow_mut()
            .push((id, Rc::new(listener)));

        Subscription {
            id,
            store: Rc::downgrade(&self.inner),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    fn route_for(&self, action_type: &str) -> Option<Rc<Route>> {
        self.inner
            .routes
            .borrow()
            .iter()
            .find(|r| r.action_type == action_type)
            .cloned()
    }

    /// Run selector and reducer, returning the new global state if it changed
    fn apply(&self, route: &Route, action: &Action) -> Result<Option<StateValue>, DispatchError> {
        let current = self.get_state();

        let path = guarded(&route.action_type, || {
            route.descriptor.action_sub_state_selector(action)
        })?
        .map_err(|source| DispatchError::Selector {
            descriptor: route.descriptor.name().to_string(),
            source,
        })?;

        // The root selector hands the whole state to the reducer
        let Some(parent_path) = path.parent() else {
            let reduced = run_reducer(route, Some(&current), action)?;
            let new_state = reduced.unwrap_or_default();
            if StateValue::same(&new_state, &current) {
                return Ok(None);
            }
            return Ok(Some(new_state));
        };

        let Some((parent_steps, parent)) = locate(&current, &parent_path) else {
            return Err(DispatchError::ParentNotFound {
                path: path.to_string(),
            });
        };
        match parent {
            StateValue::Array(_) | StateValue::Object(_) => {}
            StateValue::Null => {
                return Err(DispatchError::ParentNotFound {
                    path: path.to_string(),
                });
            }
            other => {
                return Err(DispatchError::ParentNotContainer {
                    path: path.to_string(),
                    kind: other.kind(),
                });
            }
        }

        let Some(last) = path.last() else {
            return Ok(None);
        };
        let (child_step, sub_state) = match locate_child(parent, last, &path) {
            Some((step, value)) => (Some(step), Some(value)),
            None => (None, None),
        };

        let new_sub_state = run_reducer(route, sub_state, action)?;
        if StateValue::same_opt(new_sub_state.as_ref(), sub_state) {
            return Ok(None);
        }

        let new_state = rebuild(&current, &parent_steps, |parent| {
            reconcile(parent, child_step, last.raw(), new_sub_state)
        })
        .ok_or_else(|| DispatchError::ParentNotFound {
            path: path.to_string(),
        })?;

        Ok(Some(new_state))
    }

    fn notify(&self) {
        let _phase = PhaseGuard::enter(&self.inner.phase, Phase::Notifying);

        // Snapshot so listeners may unsubscribe while being notified
        let listeners: Vec<Listener> = self
            .inner
            .subscribers
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();

        for listener in listeners {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| (*listener)())) {
                log::error!("Store subscriber panicked: {}", panic_message(&*payload));
            }
        }
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateStore")
            .field("state", &*self.inner.state.borrow())
            .field("reducers", &self.inner.routes.borrow().len())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Handle returned by [`StateStore::subscribe`]
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    store: Weak<Inner>,
}

impl Subscription {
    /// Stop receiving notifications
    pub fn unsubscribe(self) {
        if let Some(inner) = self.store.upgrade() {
            inner.subscribers.borrow_mut().retain(|(id, _)| *id != self.id);
        }
    }
}

/// Sets the dispatch phase and restores `Idle` when dropped, even on unwind
struct PhaseGuard<'a> {
    phase: &'a Cell<Phase>,
}

impl<'a> PhaseGuard<'a> {
    fn enter(phase: &'a Cell<Phase>, next: Phase) -> Self {
        phase.set(next);
        Self { phase }
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.phase.set(Phase::Idle);
    }
}

/// Write the reconciled sub-state into a copy of its parent container
fn reconcile(
    parent: &StateValue,
    child_step: Option<Step>,
    key: &str,
    new_sub_state: Option<StateValue>,
) -> StateValue {
    match parent {
        StateValue::Array(items) => {
            let mut items = (**items).clone();
            match (child_step, new_sub_state) {
                (Some(Step::Index(index)), Some(value)) => items[index] = value,
                (Some(Step::Index(index)), None) => {
                    items.remove(index);
                }
                (_, Some(value)) => items.push(value),
                (_, None) => {}
            }
            StateValue::from(items)
        }
        StateValue::Object(map) => {
            let mut map = (**map).clone();
            match new_sub_state {
                Some(value) => {
                    map.insert(key.to_string(), value);
                }
                None => {
                    map.remove(key);
                }
            }
            StateValue::from(map)
        }
        other => other.clone(),
    }
}

fn run_reducer(
    route: &Route,
    sub_state: Option<&StateValue>,
    action: &Action,
) -> Result<Option<StateValue>, DispatchError> {
    guarded(&route.action_type, || (route.reducer)(sub_state, action))?.map_err(|source| {
        DispatchError::Reducer {
            action_type: route.action_type.clone(),
            source,
        }
    })
}

/// Run user code, turning a panic into a dispatch error
fn guarded<T>(action_type: &str, f: impl FnOnce() -> T) -> Result<T, DispatchError> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|payload| DispatchError::Panicked {
        action_type: action_type.to_string(),
        message: panic_message(&*payload),
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
