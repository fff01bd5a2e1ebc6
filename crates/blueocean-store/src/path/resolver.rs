//! Path resolution against a state tree

use super::token::{PathToken, TokenKind};
use super::StatePath;
use crate::value::StateValue;
use std::sync::Arc;

/// A concrete move from a container to one of its children
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Step {
    Key(String),
    Index(usize),
}

/// Resolve `path` against `root`.
///
/// Returns `None` as soon as any token fails to select a child; remaining
/// tokens are not evaluated. The root path resolves to `root` itself.
pub fn resolve(root: &StateValue, path: impl Into<StatePath>) -> Option<&StateValue> {
    let path = path.into();
    locate(root, &path).map(|(_, value)| value)
}

/// Resolve the container holding the value addressed by `path`.
///
/// The root has no parent, so the root path yields `None`.
pub fn resolve_parent(root: &StateValue, path: impl Into<StatePath>) -> Option<&StateValue> {
    let parent = path.into().parent()?;
    locate(root, &parent).map(|(_, value)| value)
}

/// Resolve `path`, recording the concrete step taken for every token
pub(crate) fn locate<'a>(root: &'a StateValue, path: &StatePath) -> Option<(Vec<Step>, &'a StateValue)> {
    let mut steps = Vec::with_capacity(path.len());
    let mut current = root;

    for token in path.tokens() {
        let (step, child) = locate_child(current, token, path)?;
        steps.push(step);
        current = child;
    }

    Some((steps, current))
}

/// Select one child of `node` by `token`
pub(crate) fn locate_child<'a>(
    node: &'a StateValue,
    token: &PathToken,
    path: &StatePath,
) -> Option<(Step, &'a StateValue)> {
    match node {
        StateValue::Object(map) => map
            .get(token.raw())
            .map(|child| (Step::Key(token.raw().to_string()), child)),
        StateValue::Array(items) if items.is_empty() => None,
        StateValue::Array(items) => match token.kind() {
            TokenKind::Index(index) => {
                let index = usize::try_from(*index).ok()?;
                items.get(index).map(|child| (Step::Index(index), child))
            }
            TokenKind::Match { prop, value } => items
                .iter()
                .enumerate()
                .find(|(_, item)| {
                    item.get(prop)
                        .and_then(StateValue::stringify_scalar)
                        .is_some_and(|s| s == *value)
                })
                .map(|(index, child)| (Step::Index(index), child)),
            TokenKind::Key => {
                log::error!(
                    "Invalid array entry selector \"{}\" in \"{}\": array entries must be selected with \"[index]\" or \"[propName=propValue]\" (propValue URL encoded)",
                    token,
                    path
                );
                None
            }
            TokenKind::Invalid(reason) => {
                log::error!(
                    "Invalid array entry selector \"{}\" in \"{}\": {}",
                    token,
                    path,
                    reason
                );
                None
            }
        },
        _ => None,
    }
}

/// Copy-on-write replacement of the node at the end of `steps`.
///
/// Only the containers along the route are copied; every sibling keeps its
/// existing allocation. `None` if `steps` do not fit `node`.
pub(crate) fn rebuild<F>(node: &StateValue, steps: &[Step], replace: F) -> Option<StateValue>
where
    F: FnOnce(&StateValue) -> StateValue,
{
    let Some((step, rest)) = steps.split_first() else {
        return Some(replace(node));
    };

    match (node, step) {
        (StateValue::Object(map), Step::Key(key)) => {
            let child = rebuild(map.get(key)?, rest, replace)?;
            let mut map = (**map).clone();
            map.insert(key.clone(), child);
            Some(StateValue::Object(Arc::new(map)))
        }
        (StateValue::Array(items), Step::Index(index)) => {
            let child = rebuild(items.get(*index)?, rest, replace)?;
            let mut items = (**items).clone();
            items[*index] = child;
            Some(StateValue::Array(Arc::new(items)))
        }
        _ => None,
    }
}
