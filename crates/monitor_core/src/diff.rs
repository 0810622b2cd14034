use crate::EndpointSet;

/// Endpoints present in `new` but not in `old`.
pub fn diff(old: &EndpointSet, new: &EndpointSet) -> EndpointSet {
    new.difference(old)
}

/// State to store after a run: `old` plus whatever `new` added to it.
///
/// Never drops an entry of `old`, so stored state only grows.
pub fn merge(old: &EndpointSet, new: &EndpointSet) -> EndpointSet {
    old.union(&diff(old, new))
}
