//! Directive priority and route ordering.
//!
//! # Ordering Rules
//! 1. Position of the originating directive in [`DIRECTIVE_ORDER`]; directives
//!    missing from the table come after all listed ones.
//! 2. Among routes of the same directive that each have exactly one matcher
//!    set with exactly one path pattern, the longer path goes first.
//!
//! Everything else keeps its declaration order. That stability is the only
//! tie-breaker users have, so both passes are stable sorts over total orders.

use std::collections::HashMap;

use serde::Deserialize;

use crate::directives::value::ConfigValue;

/// Order in which directives are applied in HTTP routes.
pub const DIRECTIVE_ORDER: &[&str] = &[
    "redir",
    "rewrite",
    "root",
    "strip_prefix",
    "strip_suffix",
    "uri_replace",
    "try_files",
    "basicauth",
    "header",
    "request_header",
    "encode",
    "templates",
    "handle",
    "route",
    "respond",
    "reverse_proxy",
    "php_fastcgi",
    "file_server",
];

/// True if `directive` has a fixed position in the route order.
pub fn directive_is_ordered(directive: &str) -> bool {
    DIRECTIVE_ORDER.contains(&directive)
}

/// Sort key of a directive. Unlisted directives share the lowest priority.
pub fn directive_priority(directive: &str) -> usize {
    DIRECTIVE_ORDER
        .iter()
        .position(|d| *d == directive)
        .unwrap_or(DIRECTIVE_ORDER.len())
}

/// Length of the route's only path pattern, if it has exactly one matcher set
/// holding exactly one path. Undecodable paths are not comparable.
fn single_path_len(value: &ConfigValue) -> Option<usize> {
    let route = value.payload.as_route()?;
    let [set] = route.matcher_sets.as_slice() else {
        return None;
    };
    let paths = Vec::<String>::deserialize(set.get("path")?).ok()?;
    match paths.as_slice() {
        [path] => Some(path.len()),
        _ => None,
    }
}

/// Put the routes of one server block into serve-time order.
pub(crate) fn sort_routes(routes: &mut Vec<ConfigValue>) {
    routes.sort_by_key(|v| directive_priority(v.directive()));

    // decode each path matcher once
    let path_lens: Vec<Option<usize>> = routes.iter().map(single_path_len).collect();

    let mut comparable: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, value) in routes.iter().enumerate() {
        if path_lens[i].is_some() {
            comparable.entry(value.directive()).or_default().push(i);
        }
    }

    // reorder comparable routes among the slots they already occupy, so
    // routes without a single path never move relative to their neighbours
    let mut permutation: Vec<usize> = (0..routes.len()).collect();
    for slots in comparable.values().filter(|slots| slots.len() > 1) {
        let mut by_length = slots.clone();
        by_length.sort_by(|a, b| path_lens[*b].cmp(&path_lens[*a]));
        for (slot, source) in slots.iter().zip(by_length) {
            permutation[*slot] = source;
        }
    }

    let mut taken: Vec<Option<ConfigValue>> = std::mem::take(routes).into_iter().map(Some).collect();
    *routes = permutation
        .into_iter()
        .filter_map(|source| taken[source].take())
        .collect();
}
