//! Config values produced by directives and the per-block pile they land in.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::matchers::MatcherSet;

/// Class of values that become HTTP routes.
pub const ROUTE_CLASS: &str = "route";

/// Class of values that request listener bind addresses.
pub const BIND_CLASS: &str = "bind";

/// An HTTP route: matcher sets plus the handlers to run when any set matches.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Route {
    /// Routes sharing a group are mutually exclusive at serve time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    /// Empty means the route matches every request.
    #[serde(rename = "match", default, skip_serializing_if = "Vec::is_empty")]
    pub matcher_sets: Vec<MatcherSet>,

    /// Serialized handler module objects, in execution order.
    #[serde(rename = "handle", default, skip_serializing_if = "Vec::is_empty")]
    pub handlers: Vec<Value>,
}

impl Route {
    pub fn is_catch_all(&self) -> bool {
        self.matcher_sets.is_empty()
    }
}

/// Payload of a [`ConfigValue`]. The class label says which variant to expect,
/// but consumers must check.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Route(Route),
    BindAddresses(Vec<String>),
    /// Anything else a directive wants to hand to the final assembly.
    Json(Value),
}

impl Payload {
    pub fn as_route(&self) -> Option<&Route> {
        match self {
            Payload::Route(route) => Some(route),
            _ => None,
        }
    }

    pub fn as_route_mut(&mut self) -> Option<&mut Route> {
        match self {
            Payload::Route(route) => Some(route),
            _ => None,
        }
    }

    pub fn as_bind_addresses(&self) -> Option<&[String]> {
        match self {
            Payload::BindAddresses(addrs) => Some(addrs),
            _ => None,
        }
    }
}

/// Where a value came from. Only the compiler fills this in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Source {
    pub(crate) directive: String,
    pub(crate) file: String,
    pub(crate) line: usize,
}

/// A value to be placed into, or consulted while building, the final config.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValue {
    /// Decides how the assembler interprets `payload`, e.g. "route" or "bind".
    pub class: String,

    pub payload: Payload,

    pub(crate) source: Source,
}

impl ConfigValue {
    pub fn new(class: impl Into<String>, payload: Payload) -> Self {
        Self {
            class: class.into(),
            payload,
            source: Source::default(),
        }
    }

    /// A value of class "route".
    pub fn route(route: Route) -> Self {
        Self::new(ROUTE_CLASS, Payload::Route(route))
    }

    pub(crate) fn directive(&self) -> &str {
        &self.source.directive
    }
}

/// Config values of one server block, keyed by class.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pile {
    values: BTreeMap<String, Vec<ConfigValue>>,
}

impl Pile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: ConfigValue) {
        self.values.entry(value.class.clone()).or_default().push(value);
    }

    pub fn get(&self, class: &str) -> &[ConfigValue] {
        self.values.get(class).map_or(&[], Vec::as_slice)
    }

    /// Remove and return every value of `class`, in insertion order.
    pub fn take(&mut self, class: &str) -> Vec<ConfigValue> {
        self.values.remove(class).unwrap_or_default()
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.values().all(Vec::is_empty)
    }
}

impl Extend<ConfigValue> for Pile {
    fn extend<I: IntoIterator<Item = ConfigValue>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_route_serialization_uses_wire_names() {
        let mut set = MatcherSet::new();
        set.insert("path".into(), json!(["/api/*"]));
        let route = Route {
            group: Some("group0".into()),
            matcher_sets: vec![set],
            handlers: vec![json!({"handler": "reverse_proxy"})],
        };
        assert_eq!(
            serde_json::to_value(&route).unwrap(),
            json!({
                "group": "group0",
                "match": [{"path": ["/api/*"]}],
                "handle": [{"handler": "reverse_proxy"}]
            })
        );
    }

    #[test]
    fn test_catch_all_route_omits_match() {
        let route = Route::default();
        assert!(route.is_catch_all());
        assert_eq!(serde_json::to_value(&route).unwrap(), json!({}));
    }

    #[test]
    fn test_pile_keys_by_class() {
        let mut pile = Pile::new();
        pile.extend([
            ConfigValue::route(Route::default()),
            ConfigValue::new(BIND_CLASS, Payload::BindAddresses(vec!["127.0.0.1".into()])),
            ConfigValue::route(Route::default()),
        ]);
        assert_eq!(pile.get(ROUTE_CLASS).len(), 2);
        assert_eq!(pile.classes().collect::<Vec<_>>(), vec![BIND_CLASS, ROUTE_CLASS]);

        let routes = pile.take(ROUTE_CLASS);
        assert_eq!(routes.len(), 2);
        assert!(pile.get(ROUTE_CLASS).is_empty());
        assert!(!pile.is_empty());
    }

    #[test]
    fn test_payload_accessors_check_variant() {
        let bind = Payload::BindAddresses(vec!["::1".into()]);
        assert!(bind.as_route().is_none());
        assert_eq!(bind.as_bind_addresses(), Some(&["::1".to_string()][..]));
    }
}
