//! Settings schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::directives::Options;
use crate::matchers::{MatcherDefs, MatcherSet};

/// Root settings for the compiler.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct CompilerSettings {
    /// Global options, visible to every directive through `Helper::option`.
    pub options: BTreeMap<String, Value>,

    /// Matcher aliases available to every server block, keyed by name and
    /// then by matcher kind.
    pub matchers: BTreeMap<String, BTreeMap<String, Vec<String>>>,

    pub logging: LoggingSettings,

    pub output: OutputSettings,
}

impl CompilerSettings {
    pub fn options(&self) -> Options {
        self.options.clone()
    }

    /// Matcher aliases in the form the compiler resolves `@name` against.
    pub fn matcher_defs(&self) -> MatcherDefs {
        self.matchers
            .iter()
            .map(|(name, kinds)| {
                let set: MatcherSet = kinds
                    .iter()
                    .map(|(kind, args)| (kind.clone(), Value::from(args.clone())))
                    .collect();
                (name.clone(), set)
            })
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    /// Level for this crate's events when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct OutputSettings {
    /// Where `watch` writes each applied config. Required for `watch`.
    pub path: Option<PathBuf>,
}
