//! Request matcher references.
//!
//! # Data Flow
//! ```text
//! "@name" segments in a server block
//!     → definitions.rs (named MatcherSets, layered over pre-resolved aliases)
//!
//! first argument of a handler directive
//!     → from_token()
//!     → Absent | CatchAll | Set(MatcherSet)
//! ```
//!
//! # Design Decisions
//! - Only the serialized config of matchers lives here, never their logic
//! - `*` (explicit catch-all) and "no matcher token" stay distinguishable
//! - A path shorthand always becomes a single-pattern `path` matcher

pub mod definitions;

use std::collections::{BTreeMap, HashMap};

use serde_json::{json, Value};

use crate::error::{CompileError, CompileResult};
use crate::tokens::Token;

pub use definitions::{collect_definitions, is_matcher_definition, parse_definition};

/// Matcher kind (e.g. "path", "host") → serialized matcher config.
/// Every matcher in a set must match for the set to match.
pub type MatcherSet = BTreeMap<String, Value>;

/// Named matcher definitions, without the `@` prefix.
pub type MatcherDefs = HashMap<String, MatcherSet>;

/// What the first argument of a directive says about request matching.
#[derive(Debug, Clone, PartialEq)]
pub enum MatcherToken {
    /// The argument is not a matcher; the route implicitly matches everything.
    Absent,
    /// `*`: the route explicitly matches everything.
    CatchAll,
    /// A path shorthand or a reference to a named matcher.
    Set(MatcherSet),
}

impl MatcherToken {
    /// True if the token was a matcher and must be consumed.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, MatcherToken::Absent)
    }

    /// Matcher set to attach to a route; `None` matches everything.
    pub fn into_set(self) -> Option<MatcherSet> {
        match self {
            MatcherToken::Set(set) => Some(set),
            MatcherToken::Absent | MatcherToken::CatchAll => None,
        }
    }
}

/// Interpret a single token as a matcher reference.
pub fn from_token(token: &Token, defs: &MatcherDefs) -> CompileResult<MatcherToken> {
    let text = token.text.as_str();
    if text == "*" {
        return Ok(MatcherToken::CatchAll);
    }
    if text.starts_with('/') {
        let mut set = MatcherSet::new();
        set.insert("path".to_string(), json!([text]));
        return Ok(MatcherToken::Set(set));
    }
    if let Some(name) = text.strip_prefix('@') {
        if name.is_empty() {
            return Err(CompileError::MalformedMatcher {
                file: token.file.clone(),
                line: token.line,
                message: "matcher name missing after '@'".to_string(),
            });
        }
        return match defs.get(name) {
            Some(set) => Ok(MatcherToken::Set(set.clone())),
            None => Err(CompileError::UnknownMatcher {
                file: token.file.clone(),
                line: token.line,
                name: name.to_string(),
            }),
        };
    }
    Ok(MatcherToken::Absent)
}
