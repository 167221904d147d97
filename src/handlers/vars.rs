//! `root`: sets the site root variable for later handlers.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::directives::Helper;
use crate::error::CompileResult;
use crate::modules::MiddlewareHandler;

/// Handler that sets request variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Vars(pub BTreeMap<String, String>);

/// root [<matcher>] <path>
pub fn parse_root(h: &mut Helper<'_>) -> CompileResult<Box<dyn MiddlewareHandler>> {
    if !h.next() {
        return Err(h.arg_err());
    }
    let args = h.remaining_args();
    let [root] = args.as_slice() else {
        return Err(h.arg_err());
    };

    let mut vars = BTreeMap::new();
    vars.insert("root".to_string(), root.clone());
    Ok(Box::new(Vars(vars)))
}
