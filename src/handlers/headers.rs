//! `header`: response header manipulation.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::directives::Helper;
use crate::error::CompileResult;
use crate::modules::MiddlewareHandler;

/// Header operations applied to one side of the exchange.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeaderOps {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub add: BTreeMap<String, Vec<String>>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub set: BTreeMap<String, Vec<String>>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub delete: Vec<String>,
}

impl HeaderOps {
    fn is_empty(&self) -> bool {
        self.add.is_empty() && self.set.is_empty() && self.delete.is_empty()
    }
}

/// Handler that modifies response headers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Headers {
    pub response: HeaderOps,
}

/// header [<matcher>] [[+|-]<field> [<value>]] {
///     [+|-]<field> [<value>]
/// }
pub fn parse_header(h: &mut Helper<'_>) -> CompileResult<Box<dyn MiddlewareHandler>> {
    let mut ops = HeaderOps::default();
    if !h.next() {
        return Err(h.arg_err());
    }

    if h.next_arg() {
        apply_field(h, &mut ops)?;
    }
    while h.next_block(0) {
        apply_field(h, &mut ops)?;
    }

    if ops.is_empty() {
        return Err(h.arg_err());
    }
    Ok(Box::new(Headers { response: ops }))
}

/// The cursor sits on a field name; its value, if any, follows.
fn apply_field(h: &mut Helper<'_>, ops: &mut HeaderOps) -> CompileResult<()> {
    let field = h.val().to_string();
    let args = h.remaining_args();

    if let Some(name) = field.strip_prefix('-') {
        if !args.is_empty() {
            return Err(h.arg_err());
        }
        ops.delete.push(name.to_string());
        return Ok(());
    }

    let [value] = args.as_slice() else {
        return Err(h.arg_err());
    };
    match field.strip_prefix('+') {
        Some(name) => ops.add.entry(name.to_string()).or_default().push(value.clone()),
        None => ops.set.entry(field).or_default().push(value.clone()),
    }
    Ok(())
}
