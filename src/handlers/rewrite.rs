//! URI rewriting: `rewrite`, `strip_prefix`, `strip_suffix` and `try_files`.

use serde::Serialize;
use serde_json::json;

use crate::directives::{ConfigValue, Helper};
use crate::error::CompileResult;
use crate::modules::MiddlewareHandler;

/// Handler that changes the request URI before later handlers see it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Rewrite {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub strip_path_prefix: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub strip_path_suffix: Option<String>,
}

/// Consume the directive name and exactly one argument.
fn single_arg(h: &mut Helper<'_>) -> CompileResult<String> {
    if !h.next() {
        return Err(h.arg_err());
    }
    let args = h.remaining_args();
    match args.as_slice() {
        [arg] => Ok(arg.clone()),
        _ => Err(h.arg_err()),
    }
}

/// rewrite [<matcher>] <to>
pub fn parse_rewrite(h: &mut Helper<'_>) -> CompileResult<Box<dyn MiddlewareHandler>> {
    let to = single_arg(h)?;
    Ok(Box::new(Rewrite {
        uri: Some(to),
        ..Rewrite::default()
    }))
}

/// strip_prefix [<matcher>] <prefix>
pub fn parse_strip_prefix(h: &mut Helper<'_>) -> CompileResult<Box<dyn MiddlewareHandler>> {
    let mut prefix = single_arg(h)?;
    if !prefix.starts_with('/') {
        prefix.insert(0, '/');
    }
    Ok(Box::new(Rewrite {
        strip_path_prefix: Some(prefix),
        ..Rewrite::default()
    }))
}

/// strip_suffix [<matcher>] <suffix>
pub fn parse_strip_suffix(h: &mut Helper<'_>) -> CompileResult<Box<dyn MiddlewareHandler>> {
    let suffix = single_arg(h)?;
    Ok(Box::new(Rewrite {
        strip_path_suffix: Some(suffix),
        ..Rewrite::default()
    }))
}

/// try_files [<matcher>] <files...>
///
/// One rewrite route per candidate, each guarded by a file-exists matcher.
/// The routes are grouped so only the first existing candidate applies.
pub fn parse_try_files(h: &mut Helper<'_>) -> CompileResult<Vec<ConfigValue>> {
    if !h.next() {
        return Err(h.arg_err());
    }
    let matcher = h.matcher_token()?;
    if matcher.is_recognized() {
        h.delete();
    }
    h.reset();
    h.next();

    let files = h.remaining_args();
    if files.is_empty() {
        return Err(h.arg_err());
    }

    let base = matcher.into_set().unwrap_or_default();
    let mut values = Vec::with_capacity(files.len());
    for file in files {
        let mut set = base.clone();
        set.insert("file".to_string(), json!({ "try_files": [file] }));
        let rewrite = Rewrite {
            uri: Some(file),
            ..Rewrite::default()
        };
        values.extend(h.new_route(Some(set), Box::new(rewrite)));
    }
    h.group_routes(&mut values);
    Ok(values)
}
