//! `bind`: listener host addresses.

use crate::directives::{ConfigValue, Helper};
use crate::error::CompileResult;

/// bind <hosts...>
pub fn parse_bind(h: &mut Helper<'_>) -> CompileResult<Vec<ConfigValue>> {
    if !h.next() {
        return Err(h.arg_err());
    }
    let hosts = h.remaining_args();
    if hosts.is_empty() {
        return Err(h.arg_err());
    }
    Ok(h.new_bind_addresses(hosts))
}
