//! `respond` and `redir`: fixed responses.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::directives::Helper;
use crate::error::CompileResult;
use crate::modules::MiddlewareHandler;

/// Handler that writes a fixed response.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StaticResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// Close the client connection after responding.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub close: bool,
}

fn looks_like_status(text: &str) -> bool {
    text.len() == 3 && text.bytes().all(|b| b.is_ascii_digit())
}

fn parse_status(h: &Helper<'_>, text: &str) -> CompileResult<u16> {
    match text.parse::<u16>() {
        Ok(code) if (100..=999).contains(&code) => Ok(code),
        _ => Err(h.errf(format!("bad status code '{text}'"))),
    }
}

/// respond [<matcher>] <status>|<body> [<status>] {
///     body <text>
///     close
/// }
pub fn parse_respond(h: &mut Helper<'_>) -> CompileResult<Box<dyn MiddlewareHandler>> {
    let mut response = StaticResponse::default();
    if !h.next() {
        return Err(h.arg_err());
    }

    let args = h.remaining_args();
    match args.as_slice() {
        [] => {}
        [only] if looks_like_status(only) => response.status_code = Some(parse_status(h, only)?),
        [body] => response.body = Some(body.clone()),
        [body, status] => {
            response.body = Some(body.clone());
            response.status_code = Some(parse_status(h, status)?);
        }
        _ => return Err(h.arg_err()),
    }

    while h.next_block(0) {
        match h.val() {
            "body" => {
                if response.body.is_some() {
                    return Err(h.errf("body already specified"));
                }
                let args = h.remaining_args();
                let [body] = args.as_slice() else {
                    return Err(h.arg_err());
                };
                response.body = Some(body.clone());
            }
            "close" => {
                if h.next_arg() {
                    return Err(h.arg_err());
                }
                response.close = true;
            }
            other => {
                let message = format!("unrecognized subdirective '{other}'");
                return Err(h.errf(message));
            }
        }
    }

    Ok(Box::new(response))
}

/// redir [<matcher>] <to> [<code>]
///
/// `code` is `temporary` (default, 302), `permanent` (301) or a 3xx status.
pub fn parse_redir(h: &mut Helper<'_>) -> CompileResult<Box<dyn MiddlewareHandler>> {
    if !h.next() {
        return Err(h.arg_err());
    }

    let args = h.remaining_args();
    let (to, code) = match args.as_slice() {
        [to] => (to.clone(), None),
        [to, code] => (to.clone(), Some(code.as_str())),
        _ => return Err(h.arg_err()),
    };

    let status = match code {
        None | Some("temporary") => 302,
        Some("permanent") => 301,
        Some(code) => match code.parse::<u16>() {
            Ok(status) if (300..=308).contains(&status) => status,
            _ => return Err(h.errf(format!("not a redirect status code: {code}"))),
        },
    };

    let mut headers = BTreeMap::new();
    headers.insert("Location".to_string(), vec![to]);
    Ok(Box::new(StaticResponse {
        status_code: Some(status),
        headers,
        body: None,
        close: false,
    }))
}
