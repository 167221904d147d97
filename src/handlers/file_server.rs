//! `file_server`: static files.

use serde::Serialize;

use crate::directives::Helper;
use crate::error::CompileResult;
use crate::modules::MiddlewareHandler;

/// Directory listing settings; present means enabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Browse {}

/// Handler that serves files from disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FileServer {
    /// Overrides the `root` variable when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hide: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub browse: Option<Browse>,
}

/// file_server [<matcher>] [browse] {
///     root <path>
///     hide <files...>
///     browse
/// }
pub fn parse_file_server(h: &mut Helper<'_>) -> CompileResult<Box<dyn MiddlewareHandler>> {
    let mut server = FileServer::default();
    if !h.next() {
        return Err(h.arg_err());
    }

    let args = h.remaining_args();
    match args.as_slice() {
        [] => {}
        [flag] if flag == "browse" => server.browse = Some(Browse::default()),
        _ => return Err(h.arg_err()),
    }

    while h.next_block(0) {
        match h.val() {
            "root" => {
                let args = h.remaining_args();
                let [root] = args.as_slice() else {
                    return Err(h.arg_err());
                };
                server.root = Some(root.clone());
            }
            "hide" => {
                let args = h.remaining_args();
                if args.is_empty() {
                    return Err(h.arg_err());
                }
                server.hide.extend(args);
            }
            "browse" => {
                if h.next_arg() {
                    return Err(h.arg_err());
                }
                server.browse = Some(Browse::default());
            }
            other => {
                let message = format!("unrecognized subdirective '{other}'");
                return Err(h.errf(message));
            }
        }
    }

    Ok(Box::new(server))
}

#[cfg(test)]
mod tests {
    use crate::handlers::testing::compile_routes;
    use serde_json::json;

    #[test]
    fn test_bare_file_server() {
        let routes = compile_routes(&["file_server"]).unwrap();
        assert!(routes[0].is_catch_all());
        assert_eq!(routes[0].handlers[0], json!({"handler": "file_server"}));
    }

    #[test]
    fn test_browse_and_block() {
        let routes = compile_routes(&[
            "file_server /downloads/* browse {",
            "root /srv/files",
            "hide .git .env",
            "}",
        ])
        .unwrap();
        assert_eq!(
            routes[0].handlers[0],
            json!({
                "handler": "file_server",
                "root": "/srv/files",
                "hide": [".git", ".env"],
                "browse": {}
            })
        );
    }

    #[test]
    fn test_unknown_flag() {
        assert!(compile_routes(&["file_server list"]).is_err());
    }
}
