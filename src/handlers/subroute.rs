//! `route`: a block of handler directives applied in the order written.

use serde::Serialize;

use crate::directives::{Helper, Payload, Route};
use crate::error::CompileResult;
use crate::modules::MiddlewareHandler;

/// Handler that runs its own list of routes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Subroute {
    pub routes: Vec<Route>,
}

/// route [<matcher>] {
///     <directives...>
/// }
///
/// Nested directives are compiled with the same registry but never sorted.
pub fn parse_route(h: &mut Helper<'_>) -> CompileResult<Box<dyn MiddlewareHandler>> {
    if !h.next() {
        return Err(h.arg_err());
    }
    if h.next_arg() {
        return Err(h.arg_err());
    }

    let mut subroute = Subroute::default();
    while h.next_block(0) {
        let segment = h.next_segment();
        for value in h.compile_nested(segment)? {
            match value.payload {
                Payload::Route(route) => subroute.routes.push(route),
                _ => {
                    let message = format!("'{}' values are not allowed inside route blocks", value.class);
                    return Err(h.errf(message));
                }
            }
        }
    }

    Ok(Box::new(subroute))
}

#[cfg(test)]
mod tests {
    use crate::error::CompileError;
    use crate::handlers::testing::compile_routes;
    use serde_json::json;

    #[test]
    fn test_route_keeps_literal_order() {
        let routes = compile_routes(&[
            "route /api/* {",
            "reverse_proxy app:9000",
            "strip_prefix * /api",
            "redir * /elsewhere",
            "}",
        ])
        .unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].matcher_sets[0]["path"], json!(["/api/*"]));

        let handler = &routes[0].handlers[0];
        assert_eq!(handler["handler"], json!("subroute"));
        let inner: Vec<&str> = handler["routes"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["handle"][0]["handler"].as_str().unwrap())
            .collect();
        assert_eq!(inner, vec!["reverse_proxy", "rewrite", "static_response"]);
    }

    #[test]
    fn test_route_nested_matchers() {
        let routes = compile_routes(&["route {", "respond /ping pong", "}"]).unwrap();
        let nested = &routes[0].handlers[0]["routes"][0];
        assert_eq!(nested["match"], json!([{"path": ["/ping"]}]));
        assert!(routes[0].is_catch_all());
    }

    #[test]
    fn test_route_rejects_non_route_values() {
        let err = compile_routes(&["route {", "bind 127.0.0.1", "}"]).unwrap_err();
        assert!(err.to_string().contains("not allowed inside route blocks"));
    }

    #[test]
    fn test_route_unknown_nested_directive() {
        let err = compile_routes(&["route {", "nonsense here", "}"]).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnknownDirective {
                file: "Caddyfile".into(),
                line: 2,
                directive: "nonsense".into()
            }
        );
    }
}
