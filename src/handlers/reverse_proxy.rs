//! `reverse_proxy`: upstream configuration.

use serde::Serialize;

use crate::directives::Helper;
use crate::error::CompileResult;
use crate::modules::MiddlewareHandler;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Upstream {
    /// Network address to dial, always with a port.
    pub dial: String,
}

/// Handler that proxies requests to one of its upstreams.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReverseProxy {
    pub upstreams: Vec<Upstream>,
}

/// Turn an upstream argument into a dial address.
fn upstream(h: &Helper<'_>, arg: &str) -> CompileResult<Upstream> {
    if arg.starts_with("https://") {
        return Err(h.errf(format!("upstream {arg}: https upstreams are not supported")));
    }
    let addr = arg.strip_prefix("http://").unwrap_or(arg);
    if addr.is_empty() || addr.contains('/') {
        return Err(h.errf(format!("upstream {arg}: expected host[:port]")));
    }

    let has_port = match addr.rfind(']') {
        // [ipv6]:port
        Some(end) => addr[end..].contains(':'),
        None => addr.contains(':'),
    };
    let dial = if has_port {
        addr.to_string()
    } else {
        format!("{addr}:80")
    };
    Ok(Upstream { dial })
}

/// reverse_proxy [<matcher>] [<upstreams...>] {
///     to <upstreams...>
/// }
pub fn parse_reverse_proxy(h: &mut Helper<'_>) -> CompileResult<Box<dyn MiddlewareHandler>> {
    let mut proxy = ReverseProxy::default();
    if !h.next() {
        return Err(h.arg_err());
    }

    for arg in h.remaining_args() {
        proxy.upstreams.push(upstream(h, &arg)?);
    }

    while h.next_block(0) {
        match h.val() {
            "to" => {
                let args = h.remaining_args();
                if args.is_empty() {
                    return Err(h.arg_err());
                }
                for arg in args {
                    proxy.upstreams.push(upstream(h, &arg)?);
                }
            }
            other => {
                let message = format!("unrecognized subdirective '{other}'");
                return Err(h.errf(message));
            }
        }
    }

    if proxy.upstreams.is_empty() {
        return Err(h.errf("no upstreams specified"));
    }
    Ok(Box::new(proxy))
}

#[cfg(test)]
mod tests {
    use crate::handlers::testing::compile_routes;
    use serde_json::json;

    #[test]
    fn test_inline_upstreams() {
        let routes = compile_routes(&["reverse_proxy /api/* http://app:9000 localhost"]).unwrap();
        assert_eq!(routes[0].matcher_sets[0]["path"], json!(["/api/*"]));
        assert_eq!(
            routes[0].handlers[0],
            json!({
                "handler": "reverse_proxy",
                "upstreams": [{"dial": "app:9000"}, {"dial": "localhost:80"}]
            })
        );
    }

    #[test]
    fn test_to_subdirective_and_ipv6() {
        let routes = compile_routes(&["reverse_proxy {", "to [::1]:8080 [::2]", "}"]).unwrap();
        assert_eq!(
            routes[0].handlers[0]["upstreams"],
            json!([{"dial": "[::1]:8080"}, {"dial": "[::2]:80"}])
        );
    }

    #[test]
    fn test_missing_upstreams() {
        let err = compile_routes(&["reverse_proxy"]).unwrap_err();
        assert!(err.to_string().contains("no upstreams specified"));
    }

    #[test]
    fn test_unknown_subdirective() {
        let err = compile_routes(&["reverse_proxy app:80 {", "lb_policy random", "}"]).unwrap_err();
        assert!(err.to_string().contains("unrecognized subdirective 'lb_policy'"));
        assert_eq!(err.line(), 2);
    }

    #[test]
    fn test_rejects_paths_and_tls() {
        assert!(compile_routes(&["reverse_proxy * app:80/base"]).is_err());
        assert!(compile_routes(&["reverse_proxy https://app"]).is_err());
    }
}
