//! Built-in directives and the handler configs they produce.
//!
//! # Data Flow
//! ```text
//! handler directive tokens
//!     → parse_* (builds a handler config struct)
//!     → registry wrapper (matcher + route)
//!
//! general directive tokens (bind, try_files)
//!     → parse_* (builds ConfigValues directly)
//! ```
//!
//! # Design Decisions
//! - Only the config shape of each handler is modelled; serving them is the
//!   runtime's job
//! - Handler structs serialize to the exact JSON the runtime expects, minus
//!   the `handler` field which the compiler adds from the module table

pub mod bind;
pub mod file_server;
pub mod headers;
pub mod reverse_proxy;
pub mod rewrite;
pub mod static_response;
pub mod subroute;
pub mod vars;

use crate::directives::DirectiveRegistry;
use crate::modules::ModuleTable;

pub use file_server::FileServer;
pub use headers::Headers;
pub use reverse_proxy::ReverseProxy;
pub use rewrite::Rewrite;
pub use static_response::StaticResponse;
pub use subroute::Subroute;
pub use vars::Vars;

/// Register every built-in directive.
pub fn register_directives(registry: &mut DirectiveRegistry) {
    registry.register("bind", bind::parse_bind);
    registry.register("try_files", rewrite::parse_try_files);

    registry.register_handler_directive("redir", static_response::parse_redir);
    registry.register_handler_directive("respond", static_response::parse_respond);
    registry.register_handler_directive("rewrite", rewrite::parse_rewrite);
    registry.register_handler_directive("strip_prefix", rewrite::parse_strip_prefix);
    registry.register_handler_directive("strip_suffix", rewrite::parse_strip_suffix);
    registry.register_handler_directive("root", vars::parse_root);
    registry.register_handler_directive("header", headers::parse_header);
    registry.register_handler_directive("reverse_proxy", reverse_proxy::parse_reverse_proxy);
    registry.register_handler_directive("file_server", file_server::parse_file_server);
    registry.register_handler_directive("route", subroute::parse_route);
}

/// Register the module identity of every built-in handler.
pub fn register_modules(table: &mut ModuleTable) {
    table.register::<StaticResponse>("http.handlers.static_response");
    table.register::<Rewrite>("http.handlers.rewrite");
    table.register::<Vars>("http.handlers.vars");
    table.register::<Headers>("http.handlers.headers");
    table.register::<ReverseProxy>("http.handlers.reverse_proxy");
    table.register::<FileServer>("http.handlers.file_server");
    table.register::<Subroute>("http.handlers.subroute");
}

#[cfg(test)]
pub(crate) mod testing {
    //! Compile single directives against the built-in registry.

    use crate::compiler::{CompileInput, Compiler};
    use crate::directives::{DirectiveRegistry, Route};
    use crate::error::CompileResult;
    use crate::modules::ModuleTable;
    use crate::tokens::{ServerBlock, Token};

    /// Tokens for a directive written one line per entry.
    pub(crate) fn segment(lines: &[&str]) -> Vec<Token> {
        lines
            .iter()
            .enumerate()
            .flat_map(|(i, text)| {
                text.split_whitespace()
                    .map(move |t| Token::new("Caddyfile", i + 1, t))
            })
            .collect()
    }

    /// Compile one directive and return the resulting routes.
    pub(crate) fn compile_routes(lines: &[&str]) -> CompileResult<Vec<Route>> {
        let registry = DirectiveRegistry::with_builtins();
        let modules = ModuleTable::with_builtins();
        let input = CompileInput::new(vec![ServerBlock::new(
            vec![":8080".into()],
            vec![segment(lines)],
        )]);
        let compiled = Compiler::new(&registry, &modules).compile(&input)?;
        Ok(compiled.servers.into_iter().flat_map(|s| s.routes).collect())
    }
}
