//! Compilation pass.
//!
//! # Data Flow
//! ```text
//! CompileInput (server blocks, global options, matcher aliases)
//!     → per block: collect @matcher definitions
//!     → per segment, in source order: registry lookup → unmarshaler → Pile
//!     → sort the block's routes
//!     → Compiled (ordered routes, bind hosts, other values, warnings)
//!     → assemble.rs (serializable app config for the restart controller)
//! ```
//!
//! # Design Decisions
//! - Single-threaded and synchronous: later directives may rely on what
//!   earlier ones left behind
//! - Each call to `compile` gets its own warnings ledger and group counter,
//!   so concurrent passes never share mutable state
//! - Any fatal error discards the whole pass

pub mod assemble;

use std::time::Instant;

use crate::directives::order::sort_routes;
use crate::directives::value::Source;
use crate::directives::{
    BlockContext, DirectiveRegistry, Options, PassState, Payload, Pile, Route, Warning, BIND_CLASS,
    ROUTE_CLASS,
};
use crate::error::CompileResult;
use crate::matchers::{collect_definitions, is_matcher_definition, MatcherDefs};
use crate::modules::ModuleTable;
use crate::observability::metrics;
use crate::tokens::{AdapterInput, ServerBlock};

pub use assemble::{AppConfig, HttpApp, HttpServer};

/// Everything one compilation pass consumes.
#[derive(Debug, Clone, Default)]
pub struct CompileInput {
    pub server_blocks: Vec<ServerBlock>,

    /// Global options, readable by every directive.
    pub options: Options,

    /// Matcher aliases resolved before this pass. Definitions inside a server
    /// block take precedence within that block.
    pub matcher_defs: MatcherDefs,
}

impl CompileInput {
    pub fn new(server_blocks: Vec<ServerBlock>) -> Self {
        Self {
            server_blocks,
            ..Self::default()
        }
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn with_matcher_defs(mut self, matcher_defs: MatcherDefs) -> Self {
        self.matcher_defs = matcher_defs;
        self
    }
}

impl From<AdapterInput> for CompileInput {
    fn from(input: AdapterInput) -> Self {
        Self::new(input.server_blocks)
    }
}

/// Compiled output of one server block.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledServer {
    pub keys: Vec<String>,

    /// Hosts requested by `bind`; empty means all interfaces.
    pub bind_hosts: Vec<String>,

    /// Routes in serve-time order.
    pub routes: Vec<Route>,

    /// Values of every other class, for the rest of the app config.
    pub pile: Pile,
}

/// Result of a successful compilation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    pub servers: Vec<CompiledServer>,
    pub warnings: Vec<Warning>,
    pub options: Options,
}

impl Compiled {
    pub fn route_count(&self) -> usize {
        self.servers.iter().map(|s| s.routes.len()).sum()
    }
}

/// Compiles server blocks with a given set of directives and modules.
#[derive(Debug, Clone, Copy)]
pub struct Compiler<'r> {
    registry: &'r DirectiveRegistry,
    modules: &'r ModuleTable,
}

impl<'r> Compiler<'r> {
    pub fn new(registry: &'r DirectiveRegistry, modules: &'r ModuleTable) -> Self {
        Self { registry, modules }
    }

    /// Compiler over the process-wide registry and module table, once both
    /// have been installed.
    pub fn global() -> Option<Compiler<'static>> {
        Some(Compiler::new(DirectiveRegistry::global()?, ModuleTable::global()?))
    }

    /// Run one full compilation pass.
    pub fn compile(&self, input: &CompileInput) -> CompileResult<Compiled> {
        let started = Instant::now();
        let result = self.run(input);

        match &result {
            Ok(compiled) => {
                metrics::record_pass(true);
                metrics::record_warnings(compiled.warnings.len());
                metrics::record_routes(compiled.route_count());
                tracing::info!(
                    servers = compiled.servers.len(),
                    routes = compiled.route_count(),
                    warnings = compiled.warnings.len(),
                    elapsed_us = started.elapsed().as_micros() as u64,
                    "Compilation pass complete"
                );
            }
            Err(e) => {
                metrics::record_pass(false);
                tracing::error!(file = %e.file(), line = e.line(), error = %e, "Compilation pass failed");
            }
        }
        result
    }

    fn run(&self, input: &CompileInput) -> CompileResult<Compiled> {
        let mut state = PassState::default();
        let mut servers = Vec::with_capacity(input.server_blocks.len());
        for block in &input.server_blocks {
            servers.push(self.compile_block(block, input, &mut state)?);
        }
        Ok(Compiled {
            servers,
            warnings: state.warnings,
            options: input.options.clone(),
        })
    }

    fn compile_block(
        &self,
        block: &ServerBlock,
        input: &CompileInput,
        state: &mut PassState,
    ) -> CompileResult<CompiledServer> {
        let mut matcher_defs = input.matcher_defs.clone();
        matcher_defs.extend(collect_definitions(block)?);

        let ctx = BlockContext {
            options: &input.options,
            matcher_defs: &matcher_defs,
            parent_block: block,
            registry: self.registry,
            modules: self.modules,
        };

        let mut pile = Pile::new();
        for segment in block.segments.iter().filter(|s| !is_matcher_definition(s)) {
            pile.extend(ctx.invoke(segment.clone(), state)?);
        }

        let mut route_values = pile.take(ROUTE_CLASS);
        sort_routes(&mut route_values);

        let mut routes = Vec::with_capacity(route_values.len());
        for value in route_values {
            match value.payload {
                Payload::Route(route) => routes.push(route),
                _ => state.warnings.push(class_mismatch(&value.source, ROUTE_CLASS)),
            }
        }

        let mut bind_hosts = Vec::new();
        for value in pile.take(BIND_CLASS) {
            match value.payload {
                Payload::BindAddresses(hosts) => bind_hosts.extend(hosts),
                _ => state.warnings.push(class_mismatch(&value.source, BIND_CLASS)),
            }
        }

        tracing::debug!(
            keys = ?block.keys,
            routes = routes.len(),
            bind_hosts = bind_hosts.len(),
            "Server block compiled"
        );
        Ok(CompiledServer {
            keys: block.keys.clone(),
            bind_hosts,
            routes,
            pile,
        })
    }
}

fn class_mismatch(source: &Source, class: &str) -> Warning {
    let warning = Warning {
        file: source.file.clone(),
        line: source.line,
        directive: Some(source.directive.clone()),
        message: format!("value of class '{class}' has an unexpected payload; dropped"),
    };
    tracing::warn!(file = %warning.file, line = warning.line, message = %warning.message, "Compilation warning");
    warning
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directives::ConfigValue;
    use crate::error::CompileError;
    use crate::handlers::testing::segment;
    use serde_json::json;

    fn block(segments: Vec<Vec<&str>>) -> ServerBlock {
        ServerBlock::new(
            vec![":8080".into()],
            segments.iter().map(|lines| segment(lines)).collect(),
        )
    }

    fn handler_names(server: &CompiledServer) -> Vec<String> {
        server
            .routes
            .iter()
            .map(|r| r.handlers[0]["handler"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn test_unknown_directive_is_fatal() {
        let registry = DirectiveRegistry::with_builtins();
        let modules = ModuleTable::with_builtins();
        let input = CompileInput::new(vec![block(vec![vec!["file_server"], vec!["teleport now"]])]);

        let err = Compiler::new(&registry, &modules).compile(&input).unwrap_err();
        assert!(matches!(err, CompileError::UnknownDirective { ref directive, .. } if directive == "teleport"));
    }

    #[test]
    fn test_routes_sorted_by_directive_priority() {
        let registry = DirectiveRegistry::with_builtins();
        let modules = ModuleTable::with_builtins();
        let input = CompileInput::new(vec![block(vec![
            vec!["file_server"],
            vec!["reverse_proxy /api/* app:9000"],
            vec!["root * /srv"],
            vec!["redir /old /new"],
        ])]);

        let compiled = Compiler::new(&registry, &modules).compile(&input).unwrap();
        assert_eq!(
            handler_names(&compiled.servers[0]),
            vec!["static_response", "vars", "reverse_proxy", "file_server"]
        );
    }

    #[test]
    fn test_block_matcher_definitions_override_input() {
        let registry = DirectiveRegistry::with_builtins();
        let modules = ModuleTable::with_builtins();

        let mut defs = MatcherDefs::new();
        let mut outer = crate::matchers::MatcherSet::new();
        outer.insert("path".into(), json!(["/outer"]));
        defs.insert("api".into(), outer.clone());
        defs.insert("kept".into(), outer);

        let input = CompileInput::new(vec![block(vec![
            vec!["@api path /inner/*"],
            vec!["respond @api inner"],
            vec!["reverse_proxy @kept app:80"],
        ])])
        .with_matcher_defs(defs);

        let compiled = Compiler::new(&registry, &modules).compile(&input).unwrap();
        let routes = &compiled.servers[0].routes;
        assert_eq!(routes[0].matcher_sets[0]["path"], json!(["/inner/*"]));
        assert_eq!(routes[1].matcher_sets[0]["path"], json!(["/outer"]));
    }

    #[test]
    fn test_group_labels_unique_across_blocks() {
        let registry = DirectiveRegistry::with_builtins();
        let modules = ModuleTable::with_builtins();
        let input = CompileInput::new(vec![
            block(vec![vec!["try_files {path} /index.html"]]),
            block(vec![vec!["try_files {path} {path}/ /index.php"]]),
        ]);

        let compiled = Compiler::new(&registry, &modules).compile(&input).unwrap();
        assert_eq!(compiled.servers[0].routes[0].group.as_deref(), Some("group0"));
        assert_eq!(compiled.servers[1].routes[0].group.as_deref(), Some("group1"));
        assert!(compiled.servers[1].routes.iter().all(|r| r.group.as_deref() == Some("group1")));
    }

    #[test]
    fn test_each_pass_starts_fresh() {
        let registry = DirectiveRegistry::with_builtins();
        let modules = ModuleTable::with_builtins();
        let input = CompileInput::new(vec![block(vec![vec!["try_files {path} /index.html"]])]);
        let compiler = Compiler::new(&registry, &modules);

        let first = compiler.compile(&input).unwrap();
        let second = compiler.compile(&input).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_mismatched_payload_is_warning() {
        let mut registry = DirectiveRegistry::new();
        registry.register("confused", |_h| {
            Ok(vec![ConfigValue::new(ROUTE_CLASS, Payload::Json(json!("not a route")))])
        });
        let modules = ModuleTable::new();
        let input = CompileInput::new(vec![block(vec![vec!["confused"]])]);

        let compiled = Compiler::new(&registry, &modules).compile(&input).unwrap();
        assert!(compiled.servers[0].routes.is_empty());
        assert_eq!(compiled.warnings.len(), 1);
        assert_eq!(compiled.warnings[0].directive.as_deref(), Some("confused"));
    }

    #[test]
    fn test_other_classes_stay_in_pile() {
        let mut registry = DirectiveRegistry::new();
        registry.register("tls_email", |h| {
            h.next();
            let args = h.remaining_args();
            Ok(vec![ConfigValue::new("tls.email", Payload::Json(json!(args)))])
        });
        let modules = ModuleTable::new();
        let input = CompileInput::new(vec![block(vec![vec!["tls_email ops@example.com"]])]);

        let compiled = Compiler::new(&registry, &modules).compile(&input).unwrap();
        let values = compiled.servers[0].pile.get("tls.email");
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].payload, Payload::Json(json!(["ops@example.com"])));
    }
}
