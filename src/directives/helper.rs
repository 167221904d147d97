//! Per-directive compilation helper.
//!
//! A [`Helper`] is built for every directive occurrence. It owns a cursor over
//! that directive's tokens and borrows the state of the running pass: global
//! options, the warnings ledger, matcher definitions, the enclosing server
//! block and the group counter.

use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};

use serde::Serialize;
use serde_json::Value;

use crate::directives::registry::DirectiveRegistry;
use crate::directives::value::{ConfigValue, Payload, Route, Source, BIND_CLASS};
use crate::directives::warning::Warning;
use crate::error::{CompileError, CompileResult};
use crate::matchers::{self, MatcherDefs, MatcherSet, MatcherToken};
use crate::modules::{MiddlewareHandler, ModuleTable};
use crate::tokens::{Dispenser, Segment, ServerBlock};

/// Global options, e.g. `auto_https` or `http_port`.
pub type Options = BTreeMap<String, Value>;

/// Hands out unique group labels within one compilation pass.
#[derive(Debug, Default)]
pub struct GroupCounter {
    next: usize,
}

impl GroupCounter {
    pub fn next_group(&mut self) -> String {
        let name = format!("group{}", self.next);
        self.next += 1;
        name
    }
}

/// Mutable state scoped to a single compilation pass.
#[derive(Debug, Default)]
pub struct PassState {
    pub warnings: Vec<Warning>,
    pub groups: GroupCounter,
}

/// Read-only inputs shared by every directive in a server block.
#[derive(Clone, Copy)]
pub struct BlockContext<'a> {
    pub options: &'a Options,
    pub matcher_defs: &'a MatcherDefs,
    pub parent_block: &'a ServerBlock,
    pub registry: &'a DirectiveRegistry,
    pub modules: &'a ModuleTable,
}

impl<'a> BlockContext<'a> {
    /// Run the directive named by the segment's first token.
    pub(crate) fn invoke(
        self,
        segment: Segment,
        state: &mut PassState,
    ) -> CompileResult<Vec<ConfigValue>> {
        let Some(first) = segment.first().cloned() else {
            return Ok(Vec::new());
        };
        let Some(unmarshal) = self.registry.get(&first.text) else {
            return Err(CompileError::UnknownDirective {
                file: first.file,
                line: first.line,
                directive: first.text,
            });
        };

        let mut helper = Helper {
            dispenser: Dispenser::new(segment),
            ctx: self,
            state,
            directive: first.text.clone(),
        };
        let mut values = unmarshal(&mut helper)?;

        for value in &mut values {
            value.source = Source {
                directive: first.text.clone(),
                file: first.file.clone(),
                line: first.line,
            };
        }
        tracing::debug!(
            directive = %first.text,
            file = %first.file,
            line = first.line,
            values = values.len(),
            "Directive compiled"
        );
        Ok(values)
    }
}

/// Helps a directive turn its tokens into config values.
///
/// Derefs to the token [`Dispenser`], so `h.next()`, `h.val()` and friends
/// work directly on the helper.
pub struct Helper<'a> {
    dispenser: Dispenser,
    ctx: BlockContext<'a>,
    state: &'a mut PassState,
    directive: String,
}

impl<'a> Deref for Helper<'a> {
    type Target = Dispenser;

    fn deref(&self) -> &Dispenser {
        &self.dispenser
    }
}

impl<'a> DerefMut for Helper<'a> {
    fn deref_mut(&mut self) -> &mut Dispenser {
        &mut self.dispenser
    }
}

impl<'a> Helper<'a> {
    /// Global option keyed by `name`, if set.
    pub fn option(&self, name: &str) -> Option<&'a Value> {
        self.ctx.options.get(name)
    }

    /// Files that contributed tokens to the current server block.
    pub fn caddyfiles(&self) -> Vec<String> {
        self.ctx.parent_block.files()
    }

    /// Name of the directive being compiled.
    pub fn directive(&self) -> &str {
        &self.directive
    }

    /// Record a warning against the directive being compiled. The location is
    /// the directive name's token, wherever the cursor is.
    pub fn warn(&mut self, message: impl Into<String>) {
        let (file, line) = match self.dispenser.tokens().first() {
            Some(token) => (token.file.clone(), token.line),
            None => (self.dispenser.file().to_string(), self.dispenser.line()),
        };
        let warning = Warning {
            file,
            line,
            directive: Some(self.directive.clone()),
            message: message.into(),
        };
        tracing::warn!(
            file = %warning.file,
            line = warning.line,
            directive = %self.directive,
            message = %warning.message,
            "Compilation warning"
        );
        self.state.warnings.push(warning);
    }

    /// Serialize `val`. Failures become warnings and yield `None`.
    pub fn json<T: Serialize + ?Sized>(&mut self, val: &T) -> Option<Value> {
        match serde_json::to_value(val) {
            Ok(value) => Some(value),
            Err(e) => {
                self.warn(e.to_string());
                None
            }
        }
    }

    /// Treat the next argument as a possible matcher token. The cursor only
    /// moves if there is a next argument on this line.
    pub fn matcher_token(&mut self) -> CompileResult<MatcherToken> {
        if !self.dispenser.next_arg() {
            return Ok(MatcherToken::Absent);
        }
        match self.dispenser.token() {
            Some(token) => matchers::from_token(token, self.ctx.matcher_defs),
            None => Ok(MatcherToken::Absent),
        }
    }

    /// Build a route from a matcher set and a handler. If the handler's module
    /// cannot be resolved or serialized, a warning is recorded and no values
    /// are returned.
    pub fn new_route(
        &mut self,
        matcher_set: Option<MatcherSet>,
        handler: Box<dyn MiddlewareHandler>,
    ) -> Vec<ConfigValue> {
        let module = match self.ctx.modules.resolve(handler.as_ref()) {
            Ok(id) => id.clone(),
            Err(e) => {
                self.warn(e.to_string());
                return Vec::new();
            }
        };
        let Some(handler) = self.module_object(handler.as_ref(), "handler", module.name()) else {
            return Vec::new();
        };
        vec![ConfigValue::route(Route {
            group: None,
            matcher_sets: matcher_set.into_iter().collect(),
            handlers: vec![handler],
        })]
    }

    /// Serialize a module value and tag it with its name under `field`.
    fn module_object(
        &mut self,
        module: &dyn MiddlewareHandler,
        field: &str,
        name: &str,
    ) -> Option<Value> {
        let value = match module.to_json() {
            Ok(value) => value,
            Err(e) => {
                self.warn(e.to_string());
                return None;
            }
        };
        let mut object = match value {
            Value::Object(map) => map,
            Value::Null => serde_json::Map::new(),
            _ => {
                self.warn(format!("module {name} did not serialize to a JSON object"));
                return None;
            }
        };
        object.insert(field.to_string(), Value::String(name.to_string()));
        Some(Value::Object(object))
    }

    /// Put every route in `values` into one fresh group, so that only the
    /// first matching one runs. A single route is left alone.
    pub fn group_routes(&mut self, values: &mut [ConfigValue]) {
        let count = values
            .iter()
            .filter(|v| v.payload.as_route().is_some())
            .take(2)
            .count();
        if count < 2 {
            return;
        }

        let group = self.state.groups.next_group();
        for route in values.iter_mut().filter_map(|v| v.payload.as_route_mut()) {
            route.group = Some(group.clone());
        }
    }

    /// Values asking for the listeners to bind to `addrs`.
    pub fn new_bind_addresses(&self, addrs: Vec<String>) -> Vec<ConfigValue> {
        vec![ConfigValue::new(BIND_CLASS, Payload::BindAddresses(addrs))]
    }

    /// Compile a nested directive (e.g. inside a `route` block) with this
    /// pass's shared state.
    pub fn compile_nested(&mut self, segment: Segment) -> CompileResult<Vec<ConfigValue>> {
        self.ctx.invoke(segment, self.state)
    }

    /// Warnings recorded so far in this pass.
    pub fn warnings(&self) -> &[Warning] {
        &self.state.warnings
    }
}
