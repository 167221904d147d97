//! Directive registry.
//!
//! # Responsibilities
//! - Map directive names to unmarshaling functions
//! - Wrap handler-only unmarshalers with matcher handling and route building
//! - Hold the process-wide registry once startup has filled it
//!
//! # Design Decisions
//! - A name can be registered once; a second attempt is a programming error
//! - Built and populated locally, then installed; reads never lock

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::directives::helper::Helper;
use crate::directives::value::ConfigValue;
use crate::error::{CompileResult, RegistryError};
use crate::modules::MiddlewareHandler;

/// Turns a directive's tokens into zero or more config values.
pub type UnmarshalFn =
    Arc<dyn Fn(&mut Helper<'_>) -> CompileResult<Vec<ConfigValue>> + Send + Sync>;

/// Turns a directive's tokens into a single HTTP handler. Matchers and route
/// construction are handled by the registry.
pub type UnmarshalHandlerFn =
    Arc<dyn Fn(&mut Helper<'_>) -> CompileResult<Box<dyn MiddlewareHandler>> + Send + Sync>;

/// Table of known directives.
#[derive(Clone, Default)]
pub struct DirectiveRegistry {
    directives: HashMap<String, UnmarshalFn>,
}

static GLOBAL_DIRECTIVES: OnceLock<DirectiveRegistry> = OnceLock::new();

impl DirectiveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in directive registered.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::handlers::register_directives(&mut registry);
        registry
    }

    /// Register `name` with a general unmarshaling function.
    pub fn try_register<F>(&mut self, name: &str, unmarshal: F) -> Result<(), RegistryError>
    where
        F: Fn(&mut Helper<'_>) -> CompileResult<Vec<ConfigValue>> + Send + Sync + 'static,
    {
        if self.directives.contains_key(name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        self.directives.insert(name.to_string(), Arc::new(unmarshal));
        Ok(())
    }

    /// Like [`try_register`](Self::try_register), but panics if `name` is taken.
    pub fn register<F>(&mut self, name: &str, unmarshal: F)
    where
        F: Fn(&mut Helper<'_>) -> CompileResult<Vec<ConfigValue>> + Send + Sync + 'static,
    {
        if let Err(e) = self.try_register(name, unmarshal) {
            panic!("{e}");
        }
    }

    /// Register a directive that only produces an HTTP handler. The generated
    /// unmarshaler accepts an optional matcher token as the first argument and
    /// wraps the handler in a route.
    pub fn try_register_handler_directive<F>(
        &mut self,
        name: &str,
        unmarshal: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(&mut Helper<'_>) -> CompileResult<Box<dyn MiddlewareHandler>> + Send + Sync + 'static,
    {
        let unmarshal: UnmarshalHandlerFn = Arc::new(unmarshal);
        self.try_register(name, move |h: &mut Helper<'_>| {
            if !h.next() {
                return Err(h.arg_err());
            }

            let matcher = h.matcher_token()?;
            if matcher.is_recognized() {
                // this dispenser only holds this directive's tokens
                h.delete();
            }
            h.reset();

            let handler = unmarshal(h)?;
            Ok(h.new_route(matcher.into_set(), handler))
        })
    }

    /// Like [`try_register_handler_directive`](Self::try_register_handler_directive),
    /// but panics if `name` is taken.
    pub fn register_handler_directive<F>(&mut self, name: &str, unmarshal: F)
    where
        F: Fn(&mut Helper<'_>) -> CompileResult<Box<dyn MiddlewareHandler>> + Send + Sync + 'static,
    {
        if let Err(e) = self.try_register_handler_directive(name, unmarshal) {
            panic!("{e}");
        }
    }

    pub fn get(&self, name: &str) -> Option<&UnmarshalFn> {
        self.directives.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.directives.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.directives.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Make this the process-wide directive table. Allowed once; reads before
    /// this see nothing rather than freezing an empty table in place.
    pub fn install(self) -> Result<&'static DirectiveRegistry, RegistryError> {
        let mut installed = false;
        let table = GLOBAL_DIRECTIVES.get_or_init(|| {
            installed = true;
            self
        });
        if installed {
            Ok(table)
        } else {
            Err(RegistryError::AlreadyInstalled("directive"))
        }
    }

    /// The process-wide table, once installed.
    pub fn global() -> Option<&'static DirectiveRegistry> {
        GLOBAL_DIRECTIVES.get()
    }
}

impl fmt::Debug for DirectiveRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectiveRegistry")
            .field("directives", &self.names())
            .finish()
    }
}
