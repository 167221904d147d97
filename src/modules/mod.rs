//! Handler modules and their identities.
//!
//! # Data Flow
//! ```text
//! directive unmarshaler
//!     → Box<dyn MiddlewareHandler> (any Serialize type)
//!     → ModuleTable::resolve (TypeId → "http.handlers.<name>")
//!     → serialized module object {"handler": "<name>", ...}
//! ```
//!
//! # Design Decisions
//! - Handlers are supplied by independent modules; the compiler only needs
//!   them to serialize and to have a registered identity
//! - Identity is keyed by the concrete type, resolved once per handler
//! - The table is filled during startup and read-only afterwards

use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::OnceLock;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::error::RegistryError;

/// Anything that can be placed in a route's handler chain.
pub trait MiddlewareHandler: Any + Send + Sync + fmt::Debug {
    /// Serialize the handler's own configuration.
    fn to_json(&self) -> serde_json::Result<Value>;

    /// Identity of the concrete handler type.
    fn module_type(&self) -> TypeId;

    /// Rust type name, used in diagnostics only.
    fn type_name(&self) -> &'static str;
}

impl<T> MiddlewareHandler for T
where
    T: Serialize + fmt::Debug + Send + Sync + 'static,
{
    fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    fn module_type(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Fully qualified module identifier, e.g. `http.handlers.reverse_proxy`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleId(String);

impl ModuleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Last label of the identifier; this is what goes into the config.
    pub fn name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    /// Everything before the last label.
    pub fn namespace(&self) -> &str {
        self.0.rsplit_once('.').map_or("", |(ns, _)| ns)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Module identity could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleError {
    #[error("module not registered: {0}")]
    NotRegistered(&'static str),
}

/// Side table mapping concrete handler types to module identities.
#[derive(Debug, Default)]
pub struct ModuleTable {
    by_type: HashMap<TypeId, ModuleId>,
    ids: HashSet<ModuleId>,
}

static GLOBAL_MODULES: OnceLock<ModuleTable> = OnceLock::new();

impl ModuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with every built-in handler registered.
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        crate::handlers::register_modules(&mut table);
        table
    }

    /// Associate handler type `T` with `id`.
    pub fn try_register<T: MiddlewareHandler>(&mut self, id: &str) -> Result<(), RegistryError> {
        let id = ModuleId::new(id);
        if self.ids.contains(&id) || self.by_type.contains_key(&TypeId::of::<T>()) {
            return Err(RegistryError::DuplicateModule(id.to_string()));
        }
        self.ids.insert(id.clone());
        self.by_type.insert(TypeId::of::<T>(), id);
        Ok(())
    }

    /// Like [`try_register`](Self::try_register) but a duplicate is a fatal
    /// programming error.
    pub fn register<T: MiddlewareHandler>(&mut self, id: &str) {
        if let Err(e) = self.try_register::<T>(id) {
            panic!("{e}");
        }
    }

    /// Look up the identity of a handler value.
    pub fn resolve(&self, handler: &dyn MiddlewareHandler) -> Result<&ModuleId, ModuleError> {
        self.by_type
            .get(&handler.module_type())
            .ok_or(ModuleError::NotRegistered(handler.type_name()))
    }

    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }

    /// Make this the process-wide module table. Allowed once; reads before
    /// this see nothing rather than freezing an empty table in place.
    pub fn install(self) -> Result<&'static ModuleTable, RegistryError> {
        let mut installed = false;
        let table = GLOBAL_MODULES.get_or_init(|| {
            installed = true;
            self
        });
        if installed {
            Ok(table)
        } else {
            Err(RegistryError::AlreadyInstalled("module"))
        }
    }

    /// The process-wide table, once installed.
    pub fn global() -> Option<&'static ModuleTable> {
        GLOBAL_MODULES.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize)]
    struct Echo {
        body: String,
    }

    #[derive(Debug, Serialize)]
    struct Unknown;

    #[test]
    fn test_module_id_parts() {
        let id = ModuleId::new("http.handlers.reverse_proxy");
        assert_eq!(id.name(), "reverse_proxy");
        assert_eq!(id.namespace(), "http.handlers");
    }

    #[test]
    fn test_resolve_registered_handler() {
        let mut table = ModuleTable::new();
        table.register::<Echo>("http.handlers.echo");

        let handler: Box<dyn MiddlewareHandler> = Box::new(Echo { body: "hi".into() });
        let id = table.resolve(handler.as_ref()).unwrap();
        assert_eq!(id.name(), "echo");
    }

    #[test]
    fn test_resolve_unregistered_handler() {
        let table = ModuleTable::new();
        let err = table.resolve(&Unknown).unwrap_err();
        assert!(err.to_string().starts_with("module not registered"));
    }

    #[test]
    fn test_duplicate_module_rejected() {
        let mut table = ModuleTable::new();
        table.register::<Echo>("http.handlers.echo");
        assert_eq!(
            table.try_register::<Unknown>("http.handlers.echo"),
            Err(RegistryError::DuplicateModule("http.handlers.echo".into()))
        );
    }

    #[test]
    fn test_handler_serializes_itself() {
        let value = Echo { body: "hi".into() }.to_json().unwrap();
        assert_eq!(value, serde_json::json!({"body": "hi"}));
    }
}
