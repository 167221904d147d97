//! Process-wide registry installation. Kept in its own test binary because the
//! tables can only be installed once per process.

mod common;

use common::site;
use directive_compiler::{CompileInput, Compiler, DirectiveRegistry, ModuleTable, RegistryError};

#[test]
fn test_install_after_early_read() {
    assert!(DirectiveRegistry::global().is_none());
    assert!(ModuleTable::global().is_none());
    assert!(Compiler::global().is_none());

    let registry = DirectiveRegistry::with_builtins().install().unwrap();
    assert!(registry.contains("file_server"));
    assert!(Compiler::global().is_none());
    ModuleTable::with_builtins().install().unwrap();

    assert_eq!(
        DirectiveRegistry::new().install().unwrap_err(),
        RegistryError::AlreadyInstalled("directive")
    );
    assert_eq!(
        ModuleTable::new().install().unwrap_err(),
        RegistryError::AlreadyInstalled("module")
    );
    assert!(DirectiveRegistry::global().unwrap().contains("file_server"));

    let input = CompileInput::new(vec![site(":8080", &[&["file_server"]])]);
    let compiled = Compiler::global().unwrap().compile(&input).unwrap();
    assert_eq!(compiled.route_count(), 1);
}
