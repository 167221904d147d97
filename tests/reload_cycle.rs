//! Reload behaviour with a file-backed applier.

mod common;

use std::fs;
use std::sync::Arc;

use common::{builtins, site};
use directive_compiler::reload::{ApplyError, FileApplier, ReloadError, Reloader};
use directive_compiler::Compiler;

#[test]
fn test_file_applier_receives_active_config() {
    let (registry, modules) = builtins();
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("config.json");
    let reloader = Reloader::new(Compiler::new(&registry, &modules), FileApplier::new(&output));

    let compiled = reloader
        .reload(vec![site(":9000", &[&["respond ok"]])])
        .unwrap();

    let written = fs::read(&output).unwrap();
    assert_eq!(written, compiled.to_json_bytes().unwrap());
}

#[test]
fn test_compile_failure_keeps_previous_file() {
    let (registry, modules) = builtins();
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("config.json");
    let reloader = Reloader::new(Compiler::new(&registry, &modules), FileApplier::new(&output));

    let first = reloader.reload(vec![site(":9000", &[&["respond ok"]])]).unwrap();
    let before = fs::read(&output).unwrap();

    let err = reloader
        .reload(vec![site(":9000", &[&["respond ok"], &["nonsense"]])])
        .unwrap_err();
    assert!(matches!(err, ReloadError::Compile(_)));
    assert_eq!(fs::read(&output).unwrap(), before);
    assert!(Arc::ptr_eq(&reloader.active().unwrap(), &first));
}

#[test]
fn test_rejecting_applier_keeps_previous_config() {
    let (registry, modules) = builtins();
    let allow = std::sync::atomic::AtomicBool::new(true);
    let applier = |_: &[u8]| -> Result<(), ApplyError> {
        if allow.load(std::sync::atomic::Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ApplyError::Rejected("port in use".into()))
        }
    };
    let reloader = Reloader::new(Compiler::new(&registry, &modules), &applier);

    let first = reloader.reload(vec![site(":9000", &[&["respond ok"]])]).unwrap();
    allow.store(false, std::sync::atomic::Ordering::SeqCst);

    let err = reloader
        .reload(vec![site(":9000", &[&["file_server"]])])
        .unwrap_err();
    assert_eq!(err.to_string(), "failed to apply config: config rejected: port in use");
    assert_eq!(reloader.active().unwrap().route_count(), first.route_count());
    assert!(Arc::ptr_eq(&reloader.active().unwrap(), &first));
}
