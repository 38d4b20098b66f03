//! Integration tests that verify a generated registry compiles and runs.
//!
//! The fixture package is copied into a throwaway binary crate, the registry
//! is generated next to it, and `cargo run` executes a `main` that checks the
//! instances `models()` returns.

use std::{fs, path::Path, process::Command};

use tempfile::TempDir;

const MANIFEST: &str = r#"[package]
name = "registry-consumer"
version = "0.1.0"
edition = "2021"
publish = false

[workspace]
"#;

const MAIN: &str = r#"mod entity;

fn main() {
    let models = entity::models::models();
    assert_eq!(models.len(), 3);
    assert!(models[1].is::<entity::Book>());
    assert!(models[2].is::<entity::User>());

    let book = models[1].downcast_ref::<entity::Book>().unwrap();
    assert!(book.name.is_empty());
}
"#;

/// Lay out a binary crate around the fixture package and return its root.
fn consumer_crate() -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let entity = temp.path().join("src/entity");
    fs::create_dir_all(&entity).unwrap();

    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/entity");
    for entry in fs::read_dir(fixtures).unwrap() {
        let entry = entry.unwrap();
        fs::copy(entry.path(), entity.join(entry.file_name())).unwrap();
    }

    fs::write(temp.path().join("Cargo.toml"), MANIFEST).unwrap();
    fs::write(temp.path().join("src/main.rs"), MAIN).unwrap();
    temp
}

/// Print all source files for debugging
fn print_sources(dir: &Path) {
    let Ok(entries) = fs::read_dir(dir) else { return };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.file_name().is_some_and(|name| name == "target") {
            continue;
        }
        if path.is_dir() {
            print_sources(&path);
        } else if path.extension().is_some_and(|ext| ext == "rs" || ext == "toml") {
            eprintln!("{}", path.display());
            if let Ok(content) = fs::read_to_string(&path) {
                for line in content.lines() {
                    eprintln!("  | {line}");
                }
            }
        }
    }
}

#[test]
fn test_generated_registry_compiles_and_runs() {
    let temp = consumer_crate();
    let entity = temp.path().join("src/entity");

    modelreg_build::generate_registry()
        .source_dir(&entity)
        .output_file(entity.join("models.rs"))
        .run()
        .expect("Failed to generate registry");

    let cargo = std::env::var("CARGO").unwrap_or_else(|_| "cargo".to_string());
    let status = Command::new(cargo)
        .args(["run", "--quiet", "--offline"])
        .current_dir(temp.path())
        .env("CARGO_TARGET_DIR", temp.path().join("target"))
        .output()
        .expect("Failed to run cargo");

    if !status.status.success() {
        let stdout = String::from_utf8_lossy(&status.stdout);
        let stderr = String::from_utf8_lossy(&status.stderr);

        eprintln!("\n=== Consumer crate ===");
        print_sources(temp.path());

        panic!("Generated registry failed to build or run!\n\nstdout:\n{stdout}\n\nstderr:\n{stderr}");
    }
}
