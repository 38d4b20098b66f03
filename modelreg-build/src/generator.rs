//! Scan, filter and emit pipeline.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::emitter::{EmitSettings, WriteOutcome, read_registry, render_registry, write_generated};
use crate::error::{GenerateError, Result};
use crate::filter::{RegistryEntry, TypeDeclaration, collect_declarations, duplicate_paths, selected_entries};
use crate::scanner::scan_package;

/// Builder for configuring and running the registry generator.
#[derive(Debug, Clone)]
pub struct RegistryGenerator {
    source_dir: PathBuf,
    output_file: PathBuf,
    settings: EmitSettings,
}

/// Result of scanning and filtering, before anything is rendered.
#[derive(Debug, Clone, Serialize)]
pub struct RegistryPlan {
    /// Scanned files, in traversal order.
    pub files: Vec<PathBuf>,
    /// Every top-level type declaration found.
    pub declarations: Vec<TypeDeclaration>,
    /// Selected record types, in traversal order.
    pub entries: Vec<RegistryEntry>,
    /// Package-relative paths declared more than once.
    pub duplicates: Vec<String>,
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub output_file: PathBuf,
    pub files: usize,
    pub declarations: usize,
    pub entries: Vec<RegistryEntry>,
    pub outcome: WriteOutcome,
}

/// State of the file on disk compared with a fresh render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckOutcome {
    UpToDate,
    /// The file differs. `on_disk` lists the types the existing file
    /// registers, or is empty if it is not a recognisable registry.
    Stale {
        on_disk: Vec<String>,
        expected: Vec<String>,
    },
    Missing,
}

impl RegistryGenerator {
    /// Create a new generator with default settings.
    pub fn new() -> Self {
        Self {
            source_dir: PathBuf::from("src/entity"),
            output_file: PathBuf::from("src/entity/models.rs"),
            settings: EmitSettings::default(),
        }
    }

    /// Set the directory holding the model declarations.
    ///
    /// Default: `src/entity`
    pub fn source_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_dir = path.into();
        self
    }

    /// Set the output file for the generated registry.
    ///
    /// Default: `src/entity/models.rs`
    pub fn output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = path.into();
        self
    }

    /// Set the path from the generated module to the scanned package.
    ///
    /// Default: `super`
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.settings.namespace = namespace.into();
        self
    }

    /// Set the name of the generated collection function.
    ///
    /// Default: `models`
    pub fn collection_name(mut self, name: impl Into<String>) -> Self {
        self.settings.collection = name.into();
        self
    }

    pub fn source_path(&self) -> &Path {
        &self.source_dir
    }

    pub fn output_path(&self) -> &Path {
        &self.output_file
    }

    /// Scan and filter without rendering or writing anything.
    pub fn plan(&self) -> Result<RegistryPlan> {
        let scan = scan_package(&self.source_dir, Some(&self.output_file))?;
        let declarations = collect_declarations(&scan);
        let entries = selected_entries(&declarations);
        let duplicates = duplicate_paths(&entries);

        for path in &duplicates {
            log::warn!("`{path}` is declared more than once in {}", self.source_dir.display());
        }

        Ok(RegistryPlan {
            files: scan.units.into_iter().map(|unit| unit.path).collect(),
            declarations,
            entries,
            duplicates,
        })
    }

    /// Render the registry without writing it.
    pub fn render(&self) -> Result<String> {
        let plan = self.plan()?;
        render_registry(&self.settings, &plan.entries)
    }

    /// Run the generator.
    ///
    /// Scans the source directory, selects record declarations and replaces
    /// the output file with the rendered registry. Nothing is written if any
    /// step fails.
    pub fn run(self) -> Result<GenerationReport> {
        let plan = self.plan()?;
        let code = render_registry(&self.settings, &plan.entries)?;
        let outcome = write_generated(&self.output_file, &code)?;

        if outcome == WriteOutcome::Written {
            log::info!(
                "generated {} with {} model(s)",
                self.output_file.display(),
                plan.entries.len()
            );
        }

        Ok(GenerationReport {
            output_file: self.output_file,
            files: plan.files.len(),
            declarations: plan.declarations.len(),
            entries: plan.entries,
            outcome,
        })
    }

    /// Compare the file on disk with what [`run`](Self::run) would write.
    ///
    /// Only a missing output file yields [`CheckOutcome::Missing`]; any other
    /// read failure is a discovery error.
    pub fn check(&self) -> Result<CheckOutcome> {
        let plan = self.plan()?;
        let code = render_registry(&self.settings, &plan.entries)?;

        let existing = match fs::read(&self.output_file) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(CheckOutcome::Missing),
            Err(err) => return Err(GenerateError::discovery(&self.output_file, err)),
        };
        if existing == code.as_bytes() {
            return Ok(CheckOutcome::UpToDate);
        }

        let existing = String::from_utf8_lossy(&existing);
        let collection = &self.settings.collection;
        Ok(CheckOutcome::Stale {
            on_disk: read_registry(&existing, collection).unwrap_or_default(),
            expected: read_registry(&code, collection).unwrap_or_default(),
        })
    }
}

impl Default for RegistryGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let generator = RegistryGenerator::default();
        assert_eq!(generator.source_path(), Path::new("src/entity"));
        assert_eq!(generator.output_path(), Path::new("src/entity/models.rs"));
        assert_eq!(generator.settings, EmitSettings::default());
    }

    #[test]
    fn test_plan_does_not_write() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("book.rs"), "pub struct Book {}").unwrap();
        let output = temp.path().join("models.rs");

        let plan = RegistryGenerator::new()
            .source_dir(temp.path())
            .output_file(&output)
            .plan()
            .unwrap();

        assert_eq!(plan.files.len(), 1);
        assert_eq!(plan.entries.len(), 1);
        assert!(plan.duplicates.is_empty());
        assert!(!output.exists());
    }

    #[test]
    fn test_generated_file_is_not_rescanned() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("book.rs"), "pub struct Book {}").unwrap();
        let output = temp.path().join("models.rs");
        let generator = RegistryGenerator::new().source_dir(temp.path()).output_file(&output);

        generator.clone().run().unwrap();
        let plan = generator.plan().unwrap();
        assert_eq!(plan.files, [temp.path().join("book.rs")]);
    }

    #[test]
    fn test_check_reports_missing_output() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("book.rs"), "pub struct Book {}").unwrap();

        let outcome = RegistryGenerator::new()
            .source_dir(temp.path())
            .output_file(temp.path().join("models.rs"))
            .check()
            .unwrap();
        assert_eq!(outcome, CheckOutcome::Missing);
    }

    #[test]
    fn test_check_fails_when_output_is_unreadable() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("book.rs"), "pub struct Book {}").unwrap();
        let output = temp.path().join("models.rs");
        fs::create_dir(&output).unwrap();

        let err = RegistryGenerator::new()
            .source_dir(temp.path())
            .output_file(&output)
            .check()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Discovery);
        assert!(matches!(err, GenerateError::Discovery { ref path, .. } if path == &output));
    }

    #[test]
    fn test_check_tolerates_non_utf8_output() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("book.rs"), "pub struct Book {}").unwrap();
        let output = temp.path().join("models.rs");
        fs::write(&output, b"\xff\xfe not a registry").unwrap();

        let outcome = RegistryGenerator::new()
            .source_dir(temp.path())
            .output_file(&output)
            .check()
            .unwrap();
        assert_eq!(
            outcome,
            CheckOutcome::Stale {
                on_disk: Vec::new(),
                expected: vec!["super::book::Book".to_string()],
            }
        );
    }
}
