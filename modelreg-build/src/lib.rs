//! Build-time generator for model registries.
//!
//! This crate scans one module directory for top-level record structs and
//! writes a sibling module exposing a zero-valued instance of each of them,
//! so schema migration code can iterate every persistent model.
//!
//! # Example
//!
//! In your `build.rs`:
//!
//! ```ignore
//! fn main() {
//!     modelreg_build::generate_registry()
//!         .source_dir("src/entity")
//!         .output_file("src/entity/models.rs")
//!         .run()
//!         .expect("Failed to generate model registry");
//!
//!     println!("cargo:rerun-if-changed=src/entity/");
//! }
//! ```
//!
//! With `src/entity/book.rs` declaring `pub struct Book { .. }`, the
//! generated `src/entity/models.rs` contains:
//!
//! ```ignore
//! pub fn models() -> ::std::vec::Vec<::std::boxed::Box<dyn ::std::any::Any>> {
//!     ::std::vec![::std::boxed::Box::new(<super::book::Book as ::core::default::Default>::default())]
//! }
//! ```

pub mod emitter;
pub mod error;
pub mod filter;
pub mod scanner;

mod generator;

pub use emitter::{EmitSettings, WriteOutcome};
pub use error::{ErrorKind, GenerateError, Result};
pub use filter::{DeclShape, RegistryEntry, SourcePosition, TypeDeclaration};
pub use generator::{CheckOutcome, GenerationReport, RegistryGenerator, RegistryPlan};

/// Create a new registry generator with default settings.
pub fn generate_registry() -> RegistryGenerator {
    RegistryGenerator::new()
}
