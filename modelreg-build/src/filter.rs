//! Declaration filter: classifies top-level type declarations and selects records.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use syn::visit::Visit;
use syn::{Fields, Item};

use crate::scanner::{PackageScan, SourceUnit};

/// Structural shape of a top-level type declaration.
///
/// This is a closed set: a new kind of declaration must be mapped here
/// explicitly in [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclShape {
    /// Struct with named fields, or a unit struct.
    Record,
    /// `type X = ...;`
    Alias,
    /// Trait or trait alias.
    Interface,
    /// Tuple/newtype struct, generic struct, enum or union.
    Other,
}

impl DeclShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclShape::Record => "record",
            DeclShape::Alias => "alias",
            DeclShape::Interface => "interface",
            DeclShape::Other => "other",
        }
    }
}

impl fmt::Display for DeclShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a declaration was found. Only used for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourcePosition {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A named top-level type declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDeclaration {
    pub name: String,
    /// Module segment of the declaring file, `None` for the package root file.
    pub module: Option<String>,
    pub shape: DeclShape,
    pub position: SourcePosition,
}

/// A declaration as it appears in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryEntry {
    pub name: String,
    pub module: Option<String>,
    /// True iff the declaration is a [`DeclShape::Record`].
    pub selected: bool,
}

impl RegistryEntry {
    /// Path of the type relative to the scanned package, e.g. `book::Book`.
    pub fn relative_path(&self) -> String {
        match &self.module {
            Some(module) => format!("{module}::{}", self.name),
            None => self.name.clone(),
        }
    }
}

/// Classify a top-level item.
///
/// Returns `None` for items that do not declare a named type (functions,
/// impls, imports, modules, macros, constants, ...).
pub fn classify(item: &Item) -> Option<DeclShape> {
    let shape = match item {
        Item::Struct(item) if !item.generics.params.is_empty() => DeclShape::Other,
        Item::Struct(item) => match item.fields {
            Fields::Named(_) | Fields::Unit => DeclShape::Record,
            Fields::Unnamed(_) => DeclShape::Other,
        },
        Item::Type(_) => DeclShape::Alias,
        Item::Trait(_) | Item::TraitAlias(_) => DeclShape::Interface,
        Item::Enum(_) | Item::Union(_) => DeclShape::Other,
        _ => return None,
    };
    Some(shape)
}

fn declared_ident(item: &Item) -> Option<&syn::Ident> {
    match item {
        Item::Struct(item) => Some(&item.ident),
        Item::Type(item) => Some(&item.ident),
        Item::Trait(item) => Some(&item.ident),
        Item::TraitAlias(item) => Some(&item.ident),
        Item::Enum(item) => Some(&item.ident),
        Item::Union(item) => Some(&item.ident),
        _ => None,
    }
}

/// Collects the type declarations of one file.
///
/// Only `visit_item` is overridden and it never recurses, so items nested in
/// functions, impls or inline modules are not seen.
struct DeclarationCollector<'a> {
    unit: &'a SourceUnit,
    file: String,
    found: Vec<TypeDeclaration>,
}

impl<'ast> Visit<'ast> for DeclarationCollector<'_> {
    fn visit_item(&mut self, item: &'ast Item) {
        let (Some(shape), Some(ident)) = (classify(item), declared_ident(item)) else {
            return;
        };

        let start = ident.span().start();
        let name = ident.to_string();
        log::debug!("{}: `{name}` classified as {shape}", self.file);

        self.found.push(TypeDeclaration {
            name,
            module: self.unit.module.clone(),
            shape,
            position: SourcePosition {
                file: self.file.clone(),
                line: start.line,
                column: start.column + 1,
            },
        });
    }
}

/// Every top-level type declaration in the package, in file then source order.
pub fn collect_declarations(scan: &PackageScan) -> Vec<TypeDeclaration> {
    let mut declarations = Vec::new();
    for unit in &scan.units {
        let mut collector = DeclarationCollector {
            unit,
            file: unit.file_name(),
            found: Vec::new(),
        };
        collector.visit_file(&unit.syntax);
        declarations.append(&mut collector.found);
    }
    declarations
}

/// Map declarations 1:1 to registry entries.
pub fn select_entries(declarations: &[TypeDeclaration]) -> Vec<RegistryEntry> {
    declarations
        .iter()
        .map(|decl| RegistryEntry {
            name: decl.name.clone(),
            module: decl.module.clone(),
            selected: decl.shape == DeclShape::Record,
        })
        .collect()
}

/// Only the selected entries, order preserved. Duplicates are kept.
pub fn selected_entries(declarations: &[TypeDeclaration]) -> Vec<RegistryEntry> {
    select_entries(declarations)
        .into_iter()
        .filter(|entry| entry.selected)
        .collect()
}

/// Package-relative paths that occur more than once among `entries`, in
/// first-seen order.
pub fn duplicate_paths(entries: &[RegistryEntry]) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order = Vec::new();
    for entry in entries {
        let path = entry.relative_path();
        let count = counts.entry(path.clone()).or_default();
        *count += 1;
        if *count == 2 {
            order.push(path);
        }
    }
    order
}
