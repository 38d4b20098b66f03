//! Registry emitter: renders the generated module and writes it to disk.

use std::fs;
use std::io::Write;
use std::path::Path;

use proc_macro2::TokenStream;
use quote::quote;
use serde::Serialize;
use syn::punctuated::Punctuated;
use syn::{Expr, ExprPath, Item, Stmt, Token, Type};
use tempfile::NamedTempFile;

use crate::error::{GenerateError, Result};
use crate::filter::RegistryEntry;

/// Naming used by the rendered registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitSettings {
    /// Path from the generated module to the scanned package (e.g. `super`
    /// or `crate::entity`).
    pub namespace: String,
    /// Name of the generated collection function.
    pub collection: String,
}

impl Default for EmitSettings {
    fn default() -> Self {
        Self {
            namespace: "super".to_string(),
            collection: "models".to_string(),
        }
    }
}

/// What happened at the output path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOutcome {
    /// New content was written.
    Written,
    /// The file already held exactly the rendered bytes.
    Unchanged,
}

/// Render the registry module for the selected `entries`.
///
/// Entries that are not selected are skipped. An empty selection renders an
/// empty collection.
pub fn render_registry(settings: &EmitSettings, entries: &[RegistryEntry]) -> Result<String> {
    let collection = syn::parse_str::<syn::Ident>(&settings.collection)
        .map_err(|_| GenerateError::render(format!("`{}` is not a valid identifier", settings.collection)))?;

    let instances = entries
        .iter()
        .filter(|entry| entry.selected)
        .map(|entry| {
            let path = type_path(&settings.namespace, entry)?;
            Ok(quote! {
                ::std::boxed::Box::new(<#path as ::core::default::Default>::default())
            })
        })
        .collect::<Result<Vec<TokenStream>>>()?;

    let output = quote! {
        //! Auto-generated model registry. Do not edit manually.
        //!
        //! Regenerate with `modelreg generate` or from `build.rs`.
        //!
        //! Generated by modelreg-build.

        /// Zero-valued instances of every record type declared in this package,
        /// in declaration order.
        pub fn #collection() -> ::std::vec::Vec<::std::boxed::Box<dyn ::std::any::Any>> {
            ::std::vec![#(#instances),*]
        }
    };

    let syntax_tree = syn::parse2(output).map_err(GenerateError::render)?;
    Ok(prettyplease::unparse(&syntax_tree))
}

fn type_path(namespace: &str, entry: &RegistryEntry) -> Result<syn::Path> {
    let mut path = if namespace.is_empty() {
        syn::Path {
            leading_colon: None,
            segments: Punctuated::new(),
        }
    } else {
        syn::parse_str::<syn::Path>(namespace)
            .map_err(|_| GenerateError::render(format!("`{namespace}` is not a valid module path")))?
    };

    if let Some(module) = &entry.module {
        path.segments.push(module_ident(module)?.into());
    }
    let name = syn::parse_str::<syn::Ident>(&entry.name)
        .map_err(|_| GenerateError::render(format!("`{}` is not a valid type name", entry.name)))?;
    path.segments.push(name.into());
    Ok(path)
}

/// Module segment for a file stem. Keyword stems such as `type` are reachable
/// as `mod r#type;` and are emitted raw.
fn module_ident(module: &str) -> Result<syn::Ident> {
    syn::parse_str::<syn::Ident>(module)
        .or_else(|_| syn::parse_str::<syn::Ident>(&format!("r#{module}")))
        .map_err(|_| GenerateError::render(format!("`{module}` is not a valid module name")))
}

/// Type paths listed by a previously rendered registry, in order.
///
/// Returns `None` when `source` is not a registry produced by
/// [`render_registry`] with the given collection name.
pub fn read_registry(source: &str, collection: &str) -> Option<Vec<String>> {
    let file = syn::parse_file(source).ok()?;
    let body = file.items.iter().find_map(|item| match item {
        Item::Fn(item) if item.sig.ident == collection => Some(&item.block),
        _ => None,
    })?;

    let mac = match body.stmts.last()? {
        Stmt::Macro(stmt) => &stmt.mac,
        Stmt::Expr(Expr::Macro(expr), _) => &expr.mac,
        _ => return None,
    };
    let elements = mac
        .parse_body_with(Punctuated::<Expr, Token![,]>::parse_terminated)
        .ok()?;

    elements.iter().map(instance_type).collect()
}

/// `Box::new(<T as Default>::default())` -> `T`
fn instance_type(expr: &Expr) -> Option<String> {
    let Expr::Call(boxed) = expr else { return None };
    let Some(Expr::Call(default)) = boxed.args.first() else {
        return None;
    };
    let Expr::Path(ExprPath { qself: Some(qself), .. }) = default.func.as_ref() else {
        return None;
    };
    let Type::Path(ty) = qself.ty.as_ref() else { return None };

    let segments: Vec<String> = ty.path.segments.iter().map(|s| s.ident.to_string()).collect();
    let prefix = if ty.path.leading_colon.is_some() { "::" } else { "" };
    Some(format!("{prefix}{}", segments.join("::")))
}

/// Replace the file at `path` with `content`.
///
/// The new content is written to a temporary file next to `path` and then
/// renamed over it, so readers never observe a partially written registry.
pub fn write_generated(path: &Path, content: &str) -> Result<WriteOutcome> {
    if fs::read(path).is_ok_and(|existing| existing == content.as_bytes()) {
        log::debug!("{} is up to date", path.display());
        return Ok(WriteOutcome::Unchanged);
    }

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|err| GenerateError::emit(parent, err))?;

    let mut temp = NamedTempFile::new_in(parent).map_err(|err| GenerateError::emit(path, err))?;
    temp.write_all(content.as_bytes())
        .and_then(|()| temp.flush())
        .and_then(|()| carry_permissions(&temp, path))
        .map_err(|err| GenerateError::emit(path, err))?;
    temp.persist(path).map_err(|err| GenerateError::emit(path, err.error))?;

    log::info!("wrote {}", path.display());
    Ok(WriteOutcome::Written)
}

/// Give the temp file the permissions of the file it replaces, or regular
/// source-file permissions (0644) when there is none. Temp files start out
/// owner-only.
fn carry_permissions(temp: &NamedTempFile, path: &Path) -> std::io::Result<()> {
    let permissions = match fs::metadata(path) {
        Ok(existing) => existing.permissions(),
        Err(_) => default_permissions(temp)?,
    };
    temp.as_file().set_permissions(permissions)
}

#[cfg(unix)]
fn default_permissions(_temp: &NamedTempFile) -> std::io::Result<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Ok(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions(temp: &NamedTempFile) -> std::io::Result<fs::Permissions> {
    Ok(temp.as_file().metadata()?.permissions())
}
