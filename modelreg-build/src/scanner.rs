//! Source scanner: parses every Rust file of one module directory.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{GenerateError, Result};

/// File stems that stand for the package module itself rather than a child module.
const ROOT_STEMS: &[&str] = &["mod", "lib", "main"];

/// One parsed source file.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    /// Path to the file as found under the scanned directory.
    pub path: PathBuf,
    /// Module segment contributed by the file (`book.rs` -> `book`), or
    /// `None` for `mod.rs`/`lib.rs`/`main.rs`.
    pub module: Option<String>,
    /// Parsed syntax tree.
    pub syntax: syn::File,
}

impl SourceUnit {
    /// File name used in diagnostics (e.g. `book.rs`).
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// All source units of one directory, in deterministic file-name order.
#[derive(Debug, Clone)]
pub struct PackageScan {
    pub dir: PathBuf,
    pub units: Vec<SourceUnit>,
}

impl PackageScan {
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }
}

/// Scan `dir` (non-recursively) and parse each `.rs` file in it.
///
/// `exclude` names a file that must not be scanned even if it lives in
/// `dir`; the generator passes its own output path here.
pub fn scan_package(dir: &Path, exclude: Option<&Path>) -> Result<PackageScan> {
    let metadata = fs::metadata(dir).map_err(|err| GenerateError::discovery(dir, err))?;
    if !metadata.is_dir() {
        return Err(GenerateError::NotADirectory { path: dir.to_path_buf() });
    }

    let excluded = exclude.and_then(canonical_target);
    let mut units = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(dir).to_path_buf();
            GenerateError::discovery(path, err.into())
        })?;
        let path = entry.path();

        if !entry.file_type().is_file() || !is_rust_source(path) {
            continue;
        }

        if excluded.is_some() && canonical_target(path) == excluded {
            log::debug!("skipping generated file {}", path.display());
            continue;
        }

        units.push(scan_file(path)?);
    }

    log::debug!("scanned {} source file(s) in {}", units.len(), dir.display());

    Ok(PackageScan {
        dir: dir.to_path_buf(),
        units,
    })
}

/// Read and parse a single source file.
fn scan_file(path: &Path) -> Result<SourceUnit> {
    let Some(stem) = path.file_stem().and_then(OsStr::to_str) else {
        let err = io::Error::new(io::ErrorKind::InvalidData, "file name is not valid UTF-8");
        return Err(GenerateError::discovery(path, err));
    };
    let module = module_segment(stem);

    let content = fs::read_to_string(path).map_err(|err| GenerateError::discovery(path, err))?;
    let syntax = syn::parse_file(&content).map_err(|err| GenerateError::parse(path, err))?;

    log::debug!("parsed {} ({} top-level items)", path.display(), syntax.items.len());

    Ok(SourceUnit {
        path: path.to_path_buf(),
        module,
        syntax,
    })
}

fn is_rust_source(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with('.'));
    !hidden && path.extension().is_some_and(|ext| ext == "rs")
}

/// Module segment for a file stem, e.g. `book` -> `Some("book")`.
fn module_segment(stem: &str) -> Option<String> {
    if ROOT_STEMS.contains(&stem) {
        None
    } else {
        Some(stem.to_string())
    }
}

/// Canonical form of a path whose final component may not exist yet.
fn canonical_target(path: &Path) -> Option<PathBuf> {
    if let Ok(canonical) = fs::canonicalize(path) {
        return Some(canonical);
    }
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Some(fs::canonicalize(parent).ok()?.join(path.file_name()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_module_segment() {
        assert_eq!(module_segment("book"), Some("book".to_string()));
        assert_eq!(module_segment("mod"), None);
        assert_eq!(module_segment("lib"), None);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_file_name_is_rejected() {
        use std::os::unix::ffi::OsStrExt;

        let temp = TempDir::new().unwrap();
        write(temp.path(), "book.rs", "pub struct Book {}");
        let name = OsStr::from_bytes(b"\xffuser.rs");
        fs::write(temp.path().join(name), "pub struct User {}").unwrap();

        let err = scan_package(temp.path(), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Discovery);
        match err {
            GenerateError::Discovery { path, source } => {
                assert_eq!(path.file_name(), Some(name));
                assert_eq!(source.kind(), io::ErrorKind::InvalidData);
            }
            other => panic!("expected discovery error, got {other:?}"),
        }
    }

    #[test]
    fn test_scan_is_debug_printable() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "book.rs", "pub struct Book { pub title: String }");

        let scan = scan_package(temp.path(), None).unwrap();
        let printed = format!("{scan:?}");
        assert!(printed.contains("book.rs"));
        assert!(printed.contains("Book"));
    }

    #[test]
    fn test_files_sorted_by_name() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "user.rs", "pub struct User {}");
        write(temp.path(), "book.rs", "pub struct Book {}");
        write(temp.path(), "author.rs", "pub struct Author {}");

        let scan = scan_package(temp.path(), None).unwrap();
        let names: Vec<_> = scan.units.iter().map(SourceUnit::file_name).collect();
        assert_eq!(names, ["author.rs", "book.rs", "user.rs"]);
    }

    #[test]
    fn test_ignores_subdirectories_and_other_files() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "book.rs", "pub struct Book {}");
        write(temp.path(), "notes.txt", "not rust {");
        write(temp.path(), ".hidden.rs", "not rust {");
        fs::create_dir(temp.path().join("nested")).unwrap();
        write(&temp.path().join("nested"), "deep.rs", "pub struct Deep {}");

        let scan = scan_package(temp.path(), None).unwrap();
        assert_eq!(scan.len(), 1);
        assert_eq!(scan.units[0].module.as_deref(), Some("book"));
    }

    #[test]
    fn test_empty_directory() {
        let temp = TempDir::new().unwrap();
        let scan = scan_package(temp.path(), None).unwrap();
        assert!(scan.is_empty());
    }

    #[test]
    fn test_excluded_file_is_skipped() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "book.rs", "pub struct Book {}");
        write(temp.path(), "models.rs", "pub fn models() {}");

        let scan = scan_package(temp.path(), Some(&temp.path().join("models.rs"))).unwrap();
        assert_eq!(scan.len(), 1);
        assert_eq!(scan.units[0].file_name(), "book.rs");
    }

    #[test]
    fn test_missing_directory() {
        let temp = TempDir::new().unwrap();
        let err = scan_package(&temp.path().join("missing"), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Discovery);
    }

    #[test]
    fn test_file_instead_of_directory() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "book.rs", "pub struct Book {}");

        let err = scan_package(&temp.path().join("book.rs"), None).unwrap_err();
        assert!(matches!(err, GenerateError::NotADirectory { .. }));
    }

    #[test]
    fn test_malformed_file_fails_whole_scan() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "book.rs", "pub struct Book {}");
        write(temp.path(), "broken.rs", "pub struct Broken {");
        write(temp.path(), "user.rs", "pub struct User {}");

        let err = scan_package(temp.path(), None).unwrap_err();
        match err {
            GenerateError::Parse { path, .. } => assert!(path.ends_with("broken.rs")),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
