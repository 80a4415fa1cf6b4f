//! Definition tree loading and compilation.

use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

use crate::definition::{parse_definition, DefinitionError, DefinitionErrorKind};
use crate::routing::{Registry, RegistryError};

/// How definition errors are handled during compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompileMode {
    /// Any bad file aborts compilation, reporting every bad file.
    #[default]
    Strict,
    /// Bad files are logged and skipped.
    Lenient,
}

/// Errors that prevent a registry from being built.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("API root {path:?} is not a readable directory: {source}")]
    Root {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} definition file(s) rejected: {}", .0.len(), join(.0))]
    Definitions(Vec<DefinitionError>),

    #[error("invalid route table: {}", join(.0))]
    Registry(Vec<RegistryError>),
}

fn join<T: Display>(items: &[T]) -> String {
    items.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// A definition file read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to the API root, `/`-separated.
    pub path: String,
    pub content: String,
}

/// Result of a successful compilation.
#[derive(Debug)]
pub struct Compiled {
    pub registry: Registry,
    /// Files skipped in lenient mode.
    pub skipped: Vec<DefinitionError>,
}

/// Walk `root` and read every non-hidden file, sorted by path.
///
/// Unreadable entries are returned as per-file errors so the caller can
/// report them alongside parse errors.
pub fn collect(root: &Path) -> Result<Vec<Result<SourceFile, DefinitionError>>, CompileError> {
    let metadata = fs::metadata(root).map_err(|source| CompileError::Root {
        path: root.to_path_buf(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(CompileError::Root {
            path: root.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a directory"),
        });
    }

    let files = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
        .filter_map(|entry| match entry {
            Ok(entry) if entry.file_type().is_file() => Some(read_entry(root, entry.path())),
            Ok(_) => None,
            Err(e) => {
                let file = e
                    .path()
                    .map(|p| relative(root, p))
                    .unwrap_or_else(|| root.display().to_string());
                Some(Err(DefinitionError::new(file, std::io::Error::from(e))))
            }
        })
        .collect();
    Ok(files)
}

fn read_entry(root: &Path, path: &Path) -> Result<SourceFile, DefinitionError> {
    let relative = relative(root, path);
    match fs::read_to_string(path) {
        Ok(content) => Ok(SourceFile { path: relative, content }),
        Err(e) => Err(DefinitionError::new(relative, DefinitionErrorKind::Io(e))),
    }
}

fn relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_str().is_some_and(|name| name.starts_with('.'))
}

/// Compile the definition tree under `root` into a registry.
pub fn compile(root: &Path, mode: CompileMode) -> Result<Compiled, CompileError> {
    let files = collect(root)?;
    let compiled = compile_sources(files, mode)?;
    tracing::info!(
        root = %root.display(),
        routes = compiled.registry.len(),
        skipped = compiled.skipped.len(),
        "Definitions compiled"
    );
    Ok(compiled)
}

/// Compile already-read files.
pub fn compile_sources(
    files: impl IntoIterator<Item = Result<SourceFile, DefinitionError>>,
    mode: CompileMode,
) -> Result<Compiled, CompileError> {
    let mut definitions = Vec::new();
    let mut errors = Vec::new();

    for file in files {
        match file.and_then(|f| parse_definition(&f.path, &f.content)) {
            Ok(parsed) => definitions.extend(parsed),
            Err(e) => errors.push(e),
        }
    }

    if mode == CompileMode::Strict && !errors.is_empty() {
        return Err(CompileError::Definitions(errors));
    }
    for error in &errors {
        tracing::warn!(file = %error.file, error = %error.kind, "Skipping definition file");
    }

    let registry = Registry::build(definitions).map_err(CompileError::Registry)?;
    Ok(Compiled {
        registry,
        skipped: errors,
    })
}
