//! @acp:module "Declaration Resolver"
//! @acp:summary "Cross-file declaration lookup along import edges"
//! @acp:domain cli
//! @acp:layer service
//!
//! # Declaration Resolution
//!
//! Finds declarations by name across files:
//! 1. **Search** the file's own top-level declarations
//! 2. **Scan** its import statements for one binding the sought name
//! 3. **Resolve** the specifier against the importing file's directory
//! 4. **Recurse** into the imported file, looking up the exported name
//!
//! Parsed files are memoized per pass in [`SourceLoader`], keyed by absolute
//! path, so a file reached along several import paths is parsed once.

pub mod paths;
pub mod types;

pub use paths::{normalize_path, relative_import_specifier, resolve_import_path};
pub use types::{method_referenced_types, property_types, referenced_types};

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::error::{RestgenError, Result};
use crate::parse::{Declaration, DeclarationKind, SourceFile, SourceParser};

/// Default extension appended to extensionless import specifiers
pub const DEFAULT_SOURCE_EXTENSION: &str = "ts";

/// Per-pass cache of parsed source files
#[derive(Debug, Default)]
pub struct SourceLoader {
    parser: SourceParser,
    files: HashMap<PathBuf, Arc<SourceFile>>,
}

impl SourceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and parse a file, reusing an earlier parse from this pass
    pub fn load(&mut self, path: &Path) -> Result<Arc<SourceFile>> {
        let key = paths::absolute(path);
        if let Some(file) = self.files.get(&key) {
            trace!(path = %path.display(), "Source cache hit");
            return Ok(Arc::clone(file));
        }
        let file = Arc::new(self.parser.parse_file(path)?);
        self.files.insert(key, Arc::clone(&file));
        Ok(file)
    }

    /// Register an already parsed file so later lookups reuse it
    pub fn insert(&mut self, file: SourceFile) -> Arc<SourceFile> {
        let key = paths::absolute(&file.path);
        let file = Arc::new(file);
        self.files.insert(key, Arc::clone(&file));
        file
    }

    /// Number of distinct files parsed in this pass
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Find the API class in a parsed file
///
/// Returns the first class carrying `api_decorator`, or with `class_name`
/// set, the first such class with that name.
pub fn find_api_declaration<'f>(
    file: &'f SourceFile,
    api_decorator: &str,
    class_name: Option<&str>,
) -> Result<&'f Declaration> {
    file.classes()
        .filter(|d| d.has_decorator(api_decorator))
        .find(|d| class_name.map_or(true, |name| d.name == name))
        .ok_or_else(|| RestgenError::MissingDeclaration {
            path: file.path.clone(),
            class_name: class_name.map(str::to_string),
        })
}

/// Resolves type names to declarations across import edges
#[derive(Debug)]
pub struct DeclarationResolver {
    loader: SourceLoader,
    extension: String,
}

impl Default for DeclarationResolver {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE_EXTENSION)
    }
}

impl DeclarationResolver {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            loader: SourceLoader::new(),
            extension: extension.into(),
        }
    }

    pub fn loader(&mut self) -> &mut SourceLoader {
        &mut self.loader
    }

    /// Load a file through this pass's cache
    pub fn load(&mut self, path: &Path) -> Result<Arc<SourceFile>> {
        self.loader.load(path)
    }

    /// Resolve `name` as seen from `file`
    ///
    /// Returns `Ok(None)` when the name is not declared locally and no
    /// relative import binding it leads to an existing file. Parse errors in
    /// an imported file propagate.
    pub fn resolve(&mut self, name: &str, file: &SourceFile) -> Result<Option<Declaration>> {
        let mut visited = HashSet::new();
        self.resolve_in(name, file, &mut visited)
    }

    /// Resolve `name` from the file a declaration was parsed from
    pub fn resolve_from(&mut self, name: &str, origin: &Path) -> Result<Option<Declaration>> {
        let file = self.loader.load(origin)?;
        self.resolve(name, &file)
    }

    fn resolve_in(
        &mut self,
        name: &str,
        file: &SourceFile,
        visited: &mut HashSet<PathBuf>,
    ) -> Result<Option<Declaration>> {
        if !visited.insert(paths::absolute(&file.path)) {
            // File-level import cycle; this file was already searched
            return Ok(None);
        }

        if let Some(decl) = file.declaration(name) {
            debug!(name, file = %file.path.display(), "Resolved declaration locally");
            return Ok(Some(decl.clone()));
        }

        for import in &file.imports {
            let Some(binding) = import.binding_for(name) else {
                continue;
            };
            if !import.is_relative() {
                trace!(name, specifier = %import.specifier, "Skipping package import");
                continue;
            }
            let target = resolve_import_path(file.directory(), &import.specifier, &self.extension);
            if !target.is_file() {
                warn!(
                    name,
                    specifier = %import.specifier,
                    from = %file.path.display(),
                    "Import target not found, leaving type unresolved"
                );
                continue;
            }
            debug!(
                name,
                from = %file.path.display(),
                to = %target.display(),
                "Following import edge"
            );
            let imported = self.loader.load(&target)?;
            let exported = if binding.imported == "default" {
                default_export_name(&imported).unwrap_or(name).to_string()
            } else {
                binding.imported.clone()
            };
            if let Some(decl) = self.resolve_in(&exported, &imported, visited)? {
                return Ok(Some(decl));
            }
        }

        Ok(None)
    }
}

/// Name of a file's default-exported declaration.
///
/// The model does not record `export default`, so a file with exactly one
/// exported class/interface/enum is taken as its default.
fn default_export_name(file: &SourceFile) -> Option<&str> {
    let mut exported = file.declarations.iter().filter(|d| {
        d.exported
            && matches!(
                d.kind,
                DeclarationKind::Class | DeclarationKind::Interface | DeclarationKind::Enum
            )
    });
    let first = exported.next()?;
    if exported.next().is_some() {
        return None;
    }
    Some(first.name.as_str())
}
