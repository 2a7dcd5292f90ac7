//! @acp:module "Import Paths"
//! @acp:summary "Specifier resolution and generated import paths"
//! @acp:domain cli
//! @acp:layer utility
//!
//! Path arithmetic for import edges
//!
//! Two bases are involved and must never be mixed up: specifiers written in
//! source resolve against the importing file's directory, while generated
//! import statements are relative to the output file's directory.

use std::path::{Component, Path, PathBuf};

/// Lexically normalize a path, folding `.` and `..` without touching disk
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                ) && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Resolve an import specifier against the importing file's directory
///
/// Specifiers without a TypeScript extension get `extension` appended. When
/// that file does not exist, `.tsx` and `.d.ts` siblings are tried, then the
/// same names under `<specifier>/index`. If none exists the direct
/// candidate is returned and the caller decides what a missing file means.
pub fn resolve_import_path(importing_dir: &Path, specifier: &str, extension: &str) -> PathBuf {
    let joined = normalize_path(&importing_dir.join(specifier));
    if has_source_extension(&joined) {
        return joined;
    }
    let extension = extension.trim_start_matches('.');
    let suffixes = [extension, "tsx", "d.ts"];
    let direct = with_suffix(&joined, extension);

    let index = joined.join("index");
    suffixes
        .iter()
        .map(|suffix| with_suffix(&joined, suffix))
        .chain(suffixes.iter().map(|suffix| with_suffix(&index, suffix)))
        .find(|candidate| candidate.is_file())
        .unwrap_or(direct)
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    PathBuf::from(format!("{}.{}", path.display(), suffix))
}

fn has_source_extension(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("ts" | "tsx" | "mts" | "cts")
    )
}

/// Make a path absolute against the working directory, lexically
pub fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path)
        .map(|p| normalize_path(&p))
        .unwrap_or_else(|_| normalize_path(path))
}

/// Module specifier for `target` as seen from a file in `from_dir`
///
/// The extension (including a `.d.ts` suffix) is dropped, separators are
/// `/`, and same-or-lower directories get a `./` prefix so the result is
/// never a package name.
pub fn relative_import_specifier(from_dir: &Path, target: &Path) -> String {
    let from = absolute(from_dir);
    let target = absolute(&strip_source_extension(target));
    let relative = pathdiff::diff_paths(&target, &from).unwrap_or(target);

    let joined = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    if joined.starts_with("..") {
        joined
    } else {
        format!("./{}", joined)
    }
}

fn strip_source_extension(path: &Path) -> PathBuf {
    let stem = path.with_extension("");
    match stem.extension().and_then(|e| e.to_str()) {
        Some("d") => stem.with_extension(""),
        _ => stem,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("src/./api/../models/user.ts")), PathBuf::from("src/models/user.ts"));
        assert_eq!(normalize_path(Path::new("../shared/a.ts")), PathBuf::from("../shared/a.ts"));
        assert_eq!(normalize_path(Path::new("/root/../x")), PathBuf::from("/x"));
    }

    #[test]
    fn test_resolve_import_path_appends_extension() {
        let resolved = resolve_import_path(Path::new("src/api"), "../models/user", "ts");
        assert_eq!(resolved, PathBuf::from("src/models/user.ts"));
    }

    #[test]
    fn test_resolve_import_path_keeps_extension() {
        let resolved = resolve_import_path(Path::new("src"), "./types.ts", ".ts");
        assert_eq!(resolved, PathBuf::from("src/types.ts"));
    }

    #[test]
    fn test_resolve_import_path_index_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("models")).unwrap();
        std::fs::write(dir.path().join("models/index.ts"), "export interface A {}").unwrap();

        let resolved = resolve_import_path(dir.path(), "./models", "ts");
        assert_eq!(resolved, dir.path().join("models/index.ts"));
    }

    #[test]
    fn test_relative_import_specifier() {
        assert_eq!(
            relative_import_specifier(Path::new("/work/generated"), Path::new("/work/src/models/user.ts")),
            "../src/models/user"
        );
        assert_eq!(
            relative_import_specifier(Path::new("/work/src"), Path::new("/work/src/models/user.ts")),
            "./models/user"
        );
        assert_eq!(
            relative_import_specifier(Path::new("/work/src"), Path::new("/work/src/user.ts")),
            "./user"
        );
    }

    #[test]
    fn test_relative_import_specifier_drops_declaration_suffix() {
        assert_eq!(
            relative_import_specifier(Path::new("/work/client"), Path::new("/work/types/user.d.ts")),
            "../types/user"
        );
    }

    #[test]
    fn test_resolve_import_path_declaration_sibling() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("user.d.ts"), "export interface User {}").unwrap();
        std::fs::write(dir.path().join("widget.tsx"), "export interface Widget {}").unwrap();

        assert_eq!(resolve_import_path(dir.path(), "./user", "ts"), dir.path().join("user.d.ts"));
        assert_eq!(resolve_import_path(dir.path(), "./widget", "ts"), dir.path().join("widget.tsx"));
        assert_eq!(resolve_import_path(dir.path(), "./gone", "ts"), dir.path().join("gone.ts"));
    }
}
