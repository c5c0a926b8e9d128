//! Validation of user-supplied host directories.
//!
//! Resolution is pure: nothing is created or modified. A directory that is
//! removed after resolving is not detected later.

use crate::error::CoreError;
use crate::types::HostPath;
use std::io::ErrorKind;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

/// Resolve `input` against the current working directory.
pub fn resolve(input: &str) -> Result<HostPath, CoreError> {
    let cwd = std::env::current_dir().map_err(|e| {
        CoreError::invalid_path(input, format!("cannot determine current directory: {}", e))
    })?;
    resolve_relative_to(&cwd, input)
}

/// Resolve `input` to an absolute, symlink-free directory. Relative inputs are
/// joined onto `base`. Empty input is rejected rather than treated as `base`.
pub fn resolve_relative_to(base: &Path, input: &str) -> Result<HostPath, CoreError> {
    let cleaned = strip_quotes(input.trim()).trim();
    if cleaned.is_empty() {
        return Err(CoreError::invalid_path(input, "path is empty"));
    }

    let normalized = normalize_separators(cleaned);
    let expanded = expand_home(&normalized)
        .ok_or_else(|| CoreError::invalid_path(input, "cannot determine home directory"))?;

    let candidate = if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    };

    let canonical = candidate.canonicalize().map_err(|e| match e.kind() {
        ErrorKind::NotFound => CoreError::invalid_path(input, "no such directory"),
        _ => CoreError::invalid_path(input, format!("cannot resolve: {}", e)),
    })?;

    if !canonical.is_dir() {
        return Err(CoreError::invalid_path(input, "not a directory"));
    }

    let resolved = strip_verbatim_prefix(canonical);
    if has_binding_separator(&resolved) {
        return Err(CoreError::invalid_path(
            input,
            format!("'{}' contains ':', which cannot be bind-mounted", resolved.display()),
        ));
    }
    tracing::debug!(input = %input, resolved = %resolved.display(), "Resolved host path");
    Ok(HostPath::new(resolved))
}

/// Paths dragged in from a file manager often arrive wrapped in quotes.
fn strip_quotes(s: &str) -> &str {
    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

fn normalize_separators(s: &str) -> String {
    let foreign = if MAIN_SEPARATOR == '/' { '\\' } else { '/' };
    s.replace(foreign, &MAIN_SEPARATOR.to_string())
}

fn expand_home(s: &str) -> Option<PathBuf> {
    if s == "~" {
        return dirs::home_dir();
    }
    match s.strip_prefix('~') {
        Some(rest) if rest.starts_with(MAIN_SEPARATOR) => {
            dirs::home_dir().map(|home| home.join(&rest[1..]))
        }
        _ => Some(PathBuf::from(s)),
    }
}

/// Volume bindings are `HOST:CONTAINER[:ro]`, so a `:` in the host part is
/// ambiguous. A Windows drive prefix is fine.
fn has_binding_separator(path: &Path) -> bool {
    let s = path.to_string_lossy();
    let rest = if cfg!(windows) && s.as_bytes().get(1) == Some(&b':') {
        &s[2..]
    } else {
        &s[..]
    };
    rest.contains(':')
}

#[cfg(windows)]
fn strip_verbatim_prefix(path: PathBuf) -> PathBuf {
    // Docker cannot bind-mount `\\?\C:\...`; UNC verbatim paths are left alone.
    match path.to_str() {
        Some(s) if s.starts_with(r"\\?\") && !s.starts_with(r"\\?\UNC\") => PathBuf::from(&s[4..]),
        _ => path,
    }
}

#[cfg(not(windows))]
fn strip_verbatim_prefix(path: PathBuf) -> PathBuf {
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn is_invalid_path(result: Result<HostPath, CoreError>) -> bool {
        matches!(result, Err(CoreError::InvalidPath { .. }))
    }

    #[test]
    fn test_resolve_existing_directory() {
        let dir = TempDir::new().unwrap();
        let resolved = resolve(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(resolved.as_path(), dir.path().canonicalize().unwrap());
        assert!(resolved.as_path().is_absolute());
    }

    #[test]
    fn test_empty_input_is_not_current_directory() {
        let dir = TempDir::new().unwrap();
        assert!(is_invalid_path(resolve_relative_to(dir.path(), "")));
        assert!(is_invalid_path(resolve_relative_to(dir.path(), "   \t")));
        assert!(is_invalid_path(resolve_relative_to(dir.path(), "\"\"")));
    }

    #[test]
    fn test_missing_path_is_invalid() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nonexistent");
        assert!(is_invalid_path(resolve(missing.to_str().unwrap())));
    }

    #[test]
    fn test_file_is_not_a_directory() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("data.zarr.json");
        std::fs::write(&file, "{}").unwrap();

        match resolve(file.to_str().unwrap()) {
            Err(CoreError::InvalidPath { reason, .. }) => assert_eq!(reason, "not a directory"),
            other => panic!("expected InvalidPath, got {:?}", other),
        }
    }

    #[test]
    fn test_relative_segments_are_resolved() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("a/b")).unwrap();

        let resolved = resolve_relative_to(dir.path(), "a/b/../b/.").unwrap();
        assert_eq!(
            resolved.as_path(),
            dir.path().join("a/b").canonicalize().unwrap()
        );
    }

    #[test]
    fn test_quotes_and_whitespace_are_stripped() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("sample")).unwrap();
        let expected = dir.path().join("sample").canonicalize().unwrap();

        let quoted = format!("  \"{}\"  ", dir.path().join("sample").display());
        assert_eq!(resolve(&quoted).unwrap().as_path(), expected);

        let single = format!("'{}'", dir.path().join("sample").display());
        assert_eq!(resolve(&single).unwrap().as_path(), expected);
    }

    #[cfg(unix)]
    #[test]
    fn test_foreign_separators_are_normalized() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("a/b")).unwrap();

        let resolved = resolve_relative_to(dir.path(), r"a\b").unwrap();
        assert_eq!(
            resolved.as_path(),
            dir.path().join("a/b").canonicalize().unwrap()
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_is_resolved_to_target() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("real");
        std::fs::create_dir(&target).unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let resolved = resolve(link.to_str().unwrap()).unwrap();
        assert_eq!(resolved.as_path(), target.canonicalize().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_colon_in_path_is_rejected() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("a:b")).unwrap();

        match resolve_relative_to(dir.path(), "a:b") {
            Err(CoreError::InvalidPath { reason, .. }) => assert!(reason.contains("':'")),
            other => panic!("expected InvalidPath, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_to_colon_path_is_rejected() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("x:y");
        std::fs::create_dir(&target).unwrap();
        let link = dir.path().join("plain");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        assert!(is_invalid_path(resolve_relative_to(dir.path(), "plain")));
    }

    #[test]
    fn test_strip_quotes_leaves_unbalanced_input() {
        assert_eq!(strip_quotes("\"abc"), "\"abc");
        assert_eq!(strip_quotes("'abc'"), "abc");
        assert_eq!(strip_quotes("\""), "\"");
    }
}
