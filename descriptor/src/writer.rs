use crate::error::DescriptorError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Replace the file at `path` with `contents`.
///
/// The content goes to a sibling temp file first and is renamed over the
/// target, so a reader never observes a half-written descriptor. Whatever was
/// at `path` before is discarded.
pub fn replace_write(path: &Path, contents: &str) -> Result<(), DescriptorError> {
    let tmp_path = temp_sibling(path);

    let result = std::fs::write(&tmp_path, contents)
        .and_then(|()| std::fs::rename(&tmp_path, path));

    if let Err(source) = result {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(DescriptorError::Write {
            path: path.to_path_buf(),
            source,
        });
    }

    tracing::debug!(path = %path.display(), bytes = contents.len(), "Wrote generated file");
    Ok(())
}

/// Remove a generated file. Returns whether a file was actually removed;
/// a missing file is not an error.
pub fn remove_if_exists(path: &Path) -> std::io::Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "descriptor".to_string());
    path.with_file_name(format!(".{}.{}.tmp", file_name, std::process::id()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_replace_write_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docker-compose.yml");
        std::fs::write(&path, "stale: true\nextra: data\n").unwrap();

        replace_write(&path, "fresh: true\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fresh: true\n");
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_replace_write_into_missing_parent_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        let path = blocker.join("docker-compose.yml");

        let err = replace_write(&path, "services: {}\n").unwrap_err();
        match err {
            DescriptorError::Write { path: failed, .. } => assert_eq!(failed, path),
            other => panic!("expected Write error, got {:?}", other),
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_remove_if_exists_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docker-compose.yml");
        std::fs::write(&path, "").unwrap();

        assert!(remove_if_exists(&path).unwrap());
        assert!(!remove_if_exists(&path).unwrap());
        assert!(!path.exists());
    }
}
