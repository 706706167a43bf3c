use std::{io::Write, path::Path};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

/// Write `bytes` to `path` without ever leaving a half-written file.
///
/// The content goes to a temporary file in the target's directory first and
/// is then renamed over the target. The directory must already exist.
pub fn write(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in: {}", dir.display()))?;
    file.write_all(bytes)
        .and_then(|_| file.flush())
        .with_context(|| format!("Failed to write file: {}", path.display()))?;
    file.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to write file: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_write_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("messages.po");

        write(&path, b"content").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"content");
    }

    #[test]
    fn test_write_replaces_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("messages.po");
        fs::write(&path, "old").unwrap();

        write(&path, b"new").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        // No temporary files are left behind
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_fails_without_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("messages.po");

        assert!(write(&path, b"x").is_err());
        assert!(!path.exists());
    }
}
