//! Atomic file replacement.
//!
//! Output files are written to a temporary file in the destination directory
//! and renamed over the target only after every byte has been flushed. A
//! failed write leaves the previous file (or no file) in place, never a
//! truncated one.

use std::io::{BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{ForecastError, Result};

/// Write `path` atomically using `write` to produce the contents.
pub fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> std::io::Result<()>,
{
    let output_err = |message: String| ForecastError::Output {
        path: path.to_path_buf(),
        message,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !dir.is_dir() {
        return Err(output_err(format!("directory '{}' does not exist", dir.display())));
    }

    let tmp = NamedTempFile::new_in(dir).map_err(|e| output_err(format!("cannot create temporary file: {e}")))?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        write(&mut writer).map_err(|e| output_err(e.to_string()))?;
        writer.flush().map_err(|e| output_err(e.to_string()))?;
    }
    tmp.as_file()
        .sync_all()
        .map_err(|e| output_err(format!("sync failed: {e}")))?;
    tmp.persist(path)
        .map_err(|e| output_err(format!("rename failed: {}", e.error)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_existing_file_and_leaves_no_temporaries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "old").unwrap();

        write_atomically(&path, |w| w.write_all(b"new")).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn failed_write_keeps_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "old").unwrap();

        let err = write_atomically(&path, |w| {
            w.write_all(b"partial")?;
            Err(std::io::Error::other("disk full"))
        })
        .unwrap_err();

        assert!(matches!(err, ForecastError::Output { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "old");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn missing_directory_is_an_output_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("out.csv");
        let err = write_atomically(&path, |w| w.write_all(b"x")).unwrap_err();
        assert!(matches!(err, ForecastError::Output { .. }));
    }
}
