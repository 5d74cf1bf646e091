use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Result, RewriteError};

/// Replace the file at `path` with `bytes`.
///
/// The bytes go to a temporary file in the same directory, which is synced,
/// given the original's permissions and then renamed over `path`. Until the
/// rename succeeds the original is untouched, and on any error the temporary
/// file is removed.
pub fn commit(path: &Path, bytes: &[u8], backup: bool) -> Result<()> {
    let err = |source: std::io::Error| RewriteError::Commit {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let permissions = std::fs::metadata(path).map_err(err)?.permissions();

    let mut tmp = tempfile::Builder::new()
        .prefix(".tzfix-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(err)?;
    tmp.write_all(bytes).map_err(err)?;
    tmp.as_file().sync_all().map_err(err)?;
    tmp.as_file().set_permissions(permissions).map_err(err)?;

    if backup {
        backup_file(path).map_err(err)?;
    }

    tmp.persist(path).map_err(|e| err(e.error))?;
    log::debug!("Replaced {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

/// Copy `path` to `<path>.<ext>.bak` unless that backup already exists.
pub fn backup_file(path: &Path) -> std::io::Result<PathBuf> {
    let backup_path = path.with_extension(format!(
        "{}.bak",
        path.extension().unwrap_or_default().to_string_lossy()
    ));

    if !backup_path.exists() {
        std::fs::copy(path, &backup_path)?;
        log::debug!("Backup created: {}", backup_path.display());
    }

    Ok(backup_path)
}
