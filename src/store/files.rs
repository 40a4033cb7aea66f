use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::{MigrateError, Result};

/// Read a file that the migration cannot proceed without.
pub fn read_required(path: &Path) -> Result<Vec<u8>> {
    if !path.is_file() {
        return Err(MigrateError::MissingFile(path.to_path_buf()));
    }
    Ok(fs::read(path)?)
}

fn staging_path(path: &Path) -> Result<PathBuf> {
    let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
        return Err(MigrateError::InvariantViolation(format!(
            "cannot stage write for '{}': no parent directory or file name",
            path.display()
        )));
    };
    let nonce = Uuid::new_v4();
    Ok(parent.join(format!(
        ".{}.{nonce}.staging",
        name.to_string_lossy()
    )))
}

/// Publish a staged file with a rename, cleaning up on failure.
fn publish(staging: &Path, path: &Path, staged: std::io::Result<()>) -> Result<()> {
    if let Err(err) = staged.and_then(|()| fs::rename(staging, path)) {
        let _ = fs::remove_file(staging);
        return Err(err.into());
    }
    Ok(())
}

/// Write `data` to `path` through a sibling staging file and a rename, so a
/// crash never leaves a truncated file under the final name.
///
/// Parent directories are created as needed.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let staging = staging_path(path)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let staged = fs::write(&staging, data);
    publish(&staging, path, staged)
}

/// Copy `src` to `dst` with the same staging-then-rename guarantee as
/// [`write_atomic`].
pub fn copy_atomic(src: &Path, dst: &Path) -> Result<()> {
    let staging = staging_path(dst)?;
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }
    let staged = fs::copy(src, &staging).map(|_| ());
    publish(&staging, dst, staged)
}
