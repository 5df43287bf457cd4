// dqc-core/src/infrastructure/fs.rs

use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::infrastructure::error::InfrastructureError;

/// Writes through a temp file in the target directory, then renames over `path`.
/// Readers see either the old content or the new one, never a partial file.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    if !parent.exists() {
        fs::create_dir_all(parent)?;
    }

    let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
    temp_file.write_all(content.as_ref())?;
    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;
    Ok(())
}

/// `<dir>/<model_id>.sql`, surrounding whitespace stripped.
pub fn write_sql_model(
    dir: &Path,
    model_id: &str,
    sql: &str,
) -> Result<PathBuf, InfrastructureError> {
    let path = dir.join(format!("{}.sql", model_id));
    atomic_write(&path, sql.trim())?;
    Ok(path)
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), InfrastructureError> {
    let body = serde_json::to_string_pretty(value)?;
    atomic_write(path, body)
}
