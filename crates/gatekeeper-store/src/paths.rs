use crate::db::Access;
use crate::error::{Result, StoreError};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "gatekeeper";
const DB_FILENAME: &str = "gatekeeper.sqlite3";

/// `$XDG_DATA_HOME/gatekeeper`, falling back to `~/.local/share/gatekeeper`.
pub fn data_dir() -> Result<PathBuf> {
    match env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        Some(path) if path.as_os_str().is_empty() => Err(StoreError::InvalidDataPath(path)),
        Some(path) => Ok(path.join(APP_DIR)),
        None => {
            let home = dirs::home_dir().ok_or(StoreError::MissingHomeDir)?;
            Ok(home.join(".local").join("share").join(APP_DIR))
        }
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    Ok(data_dir()?.join(DB_FILENAME))
}

/// Picks the database for a command. An explicit path wins over the default.
///
/// Lookups need a snapshot that an import already wrote, so they never create
/// the file; imports get the parent directory created owner-only.
pub fn resolve_db_path(custom: Option<PathBuf>, access: Access) -> Result<PathBuf> {
    let path = match custom {
        Some(path) if path.as_os_str().is_empty() => {
            return Err(StoreError::InvalidDataPath(path));
        }
        Some(path) => path,
        None => default_db_path()?,
    };

    match access {
        Access::Snapshot if !path.is_file() => Err(StoreError::MissingDatabase(path)),
        Access::Snapshot => Ok(path),
        Access::ReadWrite => {
            if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                ensure_private_dir(parent)?;
            }
            Ok(path)
        }
    }
}

// Only directories created here are restricted; an existing parent keeps
// whatever mode its owner chose.
fn ensure_private_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        return Ok(());
    }
    fs::create_dir_all(dir)?;
    restrict_dir_permissions(dir)
}

#[cfg(unix)]
fn restrict_dir_permissions(dir: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_dir_permissions(_dir: &Path) -> Result<()> {
    Ok(())
}
