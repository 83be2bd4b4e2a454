//! Per-user stats persistence with file locking.
//!
//! All users' stats live in one JSON object keyed by user id. Writes go
//! through a locked temp file that is renamed into place. `update` holds an
//! exclusive lock on a `.lock` sidecar for the whole read-modify-write, so
//! concurrent writers never drop each other's rows.

use crate::{Error, Result, UserId, UserStats};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// On-disk stats table
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StatsTable {
    #[serde(default)]
    pub users: BTreeMap<String, UserStats>,
}

impl StatsTable {
    pub fn get(&self, user: &UserId) -> Option<&UserStats> {
        self.users.get(user.as_str())
    }

    pub fn entry(&mut self, user: &UserId) -> &mut UserStats {
        self.users.entry(user.as_str().to_string()).or_default()
    }

    /// Load the table with a shared lock
    ///
    /// Returns an empty table if the file doesn't exist.
    /// If the file is unreadable or corrupted, logs a warning and returns
    /// an empty table.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No stats file at {:?}, starting empty", path);
            return Ok(Self::default());
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open stats file {:?}: {}. Using defaults.", path, e);
                return Ok(Self::default());
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock stats file {:?}: {}. Using defaults.", path, e);
            return Ok(Self::default());
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!("Failed to read stats file {:?}: {}. Using defaults.", path, e);
            return Ok(Self::default());
        }

        file.unlock()?;

        match serde_json::from_str::<StatsTable>(&contents) {
            Ok(table) => {
                tracing::debug!("Loaded stats for {} users from {:?}", table.users.len(), path);
                Ok(table)
            }
            Err(e) => {
                tracing::warn!("Failed to parse stats file {:?}: {}. Using defaults.", path, e);
                Ok(Self::default())
            }
        }
    }

    /// Save atomically: locked temp file, fsync, rename
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| Error::Other(format!("stats path {:?} has no parent", path)))?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            serde_json::to_writer_pretty(&mut writer, self)?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved stats to {:?}", path);
        Ok(())
    }

    /// Load, modify and save back under the sidecar lock
    pub fn update<F>(path: &Path, f: F) -> Result<Self>
    where
        F: FnOnce(&mut StatsTable),
    {
        let lock = open_lock_file(path)?;
        lock.lock_exclusive()?;

        let mut table = Self::load(path)?;
        f(&mut table);
        let saved = table.save(path);

        lock.unlock()?;
        saved.map(|_| table)
    }
}

/// `user_stats.json` -> `user_stats.json.lock`
pub fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

fn open_lock_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(lock_path(path))?)
}
