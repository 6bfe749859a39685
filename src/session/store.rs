//! Storage backends for the session credential.
//!
//! A store holds exactly one record and only ever replaces it whole, so a
//! reader sees either the previous record or the new one.

use std::path::PathBuf;

use crate::error::SessionError;

type Result<T> = std::result::Result<T, SessionError>;

/// Load/save/clear contract for the single persisted session record
pub trait SessionStore: Send + Sync {
    /// Raw stored record, `None` if nothing is stored
    fn load(&self) -> Result<Option<String>>;

    /// Replace the stored record
    fn save(&self, contents: &str) -> Result<()>;

    /// Remove the stored record; succeeds when nothing is stored
    fn clear(&self) -> Result<()>;
}

/// Session record kept as a JSON file (`~/.syntexa/session.json` by default)
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[cfg(test)]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "session".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SessionStore for FileStore {
    fn load(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, contents: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Write then rename so the record is never observed half-written
        let tmp = self.temp_path();
        std::fs::write(&tmp, contents)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&tmp)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&tmp, perms)?;
        }

        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store for tests
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    record: std::sync::Mutex<Option<String>>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn with_record(contents: &str) -> Self {
        Self {
            record: std::sync::Mutex::new(Some(contents.to_string())),
        }
    }
}

#[cfg(test)]
impl SessionStore for MemoryStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.record.lock().unwrap().clone())
    }

    fn save(&self, contents: &str) -> Result<()> {
        *self.record.lock().unwrap() = Some(contents.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.record.lock().unwrap() = None;
        Ok(())
    }
}
