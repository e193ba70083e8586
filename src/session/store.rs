use std::path::{Path, PathBuf};

use crate::{config, error::SessionStoreError, types::Session};

/// JSON file holding the persisted [`Session`].
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// `<data_local_dir>/spotshuffle/cache/session.json`
    pub fn default_location() -> Self {
        Self::at(config::data_dir().join("cache").join("session.json"))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when nobody has logged in yet.
    pub async fn load(&self) -> Result<Option<Session>, SessionStoreError> {
        let content = match async_fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let session: Session = serde_json::from_str(&content)?;
        Ok(Some(session))
    }

    /// Writes `session` as pretty-printed JSON, creating the parent directory.
    ///
    /// # Errors
    ///
    /// Returns [`SessionStoreError::Io`] if the directory or file cannot be
    /// written.
    pub async fn persist(&self, session: &Session) -> Result<(), SessionStoreError> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(session)?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }

    /// Removes the session file. Returns whether there was one.
    pub async fn clear(&self) -> Result<bool, SessionStoreError> {
        match async_fs::remove_file(&self.path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
