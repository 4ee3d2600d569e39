//! On-disk persistence of the current session.

use std::fs::{DirBuilder, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use debtbook_core::AuthError;
use debtbook_shared::Session;
use thiserror::Error;

/// Errors reading or writing the session file.
#[derive(Debug, Error)]
pub enum SessionFileError {
    /// Filesystem failure.
    #[error("session file I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file exists but does not hold a session.
    #[error("session file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl From<SessionFileError> for AuthError {
    fn from(err: SessionFileError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// JSON file holding the session between runs.
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    /// Creates a handle for `path`. Nothing is touched until the first call.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored session. A missing file is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(&self) -> Result<Option<Session>, SessionFileError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Writes `session`, replacing any previous one.
    ///
    /// The file holds bearer tokens: on unix it is created `0600` and any
    /// directory created for it `0700`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its directory cannot be written.
    pub fn save(&self, session: &Session) -> Result<(), SessionFileError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            private_dir_builder().create(parent)?;
        }

        let staged = self.path.with_extension("tmp");
        remove_if_present(&staged)?;
        let mut file = private_file_options().open(&staged)?;
        file.write_all(&serde_json::to_vec_pretty(session)?)?;
        file.sync_all()?;
        drop(file);

        std::fs::rename(&staged, &self.path)?;
        Ok(())
    }

    /// Deletes the file. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn remove(&self) -> Result<(), SessionFileError> {
        remove_if_present(&self.path)
    }
}

fn remove_if_present(path: &Path) -> Result<(), SessionFileError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn private_dir_builder() -> DirBuilder {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder
}

fn private_file_options() -> OpenOptions {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options
}
