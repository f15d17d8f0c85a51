// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::{AuthResponse, StoreError};

/// Supplies the bearer token attached to outgoing requests.
///
/// The client asks for the token on every request, so a provider backed by a
/// [`SessionStore`] picks up logins and logouts without rebuilding the client.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialProvider: Send + Sync {
    /// The current access token, if any.
    fn access_token(&self) -> Option<String>;

    /// Whether a token is available.
    fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }
}

/// The signed-in user as remembered between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Identifier assigned by the service.
    pub user_id: String,
    /// Sign-in email.
    pub email: String,
    /// Role reported by the service.
    pub role: String,
    /// Token sent as `Authorization: Bearer`.
    pub access_token: String,
    /// Token that can be exchanged for a new access token.
    pub refresh_token: String,
    /// Unix timestamp, in seconds, after which the access token is rejected.
    pub expires_at: i64,
}

impl From<AuthResponse> for Session {
    fn from(response: AuthResponse) -> Self {
        Self {
            user_id: response.user_id,
            email: response.email,
            role: response.role,
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_at: response.expires_at,
        }
    }
}

/// Keeps the current [`Session`].
///
/// Every store is also a [`CredentialProvider`] for the session it holds.
pub trait SessionStore: CredentialProvider {
    /// The stored session, if any.
    fn load(&self) -> Option<Session>;

    /// Replaces the stored session.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the session could not be persisted.
    fn save(&self, session: Session) -> Result<(), StoreError>;

    /// Forgets the stored session. Clearing an empty store succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if persisted state could not be removed.
    fn clear(&self) -> Result<(), StoreError>;
}

/// A session store that lives as long as the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: RwLock<Option<Session>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialProvider for MemorySessionStore {
    fn access_token(&self) -> Option<String> {
        self.session.read().as_ref().map(|session| session.access_token.clone())
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Option<Session> {
        self.session.read().clone()
    }

    fn save(&self, session: Session) -> Result<(), StoreError> {
        *self.session.write() = Some(session);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.session.write() = None;
        Ok(())
    }
}

/// A session store persisted as a JSON file.
///
/// The file is read once when the store is opened and rewritten on every
/// [`save`][SessionStore::save]. On Unix the file is only readable by its owner.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    session: RwLock<Option<Session>>,
}

impl FileSessionStore {
    /// Opens the store at `path`. A missing file means no session.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file exists but cannot be read and
    /// [`StoreError::Json`] if it does not contain a session.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let session = match fs::read_to_string(&path) {
            Ok(json) => Some(serde_json::from_str(&json)?),
            Err(error) if error.kind() == ErrorKind::NotFound => None,
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        Ok(Self {
            path,
            session: RwLock::new(session),
        })
    }

    /// The location of the session file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn write_file(&self, session: &Session) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }

        let json = serde_json::to_string_pretty(session)?;

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path).map_err(|source| self.io_error(source))?;

        // `mode` only applies to new files; an existing file is narrowed before the token lands
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(|source| self.io_error(source))?;
        }

        file.write_all(json.as_bytes()).map_err(|source| self.io_error(source))?;
        file.sync_all().map_err(|source| self.io_error(source))
    }
}

impl CredentialProvider for FileSessionStore {
    fn access_token(&self) -> Option<String> {
        self.session.read().as_ref().map(|session| session.access_token.clone())
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Option<Session> {
        self.session.read().clone()
    }

    fn save(&self, session: Session) -> Result<(), StoreError> {
        let mut guard = self.session.write();
        self.write_file(&session)?;
        *guard = Some(session);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut guard = self.session.write();
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(error) if error.kind() == ErrorKind::NotFound => {}
            Err(source) => return Err(self.io_error(source)),
        }
        *guard = None;
        Ok(())
    }
}
