use std::sync::Arc;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::{
    models::Credential,
    storage::{Record, RecordStore, RecordStoreExt, Resource, StorageError, TenantKey},
};

/// Authenticated caller identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub name: Arc<str>,
}

/// Explicit per-request context: who is acting and which partition their
/// records live in. `tenant` is `None` for the shared, single-user partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub identity: CallerIdentity,
    pub tenant: Option<TenantKey>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self {
            identity: CallerIdentity {
                name: Arc::from("anonymous"),
            },
            tenant: None,
        }
    }

    pub fn tenant(&self) -> Option<&TenantKey> {
        self.tenant.as_ref()
    }

    /// Owner recorded on new rows.
    pub fn owner(&self) -> Option<Arc<str>> {
        self.tenant.as_ref().map(|_| self.identity.name.clone())
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("username and password must not be blank")]
    BlankCredentials,
    #[error("username {0} is already registered")]
    UserExists(String),
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub struct Authenticator {
    storage: Arc<dyn RecordStore>,
}

impl Authenticator {
    pub fn new(storage: Arc<dyn RecordStore>) -> Self {
        Self { storage }
    }

    pub fn register(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::BlankCredentials);
        }
        // The username doubles as the tenant key.
        TenantKey::new(username)?;

        let existing = self.storage.load_credentials()?;
        if existing.iter().any(|c| &*c.username == username) {
            return Err(AuthError::UserExists(username.to_string()));
        }

        let credential = Credential {
            username: Arc::from(username),
            password_hash: Arc::from(hash_password(password)),
        };
        self.storage.append(&[Record::Credential(credential)], Resource::Credentials, None)?;
        tracing::info!(user = %username, "Registered user");
        Ok(())
    }

    pub fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::BlankCredentials);
        }

        let hashed = hash_password(password);
        let credentials = self.storage.load_credentials()?;
        let found = credentials.iter().find(|c| {
            &*c.username == username && bool::from(c.password_hash.as_bytes().ct_eq(hashed.as_bytes()))
        });

        match found {
            Some(c) => {
                tracing::debug!(user = %c.username, "Authenticated");
                Ok(Session {
                    identity: CallerIdentity {
                        name: c.username.clone(),
                    },
                    tenant: Some(TenantKey::new(&c.username)?),
                })
            }
            None => {
                tracing::warn!(user = %username, "Failed login");
                Err(AuthError::InvalidCredentials)
            }
        }
    }
}
