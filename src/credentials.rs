//! Credential store for the OpenAI API key
//!
//! The key is persisted as an INI-style TOML file with a single section:
//!
//! ```toml
//! [openai]
//! OPENAI_API_KEY = "sk-..."
//! ```
//!
//! Loading or saving also exports `OPENAI_API_KEY` into the process
//! environment for libraries that read it from there; the in-memory copy is
//! what the rest of the application consumes.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable exported as a side effect of load/save.
pub const CREDENTIAL_ENV_VAR: &str = "OPENAI_API_KEY";

/// The API key secret. `Debug` is redacted so the key never leaks into logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey(***)")
    }
}

#[derive(Serialize, Deserialize)]
struct CredentialFile {
    openai: OpenAiSection,
}

#[derive(Serialize, Deserialize)]
struct OpenAiSection {
    #[serde(rename = "OPENAI_API_KEY")]
    api_key: String,
}

/// Durable store for the single API credential.
///
/// Created lazily: the file appears on the first validated save. A candidate
/// key can be installed transiently while a canary query decides whether it
/// is worth persisting.
pub struct CredentialStore {
    path: PathBuf,
    current: RwLock<Option<ApiKey>>,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            current: RwLock::new(None),
        }
    }

    /// Path of the credential file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a credential has been persisted.
    pub fn has_credential(&self) -> bool {
        self.path.exists()
    }

    /// Load the persisted credential into memory and the environment.
    pub fn load_credential(&self) -> Result<ApiKey> {
        if !self.path.exists() {
            return Err(Error::MissingCredential);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let file: CredentialFile = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("malformed credential file: {}", e)))?;
        let key = ApiKey::new(file.openai.api_key);
        self.install(key.clone());
        Ok(key)
    }

    /// Persist a validated credential and install it for this process.
    pub fn save_credential(&self, key: &ApiKey) -> Result<()> {
        let file = CredentialFile {
            openai: OpenAiSection {
                api_key: key.as_str().to_string(),
            },
        };
        let content = toml::to_string(&file)
            .map_err(|e| Error::Config(format!("failed to serialize credential: {}", e)))?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, content)?;
        self.install(key.clone());
        Ok(())
    }

    /// Install a candidate key for this process only, without persisting it.
    /// Used while a canary query decides whether the key is valid.
    pub fn install_transient(&self, key: ApiKey) {
        self.install(key);
    }

    /// Drop a transient key that failed validation.
    pub fn clear_transient(&self) {
        *self.current.write() = None;
        std::env::remove_var(CREDENTIAL_ENV_VAR);
    }

    /// The key currently usable by this process, loading from disk if needed.
    pub fn current(&self) -> Option<ApiKey> {
        if let Some(key) = self.current.read().clone() {
            return Some(key);
        }
        if self.path.exists() {
            return self.load_credential().ok();
        }
        None
    }

    fn install(&self, key: ApiKey) {
        std::env::set_var(CREDENTIAL_ENV_VAR, key.as_str());
        *self.current.write() = Some(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("credentials.toml"));
        let key = ApiKey::new("sk-test-123");

        assert!(!store.has_credential());
        store.save_credential(&key).unwrap();
        assert!(store.has_credential());

        // A fresh store reading the same file sees the same secret
        let other = CredentialStore::new(dir.path().join("credentials.toml"));
        let loaded = other.load_credential().unwrap();
        assert_eq!(loaded, key);
    }

    #[test]
    fn test_load_missing_credential() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("credentials.toml"));

        match store.load_credential() {
            Err(Error::MissingCredential) => {}
            other => panic!("expected MissingCredential, got {:?}", other),
        }
    }

    #[test]
    fn test_file_uses_ini_style_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.toml");
        let store = CredentialStore::new(&path);
        store.save_credential(&ApiKey::new("sk-sectioned")).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[openai]"));
        assert!(content.contains("OPENAI_API_KEY = \"sk-sectioned\""));
    }

    #[test]
    fn test_transient_key_is_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("credentials.toml"));

        store.install_transient(ApiKey::new("sk-candidate"));
        assert!(store.current().is_some());
        assert!(!store.has_credential());

        store.clear_transient();
        assert!(store.current().is_none());
        assert!(!store.has_credential());
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = ApiKey::new("sk-secret-value");
        let debug = format!("{:?}", key);
        assert!(!debug.contains("secret"));
        assert_eq!(debug, "ApiKey(***)");
    }
}
