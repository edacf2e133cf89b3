use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE_NAME: &str = "taskdeck";

/// Key the access token is stored under.
const TOKEN_KEY: &str = "access-token";

/// OS keychain storage for the one persisted credential: the opaque
/// bearer token. Absence of the entry means unauthenticated.
#[derive(Debug, Clone, Copy, Default)]
pub struct CredentialStore;

impl CredentialStore {
    fn entry() -> Result<Entry> {
        Entry::new(SERVICE_NAME, TOKEN_KEY).context("Failed to create keyring entry")
    }

    /// Store the access token in the OS keychain
    pub fn store(&self, token: &str) -> Result<()> {
        Self::entry()?
            .set_password(token)
            .context("Failed to store token in keychain")?;
        Ok(())
    }

    /// Retrieve the stored access token, None when nothing is stored
    pub fn load(&self) -> Result<Option<String>> {
        match Self::entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(err).context("Failed to read token from keychain"),
        }
    }

    /// Delete the stored access token; a missing entry is not an error
    pub fn delete(&self) -> Result<()> {
        match Self::entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(err).context("Failed to delete token from keychain"),
        }
    }
}
