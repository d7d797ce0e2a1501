//! Secure credential storage via the system keychain.
//!
//! Provides functions to load, save, and check API keys stored in
//! the system keychain. At startup, [`populate_env_from_keychain`]
//! copies any stored credentials into environment variables so the
//! config flow in [`crate::config`] picks them up transparently.

use tracing::{debug, warn};
use zeroize::Zeroizing;

/// Keychain service name used for all stored credentials.
const SERVICE: &str = "blyv";

/// Known API credential keys managed by this module.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialKey {
    SolanaTrackerApiKey,
    LlmApiKey,
}

impl CredentialKey {
    /// Returns the keychain entry identifier.
    pub fn keyring_id(self) -> &'static str {
        match self {
            Self::SolanaTrackerApiKey => "solana_tracker_api_key",
            Self::LlmApiKey => "llm_api_key",
        }
    }

    /// Returns the environment variable name for this credential.
    pub fn env_var(self) -> &'static str {
        match self {
            Self::SolanaTrackerApiKey => "SOLANA_TRACKER_API_KEY",
            Self::LlmApiKey => "LLM_API_KEY",
        }
    }

    /// Returns a human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::SolanaTrackerApiKey => "Solana Tracker API Key",
            Self::LlmApiKey => "LLM API Key",
        }
    }

    /// All credential keys in display order.
    pub const ALL: [CredentialKey; 2] = [Self::SolanaTrackerApiKey, Self::LlmApiKey];
}

/// Loads a credential from the keychain, returning `None` if not set.
pub fn load(key: CredentialKey) -> Option<Zeroizing<String>> {
    let entry = keyring::Entry::new(SERVICE, key.keyring_id()).ok()?;
    match entry.get_password() {
        Ok(password) => Some(Zeroizing::new(password)),
        Err(keyring::Error::NoEntry) => None,
        Err(e) => {
            warn!(key = key.keyring_id(), error = %e, "failed to read keychain entry");
            None
        }
    }
}

/// Saves a credential to the keychain.
pub fn save(key: CredentialKey, value: &str) -> crate::Result<()> {
    let entry = keyring::Entry::new(SERVICE, key.keyring_id())
        .map_err(|e| crate::BlyvError::Config(format!("keyring entry error: {e}")))?;
    entry
        .set_password(value)
        .map_err(|e| crate::BlyvError::Config(format!("failed to save {}: {e}", key.label())))
}

/// Checks whether a credential exists in the keychain.
pub fn is_set(key: CredentialKey) -> bool {
    load(key).is_some()
}

/// Populates environment variables from the keychain for any
/// credentials not already set in the environment.
///
/// Call this at startup before [`crate::config::fetch_config`].
pub fn populate_env_from_keychain() {
    for key in CredentialKey::ALL {
        if std::env::var(key.env_var()).is_err()
            && let Some(value) = load(key)
        {
            debug!(key = key.env_var(), "loaded credential from keychain");
            // SAFETY: called from `main` before the runtime spawns any task.
            unsafe {
                std::env::set_var(key.env_var(), value.as_str());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_vars_match_config_names() {
        assert_eq!(
            CredentialKey::SolanaTrackerApiKey.env_var(),
            "SOLANA_TRACKER_API_KEY"
        );
        assert_eq!(CredentialKey::LlmApiKey.env_var(), "LLM_API_KEY");
    }

    #[test]
    fn keyring_ids_are_distinct() {
        let ids: Vec<&str> = CredentialKey::ALL.iter().map(|k| k.keyring_id()).collect();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
    }
}
