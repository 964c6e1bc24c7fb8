//! Fetcher token custody
//!
//! Token acquisition and refresh belong to the external fetcher; the daemon
//! only verifies the token file exists, routing its absence through the
//! registry at startup.

use std::path::PathBuf;

use wishbot_domain::{Result, WishBotError};

/// Presence check for the external fetcher's OAuth token file
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Create a token store over the given token file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Verify the token file exists.
    ///
    /// # Errors
    /// `WishBotError::TokenMissing` when it does not.
    pub fn ensure_present(&self) -> Result<()> {
        if self.path.exists() {
            return Ok(());
        }
        Err(WishBotError::TokenMissing(format!(
            "Token file not found. Run the authentication script first. ({})",
            self.path.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn present_token_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(&path, "{}").unwrap();
        assert!(TokenStore::new(path).ensure_present().is_ok());
    }

    #[test]
    fn absent_token_is_token_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = TokenStore::new(dir.path().join("token.json")).ensure_present().unwrap_err();
        assert!(matches!(err, WishBotError::TokenMissing(_)));
    }
}
