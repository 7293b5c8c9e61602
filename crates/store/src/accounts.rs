//! Account list file loading.

use std::path::Path;

use pipeline::accounts::parse_account_list;
use pipeline::{ConfigError, Platform, TrackedAccount};
use tracing::info;

/// Reads the account list at `path` for `platform`.
///
/// A missing or unreadable file is a configuration error: there is nothing
/// sensible to monitor without it.
pub fn load_account_list(
    path: &Path,
    platform: Platform,
) -> Result<Vec<TrackedAccount>, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::AccountList {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let accounts = parse_account_list(&text, platform);
    info!(
        path = %path.display(),
        %platform,
        count = accounts.len(),
        "account list loaded"
    );
    Ok(accounts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn loads_entries_in_file_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("accounts.txt");
        std::fs::write(&path, "DecagonAI:Decagon\nSierraPlatform:Sierra\n").unwrap();
        let accounts = load_account_list(&path, Platform::Twitter).unwrap();
        let ids: Vec<&str> = accounts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["DecagonAI", "SierraPlatform"]);
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let err = load_account_list(&dir.path().join("nope.txt"), Platform::Twitter).unwrap_err();
        assert!(matches!(err, ConfigError::AccountList { .. }));
    }
}
