//! XDG Base Directory paths for relay.
//!
//! CLI tools should use XDG paths for cross-platform consistency,
//! not platform-native paths.

use std::path::PathBuf;

const APP_DIR: &str = "relay";

/// Get the relay config directory.
///
/// Returns `$XDG_CONFIG_HOME/relay` if set, otherwise `~/.config/relay`.
/// The user-level `config.toml` lives here.
///
/// # Examples
///
/// ```
/// use relay_paths::config_dir;
///
/// let config = config_dir().join("config.toml");
/// ```
pub fn config_dir() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", ".config")
}

fn xdg_dir(env_var: &str, home_relative: &str) -> PathBuf {
    match std::env::var(env_var) {
        Ok(base) if !base.is_empty() => PathBuf::from(base).join(APP_DIR),
        _ => match dirs::home_dir() {
            Some(home) => home.join(home_relative).join(APP_DIR),
            None => PathBuf::from(home_relative).join(APP_DIR),
        },
    }
}
