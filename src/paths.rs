//! Path resolution for reqdeploy
//!
//! # Environment Variables
//!
//! - `REQDEPLOY_CONFIG` - Explicit config file
//! - `REQDEPLOY_CONFIG_DIR` - Override config directory
//!
//! # Config File Resolution Priority
//!
//! 1. `--config PATH` on the command line
//! 2. `REQDEPLOY_CONFIG` environment variable
//! 3. `./reqdeploy.toml` in the current directory
//! 4. `<config dir>/config.toml`, where the config dir is
//!    `REQDEPLOY_CONFIG_DIR`, then `XDG_CONFIG_HOME/reqdeploy`, then
//!    `~/.config/reqdeploy`

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable for an explicit config file
pub const ENV_CONFIG: &str = "REQDEPLOY_CONFIG";

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "REQDEPLOY_CONFIG_DIR";

/// Config file name looked up in the current directory
pub const LOCAL_CONFIG: &str = "reqdeploy.toml";

/// Get the reqdeploy config directory path
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = expand(&dir);
        log::debug!(
            "Using config dir from {}: {}",
            ENV_CONFIG_DIR,
            path.display()
        );
        return Ok(path);
    }

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg_config).join("reqdeploy");
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".config").join("reqdeploy");
    log::debug!("Using default config dir: {}", path.display());
    Ok(path)
}

/// Locate the config file to load.
///
/// `explicit` comes from `--config`. Returns the path even if it does not
/// exist; the caller decides whether a missing file means defaults.
pub fn config_file(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(expand(&path.to_string_lossy()));
    }

    if let Ok(file) = std::env::var(ENV_CONFIG) {
        let path = expand(&file);
        log::debug!("Using config file from {}: {}", ENV_CONFIG, path.display());
        return Ok(path);
    }

    let local = PathBuf::from(LOCAL_CONFIG);
    if local.is_file() {
        log::debug!("Using config file in current directory");
        return Ok(local);
    }

    Ok(config_dir()?.join("config.toml"))
}

/// Expand ~ and environment variables in a path string.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    /// Helper to run a test with temporary env var
    ///
    /// # Safety
    /// This function uses unsafe env::set_var/remove_var which can cause issues
    /// if other threads read environment variables concurrently.
    fn with_env_var<F, R>(key: &str, value: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let original = env::var(key).ok();
        // SAFETY: each test uses a distinct variable
        unsafe { env::set_var(key, value) };
        let result = f();
        match original {
            // SAFETY: see above
            Some(v) => unsafe { env::set_var(key, v) },
            None => unsafe { env::remove_var(key) },
        }
        result
    }

    #[test]
    fn test_config_dir_env_override() {
        with_env_var(ENV_CONFIG_DIR, "/custom/reqdeploy", || {
            assert_eq!(config_dir().unwrap(), PathBuf::from("/custom/reqdeploy"));
        });
    }

    #[test]
    fn test_config_file_env_override() {
        with_env_var(ENV_CONFIG, "/etc/reqdeploy/app.toml", || {
            assert_eq!(
                config_file(None).unwrap(),
                PathBuf::from("/etc/reqdeploy/app.toml")
            );
        });
    }

    #[test]
    fn test_explicit_config_wins() {
        let path = config_file(Some(Path::new("/srv/app/reqdeploy.toml"))).unwrap();
        assert_eq!(path, PathBuf::from("/srv/app/reqdeploy.toml"));
    }

    #[test]
    fn test_expand_tilde() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(expand("~/project"), home.join("project"));
        assert_eq!(expand("/absolute/path"), PathBuf::from("/absolute/path"));
    }
}
