//! Cloud configuration access
//!
//! Cloud configs are INI files grouped into sections, e.g.
//!
//! ```ini
//! [connection]
//! driver = digitalocean
//! api_key = ...
//! location = fra1
//! sshkey = ~/.ssh/id_rsa.pub
//! ```

use crate::error::{CloudError, Result};
use config::{Config, File, FileFormat};
use std::path::{Path, PathBuf};

/// A loaded cloud configuration
#[derive(Debug, Clone)]
pub struct CloudConfig {
    inner: Config,
}

impl CloudConfig {
    /// Load an INI cloud config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let inner = Config::builder()
            .add_source(File::from(path).format(FileFormat::Ini))
            .build()?;
        tracing::debug!("Loaded cloud config from {}", path.display());
        Ok(Self { inner })
    }

    pub fn from_config(inner: Config) -> Self {
        Self { inner }
    }

    /// Read `section.key`, failing if it is absent
    pub fn required(&self, section: &str, key: &str) -> Result<String> {
        self.optional(section, key)?.ok_or_else(|| {
            CloudError::InvalidConfig(format!("missing required option {}.{}", section, key))
        })
    }

    /// Read `section.key` if present
    pub fn optional(&self, section: &str, key: &str) -> Result<Option<String>> {
        match self.inner.get_string(&format!("{}.{}", section, key)) {
            Ok(value) => Ok(Some(value)),
            Err(config::ConfigError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl From<Config> for CloudConfig {
    fn from(inner: Config) -> Self {
        Self::from_config(inner)
    }
}

/// Expand a leading `~` to the user's home directory
pub fn expand_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}
