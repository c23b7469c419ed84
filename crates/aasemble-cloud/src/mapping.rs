//! Identifier mappings
//!
//! Translate logical names such as `trusty` or `large` into provider
//! identifiers. Unmapped names pass through unchanged.
//!
//! Logical names match case-insensitively, since INI keys are lowercased
//! when a mapping file is loaded. Provider identifiers keep their case.

use crate::error::Result;
use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const IMAGES: &str = "images";
pub const FLAVORS: &str = "flavors";

/// Per-category translation tables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mappings {
    tables: HashMap<String, HashMap<String, String>>,
}

impl Mappings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load mappings from an INI file, one section per category
    ///
    /// ```ini
    /// [images]
    /// trusty = ubuntu-14-04-x64
    ///
    /// [flavors]
    /// small = 512mb
    /// ```
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = Config::builder()
            .add_source(File::from(path).format(FileFormat::Ini))
            .build()?;
        let loaded: Self = config.try_deserialize()?;
        let mut mappings = Self::new();
        mappings.merge(loaded);
        tracing::debug!(
            "Loaded {} mapping categories from {}",
            mappings.tables.len(),
            path.display()
        );
        Ok(mappings)
    }

    pub fn with(
        mut self,
        category: impl Into<String>,
        logical: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        self.insert(category, logical, provider);
        self
    }

    pub fn insert(
        &mut self,
        category: impl Into<String>,
        logical: impl Into<String>,
        provider: impl Into<String>,
    ) {
        self.tables
            .entry(category.into().to_lowercase())
            .or_default()
            .insert(logical.into().to_lowercase(), provider.into());
    }

    /// Overlay `other` on top of these mappings
    pub fn merge(&mut self, other: Mappings) {
        for (category, table) in other.tables {
            for (logical, provider) in table {
                self.insert(category.as_str(), logical, provider);
            }
        }
    }

    /// Look up `name` in `category`, falling back to `name` itself
    pub fn apply<'a>(&'a self, category: &str, name: &'a str) -> &'a str {
        self.tables
            .get(&category.to_lowercase())
            .and_then(|table| table.get(&name.to_lowercase()))
            .map(String::as_str)
            .unwrap_or(name)
    }
}
