use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use thiserror::Error;

use crate::adapters::rockwell::DEFAULT_BLOCK_TYPES;

pub const DEFAULT_INTERLOCK_SEPARATOR: &str = " / ";

/// Enrichment profile, loaded from JSON (`blockTypes`, `interlockSeparator`, `checkLimitLayout`).
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct EnrichProfile {
    /// AOI names to decode; a row matches when its `Block type` contains one of them.
    pub block_types: Vec<String>,
    /// Joins several interlocked outputs in `Text 0`.
    pub interlock_separator: String,
    pub check_limit_layout: bool,
}

impl Default for EnrichProfile {
    fn default() -> Self {
        Self {
            block_types: DEFAULT_BLOCK_TYPES.iter().map(|s| s.to_string()).collect(),
            interlock_separator: DEFAULT_INTERLOCK_SEPARATOR.to_string(),
            check_limit_layout: true,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProfileError {
    #[error("profile lists no block types")]
    NoBlockTypes,

    #[error("block type '{name}' is not a valid L5K identifier")]
    InvalidBlockType { name: String },

    #[error("block type '{name}' is listed more than once")]
    DuplicateBlockType { name: String },

    #[error("interlock separator is empty")]
    EmptySeparator,
}

impl EnrichProfile {
    /// Missing file means "use the defaults"; unreadable or malformed files are errors.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read enrichment profile from: {}", path.display()))?;
        let profile: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse enrichment profile JSON from: {}", path.display()))?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.block_types.is_empty() {
            return Err(ProfileError::NoBlockTypes);
        }
        let mut seen = HashSet::new();
        for name in &self.block_types {
            let valid = !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_');
            if !valid {
                return Err(ProfileError::InvalidBlockType { name: name.clone() });
            }
            if !seen.insert(name.as_str()) {
                return Err(ProfileError::DuplicateBlockType { name: name.clone() });
            }
        }
        if self.interlock_separator.is_empty() {
            return Err(ProfileError::EmptySeparator);
        }
        Ok(())
    }
}
