use crate::profile_config::EnrichProfile;

/// Alarm AOIs handled by default (COMOS "IHMALMA" family).
pub const DEFAULT_BLOCK_TYPES: [&str; 2] = ["IHMALMA", "IHMALMA_2780"];

/// L5K analysis configuration.
/// Keeps the rule parameters in one place instead of scattering them over the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct L5kConfig {
    /// AOI names whose definitions and instances are decoded.
    pub block_types: Vec<String>,
    /// Emit layout warnings when an AOI does not follow the HH/H/L/LL limit convention.
    pub check_limit_layout: bool,
}

impl L5kConfig {
    pub fn new(block_types: Vec<String>) -> Self {
        Self {
            block_types,
            check_limit_layout: true,
        }
    }

    pub fn from_profile(profile: &EnrichProfile) -> Self {
        Self {
            block_types: profile.block_types.clone(),
            check_limit_layout: profile.check_limit_layout,
        }
    }
}

impl Default for L5kConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCK_TYPES.iter().map(|s| s.to_string()).collect())
    }
}
