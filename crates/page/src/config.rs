//! Runtime configuration for documents.
//!
//! Settings can be loaded from environment variables or constructed
//! programmatically and passed to [`Document::with_config`](crate::Document::with_config).

use std::env;

use css::MediaType;

/// Tunables shared by every document built with them.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Maximum nesting of `@import` rules; deeper imports are skipped.
    pub max_import_depth: u32,
    /// Whether pointer movement re-runs the cascade for `:hover`/`:active` rules.
    pub hover_restyle: bool,
    /// Media type used when the backend reports no media features.
    pub default_media: MediaType,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_import_depth: 8,
            hover_restyle: true,
            default_media: MediaType::Screen,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `PAGE_MAX_IMPORT_DEPTH`: maximum `@import` depth (default: 8)
    /// - `PAGE_HOVER_RESTYLE`: set to "0" to stop restyling on pointer movement
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let max_import_depth = env::var("PAGE_MAX_IMPORT_DEPTH")
            .ok()
            .and_then(|val| val.trim().parse::<u32>().ok())
            .unwrap_or(defaults.max_import_depth);
        let hover_restyle = env::var("PAGE_HOVER_RESTYLE")
            .ok()
            .is_none_or(|val| val.trim() != "0");
        Self {
            max_import_depth,
            hover_restyle,
            ..defaults
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_allow_imports_and_restyling() {
        let config = EngineConfig::default();
        assert_eq!(config.max_import_depth, 8);
        assert!(config.hover_restyle);
        assert_eq!(config.default_media, MediaType::Screen);
    }
}
