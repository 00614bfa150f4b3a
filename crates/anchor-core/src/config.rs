//! Anchor configuration.
//!
//! Hosts usually hand configuration across a language or process boundary as JSON, so
//! [`AnchorConfig`] is a plain `serde` struct with defaults for every field.
//!
//! ```rust
//! use anchor_core::config::AnchorConfig;
//!
//! let config = AnchorConfig::from_json_str(r#"{ "anchor_to_selection": true }"#).unwrap();
//! assert!(config.anchor_to_selection);
//! assert_eq!(config.default_language, "en");
//! ```

use crate::anchor::DEFAULT_MARKER_TAG;
use crate::content_tracker::ContentTrackerOptions;
use crate::error::AnchorError;
use crate::selection_tracker::SelectionTrackerOptions;
use serde::{Deserialize, Serialize};

/// Per-menu configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    /// Tag applied to every anchor marker; orphan sweeps look for it.
    pub marker_tag: String,
    /// Language restored by a session reset.
    pub default_language: String,
    /// Follow AI-inserted content while it streams in.
    pub anchor_to_content: bool,
    /// Anchor the menu to the text selection instead of the selected node.
    pub anchor_to_selection: bool,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            marker_tag: DEFAULT_MARKER_TAG.to_string(),
            default_language: "en".to_string(),
            anchor_to_content: false,
            anchor_to_selection: false,
        }
    }
}

impl AnchorConfig {
    /// Parse a JSON configuration. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, AnchorError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Content tracker options for a session where AI generation is `enabled`.
    pub fn content_options(&self, enabled: bool) -> ContentTrackerOptions {
        ContentTrackerOptions {
            enabled,
            anchor_to_content: self.anchor_to_content,
        }
    }

    /// Selection tracker options for a session where AI generation is `enabled`.
    pub fn selection_options(&self, enabled: bool) -> SelectionTrackerOptions {
        SelectionTrackerOptions {
            enabled,
            anchor_to_selection: self.anchor_to_selection,
            prevent: false,
        }
    }
}
