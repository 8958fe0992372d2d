//! Schema-wide settings

use serde::{Deserialize, Serialize};

use crate::core::ResolverStyle;

/// Settings applied when a schema is finalized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Resolver used by fields that do not set their own
    pub default_resolver: ResolverStyle,

    /// Reject validator groups nested deeper than the declared list depth
    /// at finalization instead of at validation time
    pub check_validator_depth: bool,

    /// Schema description, printed as a comment above the SDL
    pub description: Option<String>,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            default_resolver: ResolverStyle::Attribute,
            check_validator_depth: true,
            description: None,
        }
    }
}

impl SchemaConfig {
    pub fn with_default_resolver(mut self, style: ResolverStyle) -> Self {
        self.default_resolver = style;
        self
    }

    pub fn with_validator_depth_check(mut self, enabled: bool) -> Self {
        self.check_validator_depth = enabled;
        self
    }
}
