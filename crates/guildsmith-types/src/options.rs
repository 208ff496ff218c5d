//! Options controlling what a clone run reproduces

use serde::{Deserialize, Serialize};

/// What to clone from the source workspace
///
/// Roles and channels are cloned by default; emojis and webhooks require
/// explicit opt-in because they multiply remote calls against the
/// rate-limited API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloneOptions {
    /// Clone the role hierarchy
    pub include_roles: bool,
    /// Clone categories and channels
    pub include_channels: bool,
    /// Clone custom emojis
    pub include_emojis: bool,
    /// Clone webhooks
    pub include_webhooks: bool,
    /// Override the target workspace name
    pub name: Option<String>,
}

impl CloneOptions {
    /// Default option set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With emoji cloning enabled
    #[inline]
    #[must_use]
    pub fn with_emojis(mut self) -> Self {
        self.include_emojis = true;
        self
    }

    /// With webhook cloning enabled
    #[inline]
    #[must_use]
    pub fn with_webhooks(mut self) -> Self {
        self.include_webhooks = true;
        self
    }

    /// Without role cloning
    #[inline]
    #[must_use]
    pub fn without_roles(mut self) -> Self {
        self.include_roles = false;
        self
    }

    /// Without channel cloning
    #[inline]
    #[must_use]
    pub fn without_channels(mut self) -> Self {
        self.include_channels = false;
        self
    }

    /// With a target workspace name override
    #[inline]
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl Default for CloneOptions {
    fn default() -> Self {
        Self {
            include_roles: true,
            include_channels: true,
            include_emojis: false,
            include_webhooks: false,
            name: None,
        }
    }
}
