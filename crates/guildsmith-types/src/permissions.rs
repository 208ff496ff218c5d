//! Permission bitsets and overwrites
//!
//! Allow/deny bits are copied verbatim between workspaces; this crate
//! never interprets individual permission flags.

use crate::id::SubjectId;
use serde::{Deserialize, Serialize};

/// Raw permission bitset
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PermissionBits(pub u64);

impl PermissionBits {
    /// Empty bitset
    pub const NONE: Self = Self(0);

    /// Create from raw bits
    #[inline]
    #[must_use]
    pub fn new(bits: u64) -> Self {
        Self(bits)
    }

    /// Check whether all bits of `other` are set
    #[inline]
    #[must_use]
    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Union of two bitsets
    #[inline]
    #[must_use]
    pub fn union(&self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Check whether no bits are set
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for PermissionBits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Permission overwrite attached to a channel
///
/// Subjects are either roles (remapped during cloning) or users
/// (passed through unchanged).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionOverwrite {
    /// Role or user the overwrite applies to
    pub subject: SubjectId,
    /// Explicitly granted permissions
    pub allow: PermissionBits,
    /// Explicitly denied permissions
    pub deny: PermissionBits,
}

impl PermissionOverwrite {
    /// Create a new overwrite
    #[inline]
    #[must_use]
    pub fn new(subject: SubjectId, allow: PermissionBits, deny: PermissionBits) -> Self {
        Self {
            subject,
            allow,
            deny,
        }
    }

    /// Same allow/deny bits applied to a different subject
    #[inline]
    #[must_use]
    pub fn with_subject(&self, subject: SubjectId) -> Self {
        Self { subject, ..*self }
    }
}
