//! Typed identifiers for remote workspace entities
//!
//! External API identifiers are snowflakes (u64). Wrapping them in
//! newtypes keeps role/channel/user IDs from being mixed up across the
//! two independent ID spaces (source and target) during remapping.

use serde::{Deserialize, Serialize};

macro_rules! snowflake_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub u64);

        impl $name {
            /// Raw snowflake value
            #[inline]
            #[must_use]
            pub fn value(&self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

snowflake_id!(
    /// Workspace (guild) identifier
    WorkspaceId
);
snowflake_id!(
    /// Role identifier
    RoleId
);
snowflake_id!(
    /// Channel identifier
    ChannelId
);
snowflake_id!(
    /// Emoji identifier
    EmojiId
);
snowflake_id!(
    /// Webhook identifier
    WebhookId
);
snowflake_id!(
    /// User identifier (stable across workspaces)
    UserId
);

/// Subject of a permission overwrite: a role or a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum SubjectId {
    /// Role-scoped overwrite; remapped between workspaces
    Role(RoleId),
    /// User-scoped overwrite; user IDs are stable across workspaces
    User(UserId),
}

impl SubjectId {
    /// Check if this subject is role-scoped
    #[inline]
    #[must_use]
    pub fn is_role(&self) -> bool {
        matches!(self, SubjectId::Role(_))
    }
}

impl std::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubjectId::Role(id) => write!(f, "role:{id}"),
            SubjectId::User(id) => write!(f, "user:{id}"),
        }
    }
}

/// Invite/access code for a workspace, minted on successful completion
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InviteCode(pub String);

impl InviteCode {
    /// Create from a raw code string
    #[inline]
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Code as a string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InviteCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snowflake_display() {
        let id = WorkspaceId(112233445566778899);
        assert_eq!(id.to_string(), "112233445566778899");
        assert_eq!(id.value(), 112233445566778899);
    }

    #[test]
    fn subject_id_kind() {
        assert!(SubjectId::Role(RoleId(1)).is_role());
        assert!(!SubjectId::User(UserId(1)).is_role());
    }

    #[test]
    fn subject_id_serde_tagged() {
        let subject = SubjectId::Role(RoleId(42));
        let json = serde_json::to_string(&subject).unwrap();
        assert_eq!(json, r#"{"type":"role","id":42}"#);
    }
}
