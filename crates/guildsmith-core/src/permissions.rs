//! Permission overwrite translation
//!
//! Rewrites a source channel's overwrite list into the target ID
//! space. Allow/deny bitsets are copied verbatim; this engine never
//! renegotiates permission semantics.

use crate::mapper::IdentityMapper;
use guildsmith_types::{PermissionOverwrite, SubjectId};

/// Translate source overwrites into the target workspace's ID space
///
/// Role-scoped subjects are remapped through the identity mapper; a
/// role with no recorded mapping is dropped, never replaced with a
/// fabricated placeholder. User-scoped subjects pass through unchanged
/// because user identities are stable across workspaces.
#[must_use]
pub fn translate_overwrites(
    source: &[PermissionOverwrite],
    mapper: &IdentityMapper,
) -> Vec<PermissionOverwrite> {
    source
        .iter()
        .filter_map(|overwrite| match overwrite.subject {
            SubjectId::Role(role) => mapper
                .map_role(role)
                .map(|target| overwrite.with_subject(SubjectId::Role(target))),
            SubjectId::User(_) => Some(*overwrite),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use guildsmith_types::{PermissionBits, RoleId, UserId};

    fn overwrite(subject: SubjectId) -> PermissionOverwrite {
        PermissionOverwrite::new(subject, PermissionBits::new(0b101), PermissionBits::new(0b010))
    }

    #[test]
    fn mapped_roles_are_retargeted() {
        let mut mapper = IdentityMapper::new();
        mapper.record_role(RoleId(1), RoleId(100));

        let translated = translate_overwrites(&[overwrite(SubjectId::Role(RoleId(1)))], &mapper);

        assert_eq!(translated.len(), 1);
        assert_eq!(translated[0].subject, SubjectId::Role(RoleId(100)));
        assert_eq!(translated[0].allow, PermissionBits::new(0b101));
        assert_eq!(translated[0].deny, PermissionBits::new(0b010));
    }

    #[test]
    fn unmapped_roles_are_dropped() {
        let mapper = IdentityMapper::new();

        let translated = translate_overwrites(&[overwrite(SubjectId::Role(RoleId(9)))], &mapper);

        assert!(translated.is_empty());
    }

    #[test]
    fn users_pass_through_unchanged() {
        let mapper = IdentityMapper::new();
        let source = overwrite(SubjectId::User(UserId(7)));

        let translated = translate_overwrites(&[source], &mapper);

        assert_eq!(translated, vec![source]);
    }

    #[test]
    fn mixed_list_keeps_order_of_survivors() {
        let mut mapper = IdentityMapper::new();
        mapper.record_role(RoleId(1), RoleId(100));

        let source = vec![
            overwrite(SubjectId::Role(RoleId(1))),
            overwrite(SubjectId::Role(RoleId(2))), // unmapped, dropped
            overwrite(SubjectId::User(UserId(7))),
        ];
        let translated = translate_overwrites(&source, &mapper);

        assert_eq!(translated.len(), 2);
        assert_eq!(translated[0].subject, SubjectId::Role(RoleId(100)));
        assert_eq!(translated[1].subject, SubjectId::User(UserId(7)));
    }
}
