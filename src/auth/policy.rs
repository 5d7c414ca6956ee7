use tracing::warn;

use crate::database::models::{Id, User};
use crate::error::ApiError;

/// The single write rule for topics, posts and comments: privileged roles may
/// modify anything, everyone else only what they created. An entity without
/// an owner (anonymous topic, deleted creator) is privileged-only.
pub fn can_modify(actor: &User, owner: Option<Id>) -> bool {
    actor.role.is_privileged() || owner == Some(actor.id)
}

pub fn ensure_can_modify(actor: &User, owner: Option<Id>, what: &str) -> Result<(), ApiError> {
    if can_modify(actor, owner) {
        return Ok(());
    }
    warn!(
        actor_id = actor.id,
        role = %actor.role,
        owner_id = ?owner,
        "Rejected {} modification",
        what
    );
    Err(ApiError::forbidden())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Role;
    use chrono::Utc;

    fn user(id: Id, role: Role) -> User {
        User {
            id,
            username: format!("user{id}"),
            password_hash: String::new(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn owners_may_modify_their_own_content() {
        assert!(can_modify(&user(1, Role::User), Some(1)));
        assert!(!can_modify(&user(2, Role::User), Some(1)));
    }

    #[test]
    fn privileged_roles_may_modify_anything() {
        for role in [Role::Moderator, Role::Admin] {
            assert!(can_modify(&user(9, role), Some(1)));
            assert!(can_modify(&user(9, role), None));
        }
    }

    #[test]
    fn ownerless_content_is_privileged_only() {
        assert!(!can_modify(&user(1, Role::User), None));
    }

    #[test]
    fn refusal_is_a_plain_forbidden() {
        let err = ensure_can_modify(&user(2, Role::User), Some(1), "post").unwrap_err();
        assert_eq!(err, ApiError::forbidden());
    }
}
