//! User account administration.
//!
//! Reads are open to managers and admins; writes are admin only. The auth
//! middleware re-reads the account on every request, so an enabled flip cuts
//! off outstanding tokens immediately. A role change only shows up in tokens
//! issued by the next login; tokens already in the wild keep the role they
//! were signed with.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::TtError;
use crate::models::{Role, UserResponse};
use crate::policy::{self, Action, Actor};
use crate::services::require_user;
use crate::store::Store;

/// List every account, oldest first.
pub fn list_users(store: &dyn Store, actor: &Actor) -> Result<Vec<UserResponse>, TtError> {
    policy::ensure_allowed(actor, &Action::ListUsers)?;

    let mut users = store.list_users()?;
    users.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });

    Ok(users.iter().map(UserResponse::from).collect())
}

/// Fetch one account. The permission check runs before the lookup, so callers
/// without read access cannot probe which ids exist.
pub fn get_user(store: &dyn Store, actor: &Actor, id: Uuid) -> Result<UserResponse, TtError> {
    policy::ensure_allowed(actor, &Action::ViewUser)?;
    let user = require_user(store, id)?;
    Ok(UserResponse::from(&user))
}

/// Change an account's role.
pub fn update_user_role(
    store: &dyn Store,
    actor: &Actor,
    id: Uuid,
    role: Role,
    now: DateTime<Utc>,
) -> Result<UserResponse, TtError> {
    policy::ensure_allowed(actor, &Action::UpdateUserRole)?;

    let updated = store.update_user(id, &mut |user| {
        user.role = role;
        user.updated_at = now;
        Ok(())
    })?;

    tracing::info!(
        target: "tt.services.users",
        user_id = %id,
        role = role.as_str(),
        "User role updated"
    );
    Ok(UserResponse::from(&updated))
}

/// Flip an account between enabled and disabled.
///
/// Disabling locks the account out immediately: login refuses it and the auth
/// middleware rejects requests carrying its still-unexpired tokens.
pub fn toggle_user_enabled(
    store: &dyn Store,
    actor: &Actor,
    id: Uuid,
    now: DateTime<Utc>,
) -> Result<(), TtError> {
    policy::ensure_allowed(actor, &Action::ToggleUserEnabled)?;

    let updated = store.update_user(id, &mut |user| {
        user.enabled = !user.enabled;
        user.updated_at = now;
        Ok(())
    })?;

    tracing::info!(
        target: "tt.services.users",
        user_id = %id,
        enabled = updated.enabled,
        "User enabled flag toggled"
    );
    Ok(())
}

/// Delete an account. The store cleans up every reference: the account's own
/// tickets go away with their comments, assignments pointing at it are
/// cleared, and its comments on surviving tickets are removed.
pub fn delete_user(
    store: &dyn Store,
    actor: &Actor,
    id: Uuid,
    now: DateTime<Utc>,
) -> Result<(), TtError> {
    policy::ensure_allowed(actor, &Action::DeleteUser)?;
    store.delete_user(id, now)?;
    tracing::info!(target: "tt.services.users", user_id = %id, "User deleted");
    Ok(())
}
