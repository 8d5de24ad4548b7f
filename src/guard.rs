//! The membership authorization guard.
//!
//! Every mutating operation resolves the caller's role on the target list
//! through [require_role] before touching the store; read operations require
//! any membership ([Role::Guest] as the minimum). The caller's identity is an
//! explicit parameter, never ambient state, so production call sites resolve
//! it from the session and test call sites pass it directly.

use rusqlite::Connection;

use crate::{
    Error,
    list::ListId,
    member::{Role, member_of},
    outcome::{ActionError, ActionResult},
    profile::ProfileId,
};

/// The role `profile_id` holds on `list_id`, or `None` if the profile is not
/// a member of the list. Pure read, no policy applied.
pub fn role_of(
    connection: &Connection,
    profile_id: ProfileId,
    list_id: ListId,
) -> Result<Option<Role>, Error> {
    Ok(member_of(connection, list_id, profile_id)?.map(|member| member.role))
}

/// Require that the caller holds at least `minimum` on `list_id`.
///
/// Fails with [ActionError::NotAuthenticated] if `auth` is `None`,
/// [ActionError::NotMember] if the profile has no membership row for the
/// list, and [ActionError::NotAdmin] if a membership exists but its role is
/// below `minimum`. Returns the held role on success.
pub fn require_role(
    connection: &Connection,
    auth: Option<ProfileId>,
    list_id: ListId,
    minimum: Role,
) -> ActionResult<Role> {
    let profile_id = auth.ok_or(ActionError::NotAuthenticated)?;

    match role_of(connection, profile_id, list_id)? {
        None => Err(ActionError::NotMember),
        Some(role) if role >= minimum => Ok(role),
        Some(_) => Err(ActionError::NotAdmin),
    }
}
