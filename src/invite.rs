//! The invite resolution flow: mapping an invite code to a list and enrolling
//! a profile as a GUEST member.

use rusqlite::Connection;

use crate::{
    Error,
    list::{List, get_list_by_invite_code},
    member::{Role, insert_member, member_of},
    outcome::{ActionError, ActionResult},
    profile::ProfileId,
};

/// Look up the list whose invite code equals `code`, or `None` if no list
/// uses that code. Pure read.
pub fn resolve_invite_code(connection: &Connection, code: &str) -> Result<Option<List>, Error> {
    match get_list_by_invite_code(connection, code) {
        Ok(list) => Ok(Some(list)),
        Err(Error::NotFound) => Ok(None),
        Err(error) => Err(error),
    }
}

/// Enroll the signed-in profile in the list behind `code` as a GUEST.
///
/// Idempotent: if the profile already has a membership for the list, the list
/// is returned unchanged and no new row is created. A user may legitimately
/// follow the same invite link twice.
///
/// # Errors
///
/// Fails with [ActionError::NotFound] if no list uses `code`.
pub fn join_by_invite(
    connection: &Connection,
    auth: Option<ProfileId>,
    code: &str,
) -> ActionResult<List> {
    let profile_id = auth.ok_or(ActionError::NotAuthenticated)?;

    let list = resolve_invite_code(connection, code)?.ok_or(ActionError::NotFound)?;

    if member_of(connection, list.id, profile_id)?.is_none() {
        match insert_member(connection, list.id, profile_id, Role::Guest) {
            Ok(_) => {}
            // A concurrent join landed first; the outcome is the same.
            Err(Error::DuplicateMember) => {}
            Err(error) => return Err(error.into()),
        }
    }

    Ok(list)
}
