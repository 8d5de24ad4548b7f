//! Member management: listing members, changing roles, leaving and kicking.
//!
//! A list must keep at least one ADMIN member for as long as it exists, so
//! demoting or removing the last ADMIN is rejected; deleting the whole list
//! is the way out of that state.

use rusqlite::Connection;

use crate::{
    guard::require_role,
    list::ListId,
    member::{
        Member, MemberId, Role, count_admins, delete_member_row, get_member, members_for_list,
        update_member_role,
    },
    outcome::{ActionError, ActionResult},
    profile::ProfileId,
};

pub(crate) const LAST_ADMIN_MESSAGE: &str = "A list must keep at least one admin";

/// Read the member rows of a list. Any member may read.
pub fn members_of(
    connection: &Connection,
    auth: Option<ProfileId>,
    list_id: ListId,
) -> ActionResult<Vec<Member>> {
    require_role(connection, auth, list_id, Role::Guest)?;

    members_for_list(connection, list_id).map_err(ActionError::from)
}

/// Change a member's role. Requires ADMIN on the member's list.
///
/// Demoting the last ADMIN is rejected so the list never ends up with no one
/// able to manage it.
pub fn change_role(
    connection: &Connection,
    auth: Option<ProfileId>,
    member_id: MemberId,
    role: Role,
) -> ActionResult<Member> {
    let member = get_member(connection, member_id)?;
    require_role(connection, auth, member.list_id, Role::Admin)?;

    if role == member.role {
        return Ok(member);
    }

    if member.role == Role::Admin && count_admins(connection, member.list_id)? <= 1 {
        return Err(ActionError::validation_of_form(LAST_ADMIN_MESSAGE));
    }

    update_member_role(connection, member_id, role)?;

    Ok(Member { role, ..member })
}

/// Remove a member row: a member removing their own row leaves the list, an
/// ADMIN removing someone else's row kicks them.
///
/// Removing the last ADMIN is rejected either way. Returns the pre-deletion
/// snapshot.
pub fn remove_member(
    connection: &Connection,
    auth: Option<ProfileId>,
    member_id: MemberId,
) -> ActionResult<Member> {
    let member = get_member(connection, member_id)?;
    let actor = auth.ok_or(ActionError::NotAuthenticated)?;

    if actor != member.profile_id {
        require_role(connection, Some(actor), member.list_id, Role::Admin)?;
    }

    if member.role == Role::Admin && count_admins(connection, member.list_id)? <= 1 {
        return Err(ActionError::validation_of_form(LAST_ADMIN_MESSAGE));
    }

    delete_member_row(connection, member_id)?;

    Ok(member)
}

#[cfg(test)]
mod membership_tests {
    use std::str::FromStr;

    use email_address::EmailAddress;
    use rusqlite::Connection;

    use crate::{
        db::initialize,
        guard::role_of,
        lifecycle::create_list,
        list::List,
        member::{Member, Role, insert_member, members_for_list},
        outcome::ActionError,
        password::PasswordHash,
        profile::{Profile, insert_profile},
    };

    use super::{LAST_ADMIN_MESSAGE, change_role, members_of, remove_member};

    fn init_db() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    fn insert_test_profile(connection: &Connection, email: &str) -> Profile {
        insert_profile(
            connection,
            EmailAddress::from_str(email).unwrap(),
            "Test Person",
            PasswordHash::new_unchecked("hunter2"),
        )
        .unwrap()
    }

    fn fixture(connection: &Connection) -> (Profile, Profile, List, Member) {
        let admin = insert_test_profile(connection, "admin@bar.baz");
        let guest = insert_test_profile(connection, "guest@bar.baz");
        let list = create_list(connection, Some(admin.id), "Groceries").unwrap();
        let guest_member = insert_member(connection, list.id, guest.id, Role::Guest).unwrap();

        (admin, guest, list, guest_member)
    }

    #[test]
    fn any_member_can_list_members() {
        let connection = init_db();
        let (_admin, guest, list, _guest_member) = fixture(&connection);

        let members = members_of(&connection, Some(guest.id), list.id).unwrap();

        assert_eq!(members.len(), 2);
    }

    #[test]
    fn change_role_promotes_guest_to_admin() {
        let connection = init_db();
        let (admin, guest, list, guest_member) = fixture(&connection);

        let promoted =
            change_role(&connection, Some(admin.id), guest_member.id, Role::Admin).unwrap();

        assert_eq!(promoted.role, Role::Admin);
        assert_eq!(
            role_of(&connection, guest.id, list.id).unwrap(),
            Some(Role::Admin)
        );
    }

    #[test]
    fn change_role_requires_admin() {
        let connection = init_db();
        let (_admin, guest, _list, guest_member) = fixture(&connection);

        let result = change_role(&connection, Some(guest.id), guest_member.id, Role::Admin);

        assert_eq!(result, Err(ActionError::NotAdmin));
    }

    #[test]
    fn change_role_to_same_role_is_a_no_op() {
        let connection = init_db();
        let (admin, _guest, _list, guest_member) = fixture(&connection);

        let unchanged =
            change_role(&connection, Some(admin.id), guest_member.id, Role::Guest).unwrap();

        assert_eq!(unchanged, guest_member);
    }

    #[test]
    fn demoting_the_last_admin_is_rejected() {
        let connection = init_db();
        let (admin, _guest, list, _guest_member) = fixture(&connection);
        let admin_member = members_for_list(&connection, list.id)
            .unwrap()
            .into_iter()
            .find(|member| member.profile_id == admin.id)
            .unwrap();

        let result = change_role(&connection, Some(admin.id), admin_member.id, Role::Guest);

        let Err(ActionError::Validation(errors)) = result else {
            panic!("want validation failure, got {result:?}");
        };
        assert_eq!(errors.form_errors(), [LAST_ADMIN_MESSAGE.to_string()]);
        assert_eq!(
            role_of(&connection, admin.id, list.id).unwrap(),
            Some(Role::Admin)
        );
    }

    #[test]
    fn guest_can_leave_a_list() {
        let connection = init_db();
        let (_admin, guest, list, guest_member) = fixture(&connection);

        let snapshot = remove_member(&connection, Some(guest.id), guest_member.id).unwrap();

        assert_eq!(snapshot, guest_member);
        assert_eq!(role_of(&connection, guest.id, list.id).unwrap(), None);
    }

    #[test]
    fn guest_cannot_kick_another_member() {
        let connection = init_db();
        let (admin, guest, list, _guest_member) = fixture(&connection);
        let admin_member = members_for_list(&connection, list.id)
            .unwrap()
            .into_iter()
            .find(|member| member.profile_id == admin.id)
            .unwrap();

        let result = remove_member(&connection, Some(guest.id), admin_member.id);

        assert_eq!(result, Err(ActionError::NotAdmin));
    }

    #[test]
    fn admin_can_kick_a_guest() {
        let connection = init_db();
        let (admin, guest, list, guest_member) = fixture(&connection);

        remove_member(&connection, Some(admin.id), guest_member.id).unwrap();

        assert_eq!(role_of(&connection, guest.id, list.id).unwrap(), None);
    }

    #[test]
    fn the_last_admin_cannot_leave() {
        let connection = init_db();
        let (admin, _guest, list, _guest_member) = fixture(&connection);
        let admin_member = members_for_list(&connection, list.id)
            .unwrap()
            .into_iter()
            .find(|member| member.profile_id == admin.id)
            .unwrap();

        let result = remove_member(&connection, Some(admin.id), admin_member.id);

        let Err(ActionError::Validation(errors)) = result else {
            panic!("want validation failure, got {result:?}");
        };
        assert_eq!(errors.form_errors(), [LAST_ADMIN_MESSAGE.to_string()]);
    }

    #[test]
    fn an_admin_can_leave_when_another_admin_remains() {
        let connection = init_db();
        let (admin, _guest, list, guest_member) = fixture(&connection);
        change_role(&connection, Some(admin.id), guest_member.id, Role::Admin).unwrap();
        let admin_member = members_for_list(&connection, list.id)
            .unwrap()
            .into_iter()
            .find(|member| member.profile_id == admin.id)
            .unwrap();

        remove_member(&connection, Some(admin.id), admin_member.id).unwrap();

        assert_eq!(role_of(&connection, admin.id, list.id).unwrap(), None);
    }
}
