//! This file defines the `Member` join entity binding a profile to a list
//! with a role, and the member table.

use std::fmt::Display;

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::{Error, list::ListId, profile::ProfileId};

/// The permission level a member holds on a list.
///
/// Ordered: `Guest < Admin`, so a role requirement is a simple `>=` check.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Day-to-day item management: read, create, update and delete items.
    Guest,
    /// Full management rights over the list and its taxonomy.
    Admin,
}

impl Role {
    /// The role as it is stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Guest => "GUEST",
            Role::Admin => "ADMIN",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for Role {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Role {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "GUEST" => Ok(Role::Guest),
            "ADMIN" => Ok(Role::Admin),
            other => Err(FromSqlError::Other(
                format!("unknown role {other:?}").into(),
            )),
        }
    }
}

/// The ID of a member row.
pub type MemberId = i64;

/// The join record granting a profile a role on a list.
///
/// At most one member row exists per (list, profile) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Member {
    /// The member row's ID in the application database.
    pub id: MemberId,

    /// The list the membership belongs to.
    pub list_id: ListId,

    /// The enrolled profile.
    pub profile_id: ProfileId,

    /// The role the profile holds on the list.
    pub role: Role,
}

/// Create the member table.
pub(crate) fn create_member_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS member (
                id INTEGER PRIMARY KEY,
                list_id INTEGER NOT NULL,
                profile_id INTEGER NOT NULL,
                role TEXT NOT NULL,
                UNIQUE(list_id, profile_id),
                FOREIGN KEY(list_id) REFERENCES list(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(profile_id) REFERENCES profile(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

fn map_member_row(row: &Row) -> Result<Member, rusqlite::Error> {
    Ok(Member {
        id: row.get(0)?,
        list_id: ListId::new(row.get(1)?),
        profile_id: ProfileId::new(row.get(2)?),
        role: row.get(3)?,
    })
}

/// Insert a membership row.
///
/// # Errors
///
/// Returns [Error::DuplicateMember] if the profile already has a membership
/// for the list, or [Error::InvalidForeignKey] if either ID is dangling.
pub fn insert_member(
    connection: &Connection,
    list_id: ListId,
    profile_id: ProfileId,
    role: Role,
) -> Result<Member, Error> {
    connection.execute(
        "INSERT INTO member (list_id, profile_id, role) VALUES (?1, ?2, ?3)",
        (list_id.as_i64(), profile_id.as_i64(), role),
    )?;

    Ok(Member {
        id: connection.last_insert_rowid(),
        list_id,
        profile_id,
        role,
    })
}

/// Get the member row with an ID equal to `member_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if no such row exists.
pub fn get_member(connection: &Connection, member_id: MemberId) -> Result<Member, Error> {
    connection
        .prepare("SELECT id, list_id, profile_id, role FROM member WHERE id = :id")?
        .query_row(&[(":id", &member_id)], map_member_row)
        .map_err(|error| error.into())
}

/// Get the membership binding `profile_id` to `list_id`, or `None` if the
/// profile is not a member of the list.
pub fn member_of(
    connection: &Connection,
    list_id: ListId,
    profile_id: ProfileId,
) -> Result<Option<Member>, Error> {
    let result = connection
        .prepare(
            "SELECT id, list_id, profile_id, role FROM member
                WHERE list_id = :list_id AND profile_id = :profile_id",
        )?
        .query_row(
            &[
                (":list_id", &list_id.as_i64()),
                (":profile_id", &profile_id.as_i64()),
            ],
            map_member_row,
        );

    match result {
        Ok(member) => Ok(Some(member)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(error) => Err(error.into()),
    }
}

/// Get all member rows for a list, oldest first.
pub fn members_for_list(connection: &Connection, list_id: ListId) -> Result<Vec<Member>, Error> {
    connection
        .prepare(
            "SELECT id, list_id, profile_id, role FROM member
                WHERE list_id = :list_id ORDER BY id",
        )?
        .query_map(&[(":list_id", &list_id.as_i64())], map_member_row)?
        .map(|maybe_member| maybe_member.map_err(|error| error.into()))
        .collect()
}

/// Count the ADMIN members of a list.
pub fn count_admins(connection: &Connection, list_id: ListId) -> Result<i64, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM member WHERE list_id = :list_id AND role = 'ADMIN'",
            &[(":list_id", &list_id.as_i64())],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Count the lists that would lose their last ADMIN if `profile_id` left all
/// of its memberships.
///
/// Lists the profile created are excluded: those are deleted together with
/// the profile by the creator cascade, so they cannot be left admin-less.
pub fn count_lists_left_without_admin(
    connection: &Connection,
    profile_id: ProfileId,
) -> Result<i64, Error> {
    connection
        .query_row(
            "SELECT COUNT(member.id) FROM member
                JOIN list ON list.id = member.list_id
                WHERE member.profile_id = :profile_id
                    AND member.role = 'ADMIN'
                    AND list.creator_id != :profile_id
                    AND (SELECT COUNT(admins.id) FROM member AS admins
                            WHERE admins.list_id = member.list_id
                                AND admins.role = 'ADMIN') = 1",
            &[(":profile_id", &profile_id.as_i64())],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

pub(crate) fn update_member_role(
    connection: &Connection,
    member_id: MemberId,
    role: Role,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE member SET role = ?1 WHERE id = ?2",
        (role, member_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

pub(crate) fn delete_member_row(
    connection: &Connection,
    member_id: MemberId,
) -> Result<(), Error> {
    let rows_affected =
        connection.execute("DELETE FROM member WHERE id = ?1", (member_id,))?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

#[cfg(test)]
mod role_tests {
    use super::Role;

    #[test]
    fn admin_outranks_guest() {
        assert!(Role::Admin > Role::Guest);
        assert!(Role::Admin >= Role::Admin);
        assert!(Role::Guest >= Role::Guest);
    }
}
