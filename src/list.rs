//! This file defines the `List` type, the root of the ownership hierarchy, its
//! validated name, its opaque invite code, and the list table.

use std::fmt::Display;

use rand::{Rng, distr::Alphanumeric};
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, profile::ProfileId};

/// A newtype wrapper for integer list IDs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct ListId(i64);

impl ListId {
    /// Create a new list ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the list ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for ListId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The name of a list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct ListName(String);

impl ListName {
    /// Create a list name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyName] if `name` is an empty string.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyName("List name"))
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a list name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the non-empty invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for ListName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for ListName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An opaque, URL-safe token that lets a profile enroll itself in a list.
///
/// Generated once at list creation and never rotated. The UI shares it as
/// `{origin}/invite/{code}`; the core only ever sees the raw code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct InviteCode(String);

impl InviteCode {
    /// The number of characters in a generated invite code.
    pub const LENGTH: usize = 16;

    /// Generate a fresh random invite code.
    ///
    /// Uniqueness is enforced by the list table's UNIQUE constraint, not here;
    /// callers retry on [Error::DuplicateInviteCode].
    pub fn generate() -> Self {
        let code = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(Self::LENGTH)
            .map(char::from)
            .collect();

        Self(code)
    }

    /// Wrap a raw code string, e.g. one read back from the database.
    pub fn new_unchecked(code: &str) -> Self {
        Self(code.to_string())
    }

    /// The raw code string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for InviteCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named, shareable shopping list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    /// The list's ID in the application database.
    pub id: ListId,

    /// The name of the list.
    pub name: ListName,

    /// The token that enrolls new members, unique across all lists.
    pub invite_code: InviteCode,

    /// Whether the list is hidden from public discovery surfaces.
    pub private: bool,

    /// The profile that created the list.
    pub creator_id: ProfileId,
}

/// Create the list table.
///
/// Deleting a creator profile cascades to their lists, which in turn cascades
/// to members, categories and items.
pub(crate) fn create_list_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS list (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                invite_code TEXT NOT NULL UNIQUE,
                private INTEGER NOT NULL DEFAULT 0,
                creator_id INTEGER NOT NULL,
                FOREIGN KEY(creator_id) REFERENCES profile(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

fn map_list_row(row: &Row) -> Result<List, rusqlite::Error> {
    let raw_name: String = row.get(1)?;
    let raw_code: String = row.get(2)?;

    Ok(List {
        id: ListId::new(row.get(0)?),
        name: ListName::new_unchecked(&raw_name),
        invite_code: InviteCode::new_unchecked(&raw_code),
        private: row.get(3)?,
        creator_id: ProfileId::new(row.get(4)?),
    })
}

/// Insert a new list into the database.
///
/// # Errors
///
/// Returns [Error::DuplicateInviteCode] if `invite_code` is already assigned,
/// [Error::InvalidForeignKey] if `creator_id` does not refer to a valid
/// profile, or [Error::SqlError] for any other SQL error.
pub fn insert_list(
    connection: &Connection,
    name: &ListName,
    invite_code: &InviteCode,
    creator_id: ProfileId,
) -> Result<List, Error> {
    connection.execute(
        "INSERT INTO list (name, invite_code, creator_id) VALUES (?1, ?2, ?3)",
        (name.as_ref(), invite_code.as_str(), creator_id.as_i64()),
    )?;

    Ok(List {
        id: ListId::new(connection.last_insert_rowid()),
        name: name.clone(),
        invite_code: invite_code.clone(),
        private: false,
        creator_id,
    })
}

/// Get the list with an ID equal to `list_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if no such list exists.
pub fn get_list(connection: &Connection, list_id: ListId) -> Result<List, Error> {
    connection
        .prepare("SELECT id, name, invite_code, private, creator_id FROM list WHERE id = :id")?
        .query_row(&[(":id", &list_id.as_i64())], map_list_row)
        .map_err(|error| error.into())
}

/// Get the list whose invite code equals `code`.
///
/// # Errors
///
/// Returns [Error::NotFound] if no list uses that code.
pub fn get_list_by_invite_code(connection: &Connection, code: &str) -> Result<List, Error> {
    connection
        .prepare(
            "SELECT id, name, invite_code, private, creator_id FROM list WHERE invite_code = :code",
        )?
        .query_row(&[(":code", &code)], map_list_row)
        .map_err(|error| error.into())
}

pub(crate) fn update_list_row(
    connection: &Connection,
    list_id: ListId,
    name: &ListName,
    private: bool,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE list SET name = ?1, private = ?2 WHERE id = ?3",
        (name.as_ref(), private, list_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

pub(crate) fn delete_list_row(connection: &Connection, list_id: ListId) -> Result<(), Error> {
    let rows_affected =
        connection.execute("DELETE FROM list WHERE id = ?1", (list_id.as_i64(),))?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

#[cfg(test)]
mod list_name_tests {
    use crate::Error;

    use super::ListName;

    #[test]
    fn new_fails_on_empty_string() {
        assert_eq!(ListName::new(""), Err(Error::EmptyName("List name")));
    }

    #[test]
    fn new_fails_on_whitespace_only_string() {
        assert_eq!(ListName::new("   "), Err(Error::EmptyName("List name")));
    }

    #[test]
    fn new_trims_surrounding_whitespace() {
        let name = ListName::new("  Groceries ").unwrap();

        assert_eq!(name.as_ref(), "Groceries");
    }
}


#[cfg(test)]
mod list_store_tests {
    use std::str::FromStr;

    use email_address::EmailAddress;
    use rusqlite::Connection;

    use crate::{
        Error,
        db::initialize,
        password::PasswordHash,
        profile::{Profile, ProfileId, insert_profile},
    };

    use super::{
        InviteCode, ListId, ListName, get_list, get_list_by_invite_code, insert_list,
    };

    fn init_db_with_profile() -> (Connection, Profile) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        let profile = insert_profile(
            &connection,
            EmailAddress::from_str("foo@bar.baz").unwrap(),
            "Foo",
            PasswordHash::new_unchecked("hunter2"),
        )
        .unwrap();

        (connection, profile)
    }

    #[test]
    fn insert_list_succeeds() {
        let (connection, profile) = init_db_with_profile();
        let name = ListName::new("Groceries").unwrap();
        let code = InviteCode::generate();

        let list = insert_list(&connection, &name, &code, profile.id).unwrap();

        assert!(list.id.as_i64() > 0);
        assert_eq!(list.name, name);
        assert_eq!(list.invite_code, code);
        assert!(!list.private);
        assert_eq!(list.creator_id, profile.id);
    }

    #[test]
    fn insert_list_fails_on_duplicate_invite_code() {
        let (connection, profile) = init_db_with_profile();
        let code = InviteCode::generate();

        insert_list(
            &connection,
            &ListName::new_unchecked("First"),
            &code,
            profile.id,
        )
        .unwrap();

        let result = insert_list(
            &connection,
            &ListName::new_unchecked("Second"),
            &code,
            profile.id,
        );

        assert_eq!(result, Err(Error::DuplicateInviteCode));
    }

    #[test]
    fn insert_list_fails_on_invalid_creator() {
        let (connection, profile) = init_db_with_profile();

        let result = insert_list(
            &connection,
            &ListName::new_unchecked("Orphan"),
            &InviteCode::generate(),
            ProfileId::new(profile.id.as_i64() + 42),
        );

        assert_eq!(result, Err(Error::InvalidForeignKey));
    }

    #[test]
    fn get_list_round_trips() {
        let (connection, profile) = init_db_with_profile();
        let inserted_list = insert_list(
            &connection,
            &ListName::new_unchecked("Groceries"),
            &InviteCode::generate(),
            profile.id,
        )
        .unwrap();

        let selected_list = get_list(&connection, inserted_list.id).unwrap();

        assert_eq!(selected_list, inserted_list);
    }

    #[test]
    fn get_list_fails_with_non_existent_id() {
        let (connection, _profile) = init_db_with_profile();

        assert_eq!(
            get_list(&connection, ListId::new(1337)),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn get_list_by_invite_code_round_trips() {
        let (connection, profile) = init_db_with_profile();
        let inserted_list = insert_list(
            &connection,
            &ListName::new_unchecked("Groceries"),
            &InviteCode::generate(),
            profile.id,
        )
        .unwrap();

        let selected_list =
            get_list_by_invite_code(&connection, inserted_list.invite_code.as_str()).unwrap();

        assert_eq!(selected_list, inserted_list);
    }

    #[test]
    fn get_list_by_invite_code_fails_for_unassigned_code() {
        let (connection, _profile) = init_db_with_profile();

        assert_eq!(
            get_list_by_invite_code(&connection, "nosuchcode123456"),
            Err(Error::NotFound)
        );
    }
}
