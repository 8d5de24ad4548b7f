//! This file defines the `Profile` type (a registered user), its table, and
//! the self-service profile actions: sign-up, password change and deletion.

use std::{fmt::Display, str::FromStr};

use email_address::EmailAddress;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    member::count_lists_left_without_admin,
    membership::LAST_ADMIN_MESSAGE,
    outcome::{ActionError, ActionResult, ValidationErrors},
    password::{PasswordHash, ValidatedPassword},
};

/// A newtype wrapper for integer profile IDs.
///
/// This helps disambiguate profile IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct ProfileId(i64);

impl ProfileId {
    /// Create a new profile ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the profile ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for ProfileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered user of the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// The profile's ID in the application database.
    pub id: ProfileId,

    /// The unique email address the profile signed up with.
    pub email: EmailAddress,

    /// The display name shown to other members.
    pub name: String,

    /// The profile's password hash.
    pub password_hash: PasswordHash,

    /// An optional reference to an avatar image.
    pub image_url: Option<String>,
}

/// Create the profile table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub(crate) fn create_profile_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS profile (
                id INTEGER PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                name TEXT NOT NULL,
                password TEXT NOT NULL,
                image_url TEXT
                )",
        (),
    )?;

    Ok(())
}

fn map_profile_row(row: &Row) -> Result<Profile, rusqlite::Error> {
    let raw_email: String = row.get(1)?;
    let raw_password_hash: String = row.get(3)?;

    Ok(Profile {
        id: ProfileId::new(row.get(0)?),
        email: EmailAddress::new_unchecked(raw_email),
        name: row.get(2)?,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        image_url: row.get(4)?,
    })
}

/// Insert a new profile into the database.
///
/// # Errors
///
/// Returns [Error::DuplicateEmail] if `email` is already in use, or
/// [Error::SqlError] if an SQL related error occurred.
pub fn insert_profile(
    connection: &Connection,
    email: EmailAddress,
    name: &str,
    password_hash: PasswordHash,
) -> Result<Profile, Error> {
    connection.execute(
        "INSERT INTO profile (email, name, password) VALUES (?1, ?2, ?3)",
        (email.as_str(), name, password_hash.as_ref()),
    )?;

    Ok(Profile {
        id: ProfileId::new(connection.last_insert_rowid()),
        email,
        name: name.to_string(),
        password_hash,
        image_url: None,
    })
}

/// Get the profile from the database with an ID equal to `profile_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if `profile_id` does not belong to a registered
/// profile, or [Error::SqlError] if an SQL related error occurred.
pub fn get_profile(connection: &Connection, profile_id: ProfileId) -> Result<Profile, Error> {
    connection
        .prepare("SELECT id, email, name, password, image_url FROM profile WHERE id = :id")?
        .query_row(&[(":id", &profile_id.as_i64())], map_profile_row)
        .map_err(|error| error.into())
}

/// Get the profile from the database that has the specified `email` address.
///
/// # Errors
///
/// Returns [Error::NotFound] if no such profile exists.
pub fn get_profile_by_email(
    connection: &Connection,
    email: &EmailAddress,
) -> Result<Profile, Error> {
    connection
        .prepare("SELECT id, email, name, password, image_url FROM profile WHERE email = :email")?
        .query_row(&[(":email", &email.as_str())], map_profile_row)
        .map_err(|error| error.into())
}

fn update_profile_password(
    connection: &Connection,
    profile_id: ProfileId,
    password_hash: &PasswordHash,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE profile SET password = ?1 WHERE id = ?2",
        (password_hash.as_ref(), profile_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

fn delete_profile_row(connection: &Connection, profile_id: ProfileId) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM profile WHERE id = ?1",
        (profile_id.as_i64(),),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// The sign-up form data for [create_profile].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProfile {
    /// The email address to register.
    pub email: String,
    /// The display name shown to other members.
    pub name: String,
    /// The plaintext password.
    pub password: String,
    /// Must match `password`.
    pub confirm_password: String,
}

/// Register a new profile.
///
/// Validates the email address, display name, password strength and password
/// confirmation, then hashes the password with `hash_cost` rounds (pass
/// [PasswordHash::DEFAULT_COST] outside of tests) and inserts the profile.
pub fn create_profile(
    connection: &Connection,
    new_profile: &NewProfile,
    hash_cost: u32,
) -> ActionResult<Profile> {
    let mut errors = ValidationErrors::new();

    let email = match EmailAddress::from_str(new_profile.email.trim()) {
        Ok(email) => Some(email),
        Err(_) => {
            errors.add_field("email", "Enter a valid email address");
            None
        }
    };

    let name = new_profile.name.trim();
    if name.is_empty() {
        errors.add_field("name", "Name is required");
    }

    let password = match ValidatedPassword::new(&new_profile.password) {
        Ok(password) => Some(password),
        Err(Error::TooWeak(feedback)) => {
            let message = if feedback.is_empty() {
                "Choose a stronger password".to_string()
            } else {
                feedback
            };
            errors.add_field("password", &message);
            None
        }
        Err(error) => return Err(error.into()),
    };

    if new_profile.password != new_profile.confirm_password {
        errors.add_field("confirm_password", "Passwords do not match");
    }

    match (email, password) {
        (Some(email), Some(password)) if errors.is_empty() => {
            let password_hash = PasswordHash::new(password, hash_cost)
                .map_err(ActionError::from)?;

            insert_profile(connection, email, name, password_hash).map_err(ActionError::from)
        }
        _ => Err(ActionError::Validation(errors)),
    }
}

/// The form data for [change_password].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordChange {
    /// The profile's current plaintext password.
    pub current_password: String,
    /// The new plaintext password.
    pub new_password: String,
    /// Must match `new_password`.
    pub confirm_password: String,
}

/// Change the signed-in profile's password.
///
/// The current password must verify against the stored digest, and the new
/// password must be strong and match its confirmation.
pub fn change_password(
    connection: &Connection,
    auth: Option<ProfileId>,
    change: &PasswordChange,
    hash_cost: u32,
) -> ActionResult<Profile> {
    let profile_id = auth.ok_or(ActionError::NotAuthenticated)?;
    let profile = get_profile(connection, profile_id)?;

    let mut errors = ValidationErrors::new();

    match profile.password_hash.verify(&change.current_password) {
        Ok(true) => {}
        Ok(false) => errors.add_field("current_password", "Current password is incorrect"),
        Err(error) => {
            return Err(ActionError::Server(Error::HashingError(error.to_string())));
        }
    }

    if change.new_password != change.confirm_password {
        errors.add_field("confirm_password", "Passwords do not match");
    }

    let password = match ValidatedPassword::new(&change.new_password) {
        Ok(password) => Some(password),
        Err(Error::TooWeak(feedback)) => {
            let message = if feedback.is_empty() {
                "Choose a stronger password".to_string()
            } else {
                feedback
            };
            errors.add_field("new_password", &message);
            None
        }
        Err(error) => return Err(error.into()),
    };

    match password {
        Some(password) if errors.is_empty() => {
            let password_hash = PasswordHash::new(password, hash_cost)
                .map_err(ActionError::from)?;
            update_profile_password(connection, profile_id, &password_hash)?;

            Ok(Profile {
                password_hash,
                ..profile
            })
        }
        _ => Err(ActionError::Validation(errors)),
    }
}

/// Delete a profile. Self-service only: acting on any other profile's ID is
/// rejected with [ActionError::NotAdmin].
///
/// Memberships held by the profile are removed by the store's cascade rules,
/// and so are lists the profile created. Deleting a profile that is the sole
/// ADMIN of a list created by someone else is rejected, since that list would
/// survive the cascade with no ADMIN left to manage it. Returns the
/// pre-deletion snapshot.
pub fn remove_profile(
    connection: &Connection,
    auth: Option<ProfileId>,
    profile_id: ProfileId,
) -> ActionResult<Profile> {
    let actor = auth.ok_or(ActionError::NotAuthenticated)?;

    if actor != profile_id {
        return Err(ActionError::NotAdmin);
    }

    let snapshot = get_profile(connection, profile_id)?;

    if count_lists_left_without_admin(connection, profile_id)? > 0 {
        return Err(ActionError::validation_of_form(LAST_ADMIN_MESSAGE));
    }

    delete_profile_row(connection, profile_id)?;

    Ok(snapshot)
}

#[cfg(test)]
mod profile_store_tests {
    use std::str::FromStr;

    use email_address::EmailAddress;
    use rusqlite::Connection;

    use crate::{Error, db::initialize, password::PasswordHash};

    use super::{ProfileId, get_profile, get_profile_by_email, insert_profile};

    fn init_db() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    #[test]
    fn insert_profile_succeeds() {
        let connection = init_db();
        let email = EmailAddress::from_str("hello@world.com").unwrap();
        let password_hash = PasswordHash::new_unchecked("hunter2");

        let inserted_profile = insert_profile(
            &connection,
            email.clone(),
            "Hello World",
            password_hash.clone(),
        )
        .unwrap();

        assert!(inserted_profile.id.as_i64() > 0);
        assert_eq!(inserted_profile.email, email);
        assert_eq!(inserted_profile.name, "Hello World");
        assert_eq!(inserted_profile.password_hash, password_hash);
        assert_eq!(inserted_profile.image_url, None);
    }

    #[test]
    fn insert_profile_fails_on_duplicate_email() {
        let connection = init_db();
        let email = EmailAddress::from_str("hello@world.com").unwrap();

        insert_profile(
            &connection,
            email.clone(),
            "First",
            PasswordHash::new_unchecked("hunter2"),
        )
        .unwrap();

        let result = insert_profile(
            &connection,
            email,
            "Second",
            PasswordHash::new_unchecked("hunter3"),
        );

        assert_eq!(result, Err(Error::DuplicateEmail));
    }

    #[test]
    fn get_profile_fails_with_non_existent_id() {
        let connection = init_db();

        let result = get_profile(&connection, ProfileId::new(42));

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn get_profile_by_email_succeeds() {
        let connection = init_db();
        let inserted_profile = insert_profile(
            &connection,
            EmailAddress::from_str("foo@bar.baz").unwrap(),
            "Foo",
            PasswordHash::new_unchecked("hunter2"),
        )
        .unwrap();

        let retrieved_profile =
            get_profile_by_email(&connection, &inserted_profile.email).unwrap();

        assert_eq!(retrieved_profile, inserted_profile);
    }
}
