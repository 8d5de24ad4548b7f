//! Trolley is the core of a shared shopping-list application.
//!
//! Profiles create lists, invite other profiles to join them via opaque invite
//! codes, and collaboratively manage each list's categories and items. This
//! library implements the membership-based authorization rules and the list
//! lifecycle (creation, default population, update, cascading removal); it is
//! consumed by an outer web layer that handles routing, sessions and rendering.
//!
//! Every operation that can fail for an expected business reason (bad input,
//! not signed in, not authorized, not found, duplicate key) returns an
//! [ActionResult] instead of bubbling an error to a panic handler. See the
//! [outcome] module for the envelope and [guard] for the policy checks.

#![warn(missing_docs)]

pub mod category;
pub mod db;
pub mod gateway;
pub mod guard;
pub mod invite;
pub mod item;
pub mod lifecycle;
pub mod list;
pub mod logging;
pub mod member;
pub mod membership;
pub mod outcome;
pub mod password;
pub mod profile;

pub use db::initialize as initialize_db;
pub use list::{InviteCode, List, ListId};
pub use member::{Member, Role};
pub use outcome::{ActionError, ActionResult};
pub use password::PasswordHash;
pub use profile::{Profile, ProfileId};

/// The errors that may occur in the storage layer.
///
/// These are infrastructure-level errors. Operations translate the expected
/// ones (missing rows, uniqueness violations) into [ActionError] kinds at
/// their boundary; anything else surfaces as [ActionError::Server].
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested row could not be found.
    ///
    /// Internally, this error occurs when a query returns no rows.
    #[error("the requested row could not be found")]
    NotFound,

    /// The email address already exists in the database. The caller should try
    /// again with a different email address.
    #[error("the email address is already in use")]
    DuplicateEmail,

    /// The generated invite code clashed with an existing list's code.
    ///
    /// Codes are random, so the caller should regenerate and retry.
    #[error("the invite code is already in use")]
    DuplicateInviteCode,

    /// The profile already has a membership row for the list.
    #[error("the profile is already a member of the list")]
    DuplicateMember,

    /// A query was given a foreign key that does not refer to a valid row.
    #[error("a foreign key does not refer to a valid row")]
    InvalidForeignKey,

    /// An empty string was used where a name is required.
    ///
    /// The label describes which name, e.g. "List name".
    #[error("{0} cannot be empty")]
    EmptyName(&'static str),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("profile.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("list.invite_code") =>
            {
                Error::DuplicateInviteCode
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("member.list_id") =>
            {
                Error::DuplicateMember
            }
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(_))
                if sql_error.extended_code == 787 =>
            {
                Error::InvalidForeignKey
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}
