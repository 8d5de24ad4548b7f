//! The result envelope returned by core operations.
//!
//! Expected failures (validation, authorization, missing rows, duplicate keys)
//! are values, not panics: every operation returns an [ActionResult] whose
//! error side is an [ActionError]. The one fault class the caller cannot
//! recover from, [ActionError::Server], wraps the underlying storage error so
//! an outer handler can log it and show a generic message.

use serde::{Deserialize, Serialize};

use crate::Error;

/// The outcome of a core operation: the produced model on success, an
/// [ActionError] on any expected failure.
pub type ActionResult<M> = Result<M, ActionError>;

/// Structural input errors collected while validating an operation's input.
///
/// Field errors keep the order in which they were reported; no ordering is
/// promised across fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    field_errors: Vec<(String, Vec<String>)>,
    form_errors: Vec<String>,
}

impl ValidationErrors {
    /// Create an empty set of validation errors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error message against a named input field.
    pub fn add_field(&mut self, field: &str, message: &str) {
        match self
            .field_errors
            .iter_mut()
            .find(|(name, _)| name == field)
        {
            Some((_, messages)) => messages.push(message.to_string()),
            None => self
                .field_errors
                .push((field.to_string(), vec![message.to_string()])),
        }
    }

    /// Record an error message that applies to the form as a whole rather than
    /// a single field.
    pub fn add_form(&mut self, message: &str) {
        self.form_errors.push(message.to_string());
    }

    /// True if no errors have been recorded.
    pub fn is_empty(&self) -> bool {
        self.field_errors.is_empty() && self.form_errors.is_empty()
    }

    /// The messages recorded against `field`, if any.
    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.field_errors
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, messages)| messages.as_slice())
    }

    /// All field errors in reported order.
    pub fn field_errors(&self) -> &[(String, Vec<String>)] {
        &self.field_errors
    }

    /// All form-level errors in reported order.
    pub fn form_errors(&self) -> &[String] {
        &self.form_errors
    }
}

/// An expected failure of a core operation.
///
/// The display string of each kind is the human-readable sentence shown
/// directly by calling UIs, so the exact text is part of the observable
/// contract and should be kept stable.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ActionError {
    /// No signed-in profile was supplied for an operation that requires one.
    #[error("You must be signed in to perform this action")]
    NotAuthenticated,

    /// The profile has no membership row for the target list.
    #[error("This Profile is not a member of this List")]
    NotMember,

    /// The profile is a member, but its role is below the required minimum.
    #[error("This Profile is not authorized to perform this action")]
    NotAdmin,

    /// The referenced list, category, item or invite code does not exist.
    #[error("The requested resource does not exist")]
    NotFound,

    /// Structural input failed validation. Per-field messages are carried in
    /// the payload.
    #[error("Invalid input")]
    Validation(ValidationErrors),

    /// The store rejected a uniqueness constraint. The payload is the sentence
    /// to show the user, e.g. "That email address is already in use".
    #[error("{0}")]
    NotUnique(String),

    /// The store failed in a way the caller cannot recover from. The wrapped
    /// error is for the server log only; the display string never leaks it.
    #[error("Something went wrong")]
    Server(Error),
}

impl ActionError {
    /// The sentence a calling UI renders for this failure.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Whether the caller can meaningfully recover (prompt sign-in, fix the
    /// form, and so on). Only [ActionError::Server] is unrecoverable.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ActionError::Server(_))
    }

    /// A validation failure with a single message against one field.
    pub fn validation_of_field(field: &str, message: &str) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add_field(field, message);
        ActionError::Validation(errors)
    }

    /// A validation failure with a single form-level message.
    pub fn validation_of_form(message: &str) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add_form(message);
        ActionError::Validation(errors)
    }

    /// Flatten this failure into the envelope shape calling UIs consume.
    ///
    /// [ActionError::Server] failures log the wrapped cause and surface only
    /// the generic message.
    pub fn to_failure(&self) -> Failure {
        if let ActionError::Server(error) = self {
            tracing::error!("an unrecoverable error reached the operation boundary: {error}");
        }

        let (field_errors, form_errors) = match self {
            ActionError::Validation(errors) => (
                errors.field_errors.clone(),
                errors.form_errors.clone(),
            ),
            _ => (Vec::new(), Vec::new()),
        };

        Failure {
            message: self.message(),
            field_errors,
            form_errors,
        }
    }
}

/// The failure half of the result envelope, shaped for direct display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    /// A short human-readable sentence describing the failure.
    pub message: String,
    /// Per-field validation messages, populated only for validation failures.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub field_errors: Vec<(String, Vec<String>)>,
    /// Form-level validation messages, populated only for validation failures.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub form_errors: Vec<String>,
}

impl From<Error> for ActionError {
    fn from(value: Error) -> Self {
        match value {
            Error::NotFound => ActionError::NotFound,
            // A dangling foreign key means the referenced row vanished, which
            // from the caller's point of view is a missing resource.
            Error::InvalidForeignKey => ActionError::NotFound,
            Error::DuplicateEmail => {
                ActionError::NotUnique("That email address is already in use".to_string())
            }
            Error::DuplicateInviteCode => {
                ActionError::NotUnique("That invite code is already in use".to_string())
            }
            Error::DuplicateMember => ActionError::NotUnique(
                "This Profile is already a member of this List".to_string(),
            ),
            Error::EmptyName(label) => {
                ActionError::validation_of_field("name", &format!("{label} cannot be empty"))
            }
            Error::TooWeak(feedback) => {
                ActionError::validation_of_field("password", &feedback)
            }
            error => ActionError::Server(error),
        }
    }
}

impl From<rusqlite::Error> for ActionError {
    fn from(value: rusqlite::Error) -> Self {
        Error::from(value).into()
    }
}


#[cfg(test)]
mod action_error_tests {
    use crate::Error;

    use super::ActionError;

    #[test]
    fn messages_are_stable() {
        assert_eq!(
            ActionError::NotAdmin.message(),
            "This Profile is not authorized to perform this action"
        );
        assert_eq!(
            ActionError::NotAuthenticated.message(),
            "You must be signed in to perform this action"
        );
        assert_eq!(
            ActionError::NotMember.message(),
            "This Profile is not a member of this List"
        );
        assert_eq!(
            ActionError::NotFound.message(),
            "The requested resource does not exist"
        );
    }

    #[test]
    fn duplicate_email_translates_to_not_unique() {
        let error: ActionError = Error::DuplicateEmail.into();

        assert_eq!(
            error,
            ActionError::NotUnique("That email address is already in use".to_string())
        );
        assert!(error.is_recoverable());
    }

    #[test]
    fn server_failure_hides_internals() {
        let error: ActionError = Error::HashingError("bcrypt exploded".to_string()).into();

        assert!(!error.is_recoverable());
        assert_eq!(error.message(), "Something went wrong");

        let failure = error.to_failure();
        assert!(!failure.message.contains("bcrypt"));
    }

    #[test]
    fn validation_failure_serializes_with_field_errors() {
        let failure =
            ActionError::validation_of_field("name", "Name is required").to_failure();

        let json = serde_json::to_string(&failure).unwrap();

        assert!(json.contains("Invalid input"));
        assert!(json.contains("Name is required"));
    }

    #[test]
    fn plain_failure_omits_error_lists() {
        let json = serde_json::to_string(&ActionError::NotMember.to_failure()).unwrap();

        assert!(!json.contains("field_errors"));
        assert!(!json.contains("form_errors"));
    }
}
