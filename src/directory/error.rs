//! Outcomes the identity and session services report to the API layer.

use std::fmt;

/// Which registration field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidField {
    Email,
    Phone,
    /// One of name, password, batch, year of passout or profession is empty.
    MissingRequired,
}

impl fmt::Display for InvalidField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email => write!(f, "Please enter a valid email address."),
            Self::Phone => write!(f, "Please enter a valid phone number."),
            Self::MissingRequired => write!(f, "All fields except address are required."),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("Email already registered.")]
    DuplicateEmail,

    #[error("{0}")]
    InvalidField(InvalidField),

    #[error("User not found. Please register.")]
    UserNotFound,

    #[error("Incorrect password.")]
    WrongPassword,

    #[error("Account not activated. Please contact admin.")]
    Inactive,

    #[error("This account is signed in from another device or session.")]
    SessionConflict,

    #[error("Invalid admin credentials")]
    AdminDenied,

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl DirectoryError {
    /// Store failures are the only outcome that is not the caller's doing.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        !matches!(self, Self::Store(_))
    }
}

pub type Result<T, E = DirectoryError> = std::result::Result<T, E>;
