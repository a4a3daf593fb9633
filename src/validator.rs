// 📝 Submission Validation
// Turns raw form fields into a NewRegistration, or every reason it can't be one

use crate::club::Club;
use crate::registration::NewRegistration;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

pub const NAME_MIN_CHARS: usize = 3;
pub const NAME_MAX_CHARS: usize = 255;

lazy_static! {
    /// local-part "@" domain, where the domain has at least one dot
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$"
    ).unwrap();
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Club,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Email => "Email",
            Field::Club => "Club",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    EmptyField,
    TooShort,
    TooLong,
    InvalidFormat,
    InvalidChoice,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: Field,
    pub kind: ErrorKind,
}

impl ValidationError {
    fn new(field: Field, kind: ErrorKind) -> Self {
        ValidationError { field, kind }
    }

    /// Human-readable message shown next to the form
    pub fn message(&self) -> String {
        match (self.field, self.kind) {
            (field, ErrorKind::EmptyField) => format!("{} is required", field.as_str()),
            (field, ErrorKind::TooShort) => {
                format!("{} must be at least {} characters", field.as_str(), NAME_MIN_CHARS)
            }
            (field, ErrorKind::TooLong) => {
                format!("{} must be at most {} characters", field.as_str(), NAME_MAX_CHARS)
            }
            (Field::Email, ErrorKind::InvalidFormat) => {
                "Please enter a valid email address".to_string()
            }
            (field, ErrorKind::InvalidFormat) => format!("{} has an invalid format", field.as_str()),
            (_, ErrorKind::InvalidChoice) => "Please select a valid club".to_string(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<NewRegistration, Vec<ValidationError>>;

// ============================================================================
// VALIDATION
// ============================================================================

/// Validate a raw submission.
///
/// Every field is checked independently and all failures are returned,
/// ordered name, email, club. Accepted values come back trimmed.
pub fn validate(name: &str, email: &str, club: &str) -> ValidationResult {
    let mut errors = Vec::new();

    let name = name.trim();
    let name_len = name.chars().count();
    if name.is_empty() {
        errors.push(ValidationError::new(Field::Name, ErrorKind::EmptyField));
    } else if name_len < NAME_MIN_CHARS {
        errors.push(ValidationError::new(Field::Name, ErrorKind::TooShort));
    } else if name_len > NAME_MAX_CHARS {
        errors.push(ValidationError::new(Field::Name, ErrorKind::TooLong));
    }

    let email = email.trim();
    if email.is_empty() {
        errors.push(ValidationError::new(Field::Email, ErrorKind::EmptyField));
    } else if !EMAIL_REGEX.is_match(email) {
        errors.push(ValidationError::new(Field::Email, ErrorKind::InvalidFormat));
    }

    let parsed_club = if club.trim().is_empty() {
        errors.push(ValidationError::new(Field::Club, ErrorKind::EmptyField));
        None
    } else {
        match club.parse::<Club>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                errors.push(ValidationError::new(Field::Club, ErrorKind::InvalidChoice));
                None
            }
        }
    };

    match parsed_club {
        Some(club) if errors.is_empty() => Ok(NewRegistration {
            name: name.to_string(),
            email: email.to_string(),
            club,
        }),
        _ => Err(errors),
    }
}

// ============================================================================
// TESTS
// ============================================================================
