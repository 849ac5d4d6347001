//! Input validation for user-supplied fields.

use std::fmt;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid email format.
    InvalidEmail(String),
    /// Value too long.
    TooLong { field: String, max: usize, actual: usize },
    /// Empty value where one is required.
    Empty(String),
    /// Line breaks or other control characters in a single-line field.
    ControlCharacter(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidEmail(msg) => write!(f, "Invalid email: {}", msg),
            ValidationError::TooLong { field, max, actual } => {
                write!(f, "{} is too long ({} chars, max {})", field, actual, max)
            }
            ValidationError::Empty(field) => write!(f, "{} cannot be empty", field),
            ValidationError::ControlCharacter(field) => {
                write!(f, "{} cannot contain line breaks or control characters", field)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Maximum allowed length for email addresses.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum allowed length for community names.
pub const MAX_COMMUNITY_NAME_LENGTH: usize = 100;

/// Maximum allowed length for goal titles.
pub const MAX_GOAL_TITLE_LENGTH: usize = 200;

/// Maximum allowed length for goal and community descriptions.
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;

/// Maximum allowed length for a chat message.
pub const MAX_MESSAGE_LENGTH: usize = 4000;

/// Validate an email address (basic RFC 5322 format check).
///
/// This is a basic validation that checks:
/// - Contains exactly one @
/// - Has at least one character before @
/// - Has at least one character after @
/// - Has at least one dot after @
/// - Is not too long
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Empty("email".to_string()));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: MAX_EMAIL_LENGTH,
            actual: email.len(),
        });
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ValidationError::InvalidEmail(
            "must contain exactly one @ symbol".to_string(),
        ));
    }

    let (local, domain) = (parts[0], parts[1]);

    if local.is_empty() {
        return Err(ValidationError::InvalidEmail(
            "missing local part (before @)".to_string(),
        ));
    }

    if domain.is_empty() {
        return Err(ValidationError::InvalidEmail(
            "missing domain (after @)".to_string(),
        ));
    }

    if !domain.contains('.') {
        return Err(ValidationError::InvalidEmail(
            "domain must contain at least one dot".to_string(),
        ));
    }

    if domain.starts_with('.') || domain.ends_with('.') {
        return Err(ValidationError::InvalidEmail(
            "domain cannot start or end with a dot".to_string(),
        ));
    }

    if domain.contains("..") {
        return Err(ValidationError::InvalidEmail(
            "domain cannot contain consecutive dots".to_string(),
        ));
    }

    Ok(())
}

/// Trim a required text field and check it against a length bound.
///
/// Returns the trimmed value on success.
pub fn required_text(field: &str, value: &str, max: usize) -> Result<String, ValidationError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Empty(field.to_string()));
    }

    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
            actual,
        });
    }

    Ok(value.to_string())
}

/// Like [`required_text`], for fields that must stay on one line.
pub fn single_line_text(field: &str, value: &str, max: usize) -> Result<String, ValidationError> {
    let value = required_text(field, value, max)?;
    if value.chars().any(char::is_control) {
        return Err(ValidationError::ControlCharacter(field.to_string()));
    }
    Ok(value)
}

/// Trim an optional text field; blank values become `None`.
pub fn optional_text(
    field: &str,
    value: Option<&str>,
    max: usize,
) -> Result<Option<String>, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => required_text(field, value, max).map(Some),
    }
}

/// Validate a community name.
pub fn validate_community_name(name: &str) -> Result<String, ValidationError> {
    single_line_text("name", name, MAX_COMMUNITY_NAME_LENGTH)
}

/// Validate a goal title.
pub fn validate_goal_title(title: &str) -> Result<String, ValidationError> {
    single_line_text("title", title, MAX_GOAL_TITLE_LENGTH)
}

/// Validate an optional description.
pub fn validate_description(description: Option<&str>) -> Result<Option<String>, ValidationError> {
    optional_text("description", description, MAX_DESCRIPTION_LENGTH)
}

/// Validate chat message content.
pub fn validate_message_content(content: &str) -> Result<String, ValidationError> {
    required_text("content", content, MAX_MESSAGE_LENGTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email_valid() {
        assert!(validate_email("test@example.com").is_ok());
        assert!(validate_email("user.name@domain.co.uk").is_ok());
        assert!(validate_email("a@b.c").is_ok());
        assert!(validate_email(" test@example.com ").is_ok()); // trimmed
    }

    #[test]
    fn test_validate_email_invalid() {
        assert!(matches!(validate_email(""), Err(ValidationError::Empty(_))));

        assert!(matches!(
            validate_email("test.example.com"),
            Err(ValidationError::InvalidEmail(_))
        ));

        assert!(matches!(
            validate_email("test@example@com"),
            Err(ValidationError::InvalidEmail(_))
        ));

        assert!(matches!(
            validate_email("@example.com"),
            Err(ValidationError::InvalidEmail(_))
        ));

        assert!(matches!(
            validate_email("test@localhost"),
            Err(ValidationError::InvalidEmail(_))
        ));

        assert!(matches!(
            validate_email("test@example..com"),
            Err(ValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_goal_title() {
        assert_eq!(validate_goal_title("  Learn Rust  ").unwrap(), "Learn Rust");
        assert!(matches!(
            validate_goal_title("   "),
            Err(ValidationError::Empty(_))
        ));
        assert!(matches!(
            validate_goal_title(&"a".repeat(201)),
            Err(ValidationError::TooLong { max: 200, .. })
        ));
    }

    #[test]
    fn test_single_line_fields_reject_line_breaks() {
        assert!(matches!(
            validate_goal_title("Rust\n2. Mallory\n   Goals:"),
            Err(ValidationError::ControlCharacter(_))
        ));
        assert!(matches!(
            validate_goal_title("Rust\tasync"),
            Err(ValidationError::ControlCharacter(_))
        ));
        assert!(matches!(
            validate_community_name("Web\r\nDev"),
            Err(ValidationError::ControlCharacter(_))
        ));
        // Surrounding whitespace is still trimmed first
        assert_eq!(validate_goal_title("\n Rust \n").unwrap(), "Rust");
        // Descriptions may span lines
        assert!(validate_description(Some("line one\nline two")).is_ok());
    }

    #[test]
    fn test_optional_description() {
        assert_eq!(validate_description(None).unwrap(), None);
        assert_eq!(validate_description(Some("  ")).unwrap(), None);
        assert_eq!(
            validate_description(Some(" hooks ")).unwrap(),
            Some("hooks".to_string())
        );
        assert!(validate_description(Some(&"x".repeat(2001))).is_err());
    }

    #[test]
    fn test_message_content() {
        assert!(matches!(
            validate_message_content("\n\t"),
            Err(ValidationError::Empty(_))
        ));
        assert_eq!(validate_message_content("hi there").unwrap(), "hi there");
        // Length is measured in characters, not bytes
        assert!(validate_message_content(&"é".repeat(4000)).is_ok());
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::InvalidEmail("test message".to_string());
        assert_eq!(err.to_string(), "Invalid email: test message");

        let err = ValidationError::TooLong {
            field: "title".to_string(),
            max: 200,
            actual: 300,
        };
        assert_eq!(err.to_string(), "title is too long (300 chars, max 200)");
    }
}
