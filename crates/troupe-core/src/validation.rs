//! Shared validation logic for string-based names and keys.
//!
//! Agent names, tool names, session identity parts and state keys all go
//! through the same rules so that a name accepted in one place is accepted
//! everywhere.

use thiserror::Error;

/// Validation rules for one kind of identifier.
#[derive(Debug, Clone, Copy)]
pub struct NameRules {
    /// Maximum allowed length in characters
    pub max_length: usize,
    /// Whether to allow `.` and `:` as namespace separators
    pub allow_separators: bool,
}

impl NameRules {
    /// Rules for agent and tool names.
    ///
    /// - Max length: 64 characters
    /// - Allows: alphanumeric, `_`, `-`
    /// - Disallows: separators, whitespace, and other special characters
    pub const NAME: Self = Self {
        max_length: 64,
        allow_separators: false,
    };

    /// Rules for session state keys.
    ///
    /// - Max length: 128 characters
    /// - Allows: alphanumeric, `_`, `-`, `.`, `:`
    ///
    /// The separator characters enable namespacing patterns like
    /// `user.settings` or `cache:session:123`.
    pub const STATE_KEY: Self = Self {
        max_length: 128,
        allow_separators: true,
    };

    /// Rules for session identity parts (application, user, session ids).
    ///
    /// - Max length: 128 characters
    /// - Allows: alphanumeric, `_`, `-`, `.`, `:`
    pub const IDENTITY: Self = Self {
        max_length: 128,
        allow_separators: true,
    };

    /// Validate `input` against these rules.
    ///
    /// Returns the accepted string unchanged. Identifiers are never trimmed;
    /// whitespace anywhere in the input is rejected outright so that two
    /// spellings of a name can never collide after normalization.
    pub fn validate(&self, input: &str) -> Result<String, ValidationError> {
        if input.is_empty() {
            return Err(ValidationError::Empty);
        }

        if input.trim().is_empty() {
            return Err(ValidationError::WhitespaceOnly);
        }

        if input != input.trim() {
            return Err(ValidationError::LeadingTrailingWhitespace);
        }

        if input.len() > self.max_length {
            return Err(ValidationError::TooLong {
                length: input.len(),
                max: self.max_length,
            });
        }

        for ch in input.chars() {
            let is_valid = ch.is_alphanumeric()
                || ch == '_'
                || ch == '-'
                || (self.allow_separators && (ch == '.' || ch == ':'));

            if !is_valid {
                return Err(ValidationError::InvalidChar {
                    char: ch,
                    input: input.to_string(),
                });
            }
        }

        Ok(input.to_string())
    }
}

/// Errors that can occur during identifier validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Identifier is empty
    #[error("Identifier cannot be empty")]
    Empty,
    /// Identifier contains only whitespace
    #[error("Identifier cannot be whitespace-only")]
    WhitespaceOnly,
    /// Identifier has leading or trailing whitespace
    #[error("Identifier cannot have leading or trailing whitespace")]
    LeadingTrailingWhitespace,
    /// Identifier exceeds maximum allowed length
    #[error("Identifier too long: {length} characters (max {max})")]
    TooLong {
        /// Actual length
        length: usize,
        /// Maximum allowed length
        max: usize,
    },
    /// Identifier contains an invalid character
    #[error("Identifier '{input}' contains invalid character '{char}'")]
    InvalidChar {
        /// The invalid character
        char: char,
        /// The full input string
        input: String,
    },
}
