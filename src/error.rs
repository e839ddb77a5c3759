//! Error types for MEML reading, writing and object conversion.
//!
//! ## Error Categories
//!
//! - **Parse errors**: raised by the [`TokenReader`](crate::TokenReader) and the
//!   value builder. Each one carries the 0-based character offset of the
//!   offending token.
//! - **Conversion errors**: raised by the
//!   [`StructureConverter`](crate::StructureConverter). Each one carries the
//!   member path (`player.inventory[2].count`) where conversion stopped.
//! - **I/O errors**: passed through from the underlying reader or writer.
//!
//! ## Examples
//!
//! ```rust
//! use meml::{from_str, Error};
//!
//! let err = from_str("{ name: Bob }").unwrap_err();
//! assert!(matches!(err, Error::InvalidLiteral { .. }));
//! assert_eq!(err.offset(), Some(8));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors raised while reading, writing or converting MEML.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// The input ended in the middle of a string, container or key/value pair.
    #[error("Unexpected end of input at offset {offset}")]
    UnexpectedEndOfInput { offset: usize },

    /// A backslash escape other than `\n \r \t \v \" \\`.
    #[error("Unknown escape sequence '\\{escape}' at offset {offset}")]
    UnknownEscapeSequence { offset: usize, escape: char },

    /// An object or array was closed right after a key.
    #[error("Key without a value at offset {offset}")]
    EmptyValue { offset: usize },

    /// A bare token that is neither `null`, `true`, `false` nor a number.
    #[error("Invalid literal '{literal}' at offset {offset}\nHelp: strings must be quoted, did you mean \"{literal}\"?")]
    InvalidLiteral { offset: usize, literal: String },

    /// A `bin::` string whose payload is not valid base64.
    #[error("Invalid base64 payload in binary literal at offset {offset}")]
    InvalidBinary { offset: usize },

    /// A structurally valid token in a position the grammar does not allow.
    #[error("Unexpected {token} at offset {offset}")]
    UnexpectedToken { offset: usize, token: String },

    /// Content left over after a complete document.
    #[error("Trailing characters after document at offset {offset}")]
    TrailingCharacters { offset: usize },

    /// Containers nested deeper than [`MAX_DEPTH`](crate::MAX_DEPTH) levels.
    #[error("Recursion limit exceeded at offset {offset}")]
    RecursionLimitExceeded { offset: usize },

    /// Writers refuse NaN and infinities, the grammar has no literal for them.
    #[error("Cannot write non-finite number {0}")]
    NonFiniteNumber(f64),

    /// Writers refuse to open a container past the depth readers accept.
    #[error("Cannot write containers nested deeper than {0} levels")]
    NestingTooDeep(usize),

    /// A text string that would read back as a binary literal.
    #[error("Cannot write string {0:?}: text starting with 'bin::' reads back as binary")]
    BinaryPrefixedString(String),

    /// The target type has no parameterless constructor.
    #[error("Type {type_name} has no default constructor")]
    NoDefaultConstructor { type_name: String },

    /// A null was found where a non-optional value is required.
    #[error("Required value of type {type_name} missing at '{path}'")]
    RequiredValueMissing { path: String, type_name: String },

    /// The stored kind cannot be widened into the target type.
    #[error("Type mismatch at '{path}': expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },

    /// A key with no matching member, reported only by strict converters.
    #[error("Unknown member '{member}' for type {type_name}")]
    UnknownMember { type_name: String, member: String },

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a type mismatch error at the root of a conversion.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use meml::Error;
    ///
    /// let err = Error::type_mismatch("i32", "string").at_member("age");
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Type mismatch at 'age': expected i32, found string"
    /// );
    /// ```
    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Error::TypeMismatch {
            path: String::new(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Creates a missing-value error at the root of a conversion.
    pub fn required_value_missing(type_name: impl Into<String>) -> Self {
        Error::RequiredValueMissing {
            path: String::new(),
            type_name: type_name.into(),
        }
    }

    pub fn no_default_constructor(type_name: impl Into<String>) -> Self {
        Error::NoDefaultConstructor {
            type_name: type_name.into(),
        }
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for file reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Prefixes the member path of a conversion error with `member`.
    ///
    /// Errors without a path are returned unchanged.
    #[must_use]
    pub fn at_member(self, member: &str) -> Self {
        self.map_path(|path| {
            if path.is_empty() || path.starts_with('[') {
                format!("{}{}", member, path)
            } else {
                format!("{}.{}", member, path)
            }
        })
    }

    /// Prefixes the member path of a conversion error with an array index.
    #[must_use]
    pub fn at_index(self, index: usize) -> Self {
        self.map_path(|path| {
            if path.is_empty() || path.starts_with('[') {
                format!("[{}]{}", index, path)
            } else {
                format!("[{}].{}", index, path)
            }
        })
    }

    fn map_path(self, f: impl FnOnce(&str) -> String) -> Self {
        match self {
            Error::TypeMismatch {
                path,
                expected,
                found,
            } => Error::TypeMismatch {
                path: f(&path),
                expected,
                found,
            },
            Error::RequiredValueMissing { path, type_name } => Error::RequiredValueMissing {
                path: f(&path),
                type_name,
            },
            other => other,
        }
    }

    /// Returns the character offset of a parse error.
    #[must_use]
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::UnexpectedEndOfInput { offset }
            | Error::UnknownEscapeSequence { offset, .. }
            | Error::EmptyValue { offset }
            | Error::InvalidLiteral { offset, .. }
            | Error::InvalidBinary { offset }
            | Error::UnexpectedToken { offset, .. }
            | Error::TrailingCharacters { offset }
            | Error::RecursionLimitExceeded { offset } => Some(*offset),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
