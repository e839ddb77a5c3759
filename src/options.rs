//! Configuration options for MEML writing and object conversion.
//!
//! - [`WriterOptions`]: layout of written documents
//! - [`ConverterOptions`]: how a [`StructureConverter`](crate::StructureConverter)
//!   treats input it cannot map
//!
//! ## Examples
//!
//! ```rust
//! use meml::{meml, to_string_with_options, WriterOptions};
//!
//! let value = meml!({ "x": 1, "y": 2 });
//!
//! let compact = to_string_with_options(&value, WriterOptions::new()).unwrap();
//! assert_eq!(compact, r#"{"x":1,"y":2}"#);
//!
//! let pretty = to_string_with_options(&value, WriterOptions::pretty().with_indent(4)).unwrap();
//! assert_eq!(pretty, "{\n    \"x\": 1,\n    \"y\": 2\n}");
//! ```

/// Layout options for the [`Writer`](crate::Writer).
///
/// # Examples
///
/// ```rust
/// use meml::WriterOptions;
///
/// // Default compact options
/// let options = WriterOptions::new();
/// assert!(!options.pretty);
///
/// // Pretty-printed with 4-space indentation
/// let options = WriterOptions::pretty().with_indent(4);
/// assert_eq!(options.indent, 4);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriterOptions {
    pub indent: usize,
    pub pretty: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        WriterOptions {
            indent: 2,
            pretty: false,
        }
    }
}

impl WriterOptions {
    /// Creates default options (compact format, 2-space indent when pretty).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for output with one member or element per line.
    #[must_use]
    pub fn pretty() -> Self {
        WriterOptions {
            pretty: true,
            ..Default::default()
        }
    }

    /// Sets the number of spaces per nesting level.
    ///
    /// Default is 2. Only affects pretty-printed output.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}

/// Options for a [`StructureConverter`](crate::StructureConverter).
///
/// A lenient converter (the default) skips object keys that match no
/// selected member. A strict converter rejects them with
/// [`Error::UnknownMember`](crate::Error::UnknownMember).
///
/// # Examples
///
/// ```rust
/// use meml::{ConverterOptions, StructureConverter};
///
/// let converter = StructureConverter::with_options(ConverterOptions::strict());
/// assert!(converter.options().strict);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConverterOptions {
    pub strict: bool,
}

impl ConverterOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn strict() -> Self {
        ConverterOptions { strict: true }
    }

    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}
