//! Flat string field parsing for the text call surface.
//!
//! A call string is a flat, ordered list of fields split on a single
//! delimiter (default `|`). There is no nesting. With
//! [`ParseFlags::ESCAPES`] a backslash escapes the delimiter or itself.
//!
//! ```
//! use callkit_core::FlatStringParser;
//!
//! let mut parser = FlatStringParser::new(r"3|a\|b");
//! assert!(parser.advance());
//! assert_eq!(parser.value(), Some("3"));
//! assert!(parser.advance());
//! assert_eq!(parser.value(), Some("a|b"));
//! assert!(!parser.advance());
//! ```

use bitflags::bitflags;

bitflags! {
    /// Behavior switches for [`FlatStringParser`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ParseFlags: u8 {
        /// Backslash escapes the delimiter and itself
        const ESCAPES = 1 << 0;
        /// Strip surrounding whitespace from every field
        const TRIM_FIELDS = 1 << 1;
    }
}

/// Parser configuration for the text call surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Field delimiter
    pub delimiter: char,
    /// Behavior switches
    pub flags: ParseFlags,
}

impl ParseOptions {
    /// Default delimiter between fields.
    pub const DEFAULT_DELIMITER: char = '|';

    /// Replace the delimiter.
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Replace the flags.
    pub fn with_flags(mut self, flags: ParseFlags) -> Self {
        self.flags = flags;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            delimiter: Self::DEFAULT_DELIMITER,
            flags: ParseFlags::ESCAPES,
        }
    }
}

/// A source of ordered text fields.
///
/// Parameter lists pull one field per parameter; `None` means the source ran
/// out and the parameter takes its default.
pub trait FieldSource {
    /// Next field, in order.
    fn next_field(&mut self) -> Option<String>;
}

/// Splits a flat call string into fields.
#[derive(Debug, Clone)]
pub struct FlatStringParser<'a> {
    input: &'a str,
    /// Byte offset of the next field; `None` once exhausted
    pos: Option<usize>,
    current: Option<String>,
    options: ParseOptions,
}

impl<'a> FlatStringParser<'a> {
    /// Parse `input` with default options.
    pub fn new(input: &'a str) -> Self {
        Self::with_options(input, ParseOptions::default())
    }

    /// Parse `input` with the given options.
    ///
    /// Empty input has zero fields; `"a|"` has two, the second empty.
    pub fn with_options(input: &'a str, options: ParseOptions) -> Self {
        Self {
            input,
            pos: (!input.is_empty()).then_some(0),
            current: None,
            options,
        }
    }

    /// Move to the next field. Returns false once the input is exhausted.
    pub fn advance(&mut self) -> bool {
        let Some(start) = self.pos else {
            self.current = None;
            return false;
        };

        let escapes = self.options.flags.contains(ParseFlags::ESCAPES);
        let delimiter = self.options.delimiter;
        let rest = &self.input[start..];
        let mut field = String::new();
        let mut chars = rest.char_indices();
        let mut next_pos = None;

        while let Some((offset, ch)) = chars.next() {
            if escapes && ch == '\\' {
                match chars.clone().next() {
                    Some((_, escaped)) if escaped == delimiter || escaped == '\\' => {
                        field.push(escaped);
                        chars.next();
                        continue;
                    }
                    _ => {}
                }
            }
            if ch == delimiter {
                next_pos = Some(start + offset + ch.len_utf8());
                break;
            }
            field.push(ch);
        }

        if self.options.flags.contains(ParseFlags::TRIM_FIELDS) {
            field = field.trim().to_string();
        }
        self.pos = next_pos;
        self.current = Some(field);
        true
    }

    /// The current field, after a successful [`advance`](Self::advance).
    pub fn value(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Collect every remaining field.
    pub fn collect_fields(mut self) -> Vec<String> {
        let mut fields = Vec::new();
        while self.advance() {
            fields.extend(self.current.take());
        }
        fields
    }
}

impl FieldSource for FlatStringParser<'_> {
    fn next_field(&mut self) -> Option<String> {
        if self.advance() {
            self.current.clone()
        } else {
            None
        }
    }
}

/// Escape a value so it reads back as a single field.
pub fn escape_field(value: &str, options: &ParseOptions) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch == options.delimiter || ch == '\\' {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Join values into a call string, escaping each one.
pub fn join_fields<I, S>(values: I, options: &ParseOptions) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (i, value) in values.into_iter().enumerate() {
        if i > 0 {
            out.push(options.delimiter);
        }
        if options.flags.contains(ParseFlags::ESCAPES) {
            out.push_str(&escape_field(value.as_ref(), options));
        } else {
            out.push_str(value.as_ref());
        }
    }
    out
}
