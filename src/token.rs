//! Pull-based MEML lexer.
//!
//! [`TokenReader`] turns a character source into a flat sequence of
//! [`Token`]s, one per call to [`TokenReader::read`]. It never looks further
//! ahead than the token it is producing (plus two characters), so documents
//! of any size stream through a constant amount of memory.
//!
//! ```rust
//! use meml::{Token, TokenReader};
//!
//! let mut reader = TokenReader::from_str("// player\n{ hp: 10 }");
//! let mut tokens = Vec::new();
//! while reader.read().unwrap() {
//!     tokens.push(reader.token().cloned().unwrap());
//! }
//! assert_eq!(
//!     tokens,
//!     vec![
//!         Token::ObjectStart,
//!         Token::ObjectKey("hp".to_string()),
//!         Token::Int(10),
//!         Token::ObjectEnd,
//!     ]
//! );
//! ```

use crate::{Error, Number, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fmt;
use std::io::{BufReader, Bytes, Read};

/// Prefix marking a string literal as base64-encoded binary data.
pub const BINARY_PREFIX: &str = "bin::";

/// One structural or scalar element of a MEML document.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    ObjectStart,
    ObjectEnd,
    ArrayStart,
    ArrayEnd,
    ObjectKey(String),
    String(String),
    Binary(Vec<u8>),
    Bool(bool),
    Int(i32),
    Long(i64),
    ULong(u64),
    Float(f32),
    Double(f64),
    Null,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::ObjectStart => f.write_str("'{'"),
            Token::ObjectEnd => f.write_str("'}'"),
            Token::ArrayStart => f.write_str("'['"),
            Token::ArrayEnd => f.write_str("']'"),
            Token::ObjectKey(key) => write!(f, "key \"{}\"", key),
            Token::String(s) => write!(f, "string \"{}\"", s),
            Token::Binary(bytes) => write!(f, "binary ({} bytes)", bytes.len()),
            Token::Bool(b) => write!(f, "{}", b),
            Token::Int(v) => write!(f, "int {}", v),
            Token::Long(v) => write!(f, "long {}", v),
            Token::ULong(v) => write!(f, "ulong {}", v),
            Token::Float(v) => write!(f, "float {}", Number::Float(*v)),
            Token::Double(v) => write!(f, "double {}", Number::Double(*v)),
            Token::Null => f.write_str("null"),
        }
    }
}

impl From<Number> for Token {
    fn from(number: Number) -> Self {
        match number {
            Number::SByte(v) => Token::Int(v.into()),
            Number::Byte(v) => Token::Int(v.into()),
            Number::Short(v) => Token::Int(v.into()),
            Number::UShort(v) => Token::Int(v.into()),
            Number::Int(v) => Token::Int(v),
            Number::UInt(v) => Token::Long(v.into()),
            Number::Long(v) => Token::Long(v),
            Number::ULong(v) => Token::ULong(v),
            Number::Float(v) => Token::Float(v),
            Number::Double(v) => Token::Double(v),
        }
    }
}

/// Character source decoding UTF-8 from a byte stream with two characters of lookahead.
struct CharSource<R: Read> {
    bytes: Bytes<BufReader<R>>,
    lookahead: [Option<char>; 2],
    buffered: usize,
    offset: usize,
}

impl<R: Read> CharSource<R> {
    fn new(reader: R) -> Self {
        CharSource {
            bytes: BufReader::new(reader).bytes(),
            lookahead: [None, None],
            buffered: 0,
            offset: 0,
        }
    }

    fn decode(&mut self) -> Result<Option<char>> {
        let first = match self.bytes.next() {
            Some(byte) => byte?,
            None => return Ok(None),
        };
        let width = match first {
            0x00..=0x7F => return Ok(Some(char::from(first))),
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => return Err(invalid_utf8(self.offset)),
        };

        let mut buf = [first, 0, 0, 0];
        for slot in buf.iter_mut().take(width).skip(1) {
            *slot = match self.bytes.next() {
                Some(byte) => byte?,
                None => return Err(invalid_utf8(self.offset)),
            };
        }
        std::str::from_utf8(&buf[..width])
            .ok()
            .and_then(|s| s.chars().next())
            .map(Some)
            .ok_or_else(|| invalid_utf8(self.offset))
    }

    fn fill(&mut self, count: usize) -> Result<()> {
        while self.buffered < count {
            self.lookahead[self.buffered] = self.decode()?;
            self.buffered += 1;
        }
        Ok(())
    }

    fn peek(&mut self) -> Result<Option<char>> {
        self.fill(1)?;
        Ok(self.lookahead[0])
    }

    fn peek_second(&mut self) -> Result<Option<char>> {
        self.fill(2)?;
        Ok(self.lookahead[1])
    }

    fn next(&mut self) -> Result<Option<char>> {
        self.fill(1)?;
        let ch = self.lookahead[0];
        self.lookahead[0] = self.lookahead[1];
        self.lookahead[1] = None;
        self.buffered -= 1;
        if ch.is_some() {
            self.offset += 1;
        }
        Ok(ch)
    }
}

fn invalid_utf8(offset: usize) -> Error {
    Error::io(&format!("stream did not contain valid UTF-8 at offset {}", offset))
}

/// Characters that end a bare literal and are tokens or separators themselves.
fn is_structural(ch: char) -> bool {
    matches!(ch, ',' | ':' | '{' | '}' | '[' | ']' | '"')
}

/// Pull-based lexer over any [`Read`] source.
///
/// Offsets reported by [`TokenReader::offset`] and in errors are 0-based
/// character (not byte) positions.
pub struct TokenReader<R: Read> {
    source: CharSource<R>,
    current: Option<Token>,
    token_offset: usize,
    after_key: bool,
}

impl<'a> TokenReader<&'a [u8]> {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &'a str) -> Self {
        TokenReader::new(input.as_bytes())
    }
}

impl<R: Read> TokenReader<R> {
    pub fn new(reader: R) -> Self {
        TokenReader {
            source: CharSource::new(reader),
            current: None,
            token_offset: 0,
            after_key: false,
        }
    }

    /// The token produced by the last successful [`read`](Self::read).
    #[must_use]
    pub fn token(&self) -> Option<&Token> {
        self.current.as_ref()
    }

    /// Takes ownership of the current token, leaving `None` behind.
    pub fn take_token(&mut self) -> Option<Token> {
        self.current.take()
    }

    /// Character offset where the current token starts.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.token_offset
    }

    /// Advances to the next token.
    ///
    /// Returns `Ok(false)` once the input is exhausted.
    ///
    /// # Errors
    ///
    /// Any lexical error aborts the read; the reader should not be used
    /// afterwards.
    pub fn read(&mut self) -> Result<bool> {
        self.current = None;
        self.skip_separators()?;
        self.token_offset = self.source.offset;

        let ch = match self.source.peek()? {
            Some(ch) => ch,
            None => {
                if self.after_key {
                    return Err(Error::UnexpectedEndOfInput {
                        offset: self.token_offset,
                    });
                }
                return Ok(false);
            }
        };

        let token = match ch {
            '{' | '[' => {
                self.source.next()?;
                if ch == '{' {
                    Token::ObjectStart
                } else {
                    Token::ArrayStart
                }
            }
            '}' | ']' => {
                if self.after_key {
                    return Err(Error::EmptyValue {
                        offset: self.token_offset,
                    });
                }
                self.source.next()?;
                if ch == '}' {
                    Token::ObjectEnd
                } else {
                    Token::ArrayEnd
                }
            }
            '"' => self.read_string()?,
            _ => self.read_bare()?,
        };

        self.after_key = matches!(token, Token::ObjectKey(_));
        self.current = Some(token);
        Ok(true)
    }

    /// Skips whitespace, `:` and `,` separators and `//` comments.
    fn skip_separators(&mut self) -> Result<()> {
        while let Some(ch) = self.source.peek()? {
            if ch.is_whitespace() || ch == ':' || ch == ',' {
                self.source.next()?;
            } else if ch == '/' && self.source.peek_second()? == Some('/') {
                while let Some(ch) = self.source.next()? {
                    if ch == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
        Ok(())
    }

    /// Looks past whitespace for a `:`, which turns the preceding text into a key.
    fn followed_by_colon(&mut self) -> Result<bool> {
        while let Some(ch) = self.source.peek()? {
            if ch.is_whitespace() {
                self.source.next()?;
            } else {
                return Ok(ch == ':');
            }
        }
        Ok(false)
    }

    fn read_string(&mut self) -> Result<Token> {
        self.source.next()?; // consume opening quote
        let mut text = String::new();

        loop {
            let escape_offset = self.source.offset;
            match self.source.next()? {
                Some('"') => break,
                Some('\\') => match self.source.next()? {
                    Some('n') => text.push('\n'),
                    Some('r') => text.push('\r'),
                    Some('t') => text.push('\t'),
                    Some('v') => text.push('\u{000B}'),
                    Some('"') => text.push('"'),
                    Some('\\') => text.push('\\'),
                    Some(other) => {
                        return Err(Error::UnknownEscapeSequence {
                            offset: escape_offset,
                            escape: other,
                        })
                    }
                    None => {
                        return Err(Error::UnexpectedEndOfInput {
                            offset: self.source.offset,
                        })
                    }
                },
                Some(other) => text.push(other),
                None => {
                    return Err(Error::UnexpectedEndOfInput {
                        offset: self.source.offset,
                    })
                }
            }
        }

        if self.followed_by_colon()? {
            return Ok(Token::ObjectKey(text));
        }

        match text.strip_prefix(BINARY_PREFIX) {
            Some(payload) => STANDARD
                .decode(payload)
                .map(Token::Binary)
                .map_err(|_| Error::InvalidBinary {
                    offset: self.token_offset,
                }),
            None => Ok(Token::String(text)),
        }
    }

    fn read_bare(&mut self) -> Result<Token> {
        let mut text = String::new();
        while let Some(ch) = self.source.peek()? {
            if ch.is_whitespace() || is_structural(ch) {
                break;
            }
            if ch == '/' && self.source.peek_second()? == Some('/') {
                break;
            }
            text.push(ch);
            self.source.next()?;
        }

        if self.followed_by_colon()? {
            return Ok(Token::ObjectKey(text));
        }

        let keyword = match text.as_str() {
            "null" => Some(Token::Null),
            "true" => Some(Token::Bool(true)),
            "false" => Some(Token::Bool(false)),
            _ => None,
        };
        if let Some(token) = keyword {
            return Ok(token);
        }

        Number::parse_literal(&text)
            .map(Token::from)
            .ok_or(Error::InvalidLiteral {
                offset: self.token_offset,
                literal: text,
            })
    }
}

impl<R: Read> Iterator for TokenReader<R> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read() {
            Ok(true) => self.take_token().map(Ok),
            Ok(false) => None,
            Err(err) => Some(Err(err)),
        }
    }
}
