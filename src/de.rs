//! MEML deserialization.
//!
//! Reading happens in two stages:
//!
//! - [`ValueBuilder`] pulls tokens from a [`TokenReader`] and materializes
//!   exactly one document as a [`MemlValue`] tree.
//! - The tree is then handed to the [`StructureConverter`](crate::StructureConverter)
//!   for descriptor-driven conversion, or to [`from_value`] for any type
//!   implementing serde's `Deserialize`.
//!
//! ## Usage
//!
//! ```rust
//! use meml::{from_str, MemlValue};
//!
//! let value = from_str("{ a: 1, a: 2 }").unwrap();
//! assert_eq!(value.as_object().map(|o| o.len()), Some(1));
//! assert_eq!(value["a"], MemlValue::from(2));
//! ```
//!
//! ```rust
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Data { x: i32, y: i32 }
//!
//! let data: Data = meml::from_str_as("{ x: 1, y: 2 }").unwrap();
//! assert_eq!(data, Data { x: 1, y: 2 });
//! ```

use crate::{Error, MemlMap, MemlValue, Number, Result, Token, TokenReader};
use serde::de::{DeserializeOwned, IntoDeserializer};
use serde::{de, forward_to_deserialize_any};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::trace;

/// Deepest container nesting accepted by the reader and produced by the writer.
pub const MAX_DEPTH: usize = 128;

/// Builds a [`MemlValue`] tree from a token stream.
pub struct ValueBuilder<R: Read> {
    reader: TokenReader<R>,
    remaining_depth: usize,
}

impl<R: Read> ValueBuilder<R> {
    pub fn new(reader: TokenReader<R>) -> Self {
        ValueBuilder {
            reader,
            remaining_depth: MAX_DEPTH,
        }
    }

    /// Reads one complete document and checks that nothing follows it.
    ///
    /// # Errors
    ///
    /// Any lexical error from the reader, [`Error::UnexpectedToken`] for
    /// misplaced tokens, [`Error::UnexpectedEndOfInput`] for unclosed
    /// containers or empty input, [`Error::RecursionLimitExceeded`] past
    /// [`MAX_DEPTH`] nested containers, and [`Error::TrailingCharacters`]
    /// for a second document.
    pub fn build(mut self) -> Result<MemlValue> {
        let first = self.next_token()?;
        let value = self.build_value(first)?;
        if self.reader.read()? {
            return Err(Error::TrailingCharacters {
                offset: self.reader.offset(),
            });
        }
        Ok(value)
    }

    fn next_token(&mut self) -> Result<Token> {
        if !self.reader.read()? {
            return Err(Error::UnexpectedEndOfInput {
                offset: self.reader.offset(),
            });
        }
        self.reader
            .take_token()
            .ok_or(Error::UnexpectedEndOfInput {
                offset: self.reader.offset(),
            })
    }

    fn unexpected(&self, token: &Token) -> Error {
        Error::UnexpectedToken {
            offset: self.reader.offset(),
            token: token.to_string(),
        }
    }

    fn build_value(&mut self, token: Token) -> Result<MemlValue> {
        let value = match token {
            Token::ObjectStart => self.nested(Self::build_object)?,
            Token::ArrayStart => self.nested(Self::build_array)?,
            Token::String(s) => MemlValue::String(s),
            Token::Binary(bytes) => MemlValue::Binary(bytes),
            Token::Bool(b) => MemlValue::Bool(b),
            Token::Int(v) => MemlValue::Number(Number::Int(v)),
            Token::Long(v) => MemlValue::Number(Number::Long(v)),
            Token::ULong(v) => MemlValue::Number(Number::ULong(v)),
            Token::Float(v) => MemlValue::Number(Number::Float(v)),
            Token::Double(v) => MemlValue::Number(Number::Double(v)),
            Token::Null => MemlValue::Null,
            other @ (Token::ObjectEnd | Token::ArrayEnd | Token::ObjectKey(_)) => {
                return Err(self.unexpected(&other))
            }
        };
        Ok(value)
    }

    fn nested(&mut self, build: fn(&mut Self) -> Result<MemlValue>) -> Result<MemlValue> {
        if self.remaining_depth == 0 {
            return Err(Error::RecursionLimitExceeded {
                offset: self.reader.offset(),
            });
        }
        self.remaining_depth -= 1;
        let value = build(self);
        self.remaining_depth += 1;
        value
    }

    fn build_object(&mut self) -> Result<MemlValue> {
        let mut map = MemlMap::new();
        loop {
            match self.next_token()? {
                Token::ObjectEnd => return Ok(MemlValue::Object(map)),
                Token::ObjectKey(key) => {
                    let token = self.next_token()?;
                    let value = self.build_value(token)?;
                    map.insert(key, value);
                }
                other => return Err(self.unexpected(&other)),
            }
        }
    }

    fn build_array(&mut self) -> Result<MemlValue> {
        let mut elements = Vec::new();
        loop {
            match self.next_token()? {
                Token::ArrayEnd => return Ok(MemlValue::Array(elements)),
                token => elements.push(self.build_value(token)?),
            }
        }
    }
}

/// Parses one MEML document from a string.
///
/// # Examples
///
/// ```rust
/// use meml::{from_str, MemlValue};
///
/// assert_eq!(from_str("// nothing else\nnull").unwrap(), MemlValue::Null);
/// assert!(from_str("{ a: 1 } { b: 2 }").is_err());
/// ```
///
/// # Errors
///
/// Returns an error if the input is not a single well-formed document.
pub fn from_str(s: &str) -> Result<MemlValue> {
    from_reader(s.as_bytes())
}

/// Parses one MEML document from bytes of UTF-8 text.
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8 or not a single
/// well-formed document.
pub fn from_slice(v: &[u8]) -> Result<MemlValue> {
    from_reader(v)
}

/// Parses one MEML document from an I/O stream.
///
/// The stream is consumed character by character; I/O errors are passed
/// through unchanged.
///
/// # Errors
///
/// Returns an error if reading fails or the input is not a single
/// well-formed document.
pub fn from_reader<R: Read>(reader: R) -> Result<MemlValue> {
    let value = ValueBuilder::new(TokenReader::new(reader)).build()?;
    trace!("Parsed MEML document with root kind {}.", value.kind_name());
    Ok(value)
}

/// Parses the MEML file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read, or its content is
/// not a single well-formed document.
pub fn from_path<P: AsRef<Path>>(path: P) -> Result<MemlValue> {
    let path = path.as_ref();
    trace!("Reading MEML document from {}.", path.display());
    let file = File::open(path)?;
    from_reader(BufReader::new(file))
}

/// Deserializes any serde type from a value tree.
///
/// # Examples
///
/// ```rust
/// use serde::Deserialize;
///
/// #[derive(Deserialize, Debug, PartialEq)]
/// struct Glyph { code: u32, advance: f32 }
///
/// let value = meml::from_str("{ code: 65, advance: 7.5 }").unwrap();
/// let glyph: Glyph = meml::from_value(value).unwrap();
/// assert_eq!(glyph, Glyph { code: 65, advance: 7.5 });
/// ```
///
/// # Errors
///
/// Returns an error if the value does not match the shape of `T`.
pub fn from_value<T: DeserializeOwned>(value: MemlValue) -> Result<T> {
    T::deserialize(ValueDeserializer::new(value))
}

/// Parses a document and deserializes it into any serde type.
///
/// # Errors
///
/// Returns an error if parsing fails or the document does not match `T`.
pub fn from_str_as<T: DeserializeOwned>(s: &str) -> Result<T> {
    from_value(from_str(s)?)
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<MemlValue>,
}

impl SeqDeserializer {
    fn new(vec: Vec<MemlValue>) -> Self {
        SeqDeserializer {
            iter: vec.into_iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct MapDeserializer {
    iter: indexmap::map::IntoIter<String, MemlValue>,
    value: Option<MemlValue>,
}

impl MapDeserializer {
    fn new(map: MemlMap) -> Self {
        MapDeserializer {
            iter: map.into_iter(),
            value: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(ValueDeserializer::new(MemlValue::String(key)))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct EnumDeserializer {
    variant: String,
    value: Option<MemlValue>,
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(ValueDeserializer::new(MemlValue::String(self.variant)))?;
        Ok((variant, VariantDeserializer { value: self.value }))
    }
}

struct VariantDeserializer {
    value: Option<MemlValue>,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            Some(MemlValue::Null) | None => Ok(()),
            Some(other) => Err(Error::type_mismatch("unit variant", other.kind_name())),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.value {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::type_mismatch("newtype variant", "string")),
        }
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(MemlValue::Array(arr)) => visitor.visit_seq(SeqDeserializer::new(arr)),
            other => Err(Error::type_mismatch(
                "tuple variant",
                other.as_ref().map_or("string", MemlValue::kind_name),
            )),
        }
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(MemlValue::Object(obj)) => visitor.visit_map(MapDeserializer::new(obj)),
            other => Err(Error::type_mismatch(
                "struct variant",
                other.as_ref().map_or("string", MemlValue::kind_name),
            )),
        }
    }
}

/// Serde deserializer over an owned [`MemlValue`].
pub struct ValueDeserializer {
    value: MemlValue,
}

impl ValueDeserializer {
    pub fn new(value: MemlValue) -> Self {
        ValueDeserializer { value }
    }

    fn widen<T: crate::value::Widen>(&self) -> Result<T> {
        self.value.widen::<T>()
    }
}

macro_rules! deserialize_number {
    ($($method:ident => $ty:ty, $visit:ident;)*) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                visitor.$visit(self.widen::<$ty>()?)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            MemlValue::Null => visitor.visit_unit(),
            MemlValue::Bool(b) => visitor.visit_bool(b),
            MemlValue::Number(n) => match n {
                Number::SByte(v) => visitor.visit_i8(v),
                Number::Byte(v) => visitor.visit_u8(v),
                Number::Short(v) => visitor.visit_i16(v),
                Number::UShort(v) => visitor.visit_u16(v),
                Number::Int(v) => visitor.visit_i32(v),
                Number::UInt(v) => visitor.visit_u32(v),
                Number::Long(v) => visitor.visit_i64(v),
                Number::ULong(v) => visitor.visit_u64(v),
                Number::Float(v) => visitor.visit_f32(v),
                Number::Double(v) => visitor.visit_f64(v),
            },
            MemlValue::String(s) => visitor.visit_string(s),
            MemlValue::Binary(bytes) => visitor.visit_byte_buf(bytes),
            MemlValue::Array(arr) => visitor.visit_seq(SeqDeserializer::new(arr)),
            MemlValue::Object(obj) => visitor.visit_map(MapDeserializer::new(obj)),
        }
    }

    deserialize_number! {
        deserialize_i8 => i8, visit_i8;
        deserialize_i16 => i16, visit_i16;
        deserialize_i32 => i32, visit_i32;
        deserialize_i64 => i64, visit_i64;
        deserialize_u8 => u8, visit_u8;
        deserialize_u16 => u16, visit_u16;
        deserialize_u32 => u32, visit_u32;
        deserialize_u64 => u64, visit_u64;
        deserialize_f32 => f32, visit_f32;
        deserialize_f64 => f64, visit_f64;
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            MemlValue::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            MemlValue::String(s) => visitor.visit_enum(s.into_deserializer()),
            MemlValue::Object(obj) if obj.len() == 1 => {
                let mut entries = obj.into_iter();
                match entries.next() {
                    Some((variant, value)) => visitor.visit_enum(EnumDeserializer {
                        variant,
                        value: Some(value),
                    }),
                    None => Err(Error::type_mismatch("enum", "object")),
                }
            }
            other => Err(Error::type_mismatch("enum", other.kind_name())),
        }
    }

    forward_to_deserialize_any! {
        bool i128 u128 char str string
        bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}
