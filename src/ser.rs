//! MEML serialization.
//!
//! This module provides the [`Writer`], a push-style emitter whose calls
//! mirror the tokens of the reader, and the entry points that write a whole
//! [`MemlValue`] tree with it.
//!
//! ## Usage
//!
//! ```rust
//! use meml::{meml, to_string, to_string_pretty};
//!
//! let value = meml!({ "a": 1, "b": [1, 2] });
//!
//! assert_eq!(to_string(&value).unwrap(), r#"{"a":1,"b":[1,2]}"#);
//! assert_eq!(
//!     to_string_pretty(&value).unwrap(),
//!     "{\n  \"a\": 1,\n  \"b\": [\n    1,\n    2\n  ]\n}"
//! );
//! ```
//!
//! ## Direct Writer Usage
//!
//! Documents can be streamed without building a tree first:
//!
//! ```rust
//! use meml::{Number, Writer, WriterOptions};
//!
//! let mut writer = Writer::new(Vec::new(), WriterOptions::new());
//! writer.object_begin().unwrap();
//! writer.key("frames").unwrap();
//! writer.array_begin().unwrap();
//! writer.number(Number::Byte(3)).unwrap();
//! writer.null().unwrap();
//! writer.array_end().unwrap();
//! writer.object_end().unwrap();
//!
//! let text = String::from_utf8(writer.into_inner()).unwrap();
//! assert_eq!(text, r#"{"frames":[3,null]}"#);
//! ```
//!
//! ## Serde types
//!
//! [`to_value`] turns any `Serialize` type into a [`MemlValue`], which can then
//! be written like any other tree.

use crate::de::MAX_DEPTH;
use crate::token::BINARY_PREFIX;
use crate::{Error, MemlMap, MemlValue, Number, Result, WriterOptions};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{ser, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::trace;

/// What the writer emitted last, which decides the separator before the next item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Emitted {
    Nothing,
    Open,
    Key,
    Value,
}

/// Streaming MEML writer.
///
/// Keys are always quoted. Object members must alternate between
/// [`key`](Self::key) and one value; unbalanced calls trip a debug
/// assertion.
///
/// The writer only emits documents its reader accepts: non-finite numbers,
/// text strings starting with `bin::` and containers nested deeper than
/// [`MAX_DEPTH`] are errors.
pub struct Writer<W: Write> {
    out: W,
    options: WriterOptions,
    // `true` for objects, `false` for arrays
    open: Vec<bool>,
    last: Emitted,
    // lifts the readability checks, for `Display`
    diagnostic: bool,
}

impl<W: Write> Writer<W> {
    pub fn new(out: W, options: WriterOptions) -> Self {
        Writer {
            out,
            options,
            open: Vec::new(),
            last: Emitted::Nothing,
            diagnostic: false,
        }
    }

    /// A compact writer that never fails on content, printing `NaN`,
    /// `inf`, `bin::` text and any depth as they are.
    pub(crate) fn diagnostic(out: W) -> Self {
        Writer {
            diagnostic: true,
            ..Writer::new(out, WriterOptions::default())
        }
    }

    /// Returns the underlying sink. The document should be complete.
    pub fn into_inner(self) -> W {
        debug_assert!(self.open.is_empty(), "unclosed containers at end of document");
        self.out
    }

    fn in_object(&self) -> bool {
        self.open.last().copied().unwrap_or(false)
    }

    fn write_indent(&mut self) -> Result<()> {
        if self.options.pretty {
            let width = self.open.len() * self.options.indent;
            write!(self.out, "\n{:width$}", "", width = width)?;
        }
        Ok(())
    }

    fn before_item(&mut self) -> Result<()> {
        match self.last {
            Emitted::Nothing | Emitted::Key => {}
            Emitted::Open => self.write_indent()?,
            Emitted::Value => {
                debug_assert!(!self.open.is_empty(), "second value at document root");
                self.out.write_all(b",")?;
                self.write_indent()?;
            }
        }
        Ok(())
    }

    fn before_value(&mut self) -> Result<()> {
        debug_assert!(
            !self.in_object() || self.last == Emitted::Key,
            "object member written without a key"
        );
        self.before_item()
    }

    fn write_quoted(&mut self, s: &str) -> Result<()> {
        let mut escaped = String::with_capacity(s.len() + 2);
        escaped.push('"');
        for ch in s.chars() {
            match ch {
                '"' => escaped.push_str("\\\""),
                '\\' => escaped.push_str("\\\\"),
                '\n' => escaped.push_str("\\n"),
                '\r' => escaped.push_str("\\r"),
                '\t' => escaped.push_str("\\t"),
                '\u{000B}' => escaped.push_str("\\v"),
                _ => escaped.push(ch),
            }
        }
        escaped.push('"');
        self.out.write_all(escaped.as_bytes())?;
        Ok(())
    }

    fn check_depth(&self) -> Result<()> {
        if !self.diagnostic && self.open.len() >= MAX_DEPTH {
            return Err(Error::NestingTooDeep(MAX_DEPTH));
        }
        Ok(())
    }

    /// # Errors
    ///
    /// [`Error::NestingTooDeep`] when [`MAX_DEPTH`] containers are already open.
    pub fn object_begin(&mut self) -> Result<()> {
        self.check_depth()?;
        self.before_value()?;
        self.out.write_all(b"{")?;
        self.open.push(true);
        self.last = Emitted::Open;
        Ok(())
    }

    pub fn object_end(&mut self) -> Result<()> {
        debug_assert!(self.in_object(), "object_end without matching object_begin");
        debug_assert!(self.last != Emitted::Key, "object closed after a key");
        self.close(b"}")
    }

    pub fn array_begin(&mut self) -> Result<()> {
        self.check_depth()?;
        self.before_value()?;
        self.out.write_all(b"[")?;
        self.open.push(false);
        self.last = Emitted::Open;
        Ok(())
    }

    pub fn array_end(&mut self) -> Result<()> {
        debug_assert!(
            self.open.last() == Some(&false),
            "array_end without matching array_begin"
        );
        self.close(b"]")
    }

    fn close(&mut self, closer: &[u8]) -> Result<()> {
        self.open.pop();
        if self.last == Emitted::Value {
            self.write_indent()?;
        }
        self.out.write_all(closer)?;
        self.last = Emitted::Value;
        Ok(())
    }

    pub fn key(&mut self, key: &str) -> Result<()> {
        debug_assert!(self.in_object(), "key written outside an object");
        debug_assert!(self.last != Emitted::Key, "two keys in a row");
        self.before_item()?;
        self.write_quoted(key)?;
        let separator: &[u8] = if self.options.pretty { b": " } else { b":" };
        self.out.write_all(separator)?;
        self.last = Emitted::Key;
        Ok(())
    }

    pub fn null(&mut self) -> Result<()> {
        self.before_value()?;
        self.out.write_all(b"null")?;
        self.last = Emitted::Value;
        Ok(())
    }

    pub fn boolean(&mut self, value: bool) -> Result<()> {
        self.before_value()?;
        self.out
            .write_all(if value { b"true" as &[u8] } else { b"false" })?;
        self.last = Emitted::Value;
        Ok(())
    }

    /// Writes a number in its canonical text.
    ///
    /// # Errors
    ///
    /// [`Error::NonFiniteNumber`] for NaN and infinities.
    pub fn number(&mut self, value: Number) -> Result<()> {
        match value {
            _ if self.diagnostic => {}
            Number::Float(v) if !v.is_finite() => return Err(Error::NonFiniteNumber(v.into())),
            Number::Double(v) if !v.is_finite() => return Err(Error::NonFiniteNumber(v)),
            _ => {}
        }
        self.before_value()?;
        write!(self.out, "{}", value)?;
        self.last = Emitted::Value;
        Ok(())
    }

    /// Writes a quoted text string.
    ///
    /// # Errors
    ///
    /// [`Error::BinaryPrefixedString`] if `value` starts with `bin::`, since
    /// readers turn such literals into binary values.
    pub fn string(&mut self, value: &str) -> Result<()> {
        if !self.diagnostic && value.starts_with(BINARY_PREFIX) {
            return Err(Error::BinaryPrefixedString(value.to_string()));
        }
        self.before_value()?;
        self.write_quoted(value)?;
        self.last = Emitted::Value;
        Ok(())
    }

    /// Writes bytes as a `"bin::<base64>"` literal.
    pub fn binary(&mut self, value: &[u8]) -> Result<()> {
        self.before_value()?;
        self.out.write_all(b"\"")?;
        self.out.write_all(BINARY_PREFIX.as_bytes())?;
        self.out.write_all(STANDARD.encode(value).as_bytes())?;
        self.out.write_all(b"\"")?;
        self.last = Emitted::Value;
        Ok(())
    }

    /// Writes a whole value tree.
    pub fn write_value(&mut self, value: &MemlValue) -> Result<()> {
        match value {
            MemlValue::Null => self.null(),
            MemlValue::Bool(b) => self.boolean(*b),
            MemlValue::Number(n) => self.number(*n),
            MemlValue::String(s) => self.string(s),
            MemlValue::Binary(bytes) => self.binary(bytes),
            MemlValue::Array(arr) => {
                self.array_begin()?;
                for element in arr {
                    self.write_value(element)?;
                }
                self.array_end()
            }
            MemlValue::Object(obj) => {
                self.object_begin()?;
                for (key, member) in obj {
                    self.key(key)?;
                    self.write_value(member)?;
                }
                self.object_end()
            }
        }
    }
}

/// Writes a value as compact MEML text.
///
/// # Errors
///
/// [`Error::NonFiniteNumber`], [`Error::BinaryPrefixedString`] or
/// [`Error::NestingTooDeep`] for trees the reader could not read back.
pub fn to_string(value: &MemlValue) -> Result<String> {
    to_string_with_options(value, WriterOptions::default())
}

/// Writes a value with one member or element per line.
///
/// # Errors
///
/// [`Error::NonFiniteNumber`], [`Error::BinaryPrefixedString`] or
/// [`Error::NestingTooDeep`] for trees the reader could not read back.
pub fn to_string_pretty(value: &MemlValue) -> Result<String> {
    to_string_with_options(value, WriterOptions::pretty())
}

/// Writes a value with custom layout options.
///
/// # Errors
///
/// [`Error::NonFiniteNumber`], [`Error::BinaryPrefixedString`] or
/// [`Error::NestingTooDeep`] for trees the reader could not read back.
pub fn to_string_with_options(value: &MemlValue, options: WriterOptions) -> Result<String> {
    let bytes = to_writer_with_options(Vec::with_capacity(256), value, options)?;
    String::from_utf8(bytes).map_err(Error::custom)
}

/// Writes compact MEML text into `writer` and returns it.
///
/// # Errors
///
/// Any I/O error from `writer`, or a tree the [`Writer`] refuses.
pub fn to_writer<W: Write>(writer: W, value: &MemlValue) -> Result<W> {
    to_writer_with_options(writer, value, WriterOptions::default())
}

/// Writes MEML text into `writer` with custom layout options and returns it.
///
/// # Errors
///
/// Any I/O error from `writer`, or a tree the [`Writer`] refuses.
pub fn to_writer_with_options<W: Write>(
    writer: W,
    value: &MemlValue,
    options: WriterOptions,
) -> Result<W> {
    let mut writer = Writer::new(writer, options);
    writer.write_value(value)?;
    trace!("Wrote MEML document with root kind {}.", value.kind_name());
    Ok(writer.into_inner())
}

/// Writes a value to the file at `path`, replacing any existing content.
///
/// The write is not atomic: a failure part way leaves a truncated file.
///
/// # Errors
///
/// Any I/O error, or a tree the [`Writer`] refuses.
pub fn to_path<P: AsRef<Path>>(path: P, value: &MemlValue, options: WriterOptions) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut out = to_writer_with_options(BufWriter::new(file), value, options)?;
    out.flush()?;
    trace!("Saved MEML document to {}.", path.display());
    Ok(())
}

/// Converts any serde type into a [`MemlValue`].
///
/// Integer and float widths are kept. Enum variants with data become
/// single-key objects and byte buffers become binary values.
///
/// # Examples
///
/// ```rust
/// use meml::{to_value, MemlValue, Number};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Tile { id: u16, solid: bool }
///
/// let value = to_value(&Tile { id: 7, solid: true }).unwrap();
/// assert_eq!(value["id"], MemlValue::Number(Number::UShort(7)));
/// assert_eq!(value.to_string(), r#"{"id":7,"solid":true}"#);
/// ```
///
/// # Errors
///
/// Returns an error for map keys that are not strings, or any custom error
/// raised by the type's `Serialize` implementation.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<MemlValue> {
    value.serialize(ValueSerializer)
}

/// Serde serializer producing a [`MemlValue`] tree.
pub struct ValueSerializer;

pub struct SerializeVec {
    variant: Option<&'static str>,
    vec: Vec<MemlValue>,
}

pub struct SerializeMap {
    variant: Option<&'static str>,
    map: MemlMap,
    current_key: Option<String>,
}

/// Wraps the payload of an enum variant as `{ "Variant": payload }`.
fn variant_object(variant: &'static str, payload: MemlValue) -> MemlValue {
    let mut map = MemlMap::with_capacity(1);
    map.insert(variant.to_string(), payload);
    MemlValue::Object(map)
}

impl ser::Serializer for ValueSerializer {
    type Ok = MemlValue;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeVec;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeMap;

    fn serialize_bool(self, v: bool) -> Result<MemlValue> {
        Ok(MemlValue::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<MemlValue> {
        Ok(MemlValue::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<MemlValue> {
        Ok(MemlValue::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<MemlValue> {
        Ok(MemlValue::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<MemlValue> {
        Ok(MemlValue::from(v))
    }

    fn serialize_u8(self, v: u8) -> Result<MemlValue> {
        Ok(MemlValue::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<MemlValue> {
        Ok(MemlValue::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<MemlValue> {
        Ok(MemlValue::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<MemlValue> {
        Ok(MemlValue::from(v))
    }

    fn serialize_f32(self, v: f32) -> Result<MemlValue> {
        Ok(MemlValue::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<MemlValue> {
        Ok(MemlValue::from(v))
    }

    fn serialize_char(self, v: char) -> Result<MemlValue> {
        Ok(MemlValue::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<MemlValue> {
        Ok(MemlValue::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<MemlValue> {
        Ok(MemlValue::Binary(v.to_vec()))
    }

    fn serialize_none(self) -> Result<MemlValue> {
        Ok(MemlValue::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<MemlValue>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<MemlValue> {
        Ok(MemlValue::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<MemlValue> {
        Ok(MemlValue::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<MemlValue> {
        Ok(MemlValue::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<MemlValue>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<MemlValue>
    where
        T: ?Sized + Serialize,
    {
        Ok(variant_object(variant, to_value(value)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec::new(None, len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(None, len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(None, len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeVec> {
        Ok(SerializeVec::new(Some(variant), len))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap::new(None, len.unwrap_or(0)))
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<SerializeMap> {
        Ok(SerializeMap::new(None, len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeMap> {
        Ok(SerializeMap::new(Some(variant), len))
    }
}

impl SerializeVec {
    fn new(variant: Option<&'static str>, capacity: usize) -> Self {
        SerializeVec {
            variant,
            vec: Vec::with_capacity(capacity),
        }
    }

    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.vec.push(to_value(value)?);
        Ok(())
    }

    fn finish(self) -> MemlValue {
        let array = MemlValue::Array(self.vec);
        match self.variant {
            Some(variant) => variant_object(variant, array),
            None => array,
        }
    }
}

impl SerializeMap {
    fn new(variant: Option<&'static str>, capacity: usize) -> Self {
        SerializeMap {
            variant,
            map: MemlMap::with_capacity(capacity),
            current_key: None,
        }
    }

    fn finish(self) -> MemlValue {
        let object = MemlValue::Object(self.map);
        match self.variant {
            Some(variant) => variant_object(variant, object),
            None => object,
        }
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = MemlValue;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<MemlValue> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = MemlValue;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<MemlValue> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = MemlValue;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<MemlValue> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SerializeVec {
    type Ok = MemlValue;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<MemlValue> {
        Ok(self.finish())
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = MemlValue;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        match to_value(key)? {
            MemlValue::String(s) => {
                self.current_key = Some(s);
                Ok(())
            }
            other => Err(Error::type_mismatch("string key", other.kind_name())),
        }
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.map.insert(key, to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<MemlValue> {
        Ok(self.finish())
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = MemlValue;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.insert(key.to_string(), to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<MemlValue> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for SerializeMap {
    type Ok = MemlValue;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.insert(key.to_string(), to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<MemlValue> {
        Ok(self.finish())
    }
}
