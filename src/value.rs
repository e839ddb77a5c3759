//! Dynamic value representation for MEML data.
//!
//! This module provides the [`MemlValue`] enum, the format-agnostic tree every
//! document is read into and every object is converted into, and [`Number`],
//! which keeps the exact width of a numeric scalar.
//!
//! ## Numeric widths
//!
//! MEML distinguishes eight integer widths and two floating point widths. The
//! reader only ever produces `Int`, `Long`, `ULong`, `Float` and `Double`
//! (see [`Number::parse_literal`]), while the converter produces whatever
//! width the source field had. Reading a value back into a typed field goes
//! through [`Number::widen`], the single conversion table of the crate:
//!
//! - an integer converts to any integer type whose range holds the value;
//! - an integer converts to `f32`/`f64` when the float represents it exactly;
//! - `Float` converts to `f64`, `Double` converts to `f32` only when exact;
//! - floating point values never convert to integers.
//!
//! ## Examples
//!
//! ```rust
//! use meml::{MemlValue, Number};
//!
//! let value = meml::from_str("{ hp: 42, speed: 1.5 }").unwrap();
//! assert_eq!(value["hp"], MemlValue::Number(Number::Int(42)));
//!
//! let hp: i64 = i64::try_from(&value["hp"]).unwrap();
//! let speed: f64 = f64::try_from(&value["speed"]).unwrap();
//! assert_eq!((hp, speed), (42, 1.5));
//! ```

use crate::{Error, MemlMap};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Index;

/// A dynamically-typed representation of any valid MEML value.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum MemlValue {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Binary(Vec<u8>),
    Array(Vec<MemlValue>),
    Object(MemlMap),
}

/// A numeric scalar that remembers its width.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    SByte(i8),
    Byte(u8),
    Short(i16),
    UShort(u16),
    Int(i32),
    UInt(u32),
    Long(i64),
    ULong(u64),
    Float(f32),
    Double(f64),
}

impl Number {
    /// Returns `true` for the eight integer widths.
    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        !self.is_floating()
    }

    /// Returns `true` for `Float` and `Double`.
    #[inline]
    #[must_use]
    pub const fn is_floating(&self) -> bool {
        matches!(self, Number::Float(_) | Number::Double(_))
    }

    /// The name used for this width in diagnostics.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Number::SByte(_) => "sbyte",
            Number::Byte(_) => "byte",
            Number::Short(_) => "short",
            Number::UShort(_) => "ushort",
            Number::Int(_) => "int",
            Number::UInt(_) => "uint",
            Number::Long(_) => "long",
            Number::ULong(_) => "ulong",
            Number::Float(_) => "float",
            Number::Double(_) => "double",
        }
    }

    /// Returns the value of an integer kind, `None` for floating kinds.
    #[must_use]
    pub fn as_i128(&self) -> Option<i128> {
        match *self {
            Number::SByte(v) => Some(v.into()),
            Number::Byte(v) => Some(v.into()),
            Number::Short(v) => Some(v.into()),
            Number::UShort(v) => Some(v.into()),
            Number::Int(v) => Some(v.into()),
            Number::UInt(v) => Some(v.into()),
            Number::Long(v) => Some(v.into()),
            Number::ULong(v) => Some(v.into()),
            Number::Float(_) | Number::Double(_) => None,
        }
    }

    /// Returns `true` unless this is a NaN or infinite float.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        match *self {
            Number::Float(v) => v.is_finite(),
            Number::Double(v) => v.is_finite(),
            _ => true,
        }
    }

    /// Converts this number into `T` if the conversion loses nothing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use meml::Number;
    ///
    /// assert_eq!(Number::Int(42).widen::<i64>(), Some(42));
    /// assert_eq!(Number::Int(42).widen::<u8>(), Some(42));
    /// assert_eq!(Number::Int(300).widen::<u8>(), None);
    /// assert_eq!(Number::Float(1.5).widen::<f64>(), Some(1.5));
    /// assert_eq!(Number::Double(0.1).widen::<f32>(), None);
    /// assert_eq!(Number::Float(2.0).widen::<i32>(), None);
    /// ```
    #[must_use]
    pub fn widen<T: Widen>(&self) -> Option<T> {
        T::widen_from(self)
    }

    /// Classifies a bare literal the way the reader does.
    ///
    /// Literals containing `.` become `Float` when they are exactly the
    /// canonical text of an `f32`, otherwise `Double`. Other literals try
    /// `Int`, `Long` and `ULong` in that order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use meml::Number;
    ///
    /// assert_eq!(Number::parse_literal("42"), Some(Number::Int(42)));
    /// assert_eq!(Number::parse_literal("5000000000"), Some(Number::Long(5_000_000_000)));
    /// assert_eq!(Number::parse_literal("1.5"), Some(Number::Float(1.5)));
    /// assert_eq!(Number::parse_literal("1.50"), Some(Number::Double(1.5)));
    /// assert_eq!(Number::parse_literal("Bob"), None);
    /// ```
    #[must_use]
    pub fn parse_literal(text: &str) -> Option<Number> {
        if text.contains('.') {
            if let Ok(v) = text.parse::<f32>() {
                if v.is_finite() && float_text(v) == text {
                    return Some(Number::Float(v));
                }
            }
            text.parse::<f64>().ok().map(Number::Double)
        } else {
            text.parse::<i32>()
                .map(Number::Int)
                .or_else(|_| text.parse::<i64>().map(Number::Long))
                .or_else(|_| text.parse::<u64>().map(Number::ULong))
                .ok()
        }
    }
}

/// Canonical text of an `f32`: shortest round-trip digits, always with a `.`.
pub(crate) fn float_text(v: f32) -> String {
    let mut text = v.to_string();
    if v.is_finite() && !text.contains('.') {
        text.push_str(".0");
    }
    text
}

/// Canonical text of an `f64`, padded so it never re-reads as a `Float`.
pub(crate) fn double_text(v: f64) -> String {
    let mut text = v.to_string();
    if v.is_finite() {
        if !text.contains('.') {
            text.push_str(".0");
        }
        if matches!(Number::parse_literal(&text), Some(Number::Float(_))) {
            text.push('0');
        }
    }
    text
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::SByte(v) => write!(f, "{}", v),
            Number::Byte(v) => write!(f, "{}", v),
            Number::Short(v) => write!(f, "{}", v),
            Number::UShort(v) => write!(f, "{}", v),
            Number::Int(v) => write!(f, "{}", v),
            Number::UInt(v) => write!(f, "{}", v),
            Number::Long(v) => write!(f, "{}", v),
            Number::ULong(v) => write!(f, "{}", v),
            Number::Float(v) => f.write_str(&float_text(*v)),
            Number::Double(v) => f.write_str(&double_text(*v)),
        }
    }
}

/// Lossless conversion out of a [`Number`], implemented for every primitive numeric type.
pub trait Widen: Sized {
    /// Type name used in [`Error::TypeMismatch`].
    const NAME: &'static str;

    fn widen_from(number: &Number) -> Option<Self>;
}

macro_rules! impl_widen_integer {
    ($($ty:ty),*) => {
        $(
            impl Widen for $ty {
                const NAME: &'static str = stringify!($ty);

                fn widen_from(number: &Number) -> Option<Self> {
                    number.as_i128().and_then(|v| <$ty>::try_from(v).ok())
                }
            }
        )*
    };
}

impl_widen_integer!(i8, u8, i16, u16, i32, u32, i64, u64, isize, usize);

impl Widen for f32 {
    const NAME: &'static str = "f32";

    fn widen_from(number: &Number) -> Option<Self> {
        match *number {
            Number::Float(v) => Some(v),
            Number::Double(v) => {
                let narrowed = v as f32;
                (v.is_nan() || f64::from(narrowed) == v).then_some(narrowed)
            }
            _ => {
                let v = number.as_i128()?;
                let converted = v as f32;
                (converted as i128 == v).then_some(converted)
            }
        }
    }
}

impl Widen for f64 {
    const NAME: &'static str = "f64";

    fn widen_from(number: &Number) -> Option<Self> {
        match *number {
            Number::Float(v) => Some(v.into()),
            Number::Double(v) => Some(v),
            _ => {
                let v = number.as_i128()?;
                let converted = v as f64;
                (converted as i128 == v).then_some(converted)
            }
        }
    }
}

impl MemlValue {
    /// Returns `true` if the value is null.
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, MemlValue::Null)
    }

    /// Returns `true` if the value is a boolean.
    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, MemlValue::Bool(_))
    }

    /// Returns `true` if the value is a number of any width.
    #[inline]
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, MemlValue::Number(_))
    }

    /// Returns `true` if the value is a string.
    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, MemlValue::String(_))
    }

    /// Returns `true` if the value is a binary blob.
    #[inline]
    #[must_use]
    pub const fn is_binary(&self) -> bool {
        matches!(self, MemlValue::Binary(_))
    }

    /// Returns `true` if the value is an array.
    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, MemlValue::Array(_))
    }

    /// Returns `true` if the value is an object.
    #[inline]
    #[must_use]
    pub const fn is_object(&self) -> bool {
        matches!(self, MemlValue::Object(_))
    }

    /// The kind of this value as used in diagnostics (`"int"`, `"string"`, ...).
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            MemlValue::Null => "null",
            MemlValue::Bool(_) => "bool",
            MemlValue::Number(n) => n.kind_name(),
            MemlValue::String(_) => "string",
            MemlValue::Binary(_) => "binary",
            MemlValue::Array(_) => "array",
            MemlValue::Object(_) => "object",
        }
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MemlValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            MemlValue::Number(n) => Some(n),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MemlValue::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            MemlValue::Binary(bytes) => Some(bytes),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&Vec<MemlValue>> {
        match self {
            MemlValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&MemlMap> {
        match self {
            MemlValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Looks up a member of an object. Returns `None` for other kinds.
    ///
    /// # Examples
    ///
    /// ```rust
    /// let value = meml::from_str(r#"{ name: "Bob" }"#).unwrap();
    /// assert_eq!(value.get("name").and_then(|v| v.as_str()), Some("Bob"));
    /// assert!(value.get("age").is_none());
    /// ```
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&MemlValue> {
        self.as_object().and_then(|obj| obj.get(key))
    }

    /// Looks up an element of an array. Returns `None` for other kinds.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&MemlValue> {
        self.as_array().and_then(|arr| arr.get(index))
    }

    /// Coerces this value into a primitive number through [`Number::widen`].
    ///
    /// # Errors
    ///
    /// [`Error::RequiredValueMissing`] for `Null`, [`Error::TypeMismatch`] for
    /// any other kind or a conversion that would lose information.
    pub fn widen<T: Widen>(&self) -> crate::Result<T> {
        match self {
            MemlValue::Number(n) => n
                .widen::<T>()
                .ok_or_else(|| Error::type_mismatch(T::NAME, n.kind_name())),
            MemlValue::Null => Err(Error::required_value_missing(T::NAME)),
            other => Err(Error::type_mismatch(T::NAME, other.kind_name())),
        }
    }
}

static NULL: MemlValue = MemlValue::Null;

impl Index<&str> for MemlValue {
    type Output = MemlValue;

    /// Missing keys and non-object values index to `Null`.
    fn index(&self, key: &str) -> &MemlValue {
        self.get(key).unwrap_or(&NULL)
    }
}

impl Index<usize> for MemlValue {
    type Output = MemlValue;

    /// Out-of-range indices and non-array values index to `Null`.
    fn index(&self, index: usize) -> &MemlValue {
        self.get_index(index).unwrap_or(&NULL)
    }
}

/// Compact MEML text. Unlike [`to_string`](crate::to_string) this never
/// fails: NaN and infinities print as `NaN` and `inf`, and `bin::` text is
/// printed as is, even though neither reads back.
impl fmt::Display for MemlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut writer = crate::ser::Writer::diagnostic(Vec::new());
        writer.write_value(self).map_err(|_| fmt::Error)?;
        f.write_str(&String::from_utf8_lossy(&writer.into_inner()))
    }
}

impl Serialize for MemlValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            MemlValue::Null => serializer.serialize_unit(),
            MemlValue::Bool(b) => serializer.serialize_bool(*b),
            MemlValue::Number(n) => match *n {
                Number::SByte(v) => serializer.serialize_i8(v),
                Number::Byte(v) => serializer.serialize_u8(v),
                Number::Short(v) => serializer.serialize_i16(v),
                Number::UShort(v) => serializer.serialize_u16(v),
                Number::Int(v) => serializer.serialize_i32(v),
                Number::UInt(v) => serializer.serialize_u32(v),
                Number::Long(v) => serializer.serialize_i64(v),
                Number::ULong(v) => serializer.serialize_u64(v),
                Number::Float(v) => serializer.serialize_f32(v),
                Number::Double(v) => serializer.serialize_f64(v),
            },
            MemlValue::String(s) => serializer.serialize_str(s),
            MemlValue::Binary(bytes) => serializer.serialize_bytes(bytes),
            MemlValue::Array(arr) => {
                use serde::ser::SerializeSeq;
                let mut seq = serializer.serialize_seq(Some(arr.len()))?;
                for element in arr {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
            MemlValue::Object(obj) => {
                use serde::ser::SerializeMap;
                let mut map = serializer.serialize_map(Some(obj.len()))?;
                for (k, v) in obj.iter() {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for MemlValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct MemlValueVisitor;

        impl<'de> Visitor<'de> for MemlValueVisitor {
            type Value = MemlValue;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any valid MEML value")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E> {
                Ok(MemlValue::Bool(value))
            }

            fn visit_i8<E>(self, value: i8) -> Result<Self::Value, E> {
                Ok(MemlValue::Number(Number::SByte(value)))
            }

            fn visit_u8<E>(self, value: u8) -> Result<Self::Value, E> {
                Ok(MemlValue::Number(Number::Byte(value)))
            }

            fn visit_i16<E>(self, value: i16) -> Result<Self::Value, E> {
                Ok(MemlValue::Number(Number::Short(value)))
            }

            fn visit_u16<E>(self, value: u16) -> Result<Self::Value, E> {
                Ok(MemlValue::Number(Number::UShort(value)))
            }

            fn visit_i32<E>(self, value: i32) -> Result<Self::Value, E> {
                Ok(MemlValue::Number(Number::Int(value)))
            }

            fn visit_u32<E>(self, value: u32) -> Result<Self::Value, E> {
                Ok(MemlValue::Number(Number::UInt(value)))
            }

            // Self-describing formats such as JSON only report i64/u64, so
            // those are narrowed the same way the MEML reader types literals.
            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E> {
                Ok(MemlValue::Number(match i32::try_from(value) {
                    Ok(v) => Number::Int(v),
                    Err(_) => Number::Long(value),
                }))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E> {
                Ok(MemlValue::Number(
                    match (i32::try_from(value), i64::try_from(value)) {
                        (Ok(v), _) => Number::Int(v),
                        (Err(_), Ok(v)) => Number::Long(v),
                        _ => Number::ULong(value),
                    },
                ))
            }

            fn visit_f32<E>(self, value: f32) -> Result<Self::Value, E> {
                Ok(MemlValue::Number(Number::Float(value)))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E> {
                Ok(MemlValue::Number(Number::Double(value)))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E> {
                Ok(MemlValue::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E> {
                Ok(MemlValue::String(value))
            }

            fn visit_bytes<E>(self, value: &[u8]) -> Result<Self::Value, E> {
                Ok(MemlValue::Binary(value.to_vec()))
            }

            fn visit_byte_buf<E>(self, value: Vec<u8>) -> Result<Self::Value, E> {
                Ok(MemlValue::Binary(value))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(MemlValue::Null)
            }

            fn visit_none<E>(self) -> Result<Self::Value, E> {
                Ok(MemlValue::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut vec = Vec::new();
                while let Some(elem) = seq.next_element()? {
                    vec.push(elem);
                }
                Ok(MemlValue::Array(vec))
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut values = MemlMap::new();
                while let Some((key, value)) = map.next_entry()? {
                    values.insert(key, value);
                }
                Ok(MemlValue::Object(values))
            }
        }

        deserializer.deserialize_any(MemlValueVisitor)
    }
}

macro_rules! impl_try_from_number {
    ($($ty:ty),*) => {
        $(
            impl TryFrom<&MemlValue> for $ty {
                type Error = Error;

                fn try_from(value: &MemlValue) -> crate::Result<Self> {
                    value.widen::<$ty>()
                }
            }

            impl TryFrom<MemlValue> for $ty {
                type Error = Error;

                fn try_from(value: MemlValue) -> crate::Result<Self> {
                    value.widen::<$ty>()
                }
            }
        )*
    };
}

impl_try_from_number!(i8, u8, i16, u16, i32, u32, i64, u64, isize, usize, f32, f64);

impl TryFrom<&MemlValue> for bool {
    type Error = Error;

    fn try_from(value: &MemlValue) -> crate::Result<Self> {
        match value {
            MemlValue::Bool(b) => Ok(*b),
            MemlValue::Null => Err(Error::required_value_missing("bool")),
            other => Err(Error::type_mismatch("bool", other.kind_name())),
        }
    }
}

impl TryFrom<MemlValue> for bool {
    type Error = Error;

    fn try_from(value: MemlValue) -> crate::Result<Self> {
        bool::try_from(&value)
    }
}

impl TryFrom<&MemlValue> for String {
    type Error = Error;

    fn try_from(value: &MemlValue) -> crate::Result<Self> {
        match value {
            MemlValue::String(s) => Ok(s.clone()),
            MemlValue::Null => Err(Error::required_value_missing("string")),
            other => Err(Error::type_mismatch("string", other.kind_name())),
        }
    }
}

impl TryFrom<MemlValue> for String {
    type Error = Error;

    fn try_from(value: MemlValue) -> crate::Result<Self> {
        match value {
            MemlValue::String(s) => Ok(s),
            other => String::try_from(&other),
        }
    }
}

impl TryFrom<&MemlValue> for Vec<u8> {
    type Error = Error;

    fn try_from(value: &MemlValue) -> crate::Result<Self> {
        match value {
            MemlValue::Binary(bytes) => Ok(bytes.clone()),
            MemlValue::Null => Err(Error::required_value_missing("binary")),
            other => Err(Error::type_mismatch("binary", other.kind_name())),
        }
    }
}

impl TryFrom<MemlValue> for Vec<u8> {
    type Error = Error;

    fn try_from(value: MemlValue) -> crate::Result<Self> {
        match value {
            MemlValue::Binary(bytes) => Ok(bytes),
            other => Vec::<u8>::try_from(&other),
        }
    }
}

macro_rules! impl_from_number {
    ($($ty:ty => $variant:ident),*) => {
        $(
            impl From<$ty> for Number {
                fn from(value: $ty) -> Self {
                    Number::$variant(value)
                }
            }

            impl From<$ty> for MemlValue {
                fn from(value: $ty) -> Self {
                    MemlValue::Number(Number::$variant(value))
                }
            }
        )*
    };
}

impl_from_number!(
    i8 => SByte,
    u8 => Byte,
    i16 => Short,
    u16 => UShort,
    i32 => Int,
    u32 => UInt,
    i64 => Long,
    u64 => ULong,
    f32 => Float,
    f64 => Double
);

impl From<Number> for MemlValue {
    fn from(value: Number) -> Self {
        MemlValue::Number(value)
    }
}

impl From<bool> for MemlValue {
    fn from(value: bool) -> Self {
        MemlValue::Bool(value)
    }
}

impl From<String> for MemlValue {
    fn from(value: String) -> Self {
        MemlValue::String(value)
    }
}

impl From<&str> for MemlValue {
    fn from(value: &str) -> Self {
        MemlValue::String(value.to_string())
    }
}

impl From<Vec<u8>> for MemlValue {
    fn from(value: Vec<u8>) -> Self {
        MemlValue::Binary(value)
    }
}

impl From<Vec<MemlValue>> for MemlValue {
    fn from(value: Vec<MemlValue>) -> Self {
        MemlValue::Array(value)
    }
}

impl From<MemlMap> for MemlValue {
    fn from(value: MemlMap) -> Self {
        MemlValue::Object(value)
    }
}

impl<T: Into<MemlValue>> From<Option<T>> for MemlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(MemlValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_widening() {
        let int = MemlValue::from(42i32);
        assert_eq!(i64::try_from(&int).unwrap(), 42);
        assert_eq!(u8::try_from(&int).unwrap(), 42);
        assert_eq!(f32::try_from(&int).unwrap(), 42.0);
        assert_eq!(f64::try_from(&int).unwrap(), 42.0);

        let negative = MemlValue::from(-1i32);
        assert!(matches!(
            u32::try_from(&negative),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_integer_into_float_requires_exact_value() {
        let big = MemlValue::from(16_777_217i32);
        assert!(f32::try_from(&big).is_err());
        assert_eq!(f64::try_from(&big).unwrap(), 16_777_217.0);

        let huge = MemlValue::from(u64::MAX);
        assert!(f64::try_from(&huge).is_err());
    }

    #[test]
    fn test_float_never_narrows_to_integer() {
        let value = MemlValue::from(2.0f32);
        match i32::try_from(&value) {
            Err(Error::TypeMismatch {
                expected, found, ..
            }) => {
                assert_eq!(expected, "i32");
                assert_eq!(found, "float");
            }
            other => panic!("Expected type mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_double_to_float_only_when_exact() {
        assert_eq!(f32::try_from(MemlValue::from(1.5f64)).unwrap(), 1.5);
        assert!(f32::try_from(MemlValue::from(0.1f64)).is_err());
    }

    #[test]
    fn test_null_is_required_value_missing() {
        assert!(matches!(
            i32::try_from(&MemlValue::Null),
            Err(Error::RequiredValueMissing { .. })
        ));
        assert!(matches!(
            String::try_from(MemlValue::Null),
            Err(Error::RequiredValueMissing { .. })
        ));
    }

    #[test]
    fn test_literal_classification() {
        assert_eq!(Number::parse_literal("-7"), Some(Number::Int(-7)));
        assert_eq!(
            Number::parse_literal("2147483648"),
            Some(Number::Long(2_147_483_648))
        );
        assert_eq!(
            Number::parse_literal("18446744073709551615"),
            Some(Number::ULong(u64::MAX))
        );
        assert_eq!(Number::parse_literal("18446744073709551616"), None);
        assert_eq!(Number::parse_literal("0.1"), Some(Number::Float(0.1)));
        assert_eq!(Number::parse_literal("0.10"), Some(Number::Double(0.1)));
        assert_eq!(
            Number::parse_literal("0.30000000000000004"),
            Some(Number::Double(0.1 + 0.2))
        );
        assert_eq!(Number::parse_literal("1.2.3"), None);
    }

    #[test]
    fn test_float_precision_boundary() {
        // 16777216 is the last integer every f32 below it represents exactly.
        assert_eq!(
            Number::parse_literal("16777216.0"),
            Some(Number::Float(16_777_216.0))
        );
        assert_eq!(
            Number::parse_literal("16777217.0"),
            Some(Number::Double(16_777_217.0))
        );
        assert_eq!(
            Number::parse_literal("340282350000000000000000000000000000000.0"),
            Some(Number::Float(f32::MAX))
        );
        assert!(matches!(
            Number::parse_literal("340282360000000000000000000000000000000.0"),
            Some(Number::Double(_))
        ));
    }

    #[test]
    fn test_number_text_is_canonical() {
        assert_eq!(Number::Float(1.0).to_string(), "1.0");
        assert_eq!(Number::Float(-0.0).to_string(), "-0.0");
        assert_eq!(Number::Double(2.5).to_string(), "2.50");
        assert_eq!(Number::Double(0.1 + 0.2).to_string(), "0.30000000000000004");
        assert_eq!(Number::ULong(u64::MAX).to_string(), "18446744073709551615");
    }

    #[test]
    fn test_index_missing_is_null() {
        let mut map = MemlMap::new();
        map.insert("a".to_string(), MemlValue::from(vec![MemlValue::from(1i32)]));
        let value = MemlValue::Object(map);

        assert_eq!(value["a"][0], MemlValue::from(1i32));
        assert!(value["a"][5].is_null());
        assert!(value["missing"]["deeper"].is_null());
    }

    #[test]
    fn test_from_option() {
        assert_eq!(MemlValue::from(None::<i32>), MemlValue::Null);
        assert_eq!(MemlValue::from(Some("x")), MemlValue::from("x"));
    }

    #[test]
    fn test_display_never_fails() {
        let value = MemlValue::Array(vec![
            MemlValue::from(f64::NAN),
            MemlValue::from(f32::NEG_INFINITY),
            MemlValue::from("bin::x"),
        ]);
        assert_eq!(value.to_string(), r#"[NaN,-inf,"bin::x"]"#);
        assert_eq!(MemlValue::from(f64::INFINITY).to_string(), "inf");

        let mut deep = MemlValue::Null;
        for _ in 0..200 {
            deep = MemlValue::Array(vec![deep]);
        }
        assert!(deep.to_string().starts_with("[[[["));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(MemlValue::from(1u16).kind_name(), "ushort");
        assert_eq!(MemlValue::Binary(vec![]).kind_name(), "binary");
        assert_eq!(MemlValue::Object(MemlMap::new()).kind_name(), "object");
    }
}
