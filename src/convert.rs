//! Conversion between typed objects and [`MemlValue`] trees.
//!
//! The [`StructureConverter`] maps objects to value trees and back. Every
//! convertible type implements [`Convert`]:
//!
//! - scalars, strings, [`Binary`], sequences, string-keyed maps and
//!   `Option<T>` convert directly;
//! - composite types only provide a [`TypeDescriptor`] and are converted
//!   member by member, restricted to the members the converter's
//!   [`MemberFinder`] selects.
//!
//! A custom converter registered for a type replaces both paths for that
//! exact type.
//!
//! ## Examples
//!
//! ```rust
//! use meml::{Convert, Member, MemlValue, StructureConverter, TypeDescriptor};
//!
//! #[derive(Default, Debug, PartialEq)]
//! struct Person {
//!     name: String,
//!     age: i32,
//! }
//!
//! impl Convert for Person {
//!     fn descriptor() -> TypeDescriptor<Self> {
//!         TypeDescriptor::defaulted("Person")
//!             .member(Member::field("name", |p: &Person| &p.name, |p| &mut p.name))
//!             .member(Member::field("age", |p: &Person| &p.age, |p| &mut p.age))
//!     }
//! }
//!
//! let converter = StructureConverter::new();
//! let value = meml::from_str(r#"{ name: "Bob", age: 42 }"#).unwrap();
//! let person: Person = converter.from_structure(&value).unwrap();
//! assert_eq!(person, Person { name: "Bob".to_string(), age: 42 });
//!
//! assert_eq!(converter.to_structure(&person).to_string(), r#"{"name":"Bob","age":42}"#);
//! ```

use crate::member::{MemberFinder, TypeDescriptor};
use crate::{ConverterOptions, Error, MemlMap, MemlValue, Result};
use indexmap::IndexMap;
use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io::Read;
use std::path::Path;
use tracing::{debug, trace};

/// A type the [`StructureConverter`] can encode and decode.
///
/// Composite types implement only [`descriptor`](Convert::descriptor); the
/// default conversion methods walk its members. Leaf types override the
/// conversion methods instead.
pub trait Convert: Sized + 'static {
    /// The member table of this type.
    ///
    /// The default has no members and no constructor.
    fn descriptor() -> TypeDescriptor<Self> {
        TypeDescriptor::new(std::any::type_name::<Self>())
    }

    fn to_structure(&self, converter: &StructureConverter) -> MemlValue {
        converter.encode_members(self)
    }

    /// # Errors
    ///
    /// Any conversion error of this value or one of its members.
    fn from_structure(value: &MemlValue, converter: &StructureConverter) -> Result<Self> {
        converter.decode_members(value)
    }
}

type EncodeFn<T> = Box<dyn Fn(&T) -> MemlValue + Send + Sync>;
type DecodeFn<T> = Box<dyn Fn(&MemlValue) -> Result<T> + Send + Sync>;

struct CustomConverter<T> {
    encode: EncodeFn<T>,
    decode: DecodeFn<T>,
}

/// Converts objects to value trees and back.
///
/// Configure a converter once (member finder, custom converters), then
/// share it by reference; conversion only needs `&self`.
pub struct StructureConverter {
    finder: MemberFinder,
    registry: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    options: ConverterOptions,
}

impl Default for StructureConverter {
    fn default() -> Self {
        StructureConverter::new()
    }
}

impl fmt::Debug for StructureConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructureConverter")
            .field("finder", &self.finder)
            .field("registered", &self.registry.len())
            .field("options", &self.options)
            .finish()
    }
}

impl StructureConverter {
    /// A lenient converter selecting every member, with no custom converters.
    #[must_use]
    pub fn new() -> Self {
        StructureConverter::with_options(ConverterOptions::default())
    }

    /// Starts a converter configured in one expression.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use meml::{MemberFinder, MemlValue, StructureConverter};
    ///
    /// struct Handle(u32);
    /// impl meml::Convert for Handle {}
    ///
    /// let converter = StructureConverter::builder()
    ///     .strict(true)
    ///     .member_finder(MemberFinder::marked("save"))
    ///     .register::<Handle, _, _>(|h| MemlValue::from(h.0), |v| v.widen().map(Handle))
    ///     .build();
    ///
    /// assert!(converter.options().strict);
    /// assert!(converter.is_registered::<Handle>());
    /// ```
    #[must_use]
    pub fn builder() -> StructureConverterBuilder {
        StructureConverterBuilder {
            converter: StructureConverter::new(),
        }
    }

    #[must_use]
    pub fn with_options(options: ConverterOptions) -> Self {
        StructureConverter {
            finder: MemberFinder::all(),
            registry: HashMap::new(),
            options,
        }
    }

    /// Replaces the member finder, builder style.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use meml::{MemberFinder, StructureConverter};
    ///
    /// let saves = StructureConverter::new().with_member_finder(MemberFinder::marked("save"));
    /// let prefabs = StructureConverter::new().with_member_finder(MemberFinder::marked("prefab"));
    /// # let _ = (saves, prefabs);
    /// ```
    #[must_use]
    pub fn with_member_finder(mut self, finder: MemberFinder) -> Self {
        self.set_member_finder(finder);
        self
    }

    pub fn set_member_finder(&mut self, finder: MemberFinder) {
        debug!("Member finder replaced.");
        self.finder = finder;
    }

    #[must_use]
    pub fn member_finder(&self) -> &MemberFinder {
        &self.finder
    }

    #[must_use]
    pub fn options(&self) -> &ConverterOptions {
        &self.options
    }

    /// Registers custom encode and decode functions for exactly `T`.
    ///
    /// They take precedence over `T`'s [`Convert`] implementation. A later
    /// registration for the same type replaces the earlier one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use meml::{Convert, Error, Member, MemlValue, StructureConverter, TypeDescriptor};
    ///
    /// #[derive(Default, Debug, PartialEq)]
    /// struct Point { x: i32, y: i32 }
    ///
    /// impl Convert for Point {
    ///     fn descriptor() -> TypeDescriptor<Self> {
    ///         TypeDescriptor::defaulted("Point")
    ///             .member(Member::field("x", |p: &Point| &p.x, |p| &mut p.x))
    ///             .member(Member::field("y", |p: &Point| &p.y, |p| &mut p.y))
    ///     }
    /// }
    ///
    /// let mut converter = StructureConverter::new();
    /// converter.register::<Point, _, _>(
    ///     |p| MemlValue::Array(vec![p.x.into(), p.y.into()]),
    ///     |value| match value.as_array().map(Vec::as_slice) {
    ///         Some([x, y]) => Ok(Point { x: x.widen()?, y: y.widen()? }),
    ///         _ => Err(Error::type_mismatch("[x, y]", value.kind_name())),
    ///     },
    /// );
    ///
    /// let value = converter.to_structure(&Point { x: 3, y: 4 });
    /// assert_eq!(value.to_string(), "[3,4]");
    /// assert_eq!(converter.from_structure::<Point>(&value).unwrap(), Point { x: 3, y: 4 });
    /// ```
    pub fn register<T, E, D>(&mut self, encode: E, decode: D)
    where
        T: 'static,
        E: Fn(&T) -> MemlValue + Send + Sync + 'static,
        D: Fn(&MemlValue) -> Result<T> + Send + Sync + 'static,
    {
        let custom = CustomConverter::<T> {
            encode: Box::new(encode),
            decode: Box::new(decode),
        };
        if self.registry.insert(TypeId::of::<T>(), Box::new(custom)).is_some() {
            debug!("Replaced custom converter for {}.", std::any::type_name::<T>());
        } else {
            debug!("Registered custom converter for {}.", std::any::type_name::<T>());
        }
    }

    #[must_use]
    pub fn is_registered<T: 'static>(&self) -> bool {
        self.registry.contains_key(&TypeId::of::<T>())
    }

    fn custom<T: 'static>(&self) -> Option<&CustomConverter<T>> {
        self.registry
            .get(&TypeId::of::<T>())
            .and_then(|custom| custom.downcast_ref::<CustomConverter<T>>())
    }

    /// Encodes `value`, preferring a custom converter registered for `T`.
    pub fn to_structure<T: Convert>(&self, value: &T) -> MemlValue {
        match self.custom::<T>() {
            Some(custom) => (custom.encode)(value),
            None => value.to_structure(self),
        }
    }

    /// Decodes a `T`, preferring a custom converter registered for `T`.
    ///
    /// # Errors
    ///
    /// The first conversion error met anywhere in the tree, with the member
    /// path leading to it. No partially decoded object is returned.
    pub fn from_structure<T: Convert>(&self, value: &MemlValue) -> Result<T> {
        match self.custom::<T>() {
            Some(custom) => (custom.decode)(value),
            None => T::from_structure(value, self),
        }
    }

    /// Encodes a composite as an object of its selected members.
    pub fn encode_members<T: Convert>(&self, value: &T) -> MemlValue {
        let descriptor = T::descriptor();
        let owner = descriptor.type_info();
        let map: MemlMap = descriptor
            .members()
            .iter()
            .filter(|member| self.finder.selects(owner, member.info()))
            .map(|member| (member.key().to_string(), member.encode(value, self)))
            .collect();
        MemlValue::Object(map)
    }

    /// Decodes a composite from an object, member by member.
    ///
    /// Members without a key keep the constructor's value. Keys without a
    /// selected member are skipped, or rejected by a strict converter.
    ///
    /// # Errors
    ///
    /// [`Error::RequiredValueMissing`] for `Null`, [`Error::TypeMismatch`]
    /// for other non-object values, [`Error::NoDefaultConstructor`],
    /// [`Error::UnknownMember`] in strict mode, or any member error.
    pub fn decode_members<T: Convert>(&self, value: &MemlValue) -> Result<T> {
        let descriptor = T::descriptor();
        let object = match value {
            MemlValue::Object(object) => object,
            MemlValue::Null => return Err(Error::required_value_missing(descriptor.name())),
            other => return Err(Error::type_mismatch(descriptor.name(), other.kind_name())),
        };

        let owner = descriptor.type_info();
        let selected: Vec<_> = descriptor
            .members()
            .iter()
            .filter(|member| self.finder.selects(owner, member.info()))
            .collect();

        for key in object.keys() {
            if selected.iter().all(|member| member.key() != key) {
                if self.options.strict {
                    return Err(Error::UnknownMember {
                        type_name: descriptor.name().to_string(),
                        member: key.clone(),
                    });
                }
                trace!("Skipping unknown key '{}' for {}.", key, descriptor.name());
            }
        }

        let mut target = descriptor.construct()?;
        for member in selected {
            match object.get(member.key()) {
                Some(member_value) => member
                    .decode(&mut target, member_value, self)
                    .map_err(|err| err.at_member(member.key()))?,
                None => trace!(
                    "Key '{}' missing for {}, keeping default.",
                    member.key(),
                    descriptor.name()
                ),
            }
        }
        Ok(target)
    }

    /// Parses a document and decodes it into `T`.
    ///
    /// # Errors
    ///
    /// Any parse or conversion error.
    pub fn parse_str<T: Convert>(&self, s: &str) -> Result<T> {
        self.from_structure(&crate::from_str(s)?)
    }

    /// Parses a document from `reader` and decodes it into `T`.
    ///
    /// # Errors
    ///
    /// Any I/O, parse or conversion error.
    pub fn parse_reader<T: Convert, R: Read>(&self, reader: R) -> Result<T> {
        self.from_structure(&crate::from_reader(reader)?)
    }

    /// Loads the document at `path` and decodes it into `T`.
    ///
    /// # Errors
    ///
    /// Any I/O, parse or conversion error.
    pub fn read_path<T: Convert, P: AsRef<Path>>(&self, path: P) -> Result<T> {
        self.from_structure(&crate::from_path(path)?)
    }

    /// Encodes `value` and writes it as compact MEML text.
    ///
    /// # Errors
    ///
    /// Any value the [`Writer`](crate::Writer) refuses, such as a NaN member.
    pub fn write_string<T: Convert>(&self, value: &T) -> Result<String> {
        crate::to_string(&self.to_structure(value))
    }

    /// Encodes `value` and saves it at `path` with the given layout.
    ///
    /// # Errors
    ///
    /// Any I/O error, or any value the [`Writer`](crate::Writer) refuses.
    pub fn write_path<T: Convert, P: AsRef<Path>>(
        &self,
        path: P,
        value: &T,
        options: crate::WriterOptions,
    ) -> Result<()> {
        crate::to_path(path, &self.to_structure(value), options)
    }
}

/// Configures a [`StructureConverter`] before it is shared.
///
/// Created by [`StructureConverter::builder`].
#[derive(Debug)]
pub struct StructureConverterBuilder {
    converter: StructureConverter,
}

impl StructureConverterBuilder {
    #[must_use]
    pub fn options(mut self, options: ConverterOptions) -> Self {
        self.converter.options = options;
        self
    }

    /// Rejects unknown keys when `true`.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.converter.options.strict = strict;
        self
    }

    #[must_use]
    pub fn member_finder(mut self, finder: MemberFinder) -> Self {
        self.converter.set_member_finder(finder);
        self
    }

    /// See [`StructureConverter::register`].
    #[must_use]
    pub fn register<T, E, D>(mut self, encode: E, decode: D) -> Self
    where
        T: 'static,
        E: Fn(&T) -> MemlValue + Send + Sync + 'static,
        D: Fn(&MemlValue) -> Result<T> + Send + Sync + 'static,
    {
        self.converter.register(encode, decode);
        self
    }

    #[must_use]
    pub fn build(self) -> StructureConverter {
        self.converter
    }
}

macro_rules! impl_convert_number {
    ($($ty:ty),*) => {
        $(
            impl Convert for $ty {
                fn to_structure(&self, _converter: &StructureConverter) -> MemlValue {
                    MemlValue::from(*self)
                }

                fn from_structure(value: &MemlValue, _converter: &StructureConverter) -> Result<Self> {
                    value.widen::<$ty>()
                }
            }
        )*
    };
}

impl_convert_number!(i8, u8, i16, u16, i32, u32, i64, u64, f32, f64);

impl Convert for isize {
    fn to_structure(&self, _converter: &StructureConverter) -> MemlValue {
        MemlValue::from(*self as i64)
    }

    fn from_structure(value: &MemlValue, _converter: &StructureConverter) -> Result<Self> {
        value.widen::<isize>()
    }
}

impl Convert for usize {
    fn to_structure(&self, _converter: &StructureConverter) -> MemlValue {
        MemlValue::from(*self as u64)
    }

    fn from_structure(value: &MemlValue, _converter: &StructureConverter) -> Result<Self> {
        value.widen::<usize>()
    }
}

impl Convert for bool {
    fn to_structure(&self, _converter: &StructureConverter) -> MemlValue {
        MemlValue::Bool(*self)
    }

    fn from_structure(value: &MemlValue, _converter: &StructureConverter) -> Result<Self> {
        bool::try_from(value)
    }
}

impl Convert for String {
    fn to_structure(&self, _converter: &StructureConverter) -> MemlValue {
        MemlValue::String(self.clone())
    }

    fn from_structure(value: &MemlValue, _converter: &StructureConverter) -> Result<Self> {
        String::try_from(value)
    }
}

/// Single-character strings.
impl Convert for char {
    fn to_structure(&self, _converter: &StructureConverter) -> MemlValue {
        MemlValue::String(self.to_string())
    }

    fn from_structure(value: &MemlValue, _converter: &StructureConverter) -> Result<Self> {
        let text = String::try_from(value).map_err(|_| match value {
            MemlValue::Null => Error::required_value_missing("char"),
            other => Error::type_mismatch("char", other.kind_name()),
        })?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Ok(ch),
            _ => Err(Error::type_mismatch("char", "string")),
        }
    }
}

/// A byte buffer written as a `bin::` literal.
///
/// `Vec<u8>` converts as an array of bytes like any other vector; wrap it in
/// `Binary` to store it as one binary value instead.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Binary(pub Vec<u8>);

impl From<Vec<u8>> for Binary {
    fn from(bytes: Vec<u8>) -> Self {
        Binary(bytes)
    }
}

impl From<Binary> for Vec<u8> {
    fn from(binary: Binary) -> Self {
        binary.0
    }
}

impl Convert for Binary {
    fn to_structure(&self, _converter: &StructureConverter) -> MemlValue {
        MemlValue::Binary(self.0.clone())
    }

    fn from_structure(value: &MemlValue, _converter: &StructureConverter) -> Result<Self> {
        Vec::<u8>::try_from(value).map(Binary)
    }
}

/// Copies the tree unchanged, for members holding free-form data.
impl Convert for MemlValue {
    fn to_structure(&self, _converter: &StructureConverter) -> MemlValue {
        self.clone()
    }

    fn from_structure(value: &MemlValue, _converter: &StructureConverter) -> Result<Self> {
        Ok(value.clone())
    }
}

/// `None` is written as `null`, and `null` is the only value decoding to `None`.
impl<T: Convert> Convert for Option<T> {
    fn to_structure(&self, converter: &StructureConverter) -> MemlValue {
        match self {
            Some(value) => converter.to_structure(value),
            None => MemlValue::Null,
        }
    }

    fn from_structure(value: &MemlValue, converter: &StructureConverter) -> Result<Self> {
        match value {
            MemlValue::Null => Ok(None),
            other => converter.from_structure(other).map(Some),
        }
    }
}

impl<T: Convert> Convert for Box<T> {
    fn to_structure(&self, converter: &StructureConverter) -> MemlValue {
        converter.to_structure(self.as_ref())
    }

    fn from_structure(value: &MemlValue, converter: &StructureConverter) -> Result<Self> {
        converter.from_structure(value).map(Box::new)
    }
}

fn expect_array(value: &MemlValue) -> Result<&[MemlValue]> {
    match value {
        MemlValue::Array(elements) => Ok(elements),
        MemlValue::Null => Err(Error::required_value_missing("array")),
        other => Err(Error::type_mismatch("array", other.kind_name())),
    }
}

fn decode_elements<T: Convert>(
    elements: &[MemlValue],
    converter: &StructureConverter,
) -> Result<Vec<T>> {
    elements
        .iter()
        .enumerate()
        .map(|(index, element)| {
            converter
                .from_structure(element)
                .map_err(|err| err.at_index(index))
        })
        .collect()
}

impl<T: Convert> Convert for Vec<T> {
    fn to_structure(&self, converter: &StructureConverter) -> MemlValue {
        MemlValue::Array(self.iter().map(|e| converter.to_structure(e)).collect())
    }

    fn from_structure(value: &MemlValue, converter: &StructureConverter) -> Result<Self> {
        decode_elements(expect_array(value)?, converter)
    }
}

/// Fixed-size arrays require exactly `N` elements.
impl<T: Convert, const N: usize> Convert for [T; N] {
    fn to_structure(&self, converter: &StructureConverter) -> MemlValue {
        MemlValue::Array(self.iter().map(|e| converter.to_structure(e)).collect())
    }

    fn from_structure(value: &MemlValue, converter: &StructureConverter) -> Result<Self> {
        let elements = expect_array(value)?;
        if elements.len() != N {
            return Err(Error::type_mismatch(
                format!("array of {}", N),
                format!("array of {}", elements.len()),
            ));
        }
        let decoded = decode_elements::<T>(elements, converter)?;
        decoded
            .try_into()
            .map_err(|_| Error::type_mismatch(format!("array of {}", N), "array"))
    }
}

fn expect_object(value: &MemlValue) -> Result<&MemlMap> {
    match value {
        MemlValue::Object(object) => Ok(object),
        MemlValue::Null => Err(Error::required_value_missing("object")),
        other => Err(Error::type_mismatch("object", other.kind_name())),
    }
}

macro_rules! impl_convert_map {
    ($($map:ident),*) => {
        $(
            impl<T: Convert> Convert for $map<String, T> {
                fn to_structure(&self, converter: &StructureConverter) -> MemlValue {
                    MemlValue::Object(
                        self.iter()
                            .map(|(key, value)| (key.clone(), converter.to_structure(value)))
                            .collect(),
                    )
                }

                fn from_structure(value: &MemlValue, converter: &StructureConverter) -> Result<Self> {
                    expect_object(value)?
                        .iter()
                        .map(|(key, member)| {
                            converter
                                .from_structure(member)
                                .map(|decoded| (key.clone(), decoded))
                                .map_err(|err| err.at_member(key))
                        })
                        .collect()
                }
            }
        )*
    };
}

impl_convert_map!(IndexMap, HashMap, BTreeMap);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Member, MemberFinder, Number};

    #[derive(Default, Debug, PartialEq)]
    struct Item {
        id: u32,
        count: u8,
    }

    impl Convert for Item {
        fn descriptor() -> TypeDescriptor<Self> {
            TypeDescriptor::defaulted("Item")
                .member(Member::field("id", |i: &Item| &i.id, |i| &mut i.id).marked("save"))
                .member(Member::field("count", |i: &Item| &i.count, |i| &mut i.count).marked("save"))
        }
    }

    #[derive(Default, Debug, PartialEq)]
    struct Player {
        name: String,
        inventory: Vec<Item>,
        title: Option<String>,
        scratch: i64,
    }

    impl Convert for Player {
        fn descriptor() -> TypeDescriptor<Self> {
            TypeDescriptor::defaulted("Player")
                .member(Member::field("name", |p: &Player| &p.name, |p| &mut p.name).marked("save"))
                .member(
                    Member::field("inventory", |p: &Player| &p.inventory, |p| &mut p.inventory)
                        .marked("save"),
                )
                .member(Member::field("title", |p: &Player| &p.title, |p| &mut p.title).marked("save"))
                .member(Member::field("scratch", |p: &Player| &p.scratch, |p| &mut p.scratch))
        }
    }

    struct Handle(u32);

    impl Convert for Handle {}

    #[test]
    fn test_scalars_keep_width() {
        let converter = StructureConverter::new();
        assert_eq!(
            converter.to_structure(&7u16),
            MemlValue::Number(Number::UShort(7))
        );
        assert_eq!(
            converter.to_structure(&7usize),
            MemlValue::Number(Number::ULong(7))
        );
        assert_eq!(converter.to_structure(&'x'), MemlValue::from("x"));
        assert_eq!(
            converter.to_structure(&Binary(vec![1, 2])),
            MemlValue::Binary(vec![1, 2])
        );
        assert_eq!(
            converter.to_structure(&vec![1u8, 2]),
            MemlValue::Array(vec![MemlValue::from(1u8), MemlValue::from(2u8)])
        );
    }

    #[test]
    fn test_widening_on_decode() {
        let converter = StructureConverter::new();
        let int = MemlValue::from(5i32);
        assert_eq!(converter.from_structure::<i64>(&int).unwrap(), 5);
        assert_eq!(converter.from_structure::<u8>(&int).unwrap(), 5);
        assert_eq!(converter.from_structure::<f64>(&int).unwrap(), 5.0);
        assert!(converter.from_structure::<String>(&int).is_err());
    }

    #[test]
    fn test_composite_round_trip() {
        let converter = StructureConverter::new();
        let player = Player {
            name: "Ada".to_string(),
            inventory: vec![Item { id: 1, count: 3 }, Item { id: 9, count: 1 }],
            title: None,
            scratch: -4,
        };

        let value = converter.to_structure(&player);
        assert_eq!(
            value.to_string(),
            r#"{"name":"Ada","inventory":[{"id":1,"count":3},{"id":9,"count":1}],"title":null,"scratch":-4}"#
        );
        assert_eq!(converter.from_structure::<Player>(&value).unwrap(), player);
    }

    #[test]
    fn test_marked_finder_filters_both_directions() {
        let converter = StructureConverter::new().with_member_finder(MemberFinder::marked("save"));
        let player = Player {
            name: "Ada".to_string(),
            scratch: 99,
            ..Player::default()
        };

        let value = converter.to_structure(&player);
        assert!(value.get("scratch").is_none());

        let decoded: Player = converter
            .from_structure(&crate::from_str(r#"{ name: "Ada", scratch: 5 }"#).unwrap())
            .unwrap();
        assert_eq!(decoded.scratch, 0);
    }

    #[test]
    fn test_error_paths() {
        let converter = StructureConverter::new();
        let value = crate::from_str(r#"{ name: "Ada", inventory: [{ id: 1 }, { id: 2 }, { count: 300 }] }"#)
            .unwrap();
        match converter.from_structure::<Player>(&value).unwrap_err() {
            Error::TypeMismatch {
                path,
                expected,
                found,
            } => {
                assert_eq!(path, "inventory[2].count");
                assert_eq!(expected, "u8");
                assert_eq!(found, "int");
            }
            other => panic!("Expected type mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_null_rules() {
        let converter = StructureConverter::new();
        assert_eq!(
            converter.from_structure::<Option<Item>>(&MemlValue::Null).unwrap(),
            None
        );
        assert!(matches!(
            converter.from_structure::<Item>(&MemlValue::Null),
            Err(Error::RequiredValueMissing { .. })
        ));

        let value = crate::from_str("{ name: null }").unwrap();
        match converter.from_structure::<Player>(&value).unwrap_err() {
            Error::RequiredValueMissing { path, .. } => assert_eq!(path, "name"),
            other => panic!("Expected missing value, got {:?}", other),
        }
    }

    #[test]
    fn test_strict_mode_rejects_unknown_keys() {
        let value = crate::from_str("{ id: 1, colour: 2 }").unwrap();

        let lenient = StructureConverter::new();
        assert_eq!(
            lenient.from_structure::<Item>(&value).unwrap(),
            Item { id: 1, count: 0 }
        );

        let strict = StructureConverter::with_options(ConverterOptions::strict());
        assert_eq!(
            strict.from_structure::<Item>(&value).unwrap_err(),
            Error::UnknownMember {
                type_name: "Item".to_string(),
                member: "colour".to_string()
            }
        );
    }

    #[test]
    fn test_opaque_type_needs_registration() {
        let mut converter = StructureConverter::new();
        assert!(matches!(
            converter.from_structure::<Handle>(&MemlValue::from(3u32)),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            converter.from_structure::<Handle>(&MemlValue::Object(MemlMap::new())),
            Err(Error::NoDefaultConstructor { .. })
        ));

        converter.register::<Handle, _, _>(
            |h| MemlValue::from(h.0),
            |value| value.widen::<u32>().map(Handle),
        );
        assert!(converter.is_registered::<Handle>());
        let handle: Handle = converter.from_structure(&MemlValue::from(3u32)).unwrap();
        assert_eq!(handle.0, 3);
        assert_eq!(converter.to_structure(&handle), MemlValue::from(3u32));
    }

    #[test]
    fn test_fixed_arrays_and_maps() {
        let converter = StructureConverter::new();
        let value = crate::from_str("[1, 2, 3]").unwrap();
        assert_eq!(converter.from_structure::<[i16; 3]>(&value).unwrap(), [1, 2, 3]);
        assert!(converter.from_structure::<[i16; 2]>(&value).is_err());

        let value = crate::from_str("{ b: 2, a: 1 }").unwrap();
        let map: BTreeMap<String, u64> = converter.from_structure(&value).unwrap();
        assert_eq!(map.into_iter().collect::<Vec<_>>(), vec![("a".to_string(), 1), ("b".to_string(), 2)]);

        let ordered: IndexMap<String, u64> = converter.from_structure(&value).unwrap();
        assert_eq!(ordered.keys().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn test_builder_configures_everything() {
        let converter = StructureConverter::builder()
            .options(ConverterOptions::strict())
            .member_finder(MemberFinder::marked("save"))
            .register::<Handle, _, _>(|h| MemlValue::from(h.0), |v| v.widen().map(Handle))
            .build();

        assert!(converter.options().strict);
        assert!(converter.is_registered::<Handle>());

        let player = Player {
            name: "Ada".to_string(),
            scratch: 3,
            ..Player::default()
        };
        assert!(converter.to_structure(&player).get("scratch").is_none());
        assert!(matches!(
            converter.from_structure::<Item>(&crate::from_str("{ id: 1, colour: 2 }").unwrap()),
            Err(Error::UnknownMember { .. })
        ));

        let lenient = StructureConverter::builder()
            .options(ConverterOptions::strict())
            .strict(false)
            .build();
        assert!(!lenient.options().strict);
        assert!(!lenient.is_registered::<Handle>());
    }

    #[test]
    fn test_converter_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StructureConverter>();
    }
}
