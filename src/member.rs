//! Type descriptors: the member tables the converter walks.
//!
//! A [`TypeDescriptor`] lists the members of a composite type in declaration
//! order, each with a getter and a setter. The
//! [`StructureConverter`](crate::StructureConverter) asks its [`MemberFinder`]
//! which of those members take part in a conversion, so one table serves
//! several policies (for example, everything marked `"save"` for save games
//! and everything marked `"prefab"` for prefab templates).
//!
//! ```rust
//! use meml::{Convert, Member, TypeDescriptor};
//!
//! #[derive(Default)]
//! struct Player {
//!     name: String,
//!     hp: i32,
//!     cached_path: Vec<u32>,
//! }
//!
//! impl Convert for Player {
//!     fn descriptor() -> TypeDescriptor<Self> {
//!         TypeDescriptor::defaulted("Player")
//!             .member(Member::field("name", |p: &Player| &p.name, |p| &mut p.name).marked("save"))
//!             .member(Member::field("hp", |p: &Player| &p.hp, |p| &mut p.hp).marked("save"))
//!             .member(Member::field("cached_path", |p: &Player| &p.cached_path, |p| &mut p.cached_path))
//!     }
//! }
//!
//! let descriptor = Player::descriptor();
//! assert_eq!(descriptor.members().len(), 3);
//! assert!(descriptor.members()[0].info().has_marker("save"));
//! ```

use crate::{Convert, Error, MemlValue, Result, StructureConverter};
use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

/// Whether a member is stored directly or reached through accessor functions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberKind {
    Field,
    Property,
}

/// Static description of one member, as seen by a [`MemberFinder`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberInfo {
    pub name: &'static str,
    pub rename: Option<&'static str>,
    pub markers: Vec<&'static str>,
    pub kind: MemberKind,
}

impl MemberInfo {
    fn new(name: &'static str, kind: MemberKind) -> Self {
        MemberInfo {
            name,
            rename: None,
            markers: Vec::new(),
            kind,
        }
    }

    /// The object key: the rename if one was given, else the member name.
    #[must_use]
    pub fn key(&self) -> &'static str {
        self.rename.unwrap_or(self.name)
    }

    #[must_use]
    pub fn has_marker(&self, tag: &str) -> bool {
        self.markers.iter().any(|marker| *marker == tag)
    }
}

/// Identity of the composite type a member belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeInfo {
    pub name: &'static str,
    pub id: TypeId,
}

impl TypeInfo {
    #[must_use]
    pub fn of<T: 'static>(name: &'static str) -> Self {
        TypeInfo {
            name,
            id: TypeId::of::<T>(),
        }
    }
}

type EncodeFn<T> = Box<dyn Fn(&T, &StructureConverter) -> MemlValue + Send + Sync>;
type DecodeFn<T> = Box<dyn Fn(&mut T, &MemlValue, &StructureConverter) -> Result<()> + Send + Sync>;

/// One member of `T` with typed access in both directions.
pub struct Member<T> {
    info: MemberInfo,
    encode: EncodeFn<T>,
    decode: DecodeFn<T>,
}

impl<T: 'static> Member<T> {
    /// A member stored in a field, reached through a pair of projections.
    pub fn field<F: Convert>(
        name: &'static str,
        get: fn(&T) -> &F,
        get_mut: fn(&mut T) -> &mut F,
    ) -> Self {
        Member {
            info: MemberInfo::new(name, MemberKind::Field),
            encode: Box::new(move |target, converter| converter.to_structure(get(target))),
            decode: Box::new(move |target, value, converter| {
                *get_mut(target) = converter.from_structure::<F>(value)?;
                Ok(())
            }),
        }
    }

    /// A member computed by `getter` and stored by `setter`.
    ///
    /// The setter is only called with a fully decoded value.
    pub fn property<F, G, S>(name: &'static str, getter: G, setter: S) -> Self
    where
        F: Convert,
        G: Fn(&T) -> F + Send + Sync + 'static,
        S: Fn(&mut T, F) + Send + Sync + 'static,
    {
        Member {
            info: MemberInfo::new(name, MemberKind::Property),
            encode: Box::new(move |target, converter| converter.to_structure(&getter(target))),
            decode: Box::new(move |target, value, converter| {
                setter(target, converter.from_structure::<F>(value)?);
                Ok(())
            }),
        }
    }

    /// Uses `key` instead of the member name as the object key.
    #[must_use]
    pub fn rename(mut self, key: &'static str) -> Self {
        self.info.rename = Some(key);
        self
    }

    /// Tags the member for finders built with [`MemberFinder::marked`].
    #[must_use]
    pub fn marked(mut self, tag: &'static str) -> Self {
        self.info.markers.push(tag);
        self
    }

    #[must_use]
    pub fn info(&self) -> &MemberInfo {
        &self.info
    }

    #[must_use]
    pub fn key(&self) -> &'static str {
        self.info.key()
    }

    pub(crate) fn encode(&self, target: &T, converter: &StructureConverter) -> MemlValue {
        (self.encode)(target, converter)
    }

    pub(crate) fn decode(
        &self,
        target: &mut T,
        value: &MemlValue,
        converter: &StructureConverter,
    ) -> Result<()> {
        (self.decode)(target, value, converter)
    }
}

impl<T> fmt::Debug for Member<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member").field("info", &self.info).finish()
    }
}

/// Member table and constructor of a composite type.
pub struct TypeDescriptor<T> {
    info: TypeInfo,
    constructor: Option<fn() -> T>,
    members: Vec<Member<T>>,
}

impl<T: 'static> TypeDescriptor<T> {
    /// A descriptor without members or constructor.
    ///
    /// Such a type encodes as an empty object and cannot be decoded unless a
    /// constructor is added or a custom converter is registered for it.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        TypeDescriptor {
            info: TypeInfo::of::<T>(name),
            constructor: None,
            members: Vec::new(),
        }
    }

    #[must_use]
    pub fn constructor(mut self, constructor: fn() -> T) -> Self {
        self.constructor = Some(constructor);
        self
    }

    #[must_use]
    pub fn member(mut self, member: Member<T>) -> Self {
        self.members.push(member);
        self
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.info.name
    }

    #[must_use]
    pub fn type_info(&self) -> &TypeInfo {
        &self.info
    }

    #[must_use]
    pub fn members(&self) -> &[Member<T>] {
        &self.members
    }

    pub(crate) fn construct(&self) -> Result<T> {
        self.constructor
            .map(|constructor| constructor())
            .ok_or_else(|| Error::no_default_constructor(self.info.name))
    }
}

impl<T: Default + 'static> TypeDescriptor<T> {
    /// A descriptor constructing new instances with `T::default()`.
    #[must_use]
    pub fn defaulted(name: &'static str) -> Self {
        TypeDescriptor::new(name).constructor(T::default)
    }
}

impl<T> fmt::Debug for TypeDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("info", &self.info)
            .field("constructible", &self.constructor.is_some())
            .field("members", &self.members)
            .finish()
    }
}

type Predicate = dyn Fn(&TypeInfo, &MemberInfo) -> bool + Send + Sync;

/// Predicate choosing which members of a type take part in a conversion.
///
/// # Examples
///
/// ```rust
/// use meml::{MemberFinder, MemberInfo, MemberKind, TypeInfo};
///
/// let member = MemberInfo {
///     name: "hp",
///     rename: None,
///     markers: vec!["save"],
///     kind: MemberKind::Field,
/// };
/// let owner = TypeInfo::of::<()>("Player");
///
/// assert!(MemberFinder::all().selects(&owner, &member));
/// assert!(MemberFinder::marked("save").selects(&owner, &member));
/// assert!(!MemberFinder::marked("prefab").selects(&owner, &member));
/// ```
#[derive(Clone)]
pub struct MemberFinder(Arc<Predicate>);

impl MemberFinder {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&TypeInfo, &MemberInfo) -> bool + Send + Sync + 'static,
    {
        MemberFinder(Arc::new(predicate))
    }

    /// Selects every member of every type.
    #[must_use]
    pub fn all() -> Self {
        MemberFinder::new(|_, _| true)
    }

    /// Selects members tagged with `tag` through [`Member::marked`].
    #[must_use]
    pub fn marked(tag: &'static str) -> Self {
        MemberFinder::new(move |_, member| member.has_marker(tag))
    }

    #[must_use]
    pub fn selects(&self, owner: &TypeInfo, member: &MemberInfo) -> bool {
        (self.0)(owner, member)
    }
}

impl Default for MemberFinder {
    fn default() -> Self {
        MemberFinder::all()
    }
}

impl fmt::Debug for MemberFinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MemberFinder(..)")
    }
}
