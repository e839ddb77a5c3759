//! # meml
//!
//! Reader, writer and object converter for MEML, the structured text format
//! used for prefabs, font definitions and save files.
//!
//! ## What is MEML?
//!
//! MEML is a JSON-like format tuned for hand-edited game data:
//!
//! - `//` comments
//! - unquoted keys, and optional `:` and `,` separators
//! - binary blobs as `"bin::<base64>"` string literals
//! - width-aware numbers: `42` reads as a 32-bit int, `1.5` as a 32-bit
//!   float, `0.10` as a 64-bit double
//!
//! ```text
//! // goblin.prefab
//! {
//!   name: "Goblin"
//!   hp: 12
//!   speed: 1.5
//!   icon: "bin::iVBORw0KGgo="
//!   loot: [ "coin" "dagger" ]
//! }
//! ```
//!
//! ## Layers
//!
//! - [`TokenReader`] pulls typed [`Token`]s from any `Read` source.
//! - [`from_str`] and friends build a [`MemlValue`] tree from those tokens.
//! - [`Writer`] and [`to_string`] and friends write a tree back out.
//! - [`StructureConverter`] maps trees to typed objects and back through
//!   [`TypeDescriptor`]s, [`MemberFinder`] policies and registered custom
//!   converters.
//!
//! ## Quick Start
//!
//! ```rust
//! use meml::{Convert, Member, StructureConverter, TypeDescriptor};
//!
//! #[derive(Default, Debug, PartialEq)]
//! struct Enemy {
//!     name: String,
//!     hp: i64,
//! }
//!
//! impl Convert for Enemy {
//!     fn descriptor() -> TypeDescriptor<Self> {
//!         TypeDescriptor::defaulted("Enemy")
//!             .member(Member::field("name", |e: &Enemy| &e.name, |e| &mut e.name))
//!             .member(Member::field("hp", |e: &Enemy| &e.hp, |e| &mut e.hp))
//!     }
//! }
//!
//! let converter = StructureConverter::new();
//!
//! // `hp` is read as a 32-bit int and widened into the i64 field.
//! let enemy: Enemy = converter
//!     .parse_str("// spawned by the wave system\n{ name: \"Goblin\", hp: 12, unused: true }")
//!     .unwrap();
//! assert_eq!(enemy, Enemy { name: "Goblin".to_string(), hp: 12 });
//!
//! assert_eq!(converter.write_string(&enemy).unwrap(), r#"{"name":"Goblin","hp":12}"#);
//! ```
//!
//! ### Dynamic Values with the meml! Macro
//!
//! ```rust
//! use meml::{meml, MemlValue};
//!
//! let data = meml!({
//!     "name": "Alice",
//!     "tags": ["rust", "engine"]
//! });
//!
//! if let MemlValue::Object(obj) = data {
//!     assert_eq!(obj.get("name").and_then(|v| v.as_str()), Some("Alice"));
//! }
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events: `debug` when a converter is
//! configured, `trace` for finished documents and skipped keys. Install a
//! subscriber in the application to see them.
//!
//! ## Safety Guarantees
//!
//! - No `unsafe` code blocks
//! - Proper error propagation with `Result` types
//! - No panics in public API (except for debug assertions on unbalanced
//!   [`Writer`] calls)
//! - Bounded recursion: documents nested deeper than [`MAX_DEPTH`] are
//!   rejected with an error instead of exhausting the stack

pub mod convert;
pub mod de;
pub mod error;
pub mod macros;
pub mod map;
pub mod member;
pub mod options;
pub mod ser;
pub mod token;
pub mod value;

pub use convert::{Binary, Convert, StructureConverter, StructureConverterBuilder};
pub use de::{
    from_path, from_reader, from_slice, from_str, from_str_as, from_value, ValueBuilder, MAX_DEPTH,
};
pub use error::{Error, Result};
pub use map::MemlMap;
pub use member::{Member, MemberFinder, MemberInfo, MemberKind, TypeDescriptor, TypeInfo};
pub use options::{ConverterOptions, WriterOptions};
pub use ser::{
    to_path, to_string, to_string_pretty, to_string_with_options, to_value, to_writer,
    to_writer_with_options, ValueSerializer, Writer,
};
pub use token::{Token, TokenReader, BINARY_PREFIX};
pub use value::{MemlValue, Number, Widen};
