use meml::{
    from_path, from_str, from_str_as, meml, to_path, to_string, to_string_pretty, to_value,
    Convert, Error, Member, MemlValue, Number, StructureConverter, Token, TokenReader,
    TypeDescriptor, WriterOptions,
};
use serde::{Deserialize, Serialize};

#[derive(Default, Debug, PartialEq)]
struct Person {
    name: String,
    age: i32,
}

impl Convert for Person {
    fn descriptor() -> TypeDescriptor<Self> {
        TypeDescriptor::defaulted("Person")
            .member(Member::field("name", |p: &Person| &p.name, |p| &mut p.name))
            .member(Member::field("age", |p: &Person| &p.age, |p| &mut p.age))
    }
}

#[derive(Default, Debug, PartialEq, Clone, Copy)]
struct Vec2 {
    x: f32,
    y: f32,
}

impl Convert for Vec2 {
    fn descriptor() -> TypeDescriptor<Self> {
        TypeDescriptor::defaulted("Vec2")
            .member(Member::field("x", |v: &Vec2| &v.x, |v| &mut v.x))
            .member(Member::field("y", |v: &Vec2| &v.y, |v| &mut v.y))
    }
}

#[derive(Default, Debug, PartialEq)]
struct Transform {
    position: Vec2,
    rotation: f32,
}

impl Convert for Transform {
    fn descriptor() -> TypeDescriptor<Self> {
        TypeDescriptor::defaulted("Transform")
            .member(Member::field("position", |t: &Transform| &t.position, |t| &mut t.position))
            .member(Member::field("rotation", |t: &Transform| &t.rotation, |t| &mut t.rotation))
    }
}

fn vec2_converter() -> StructureConverter {
    let mut converter = StructureConverter::new();
    converter.register::<Vec2, _, _>(
        |v| MemlValue::Array(vec![v.x.into(), v.y.into()]),
        |value| match value.as_array().map(Vec::as_slice) {
            Some([x, y]) => Ok(Vec2 {
                x: x.widen()?,
                y: y.widen()?,
            }),
            _ => Err(Error::type_mismatch("[x, y]", value.kind_name())),
        },
    );
    converter
}

#[test]
fn test_decode_person() {
    let converter = StructureConverter::new();
    let person: Person = converter
        .parse_str(r#"{ name: "Bob", age: 42 }"#)
        .unwrap();
    assert_eq!(
        person,
        Person {
            name: "Bob".to_string(),
            age: 42
        }
    );
}

#[test]
fn test_stable_serialization() {
    let first = to_string(&from_str("{ x: 1.5, y: 2.5 }").unwrap()).unwrap();
    let second = to_string(&from_str(&first).unwrap()).unwrap();
    assert_eq!(first, r#"{"x":1.5,"y":2.5}"#);
    assert_eq!(first.as_bytes(), second.as_bytes());
}

#[test]
fn test_comment_is_ignored() {
    assert_eq!(
        from_str("// comment\n{ a: 1 }").unwrap(),
        from_str("{ a: 1 }").unwrap()
    );
}

#[test]
fn test_binary_token() {
    let mut reader = TokenReader::from_str(r#""bin::AAEC""#);
    assert!(reader.read().unwrap());
    assert_eq!(reader.token(), Some(&Token::Binary(vec![0x00, 0x01, 0x02])));
    assert!(!reader.read().unwrap());
}

#[test]
fn test_duplicate_key_last_wins() {
    let value = from_str("{ a: 1, a: 2 }").unwrap();
    let object = value.as_object().unwrap();
    assert_eq!(object.len(), 1);
    assert_eq!(object.get("a"), Some(&MemlValue::from(2)));
}

#[test]
fn test_custom_type_encodes_as_array() {
    let converter = vec2_converter();
    let transform = Transform {
        position: Vec2 { x: 1.5, y: 2.0 },
        rotation: 0.25,
    };

    let text = converter.write_string(&transform).unwrap();
    assert_eq!(text, r#"{"position":[1.5,2.0],"rotation":0.25}"#);

    let back: Transform = converter.parse_str(&text).unwrap();
    assert_eq!(back, transform);
}

#[test]
fn test_custom_converter_used_exclusively() {
    let converter = vec2_converter();
    // Vec2 has members, but the registered decoder never falls back to them.
    let err = converter
        .parse_str::<Transform>("{ position: { x: 1.0, y: 2.0 } }")
        .unwrap_err();
    assert_eq!(
        err,
        Error::TypeMismatch {
            path: "position".to_string(),
            expected: "[x, y]".to_string(),
            found: "object".to_string(),
        }
    );

    let plain = StructureConverter::new();
    let transform: Transform = plain
        .parse_str("{ position: { x: 1.0, y: 2.0 } }")
        .unwrap();
    assert_eq!(transform.position, Vec2 { x: 1.0, y: 2.0 });
}

#[test]
fn test_file_round_trip() {
    let path = std::env::temp_dir().join(format!("meml_roundtrip_{}.meml", std::process::id()));
    let value = meml!({
        "name": "save slot 1",
        "seed": 18446744073709551615u64,
        "thumbnail": (vec![0u8, 1, 254, 255]),
        "party": [{ "class": "mage", "level": 7 }]
    });

    to_path(&path, &value, WriterOptions::pretty()).unwrap();
    let reread = from_path(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(reread, value);
}

#[test]
fn test_converter_file_round_trip() {
    let converter = vec2_converter();
    let path = std::env::temp_dir().join(format!("meml_transform_{}.meml", std::process::id()));
    let transform = Transform {
        position: Vec2 { x: -3.5, y: 8.0 },
        rotation: 1.25,
    };

    converter
        .write_path(&path, &transform, WriterOptions::pretty())
        .unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    let back: Transform = converter.read_path(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert!(text.contains("\"rotation\": 1.25"));
    assert_eq!(back, transform);
}

#[test]
fn test_converter_reads_any_stream() {
    let converter = StructureConverter::new();
    let input = std::io::Cursor::new(b"// from a socket\n{ name: \"Eve\" age: 7 }".to_vec());
    let person: Person = converter.parse_reader(input).unwrap();
    assert_eq!(
        person,
        Person {
            name: "Eve".to_string(),
            age: 7
        }
    );

    let invalid: &[u8] = b"{ name: \"\xC3\" }";
    assert!(matches!(
        converter.parse_reader::<Person, _>(invalid),
        Err(Error::Io(_))
    ));
}

#[test]
fn test_from_slice() {
    assert_eq!(
        meml::from_slice("{ name: \"Zoë\" }".as_bytes()).unwrap(),
        meml!({ "name": "Zoë" })
    );
    assert!(matches!(
        meml::from_slice(b"[\xF0\x9F]"),
        Err(Error::Io(_))
    ));
}

#[test]
fn test_deep_document_is_an_error() {
    let depth = 20_000;
    let input = "[".repeat(depth) + &"]".repeat(depth);
    let err = from_str(&input).unwrap_err();
    assert_eq!(
        err,
        Error::RecursionLimitExceeded {
            offset: meml::MAX_DEPTH
        }
    );
}

#[test]
fn test_missing_file_is_io_error() {
    let path = std::env::temp_dir().join("meml_definitely_missing_file.meml");
    assert!(matches!(from_path(path), Err(Error::Io(_))));
}

#[test]
fn test_pretty_output_reads_back() {
    let value = from_str(
        r#"
        // level header
        {
            title: "Caves"
            size: [64 48]
            spawn: { x: 3, y: 4 }
            music: null
        }
        "#,
    )
    .unwrap();
    let pretty = to_string_pretty(&value).unwrap();
    assert!(pretty.contains("\n  \"size\": [\n    64,\n    48\n  ],"));
    assert_eq!(from_str(&pretty).unwrap(), value);
}

#[test]
fn test_json_interop() {
    let json = r#"{"name":"Bob","age":42,"tags":["a"],"boss":null}"#;

    let from_json: MemlValue = serde_json::from_str(json).unwrap();
    let from_meml = from_str(r#"{ name: "Bob", age: 42, tags: ["a"], boss: null }"#).unwrap();
    assert_eq!(from_json, from_meml);

    assert_eq!(serde_json::to_string(&from_meml).unwrap(), json);
}

#[test]
fn test_serde_types_through_values() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Glyph {
        code: u32,
        advance: f32,
        kerning: Vec<(char, i8)>,
    }

    let glyph = Glyph {
        code: 65,
        advance: 7.5,
        kerning: vec![('V', -2), ('W', -1)],
    };

    let value = to_value(&glyph).unwrap();
    assert_eq!(value["code"], MemlValue::Number(Number::UInt(65)));

    let text = to_string(&value).unwrap();
    assert_eq!(
        text,
        r#"{"code":65,"advance":7.5,"kerning":[["V",-2],["W",-1]]}"#
    );
    let back: Glyph = from_str_as(&text).unwrap();
    assert_eq!(back, glyph);
}
