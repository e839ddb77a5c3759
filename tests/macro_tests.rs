use meml::{meml, to_string, MemlMap, MemlValue, Number};

#[test]
fn test_meml_macro_null() {
    assert_eq!(meml!(null), MemlValue::Null);
}

#[test]
fn test_meml_macro_booleans() {
    assert_eq!(meml!(true), MemlValue::Bool(true));
    assert_eq!(meml!(false), MemlValue::Bool(false));
}

#[test]
fn test_meml_macro_numbers() {
    assert_eq!(meml!(42), MemlValue::Number(Number::Int(42)));
    assert_eq!(meml!(3.5), MemlValue::Number(Number::Double(3.5)));
    assert_eq!(meml!(3.5f32), MemlValue::Number(Number::Float(3.5)));
    assert_eq!(meml!(-123), MemlValue::Number(Number::Int(-123)));
    assert_eq!(meml!(7u64), MemlValue::Number(Number::ULong(7)));
}

#[test]
fn test_meml_macro_strings() {
    assert_eq!(meml!("hello world"), MemlValue::String("hello world".to_string()));
    assert_eq!(meml!(""), MemlValue::String(String::new()));
}

#[test]
fn test_meml_macro_arrays() {
    assert_eq!(meml!([]), MemlValue::Array(vec![]));

    let mixed = meml!([1, "hello", true, null, (-2)]);
    assert_eq!(
        mixed,
        MemlValue::Array(vec![
            MemlValue::Number(Number::Int(1)),
            MemlValue::String("hello".to_string()),
            MemlValue::Bool(true),
            MemlValue::Null,
            MemlValue::Number(Number::Int(-2)),
        ])
    );
}

#[test]
fn test_meml_macro_objects_keep_order() {
    assert_eq!(meml!({}), MemlValue::Object(MemlMap::new()));

    let obj = meml!({
        "z": 1,
        "a": 2,
        "m": 3
    });
    let keys: Vec<_> = obj.as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys, vec!["z", "a", "m"]);
}

#[test]
fn test_meml_macro_nested_document() {
    let prefab = meml!({
        "name": "torch",
        "components": [
            { "type": "sprite", "frames": [0, 1, 2, 3] },
            { "type": "light", "radius": 4.5f32, "flicker": true }
        ],
        "parent": null
    });

    assert_eq!(
        to_string(&prefab).unwrap(),
        r#"{"name":"torch","components":[{"type":"sprite","frames":[0,1,2,3]},{"type":"light","radius":4.5,"flicker":true}],"parent":null}"#
    );
}

#[test]
fn test_meml_macro_matches_parsed_text() {
    let built = meml!({ "hp": 10, "tags": ["a", "b"], "boss": false });
    let parsed = meml::from_str(r#"{ hp: 10, tags: ["a" "b"], boss: false }"#).unwrap();
    assert_eq!(built, parsed);
}
