use meml::{from_str, to_string, Error, MemlValue, Number, Token, TokenReader};

fn tokens(input: &str) -> Vec<Token> {
    TokenReader::from_str(input)
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

#[test]
fn test_separators_are_interchangeable() {
    let canonical = from_str(r#"{ "a": 1, "b": [true, false] }"#).unwrap();
    assert_eq!(from_str("{ a: 1 b: [true false] }").unwrap(), canonical);
    assert_eq!(from_str("{a:1,b:[true,false]}").unwrap(), canonical);
    assert_eq!(from_str("{\n  a: 1\n  b: [\n    true\n    false\n  ]\n}").unwrap(), canonical);
}

#[test]
fn test_colon_marks_keys() {
    assert_eq!(
        tokens("{ a: 1 b: 2 }"),
        vec![
            Token::ObjectStart,
            Token::ObjectKey("a".to_string()),
            Token::Int(1),
            Token::ObjectKey("b".to_string()),
            Token::Int(2),
            Token::ObjectEnd,
        ]
    );
}

#[test]
fn test_comments_everywhere() {
    let input = "// header\n{ // after brace\n  a: 1 // after value\n  // own line\n  b: \"x // not a comment\"\n} // trailer";
    let value = from_str(input).unwrap();
    assert_eq!(value["a"], MemlValue::from(1));
    assert_eq!(value["b"].as_str(), Some("x // not a comment"));
}

#[test]
fn test_comment_at_end_without_newline() {
    assert_eq!(from_str("[1] // done").unwrap(), from_str("[1]").unwrap());
}

#[test]
fn test_number_classification() {
    let value = from_str("[0, -2147483648, 2147483648, -9223372036854775808, 9223372036854775808, 0.5, 0.25000]").unwrap();
    let kinds: Vec<&str> = value
        .as_array()
        .unwrap()
        .iter()
        .map(MemlValue::kind_name)
        .collect();
    assert_eq!(
        kinds,
        vec!["int", "int", "long", "long", "ulong", "float", "double"]
    );
}

#[test]
fn test_number_text_round_trips_kind() {
    let value = MemlValue::Array(vec![
        MemlValue::from(0.1f32),
        MemlValue::from(0.1f64),
        MemlValue::from(1e20f64),
        MemlValue::from(-3.0f32),
        MemlValue::Number(Number::SByte(-8)),
    ]);
    let text = to_string(&value).unwrap();
    assert_eq!(text, "[0.1,0.10,100000000000000000000.00,-3.0,-8]");

    let reread = from_str(&text).unwrap();
    assert_eq!(reread[0], MemlValue::from(0.1f32));
    assert_eq!(reread[1], MemlValue::from(0.1f64));
    assert_eq!(reread[2], MemlValue::from(1e20f64));
    assert_eq!(reread[3], MemlValue::from(-3.0f32));
    // Narrow integer widths come back as the reader's smallest kind.
    assert_eq!(reread[4], MemlValue::from(-8i32));
}

#[test]
fn test_unicode_text() {
    let value = from_str(r#"{ "名前": "スライム", emoji: "🐉" }"#).unwrap();
    assert_eq!(value["名前"].as_str(), Some("スライム"));
    assert_eq!(value["emoji"].as_str(), Some("🐉"));
    assert_eq!(from_str(&to_string(&value).unwrap()).unwrap(), value);
}

#[test]
fn test_text_starting_with_binary_prefix() {
    // such a literal always reads as binary, so the writer refuses the text
    assert_eq!(from_str(r#""bin::AAEC""#).unwrap(), MemlValue::Binary(vec![0, 1, 2]));
    assert!(matches!(
        to_string(&MemlValue::from("bin::AAEC")),
        Err(Error::BinaryPrefixedString(_))
    ));
    assert!(matches!(
        to_string(&MemlValue::from("bin::not base64")),
        Err(Error::BinaryPrefixedString(_))
    ));
}

#[test]
fn test_parse_error_offsets() {
    let cases: Vec<(&str, Error)> = vec![
        (
            "[1, \"a\\x\"]",
            Error::UnknownEscapeSequence {
                offset: 6,
                escape: 'x',
            },
        ),
        ("{ a: ]", Error::EmptyValue { offset: 5 }),
        (
            "[ yes ]",
            Error::InvalidLiteral {
                offset: 2,
                literal: "yes".to_string(),
            },
        ),
        ("[\"bin::@@\"]", Error::InvalidBinary { offset: 1 }),
        ("{ a: 1 } x", Error::InvalidLiteral { offset: 9, literal: "x".to_string() }),
        ("{ a: 1 } 2", Error::TrailingCharacters { offset: 9 }),
    ];

    for (input, expected) in cases {
        assert_eq!(from_str(input).unwrap_err(), expected, "input: {}", input);
    }
}

#[test]
fn test_unexpected_end_of_input() {
    for input in ["", "   ", "{", "[1, 2", "{ a: ", "\"open"] {
        assert!(
            matches!(from_str(input), Err(Error::UnexpectedEndOfInput { .. })),
            "input: {:?}",
            input
        );
    }
}

#[test]
fn test_error_messages() {
    let err = from_str("{ name: Bob }").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid literal 'Bob' at offset 8\nHelp: strings must be quoted, did you mean \"Bob\"?"
    );
}
