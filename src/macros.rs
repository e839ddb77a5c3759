/// Builds a [`MemlValue`](crate::MemlValue) from a JSON-like literal.
///
/// Scalars go through `MemlValue::from`, so integer literals become `Int`
/// and float literals become `Double` unless suffixed (`1.5f32`). Negative
/// numbers and other multi-token expressions must be parenthesized.
///
/// # Examples
///
/// ```rust
/// use meml::{meml, MemlValue};
///
/// let value = meml!({
///     "name": "slime",
///     "hp": 12,
///     "offset": [(-4), 8],
///     "drops": null
/// });
///
/// assert_eq!(value["hp"], MemlValue::from(12));
/// assert_eq!(value["offset"][0], MemlValue::from(-4));
/// assert!(value["drops"].is_null());
/// ```
#[macro_export]
macro_rules! meml {
    (null) => {
        $crate::MemlValue::Null
    };

    (true) => {
        $crate::MemlValue::Bool(true)
    };

    (false) => {
        $crate::MemlValue::Bool(false)
    };

    ([]) => {
        $crate::MemlValue::Array(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::MemlValue::Array(vec![$($crate::meml!($elem)),*])
    };

    ({}) => {
        $crate::MemlValue::Object($crate::MemlMap::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut object = $crate::MemlMap::new();
        $(
            object.insert($key.to_string(), $crate::meml!($value));
        )*
        $crate::MemlValue::Object(object)
    }};

    ($s:expr) => {
        $crate::MemlValue::from($s)
    };
}
