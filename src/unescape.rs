use serde_json::Value;

/// Decodes HTML entities until the text stops changing.
///
/// Decoding to a fixed point keeps `unescape_str(unescape_str(s)) ==
/// unescape_str(s)` for every input, including double-escaped text like
/// `&amp;amp;`. Each decoding pass that changes the text shortens it, so the
/// loop terminates.
pub fn unescape_str(text: &str) -> String {
    let mut current = text.to_owned();
    loop {
        let decoded = html_escape::decode_html_entities(&current).into_owned();
        if decoded == current {
            return current;
        }
        current = decoded;
    }
}

/// Applies [`unescape_str`] to every string leaf, recursing through arrays and
/// objects. Object keys are left as they are; numbers, booleans and null pass
/// through untouched.
pub fn unescape(value: Value) -> Value {
    match value {
        Value::String(text) => Value::String(unescape_str(&text)),
        Value::Array(items) => Value::Array(items.into_iter().map(unescape).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, unescape(value)))
                .collect(),
        ),
        other => other,
    }
}
