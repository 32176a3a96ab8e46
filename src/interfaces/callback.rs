use crate::error::{GatewayError, Result};
use serde_json::value::RawValue;
use std::collections::BTreeMap;

/// Flat callback payload: field name to textual value.
pub type Payload = BTreeMap<String, String>;

/// Decodes a raw callback body into a flat payload.
///
/// The gateway posts JSON, but form-encoded bodies are accepted too. In JSON,
/// strings, numbers and booleans keep their textual form; nulls, arrays and
/// nested objects are dropped.
pub fn decode_payload(body: &str) -> Result<Payload> {
    let body = body.trim();
    if body.starts_with('{') {
        decode_json(body)
    } else if body.contains('=') {
        Ok(decode_form(body))
    } else {
        Err(GatewayError::InvalidPayload(
            "expected a JSON object or a form-encoded body".to_string(),
        ))
    }
}

fn decode_json(body: &str) -> Result<Payload> {
    let object: BTreeMap<String, Box<RawValue>> = serde_json::from_str(body)?;

    let mut payload = Payload::new();
    for (key, value) in object {
        let raw = value.get();
        let text = match raw.as_bytes().first() {
            Some(b'"') => serde_json::from_str::<String>(raw)?,
            Some(b'n' | b'[' | b'{') | None => continue,
            // Numbers and booleans are taken verbatim so `1547.30` stays `1547.30`.
            Some(_) => raw.to_string(),
        };
        payload.insert(key, text);
    }
    Ok(payload)
}

fn decode_form(body: &str) -> Payload {
    url::form_urlencoded::parse(body.as_bytes())
        .into_owned()
        .collect()
}
