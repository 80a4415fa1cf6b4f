//! Extended-envelope decoding.
//!
//! A definition file whose JSON content is a non-empty object made only of
//! the reserved keys `__body`, `__header` and `__statusCode` is an extended
//! envelope. Anything else is a plain body served verbatim.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::definition::Payload;

pub const BODY_KEY: &str = "__body";
pub const HEADER_KEY: &str = "__header";
pub const STATUS_CODE_KEY: &str = "__statusCode";

const RESERVED_KEYS: [&str; 3] = [BODY_KEY, HEADER_KEY, STATUS_CODE_KEY];

/// Errors found while decoding file content.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("invalid JSON content: {0}")]
    Json(#[from] serde_json::Error),

    #[error("`__header` must be an object")]
    HeaderNotObject,

    #[error("header `{0}` must be a string, number or boolean")]
    HeaderValue(String),

    #[error("`__statusCode` must be an integer between 100 and 999")]
    StatusCode,
}

/// Decoded file content, ready to be merged with the filename tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub payload: Payload,
    pub headers: BTreeMap<String, String>,
    pub status_code: Option<u16>,
}

/// Decode raw file content into a payload.
///
/// Whitespace-only content yields a plain payload without a body.
pub fn decode(content: &str) -> Result<Decoded, EnvelopeError> {
    if content.trim().is_empty() {
        return Ok(Decoded {
            payload: Payload::Plain { body: None },
            headers: BTreeMap::new(),
            status_code: None,
        });
    }

    let value: Value = serde_json::from_str(content)?;
    match value {
        Value::Object(map) if is_envelope(&map) => decode_envelope(map),
        body => Ok(Decoded {
            payload: Payload::Plain { body: Some(body) },
            headers: BTreeMap::new(),
            status_code: None,
        }),
    }
}

fn is_envelope(map: &Map<String, Value>) -> bool {
    !map.is_empty() && map.keys().all(|k| RESERVED_KEYS.contains(&k.as_str()))
}

fn decode_envelope(mut map: Map<String, Value>) -> Result<Decoded, EnvelopeError> {
    let headers = match map.remove(HEADER_KEY) {
        None | Some(Value::Null) => BTreeMap::new(),
        Some(Value::Object(header)) => header
            .into_iter()
            .map(|(name, value)| {
                let value = match value {
                    Value::String(s) => s,
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    _ => return Err(EnvelopeError::HeaderValue(name)),
                };
                Ok((name, value))
            })
            .collect::<Result<_, _>>()?,
        Some(_) => return Err(EnvelopeError::HeaderNotObject),
    };

    let status_code = match map.remove(STATUS_CODE_KEY) {
        None | Some(Value::Null) => None,
        Some(value) => Some(
            value
                .as_u64()
                .filter(|code| (100..=999).contains(code))
                .and_then(|code| u16::try_from(code).ok())
                .ok_or(EnvelopeError::StatusCode)?,
        ),
    };

    Ok(Decoded {
        payload: Payload::Extended {
            body: map.remove(BODY_KEY),
        },
        headers,
        status_code,
    })
}
