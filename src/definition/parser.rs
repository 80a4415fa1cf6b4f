//! Filename grammar.
//!
//! ```text
//! dir/.../name[.METHOD][.STATUS][.{STATE|STATE...}].json
//! ```
//!
//! - Directory parts and `name` become the route pattern; `[id]` is a
//!   parameter, a `*` name is a trailing wildcard.
//! - `METHOD` is an uppercase HTTP verb, default GET.
//! - `STATUS` is a three-digit code, default 200.
//! - `{STATE}` tags the file as a named variant; `{A|B}` registers the same
//!   content under both tags. No tag marks the default variant.
//!
//! Tokens must appear in that order and at most once each.

use crate::definition::envelope;
use crate::definition::{DefinitionError, DefinitionErrorKind, ParsedDefinition, Variant};
use crate::routing::pattern::{is_identifier, RoutePattern, Segment};
use crate::routing::{HttpMethod, RouteKey};

const EXTENSION: &str = "json";
const DEFAULT_STATUS: u16 = 200;

/// A classified filename token. The discriminant order is the required
/// token order.
#[derive(Debug)]
enum Token {
    Method(HttpMethod),
    Status(u16),
    States(Vec<String>),
}

impl Token {
    fn position(&self) -> u8 {
        match self {
            Token::Method(_) => 0,
            Token::Status(_) => 1,
            Token::States(_) => 2,
        }
    }
}

/// Filename tokens after classification.
#[derive(Debug, Default)]
struct Tokens {
    method: Option<HttpMethod>,
    status: Option<u16>,
    states: Option<Vec<String>>,
}

/// Parse one definition file into route entries.
///
/// `path` is relative to the API root; both `/` and `\` are accepted as
/// separators. Returns one entry per state tag, or a single default entry.
pub fn parse_definition(path: &str, content: &str) -> Result<Vec<ParsedDefinition>, DefinitionError> {
    let file = normalize(path);
    parse_normalized(&file, content).map_err(|kind| DefinitionError::new(file.clone(), kind))
}

fn parse_normalized(file: &str, content: &str) -> Result<Vec<ParsedDefinition>, DefinitionErrorKind> {
    let (dirs, file_name) = match file.rsplit_once('/') {
        Some((dirs, name)) => (Some(dirs), name),
        None => (None, file),
    };

    let (stem, extension) = file_name
        .rsplit_once('.')
        .ok_or_else(|| DefinitionErrorKind::UnsupportedExtension(String::new()))?;
    if extension != EXTENSION {
        return Err(DefinitionErrorKind::UnsupportedExtension(extension.to_string()));
    }

    let mut parts = stem.split('.');
    let name = parts.next().unwrap_or_default();
    if name.is_empty() {
        return Err(DefinitionErrorKind::EmptyName);
    }
    let tokens = classify(parts)?;

    let mut segments = dirs
        .into_iter()
        .flat_map(|d| d.split('/'))
        .map(Segment::parse)
        .collect::<Result<Vec<_>, _>>()?;
    segments.push(Segment::parse(name)?);
    let pattern = RoutePattern::new(segments)?;

    let decoded = envelope::decode(content)?;
    let variant = Variant {
        status_code: decoded
            .status_code
            .or(tokens.status)
            .unwrap_or(DEFAULT_STATUS),
        headers: decoded.headers,
        content: content.to_string(),
        payload: decoded.payload,
    };

    let key = RouteKey {
        method: tokens.method.unwrap_or(HttpMethod::Get),
        pattern,
    };

    let entries = match tokens.states {
        None => vec![ParsedDefinition {
            key,
            tag: None,
            variant,
            source: file.to_string(),
        }],
        Some(states) => states
            .into_iter()
            .map(|state| ParsedDefinition {
                key: key.clone(),
                tag: Some(state),
                variant: variant.clone(),
                source: file.to_string(),
            })
            .collect(),
    };
    Ok(entries)
}

fn classify<'a>(raw: impl Iterator<Item = &'a str>) -> Result<Tokens, DefinitionErrorKind> {
    let mut tokens = Tokens::default();
    let mut next_position = 0;

    for text in raw {
        let token = classify_one(text)?;
        if token.position() < next_position {
            return Err(DefinitionErrorKind::MisplacedToken(text.to_string()));
        }
        next_position = token.position() + 1;

        match token {
            Token::Method(m) => tokens.method = Some(m),
            Token::Status(s) => tokens.status = Some(s),
            Token::States(s) => tokens.states = Some(s),
        }
    }
    Ok(tokens)
}

fn classify_one(text: &str) -> Result<Token, DefinitionErrorKind> {
    if let Some(inner) = text.strip_prefix('{').and_then(|t| t.strip_suffix('}')) {
        return parse_states(inner).map(Token::States);
    }
    if text.starts_with('{') || text.ends_with('}') {
        return Err(DefinitionErrorKind::InvalidStateTag(text.to_string()));
    }
    if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        return parse_status(text).map(Token::Status);
    }
    text.parse::<HttpMethod>()
        .map(Token::Method)
        .map_err(|_| DefinitionErrorKind::UnknownToken(text.to_string()))
}

fn parse_status(text: &str) -> Result<u16, DefinitionErrorKind> {
    text.parse::<u16>()
        .ok()
        .filter(|code| text.len() == 3 && (100..=999).contains(code))
        .ok_or_else(|| DefinitionErrorKind::InvalidStatus(text.to_string()))
}

fn parse_states(inner: &str) -> Result<Vec<String>, DefinitionErrorKind> {
    let mut states: Vec<String> = Vec::new();
    for name in inner.split('|') {
        if !is_identifier(name) || states.iter().any(|s| s == name) {
            return Err(DefinitionErrorKind::InvalidStateTag(format!("{{{}}}", inner)));
        }
        states.push(name.to_string());
    }
    Ok(states)
}

fn normalize(path: &str) -> String {
    let path = path.replace('\\', "/");
    let mut path = path.as_str();
    loop {
        if let Some(rest) = path.strip_prefix("./") {
            path = rest;
        } else if let Some(rest) = path.strip_prefix('/') {
            path = rest;
        } else {
            break;
        }
    }
    path.to_string()
}
