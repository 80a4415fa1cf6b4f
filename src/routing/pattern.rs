//! Route patterns and their segments.
//!
//! A pattern is an ordered list of segments, each literal text, a named
//! parameter (`[name]`) or a trailing wildcard (`*`). Patterns render back to
//! their source form (`/users/[userid]`, `/comments/*`), which is also the key
//! used by the active-state list and the routes snapshot.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Path-variable values captured while matching, keyed by parameter name.
pub type Captures = BTreeMap<String, String>;

/// Errors raised while building a pattern from raw segments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern has no segments")]
    Empty,

    #[error("empty path segment")]
    EmptySegment,

    #[error("malformed path segment `{0}`")]
    MalformedSegment(String),

    #[error("invalid parameter name `{0}`")]
    InvalidParamName(String),

    #[error("parameter `{0}` appears more than once")]
    DuplicateParam(String),

    #[error("wildcard `*` is only allowed as the last segment")]
    WildcardNotLast,
}

/// One segment of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    Literal(String),
    Param(String),
    Wildcard,
}

impl Segment {
    /// Parse a single raw segment (`users`, `[userid]` or `*`).
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        if raw.is_empty() {
            return Err(PatternError::EmptySegment);
        }
        if raw == "*" {
            return Ok(Segment::Wildcard);
        }
        if let Some(name) = raw.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            if !is_identifier(name) {
                return Err(PatternError::InvalidParamName(name.to_string()));
            }
            return Ok(Segment::Param(name.to_string()));
        }
        if raw.contains(['[', ']', '*', '{', '}']) {
            return Err(PatternError::MalformedSegment(raw.to_string()));
        }
        Ok(Segment::Literal(raw.to_string()))
    }

    /// Specificity rank: literal > parameter > wildcard.
    pub(crate) fn rank(&self) -> u8 {
        match self {
            Segment::Literal(_) => 2,
            Segment::Param(_) => 1,
            Segment::Wildcard => 0,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal(text) => f.write_str(text),
            Segment::Param(name) => write!(f, "[{}]", name),
            Segment::Wildcard => f.write_str("*"),
        }
    }
}

/// Shape of a segment with parameter names erased.
///
/// Two patterns with equal shapes match exactly the same paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Shape<'a> {
    Literal(&'a str),
    Param,
    Wildcard,
}

/// A validated route pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoutePattern {
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Build a pattern from parsed segments.
    pub fn new(segments: Vec<Segment>) -> Result<Self, PatternError> {
        if segments.is_empty() {
            return Err(PatternError::Empty);
        }
        let last = segments.len() - 1;
        let mut seen: Vec<&str> = Vec::new();
        for (i, segment) in segments.iter().enumerate() {
            match segment {
                Segment::Wildcard if i != last => return Err(PatternError::WildcardNotLast),
                Segment::Param(name) => {
                    if seen.contains(&name.as_str()) {
                        return Err(PatternError::DuplicateParam(name.clone()));
                    }
                    seen.push(name);
                }
                _ => {}
            }
        }
        Ok(Self { segments })
    }

    /// Parse a pattern written in its rendered form, e.g. `/users/[userid]`.
    ///
    /// Leading and trailing slashes are optional.
    pub fn parse(path: &str) -> Result<Self, PatternError> {
        let segments = path
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .map(Segment::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(segments)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Parameter names in declaration order.
    pub fn params(&self) -> Vec<String> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Param(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn has_wildcard(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::Wildcard))
    }

    pub(crate) fn shape(&self) -> Vec<Shape<'_>> {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Literal(text) => Shape::Literal(text),
                Segment::Param(_) => Shape::Param,
                Segment::Wildcard => Shape::Wildcard,
            })
            .collect()
    }

    /// Match already-split path segments, returning the captured parameters.
    ///
    /// Literal segments compare case-sensitively, parameters bind exactly one
    /// segment and a trailing wildcard absorbs zero or more remaining segments.
    pub fn captures(&self, path: &[&str]) -> Option<Captures> {
        let mut captures = Captures::new();
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Wildcard => return Some(captures),
                Segment::Literal(text) => {
                    if path.get(i) != Some(&text.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = path.get(i)?;
                    captures.insert(name.clone(), (*value).to_string());
                }
            }
        }
        (path.len() == self.segments.len()).then_some(captures)
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

impl Serialize for RoutePattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Split a concrete request path into its non-empty segments.
///
/// `/users/` and `/users` both yield `["users"]`.
pub fn split_path(path: &str) -> Vec<&str> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/').filter(|s| !s.is_empty()).collect()
}

pub(crate) fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
