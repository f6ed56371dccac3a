//! Route pattern tokenizing and typed placeholder coercion.
//!
//! A pattern is either matched verbatim (no `:` anywhere) or split into
//! segments, where a segment containing `:` is a `{type:name}` placeholder.
//! Only one trailing dot-suffix per pattern is recognised: `/file/{string:name}.{string:ext}`
//! splits at the last dot of the final path segment, and a dot anywhere else
//! is part of a literal or a value.

use std::{collections::BTreeMap, fmt, str::FromStr};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::core::{ResolveError, ResolveResult};

static INT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?[0-9]+$").expect("Invalid regex pattern for int placeholders")
});
static FLOAT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?[0-9]+\.[0-9]+$").expect("Invalid regex pattern for float placeholders")
});
static STRING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z]+$").expect("Invalid regex pattern for string placeholders")
});

/// Value captured from a placeholder segment
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ParamValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ParamValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Int(i) => write!(f, "{i}"),
            ParamValue::Float(x) => write!(f, "{x}"),
            ParamValue::Str(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaceholderType {
    Bool,
    Int,
    Float,
    Str,
}

impl FromStr for PlaceholderType {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bool" => Ok(PlaceholderType::Bool),
            "int" | "integer" => Ok(PlaceholderType::Int),
            "float" => Ok(PlaceholderType::Float),
            "string" => Ok(PlaceholderType::Str),
            other => Err(ResolveError::UnknownPlaceholderType(other.to_string())),
        }
    }
}

impl PlaceholderType {
    /// Coerce a raw path segment, or `None` if it does not fit the type
    pub fn coerce(self, raw: &str) -> Option<ParamValue> {
        match self {
            PlaceholderType::Bool => match raw {
                "true" => Some(ParamValue::Bool(true)),
                "false" => Some(ParamValue::Bool(false)),
                _ => None,
            },
            PlaceholderType::Int if INT_RE.is_match(raw) => raw.parse().ok().map(ParamValue::Int),
            PlaceholderType::Float if FLOAT_RE.is_match(raw) => {
                raw.parse().ok().map(ParamValue::Float)
            }
            PlaceholderType::Str if STRING_RE.is_match(raw) => Some(ParamValue::Str(raw.to_string())),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Segment {
    Literal(String),
    Placeholder { ty: PlaceholderType, name: String },
}

impl Segment {
    fn parse(raw: &str) -> ResolveResult<Self> {
        if !raw.contains(':') {
            return Ok(Segment::Literal(raw.to_string()));
        }

        let stripped = raw.replace(['{', '}'], "");
        let mut parts = stripped.split(':');
        let ty = parts.next().unwrap_or_default().parse()?;
        let name = parts.next().unwrap_or_default().to_string();
        Ok(Segment::Placeholder { ty, name })
    }
}

/// A compiled route pattern
#[derive(Clone, Debug, PartialEq)]
pub enum Pattern {
    /// No placeholders: the path must equal the pattern
    Exact(String),
    Segmented {
        segments: Vec<Segment>,
        /// The last segment was split off at a trailing dot
        suffixed: bool,
    },
}

impl Pattern {
    /// Compile a pattern. Unknown placeholder types fail here.
    pub fn compile(raw: &str) -> ResolveResult<Self> {
        if !raw.contains(':') {
            return Ok(Pattern::Exact(raw.to_string()));
        }

        let suffixed = has_suffix(raw);
        let segments = split_segments(raw, suffixed)
            .unwrap_or_default()
            .into_iter()
            .map(Segment::parse)
            .collect::<ResolveResult<Vec<_>>>()?;

        Ok(Pattern::Segmented { segments, suffixed })
    }

    /// Match a request path, returning the captured parameters.
    ///
    /// Parameters are only returned when every segment matched.
    pub fn match_path(&self, path: &str) -> Option<BTreeMap<String, ParamValue>> {
        match self {
            Pattern::Exact(raw) => (raw == path).then(BTreeMap::new),
            Pattern::Segmented { segments, suffixed } => {
                let parts = split_segments(path, *suffixed)?;
                if parts.len() != segments.len() {
                    return None;
                }

                let mut params = BTreeMap::new();
                for (segment, part) in segments.iter().zip(parts) {
                    match segment {
                        Segment::Literal(literal) if literal == part => {}
                        Segment::Literal(_) => return None,
                        Segment::Placeholder { ty, name } => {
                            params.insert(name.clone(), ty.coerce(part)?);
                        }
                    }
                }
                Some(params)
            }
        }
    }
}

/// Whether the final path segment carries a dot-suffix
fn has_suffix(path: &str) -> bool {
    path.rsplit('/').next().is_some_and(|last| last.contains('.'))
}

/// Split on `/`, dropping the segment before the leading slash. With
/// `suffixed`, the last segment is further split at its last dot; a path
/// without such a dot cannot match and yields `None`.
pub fn split_segments(path: &str, suffixed: bool) -> Option<Vec<&str>> {
    if !suffixed {
        return Some(path.split('/').skip(1).collect());
    }

    if !has_suffix(path) {
        return None;
    }
    let (body, suffix) = path.rsplit_once('.')?;
    let mut parts: Vec<&str> = body.split('/').skip(1).collect();
    parts.push(suffix);
    Some(parts)
}
