//! Request matchers for routes where authentication is optional.
//!
//! Syntax: `[METHOD ]/path/pattern`. Path segments match literally, except:
//! - `*` and `{name}` match exactly one segment
//! - `**` matches zero or more segments
//!
//! Paths are not normalized: an empty segment (`//`, trailing `/`) only matches
//! an empty literal or a wildcard, the same way the router treats it.

use std::fmt;
use std::str::FromStr;

use axum::http::Method;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RouteMatcherError {
    #[error("empty route pattern")]
    Empty,
    #[error("invalid HTTP method in route pattern: {0}")]
    InvalidMethod(String),
    #[error("route pattern must start with '/': {0}")]
    NotAbsolute(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    AnyOne,
    AnyMany,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatcher {
    method: Option<Method>,
    segments: Vec<Segment>,
    pattern: String,
}

impl RouteMatcher {
    pub fn matches(&self, method: &Method, path: &str) -> bool {
        if let Some(expected) = &self.method {
            if expected != method {
                return false;
            }
        }

        let path: Vec<&str> = split_path(path).collect();
        matches_segments(&self.segments, &path)
    }

    /// Parse a comma separated list, skipping blank entries.
    pub fn parse_list(raw: &str) -> Result<Vec<RouteMatcher>, RouteMatcherError> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl FromStr for RouteMatcher {
    type Err = RouteMatcherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut parts = s.split_whitespace();
        let (method, pattern) = match (parts.next(), parts.next()) {
            (None, _) => return Err(RouteMatcherError::Empty),
            (Some(pattern), None) => (None, pattern),
            (Some(method), Some(pattern)) => {
                let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
                    .map_err(|_| RouteMatcherError::InvalidMethod(method.to_string()))?;
                (Some(method), pattern)
            }
        };

        if !pattern.starts_with('/') {
            return Err(RouteMatcherError::NotAbsolute(pattern.to_string()));
        }

        let segments = split_path(pattern)
            .map(|segment| match segment {
                "**" => Segment::AnyMany,
                "*" => Segment::AnyOne,
                s if s.starts_with('{') && s.ends_with('}') => Segment::AnyOne,
                s => Segment::Literal(s.to_string()),
            })
            .collect();

        Ok(Self {
            method,
            segments,
            pattern: pattern.to_string(),
        })
    }
}

impl fmt::Display for RouteMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.method {
            Some(method) => write!(f, "{} {}", method, self.pattern),
            None => f.write_str(&self.pattern),
        }
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.strip_prefix('/').unwrap_or(path).split('/')
}

impl Segment {
    fn accepts(&self, segment: &str) -> bool {
        match self {
            Segment::Literal(literal) => literal == segment,
            Segment::AnyOne | Segment::AnyMany => true,
        }
    }
}

// Glob match over segments. On a mismatch, fall back to the most recent `**` and let it
// absorb one more segment; earlier `**`s never need revisiting, so this is O(pattern * path).
fn matches_segments(pattern: &[Segment], path: &[&str]) -> bool {
    let (mut p, mut s) = (0, 0);
    // (pattern index after the last `**`, path index it resumed from)
    let mut resume: Option<(usize, usize)> = None;

    while s < path.len() {
        match pattern.get(p) {
            Some(Segment::AnyMany) => {
                p += 1;
                resume = Some((p, s));
                continue;
            }
            Some(segment) if segment.accepts(path[s]) => {
                p += 1;
                s += 1;
                continue;
            }
            _ => {}
        }

        match resume {
            Some((after_star, from)) => {
                p = after_star;
                s = from + 1;
                resume = Some((after_star, s));
            }
            None => return false,
        }
    }

    pattern[p..].iter().all(|segment| *segment == Segment::AnyMany)
}
