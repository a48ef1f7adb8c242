//! URL composition for Remo endpoints.
//!
//! Mirrors the backend's conventions: positional segments joined with `/`,
//! an optional trailing slash, and query values that are percent-encoded
//! per comma-separated piece so list filters stay readable on the server.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt::Display;

/// Characters left untouched in query values: unreserved characters and `/`.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'/');

fn quote(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

/// A single query parameter value.
///
/// Falsy values (empty string, empty list, zero, `false`, `None`) are
/// dropped from the rendered URL.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Str(String),
    List(Vec<String>),
    Int(i64),
    Float(f64),
    Bool(bool),
    None,
}

impl QueryValue {
    /// Render the value part of `key=value`, or `None` when omitted.
    pub fn render(&self) -> Option<String> {
        match self {
            QueryValue::Str(s) if s.is_empty() => None,
            QueryValue::Str(s) if s.contains(',') => {
                Some(s.split(',').map(quote).collect::<Vec<_>>().join(","))
            }
            QueryValue::Str(s) => Some(quote(s)),
            QueryValue::List(items) if items.is_empty() => None,
            QueryValue::List(items) => Some(
                items
                    .iter()
                    .map(|item| quote(item))
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            QueryValue::Int(0) | QueryValue::Bool(false) | QueryValue::None => None,
            QueryValue::Int(i) => Some(i.to_string()),
            QueryValue::Float(f) if *f == 0.0 => None,
            QueryValue::Float(f) => Some(f.to_string()),
            QueryValue::Bool(true) => Some("true".to_string()),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Str(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Str(value)
    }
}

impl From<&String> for QueryValue {
    fn from(value: &String) -> Self {
        QueryValue::Str(value.clone())
    }
}

macro_rules! int_query_value {
    ($($t:ty),*) => {
        $(
            impl From<$t> for QueryValue {
                fn from(value: $t) -> Self {
                    QueryValue::Int(i64::from(value))
                }
            }
        )*
    };
}

int_query_value!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for QueryValue {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or_else(|_| QueryValue::Str(value.to_string()), QueryValue::Int)
    }
}

impl From<usize> for QueryValue {
    fn from(value: usize) -> Self {
        i64::try_from(value).map_or_else(|_| QueryValue::Str(value.to_string()), QueryValue::Int)
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        QueryValue::Float(value)
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Bool(value)
    }
}

impl<T: ToString> From<Vec<T>> for QueryValue {
    fn from(values: Vec<T>) -> Self {
        QueryValue::List(values.iter().map(ToString::to_string).collect())
    }
}

impl<T: ToString> From<&[T]> for QueryValue {
    fn from(values: &[T]) -> Self {
        QueryValue::List(values.iter().map(ToString::to_string).collect())
    }
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(QueryValue::None, Into::into)
    }
}

/// Builder for a full request URL.
///
/// ```ignore
/// let url = UrlBuilder::new("https://remo.example.com")
///     .segment("api/v1/ui/datasets/")
///     .segment(12)
///     .query("limit", 20)
///     .build();
/// assert_eq!(url, "https://remo.example.com/api/v1/ui/datasets/12/?limit=20");
/// ```
#[derive(Debug, Clone, Default)]
pub struct UrlBuilder {
    segments: Vec<String>,
    params: Vec<(String, QueryValue)>,
    tail_slash: Option<bool>,
}

impl UrlBuilder {
    /// Start a URL from the server base.
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            segments: vec![base.into()],
            ..Self::default()
        }
    }

    /// Append a positional path segment.
    #[must_use]
    pub fn segment(mut self, segment: impl Display) -> Self {
        self.segments.push(segment.to_string());
        self
    }

    /// Append a segment if present; `None` leaves no trace in the path.
    #[must_use]
    pub fn opt_segment<T: Display>(self, segment: Option<T>) -> Self {
        match segment {
            Some(segment) => self.segment(segment),
            None => self,
        }
    }

    /// Add a query parameter. Parameters render in insertion order.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Force the trailing slash on or off.
    ///
    /// Without this, the URL ends with `/` when the last segment did.
    #[must_use]
    pub fn tail_slash(mut self, tail_slash: bool) -> Self {
        self.tail_slash = Some(tail_slash);
        self
    }

    pub fn build(&self) -> String {
        let tail_slash = self.tail_slash.unwrap_or_else(|| {
            self.segments
                .last()
                .is_some_and(|segment| segment.ends_with('/'))
        });

        let mut url = self
            .segments
            .iter()
            .map(|segment| segment.trim_matches('/'))
            .collect::<Vec<_>>()
            .join("/");

        let params = self
            .params
            .iter()
            .filter_map(|(key, value)| value.render().map(|value| format!("{key}={value}")))
            .collect::<Vec<_>>();

        if !params.is_empty() {
            let separator = if url.contains('?') { "&" } else { "/?" };
            url.push_str(separator);
            url.push_str(&params.join("&"));
        } else if tail_slash && !url.contains('?') {
            url.push('/');
        }

        url
    }
}

impl Display for UrlBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.build())
    }
}
