//! Shared query infrastructure: the [`Query`] trait, [`ParamValue`], and [`QueryParams`].

use std::fmt;

use url::Url;

/// Trait implemented by everything that contributes query-string parameters.
pub trait Query {
    /// Returns the ordered `(name, value)` pairs for this query.
    fn params(&self) -> QueryParams;

    /// Appends this query's parameters to the given URL, returning the modified URL.
    fn add_to_url(&self, url: &Url) -> Url {
        self.params().add_to_url(url)
    }
}

/// A single query-string value.
///
/// Booleans are rendered lower-case (`true`/`false`); everything else is
/// stringified as-is.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

/// Ordered list of query parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    pairs: Vec<(String, ParamValue)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter. Repeated names are kept in insertion order.
    pub fn with(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: &str, value: impl Into<ParamValue>) {
        self.pairs.push((name.to_string(), value.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns the rendered value of the first parameter named `name`.
    pub fn get(&self, name: &str) -> Option<String> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.to_string())
    }

    /// Appends every parameter to the URL's query string.
    pub fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        if self.pairs.is_empty() {
            return url;
        }
        {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &self.pairs {
                pairs.append_pair(name, &value.to_string());
            }
        }
        url
    }
}

impl Query for QueryParams {
    fn params(&self) -> QueryParams {
        self.clone()
    }
}
