//! Query-string encoding for per-operation options.
//!
//! Option structs list the parameters they recognize through
//! [`QueryOptions::query_params`]; unset options never reach the query string.

use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Typed value of a single query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Str(String),
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Bool(value) => write!(f, "{value}"),
            QueryValue::Int(value) => write!(f, "{value}"),
            QueryValue::UInt(value) => write!(f, "{value}"),
            QueryValue::Str(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParam {
    pub name: &'static str,
    pub value: QueryValue,
}

/// Implemented by every options object that can be sent as a query string.
pub trait QueryOptions {
    /// The options that are set, each name at most once.
    fn query_params(&self) -> Vec<QueryParam>;
}

/// Collects set options. `None` values are skipped and a repeated name
/// replaces the earlier value.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    params: Vec<QueryParam>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bool(self, name: &'static str, value: Option<bool>) -> Self {
        self.push(name, value.map(QueryValue::Bool))
    }

    pub fn int(self, name: &'static str, value: Option<i64>) -> Self {
        self.push(name, value.map(QueryValue::Int))
    }

    pub fn uint(self, name: &'static str, value: Option<u64>) -> Self {
        self.push(name, value.map(QueryValue::UInt))
    }

    /// An empty string counts as unset.
    pub fn str(self, name: &'static str, value: Option<&str>) -> Self {
        let value = value.filter(|v| !v.is_empty());
        self.push(name, value.map(|v| QueryValue::Str(v.to_string())))
    }

    pub fn build(self) -> Vec<QueryParam> {
        self.params
    }

    fn push(mut self, name: &'static str, value: Option<QueryValue>) -> Self {
        if let Some(value) = value {
            self.params.retain(|param| param.name != name);
            self.params.push(QueryParam { name, value });
        }
        self
    }
}

/// Renders options as `name=value&name=value`. Returns an empty string when
/// no option is set.
pub fn encode_query<O: QueryOptions + ?Sized>(options: &O) -> String {
    options
        .query_params()
        .iter()
        .map(|param| format!("{}={}", percent_encode(param.name), percent_encode(&param.value.to_string())))
        .collect::<Vec<_>>()
        .join("&")
}

/// RFC 3986 unreserved characters pass through: ALPHA / DIGIT / "-" / "." / "_" / "~"
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Percent-encode a string per RFC 3986, keeping only unreserved characters.
pub fn percent_encode(s: &str) -> String {
    utf8_percent_encode(s, UNRESERVED).to_string()
}

/// Encodes an identifier for use as a single path segment.
pub fn path_segment(s: &str) -> String {
    percent_encode(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct SampleOptions {
        exclude_system: Option<bool>,
        batch_size: Option<u64>,
        offset: Option<i64>,
        collection: Option<String>,
    }

    impl QueryOptions for SampleOptions {
        fn query_params(&self) -> Vec<QueryParam> {
            QueryParams::new()
                .bool("excludeSystem", self.exclude_system)
                .uint("batchSize", self.batch_size)
                .int("offset", self.offset)
                .str("collection", self.collection.as_deref())
                .build()
        }
    }

    #[test]
    fn absent_options_are_omitted() {
        assert_eq!(encode_query(&SampleOptions::default()), "");

        let options = SampleOptions {
            batch_size: Some(10),
            ..Default::default()
        };
        assert_eq!(encode_query(&options), "batchSize=10");
    }

    #[test]
    fn every_supplied_option_appears_exactly_once() {
        let options = SampleOptions {
            exclude_system: Some(false),
            batch_size: Some(0),
            offset: Some(-3),
            collection: Some("c".to_string()),
        };
        let query = encode_query(&options);
        let pairs: Vec<&str> = query.split('&').collect();
        assert_eq!(pairs, vec!["excludeSystem=false", "batchSize=0", "offset=-3", "collection=c"]);
    }

    #[test]
    fn empty_string_is_never_sent_as_placeholder() {
        let options = SampleOptions {
            collection: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(encode_query(&options), "");
    }

    #[test]
    fn every_subset_of_options_round_trips() {
        for mask in 0u8..16 {
            let options = SampleOptions {
                exclude_system: (mask & 1 != 0).then_some(true),
                batch_size: (mask & 2 != 0).then_some(5),
                offset: (mask & 4 != 0).then_some(7),
                collection: (mask & 8 != 0).then(|| "c".to_string()),
            };
            let query = encode_query(&options);
            let names: Vec<&str> = query
                .split('&')
                .filter(|pair| !pair.is_empty())
                .map(|pair| pair.split('=').next().unwrap_or_default())
                .collect();
            assert_eq!(names.len(), mask.count_ones() as usize, "mask {mask}: {query}");
            for name in ["excludeSystem", "batchSize", "offset", "collection"] {
                assert!(names.iter().filter(|n| **n == name).count() <= 1, "mask {mask}: {query}");
            }
        }
    }

    #[test]
    fn repeated_name_keeps_last_value() {
        let params = QueryParams::new()
            .bool("returnNew", Some(true))
            .bool("returnNew", Some(false))
            .build();
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].value, QueryValue::Bool(false));
    }

    #[test]
    fn strings_are_percent_encoded() {
        assert_eq!(percent_encode("hello world"), "hello%20world");
        assert_eq!(percent_encode("a=b&c/d"), "a%3Db%26c%2Fd");
        assert_eq!(percent_encode("test-_.~"), "test-_.~");
        assert_eq!(percent_encode("é"), "%C3%A9");
        assert_eq!(path_segment("a b/c"), "a%20b%2Fc");

        let options = SampleOptions {
            collection: Some("my coll&x".to_string()),
            ..Default::default()
        };
        assert_eq!(encode_query(&options), "collection=my%20coll%26x");
    }
}
