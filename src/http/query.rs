//! Query string parsing
//!
//! `application/x-www-form-urlencoded` parameters; the first occurrence of a
//! repeated name wins.

use crate::error::{FileServerError, Result};
use std::borrow::Cow;

/// Decoded query parameters of one request
#[derive(Debug, Default)]
pub struct QueryParams<'a> {
    pairs: Vec<(Cow<'a, str>, Cow<'a, str>)>,
}

impl<'a> QueryParams<'a> {
    pub fn parse(query: Option<&'a str>) -> Self {
        Self {
            pairs: query
                .map(|q| form_urlencoded::parse(q.as_bytes()).collect())
                .unwrap_or_default(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_ref())
    }

    /// Parameter that must be present (may be empty)
    pub fn required(&self, name: &'static str) -> Result<&str> {
        self.get(name)
            .ok_or(FileServerError::MissingParameter(name))
    }

    /// Optional non-negative integer; empty counts as absent
    pub fn optional_u64(&self, name: &'static str) -> Result<Option<u64>> {
        match self.get(name).map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => value
                .parse::<u64>()
                .map(Some)
                .map_err(|_| FileServerError::InvalidParameter {
                    name,
                    value: value.to_string(),
                }),
        }
    }

    pub fn u64_or(&self, name: &'static str, default: u64) -> Result<u64> {
        Ok(self.optional_u64(name)?.unwrap_or(default))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoding() {
        let params = QueryParams::parse(Some("path=jobs%2F1%20a.log&offset=10&x=a+b"));
        assert_eq!(params.get("path"), Some("jobs/1 a.log"));
        assert_eq!(params.get("x"), Some("a b"));
        assert_eq!(params.u64_or("offset", 0).unwrap(), 10);
        assert_eq!(params.optional_u64("length").unwrap(), None);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let params = QueryParams::parse(Some("path=a.log&path=b.log"));
        assert_eq!(params.get("path"), Some("a.log"));
    }

    #[test]
    fn test_missing_and_invalid() {
        let params = QueryParams::parse(None);
        assert!(matches!(
            params.required("path"),
            Err(FileServerError::MissingParameter("path"))
        ));

        let params = QueryParams::parse(Some("offset=-1&length=abc&empty="));
        assert!(matches!(
            params.u64_or("offset", 0),
            Err(FileServerError::InvalidParameter { name: "offset", .. })
        ));
        assert!(matches!(
            params.optional_u64("length"),
            Err(FileServerError::InvalidParameter { name: "length", .. })
        ));
        assert_eq!(params.optional_u64("empty").unwrap(), None);
    }
}
