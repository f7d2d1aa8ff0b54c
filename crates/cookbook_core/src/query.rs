//! crates/cookbook_core/src/query.rs
//!
//! Decodes raw `application/x-www-form-urlencoded` query strings into
//! name/value pairs that the handlers read filters and identifiers from.

use std::str::FromStr;

use crate::ports::{PortError, PortResult};

/// The decoded parameters of a single query string, in their original order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryItems {
    pairs: Vec<(String, String)>,
}

impl QueryItems {
    /// Parses a raw query string. A leading `?` is ignored, `+` decodes to a
    /// space and a key without `=` carries the empty value.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        let pairs = raw
            .split('&')
            .filter(|segment| !segment.is_empty())
            .map(|segment| match segment.split_once('=') {
                Some((key, value)) => (decode_component(key), decode_component(value)),
                None => (decode_component(segment), String::new()),
            })
            .collect();
        Self { pairs }
    }

    /// The first value given for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Like [`QueryItems::get`], but an empty value counts as absent.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// Converts the (non-empty) value of `key` to a number.
    pub fn number<T: FromStr>(&self, key: &str) -> PortResult<Option<T>> {
        self.get_non_empty(key)
            .map(|raw| {
                raw.trim().parse::<T>().map_err(|_| {
                    PortError::BadRequest(format!("'{}' is not a valid number for {}", raw, key))
                })
            })
            .transpose()
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}
