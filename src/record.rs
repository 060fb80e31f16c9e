//! Decoded form submissions.
//!
//! A submission arrives as `k1=v1&k2=v2` in form encoding. The whole text is
//! form-decoded first (`+` is a space, then percent escapes), and only then
//! split on `&` and on the first `=` of each segment. An encoded `%26` or
//! `%3D` inside a value therefore acts as a separator.
//!
//! Bytes that are not valid UTF-8 after decoding, such as an escape sequence
//! cut short by datagram truncation, become U+FFFD instead of failing.

use std::collections::BTreeMap;
use std::fmt::Display;

use chrono::{DateTime, TimeZone};
use serde::Serialize;

use crate::error::{Error, Result};

/// Field injected at persistence time.
pub const DATE_FIELD: &str = "date";

/// `2024-05-01 13:45:07.123456`
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// A field-name to field-value mapping decoded from one submission.
///
/// Duplicate keys are not an error: later occurrences overwrite earlier ones.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    /// Decodes a form body. Fails on a segment without `=`; no partial
    /// record is produced.
    pub fn parse(text: &str) -> Result<Self> {
        let spaced = text.replace('+', " ");
        let bytes = urlencoding::decode_binary(spaced.as_bytes());
        let decoded = String::from_utf8_lossy(&bytes);

        let mut fields = BTreeMap::new();
        for segment in decoded.split('&') {
            let (key, value) = segment
                .split_once('=')
                .ok_or_else(|| Error::Parse(format!("segment `{segment}` has no `=`")))?;
            fields.insert(key.to_owned(), value.to_owned());
        }
        Ok(Self { fields })
    }

    /// Sets the `date` field to `now` with microsecond precision, replacing
    /// any submitted `date`.
    pub fn stamp<Tz>(&mut self, now: DateTime<Tz>)
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        self.fields.insert(DATE_FIELD.to_owned(), now.format(DATE_FORMAT).to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize { self.fields.len() }
    pub fn is_empty(&self) -> bool { self.fields.is_empty() }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// The JSON object stored for this record.
    pub fn to_document(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}
