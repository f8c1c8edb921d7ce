use std::ffi::CStr;

use serde::{Deserialize, Serialize};

use crate::ffi::RawParams;

/// Ordered key/value parameters handed to an application at initialization.
///
/// Keys may repeat; lookups return the last occurrence, matching a
/// front-to-back scan where later entries override earlier ones.
/// Serializes as a list of `[key, value]` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppParams {
    pairs: Vec<(String, String)>,
}

impl AppParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Copies a sentinel-terminated C parameter list.
    ///
    /// Pairs with a null key are skipped; a null value reads as "".
    ///
    /// # Safety
    /// `params` must be null or point to an array of pointers terminated by
    /// a null entry, each non-null entry pointing to two C strings.
    pub unsafe fn from_raw(params: RawParams) -> Self {
        let mut result = AppParams::new();
        if params.is_null() {
            return result;
        }

        let mut cursor = params;
        while !(*cursor).is_null() {
            let pair = *cursor;
            let key = *pair;
            let value = *pair.add(1);
            if !key.is_null() {
                let value = if value.is_null() {
                    String::new()
                } else {
                    CStr::from_ptr(value).to_string_lossy().into_owned()
                };
                result.push(CStr::from_ptr(key).to_string_lossy().into_owned(), value);
            }
            cursor = cursor.add(1);
        }
        result
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AppParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        AppParams {
            pairs: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
