//! Cache key builder
//!
//! Keys have the form `<kind>:<canonical JSON object>`. Parameter names go
//! through a `BTreeMap`, so the JSON object is always sorted by name and the
//! key is a pure function of the logical query.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::errors::KeyError;
use crate::query::ListQuery;
use crate::value::ParamValue;

/// Deterministic identifier of a resource query
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey {
    kind: String,
    encoded: String,
}

impl CacheKey {
    /// Resource kind the key was built for
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    pub fn into_string(self) -> String {
        self.encoded
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.encoded
    }
}

/// Builds cache keys, stripping values that mean "no filter"
#[derive(Debug, Clone, Default)]
pub struct KeyBuilder {
    sentinels: BTreeSet<String>,
}

impl KeyBuilder {
    /// Builder without sentinel values; only null and blank values are omitted
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder that also omits text values equal to one of `sentinels`.
    ///
    /// Sentinels and parameter text are both compared trimmed.
    pub fn with_sentinels<I, S>(sentinels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sentinels: sentinels
                .into_iter()
                .map(|s| s.into().trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn sentinels(&self) -> impl Iterator<Item = &str> {
        self.sentinels.iter().map(String::as_str)
    }

    pub fn is_sentinel(&self, value: &str) -> bool {
        self.sentinels.contains(value.trim())
    }

    /// Build the key for `kind` queried with `params`.
    ///
    /// Input order never affects the result. Duplicate names are rejected
    /// instead of silently keeping one of the values.
    pub fn build<I, K, V>(&self, kind: &str, params: I) -> Result<CacheKey, KeyError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParamValue>,
    {
        if kind.is_empty() || kind.contains(':') {
            return Err(KeyError::InvalidResourceKind(kind.to_string()));
        }

        let is_sentinel = |text: &str| self.is_sentinel(text);
        let mut seen = BTreeSet::new();
        let mut canonical = BTreeMap::new();

        for (name, value) in params {
            let name = name.into();
            if name.is_empty() {
                return Err(KeyError::EmptyParameterName);
            }
            if !seen.insert(name.clone()) {
                return Err(KeyError::DuplicateParameter(name));
            }
            if let Some(value) = value.into().canonical(&name, &is_sentinel)? {
                canonical.insert(name, value);
            }
        }

        let encoded = serde_json::to_string(&canonical)
            .map_err(|e| KeyError::Unsupported(e.to_string()))?;

        Ok(CacheKey {
            kind: kind.to_string(),
            encoded: format!("{}:{}", kind, encoded),
        })
    }

    /// Build the key for a typed list query
    pub fn build_query(&self, kind: &str, query: &ListQuery) -> Result<CacheKey, KeyError> {
        self.build(kind, query.to_params())
    }
}
