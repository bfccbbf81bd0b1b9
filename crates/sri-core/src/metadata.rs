//! A single integrity metadata entry (e.g. "sha256-abc...?opt").

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::algorithm::HashAlgorithm;
use crate::grammar;

/// Unvalidated entry fields, as a caller might build them by hand.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataFields {
    /// Algorithm identifier; may be empty or unsupported
    pub alg: String,
    /// Base64-encoded digest
    pub val: String,
    #[serde(default)]
    pub opt: Vec<String>,
}

impl MetadataFields {
    pub fn new(alg: &str, val: &str) -> Self {
        Self {
            alg: alg.to_string(),
            val: val.to_string(),
            opt: Vec::new(),
        }
    }

    pub fn with_options<I, S>(mut self, opt: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.opt = opt.into_iter().map(Into::into).collect();
        self
    }

    /// Canonical token for these fields, or "" when they cannot form one.
    pub fn stringify(&self) -> String {
        grammar::stringify(&self.alg, &self.val, &self.opt)
    }
}

/// Parsed integrity metadata. Immutable once built; malformed input produces the
/// empty entry instead of an error.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct IntegrityMetadata {
    algorithm: Option<HashAlgorithm>,
    value: String,
    options: Vec<String>,
}

impl IntegrityMetadata {
    pub(crate) fn from_parts(
        algorithm: Option<HashAlgorithm>,
        value: String,
        options: Vec<String>,
    ) -> Self {
        Self {
            algorithm,
            value,
            options,
        }
    }

    /// Parse a token such as "sha256-MV9b...=".
    pub fn parse(token: &str) -> Self {
        grammar::parse(token)
    }

    /// Build from structured fields. The fields go through the grammar untrimmed, so a
    /// value that is not base64-shaped (surrounding white space included) still yields
    /// the empty entry.
    pub fn from_fields(fields: &MetadataFields) -> Self {
        grammar::parse_exact(&fields.stringify())
    }

    /// Build from a known algorithm and base64 value.
    pub fn new(algorithm: HashAlgorithm, value: &str, options: &[String]) -> Self {
        grammar::parse_exact(&grammar::stringify(algorithm.name(), value, options))
    }

    pub fn algorithm(&self) -> Option<HashAlgorithm> {
        self.algorithm
    }

    /// Algorithm identifier, or "" for the empty entry.
    pub fn algorithm_name(&self) -> &'static str {
        self.algorithm.map(|a| a.name()).unwrap_or("")
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// True when both algorithm and value are present.
    pub fn is_valid(&self) -> bool {
        self.algorithm.is_some() && !self.value.is_empty()
    }

    /// Whether `other` names the same digest as this entry.
    ///
    /// Options are ignored. An invalid entry on either side never matches, so two
    /// empty entries do not match each other.
    pub fn matches<T: Into<IntegrityMetadata>>(&self, other: T) -> bool {
        self.matches_entry(&other.into())
    }

    pub(crate) fn matches_entry(&self, other: &IntegrityMetadata) -> bool {
        if !other.is_valid() {
            return false;
        }
        other.algorithm == self.algorithm && other.value == self.value
    }

    /// Fields view of this entry.
    pub fn to_fields(&self) -> MetadataFields {
        MetadataFields {
            alg: self.algorithm_name().to_string(),
            val: self.value.clone(),
            opt: self.options.clone(),
        }
    }
}

impl fmt::Display for IntegrityMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&grammar::stringify(
            self.algorithm_name(),
            &self.value,
            &self.options,
        ))
    }
}

impl From<&str> for IntegrityMetadata {
    fn from(token: &str) -> Self {
        Self::parse(token)
    }
}

impl From<String> for IntegrityMetadata {
    fn from(token: String) -> Self {
        Self::parse(&token)
    }
}

impl From<&String> for IntegrityMetadata {
    fn from(token: &String) -> Self {
        Self::parse(token)
    }
}

impl From<MetadataFields> for IntegrityMetadata {
    fn from(fields: MetadataFields) -> Self {
        Self::from_fields(&fields)
    }
}

impl From<&MetadataFields> for IntegrityMetadata {
    fn from(fields: &MetadataFields) -> Self {
        Self::from_fields(fields)
    }
}

impl From<&IntegrityMetadata> for IntegrityMetadata {
    fn from(entry: &IntegrityMetadata) -> Self {
        entry.clone()
    }
}

impl<T: Into<IntegrityMetadata>> From<Option<T>> for IntegrityMetadata {
    fn from(input: Option<T>) -> Self {
        input.map(Into::into).unwrap_or_default()
    }
}

impl Serialize for IntegrityMetadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for IntegrityMetadata {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Ok(Self::parse(&token))
    }
}
