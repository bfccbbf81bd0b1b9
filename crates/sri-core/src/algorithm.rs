//! Supported hash algorithms for Subresource Integrity.
//! See https://www.w3.org/TR/CSP2/#hash_algo

use std::fmt;

use serde::{Deserialize, Serialize};

/// Supported hash algorithms. Declaration order is ascending strength.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    /// Every supported algorithm, weakest first.
    pub const ALL: [HashAlgorithm; 3] = [
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha384,
        HashAlgorithm::Sha512,
    ];

    /// Identifier as it appears in integrity metadata (e.g. "sha256").
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
        }
    }

    /// Name expected by the digest primitive (e.g. "SHA-256").
    pub fn platform_name(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "SHA-256",
            HashAlgorithm::Sha384 => "SHA-384",
            HashAlgorithm::Sha512 => "SHA-512",
        }
    }

    /// Look up an identifier. Case-sensitive: only the lower-case form is supported.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sha256" => Some(HashAlgorithm::Sha256),
            "sha384" => Some(HashAlgorithm::Sha384),
            "sha512" => Some(HashAlgorithm::Sha512),
            _ => None,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether `name` is one of the supported identifiers.
pub fn is_supported(name: &str) -> bool {
    HashAlgorithm::from_name(name).is_some()
}

/// Platform digest name for a supported identifier; `None` when unsupported.
pub fn platform_name(name: &str) -> Option<&'static str> {
    HashAlgorithm::from_name(name).map(|alg| alg.platform_name())
}
