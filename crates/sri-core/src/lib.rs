//! Core library for sri: Subresource Integrity metadata grammar, entries, sets and
//! algorithm prioritization. Used by the CLI binary; can be reused by other tools.

pub mod algorithm;
pub mod config;
pub mod digest;
pub mod error;
pub mod grammar;
pub mod metadata;
pub mod priority;
pub mod set;
pub mod utils;

// Re-export main API for CLI
pub use algorithm::{is_supported, platform_name, HashAlgorithm};
pub use config::{effective_algorithms, load_config, read_config_file, Config};
pub use digest::{
    create_integrity_metadata, create_integrity_metadata_set, create_integrity_metadata_set_with,
    digest, digest_and_stringify,
};
#[cfg(feature = "async")]
pub use digest::{
    create_integrity_metadata_async, create_integrity_metadata_set_async,
    create_integrity_metadata_set_async_with,
};
pub use error::SriError;
pub use metadata::{IntegrityMetadata, MetadataFields};
pub use priority::{get_prioritized_hash_algorithm, PrioritizeFn};
pub use set::{IntegrityInput, IntegrityMetadataSet};
pub use utils::{log, log_error, log_verbose};
