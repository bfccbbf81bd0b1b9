//! Create integrity metadata from resource bytes.

#[cfg(feature = "async")]
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rayon::prelude::*;
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::algorithm::HashAlgorithm;
use crate::grammar;
use crate::metadata::IntegrityMetadata;
use crate::priority::get_prioritized_hash_algorithm;
use crate::set::IntegrityMetadataSet;
use crate::utils::log_verbose;
#[cfg(feature = "async")]
use crate::{error::SriError, utils::log_error};

/// Raw digest of `data`.
pub fn digest(algorithm: HashAlgorithm, data: &[u8]) -> Vec<u8> {
    match algorithm {
        HashAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
        HashAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
        HashAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
    }
}

fn lookup(hash_algorithm: &str) -> Option<HashAlgorithm> {
    let name = hash_algorithm.to_lowercase();
    let alg = HashAlgorithm::from_name(&name);
    if alg.is_none() {
        log_verbose(&format!("Unsupported hash algorithm: {}", hash_algorithm));
    }
    alg
}

fn digest_entry<S: AsRef<str>>(alg: HashAlgorithm, data: &[u8], opt: &[S]) -> IntegrityMetadata {
    let val = BASE64.encode(digest(alg, data));
    grammar::parse_exact(&grammar::stringify(alg.name(), &val, opt))
}

/// Digest `data` with the named algorithm (any case). An unsupported name yields the
/// empty entry without hashing anything.
pub fn create_integrity_metadata<S: AsRef<str>>(
    hash_algorithm: &str,
    data: &[u8],
    opt: &[S],
) -> IntegrityMetadata {
    match lookup(hash_algorithm) {
        Some(alg) => digest_entry(alg, data, opt),
        None => IntegrityMetadata::default(),
    }
}

/// Canonical token for `data`, or "" for an unsupported algorithm.
pub fn digest_and_stringify<S: AsRef<str>>(hash_algorithm: &str, data: &[u8], opt: &[S]) -> String {
    create_integrity_metadata(hash_algorithm, data, opt).to_string()
}

/// Digest `data` once per algorithm, in parallel, and collect the results in request order.
pub fn create_integrity_metadata_set<N, S>(
    hash_algorithms: &[N],
    data: &[u8],
    opt: &[S],
) -> IntegrityMetadataSet
where
    N: AsRef<str> + Sync,
    S: AsRef<str> + Sync,
{
    create_integrity_metadata_set_with(hash_algorithms, data, opt, get_prioritized_hash_algorithm)
}

/// Same as [`create_integrity_metadata_set`] with a custom prioritization rule.
pub fn create_integrity_metadata_set_with<N, S, F>(
    hash_algorithms: &[N],
    data: &[u8],
    opt: &[S],
    prioritize: F,
) -> IntegrityMetadataSet
where
    N: AsRef<str> + Sync,
    S: AsRef<str> + Sync,
    F: Fn(&str, &str) -> Option<HashAlgorithm>,
{
    let entries: Vec<IntegrityMetadata> = hash_algorithms
        .par_iter()
        .map(|name| create_integrity_metadata(name.as_ref(), data, opt))
        .collect();
    IntegrityMetadataSet::with_prioritizer(entries, prioritize)
}

/// Async [`create_integrity_metadata`]: hashing runs on the blocking pool.
///
/// A digest task that fails to complete is logged and yields the empty entry.
#[cfg(feature = "async")]
pub async fn create_integrity_metadata_async(
    hash_algorithm: &str,
    data: impl Into<Arc<[u8]>>,
    opt: Vec<String>,
) -> IntegrityMetadata {
    let Some(alg) = lookup(hash_algorithm) else {
        return IntegrityMetadata::default();
    };
    let data = data.into();
    join_digest(alg, tokio::task::spawn_blocking(move || digest_entry(alg, &data, &opt))).await
}

#[cfg(feature = "async")]
async fn join_digest(
    alg: HashAlgorithm,
    task: tokio::task::JoinHandle<IntegrityMetadata>,
) -> IntegrityMetadata {
    match task.await {
        Ok(entry) => entry,
        Err(e) => {
            let err = SriError::digest_error(
                "create_integrity_metadata_async",
                Some(alg.name()),
                &e.to_string(),
            );
            log_error(&err.to_string());
            IntegrityMetadata::default()
        }
    }
}

/// Async [`create_integrity_metadata_set`]. All digests start before any is awaited;
/// results are joined in request order, so the set does not depend on completion order.
#[cfg(feature = "async")]
pub async fn create_integrity_metadata_set_async<N: AsRef<str>>(
    hash_algorithms: &[N],
    data: impl Into<Arc<[u8]>>,
    opt: Vec<String>,
) -> IntegrityMetadataSet {
    create_integrity_metadata_set_async_with(
        hash_algorithms,
        data,
        opt,
        get_prioritized_hash_algorithm,
    )
    .await
}

/// Same as [`create_integrity_metadata_set_async`] with a custom prioritization rule.
#[cfg(feature = "async")]
pub async fn create_integrity_metadata_set_async_with<N, F>(
    hash_algorithms: &[N],
    data: impl Into<Arc<[u8]>>,
    opt: Vec<String>,
    prioritize: F,
) -> IntegrityMetadataSet
where
    N: AsRef<str>,
    F: Fn(&str, &str) -> Option<HashAlgorithm>,
{
    let data: Arc<[u8]> = data.into();
    let opt: Arc<[String]> = opt.into();

    let tasks: Vec<_> = hash_algorithms
        .iter()
        .map(|name| {
            lookup(name.as_ref()).map(|alg| {
                let data = Arc::clone(&data);
                let opt = Arc::clone(&opt);
                (alg, tokio::task::spawn_blocking(move || digest_entry(alg, &data, &opt)))
            })
        })
        .collect();

    let mut entries = Vec::with_capacity(tasks.len());
    for task in tasks {
        match task {
            Some((alg, handle)) => entries.push(join_digest(alg, handle).await),
            None => entries.push(IntegrityMetadata::default()),
        }
    }
    IntegrityMetadataSet::with_prioritizer(entries, prioritize)
}
