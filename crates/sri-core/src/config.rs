//! Optional config from .srirc or ~/.srirc (JSON). Env and CLI flags override it.

use std::path::{Path, PathBuf};

use crate::algorithm::HashAlgorithm;
use crate::error::SriError;
use crate::utils::log_verbose;

pub const CONFIG_FILE: &str = ".srirc";

/// Used when neither flags, env nor config name any algorithm.
pub const DEFAULT_ALGORITHMS: [HashAlgorithm; 1] = [HashAlgorithm::Sha384];

/// Optional settings from file. Every field may be absent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
    pub algorithms: Option<Vec<HashAlgorithm>>,
    pub separator: Option<String>,
    pub options: Option<Vec<String>>,
}

impl Config {
    pub fn separator(&self) -> &str {
        self.separator.as_deref().unwrap_or(" ")
    }

    pub fn options(&self) -> &[String] {
        self.options.as_deref().unwrap_or(&[])
    }
}

fn string_list(v: &serde_json::Value, field: &str) -> Result<Option<Vec<String>>, SriError> {
    let Some(raw) = v.get(field) else {
        return Ok(None);
    };
    let items = raw.as_array().ok_or_else(|| {
        SriError::config_error("read_config_file", Some(field), "expected an array of strings")
    })?;
    items
        .iter()
        .map(|item| {
            item.as_str().map(String::from).ok_or_else(|| {
                SriError::config_error("read_config_file", Some(field), "expected a string")
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

/// Keep supported names, in order, without repeats.
fn parse_algorithm_names<S: AsRef<str>>(names: &[S]) -> Vec<HashAlgorithm> {
    let mut out = Vec::new();
    for name in names {
        let name = name.as_ref().trim().to_lowercase();
        match HashAlgorithm::from_name(&name) {
            Some(alg) if !out.contains(&alg) => out.push(alg),
            Some(_) => {}
            None => log_verbose(&format!("Ignoring unsupported algorithm in config: {}", name)),
        }
    }
    out
}

/// Parse a config file, surfacing read and format errors.
pub fn read_config_file(path: &Path) -> Result<Config, SriError> {
    let path_str = path.display().to_string();
    let s = std::fs::read_to_string(path)
        .map_err(|e| SriError::io_error("read_config_file", Some(path_str.as_str()), e))?;
    let v: serde_json::Value = serde_json::from_str(&s)
        .map_err(|e| SriError::config_error("read_config_file", None, &e.to_string()))?;
    if !v.is_object() {
        return Err(SriError::config_error(
            "read_config_file",
            None,
            "expected a JSON object",
        ));
    }

    let algorithms = string_list(&v, "algorithms")?.map(|names| parse_algorithm_names(&names));
    let separator = match v.get("separator") {
        None => None,
        Some(raw) => Some(raw.as_str().map(String::from).ok_or_else(|| {
            SriError::config_error("read_config_file", Some("separator"), "expected a string")
        })?),
    };
    let options = string_list(&v, "options")?;

    Ok(Config {
        algorithms,
        separator,
        options,
    })
}

fn dirs_home() -> Option<PathBuf> {
    #[cfg(unix)]
    {
        std::env::var("HOME").ok().map(PathBuf::from)
    }
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE").ok().map(PathBuf::from)
    }
}

/// First existing candidate wins; an unreadable or invalid file yields the default.
fn load_first(candidates: &[PathBuf]) -> Config {
    for path in candidates {
        if path.is_file() {
            return match read_config_file(path) {
                Ok(cfg) => cfg,
                Err(e) => {
                    log_verbose(&format!("Ignoring config: {}", e));
                    Config::default()
                }
            };
        }
    }
    Config::default()
}

/// Load config from .srirc in dir, then ~/.srirc. Missing or invalid file = default.
pub fn load_config(dir: &Path) -> Config {
    let mut candidates = vec![dir.join(CONFIG_FILE)];
    if let Some(home) = dirs_home() {
        candidates.push(home.join(CONFIG_FILE));
    }
    load_first(&candidates)
}

/// Algorithms to digest with: `SRI_ALGORITHMS` (comma-separated), then config, then the default.
pub fn effective_algorithms(cfg: &Config) -> Vec<HashAlgorithm> {
    if let Ok(v) = std::env::var("SRI_ALGORITHMS") {
        let names: Vec<&str> = v.split(',').collect();
        let from_env = parse_algorithm_names(&names);
        if !from_env.is_empty() {
            return from_env;
        }
    }
    match &cfg.algorithms {
        Some(algs) if !algs.is_empty() => algs.clone(),
        _ => DEFAULT_ALGORITHMS.to_vec(),
    }
}
