//! Thin CLI layer: parse args, styled output, and call into sri-core.
//! Crash-proof: panic caught and reported; all errors return Result.

use clap::{Arg, ArgAction, ArgMatches, Command};
use colored::Colorize;
use std::env;
use std::io::{IsTerminal, Read};
use std::path::Path;

use sri_core::{IntegrityMetadata, IntegrityMetadataSet, SriError};

// ---- UI helpers (no-op when stdout isn't a TTY) ----

fn use_color() -> bool {
    std::io::stdout().is_terminal() && env::var("NO_COLOR").unwrap_or_default().is_empty()
}

fn success(msg: &str) {
    if use_color() {
        println!("{}", msg.green());
    } else {
        println!("{}", msg);
    }
}

fn error(msg: &str) {
    if use_color() {
        eprintln!("{}", msg.red());
    } else {
        eprintln!("{}", msg);
    }
}

fn warning(msg: &str) {
    if use_color() {
        eprintln!("{}", msg.yellow());
    } else {
        eprintln!("{}", msg);
    }
}

fn dim(msg: &str) {
    if use_color() {
        println!("{}", msg.dimmed());
    } else {
        println!("{}", msg);
    }
}

fn strings(m: &ArgMatches, id: &str) -> Vec<String> {
    m.get_many::<String>(id)
        .map(|it| it.cloned().collect())
        .unwrap_or_default()
}

/// Read a file, or stdin for "-".
fn read_input(path: &str) -> Result<Vec<u8>, SriError> {
    if path == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .map_err(|e| SriError::io_error("read_input", None, e))?;
        return Ok(buf);
    }
    std::fs::read(path).map_err(|e| SriError::io_error("read_input", Some(path), e))
}

fn cmd_parse(m: &ArgMatches) -> Result<(), String> {
    let json = m.get_flag("json");
    let mut out = Vec::new();
    for token in strings(m, "token") {
        let entry = IntegrityMetadata::parse(&token);
        let canonical = entry.to_string();
        if json {
            let fields = entry.to_fields();
            out.push(serde_json::json!({
                "alg": fields.alg,
                "val": fields.val,
                "opt": fields.opt,
                "canonical": canonical,
            }));
        } else if canonical.is_empty() {
            dim("(invalid)");
        } else {
            println!("{}", canonical);
        }
    }
    if json {
        let s = serde_json::to_string_pretty(&out).map_err(|e| e.to_string())?;
        println!("{}", s);
    }
    Ok(())
}

fn cmd_digest(m: &ArgMatches) -> Result<(), String> {
    let file = m.get_one::<String>("file").map(String::as_str).unwrap_or("-");
    let cwd = env::current_dir().unwrap_or_else(|_| Path::new(".").to_path_buf());
    let cfg = sri_core::load_config(&cwd);

    let mut algorithms = strings(m, "algorithm");
    if algorithms.is_empty() {
        algorithms = sri_core::effective_algorithms(&cfg)
            .iter()
            .map(|a| a.name().to_string())
            .collect();
    }
    for name in &algorithms {
        if !sri_core::is_supported(&name.to_lowercase()) {
            warning(&format!("Skipping unsupported algorithm: {}", name));
        }
    }
    let mut options = strings(m, "option");
    if options.is_empty() {
        options = cfg.options().to_vec();
    }

    let data = read_input(file).map_err(|e| e.to_string())?;
    sri_core::log_verbose(&format!(
        "Digesting {} byte(s) with {}",
        data.len(),
        algorithms.join(", ")
    ));
    let set = sri_core::create_integrity_metadata_set(&algorithms, &data, &options);
    if set.is_empty() {
        return Err("No supported hash algorithm requested.".to_string());
    }
    println!("{}", set.join(cfg.separator()));
    Ok(())
}

fn cmd_strongest(m: &ArgMatches) -> Result<(), String> {
    let set = IntegrityMetadataSet::new(strings(m, "metadata"));
    if set.strongest().is_empty() {
        return Err("No valid integrity metadata.".to_string());
    }
    for entry in set.strongest() {
        println!("{}", entry);
    }
    Ok(())
}

fn cmd_match(m: &ArgMatches) -> Result<bool, String> {
    let metadata = m.get_one::<String>("metadata").map(String::as_str).unwrap_or("");
    let candidate = m.get_one::<String>("candidate").map(String::as_str).unwrap_or("");
    let set = IntegrityMetadataSet::new(metadata);
    Ok(set.matches(candidate))
}

fn cli() -> Command {
    Command::new("sri")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Parse, compare and prioritize Subresource Integrity metadata")
        .after_help(
            "Examples:\n  sri parse 'sha256-MV9b23bQeMQ7isAGTkoBZGErH853yGk0W/yUx1iU7dM='\n  sri digest app.js -a sha384 -a sha512\n  sri strongest \"$(cat integrity.txt)\"\n  sri match \"$EXPECTED\" \"$ACTUAL\"",
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("parse")
                .about("Print the canonical form of each metadata token")
                .arg(
                    Arg::new("token")
                        .required(true)
                        .num_args(1..)
                        .help("Integrity metadata token(s)"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output machine-readable JSON"),
                ),
        )
        .subcommand(
            Command::new("digest")
                .about("Compute integrity metadata for a file (or stdin with -)")
                .arg(Arg::new("file").default_value("-").help("File to digest"))
                .arg(
                    Arg::new("algorithm")
                        .short('a')
                        .long("algorithm")
                        .action(ArgAction::Append)
                        .help("Hash algorithm (sha256, sha384, sha512); repeatable"),
                )
                .arg(
                    Arg::new("option")
                        .long("option")
                        .action(ArgAction::Append)
                        .help("Option appended to each entry as ?<option>; repeatable"),
                ),
        )
        .subcommand(
            Command::new("strongest")
                .about("Print the strongest entries of a metadata list")
                .arg(
                    Arg::new("metadata")
                        .required(true)
                        .num_args(1..)
                        .help("Metadata list(s); whitespace-separated tokens"),
                ),
        )
        .subcommand(
            Command::new("match")
                .about("Exit 0 when the candidate matches any entry of the metadata list")
                .arg(Arg::new("metadata").required(true).help("Expected metadata list"))
                .arg(Arg::new("candidate").required(true).help("Candidate metadata token")),
        )
}

fn run() -> Result<i32, String> {
    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("parse", sub_m)) => cmd_parse(sub_m)?,
        Some(("digest", sub_m)) => cmd_digest(sub_m)?,
        Some(("strongest", sub_m)) => cmd_strongest(sub_m)?,
        Some(("match", sub_m)) => {
            if cmd_match(sub_m)? {
                success("match");
            } else {
                error("no match");
                return Ok(1);
            }
        }
        _ => {
            dim("Use `sri parse`, `sri digest`, `sri strongest` or `sri match`.");
        }
    }
    Ok(0)
}

fn main() {
    if !use_color() {
        colored::control::set_override(false);
    }

    let code = match std::panic::catch_unwind(run) {
        Ok(Ok(code)) => code,
        Ok(Err(e)) => {
            error(&e);
            sri_core::log_verbose(&e);
            1
        }
        Err(_) => {
            error("An unexpected error occurred. Please report this issue.");
            1
        }
    };
    std::process::exit(code);
}
