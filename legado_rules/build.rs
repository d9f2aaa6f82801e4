// build.rs - turns the selected config profile into compile-time constants
use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_PROFILE: &str = "development";
const DEFAULT_CONFIG_DIR: &str = "config";

// Hard ceilings no profile may exceed
const CEILING_FILE_SIZE: u64 = 1_000_000_000;
const CEILING_RULE_LENGTH: usize = 16 * 1024 * 1024;
const CEILING_NESTING_DEPTH: usize = 100_000;
const PRODUCTION_FILE_SIZE: u64 = 50_000_000;

#[derive(serde::Deserialize)]
struct Profile {
    file_processing: FileProcessing,
    lexical: Lexical,
    source: Source,
    logging: Logging,
}

#[derive(serde::Deserialize)]
struct FileProcessing {
    max_file_size: u64,
    large_file_threshold: u64,
}

#[derive(serde::Deserialize)]
struct Lexical {
    max_rule_length: usize,
    max_token_count: usize,
    max_nesting_depth: usize,
    metrics_buffer_size: usize,
}

#[derive(serde::Deserialize)]
struct Source {
    max_sources_per_file: usize,
    max_rule_fields_per_source: usize,
}

#[derive(serde::Deserialize)]
struct Logging {
    max_error_collection: usize,
    log_buffer_size: usize,
    max_log_message_length: usize,
    max_log_events_per_file: usize,
    security_min_log_level: u8,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=LEGADO_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=LEGADO_CONFIG_DIR");

    let profile_name =
        env::var("LEGADO_BUILD_PROFILE").unwrap_or_else(|_| DEFAULT_PROFILE.to_string());
    let path = profile_path(&profile_name);
    println!("cargo:rerun-if-changed={}", path.display());

    let content = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Cannot read build profile {}: {}", path.display(), e));
    let profile: Profile = toml::from_str(&content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", path.display(), e));

    let problems = check_profile(&profile, &profile_name);
    if !problems.is_empty() {
        panic!(
            "Build profile {} rejected:\n  {}",
            path.display(),
            problems.join("\n  ")
        );
    }

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    fs::write(
        Path::new(&out_dir).join("constants.rs"),
        render_constants(&profile, &profile_name),
    )
    .expect("Failed to write generated constants");
}

/// `<workspace>/<config dir>/<profile>.toml`
fn profile_path(profile_name: &str) -> PathBuf {
    let config_dir =
        env::var("LEGADO_CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR is set by cargo");
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("legado_rules lives inside a workspace");

    workspace_root
        .join(config_dir)
        .join(format!("{}.toml", profile_name))
}

fn check_profile(profile: &Profile, profile_name: &str) -> Vec<String> {
    let mut problems = Vec::new();
    let files = &profile.file_processing;
    let lexical = &profile.lexical;

    if files.max_file_size > CEILING_FILE_SIZE {
        problems.push(format!("max_file_size above {}", CEILING_FILE_SIZE));
    }
    if files.large_file_threshold > files.max_file_size {
        problems.push("large_file_threshold above max_file_size".to_string());
    }
    if lexical.max_rule_length == 0 || lexical.max_rule_length > CEILING_RULE_LENGTH {
        problems.push(format!("max_rule_length outside 1..={}", CEILING_RULE_LENGTH));
    }
    if lexical.max_nesting_depth == 0 || lexical.max_nesting_depth > CEILING_NESTING_DEPTH {
        problems.push(format!("max_nesting_depth outside 1..={}", CEILING_NESTING_DEPTH));
    }
    if lexical.max_token_count == 0 {
        problems.push("max_token_count is zero".to_string());
    }
    if profile.source.max_sources_per_file == 0 || profile.source.max_rule_fields_per_source == 0 {
        problems.push("source limits must be non-zero".to_string());
    }
    if profile.logging.max_log_events_per_file >= profile.logging.max_error_collection {
        problems.push("max_log_events_per_file must stay below max_error_collection".to_string());
    }
    if profile.logging.security_min_log_level > 2 {
        problems.push("security_min_log_level above 2".to_string());
    }
    if profile_name == "production" && files.max_file_size > PRODUCTION_FILE_SIZE {
        problems.push(format!("production max_file_size above {}", PRODUCTION_FILE_SIZE));
    }

    problems
}

fn render_module(out: &mut String, name: &str, constants: &[(&str, &str, String)]) {
    let _ = writeln!(out, "    pub mod {} {{", name);
    for (constant, ty, value) in constants {
        let _ = writeln!(out, "        pub const {}: {} = {};", constant, ty, value);
    }
    let _ = writeln!(out, "    }}");
}

fn render_constants(profile: &Profile, profile_name: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "// Generated by build.rs from the {} profile", profile_name);
    let _ = writeln!(out, "pub mod compile_time {{");

    let files = &profile.file_processing;
    render_module(
        &mut out,
        "file_processing",
        &[
            ("MAX_FILE_SIZE", "u64", files.max_file_size.to_string()),
            ("LARGE_FILE_THRESHOLD", "u64", files.large_file_threshold.to_string()),
        ],
    );

    let lexical = &profile.lexical;
    render_module(
        &mut out,
        "lexical",
        &[
            ("MAX_RULE_LENGTH", "usize", lexical.max_rule_length.to_string()),
            ("MAX_TOKEN_COUNT", "usize", lexical.max_token_count.to_string()),
            ("MAX_NESTING_DEPTH", "usize", lexical.max_nesting_depth.to_string()),
            ("METRICS_BUFFER_SIZE", "usize", lexical.metrics_buffer_size.to_string()),
        ],
    );

    let source = &profile.source;
    render_module(
        &mut out,
        "source",
        &[
            ("MAX_SOURCES_PER_FILE", "usize", source.max_sources_per_file.to_string()),
            (
                "MAX_RULE_FIELDS_PER_SOURCE",
                "usize",
                source.max_rule_fields_per_source.to_string(),
            ),
        ],
    );

    let logging = &profile.logging;
    render_module(
        &mut out,
        "logging",
        &[
            ("MAX_ERROR_COLLECTION", "usize", logging.max_error_collection.to_string()),
            ("LOG_BUFFER_SIZE", "usize", logging.log_buffer_size.to_string()),
            ("MAX_LOG_MESSAGE_LENGTH", "usize", logging.max_log_message_length.to_string()),
            ("MAX_LOG_EVENTS_PER_FILE", "usize", logging.max_log_events_per_file.to_string()),
            ("SECURITY_MIN_LOG_LEVEL", "u8", logging.security_min_log_level.to_string()),
        ],
    );

    let _ = writeln!(out, "}}");
    out
}
