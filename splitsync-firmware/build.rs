//! Build script for splitsync-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates split.toml and turns it into constants

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Validated contents of split.toml
struct SplitConfig {
    is_master: bool,
    baud_rate: u32,
    response_timeout_ms: u32,
    max_connection_errors: u8,
    connection_check_ms: u32,
}

fn main() {
    setup_linker();
    let config = validate_config();
    write_config(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate split.toml at compile time
fn validate_config() -> SplitConfig {
    println!("cargo:rerun-if-changed=split.toml");

    let config_path = Path::new("split.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: split.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a split.toml next to its Cargo.toml.      ║\n\
            ║  It selects the role of this half and the link timing.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read split.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in split.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();

    let is_master = match config.get("role") {
        Some(toml::Value::String(role)) if role == "master" => true,
        Some(toml::Value::String(role)) if role == "slave" => false,
        Some(_) => {
            errors.push("role must be 'master' or 'slave'".to_string());
            false
        }
        None => {
            errors.push("missing 'role'".to_string());
            false
        }
    };

    let baud_rate = integer(&config, "uart", "baud_rate", 57_600, 1_200, 1_000_000, &mut errors);
    let response_timeout_ms =
        integer(&config, "link", "response_timeout_ms", 20, 1, 30_000, &mut errors);
    let max_connection_errors =
        integer(&config, "link", "max_connection_errors", 10, 0, 255, &mut errors);
    let connection_check_ms =
        integer(&config, "link", "connection_check_ms", 500, 1, 60_000, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid split.toml configuration                         ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=split.toml validated successfully");

    SplitConfig {
        is_master,
        baud_rate: baud_rate as u32,
        response_timeout_ms: response_timeout_ms as u32,
        max_connection_errors: max_connection_errors as u8,
        connection_check_ms: connection_check_ms as u32,
    }
}

/// Read `[section] key` as an integer within `min..=max`
///
/// Missing keys fall back to `default`.
fn integer(
    config: &toml::Value,
    section: &str,
    key: &str,
    default: i64,
    min: i64,
    max: i64,
    errors: &mut Vec<String>,
) -> i64 {
    let value = match config.get(section).and_then(|s| s.get(key)) {
        Some(toml::Value::Integer(value)) => *value,
        Some(_) => {
            errors.push(format!("[{}] {} must be an integer", section, key));
            return default;
        }
        None => return default,
    };

    if value < min || value > max {
        errors.push(format!("[{}] {} must be {}-{}", section, key, min, max));
        return default;
    }
    value
}

/// Emit the validated settings as Rust constants
fn write_config(config: &SplitConfig) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let mut f = File::create(out_dir.join("split_config.rs")).unwrap();

    writeln!(f, "/// This half starts transactions").unwrap();
    writeln!(f, "pub const IS_MASTER: bool = {};", config.is_master).unwrap();
    writeln!(f, "/// Inter-half UART baud rate").unwrap();
    writeln!(f, "pub const BAUD_RATE: u32 = {};", config.baud_rate).unwrap();
    writeln!(f, "/// Response timeout in milliseconds").unwrap();
    writeln!(f, "pub const RESPONSE_TIMEOUT_MS: u32 = {};", config.response_timeout_ms).unwrap();
    writeln!(f, "/// Consecutive failures before the link is down").unwrap();
    writeln!(f, "pub const MAX_CONNECTION_ERRORS: u8 = {};", config.max_connection_errors).unwrap();
    writeln!(f, "/// Retry interval in milliseconds while the link is down").unwrap();
    writeln!(f, "pub const CONNECTION_CHECK_MS: u32 = {};", config.connection_check_ms).unwrap();
}

/// Width of the text column inside the error boxes
const BOX_TEXT_WIDTH: usize = 64;

/// Fit each line of a parser error into the error box
///
/// Long lines are cut on a char boundary and marked with an ellipsis.
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| format!("║  {:<width$} ║", fit_line(line), width = BOX_TEXT_WIDTH))
        .collect::<Vec<_>>()
        .join("\n")
}

fn fit_line(line: &str) -> String {
    if line.chars().count() <= BOX_TEXT_WIDTH {
        return line.to_string();
    }
    let mut cut: String = line.chars().take(BOX_TEXT_WIDTH - 3).collect();
    cut.push_str("...");
    cut
}
