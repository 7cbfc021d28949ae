use std::fmt::Display;

use adv_core::AdventureError;

fn map_error(code: &'static str, error: impl Display) -> AdventureError {
    AdventureError::io(code, error.to_string())
}

pub(crate) fn emit_error(error: AdventureError) -> i32 {
    println!("ERROR_CODE:{}", error.code);
    println!(
        "ERROR_MSG_JSON:{}",
        serde_json::to_string(&error.message).unwrap_or_default()
    );
    1
}

pub(crate) fn map_cli_source_path(error: std::io::Error) -> AdventureError {
    map_error("CLI_SOURCE_PATH", error)
}

pub(crate) fn map_cli_source_scan(error: walkdir::Error) -> AdventureError {
    map_error("CLI_SOURCE_SCAN", error)
}

pub(crate) fn map_cli_source_read(error: std::io::Error) -> AdventureError {
    map_error("CLI_SOURCE_READ", error)
}

pub(crate) fn map_cli_runtime(error: std::io::Error) -> AdventureError {
    map_error("CLI_RUNTIME", error)
}
