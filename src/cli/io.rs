//! JSON output for the CLI
//!
//! - One JSON object per invocation on stdout
//! - Logs go to stderr and never mix with responses

use std::io::{self, Write};

use serde_json::Value;

use super::errors::CliResult;

fn write_line<W: Write>(writer: &mut W, response: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *writer, response)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

pub(crate) fn success(data: Value) -> Value {
    serde_json::json!({
        "status": "ok",
        "data": data
    })
}

pub(crate) fn failure(code: &str, message: &str) -> Value {
    serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    })
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_line(&mut io::stdout(), &success(data))
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_line(&mut io::stdout(), &failure(code, message))
}
