//! JSON I/O handling for the CLI
//!
//! - Input: JSON via stdin, one document per line for `start`
//! - Output: one JSON response per stdout line
//! - UTF-8 only

use std::io::{BufRead, Read, Write};

use serde_json::Value;

use crate::api::{ApiError, Response};

use super::errors::CliResult;

/// Reads the whole of `reader` as one JSON document.
///
/// Unparseable input is reported as an invalid query, the same as any
/// other malformed query.
pub fn read_request<R: Read>(reader: &mut R) -> CliResult<Result<Value, ApiError>> {
    let mut input = String::new();
    reader.read_to_string(&mut input)?;
    Ok(parse_request(&input))
}

/// Iterates the non-blank lines of `reader`, each parsed as one query
pub fn read_requests<R: BufRead>(
    reader: R,
) -> impl Iterator<Item = CliResult<Result<Value, ApiError>>> {
    reader
        .lines()
        .filter(|line| !matches!(line, Ok(l) if l.trim().is_empty()))
        .map(|line| Ok(parse_request(&line?)))
}

fn parse_request(input: &str) -> Result<Value, ApiError> {
    serde_json::from_str(input.trim()).map_err(|_| ApiError::invalid_query())
}

/// Writes one response as a single line and flushes
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> CliResult<()> {
    writeln!(writer, "{}", response.to_json())?;
    writer.flush()?;
    Ok(())
}
