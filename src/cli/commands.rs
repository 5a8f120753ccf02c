//! CLI command implementations
//!
//! Every command loads the configuration, sets the log level, and opens the
//! dataset registry before doing its work. Query and dataset failures are
//! written as error responses; only configuration and I/O failures abort.

use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::Path;

use serde_json::Value;

use crate::api::{ApiError, QueryEngine, Response};
use crate::dataset::{DatasetError, DatasetKind};
use crate::executor::RecordSource;
use crate::observability::{log_event_with_fields, Event, Logger};

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{read_request, read_requests, write_response};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cmd {
        Command::Query { config } => query(&config, &mut io::stdin().lock(), &mut out),
        Command::Start { config } => start(&config, io::stdin().lock(), &mut out),
        Command::Datasets { config } => datasets(&config, &mut out),
        Command::Add {
            config,
            id,
            kind,
            file,
        } => add(&config, &id, kind, &file, &mut out),
        Command::Remove { config, id } => remove(&config, &id, &mut out),
    }
}

/// Loads configuration, applies the log level, and opens the engine
fn boot(config_path: &Path) -> CliResult<QueryEngine> {
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.log_severity()?);

    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("config", &config_path.display().to_string()),
            ("data_dir", &config.data_dir),
            ("log_level", &config.log_level),
        ],
    );

    QueryEngine::open(config.data_path())
        .map_err(|e| CliError::io_error(format!("Failed to open data directory: {}", e)))
}

/// Answers one query with its rows or an error response
fn answer<S: RecordSource>(
    engine: &QueryEngine<S>,
    request: Result<Value, ApiError>,
) -> Response {
    match request.and_then(|query| engine.perform_query(&query)) {
        Ok(rows) => Response::rows(&rows),
        Err(err) => Response::error(&err),
    }
}

/// Execute a single query read from `input` and exit
pub fn query<R: Read, W: Write>(config_path: &Path, input: &mut R, out: &mut W) -> CliResult<()> {
    let engine = boot(config_path)?;
    let request = read_request(input)?;
    write_response(out, &answer(&engine, request))
}

/// Boots the engine and answers one query per input line until end of
/// input
pub fn start<R: BufRead, W: Write>(config_path: &Path, input: R, out: &mut W) -> CliResult<()> {
    let engine = boot(config_path)?;

    log_event_with_fields(
        Event::ServeStart,
        &[("datasets", &engine.list_datasets().len().to_string())],
    );
    let served = serve(&engine, input, out)?;
    log_event_with_fields(
        Event::ServeStop,
        &[
            ("metrics", &engine.metrics().to_json()),
            ("queries", &served.to_string()),
        ],
    );

    Ok(())
}

/// Serving loop: one response line per non-blank request line.
///
/// Returns the number of requests answered. A read or write failure ends
/// the loop with an error.
pub fn serve<S, R, W>(engine: &QueryEngine<S>, input: R, out: &mut W) -> CliResult<usize>
where
    S: RecordSource,
    R: BufRead,
    W: Write,
{
    let mut served = 0;
    for request in read_requests(input) {
        write_response(out, &answer(engine, request?))?;
        served += 1;
    }
    Ok(served)
}

/// List registered datasets
pub fn datasets<W: Write>(config_path: &Path, out: &mut W) -> CliResult<()> {
    let engine = boot(config_path)?;
    let data = serde_json::to_value(engine.list_datasets())?;
    write_response(out, &Response::success(data))
}

/// Register a dataset from a JSON file holding an array of records
pub fn add<W: Write>(
    config_path: &Path,
    id: &str,
    kind: DatasetKind,
    file: &Path,
    out: &mut W,
) -> CliResult<()> {
    let mut engine = boot(config_path)?;

    let content = fs::read_to_string(file).map_err(|e| {
        CliError::io_error(format!("Failed to read {}: {}", file.display(), e))
    })?;

    let response = match serde_json::from_str::<Value>(&content) {
        Ok(Value::Array(records)) => Response::from(engine.add_dataset(id, kind, &records)),
        _ => Response::error(&ApiError::from(DatasetError::NoValidRecords(id.to_string()))),
    };
    write_response(out, &response)
}

/// Remove a dataset and its files
pub fn remove<W: Write>(config_path: &Path, id: &str, out: &mut W) -> CliResult<()> {
    let mut engine = boot(config_path)?;
    write_response(out, &Response::from(engine.remove_dataset(id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::errors::CliErrorCode;
    use serde_json::json;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn create_config(temp_dir: &TempDir) -> std::path::PathBuf {
        let config_path = temp_dir.path().join("campusdb.json");
        let data_dir = temp_dir.path().join("data");

        let config = json!({
            "data_dir": data_dir.to_string_lossy(),
            "log_level": "error"
        });

        fs::write(&config_path, config.to_string()).unwrap();
        config_path
    }

    fn write_sections(temp_dir: &TempDir) -> std::path::PathBuf {
        let path = temp_dir.path().join("sections.json");
        let sections = json!([
            {"Subject": "cpsc", "Course": "310", "Professor": "a", "Title": "sw eng",
             "id": "1", "Avg": 91.2, "Pass": 50, "Fail": 2, "Audit": 0, "Year": "2015"},
            {"Subject": "math", "Course": "100", "Professor": "b", "Title": "calc",
             "id": "2", "Avg": 68.4, "Pass": 80, "Fail": 9, "Audit": 1, "Year": "2016"}
        ]);
        fs::write(&path, sections.to_string()).unwrap();
        path
    }

    fn response(out: Vec<u8>) -> Value {
        serde_json::from_slice(&out).unwrap()
    }

    #[test]
    fn test_add_query_remove() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir);
        let file = write_sections(&temp_dir);

        let mut out = Vec::new();
        add(&config_path, "ubc", DatasetKind::Courses, &file, &mut out).unwrap();
        assert_eq!(response(out), json!({"status": "ok", "data": ["ubc"]}));

        let mut out = Vec::new();
        datasets(&config_path, &mut out).unwrap();
        assert_eq!(
            response(out)["data"],
            json!([{"id": "ubc", "kind": "courses", "numRows": 2}])
        );

        let mut input = Cursor::new(
            r#"{"WHERE": {"GT": {"ubc_avg": 90}}, "OPTIONS": {"COLUMNS": ["ubc_dept", "ubc_avg"]}}"#,
        );
        let mut out = Vec::new();
        query(&config_path, &mut input, &mut out).unwrap();
        assert_eq!(
            response(out),
            json!({"status": "ok", "data": [{"ubc_dept": "cpsc", "ubc_avg": 91.2}]})
        );

        let mut out = Vec::new();
        remove(&config_path, "ubc", &mut out).unwrap();
        assert_eq!(response(out), json!({"status": "ok", "data": "ubc"}));

        let mut out = Vec::new();
        remove(&config_path, "ubc", &mut out).unwrap();
        assert_eq!(response(out)["code"], "CAMPUS_DATASET_NOT_FOUND");
    }

    #[test]
    fn test_add_rejects_non_array_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir);
        let file = temp_dir.path().join("bad.json");
        fs::write(&file, "{\"Subject\": \"cpsc\"}").unwrap();

        let mut out = Vec::new();
        add(&config_path, "ubc", DatasetKind::Courses, &file, &mut out).unwrap();
        assert_eq!(response(out)["code"], "CAMPUS_DATASET_INVALID");
    }

    #[test]
    fn test_start_answers_each_line() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir);
        let file = write_sections(&temp_dir);
        add(&config_path, "ubc", DatasetKind::Courses, &file, &mut Vec::new()).unwrap();

        let input = Cursor::new(concat!(
            r#"{"WHERE": {}, "OPTIONS": {"COLUMNS": ["ubc_dept"], "ORDER": "ubc_dept"}}"#,
            "\n",
            "not json\n",
            "\n",
            r#"{"WHERE": {"IS": {"ubc_dept": "c*"}}, "OPTIONS": {"COLUMNS": ["ubc_id"]}}"#,
            "\n",
        ));
        let mut out = Vec::new();
        start(&config_path, input, &mut out).unwrap();

        let lines: Vec<Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0]["data"],
            json!([{"ubc_dept": "cpsc"}, {"ubc_dept": "math"}])
        );
        assert_eq!(
            lines[1],
            json!({"status": "error", "code": "CAMPUS_QUERY_INVALID", "message": "Invalid query"})
        );
        assert_eq!(lines[2]["data"], json!([{"ubc_id": "310"}]));
    }

    #[test]
    fn test_missing_config_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let err = datasets(&temp_dir.path().join("missing.json"), &mut Vec::new()).unwrap_err();
        assert_eq!(err.code(), CliErrorCode::ConfigError);
    }
}
