//! Purpose: `roster` CLI entry point.
//! Role: Binary crate root; parses args, sets up logging, loads the data file, runs a mode.
//! Invariants: stdout carries only session or search output; logs and errors go to stderr.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
use std::error::Error as StdError;
use std::ffi::OsString;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{Parser, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind};
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

mod command_dispatch;

use roster::api::{Error, ErrorKind, ErrorPolicy, Semantics, to_exit_code};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }
}

fn main() {
    init_tracing();
    let exit_code = match run(std::env::args_os()) {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run<I>(args: I) -> Result<RunOutcome, Error>
where
    I: IntoIterator<Item = OsString>,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => {
                err.print().map_err(|io_err| {
                    Error::new(ErrorKind::Io)
                        .with_message("failed to write help")
                        .with_source(io_err)
                })?;
                return Ok(RunOutcome::ok());
            }
            _ => {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(clap_error_summary(&err))
                    .with_hint("Try `roster --help`."));
            }
        },
    };

    let mode = cli.mode()?;
    let path = cli.data_path()?;
    let result = command_dispatch::dispatch(mode, path, cli.errors.into(), cli.semantics());

    result.map_err(add_not_found_hint).map_err(add_io_hint)
}

#[derive(Parser)]
#[command(
    name = "roster",
    version,
    about = "Search person records by name or email",
    long_about = None,
    after_help = r#"EXAMPLES
  $ roster --data people.txt                     # interactive menu
  $ roster people.txt --strategy ANY --query "erick katie"
  $ roster people.txt --strategy NONE --query gmail.com --json
  $ roster people.txt --list

Each data line is `first last [email]`, fields separated by single spaces.
Strategies: ALL (every token), ANY (at least one), NONE (no token)."#
)]
struct Cli {
    #[arg(
        long,
        value_name = "PATH",
        help = "Data file with one person per line",
        value_hint = ValueHint::FilePath,
        conflicts_with = "path"
    )]
    data: Option<PathBuf>,
    #[arg(
        value_name = "PATH",
        help = "Data file (alternative to --data)",
        value_hint = ValueHint::FilePath
    )]
    path: Option<PathBuf>,
    #[arg(
        short = 'e',
        long,
        value_enum,
        default_value = "stop",
        help = "What to do with malformed (empty) lines"
    )]
    errors: ErrorPolicyCli,
    #[arg(
        long,
        help = "Plain intersection for ALL: a token never restarts an emptied match set"
    )]
    strict: bool,
    #[arg(
        long,
        value_name = "ALL|ANY|NONE",
        requires = "query",
        help = "Run one search and exit"
    )]
    strategy: Option<String>,
    #[arg(
        long,
        value_name = "TEXT",
        requires = "strategy",
        allow_hyphen_values = true,
        help = "Space-separated names or emails for --strategy"
    )]
    query: Option<String>,
    #[arg(long, conflicts_with = "strategy", help = "Print every person and exit")]
    list: bool,
    #[arg(long, help = "Emit JSON for --strategy/--list output")]
    json: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, ValueEnum)]
enum ErrorPolicyCli {
    Stop,
    Skip,
}

impl From<ErrorPolicyCli> for ErrorPolicy {
    fn from(value: ErrorPolicyCli) -> Self {
        match value {
            ErrorPolicyCli::Stop => ErrorPolicy::Stop,
            ErrorPolicyCli::Skip => ErrorPolicy::Skip,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Mode {
    Interactive,
    Search {
        strategy: String,
        query: String,
        json: bool,
    },
    List {
        json: bool,
    },
}

impl Cli {
    fn data_path(&self) -> Result<PathBuf, Error> {
        self.data
            .clone()
            .or_else(|| self.path.clone())
            .ok_or_else(|| {
                Error::new(ErrorKind::Usage)
                    .with_message("missing data file")
                    .with_hint("Use `roster --data <PATH>` or `roster <PATH>`.")
            })
    }

    fn semantics(&self) -> Semantics {
        if self.strict {
            Semantics::Strict
        } else {
            Semantics::Compatible
        }
    }

    fn mode(&self) -> Result<Mode, Error> {
        match (&self.strategy, &self.query, self.list) {
            (Some(strategy), Some(query), false) => Ok(Mode::Search {
                strategy: strategy.clone(),
                query: query.clone(),
                json: self.json,
            }),
            (None, None, true) => Ok(Mode::List { json: self.json }),
            (None, None, false) if self.json => Err(Error::new(ErrorKind::Usage)
                .with_message("--json needs --strategy/--query or --list")
                .with_hint("The interactive menu only prints plain text.")),
            (None, None, false) => Ok(Mode::Interactive),
            _ => Err(Error::new(ErrorKind::Usage)
                .with_message("--strategy and --query must be given together, without --list")),
        }
    }
}

/// Logs go to stderr so they never interleave with menu output on stdout.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn add_not_found_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::NotFound || err.hint().is_some() {
        return err;
    }
    err.with_hint("Check the data file path; it is resolved relative to the working directory.")
}

fn add_io_hint(err: Error) -> Error {
    if err.hint().is_some() {
        return err;
    }
    match err.kind() {
        ErrorKind::Io => err.with_hint("I/O error. Check file permissions and that stdin/stdout are open."),
        ErrorKind::Malformed => err.with_hint("Fix or remove the line, or rerun with `--errors skip`."),
        _ => err,
    }
}

fn emit_json(value: Value) {
    let json = if io::stdout().is_terminal() {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
    .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{json}");
}

fn emit_error(err: &Error) {
    if io::stderr().is_terminal() {
        eprintln!("{}", error_text(err));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::NotFound => "not found".to_string(),
        ErrorKind::Malformed => "malformed record".to_string(),
        ErrorKind::InvalidStrategy => "invalid strategy".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    if let Some(line) = err.line() {
        inner.insert("line".to_string(), json!(line));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error) -> String {
    let mut lines = vec![format!("error: {}", error_message(err))];
    if let Some(hint) = err.hint() {
        lines.push(format!("hint: {hint}"));
    }
    if let Some(path) = err.path() {
        lines.push(format!("path: {}", path.display()));
    }
    if let Some(line) = err.line() {
        lines.push(format!("line: {line}"));
    }
    if let Some(cause) = error_causes(err).first() {
        lines.push(format!("caused by: {cause}"));
    }
    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

#[cfg(test)]
mod tests {
    use super::{Cli, Mode, error_json, error_text, run};
    use clap::Parser;
    use roster::api::{Error, ErrorKind, Semantics};
    use std::ffi::OsString;
    use std::path::PathBuf;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("parse")
    }

    #[test]
    fn data_flag_and_positional_are_equivalent() {
        let flag = parse(&["roster", "--data", "people.txt"]);
        let positional = parse(&["roster", "people.txt"]);
        assert_eq!(flag.data_path().unwrap(), PathBuf::from("people.txt"));
        assert_eq!(positional.data_path().unwrap(), PathBuf::from("people.txt"));
    }

    #[test]
    fn data_flag_conflicts_with_positional() {
        assert!(Cli::try_parse_from(["roster", "--data", "a.txt", "b.txt"]).is_err());
    }

    #[test]
    fn missing_data_file_is_usage_error() {
        let err = parse(&["roster"]).data_path().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn one_shot_search_mode() {
        let cli = parse(&["roster", "p.txt", "--strategy", "ANY", "--query", "tom", "--json"]);
        assert_eq!(
            cli.mode().unwrap(),
            Mode::Search {
                strategy: "ANY".to_string(),
                query: "tom".to_string(),
                json: true,
            }
        );
    }

    #[test]
    fn strategy_requires_query() {
        assert!(Cli::try_parse_from(["roster", "p.txt", "--strategy", "ANY"]).is_err());
    }

    #[test]
    fn json_without_one_shot_is_rejected() {
        let err = parse(&["roster", "p.txt", "--json"]).mode().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn strict_flag_selects_semantics() {
        assert_eq!(parse(&["roster", "p.txt"]).semantics(), Semantics::Compatible);
        assert_eq!(parse(&["roster", "p.txt", "--strict"]).semantics(), Semantics::Strict);
    }

    #[test]
    fn unknown_flag_maps_to_usage() {
        let args = ["roster", "--bogus"].map(OsString::from);
        let err = run(args).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert_eq!(err.hint(), Some("Try `roster --help`."));
    }

    #[test]
    fn error_envelope_carries_context() {
        let err = Error::new(ErrorKind::Malformed)
            .with_message("empty line has no fields")
            .with_path("people.txt")
            .with_line(4);
        let value = error_json(&err);
        assert_eq!(value["error"]["kind"], "Malformed");
        assert_eq!(value["error"]["line"], 4);
        assert_eq!(value["error"]["path"], "people.txt");
        assert!(error_text(&err).contains("line: 4"));
    }
}
