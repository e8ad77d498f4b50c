//! Purpose: Hold mode dispatch for `roster` once arguments are parsed.
//! Exports: `dispatch`.
//! Role: Keep `main.rs` focused on parse/bootstrap; load the directory and run one mode.
//! Invariants: The data file is loaded exactly once per process, before any output.
//! Invariants: One-shot human output matches the interactive session texts.

use super::*;

use roster::api::{Directory, SearchRequest, Strategy};
use roster::session::{LIST_HEADER, NO_MATCHES, Session};

pub(super) fn dispatch(
    mode: Mode,
    path: PathBuf,
    policy: ErrorPolicy,
    semantics: Semantics,
) -> Result<RunOutcome, Error> {
    let directory = Directory::open(&path, policy)?;

    match mode {
        Mode::Interactive => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            let mut session =
                Session::new(&directory, stdin.lock(), stdout.lock()).with_semantics(semantics);
            session.run()?;
            Ok(RunOutcome::ok())
        }
        Mode::Search {
            strategy,
            query,
            json,
        } => {
            let strategy = strategy.parse::<Strategy>()?;
            let request = SearchRequest::new(strategy, query).with_semantics(semantics);
            let result = directory.search(&request);
            if json {
                emit_json(json!({
                    "strategy": strategy,
                    "query": request.query,
                    "count": result.len(),
                    "people": result.people(),
                }));
            } else if result.is_empty() {
                println!("{NO_MATCHES}");
            } else {
                println!("{} persons found:", result.len());
                for person in result.people() {
                    println!("{person}");
                }
            }
            Ok(RunOutcome::ok())
        }
        Mode::List { json } => {
            if json {
                emit_json(json!({ "people": directory.people() }));
            } else {
                println!("{LIST_HEADER}");
                for person in directory.people() {
                    println!("{person}");
                }
            }
            Ok(RunOutcome::ok())
        }
    }
}
