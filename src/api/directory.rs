//! Purpose: Bundle the record store with its inverted index behind one read-only handle.
//! Exports: `Directory`, `SearchRequest`, `SearchResult`.
//! Role: Load path (file or reader) and search entry point for callers.
//! Invariants: Index positions always refer to `people` of the same directory.
//! Invariants: Loading logs skipped lines as warnings and never mutates after return.
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::{info, warn};

use crate::core::error::Error;
use crate::core::index::InvertedIndex;
use crate::core::person::{ErrorPolicy, LoadOutcome, Person, SkippedLine, read_records};
use crate::core::query::{Semantics, Strategy, evaluate, project, tokenize};

#[derive(Clone, Debug)]
pub struct Directory {
    people: Vec<Person>,
    index: InvertedIndex,
    outcome: LoadOutcome,
}

impl Directory {
    pub fn from_people(people: Vec<Person>) -> Self {
        let count = people.len() as u64;
        Self::with_outcome(
            people,
            LoadOutcome {
                lines_total: count,
                ok: count,
                skipped: 0,
            },
        )
    }

    pub fn from_reader<R: Read>(reader: R, policy: ErrorPolicy) -> Result<Self, Error> {
        let (people, outcome) = read_records(reader, policy, log_skipped)?;
        Ok(Self::with_outcome(people, outcome))
    }

    pub fn open(path: impl AsRef<Path>, policy: ErrorPolicy) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| Error::from_open(err, path))?;
        let directory =
            Self::from_reader(BufReader::new(file), policy).map_err(|err| err.with_path(path))?;
        info!(
            path = %path.display(),
            people = directory.len(),
            skipped = directory.outcome.skipped,
            "loaded roster"
        );
        Ok(directory)
    }

    fn with_outcome(people: Vec<Person>, outcome: LoadOutcome) -> Self {
        let index = InvertedIndex::build(&people);
        Self {
            people,
            index,
            outcome,
        }
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    pub fn load_outcome(&self) -> LoadOutcome {
        self.outcome
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    pub fn search(&self, request: &SearchRequest) -> SearchResult<'_> {
        let tokens = tokenize(&request.query);
        let positions = evaluate(
            request.strategy,
            request.semantics,
            &tokens,
            &self.index,
            self.people.len(),
        );
        let people = project(&self.people, &positions);
        SearchResult { positions, people }
    }
}

fn log_skipped(skipped: SkippedLine) {
    warn!(line = skipped.line, reason = %skipped.message, "skipped malformed record");
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SearchRequest {
    pub strategy: Strategy,
    pub semantics: Semantics,
    pub query: String,
}

impl SearchRequest {
    pub fn new(strategy: Strategy, query: impl Into<String>) -> Self {
        Self {
            strategy,
            semantics: Semantics::default(),
            query: query.into(),
        }
    }

    pub fn with_semantics(mut self, semantics: Semantics) -> Self {
        self.semantics = semantics;
        self
    }
}

#[derive(Clone, Debug)]
pub struct SearchResult<'a> {
    positions: BTreeSet<usize>,
    people: Vec<&'a Person>,
}

impl<'a> SearchResult<'a> {
    pub fn positions(&self) -> &BTreeSet<usize> {
        &self.positions
    }

    /// Matches in store order.
    pub fn people(&self) -> &[&'a Person] {
        &self.people
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }
}
