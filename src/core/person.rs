// Person records and the line-oriented record parser.
use std::fmt;
use std::io::Read;

use bstr::ByteSlice;
use serde::Serialize;
use tracing::debug;

use crate::core::error::{Error, ErrorKind};

#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub struct Person {
    first_name: String,
    last_name: String,
    email: String,
}

impl Person {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
        }
    }

    pub fn without_email(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self::new(first_name, last_name, "")
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// Empty when the source line carried no email field.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// The three indexed fields, in index order.
    pub fn fields(&self) -> [&str; 3] {
        [&self.first_name, &self.last_name, &self.email].map(String::as_str)
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for field in self.fields().into_iter().filter(|field| !field.is_empty()) {
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(field)?;
            first = false;
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum ErrorPolicy {
    #[default]
    Stop,
    Skip,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct LoadOutcome {
    pub lines_total: u64,
    pub ok: u64,
    pub skipped: u64,
}

#[derive(Clone, Debug)]
pub struct SkippedLine {
    pub line: u64,
    pub message: String,
}

/// Parses one line into a person.
///
/// Fields are separated by single spaces, so consecutive spaces produce empty
/// fields. Lines with fewer than three fields keep the first and the last
/// field as first and last name (a single field fills both). Longer lines keep
/// the first two fields as names and the last field as email; anything in
/// between is dropped.
pub fn parse_record(line: &str) -> Result<Person, Error> {
    if line.is_empty() {
        return Err(Error::new(ErrorKind::Malformed).with_message("empty line has no fields"));
    }
    let fields: Vec<&str> = line.split(' ').collect();
    let (first, rest) = fields
        .split_first()
        .ok_or_else(|| Error::new(ErrorKind::Internal).with_message("split yielded no fields"))?;
    let last = rest.last().unwrap_or(first);
    if fields.len() < 3 {
        Ok(Person::without_email(*first, *last))
    } else {
        Ok(Person::new(*first, fields[1], *last))
    }
}

pub fn parse_records<I, S, N>(
    lines: I,
    policy: ErrorPolicy,
    mut on_skip: N,
) -> Result<(Vec<Person>, LoadOutcome), Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    N: FnMut(SkippedLine),
{
    let mut people = Vec::new();
    let mut outcome = LoadOutcome::default();

    for (index, line) in lines.into_iter().enumerate() {
        let line_no = index as u64 + 1;
        outcome.lines_total += 1;
        match parse_record(line.as_ref()) {
            Ok(person) => {
                people.push(person);
                outcome.ok += 1;
            }
            Err(err) => match policy {
                ErrorPolicy::Stop => return Err(err.with_line(line_no)),
                ErrorPolicy::Skip => {
                    outcome.skipped += 1;
                    on_skip(SkippedLine {
                        line: line_no,
                        message: err.message().unwrap_or("malformed record").to_string(),
                    });
                }
            },
        }
    }

    debug!(
        lines = outcome.lines_total,
        ok = outcome.ok,
        skipped = outcome.skipped,
        "parsed records"
    );
    Ok((people, outcome))
}

/// Reads and parses a whole record stream.
///
/// Accepts `\n` and `\r\n` endings; invalid UTF-8 is replaced lossily.
pub fn read_records<R, N>(
    mut reader: R,
    policy: ErrorPolicy,
    on_skip: N,
) -> Result<(Vec<Person>, LoadOutcome), Error>
where
    R: Read,
    N: FnMut(SkippedLine),
{
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to read records")
            .with_source(err)
    })?;
    parse_records(buf.lines().map(|line| line.to_str_lossy()), policy, on_skip)
}
