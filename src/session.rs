//! Purpose: Drive the interactive menu over any line source and output sink.
//! Exports: `MenuChoice`, `Session`, and the fixed prompt/result texts.
//! Role: Console glue between stdin/stdout and the `Directory` search API.
//! Invariants: Each menu line is classified once into a `MenuChoice` and dispatched by `match`.
//! Invariants: An invalid strategy returns to the menu; it never ends the session.
//! Invariants: End of input ends the session like choosing `0`.
use std::fmt::Display;
use std::io::{self, BufRead, Write};

use bstr::ByteSlice;
use tracing::{debug, warn};

use crate::api::{Directory, Error, ErrorKind, Person, SearchRequest, Semantics, Strategy};

pub const MENU: &str = "=== Menu ===\n1. Search information.\n2. Print all data.\n0. Exit.";
pub const STRATEGY_PROMPT: &str = "Select a matching strategy: ALL, ANY, NONE";
pub const QUERY_PROMPT: &str = "Enter a name or email to search all suitable people.";
pub const NO_MATCHES: &str = "No matching people found.";
pub const LIST_HEADER: &str = "=== List of people ===";
pub const INCORRECT_OPTION: &str = "Incorrect option! Try again.";
pub const INVALID_STRATEGY: &str = "Invalid strategy! Use ALL, ANY or NONE.";

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MenuChoice {
    Search,
    ListAll,
    Exit,
    Unrecognized,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Self {
        match input {
            "1" => MenuChoice::Search,
            "2" => MenuChoice::ListAll,
            "0" => MenuChoice::Exit,
            _ => MenuChoice::Unrecognized,
        }
    }
}

enum Flow {
    Continue,
    Stop,
}

pub struct Session<'d, R, W> {
    directory: &'d Directory,
    input: R,
    output: W,
    semantics: Semantics,
}

impl<'d, R, W> Session<'d, R, W>
where
    R: BufRead,
    W: Write,
{
    pub fn new(directory: &'d Directory, input: R, output: W) -> Self {
        Self {
            directory,
            input,
            output,
            semantics: Semantics::default(),
        }
    }

    pub fn with_semantics(mut self, semantics: Semantics) -> Self {
        self.semantics = semantics;
        self
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub fn run(&mut self) -> Result<(), Error> {
        loop {
            self.write_line(MENU)?;
            let Some(line) = self.read_line()? else {
                debug!("input closed at menu");
                return Ok(());
            };
            let choice = MenuChoice::parse(&line);
            let flow = match choice {
                MenuChoice::Search => self.search()?,
                MenuChoice::ListAll => {
                    let directory = self.directory;
                    self.print_people(LIST_HEADER, directory.people().iter())?;
                    Flow::Continue
                }
                MenuChoice::Exit => {
                    self.write_line("")?;
                    Flow::Stop
                }
                MenuChoice::Unrecognized => {
                    self.write_line(INCORRECT_OPTION)?;
                    Flow::Continue
                }
            };
            if let Flow::Stop = flow {
                self.output.flush().map_err(|err| io_error(err, "failed to flush output"))?;
                return Ok(());
            }
        }
    }

    fn search(&mut self) -> Result<Flow, Error> {
        self.write_line(STRATEGY_PROMPT)?;
        let Some(name) = self.read_line()? else {
            return Ok(Flow::Stop);
        };
        let strategy = match name.parse::<Strategy>() {
            Ok(strategy) => strategy,
            Err(err) if err.kind() == ErrorKind::InvalidStrategy => {
                warn!(input = %name, "invalid strategy");
                self.write_line(INVALID_STRATEGY)?;
                return Ok(Flow::Continue);
            }
            Err(err) => return Err(err),
        };

        self.write_line(QUERY_PROMPT)?;
        let Some(query) = self.read_line()? else {
            return Ok(Flow::Stop);
        };

        let directory = self.directory;
        let request = SearchRequest::new(strategy, query).with_semantics(self.semantics);
        let result = directory.search(&request);
        if result.is_empty() {
            self.write_line(NO_MATCHES)?;
        } else {
            let header = format!("{} persons found:", result.len());
            self.print_people(&header, result.people().iter().copied())?;
        }
        Ok(Flow::Continue)
    }

    fn print_people<'p>(
        &mut self,
        header: &str,
        people: impl Iterator<Item = &'p Person>,
    ) -> Result<(), Error> {
        self.write_line(header)?;
        for person in people {
            self.write_line(person)?;
        }
        Ok(())
    }

    fn write_line(&mut self, line: impl Display) -> Result<(), Error> {
        writeln!(self.output, "{line}").map_err(|err| io_error(err, "failed to write output"))
    }

    /// Next input line without its terminator, or `None` at end of input.
    /// Invalid UTF-8 is replaced lossily, as in the data file.
    fn read_line(&mut self) -> Result<Option<String>, Error> {
        self.output
            .flush()
            .map_err(|err| io_error(err, "failed to flush output"))?;
        let mut buf = Vec::new();
        let read = self
            .input
            .read_until(b'\n', &mut buf)
            .map_err(|err| io_error(err, "failed to read input"))?;
        if read == 0 {
            return Ok(None);
        }
        let line = buf
            .strip_suffix(b"\n")
            .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
            .unwrap_or(buf.as_slice());
        Ok(Some(line.to_str_lossy().into_owned()))
    }
}

fn io_error(err: io::Error, message: &str) -> Error {
    Error::new(ErrorKind::Io)
        .with_message(message)
        .with_source(err)
}
