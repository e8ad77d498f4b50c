// Matching strategies, query evaluation over the inverted index, and result projection.
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::core::error::{Error, ErrorKind};
use crate::core::index::InvertedIndex;
use crate::core::person::Person;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Strategy {
    /// Records matching every token.
    All,
    /// Records matching at least one token.
    Any,
    /// Records matching no token.
    None,
}

impl Strategy {
    pub const NAMES: [&'static str; 3] = ["ALL", "ANY", "NONE"];

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::All => "ALL",
            Strategy::Any => "ANY",
            Strategy::None => "NONE",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Names are matched exactly; `all` or ` ALL` are rejected.
impl FromStr for Strategy {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input {
            "ALL" => Ok(Strategy::All),
            "ANY" => Ok(Strategy::Any),
            "NONE" => Ok(Strategy::None),
            _ => Err(Error::new(ErrorKind::InvalidStrategy)
                .with_message(format!("invalid strategy `{input}`"))
                .with_hint("Use ALL, ANY or NONE (upper case).")),
        }
    }
}

/// How the accumulator is seeded while folding token lookups.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Semantics {
    /// Any lookup that finds matches while the accumulator is empty replaces
    /// it. Under ALL this means a token can restart the intersection after
    /// earlier tokens intersected down to nothing.
    #[default]
    Compatible,
    /// Only the first token seeds; ALL is a plain intersection.
    Strict,
}

/// Splits raw query text on single spaces.
///
/// Empty text yields one empty token, which matches records with a blank email.
pub fn tokenize(query: &str) -> Vec<&str> {
    query.split(' ').collect()
}

/// Combines the postings of `tokens` under `strategy`.
///
/// Tokens are lower-cased before lookup. A token missing from the index ends an
/// ALL evaluation with no results; for ANY and NONE it contributes nothing.
/// NONE returns the complement of the union within `0..total`.
pub fn evaluate<S: AsRef<str>>(
    strategy: Strategy,
    semantics: Semantics,
    tokens: &[S],
    index: &InvertedIndex,
    total: usize,
) -> BTreeSet<usize> {
    let mut matched = BTreeSet::new();
    let mut seeded = false;

    for token in tokens {
        let token = token.as_ref().to_lowercase();
        let Some(positions) = index.lookup(&token) else {
            if strategy == Strategy::All {
                debug!(%strategy, token = %token, "required token absent");
                return BTreeSet::new();
            }
            continue;
        };

        let seed = match semantics {
            Semantics::Compatible => matched.is_empty(),
            Semantics::Strict => !seeded,
        };
        if seed {
            matched = positions.iter().copied().collect();
            seeded = true;
        } else {
            match strategy {
                Strategy::All => matched.retain(|position| positions.contains(position)),
                Strategy::Any | Strategy::None => matched.extend(positions.iter().copied()),
            }
        }
    }

    let result = match strategy {
        Strategy::All | Strategy::Any => matched,
        Strategy::None => (0..total)
            .filter(|position| !matched.contains(position))
            .collect(),
    };
    debug!(%strategy, tokens = tokens.len(), matches = result.len(), "evaluated query");
    result
}

/// Records whose positions are in `positions`, in store order.
pub fn project<'a>(people: &'a [Person], positions: &BTreeSet<usize>) -> Vec<&'a Person> {
    people
        .iter()
        .enumerate()
        .filter(|(position, _)| positions.contains(position))
        .map(|(_, person)| person)
        .collect()
}
