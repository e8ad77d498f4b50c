// Inverted index from lower-cased field values to record positions.
use std::collections::HashMap;

use tracing::debug;

use crate::core::person::Person;

/// Maps each lower-cased first name, last name and email to the positions of
/// the records carrying it.
///
/// Built once and never mutated. Position lists are ascending; a record whose
/// fields coincide after lower-casing appears more than once in the same list.
/// Blank emails are indexed under the empty token.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct InvertedIndex {
    postings: HashMap<String, Vec<usize>>,
}

impl InvertedIndex {
    pub fn build(people: &[Person]) -> Self {
        let postings = people
            .iter()
            .enumerate()
            .flat_map(|(position, person)| {
                person
                    .fields()
                    .map(|field| (field.to_lowercase(), position))
            })
            .fold(
                HashMap::<String, Vec<usize>>::new(),
                |mut postings, (token, position)| {
                    postings.entry(token).or_default().push(position);
                    postings
                },
            );
        debug!(
            records = people.len(),
            tokens = postings.len(),
            "built inverted index"
        );
        Self { postings }
    }

    /// Positions for an already-normalized token.
    pub fn lookup(&self, token: &str) -> Option<&[usize]> {
        self.postings.get(token).map(Vec::as_slice)
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.postings.keys().map(String::as_str)
    }
}
