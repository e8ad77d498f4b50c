//! Purpose: Define the stable public Rust API for loading and searching a roster.
//! Exports: `Directory`, `SearchRequest`, `SearchResult`, and the core types they use.
//! Role: Public, additive-only surface used by the CLI, the session loop and tests.
//! Invariants: A `Directory` never changes after construction; searches take `&self`.
//! Invariants: Result order is store order regardless of query token order.

mod directory;

pub use crate::core::error::{Error, ErrorKind, to_exit_code};
pub use crate::core::index::InvertedIndex;
pub use crate::core::person::{ErrorPolicy, LoadOutcome, Person, SkippedLine};
pub use crate::core::query::{Semantics, Strategy};
pub use directory::{Directory, SearchRequest, SearchResult};
