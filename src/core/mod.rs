// Core modules implementing record parsing, indexing, query evaluation, and error modeling.
pub mod error;
pub mod index;
pub mod person;
pub mod query;
