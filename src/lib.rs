//! Purpose: Library crate behind the `roster` CLI and its tests.
//! Exports: `api` (stable facade), `core` (records, index, queries, errors), `session`.
//! Role: Everything except argument parsing and process bootstrap lives here.
//! Invariants: The record store and index are immutable once loaded.
//! Invariants: Core modules are pure functions over explicit inputs; no hidden state.
pub mod api;
pub mod core;
pub mod session;
