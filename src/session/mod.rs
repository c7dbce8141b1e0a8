//! Query engine session
//!
//! An explicit, caller-owned handle on the embedded DuckDB engine. The
//! session is created once per run, shared by reference across the
//! pipeline stages, and closed by whoever opened it.

mod engine;

pub use engine::{is_identifier, Session};

#[cfg(test)]
mod tests;
