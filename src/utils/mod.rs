//! Shared utilities.

pub mod tags;

pub use tags::extract_tags;
