//! Artifact readers
//!
//! One module per input: the columnar shortcut artifact and the delimited
//! edge metadata table. Readers return plain records; the graph builds its
//! own indexes.

pub mod edges;
pub mod shortcuts;
