//! Hexroute: least-cost path queries over a hierarchical shortcut graph
//!
//! The engine answers point-to-point queries between directed road edges on a
//! precomputed artifact:
//! - Shortcuts: contracted arcs between edges, each tagged with its role in
//!   the hierarchy (up / lateral / down / boundary) and a bounding cell
//! - Edge metadata: per-edge cost and the hex cells at its endpoints
//!
//! Load once, build adjacencies, then serve queries. Three entry points share
//! the bidirectional core: classic (hierarchy filtering only), pruned (cell
//! envelope pruning on top), and multi-endpoint (weighted source/target sets).
//!
//! Key principle: the store is immutable after load. Queries own all of their
//! transient state, so any number may run concurrently against one graph.

pub mod cells;
pub mod cli;
pub mod formats;
pub mod graph;
pub mod highcell;
pub mod search;

pub use graph::{EdgeId, EdgeMeta, Inside, Shortcut, ShortcutGraph};
pub use highcell::{compute_high_cell, HighCell};
pub use search::{query_classic, query_multi, query_pruned, QueryResult};
