//! Shortcut graph store
//!
//! Shortcuts are kept contiguously; adjacency maps an edge id to the record
//! positions incident to it. That keeps the store trivially immutable after
//! load and cache-friendly to scan. Shortcuts bridge *edges*, not vertices:
//! `from` and `to` are both directed road segments.

use anyhow::{bail, Result};
use std::collections::HashMap;
use std::path::Path;

use crate::formats;

/// Identifier of a directed road segment. Opaque to the engine.
pub type EdgeId = u32;

/// Identifier of a hex grid cell. 0 means "no cell".
pub type CellId = u64;

/// Hierarchical role of a shortcut, stored on disk as a small integer.
///
/// The tag governs admissibility: forward search climbs `Up` arcs only, while
/// backward search descends `Down` and `Lateral` arcs, plus `Boundary` arcs
/// when it walks outside the query's cell envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inside {
    /// Ascends the hierarchy, away from the leaves (+1).
    Up,
    /// Traverses within the current level (0).
    Lateral,
    /// Descends the hierarchy, toward the leaves (-1).
    Down,
    /// Crosses the envelope of the query's high cell (-2).
    Boundary,
}

impl Inside {
    pub fn from_raw(raw: i8) -> Result<Self> {
        match raw {
            1 => Ok(Inside::Up),
            0 => Ok(Inside::Lateral),
            -1 => Ok(Inside::Down),
            -2 => Ok(Inside::Boundary),
            other => bail!("Invalid inside tag: {}", other),
        }
    }

    pub fn raw(self) -> i8 {
        match self {
            Inside::Up => 1,
            Inside::Lateral => 0,
            Inside::Down => -1,
            Inside::Boundary => -2,
        }
    }
}

/// A precomputed arc between two edges.
#[derive(Debug, Clone, Copy)]
pub struct Shortcut {
    pub from: EdgeId,
    pub to: EdgeId,
    /// Nonnegative traversal cost.
    pub cost: f64,
    /// Intermediate edge when the shortcut contracts a longer path; 0 if
    /// direct. Recorded but not expanded during path reconstruction.
    pub via_edge: EdgeId,
    /// Cell bounding this shortcut.
    pub cell: CellId,
    pub inside: Inside,
}

/// Per-edge metadata from the edge table.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeMeta {
    /// Cell at the edge's tail endpoint.
    pub incoming_cell: CellId,
    /// Cell at the edge's head endpoint.
    pub outgoing_cell: CellId,
    /// Resolution both endpoints are coarsened to before the envelope LCA is
    /// taken; -1 means no coarsening.
    pub lca_res: i32,
    pub length: f64,
    pub cost: f64,
}

/// Immutable store of shortcuts and edge metadata with forward/backward
/// adjacency by endpoint edge id.
#[derive(Debug, Default)]
pub struct ShortcutGraph {
    shortcuts: Vec<Shortcut>,
    fwd_adj: HashMap<EdgeId, Vec<u32>>,
    bwd_adj: HashMap<EdgeId, Vec<u32>>,
    edge_meta: HashMap<EdgeId, EdgeMeta>,
}

impl ShortcutGraph {
    /// Build the store and its adjacency indexes from loaded records.
    pub fn from_parts(shortcuts: Vec<Shortcut>, edge_meta: HashMap<EdgeId, EdgeMeta>) -> Self {
        let mut fwd_adj: HashMap<EdgeId, Vec<u32>> = HashMap::new();
        let mut bwd_adj: HashMap<EdgeId, Vec<u32>> = HashMap::new();
        for (idx, sc) in shortcuts.iter().enumerate() {
            fwd_adj.entry(sc.from).or_default().push(idx as u32);
            bwd_adj.entry(sc.to).or_default().push(idx as u32);
        }
        Self {
            shortcuts,
            fwd_adj,
            bwd_adj,
            edge_meta,
        }
    }

    /// Load the store from a shortcut artifact and an edge metadata table.
    pub fn load(shortcuts_path: &Path, edges_path: &Path) -> Result<Self> {
        let shortcuts = formats::shortcuts::read_all(shortcuts_path)?;
        let edge_meta = formats::edges::read_all(edges_path)?;
        Ok(Self::from_parts(shortcuts, edge_meta))
    }

    /// Metadata cost of `edge`, or 0 if unknown.
    pub fn edge_cost(&self, edge: EdgeId) -> f64 {
        self.edge_meta.get(&edge).map_or(0.0, |m| m.cost)
    }

    /// Tail-endpoint cell of `edge`, or 0 if unknown.
    pub fn edge_cell(&self, edge: EdgeId) -> CellId {
        self.edge_meta.get(&edge).map_or(0, |m| m.incoming_cell)
    }

    pub fn edge_meta(&self, edge: EdgeId) -> Option<&EdgeMeta> {
        self.edge_meta.get(&edge)
    }

    /// Shortcuts leaving `edge` (`from == edge`).
    pub fn forward(&self, edge: EdgeId) -> impl Iterator<Item = &Shortcut> + '_ {
        self.fwd_adj
            .get(&edge)
            .into_iter()
            .flatten()
            .map(|&idx| &self.shortcuts[idx as usize])
    }

    /// Shortcuts entering `edge` (`to == edge`).
    pub fn backward(&self, edge: EdgeId) -> impl Iterator<Item = &Shortcut> + '_ {
        self.bwd_adj
            .get(&edge)
            .into_iter()
            .flatten()
            .map(|&idx| &self.shortcuts[idx as usize])
    }

    pub fn shortcut_count(&self) -> usize {
        self.shortcuts.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_meta.len()
    }
}
