//! Query pruning envelope
//!
//! The high cell of a query is the smallest hierarchical region certain to
//! contain every cost-optimal path between source and target: each endpoint's
//! tail cell is coarsened to its precomputed `lca_res`, and the envelope is
//! the lowest common ancestor of the two. When either endpoint lacks usable
//! metadata the envelope is inactive and the search prunes nothing.

use crate::cells;
use crate::graph::{CellId, EdgeId, ShortcutGraph};

/// Cell envelope constraining a pruned search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighCell {
    pub cell: CellId,
    pub res: i32,
}

impl HighCell {
    /// Inactive envelope: no pruning.
    pub const NONE: HighCell = HighCell { cell: 0, res: -1 };
}

/// Compute the envelope for a source/target pair.
pub fn compute_high_cell(graph: &ShortcutGraph, source: EdgeId, target: EdgeId) -> HighCell {
    let (Some(src), Some(dst)) = (graph.edge_meta(source), graph.edge_meta(target)) else {
        return HighCell::NONE;
    };

    let mut src_cell = src.incoming_cell;
    let mut dst_cell = dst.incoming_cell;
    if src_cell == 0 || dst_cell == 0 {
        return HighCell::NONE;
    }

    if src.lca_res >= 0 {
        src_cell = cells::parent(src_cell, src.lca_res);
    }
    if dst.lca_res >= 0 {
        dst_cell = cells::parent(dst_cell, dst.lca_res);
    }

    let lca = cells::lca(src_cell, dst_cell);
    if lca == 0 {
        HighCell::NONE
    } else {
        HighCell {
            cell: lca,
            res: cells::resolution(lca),
        }
    }
}
