//! Bidirectional shortest-path engine
//!
//! Two best-first searches run simultaneously, forward from the source edge
//! and backward from the target edge, meeting in the middle. The backward
//! side seeds with the target's own metadata cost: shortcuts connect edges,
//! not vertices, so the final edge's traversal must be counted somewhere.
//!
//! Queues use classical lazy deletion: relaxation never removes superseded
//! entries, the pop site discards anything staler than the distance map.
//! Admissibility of a shortcut is a tabulated function of its `inside` tag,
//! the search direction, and the popped node's position relative to the
//! query's cell envelope.
//!
//! All search state is local to one query call. Nothing leaks between
//! queries, so concurrent queries against one graph need no coordination.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::cells;
use crate::graph::{EdgeId, Inside, ShortcutGraph};
use crate::highcell::{compute_high_cell, HighCell};

/// Outcome of a query.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    /// Total path cost, or -1 when unreachable.
    pub distance: f64,
    /// Every edge on the itinerary, source first. Shortcuts are not expanded
    /// to their contracted intermediates.
    pub path: Vec<EdgeId>,
    pub reachable: bool,
}

impl QueryResult {
    fn unreachable() -> Self {
        Self {
            distance: -1.0,
            path: Vec::new(),
            reachable: false,
        }
    }

    fn trivial(graph: &ShortcutGraph, edge: EdgeId) -> Self {
        Self {
            distance: graph.edge_cost(edge),
            path: vec![edge],
            reachable: true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct HeapEntry {
    dist: f64,
    edge: EdgeId,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.dist == other.dist
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap: reverse ordering. Costs are finite by load invariant.
        other.dist.partial_cmp(&self.dist).unwrap_or(Ordering::Equal)
    }
}

/// One direction's transient search state.
#[derive(Default)]
struct SearchDir {
    dist: HashMap<EdgeId, f64>,
    parent: HashMap<EdgeId, EdgeId>,
    heap: BinaryHeap<HeapEntry>,
}

impl SearchDir {
    fn new() -> Self {
        Self::default()
    }

    /// Tentative distance of `edge`; unseen edges are at infinity, never 0.
    fn dist_to(&self, edge: EdgeId) -> f64 {
        self.dist.get(&edge).copied().unwrap_or(f64::INFINITY)
    }

    /// Install an origin: its parent is itself.
    fn seed(&mut self, edge: EdgeId, dist: f64) {
        self.dist.insert(edge, dist);
        self.parent.insert(edge, edge);
        self.heap.push(HeapEntry { dist, edge });
    }

    /// Relax `edge` to `dist` reached via `via`; true if this improved it.
    fn relax(&mut self, edge: EdgeId, dist: f64, via: EdgeId) -> bool {
        if dist < self.dist_to(edge) {
            self.dist.insert(edge, dist);
            self.parent.insert(edge, via);
            self.heap.push(HeapEntry { dist, edge });
            true
        } else {
            false
        }
    }

    fn pop(&mut self) -> Option<HeapEntry> {
        self.heap.pop()
    }

    /// Whether this frontier can still improve on `best`.
    fn exhausted(&self, best: f64) -> bool {
        self.heap.peek().map_or(true, |entry| entry.dist >= best)
    }
}

/// Best known meeting of the two frontiers.
struct Meeting {
    best: f64,
    edge: Option<EdgeId>,
}

impl Meeting {
    fn new() -> Self {
        Self {
            best: f64::INFINITY,
            edge: None,
        }
    }

    fn offer(&mut self, total: f64, edge: EdgeId) {
        if total < self.best {
            self.best = total;
            self.edge = Some(edge);
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Forward,
    Backward,
}

/// Position of a popped node relative to the query envelope. `pruned` is
/// false for searches that never prune; `check` and `at_high` then keep
/// their degenerate values.
#[derive(Debug, Clone, Copy)]
struct Gate {
    pruned: bool,
    check: bool,
    at_high: bool,
}

impl Gate {
    /// Gate of an unpruned search: everything the direction allows.
    const OPEN: Gate = Gate {
        pruned: false,
        check: true,
        at_high: false,
    };

    fn pruned_at(graph: &ShortcutGraph, edge: EdgeId, high: HighCell) -> Gate {
        let cell = graph.edge_cell(edge);
        Gate {
            pruned: true,
            check: cells::parent_check(cell, high.cell, high.res),
            at_high: cell == high.cell,
        }
    }
}

/// Shortcut admissibility. Forward search climbs the hierarchy; backward
/// search descends inside the envelope, runs laterally at or above it, and
/// takes boundary arcs only strictly outside.
fn admits(direction: Direction, inside: Inside, gate: Gate) -> bool {
    match (direction, inside) {
        (Direction::Forward, Inside::Up) => true,
        (Direction::Forward, _) => false,
        (Direction::Backward, Inside::Down) => !gate.pruned || gate.check,
        (Direction::Backward, Inside::Lateral) => !gate.pruned || gate.at_high || !gate.check,
        (Direction::Backward, Inside::Boundary) => gate.pruned && !gate.check,
        (Direction::Backward, Inside::Up) => false,
    }
}

/// Bidirectional search with hierarchy filtering only.
///
/// Meetings are detected at relaxation time: whenever one side improves an
/// edge the other side has already reached.
pub fn query_classic(graph: &ShortcutGraph, source: EdgeId, target: EdgeId) -> QueryResult {
    if source == target {
        return QueryResult::trivial(graph, source);
    }

    let mut fwd = SearchDir::new();
    let mut bwd = SearchDir::new();
    fwd.seed(source, 0.0);
    bwd.seed(target, graph.edge_cost(target));

    let mut meeting = Meeting::new();

    while !(fwd.heap.is_empty() && bwd.heap.is_empty()) {
        if let Some(HeapEntry { dist, edge }) = fwd.pop() {
            if dist <= fwd.dist_to(edge) && dist < meeting.best {
                for sc in graph.forward(edge) {
                    if !admits(Direction::Forward, sc.inside, Gate::OPEN) {
                        continue;
                    }
                    let next = dist + sc.cost;
                    if fwd.relax(sc.to, next, edge) {
                        let back = bwd.dist_to(sc.to);
                        if back.is_finite() {
                            meeting.offer(next + back, sc.to);
                        }
                    }
                }
            }
        }

        if let Some(HeapEntry { dist, edge }) = bwd.pop() {
            if dist <= bwd.dist_to(edge) && dist < meeting.best {
                for sc in graph.backward(edge) {
                    if !admits(Direction::Backward, sc.inside, Gate::OPEN) {
                        continue;
                    }
                    let next = dist + sc.cost;
                    if bwd.relax(sc.from, next, edge) {
                        let ahead = fwd.dist_to(sc.from);
                        if ahead.is_finite() {
                            meeting.offer(ahead + next, sc.from);
                        }
                    }
                }
            }
        }

        if fwd.exhausted(meeting.best) && bwd.exhausted(meeting.best) {
            break;
        }
    }

    finish(&fwd, &bwd, meeting)
}

/// Bidirectional search pruned to the query's cell envelope.
///
/// Meetings are detected when popping a node; with nonnegative costs a
/// popped distance is final, so this finds the same optimum as testing at
/// relaxation.
pub fn query_pruned(graph: &ShortcutGraph, source: EdgeId, target: EdgeId) -> QueryResult {
    if source == target {
        return QueryResult::trivial(graph, source);
    }

    let high = compute_high_cell(graph, source, target);

    let mut fwd = SearchDir::new();
    let mut bwd = SearchDir::new();
    fwd.seed(source, 0.0);
    bwd.seed(target, graph.edge_cost(target));

    let mut meeting = Meeting::new();

    while !(fwd.heap.is_empty() && bwd.heap.is_empty()) {
        if let Some(HeapEntry { dist, edge }) = fwd.pop() {
            if dist <= fwd.dist_to(edge) && dist < meeting.best {
                let back = bwd.dist_to(edge);
                if back.is_finite() {
                    meeting.offer(dist + back, edge);
                }
                // Nodes outside the envelope are never expanded forward, but
                // the meeting test above has already run for them.
                if cells::parent_check(graph.edge_cell(edge), high.cell, high.res) {
                    for sc in graph.forward(edge) {
                        if !admits(Direction::Forward, sc.inside, Gate::OPEN) {
                            continue;
                        }
                        fwd.relax(sc.to, dist + sc.cost, edge);
                    }
                }
            }
        }

        if let Some(HeapEntry { dist, edge }) = bwd.pop() {
            if dist <= bwd.dist_to(edge) && dist < meeting.best {
                let ahead = fwd.dist_to(edge);
                if ahead.is_finite() {
                    meeting.offer(ahead + dist, edge);
                }
                let gate = Gate::pruned_at(graph, edge, high);
                for sc in graph.backward(edge) {
                    if !admits(Direction::Backward, sc.inside, gate) {
                        continue;
                    }
                    bwd.relax(sc.from, dist + sc.cost, edge);
                }
            }
        }

        if fwd.exhausted(meeting.best) && bwd.exhausted(meeting.best) {
            break;
        }
    }

    finish(&fwd, &bwd, meeting)
}

/// Bidirectional search from weighted source and target sets.
///
/// Each `(edge, dist)` pair seeds its frontier at the given offset; targets
/// additionally carry their own edge cost, as in the single-endpoint case.
/// Endpoints without metadata are ignored. Hierarchy filtering matches the
/// classic variant.
pub fn query_multi(
    graph: &ShortcutGraph,
    sources: &[(EdgeId, f64)],
    targets: &[(EdgeId, f64)],
) -> QueryResult {
    let mut fwd = SearchDir::new();
    let mut bwd = SearchDir::new();

    for &(edge, dist) in sources {
        if graph.edge_meta(edge).is_some() {
            fwd.seed(edge, dist);
        }
    }
    for &(edge, dist) in targets {
        if graph.edge_meta(edge).is_some() {
            bwd.seed(edge, dist + graph.edge_cost(edge));
        }
    }

    let mut meeting = Meeting::new();

    while !(fwd.heap.is_empty() && bwd.heap.is_empty()) {
        if let Some(HeapEntry { dist, edge }) = fwd.pop() {
            let back = bwd.dist_to(edge);
            if back.is_finite() {
                meeting.offer(dist + back, edge);
            }
            if dist <= fwd.dist_to(edge) && dist < meeting.best {
                for sc in graph.forward(edge) {
                    if admits(Direction::Forward, sc.inside, Gate::OPEN) {
                        fwd.relax(sc.to, dist + sc.cost, edge);
                    }
                }
            }
        }

        if let Some(HeapEntry { dist, edge }) = bwd.pop() {
            let ahead = fwd.dist_to(edge);
            if ahead.is_finite() {
                meeting.offer(ahead + dist, edge);
            }
            if dist <= bwd.dist_to(edge) && dist < meeting.best {
                for sc in graph.backward(edge) {
                    if admits(Direction::Backward, sc.inside, Gate::OPEN) {
                        bwd.relax(sc.from, dist + sc.cost, edge);
                    }
                }
            }
        }

        // Once a meeting exists, a frontier that can no longer improve it is
        // drained outright.
        if meeting.best.is_finite() {
            if fwd.exhausted(meeting.best) {
                fwd.heap.clear();
            }
            if bwd.exhausted(meeting.best) {
                bwd.heap.clear();
            }
        }
    }

    finish(&fwd, &bwd, meeting)
}

fn finish(fwd: &SearchDir, bwd: &SearchDir, meeting: Meeting) -> QueryResult {
    let Some(edge) = meeting.edge else {
        return QueryResult::unreachable();
    };
    QueryResult {
        distance: meeting.best,
        path: reconstruct(fwd, bwd, edge),
        reachable: true,
    }
}

/// Walk the forward parent chain back to its origin, then the backward chain
/// out to its origin. The meeting edge appears exactly once.
fn reconstruct(fwd: &SearchDir, bwd: &SearchDir, meeting: EdgeId) -> Vec<EdgeId> {
    let mut path = Vec::new();

    let mut current = meeting;
    while let Some(&prev) = fwd.parent.get(&current) {
        path.push(current);
        if prev == current {
            break;
        }
        current = prev;
    }
    path.reverse();

    current = meeting;
    while let Some(&next) = bwd.parent.get(&current) {
        if next == current {
            break;
        }
        path.push(next);
        current = next;
    }

    path
}
