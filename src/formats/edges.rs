//! Edge metadata table reader
//!
//! Header-delimited text, eleven comma-separated columns:
//!
//!   source, target, length, maxspeed, geometry, highway, cost,
//!   incoming_cell, outgoing_cell, lca_res, id
//!
//! Only length, cost, the two cells, lca_res, and id are consumed. The
//! geometry column may contain commas inside double-quoted fields, so fields
//! are split with a quote toggle rather than a plain comma scan. Rows with
//! too few columns or unparseable numbers are dropped silently; a table that
//! yields zero records is a load error.

use anyhow::{ensure, Context, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::graph::{EdgeId, EdgeMeta};

const COLUMNS: usize = 11;

const COL_LENGTH: usize = 2;
const COL_COST: usize = 6;
const COL_INCOMING_CELL: usize = 7;
const COL_OUTGOING_CELL: usize = 8;
const COL_LCA_RES: usize = 9;
const COL_ID: usize = 10;

/// Read every edge record from the table at `path`.
pub fn read_all<P: AsRef<Path>>(path: P) -> Result<HashMap<EdgeId, EdgeMeta>> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut lines = BufReader::new(file).lines();

    if let Some(header) = lines.next() {
        header?;
    }

    let mut meta = HashMap::new();
    for line in lines {
        let line = line?;
        let fields = split_fields(&line);
        if fields.len() < COLUMNS {
            continue;
        }
        if let Some((id, record)) = parse_row(&fields) {
            meta.insert(id, record);
        }
    }

    ensure!(!meta.is_empty(), "No edge records in {}", path.display());
    Ok(meta)
}

fn parse_row(fields: &[String]) -> Option<(EdgeId, EdgeMeta)> {
    let id = fields[COL_ID].parse().ok()?;
    let record = EdgeMeta {
        incoming_cell: fields[COL_INCOMING_CELL].parse().ok()?,
        outgoing_cell: fields[COL_OUTGOING_CELL].parse().ok()?,
        lca_res: fields[COL_LCA_RES].parse().ok()?,
        length: fields[COL_LENGTH].parse().ok()?,
        cost: fields[COL_COST].parse().ok()?,
    };
    Some((id, record))
}

/// Split a line on commas, treating `"` as a quoted-state toggle. Quote
/// characters themselves are dropped.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}
