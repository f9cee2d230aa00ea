//! Shortcut artifact reader
//!
//! The artifact is a Parquet file, or a directory of them, with schema:
//!
//!   incoming_edge: int64
//!   outgoing_edge: int64
//!   cost:          float64
//!   via_edge:      int64
//!   cell:          int64
//!   inside:        int8
//!
//! Files may be chunked into multiple record batches; all rows are
//! concatenated in file order. A missing column, a mistyped column, or an
//! `inside` value outside {-2, -1, 0, +1} is a load error, as is an artifact
//! that yields zero records.

use anyhow::{ensure, Context, Result};
use arrow::array::{Array, Float64Array, Int64Array, Int8Array};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::fs::File;
use std::path::Path;

use crate::graph::{Inside, Shortcut};

/// Read every shortcut record under `path` (a single file or a directory of
/// `*.parquet` files).
pub fn read_all<P: AsRef<Path>>(path: P) -> Result<Vec<Shortcut>> {
    let path = path.as_ref();
    let mut shortcuts = Vec::new();

    if path.is_dir() {
        let entries = std::fs::read_dir(path)
            .with_context(|| format!("Failed to read directory {}", path.display()))?;
        for entry in entries {
            let file_path = entry?.path();
            if file_path.extension().is_some_and(|ext| ext == "parquet") {
                read_file(&file_path, &mut shortcuts)?;
            }
        }
    } else {
        read_file(path, &mut shortcuts)?;
    }

    ensure!(
        !shortcuts.is_empty(),
        "No shortcut records in {}",
        path.display()
    );
    Ok(shortcuts)
}

fn read_file(path: &Path, out: &mut Vec<Shortcut>) -> Result<()> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .with_context(|| format!("Not a Parquet file: {}", path.display()))?
        .build()?;

    for batch in reader {
        let batch = batch?;
        append_batch(&batch, out)
            .with_context(|| format!("Bad shortcut batch in {}", path.display()))?;
    }
    Ok(())
}

fn append_batch(batch: &RecordBatch, out: &mut Vec<Shortcut>) -> Result<()> {
    let incoming = column::<Int64Array>(batch, "incoming_edge")?;
    let outgoing = column::<Int64Array>(batch, "outgoing_edge")?;
    let cost = column::<Float64Array>(batch, "cost")?;
    let via = column::<Int64Array>(batch, "via_edge")?;
    let cell = column::<Int64Array>(batch, "cell")?;
    let inside = column::<Int8Array>(batch, "inside")?;

    out.reserve(batch.num_rows());
    for i in 0..batch.num_rows() {
        out.push(Shortcut {
            from: incoming.value(i) as u32,
            to: outgoing.value(i) as u32,
            cost: cost.value(i),
            via_edge: via.value(i) as u32,
            cell: cell.value(i) as u64,
            inside: Inside::from_raw(inside.value(i))?,
        });
    }
    Ok(())
}

fn column<'a, T: 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    let col = batch
        .column_by_name(name)
        .with_context(|| format!("Missing column: {}", name))?;
    col.as_any()
        .downcast_ref::<T>()
        .with_context(|| format!("Column {} has an unexpected type", name))
}
