//! Loader round trips: write real artifacts to disk, load them back, query.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, Int8Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use tempfile::TempDir;

use hexroute::{query_classic, query_pruned, ShortcutGraph};

/// (incoming_edge, outgoing_edge, cost, via_edge, cell, inside)
type Row = (i64, i64, f64, i64, i64, i8);

fn shortcut_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("incoming_edge", DataType::Int64, false),
        Field::new("outgoing_edge", DataType::Int64, false),
        Field::new("cost", DataType::Float64, false),
        Field::new("via_edge", DataType::Int64, false),
        Field::new("cell", DataType::Int64, false),
        Field::new("inside", DataType::Int8, false),
    ]))
}

fn write_shortcut_file(path: &Path, rows: &[Row]) {
    let schema = shortcut_schema();
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.0))),
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.1))),
        Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.2))),
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.3))),
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.4))),
        Arc::new(Int8Array::from_iter_values(rows.iter().map(|r| r.5))),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();

    let file = File::create(path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
}

/// (id, cost, incoming_cell, outgoing_cell, lca_res)
fn write_edges_csv(path: &Path, rows: &[(u32, f64, u64, u64, i32)]) {
    let mut out = String::from(
        "source,target,length,maxspeed,geometry,highway,cost,incoming_cell,outgoing_cell,lca_res,id\n",
    );
    for &(id, cost, incoming, outgoing, lca_res) in rows {
        out.push_str(&format!(
            "0,0,10.0,50,\"LINESTRING(7.42 43.73, 7.43 43.74)\",residential,{},{},{},{},{}\n",
            cost, incoming, outgoing, lca_res, id
        ));
    }
    std::fs::write(path, out).unwrap();
}

#[test]
fn loads_a_single_file_and_answers_queries() {
    let dir = TempDir::new().unwrap();
    let shortcuts_path = dir.path().join("shortcuts.parquet");
    let edges_path = dir.path().join("edges.csv");

    write_shortcut_file(&shortcuts_path, &[(1, 2, 7.0, 0, 0, 1)]);
    write_edges_csv(&edges_path, &[(1, 0.0, 0, 0, -1), (2, 1.0, 0, 0, -1)]);

    let graph = ShortcutGraph::load(&shortcuts_path, &edges_path).unwrap();
    assert_eq!(graph.shortcut_count(), 1);
    assert_eq!(graph.edge_count(), 2);

    // Unknown cells: the pruned variant runs with an inactive envelope and
    // must agree with classic.
    let classic = query_classic(&graph, 1, 2);
    let pruned = query_pruned(&graph, 1, 2);
    assert!(classic.reachable);
    assert_eq!(classic.distance, 8.0);
    assert_eq!(classic.path, vec![1, 2]);
    assert_eq!(pruned.distance, classic.distance);
    assert_eq!(pruned.path, classic.path);
}

#[test]
fn concatenates_every_parquet_file_in_a_directory() {
    let dir = TempDir::new().unwrap();
    let artifact_dir = dir.path().join("shortcuts");
    std::fs::create_dir(&artifact_dir).unwrap();

    write_shortcut_file(
        &artifact_dir.join("part-0.parquet"),
        &[(1, 2, 2.0, 0, 0, 1)],
    );
    write_shortcut_file(
        &artifact_dir.join("part-1.parquet"),
        &[(2, 3, 3.0, 0, 0, 0)],
    );
    // Non-parquet directory entries are ignored.
    std::fs::write(artifact_dir.join("README.txt"), "not an artifact").unwrap();

    let edges_path = dir.path().join("edges.csv");
    write_edges_csv(
        &edges_path,
        &[(1, 0.0, 0, 0, -1), (2, 0.0, 0, 0, -1), (3, 0.5, 0, 0, -1)],
    );

    let graph = ShortcutGraph::load(&artifact_dir, &edges_path).unwrap();
    assert_eq!(graph.shortcut_count(), 2);

    let result = query_classic(&graph, 1, 3);
    assert!(result.reachable);
    assert_eq!(result.distance, 5.5);
    assert_eq!(result.path, vec![1, 2, 3]);
}

#[test]
fn via_edge_and_cell_columns_survive_the_round_trip() {
    let dir = TempDir::new().unwrap();
    let shortcuts_path = dir.path().join("shortcuts.parquet");

    write_shortcut_file(&shortcuts_path, &[(5, 6, 1.25, 17, 0x1234, -2)]);

    let shortcuts = hexroute::formats::shortcuts::read_all(&shortcuts_path).unwrap();
    assert_eq!(shortcuts.len(), 1);
    assert_eq!(shortcuts[0].from, 5);
    assert_eq!(shortcuts[0].to, 6);
    assert_eq!(shortcuts[0].cost, 1.25);
    assert_eq!(shortcuts[0].via_edge, 17);
    assert_eq!(shortcuts[0].cell, 0x1234);
    assert_eq!(shortcuts[0].inside, hexroute::Inside::Boundary);
}

#[test]
fn empty_artifact_is_a_load_error() {
    let dir = TempDir::new().unwrap();
    let shortcuts_path = dir.path().join("shortcuts.parquet");
    write_shortcut_file(&shortcuts_path, &[]);

    assert!(hexroute::formats::shortcuts::read_all(&shortcuts_path).is_err());
}

#[test]
fn missing_artifact_is_a_load_error() {
    let dir = TempDir::new().unwrap();
    assert!(hexroute::formats::shortcuts::read_all(dir.path().join("nope.parquet")).is_err());
}

#[test]
fn out_of_domain_inside_tag_is_a_load_error() {
    let dir = TempDir::new().unwrap();
    let shortcuts_path = dir.path().join("shortcuts.parquet");
    write_shortcut_file(&shortcuts_path, &[(1, 2, 1.0, 0, 0, 3)]);

    assert!(hexroute::formats::shortcuts::read_all(&shortcuts_path).is_err());
}

#[test]
fn missing_column_is_a_load_error() {
    let dir = TempDir::new().unwrap();
    let shortcuts_path = dir.path().join("shortcuts.parquet");

    // Schema without the `inside` column.
    let schema = Arc::new(Schema::new(vec![
        Field::new("incoming_edge", DataType::Int64, false),
        Field::new("outgoing_edge", DataType::Int64, false),
        Field::new("cost", DataType::Float64, false),
        Field::new("via_edge", DataType::Int64, false),
        Field::new("cell", DataType::Int64, false),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from_iter_values([1])),
        Arc::new(Int64Array::from_iter_values([2])),
        Arc::new(Float64Array::from_iter_values([1.0])),
        Arc::new(Int64Array::from_iter_values([0])),
        Arc::new(Int64Array::from_iter_values([0])),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
    let file = File::create(&shortcuts_path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    assert!(hexroute::formats::shortcuts::read_all(&shortcuts_path).is_err());
}

#[test]
fn quoted_geometry_commas_do_not_shift_columns() {
    let dir = TempDir::new().unwrap();
    let edges_path = dir.path().join("edges.csv");
    write_edges_csv(&edges_path, &[(42, 9.25, 77, 78, 7)]);

    let meta = hexroute::formats::edges::read_all(&edges_path).unwrap();
    let record = &meta[&42];
    assert_eq!(record.cost, 9.25);
    assert_eq!(record.incoming_cell, 77);
    assert_eq!(record.outgoing_cell, 78);
    assert_eq!(record.lca_res, 7);
    assert_eq!(record.length, 10.0);
}
