//! CLI for hexroute

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;

use crate::graph::ShortcutGraph;
use crate::search;

#[derive(Parser)]
#[command(name = "hexroute")]
#[command(about = "Least-cost path queries over a hierarchical shortcut graph", long_about = None)]
pub struct Cli {
    /// Path to the shortcut artifact (Parquet file or directory)
    #[arg(long)]
    shortcuts: PathBuf,

    /// Path to the edge metadata CSV
    #[arg(long)]
    edges: PathBuf,

    /// Source edge ID (omit together with --target to only load)
    #[arg(long)]
    source: Option<u32>,

    /// Target edge ID
    #[arg(long)]
    target: Option<u32>,

    /// Query algorithm
    #[arg(long, value_enum, default_value = "pruned")]
    algorithm: Algorithm,

    /// Print the query result as JSON instead of the text report
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Algorithm {
    Classic,
    Pruned,
}

impl Algorithm {
    fn name(self) -> &'static str {
        match self {
            Algorithm::Classic => "classic",
            Algorithm::Pruned => "pruned",
        }
    }
}

impl Cli {
    pub fn run(self) -> Result<()> {
        println!("Loading shortcuts from: {}", self.shortcuts.display());
        let start = Instant::now();
        let shortcuts = crate::formats::shortcuts::read_all(&self.shortcuts)?;
        println!(
            "  ✓ {} shortcuts in {} ms",
            shortcuts.len(),
            start.elapsed().as_millis()
        );

        println!("Loading edges from: {}", self.edges.display());
        let start = Instant::now();
        let edge_meta = crate::formats::edges::read_all(&self.edges)?;
        println!(
            "  ✓ {} edges in {} ms",
            edge_meta.len(),
            start.elapsed().as_millis()
        );

        let graph = ShortcutGraph::from_parts(shortcuts, edge_meta);

        let (Some(source), Some(target)) = (self.source, self.target) else {
            println!();
            println!("No query specified. Use --source and --target.");
            return Ok(());
        };

        println!();
        println!("Query: {} -> {} ({})", source, target, self.algorithm.name());

        let start = Instant::now();
        let result = match self.algorithm {
            Algorithm::Classic => search::query_classic(&graph, source, target),
            Algorithm::Pruned => search::query_pruned(&graph, source, target),
        };
        let query_us = start.elapsed().as_micros();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
            return Ok(());
        }

        if result.reachable {
            println!("Distance: {}", result.distance);
            println!("Path length: {} edges", result.path.len());
            println!("Query time: {:.3} ms", query_us as f64 / 1000.0);

            let head: Vec<String> = result.path.iter().take(10).map(u32::to_string).collect();
            let suffix = if result.path.len() > 10 { " ..." } else { "" };
            println!("Path: {}{}", head.join(" -> "), suffix);
        } else {
            println!("No path found");
            println!("Query time: {:.3} ms", query_us as f64 / 1000.0);
        }

        Ok(())
    }
}
