use anyhow::Result;
use clap::Parser;
use hexroute::cli::Cli;

fn main() -> Result<()> {
    Cli::parse().run()
}
