use anyhow::Result;
use clap::Parser;
use is_it_ai::cli::{self, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli::run(&cli)
}
