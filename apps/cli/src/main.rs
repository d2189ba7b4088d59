//! kbforge CLI: build a knowledge base from a tree of loosely structured
//! documents.
//!
//! Walks the tree, expands includes, parses whichever dialect each document
//! uses, and merges the extracted entities into one knowledge base.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
