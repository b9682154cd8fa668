//! `crules` resolves the compliance rules that apply to each component of a
//! component definition.

use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
