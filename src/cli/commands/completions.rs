//! `craftdex completions` - shell completion scripts
//!
//! Writes a completion script for bash, zsh, fish, elvish or PowerShell to
//! stdout. The script covers every subcommand and flag, including the
//! `--type` and `--sort` value lists of `craftdex list`.

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use miette::Result;
use std::io;

use crate::cli::Cli;

#[derive(clap::Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn run(args: CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    generate(args.shell, &mut cmd, "craftdex", &mut io::stdout());
    Ok(())
}
