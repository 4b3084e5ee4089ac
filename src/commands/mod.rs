use crate::commands::cd::CdCommands;
use clap::{Parser, Subcommand};

pub mod cd;

/// CLI for grouping, verifying, fixing and converting CD images to CHD.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(subcommand)]
    Cd(CdCommands),
}
