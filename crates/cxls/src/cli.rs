use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use crate::args::Args;
use crate::commands::Command;
use crate::commands::CxlsCommand;

/// The main CLI structure that defines the command-line interface
#[derive(Parser)]
#[command(name = "cxls")]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CxlsCommand,

    #[command(flatten)]
    pub args: Args,
}

/// Parse CLI arguments and execute the chosen command
pub async fn run(args: Vec<String>) -> Result<ExitCode> {
    let cli = Cli::try_parse_from(args).unwrap_or_else(|e| {
        e.exit();
    });

    cli.command.execute(&cli.args.global).await
}
