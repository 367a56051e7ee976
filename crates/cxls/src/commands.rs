mod replay;

use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;

use crate::args::GlobalArgs;

pub trait Command {
    async fn execute(&self, args: &GlobalArgs) -> Result<ExitCode>;
}

#[derive(Debug, Subcommand)]
pub enum CxlsCommand {
    /// Replay a trace of editor lifecycle events through the middleware
    Replay(self::replay::Replay),
}

impl Command for CxlsCommand {
    async fn execute(&self, args: &GlobalArgs) -> Result<ExitCode> {
        match self {
            Self::Replay(replay) => replay.execute(args).await,
        }
    }
}
