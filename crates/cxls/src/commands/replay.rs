use std::io::Write;
use std::process::ExitCode;

use anyhow::Context;
use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use tower_lsp_server::ls_types::MessageType;

use crate::args::GlobalArgs;
use crate::commands::Command;
use crate::replay::parse_trace;
use crate::replay::Replay as ReplayRun;

#[derive(Debug, Parser)]
pub struct Replay {
    /// JSON-lines trace of editor lifecycle events.
    trace: Utf8PathBuf,

    /// Workspace root served by its own session. May be repeated.
    #[arg(long = "workspace", short = 'w')]
    workspaces: Vec<Utf8PathBuf>,

    /// Directory to load `cxls.toml` settings from. Defaults to the current
    /// directory.
    #[arg(long)]
    project: Option<Utf8PathBuf>,
}

impl Command for Replay {
    async fn execute(&self, args: &GlobalArgs) -> Result<ExitCode> {
        let project_root = match &self.project {
            Some(project) => project.clone(),
            None => Utf8PathBuf::from_path_buf(std::env::current_dir()?)
                .map_err(|path| anyhow::anyhow!("Non UTF-8 working directory: {}", path.display()))?,
        };
        let settings =
            cxls_conf::Settings::new(&project_root).context("Failed to load settings")?;

        let log_dir = settings.log_dir.clone().unwrap_or_else(|| {
            Utf8PathBuf::from_path_buf(std::env::temp_dir())
                .unwrap_or_else(|_| Utf8PathBuf::from("."))
        });
        let _guard = cxls_server::logging::init_tracing(&log_dir, args.log_level(), |typ, message| {
            eprintln!("{}: {message}", message_label(typ));
        });

        let text = std::fs::read_to_string(&self.trace)
            .with_context(|| format!("Failed to read trace {}", self.trace))?;
        let events = parse_trace(&text)?;
        tracing::info!("Replaying {} events from {}", events.len(), self.trace);

        let mut run = ReplayRun::new(&self.workspaces, settings);
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        run.run(events, |message| {
            serde_json::to_writer(&mut out, message)?;
            writeln!(out)?;
            Ok(())
        })
        .await?;
        out.flush()?;

        Ok(ExitCode::SUCCESS)
    }
}

fn message_label(typ: MessageType) -> &'static str {
    if typ == MessageType::ERROR {
        "error"
    } else if typ == MessageType::WARNING {
        "warning"
    } else if typ == MessageType::INFO {
        "info"
    } else {
        "log"
    }
}
