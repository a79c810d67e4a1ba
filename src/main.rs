use std::{
    fs::File,
    io::{self, BufReader},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{bail, Context, Result};
use cellgrab::{
    config::{self, Config},
    input::{self, Format},
    permission::PermissionGate,
    projector::TableProjector,
    source::{Batch, ChannelSource, ReplaySource, UpdateSource},
    Session, SessionObserver, Status,
};
use clap::{Parser, Subcommand};
use tokio::io::BufReader as AsyncBufReader;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
struct Cli {
    /// TOML config file. Permissions not listed in it are denied
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Play back a recorded survey, one refresh per recorded batch
    Replay {
        file: PathBuf,
        #[arg(short, long, value_enum, default_value_t)]
        format: Format,
        /// Save the collected towers to the export directory
        #[arg(long)]
        save: bool,
    },
    /// Collect JSON lines batches from stdin as they arrive
    Listen {
        #[arg(long)]
        save: bool,
    },
    /// Print the export text for a recorded survey
    Format {
        file: PathBuf,
        #[arg(short, long, value_enum, default_value_t)]
        format: Format,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Command::Replay { file, format, save } => replay(&config, file, format, save)?,
        Command::Listen { save } => listen(&config, save).await?,
        Command::Format { file, format } => print_export(&config, file, format)?,
    };

    Ok(())
}

fn read_batches(file: PathBuf, format: Format) -> Result<Vec<Batch>> {
    let reader = BufReader::new(
        File::open(&file).with_context(|| format!("Failed to open {}", file.display()))?,
    );
    let batches = input::read(reader, format)
        .with_context(|| format!("Failed to read batches from {}", file.display()))?;
    Ok(batches)
}

fn print_export(config: &Config, file: PathBuf, format: Format) -> Result<()> {
    let batches = read_batches(file, format)?;
    let count = batches.len();
    let session = Session::new(
        ReplaySource::new(batches),
        config.permissions,
        Arc::new(TableProjector::new(io::sink())),
    );

    if let Err(status) = session.start() {
        bail!("{status}");
    }
    for _ in 1..count {
        if let Err(status) = session.refresh() {
            bail!("{status}");
        }
    }
    session.export_to(&mut io::stdout().lock())?;
    Ok(())
}

fn replay(config: &Config, file: PathBuf, format: Format, save: bool) -> Result<()> {
    let batches = read_batches(file, format)?;
    let count = batches.len();
    info!("replaying {count} batches");

    let projector = Arc::new(TableProjector::stdout());
    let session = Session::new(
        ReplaySource::new(batches),
        config.permissions,
        projector.clone(),
    );

    report(&*projector, session.start());
    for _ in 1..count {
        report(&*projector, session.refresh());
    }

    if save {
        finish(config, &session);
    }
    Ok(())
}

async fn listen(config: &Config, save: bool) -> Result<()> {
    let (source, tx) = ChannelSource::new(16);
    let projector = Arc::new(TableProjector::stdout());
    let session = Session::new(source, config.permissions, projector.clone());

    if let Err(status) = session.start() {
        projector.status(status);
        return Ok(());
    }

    // tx is consumed, so the source sees the end of input once this returns
    match input::forward_json_lines(AsyncBufReader::new(tokio::io::stdin()), tx).await {
        Ok(sent) => info!("stdin closed after {sent} batches"),
        Err(e) => warn!("stopped reading stdin: {e}"),
    }
    session.source().closed().await;

    if save {
        finish(config, &session);
    }
    Ok(())
}

fn report(projector: &dyn SessionObserver, result: Result<(), Status>) {
    if let Err(status) = result {
        projector.status(status);
    }
}

fn finish<S: UpdateSource, G: PermissionGate + 'static>(config: &Config, session: &Session<S, G>) {
    // failures have already been reported to the projector
    if let Ok(path) = session.save(&config.export_dir) {
        println!("Data saved to {}", path.display());
    }
}
