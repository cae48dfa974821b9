use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use docwatch_cli::session::{SessionStats, WatchSession};
use docwatch_cli::{read_trace, Emission, WatchConfig};
use docwatch_event_bus::{EventBus, InMemoryBus};
use perceiver_mutation::metrics::{self as engine_metrics, MetricSnapshot};
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};

use super::output::{render, OutputFormat};

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Host trace to replay (JSON lines)
    #[arg(value_name = "TRACE")]
    pub trace: PathBuf,

    /// Write emitted events here instead of stdout
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print session and engine counters to stderr when done
    #[arg(long)]
    pub stats: bool,
}

#[derive(Debug, Serialize)]
struct ReplaySummary {
    written: usize,
    session: SessionStats,
    engine: MetricSnapshot,
}

pub async fn cmd_replay(args: ReplayArgs, config: &WatchConfig, format: OutputFormat) -> Result<()> {
    let file = File::open(&args.trace)
        .with_context(|| format!("Failed to open trace {}", args.trace.display()))?;
    let signals = read_trace(BufReader::new(file))
        .with_context(|| format!("Failed to parse trace {}", args.trace.display()))?;
    let rules = config.rule_table()?;
    info!(signals = signals.len(), rules = rules.len(), "replaying trace");

    let bus = InMemoryBus::<Emission>::new(config.bus_capacity);
    let writer = tokio::spawn(write_events(bus.subscribe(), args.output.clone()));

    // The session owns the last sender; dropping it closes the writer.
    let session = WatchSession::replay(config, rules, signals, bus)
        .context("Replay aborted")?;
    let written = writer.await.context("Event writer task panicked")??;

    if args.stats {
        let summary = ReplaySummary {
            written,
            session,
            engine: engine_metrics::snapshot(),
        };
        match render(&summary, &format)? {
            Some(rendered) => eprintln!("{rendered}"),
            None => print_human(&summary),
        }
    }
    Ok(())
}

async fn write_events(
    mut rx: broadcast::Receiver<Emission>,
    path: Option<PathBuf>,
) -> Result<usize> {
    let mut out: Box<dyn AsyncWrite + Unpin + Send> = match &path {
        Some(path) => Box::new(
            tokio::fs::File::create(path)
                .await
                .with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(tokio::io::stdout()),
    };

    let mut written = 0usize;
    loop {
        match rx.recv().await {
            Ok(emission) => {
                let mut line = serde_json::to_vec(&emission)?;
                line.push(b'\n');
                out.write_all(&line).await?;
                written += 1;
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "event writer fell behind; raise bus_capacity");
            }
            Err(RecvError::Closed) => break,
        }
    }
    out.flush().await?;
    Ok(written)
}

fn print_human(summary: &ReplaySummary) {
    let session = &summary.session;
    let engine = &summary.engine;
    eprintln!("Replay summary");
    eprintln!("  events written:     {}", summary.written);
    eprintln!("  batches:            {}", session.batches);
    eprintln!("  records:            {}", session.records);
    eprintln!("  annotated:          {}", session.emitted);
    eprintln!("  skipped mutations:  {}", session.skipped_mutations);
    eprintln!("  interactions:       {}", session.interactions);
    eprintln!("  region rebinds:     {}", session.rebinds);
    eprintln!("  avg batch:          {:.3} ms", engine.avg_batch_ms);
    for count in &engine.by_category {
        if count.records > 0 {
            eprintln!("  {:<18}  {}", count.category.as_str(), count.records);
        }
    }
}
