use std::fmt;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::{bounded, Receiver, Sender};
use tracing::{debug, info};

use crate::aggregate::AggregateMap;
use crate::chunk::{dispatch_chunks, expected_chunks, Chunk};
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::merger::Merger;
use crate::progress::ProgressReporter;
use crate::report::Report;
use crate::source::{count_lines, LineSource};
use crate::worker::process_chunk;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Counting,
    Streaming,
    Draining,
    Reporting,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Counting => "counting",
            Stage::Streaming => "streaming",
            Stage::Draining => "draining",
            Stage::Reporting => "reporting",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Runs the whole aggregation over `config.input` and returns the rounded
/// report. Any fatal error discards everything merged so far.
pub fn run(config: &PipelineConfig) -> Result<Report> {
    config.validate()?;
    let start = Instant::now();
    debug!(?config, "starting pipeline");

    info!(stage = %Stage::Counting, path = %config.input.display());
    let total_lines = count_lines(&config.input).map_err(|source| Error::Count {
        path: config.input.clone(),
        source,
    })?;
    let total_chunks = expected_chunks(total_lines, config.chunk_size);
    info!(total_lines, total_chunks, "counted input");

    let source = LineSource::open(&config.input).map_err(|source| Error::Open {
        path: config.input.clone(),
        source,
    })?;

    info!(stage = %Stage::Streaming, workers = config.workers);
    let merged = Arc::new(AtomicUsize::new(0));
    let reporter = ProgressReporter::spawn(
        total_chunks,
        merged.clone(),
        config.progress_interval,
        config.show_progress,
    )
    .map_err(|source| Error::Spawn { name: "progress", source })?;

    let aggregates = match stream(config, source, merged) {
        Ok(aggregates) => aggregates,
        Err(e) => {
            reporter.finish();
            return Err(e);
        }
    };
    reporter.finish();

    info!(stage = %Stage::Reporting, keys = aggregates.len());
    let report = Report::new(aggregates, start.elapsed());
    info!(stage = %Stage::Done, elapsed = report.elapsed_secs);
    Ok(report)
}

/// Streaming and draining: feeds chunks to a bounded worker pool and returns
/// the merged map once every worker is done and the merger has drained.
fn stream<I>(config: &PipelineConfig, lines: I, merged: Arc<AtomicUsize>) -> Result<AggregateMap>
where
    I: IntoIterator<Item = std::io::Result<String>>,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .thread_name(|i| format!("worker-{i}"))
        .build()?;

    let (partial_tx, partial_rx) = bounded::<AggregateMap>(config.channel_capacity);
    let merger =
        Merger::spawn(partial_rx, merged).map_err(|source| Error::Spawn { name: "merger", source })?;

    let (chunk_tx, chunk_rx) = bounded::<Chunk>(config.workers);
    let dispatched = pool.in_place_scope(|s| {
        for _ in 0..config.workers {
            let chunk_rx = chunk_rx.clone();
            let partial_tx = partial_tx.clone();
            s.spawn(move |_| work(chunk_rx, partial_tx));
        }
        drop(chunk_rx);

        let dispatched = dispatch_chunks(lines, config.chunk_size, |chunk| {
            // Workers only exit once the queue is closed, so a send cannot fail here.
            let _ = chunk_tx.send(chunk);
        });
        drop(chunk_tx);
        if dispatched.is_ok() {
            info!(stage = %Stage::Draining);
        }
        dispatched
    });
    drop(partial_tx);

    let aggregates = merger.join();
    let dispatched = dispatched.map_err(Error::Read)?;
    debug!(dispatched, "all chunks merged");
    Ok(aggregates)
}

fn work(chunks: Receiver<Chunk>, partials: Sender<AggregateMap>) {
    for chunk in chunks {
        let partial = process_chunk(&chunk);
        drop(chunk);
        if partials.send(partial).is_err() {
            break;
        }
    }
}
