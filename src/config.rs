use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_CHUNK_SIZE: usize = 100_000;
pub const DEFAULT_PROGRESS_INTERVAL_MS: u64 = 100;

/// Everything the pipeline needs to run once over one file.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input: PathBuf,
    /// Lines per unit of parallel work.
    pub chunk_size: usize,
    pub progress_interval: Duration,
    /// Size of the worker pool.
    pub workers: usize,
    /// Partial maps allowed to wait for the merger. Zero makes every hand-off
    /// a rendezvous.
    pub channel_capacity: usize,
    pub show_progress: bool,
}

impl PipelineConfig {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        PipelineConfig {
            input: input.into(),
            ..PipelineConfig::default()
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::Config("chunk size must be at least 1".into()));
        }
        if self.workers == 0 {
            return Err(Error::Config("worker count must be at least 1".into()));
        }
        if self.progress_interval.is_zero() {
            return Err(Error::Config("progress interval must be positive".into()));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            input: PathBuf::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            progress_interval: Duration::from_millis(DEFAULT_PROGRESS_INTERVAL_MS),
            workers: default_workers(),
            channel_capacity: 0,
            show_progress: true,
        }
    }
}

pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(usize::from)
        .unwrap_or(1)
}
