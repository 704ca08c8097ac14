use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("error counting lines in {}", .path.display())]
    Count { path: PathBuf, source: io::Error },

    #[error("error opening {}", .path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("error reading input")]
    Read(#[source] io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to start worker pool")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to spawn {name} thread")]
    Spawn { name: &'static str, source: io::Error },

    #[error("error writing {}", .path.display())]
    Generate { path: PathBuf, source: io::Error },
}

pub type Result<T> = std::result::Result<T, Error>;
