use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Receiver;

use crate::aggregate::{merge_into, new_map, AggregateMap};

/// Single writer of the final map.
///
/// Drains partial maps in arrival order until every sender is dropped, bumping
/// `merged` after each fold so the progress reporter can observe it.
pub struct Merger {
    handle: JoinHandle<AggregateMap>,
}

impl Merger {
    pub fn spawn(partials: Receiver<AggregateMap>, merged: Arc<AtomicUsize>) -> io::Result<Self> {
        let handle = thread::Builder::new()
            .name("merger".into())
            .spawn(move || drain(partials, &merged))?;
        Ok(Merger { handle })
    }

    /// Waits for the channel to close and returns the final map.
    pub fn join(self) -> AggregateMap {
        match self.handle.join() {
            Ok(map) => map,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

fn drain(partials: Receiver<AggregateMap>, merged: &AtomicUsize) -> AggregateMap {
    let mut result = new_map();
    for partial in partials {
        merge_into(&mut result, partial);
        let n = merged.fetch_add(1, Ordering::Release) + 1;
        tracing::trace!(merged = n, keys = result.len(), "merged partial map");
    }
    result
}
