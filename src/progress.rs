use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{RecvTimeoutError, Sender};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const TEMPLATE: &str = "Progress: {msg:>7} [{bar:40.cyan/blue}] {pos}/{len} chunks";

/// Share of merged chunks, in percent. An empty input counts as done.
#[inline]
pub fn percentage(merged: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    (merged as f64 / total as f64 * 100.0).min(100.0)
}

/// Polls the merged-chunk counter on its own thread and redraws one status
/// line. Reads are lock-free and never hold up the merger.
pub struct ProgressReporter {
    stop: Sender<()>,
    handle: JoinHandle<usize>,
}

impl ProgressReporter {
    pub fn spawn(
        total: usize,
        merged: Arc<AtomicUsize>,
        interval: Duration,
        visible: bool,
    ) -> io::Result<Self> {
        let target = if visible {
            ProgressDrawTarget::stderr()
        } else {
            ProgressDrawTarget::hidden()
        };
        let bar = ProgressBar::with_draw_target(Some(total as u64), target);
        bar.set_style(
            ProgressStyle::with_template(TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );

        let (stop, stopped) = crossbeam_channel::bounded::<()>(0);
        let handle = thread::Builder::new()
            .name("progress".into())
            .spawn(move || {
                loop {
                    let n = merged.load(Ordering::Acquire);
                    render(&bar, n, total);
                    if n >= total {
                        break;
                    }
                    match stopped.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        _ => break,
                    }
                }
                let n = merged.load(Ordering::Acquire);
                if n >= total {
                    bar.set_position(total as u64);
                    bar.finish_with_message(format!("{:.2}%", 100.0));
                    if let Some(line) = plain_final_line(&bar, visible) {
                        eprintln!("{line}");
                    }
                } else {
                    render(&bar, n, total);
                    bar.abandon();
                }
                n
            })?;
        Ok(ProgressReporter { stop, handle })
    }

    /// Stops polling and returns the last counter value the reporter saw.
    pub fn finish(self) -> usize {
        drop(self.stop);
        match self.handle.join() {
            Ok(n) => n,
            Err(_) => {
                tracing::warn!("progress reporter panicked");
                0
            }
        }
    }
}

/// Status line for the finished run.
pub fn status_line(percent: f64) -> String {
    format!("Progress: {percent:.2}%")
}

/// indicatif draws nothing when stderr is not a terminal; the completed run
/// still gets its final line in that case.
fn plain_final_line(bar: &ProgressBar, visible: bool) -> Option<String> {
    (visible && bar.is_hidden()).then(|| status_line(100.0))
}

#[inline]
fn render(bar: &ProgressBar, merged: usize, total: usize) {
    bar.set_position(merged.min(total) as u64);
    bar.set_message(format!("{:.2}%", percentage(merged, total)));
}
