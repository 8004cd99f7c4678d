use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use tasktrack_core::indexing::IndexingEvent;

/// Terminal progress bar fed by an indexing pass.
pub struct IndexProgress {
    bar: ProgressBar,
}

impl IndexProgress {
    /// A hidden bar still tracks position, so callers never branch on
    /// `enabled`.
    pub fn new(enabled: bool) -> Self {
        if !enabled {
            return Self {
                bar: ProgressBar::hidden(),
            };
        }

        let bar = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} documents {msg}")
            .map(|s| s.progress_chars("█▓▒░  "))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar.set_message("indexing");
        Self { bar }
    }

    pub fn apply(&self, event: &IndexingEvent) {
        match *event {
            IndexingEvent::Progress { indexed, total } => {
                self.bar.set_length(total as u64);
                self.bar.set_position(indexed as u64);
            }
            IndexingEvent::Completed {
                processed,
                errors,
                total,
            } => {
                self.bar.set_length(total as u64);
                self.bar.set_position(processed as u64);
                let msg = if errors == 0 {
                    "done".to_string()
                } else {
                    format!("done, {errors} failed")
                };
                self.bar.finish_with_message(msg);
            }
        }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Drive the bar from `events` until a pass completes or the channel closes.
    pub fn follow(self, mut events: broadcast::Receiver<IndexingEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        self.apply(&event);
                        if matches!(event, IndexingEvent::Completed { .. }) {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

impl Drop for IndexProgress {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}
