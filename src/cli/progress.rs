//! CLI-specific progress handling for motomap
//!
//! Shows elevation batch progress while a graph is being built.

use indicatif::{ProgressBar, ProgressStyle};

/// Creates a progress bar counting elevation batches
pub fn create_progress_bar(total_batches: u64) -> ProgressBar {
    let pb = ProgressBar::new(total_batches);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} elevation batches ({percent}%) ETA: {eta} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-")
    );
    pb
}

/// Progress manager for a graph build
pub struct ProgressManager {
    pub pb: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_batches: u64, message: &str) -> Self {
        let pb = create_progress_bar(total_batches);

        // Print initial message to stderr
        eprintln!("{}", message);

        Self { pb }
    }

    /// Progress callback for the elevation stage.
    ///
    /// The total is only known once the graph is loaded, and a keyed-tier
    /// fallback restarts the count, so the bar follows whatever it is told.
    pub fn callback(&self) -> impl Fn(u64, u64) + Send + Sync + 'static {
        let pb = self.pb.clone();
        move |done, total| {
            if pb.length().unwrap_or(0) != total {
                pb.set_length(total);
            }
            pb.set_position(done);
            if done >= total {
                pb.finish_with_message("✅ Elevations resolved");
            }
        }
    }
}
