use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use indicatif::{ProgressBar, ProgressStyle};

/// The game with the most plies seen so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongestGame {
    pub file: PathBuf,
    pub plies: u32,
}

impl LongestGame {
    /// Keeps whichever of the two is longer; ties keep `self`.
    pub fn update(&mut self, file: &Path, plies: u32) {
        if plies > self.plies {
            self.file = file.to_path_buf();
            self.plies = plies;
        }
    }
}

/// Completed-chunk counter and running longest-game record shared by all
/// workers. The bar is redrawn under its own lock so lines never interleave.
pub struct Progress {
    completed: AtomicUsize,
    total: usize,
    bar: Mutex<ProgressBar>,
    longest: Mutex<Option<LongestGame>>,
}

impl Progress {
    pub fn new(total: usize, visible: bool) -> Self {
        let bar = if visible {
            let bar = ProgressBar::new(total as u64);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("Progress: {pos}/{len} [{elapsed_precise}] {bar:40.cyan/blue}")
                    .expect("valid template"),
            );
            bar
        } else {
            ProgressBar::hidden()
        };

        Self {
            completed: AtomicUsize::new(0),
            total,
            bar: Mutex::new(bar),
            longest: Mutex::new(None),
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Marks one more chunk as finished and returns the new count.
    pub fn chunk_done(&self) -> usize {
        let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        let bar = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        bar.set_position(done as u64);
        done
    }

    pub fn record_longest(&self, candidate: LongestGame) {
        let mut longest = self.longest.lock().unwrap_or_else(PoisonError::into_inner);
        match longest.as_mut() {
            Some(current) => current.update(&candidate.file, candidate.plies),
            None => *longest = Some(candidate),
        }
    }

    pub fn longest(&self) -> Option<LongestGame> {
        self.longest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn finish(&self) {
        let bar = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        bar.finish();
    }
}
