//! Run orchestration: duplicate check, chunk planning, parallel scanning and
//! the merge of per-chunk histograms into one.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::chunk::{Chunk, plan_chunks};
use crate::encoder::{PLY_HORIZON, PositionKeyEncoder};
use crate::error::{Error, PoolError};
use crate::files::ensure_unique;
use crate::histogram::{Histogram, LOCAL_CAPACITY_HINT, SharedHistogram};
use crate::pool::WorkerPool;
use crate::progress::{LongestGame, Progress};
use crate::reader::GameScanner;

/// How chunk results reach the final histogram.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Each task folds its histogram into a shared one under a mutex as soon
    /// as it finishes.
    #[default]
    Incremental,
    /// Each task hands its histogram back; all are folded after the pool
    /// has drained.
    Collect,
}

#[derive(Clone, Debug)]
pub struct RunConfig {
    pub concurrency: usize,
    pub chunks_per_thread: usize,
    pub horizon: u32,
    /// Buckets reserved by each chunk-local histogram.
    pub histogram_capacity: usize,
    pub merge: MergeStrategy,
    pub show_progress: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            concurrency: thread::available_parallelism().map_or(1, |n| n.get()),
            chunks_per_thread: 4,
            horizon: PLY_HORIZON,
            histogram_capacity: LOCAL_CAPACITY_HINT,
            merge: MergeStrategy::default(),
            show_progress: false,
        }
    }
}

#[derive(Debug)]
pub struct RunReport {
    pub histogram: Histogram,
    pub longest: Option<LongestGame>,
    pub elapsed: Duration,
    pub files: usize,
    pub chunks: usize,
    pub games: u64,
}

/// What one chunk produced.
struct ChunkOutcome {
    histogram: Histogram,
    longest: Option<LongestGame>,
    games: u64,
}

impl ChunkOutcome {
    fn record_game(&mut self, file: &Path, plies: u32) {
        self.games += 1;
        match self.longest.as_mut() {
            Some(longest) => longest.update(file, plies),
            None => {
                self.longest = Some(LongestGame {
                    file: file.to_path_buf(),
                    plies,
                })
            }
        }
    }
}

fn scan_chunk(chunk: &Chunk, encoder: PositionKeyEncoder, capacity: usize) -> ChunkOutcome {
    let mut outcome = ChunkOutcome {
        histogram: Histogram::with_capacity(capacity),
        longest: None,
        games: 0,
    };

    for path in &chunk.files {
        let scanner = match GameScanner::open(path) {
            Ok(scanner) => scanner,
            Err(e) => {
                log::warn!("{e}");
                continue;
            }
        };

        for game in scanner {
            outcome.record_game(path, game.ply_count());
            if let Err(e) = encoder.encode(&game, &mut outcome.histogram) {
                log::debug!("Skipping rest of game in '{}': {e}", path.display());
            }
        }
    }

    log::debug!(
        "Chunk {} done: {} files, {} games, {} distinct keys",
        chunk.index,
        chunk.files.len(),
        outcome.games,
        outcome.histogram.len()
    );
    outcome
}

/// Per-run state every task needs.
struct TaskContext {
    encoder: PositionKeyEncoder,
    capacity: usize,
    progress: Progress,
    games: AtomicU64,
}

impl TaskContext {
    fn process(&self, chunk: &Chunk) -> Histogram {
        let outcome = scan_chunk(chunk, self.encoder, self.capacity);
        if let Some(longest) = outcome.longest {
            self.progress.record_longest(longest);
        }
        self.games.fetch_add(outcome.games, Ordering::SeqCst);
        outcome.histogram
    }
}

fn merge_incrementally(
    pool: &mut WorkerPool,
    chunks: Vec<Chunk>,
    ctx: &Arc<TaskContext>,
) -> Result<Histogram, Error> {
    let shared = Arc::new(SharedHistogram::new(ctx.capacity));

    for chunk in chunks {
        let ctx = Arc::clone(ctx);
        let shared = Arc::clone(&shared);
        pool.submit(move || {
            shared.merge(ctx.process(&chunk));
            ctx.progress.chunk_done();
        })?;
    }
    pool.wait();

    Ok(Arc::try_unwrap(shared).map_or_else(|shared| shared.take(), SharedHistogram::into_inner))
}

fn collect_then_merge(
    pool: &mut WorkerPool,
    chunks: Vec<Chunk>,
    ctx: &Arc<TaskContext>,
) -> Result<Histogram, Error> {
    let handles = chunks
        .into_iter()
        .map(|chunk| {
            let ctx = Arc::clone(ctx);
            pool.submit_with_handle(move || {
                let mut histogram = ctx.process(&chunk);
                // Held until the barrier; drop the unused reservation.
                histogram.shrink_to_fit();
                ctx.progress.chunk_done();
                histogram
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    pool.wait();

    let mut histogram = Histogram::new();
    for handle in handles {
        histogram.merge(handle.join()?);
    }
    Ok(histogram)
}

fn discovery_summary(files: usize, chunks: usize) -> String {
    format!("Found {files} .pgn(.gz/.zst) files, creating {chunks} chunks for processing.")
}

/// Scans `files` in parallel and returns the merged histogram.
///
/// Fails before any work starts if two inputs name the same game collection
/// (`foo.pgn` and `foo.pgn.gz`). Files that cannot be opened or read are
/// logged and skipped. A chunk task that dies aborts the run, since its
/// counts would be missing from the result.
pub fn run(files: Vec<PathBuf>, config: &RunConfig) -> Result<RunReport, Error> {
    let start = Instant::now();
    ensure_unique(&files)?;

    let file_count = files.len();
    let concurrency = config.concurrency.max(1);
    let chunks = plan_chunks(files, concurrency * config.chunks_per_thread.max(1));
    let chunk_count = chunks.len();

    if config.show_progress {
        println!("{}", discovery_summary(file_count, chunk_count));
    }
    log::info!(
        "Scanning {file_count} files in {chunk_count} chunks on {concurrency} threads ({:?} merge)",
        config.merge
    );

    let ctx = Arc::new(TaskContext {
        encoder: PositionKeyEncoder::new(config.horizon),
        capacity: config.histogram_capacity,
        progress: Progress::new(chunk_count, config.show_progress),
        games: AtomicU64::new(0),
    });

    let mut pool = WorkerPool::new(concurrency);
    let histogram = match config.merge {
        MergeStrategy::Incremental => merge_incrementally(&mut pool, chunks, &ctx)?,
        MergeStrategy::Collect => collect_then_merge(&mut pool, chunks, &ctx)?,
    };
    ctx.progress.finish();

    if ctx.progress.completed() < chunk_count {
        return Err(PoolError::TaskLost.into());
    }

    Ok(RunReport {
        histogram,
        longest: ctx.progress.longest(),
        elapsed: start.elapsed(),
        files: file_count,
        chunks: chunk_count,
        games: ctx.games.load(Ordering::SeqCst),
    })
}
