//! Parallel scanner that turns engine-annotated PGN collections into a
//! histogram of (outcome, move number, material, score bucket) keys.

pub mod chunk;
pub mod comment;
pub mod encoder;
pub mod error;
pub mod files;
pub mod histogram;
pub mod key;
pub mod logging;
pub mod pool;
pub mod progress;
pub mod reader;
pub mod run;
pub mod types;
pub mod visitor;

pub use error::{EncodeError, Error, PoolError, ScanError};
pub use histogram::{Histogram, SharedHistogram};
pub use key::{OutcomeLabel, PositionKey, ScoreBucket};
pub use run::{MergeStrategy, RunConfig, RunReport, run};
