use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use wdlstat::{Error, MergeStrategy, RunConfig, RunReport, files, logging, run};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Merge {
    /// Fold each chunk into a shared histogram as it finishes
    Incremental,
    /// Keep per-chunk results and fold them once all chunks are done
    Collect,
}

impl From<Merge> for MergeStrategy {
    fn from(merge: Merge) -> Self {
        match merge {
            Merge::Incremental => MergeStrategy::Incremental,
            Merge::Collect => MergeStrategy::Collect,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "scorewdlstat",
    version,
    about = "Count engine-scored positions by game outcome, move number, material and score"
)]
struct Args {
    /// Single PGN file to scan; takes precedence over --dir
    #[arg(long)]
    file: Option<PathBuf>,
    /// Directory searched for .pgn, .pgn.gz and .pgn.zst files
    #[arg(long, default_value = "./pgns")]
    dir: PathBuf,
    /// Also search subdirectories of --dir
    #[arg(short, long)]
    recursive: bool,
    /// Worker threads [default: available hardware threads]
    #[arg(long)]
    concurrency: Option<NonZeroUsize>,
    /// Chunks planned per worker thread
    #[arg(long, default_value_t = 4)]
    chunks_per_thread: usize,
    /// Where the JSON histogram is written
    #[arg(long, default_value = "scoreWDLstat.json")]
    output: PathBuf,
    #[arg(long, value_enum, default_value_t = Merge::Incremental)]
    merge: Merge,
}

fn input_files(args: &Args) -> Result<Vec<PathBuf>, Error> {
    match &args.file {
        Some(file) if file.is_file() => Ok(vec![file.clone()]),
        Some(file) => Err(Error::MissingInput(file.clone())),
        None => files::discover(&args.dir, args.recursive),
    }
}

fn report(report: &RunReport) {
    println!("Time taken: {:.3}s", report.elapsed.as_secs_f64());
    if let Some(longest) = &report.longest {
        println!(
            "Longest game found in: {} ({} plies)",
            longest.file.display(),
            longest.plies
        );
    }
    println!(
        "Retained {} scored positions for analysis.",
        report.histogram.total()
    );
    println!(
        "Parsed {} games, {} distinct keys.",
        report.games,
        report.histogram.len()
    );
}

fn try_main(args: Args) -> Result<(), Error> {
    let defaults = RunConfig::default();
    let config = RunConfig {
        concurrency: args.concurrency.map_or(defaults.concurrency, NonZeroUsize::get),
        chunks_per_thread: args.chunks_per_thread,
        merge: args.merge.into(),
        show_progress: true,
        ..defaults
    };

    let files = input_files(&args)?;
    let result = run(files, &config)?;
    result.histogram.write_json(&args.output)?;

    report(&result);
    log::info!("Wrote histogram to '{}'", args.output.display());
    Ok(())
}

fn main() -> ExitCode {
    logging::init();

    match try_main(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
