use crate::error::ScanError;
use crate::types::GameRecord;
use crate::visitor::GameVisitor;
use flate2::read::MultiGzDecoder;
use pgn_reader::Reader;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use zstd::stream::read::Decoder as ZstdDecoder;

pub type PgnInput = Box<dyn Read + Send>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompressionMode {
    Plain,
    Gzip,
    Zstd,
}

impl CompressionMode {
    /// Picks the decoder from the file name's last extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("gz") => Self::Gzip,
            Some(ext) if ext.eq_ignore_ascii_case("zst") => Self::Zstd,
            _ => Self::Plain,
        }
    }

    pub fn extension(self) -> Option<&'static str> {
        match self {
            Self::Plain => None,
            Self::Gzip => Some("gz"),
            Self::Zstd => Some("zst"),
        }
    }
}

/// Opens `path` with the decoder its extension calls for.
///
/// No `BufReader` is layered on top: pgn-reader buffers its input itself.
pub fn open_input_stream(path: &Path) -> Result<PgnInput, ScanError> {
    let file = File::open(path).map_err(|source| ScanError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    match CompressionMode::from_path(path) {
        CompressionMode::Plain => Ok(Box::new(file)),
        CompressionMode::Gzip => Ok(Box::new(MultiGzDecoder::new(file))),
        CompressionMode::Zstd => ZstdDecoder::new(file)
            .map(|decoder| Box::new(decoder) as PgnInput)
            .map_err(|source| ScanError::Decoder {
                path: path.to_path_buf(),
                codec: "zstd",
                source,
            }),
    }
}

/// Iterates the games of one file.
///
/// Iteration ends at end of input or at the first read fault. A fault is
/// logged with the file name and the game index and abandons the rest of
/// that file; it is never propagated.
pub struct GameScanner<R: Read> {
    reader: Reader<R>,
    visitor: GameVisitor,
    path: PathBuf,
    next_game_index: usize,
    finished: bool,
}

impl GameScanner<PgnInput> {
    pub fn open(path: &Path) -> Result<Self, ScanError> {
        Ok(Self::new(open_input_stream(path)?, path))
    }
}

impl<R: Read> GameScanner<R> {
    pub fn new(input: R, path: impl Into<PathBuf>) -> Self {
        Self {
            reader: Reader::new(input),
            visitor: GameVisitor::new(),
            path: path.into(),
            next_game_index: 1,
            finished: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of games handed out so far.
    pub fn games_read(&self) -> usize {
        self.next_game_index - 1
    }
}

impl<R: Read> Iterator for GameScanner<R> {
    type Item = GameRecord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.reader.read_game(&mut self.visitor) {
            Ok(Some(game)) => {
                self.next_game_index += 1;
                Some(game)
            }
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(error) => {
                log::warn!(
                    "Error when parsing: file='{}'; game_index={}; error={}",
                    self.path.display(),
                    self.next_game_index,
                    error
                );
                self.finished = true;
                None
            }
        }
    }
}
