use std::path::PathBuf;

/// A contiguous run of input files processed by one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    pub files: Vec<PathBuf>,
}

/// Splits `files` into at most `target` contiguous chunks of
/// `ceil(len / target)` files each, preserving order. The last chunk may be
/// shorter, and fewer chunks come out when there are fewer files than
/// `target`. No files means no chunks.
pub fn plan_chunks(files: Vec<PathBuf>, target: usize) -> Vec<Chunk> {
    if files.is_empty() {
        return Vec::new();
    }

    let size = files.len().div_ceil(target.max(1));
    files
        .chunks(size)
        .enumerate()
        .map(|(index, files)| Chunk {
            index,
            files: files.to_vec(),
        })
        .collect()
}
