use std::path::{Path, PathBuf};

use glob::Pattern;

use crate::error::Error;
use crate::reader::CompressionMode;

/// File name suffixes picked up by directory discovery.
pub const RECOGNIZED_SUFFIXES: [&str; 3] = [".pgn", ".pgn.gz", ".pgn.zst"];

pub fn is_pgn_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let name = name.to_ascii_lowercase();
    RECOGNIZED_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Lists the PGN files under `dir`, sorted by path. With `recursive`,
/// subdirectories are searched too.
pub fn discover(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, Error> {
    if !dir.is_dir() {
        return Err(Error::MissingInput(dir.to_path_buf()));
    }

    let root = Pattern::escape(&dir.to_string_lossy());
    let pattern = if recursive {
        format!("{root}/**/*")
    } else {
        format!("{root}/*")
    };

    let mut files: Vec<PathBuf> = glob::glob(&pattern)?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("Skipping unreadable entry: {e}");
                None
            }
        })
        .filter(|path| path.is_file() && is_pgn_file(path))
        .collect();
    files.sort();

    log::info!("Discovered {} PGN files under '{}'", files.len(), dir.display());
    Ok(files)
}

/// The path with its compression extension removed: `a.pgn.gz` -> `a.pgn`.
fn uncompressed_name(path: &Path) -> PathBuf {
    match CompressionMode::from_path(path).extension() {
        Some(_) => path.with_extension(""),
        None => path.to_path_buf(),
    }
}

/// Two inputs that would decompress to the same `.pgn` path, if any.
pub fn find_duplicate(files: &[PathBuf]) -> Option<(PathBuf, PathBuf)> {
    let mut named: Vec<(PathBuf, &PathBuf)> =
        files.iter().map(|f| (uncompressed_name(f), f)).collect();
    named.sort();

    named
        .windows(2)
        .find(|pair| pair[0].0 == pair[1].0)
        .map(|pair| (pair[0].1.clone(), pair[1].1.clone()))
}

pub fn ensure_unique(files: &[PathBuf]) -> Result<(), Error> {
    match find_duplicate(files) {
        Some((first, second)) => Err(Error::DuplicateInput { first, second }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_recognized_names() {
        assert!(is_pgn_file(Path::new("a/games.pgn")));
        assert!(is_pgn_file(Path::new("games.PGN.GZ")));
        assert!(is_pgn_file(Path::new("games.pgn.zst")));
        assert!(!is_pgn_file(Path::new("games.txt")));
        assert!(!is_pgn_file(Path::new("games.gz")));
        assert!(!is_pgn_file(Path::new("games.pgn.bz2")));
        assert!(!is_pgn_file(Path::new("pgn")));
    }

    #[test]
    fn test_discover_flat_and_recursive() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("b.pgn"));
        touch(&root.join("a.pgn.gz"));
        touch(&root.join("notes.txt"));
        touch(&root.join("sub/c.pgn.zst"));
        touch(&root.join("sub/deeper/d.pgn"));

        let flat = discover(root, false).unwrap();
        assert_eq!(flat, vec![root.join("a.pgn.gz"), root.join("b.pgn")]);

        let deep = discover(root, true).unwrap();
        assert_eq!(
            deep,
            vec![
                root.join("a.pgn.gz"),
                root.join("b.pgn"),
                root.join("sub/c.pgn.zst"),
                root.join("sub/deeper/d.pgn"),
            ]
        );
    }

    #[test]
    fn test_discover_directory_with_glob_characters() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("run[1]");
        touch(&root.join("x.pgn"));

        assert_eq!(discover(&root, false).unwrap(), vec![root.join("x.pgn")]);
    }

    #[test]
    fn test_discover_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover(dir.path(), true).unwrap().is_empty());
    }

    #[test]
    fn test_discover_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        assert!(matches!(
            discover(&missing, false),
            Err(Error::MissingInput(p)) if p == missing
        ));
    }

    #[test]
    fn test_duplicate_across_compression() {
        let files = vec![
            PathBuf::from("pgns/foo.pgn.gz"),
            PathBuf::from("pgns/bar.pgn"),
            PathBuf::from("pgns/foo.pgn"),
        ];

        assert_eq!(
            find_duplicate(&files),
            Some((PathBuf::from("pgns/foo.pgn"), PathBuf::from("pgns/foo.pgn.gz")))
        );
        assert!(matches!(
            ensure_unique(&files),
            Err(Error::DuplicateInput { .. })
        ));
    }

    #[test]
    fn test_same_name_in_different_directories_is_not_a_duplicate() {
        let files = vec![
            PathBuf::from("pgns/a/foo.pgn"),
            PathBuf::from("pgns/b/foo.pgn.zst"),
        ];

        assert_eq!(find_duplicate(&files), None);
        assert!(ensure_unique(&files).is_ok());
    }
}
