use std::collections::HashMap;

use pgn_reader::SanPlus;

/// One mainline move and the comment(s) that followed it.
#[derive(Debug, Clone)]
pub struct AnnotatedMove {
    pub san: SanPlus,
    pub comment: Option<String>,
}

/// A parsed game: its tag pairs and annotated mainline.
///
/// Records are built per game and dropped once their keys are extracted;
/// nothing downstream retains them.
#[derive(Debug, Clone, Default)]
pub struct GameRecord {
    pub headers: HashMap<String, String>,
    pub moves: Vec<AnnotatedMove>,
}

impl GameRecord {
    /// Exact-key header lookup. An absent tag is `None`; a present but empty
    /// tag is `Some("")`.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(String::as_str)
    }

    /// Game length in plies: the `PlyCount` tag when it is a valid number,
    /// otherwise the number of mainline moves.
    pub fn ply_count(&self) -> u32 {
        self.header("PlyCount")
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .unwrap_or_else(|| u32::try_from(self.moves.len()).unwrap_or(u32::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_moves(count: usize) -> GameRecord {
        let san: SanPlus = "e4".parse().unwrap();
        GameRecord {
            headers: HashMap::new(),
            moves: vec![
                AnnotatedMove {
                    san,
                    comment: None,
                };
                count
            ],
        }
    }

    #[test]
    fn test_header_absent_vs_empty() {
        let mut record = GameRecord::default();
        assert_eq!(record.header("FEN"), None);

        record.headers.insert("FEN".to_string(), String::new());
        assert_eq!(record.header("FEN"), Some(""));
    }

    #[test]
    fn test_header_lookup_is_case_sensitive() {
        let mut record = GameRecord::default();
        record
            .headers
            .insert("Result".to_string(), "1-0".to_string());

        assert_eq!(record.header("Result"), Some("1-0"));
        assert_eq!(record.header("result"), None);
    }

    #[test]
    fn test_ply_count_prefers_header() {
        let mut record = record_with_moves(3);
        record
            .headers
            .insert("PlyCount".to_string(), "120".to_string());
        assert_eq!(record.ply_count(), 120);
    }

    #[test]
    fn test_ply_count_falls_back_to_moves() {
        let mut record = record_with_moves(7);
        assert_eq!(record.ply_count(), 7);

        record
            .headers
            .insert("PlyCount".to_string(), "n/a".to_string());
        assert_eq!(record.ply_count(), 7);
    }
}
