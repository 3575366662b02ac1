use crate::types::{AnnotatedMove, GameRecord};
use pgn_reader::{RawComment, RawTag, SanPlus, Skip, Visitor};
use std::collections::HashMap;
use std::ops::ControlFlow;

/// Streaming PGN visitor (pgn-reader).
///
/// Collects every tag pair and the mainline moves with their trailing
/// comments; variations are skipped. Comments that appear before the first
/// move belong to no move and are dropped. Several comments after one move
/// are joined with a single space; the pieces of an oversized comment are
/// concatenated as-is.
#[derive(Debug, Default)]
pub struct GameVisitor {
    in_partial_comment: bool,
}

impl GameVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    fn append_comment(&mut self, record: &mut GameRecord, comment: RawComment<'_>) {
        let continues_previous = self.in_partial_comment;
        let Some(last) = record.moves.last_mut() else {
            return;
        };

        let text = String::from_utf8_lossy(comment.as_bytes());
        match &mut last.comment {
            Some(existing) => {
                if !continues_previous && !existing.is_empty() {
                    existing.push(' ');
                }
                existing.push_str(&text);
            }
            None => last.comment = Some(text.into_owned()),
        }
    }
}

impl Visitor for GameVisitor {
    type Tags = HashMap<String, String>;
    type Movetext = GameRecord;
    type Output = GameRecord;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        self.in_partial_comment = false;
        ControlFlow::Continue(HashMap::with_capacity(16))
    }

    fn tag(
        &mut self,
        tags: &mut Self::Tags,
        key: &[u8],
        value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        // Duplicate tags keep their first value.
        tags.entry(String::from_utf8_lossy(key).into_owned())
            .or_insert_with(|| String::from_utf8_lossy(value.as_bytes()).into_owned());
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, tags: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        ControlFlow::Continue(GameRecord {
            headers: tags,
            moves: Vec::with_capacity(160),
        })
    }

    fn begin_variation(&mut self, _: &mut Self::Movetext) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true))
    }

    fn san(&mut self, record: &mut Self::Movetext, san: SanPlus) -> ControlFlow<Self::Output> {
        self.in_partial_comment = false;
        record.moves.push(AnnotatedMove { san, comment: None });
        ControlFlow::Continue(())
    }

    fn partial_comment(
        &mut self,
        record: &mut Self::Movetext,
        comment: RawComment<'_>,
    ) -> ControlFlow<Self::Output> {
        self.append_comment(record, comment);
        self.in_partial_comment = true;
        ControlFlow::Continue(())
    }

    fn comment(
        &mut self,
        record: &mut Self::Movetext,
        comment: RawComment<'_>,
    ) -> ControlFlow<Self::Output> {
        self.append_comment(record, comment);
        self.in_partial_comment = false;
        ControlFlow::Continue(())
    }

    fn end_game(&mut self, record: Self::Movetext) -> Self::Output {
        self.in_partial_comment = false;
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgn_reader::Reader;

    fn parse_one(pgn: &str) -> GameRecord {
        let mut reader = Reader::new(pgn.as_bytes());
        let mut visitor = GameVisitor::new();
        reader
            .read_game(&mut visitor)
            .unwrap()
            .expect("Should have parsed a game")
    }

    #[test]
    fn test_visitor_collects_headers_and_moves() {
        let game = parse_one(
            r#"[Event "Test Game"]
[Result "1-0"]
[FEN "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"]

1. e4 e5 2. Nf3 1-0"#,
        );

        assert_eq!(game.header("Event"), Some("Test Game"));
        assert_eq!(game.header("Result"), Some("1-0"));
        assert!(game.header("FEN").is_some());
        let sans: Vec<String> = game.moves.iter().map(|m| m.san.to_string()).collect();
        assert_eq!(sans, ["e4", "e5", "Nf3"]);
    }

    #[test]
    fn test_visitor_attaches_comments_to_preceding_move() {
        let game = parse_one(
            r#"[Result "1-0"]

1. e4 {+0.20/10 0.31s} e5 {-0.05/12} 2. Nf3 1-0"#,
        );

        assert_eq!(game.moves[0].comment.as_deref(), Some("+0.20/10 0.31s"));
        assert_eq!(game.moves[1].comment.as_deref(), Some("-0.05/12"));
        assert_eq!(game.moves[2].comment, None);
    }

    #[test]
    fn test_visitor_drops_comment_before_first_move() {
        let game = parse_one(
            r#"[Result "*"]

{ opening comment } 1. e4 { book } *"#,
        );

        assert_eq!(game.moves.len(), 1);
        assert_eq!(game.moves[0].comment.as_deref().map(str::trim), Some("book"));
    }

    #[test]
    fn test_visitor_joins_multiple_comments() {
        let game = parse_one(
            r#"[Result "*"]

1. e4 {first} {second} *"#,
        );

        assert_eq!(game.moves[0].comment.as_deref(), Some("first second"));
    }

    #[test]
    fn test_visitor_skips_variations() {
        let game = parse_one(
            r#"[Result "*"]

1. e4 (1. d4 {side line} d5) e5 *"#,
        );

        let sans: Vec<String> = game.moves.iter().map(|m| m.san.to_string()).collect();
        assert_eq!(sans, ["e4", "e5"]);
        assert_eq!(game.moves[0].comment, None);
    }

    #[test]
    fn test_visitor_duplicate_headers_preserve_first_value() {
        let game = parse_one(
            r#"[Result "1-0"]
[Result "0-1"]

1. e4 1-0"#,
        );

        assert_eq!(game.header("Result"), Some("1-0"));
    }

    #[test]
    fn test_visitor_keeps_empty_header_values() {
        let game = parse_one(
            r#"[Variant ""]
[Result "*"]

*"#,
        );

        assert_eq!(game.header("Variant"), Some(""));
        assert!(game.moves.is_empty());
    }

    #[test]
    fn test_visitor_reads_consecutive_games() {
        let pgn = r#"[Result "1-0"]

1. e4 1-0

[Result "0-1"]

1. d4 d5 0-1
"#;
        let mut reader = Reader::new(pgn.as_bytes());
        let mut visitor = GameVisitor::new();

        let first = reader.read_game(&mut visitor).unwrap().unwrap();
        let second = reader.read_game(&mut visitor).unwrap().unwrap();
        assert!(reader.read_game(&mut visitor).unwrap().is_none());

        assert_eq!(first.header("Result"), Some("1-0"));
        assert_eq!(first.moves.len(), 1);
        assert_eq!(second.header("Result"), Some("0-1"));
        assert_eq!(second.moves.len(), 2);
    }
}
