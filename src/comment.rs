//! Engine evaluation annotations, as written by match runners into move
//! comments: `+0.31/17 0.42s`, `-M5/33`, `book`.
//!
//! Grammar of the leading whitespace-delimited token:
//!
//! ```text
//! eval  := sign? ( "M" digits? | decimal ) "/" digits?
//! sign  := "+" | "-"                      (absent means "+")
//! decimal := digits ( "." digits? )? | "." digits
//! ```
//!
//! The depth after `/` may be empty and is never used for bucketing. A comment
//! that is empty, is the `book` sentinel, or whose first token does not match
//! carries no evaluation.

use regex::Regex;
use std::sync::LazyLock;

pub const BOOK_SENTINEL: &str = "book";

static EVALUATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<sign>[+-]?)(?:(?P<mate>M)\d*|(?P<value>\d+(?:\.\d*)?|\.\d+))/(?P<depth>\d*)$",
    )
    .expect("valid evaluation regex")
});

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Score {
    /// Evaluation in centipawns, rounded to the nearest integer.
    Centipawns(i32),
    /// Forced mate; `winning` carries the annotation's sign.
    Mate { winning: bool },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Evaluation {
    pub score: Score,
    pub depth: Option<u32>,
}

pub fn parse_evaluation(comment: &str) -> Option<Evaluation> {
    let comment = comment.trim();
    if comment.is_empty() || comment == BOOK_SENTINEL {
        return None;
    }

    let token = comment.split_whitespace().next()?;
    let caps = EVALUATION_RE.captures(token)?;

    let negative = &caps["sign"] == "-";
    let depth = caps
        .name("depth")
        .map(|m| m.as_str())
        .filter(|d| !d.is_empty())
        .and_then(|d| d.parse::<u32>().ok());

    let score = if caps.name("mate").is_some() {
        Score::Mate { winning: !negative }
    } else {
        let value: f64 = caps.name("value")?.as_str().parse().ok()?;
        // `as` saturates, which the later clamp absorbs anyway.
        let centipawns = (value * 100.0).round() as i32;
        Score::Centipawns(if negative { -centipawns } else { centipawns })
    };

    Some(Evaluation { score, depth })
}
