use crate::comment::Score;
use shakmaty::Color;
use std::fmt;

/// Largest non-mate bucket magnitude, in centipawns.
pub const SCORE_CLAMP: i32 = 1000;
/// Bucket used for forced-mate evaluations, signed.
pub const MATE_BUCKET: i16 = 1001;
pub const BUCKET_WIDTH: i32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutcomeLabel {
    Win,
    Loss,
    Draw,
}

impl OutcomeLabel {
    pub fn as_char(self) -> char {
        match self {
            Self::Win => 'W',
            Self::Loss => 'L',
            Self::Draw => 'D',
        }
    }
}

/// Per-side outcome labels of a finished game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameOutcome {
    pub white: OutcomeLabel,
    pub black: OutcomeLabel,
}

impl GameOutcome {
    /// Maps a `Result` tag value. Anything but the three decisive/drawn
    /// markers (e.g. `*`, `1/2`, `" 1-0"`) yields `None`.
    pub fn from_result(result: &str) -> Option<Self> {
        use OutcomeLabel::*;

        let (white, black) = match result {
            "1-0" => (Win, Loss),
            "0-1" => (Loss, Win),
            "1/2-1/2" => (Draw, Draw),
            _ => return None,
        };
        Some(Self { white, black })
    }

    pub fn for_side(self, color: Color) -> OutcomeLabel {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }
}

/// A quantized evaluation: a multiple of 5 in `[-1000, 1000]`, or `±1001`
/// for mate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScoreBucket(i16);

impl ScoreBucket {
    /// Clamps to `[-1000, 1000]`, then floors to a multiple of 5 (toward
    /// negative infinity, so `-3` lands in `-5`, `3` in `0`).
    pub fn from_centipawns(centipawns: i32) -> Self {
        let clamped = centipawns.clamp(-SCORE_CLAMP, SCORE_CLAMP);
        let floored = clamped.div_euclid(BUCKET_WIDTH) * BUCKET_WIDTH;
        // |floored| <= 1000 always fits.
        Self(floored as i16)
    }

    pub fn from_score(score: Score) -> Self {
        match score {
            Score::Mate { winning: true } => Self(MATE_BUCKET),
            Score::Mate { winning: false } => Self(-MATE_BUCKET),
            Score::Centipawns(cp) => Self::from_centipawns(cp),
        }
    }

    pub fn value(self) -> i16 {
        self.0
    }

    pub fn is_mate(self) -> bool {
        self.0.abs() == MATE_BUCKET
    }
}

/// Full-move number of a 1-based ply: `ceil(ply / 2)`.
pub fn move_number_for_ply(ply: u32) -> u16 {
    u16::try_from(ply.div_ceil(2)).unwrap_or(u16::MAX)
}

/// Histogram key. Formatting happens only at the output boundary, via
/// `Display`: `('W', 12, 30, 15)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PositionKey {
    pub outcome: OutcomeLabel,
    pub move_number: u16,
    pub material: u8,
    pub score: ScoreBucket,
}

impl fmt::Display for PositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "('{}', {}, {}, {})",
            self.outcome.as_char(),
            self.move_number,
            self.material,
            self.score.value()
        )
    }
}
