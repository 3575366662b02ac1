use crate::comment::parse_evaluation;
use crate::error::EncodeError;
use crate::histogram::Histogram;
use crate::key::{GameOutcome, PositionKey, ScoreBucket, move_number_for_ply};
use crate::types::GameRecord;
use shakmaty::fen::Fen;
use shakmaty::{Board, CastlingMode, Chess, Position, Role};

/// Plies replayed per game. Later moves are ignored.
pub const PLY_HORIZON: u32 = 400;

const MATERIAL_WEIGHTS: [(Role, u32); 5] = [
    (Role::Queen, 9),
    (Role::Rook, 5),
    (Role::Bishop, 3),
    (Role::Knight, 3),
    (Role::Pawn, 1),
];

/// Weighted non-king material of both sides together.
pub fn material_count(board: &Board) -> u8 {
    let total: u32 = MATERIAL_WEIGHTS
        .iter()
        .map(|&(role, weight)| board.by_role(role).count() as u32 * weight)
        .sum();
    u8::try_from(total).unwrap_or(u8::MAX)
}

/// Whether a `Variant` tag names the randomized-start variant.
pub fn is_chess960(variant: &str) -> bool {
    let normalized: String = variant
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect();
    matches!(
        normalized.as_str(),
        "fischerandom" | "fischerrandom" | "chess960" | "960" | "frc"
    )
}

/// Starting position of a game: the `FEN` tag if present, otherwise the
/// standard array. A Chess960 `Variant` tag switches castling to 960 rules.
pub fn initial_position(game: &GameRecord) -> Result<Chess, EncodeError> {
    let mode = match game.header("Variant") {
        Some(variant) if is_chess960(variant) => CastlingMode::Chess960,
        _ => CastlingMode::Standard,
    };

    let Some(raw) = game.header("FEN") else {
        // The standard array castles identically under both modes.
        return Ok(Chess::default());
    };

    let invalid = |reason: String| EncodeError::InvalidFen {
        fen: raw.to_string(),
        reason,
    };
    let fen: Fen = raw.trim().parse().map_err(|e| invalid(format!("{e}")))?;
    fen.into_position(mode).map_err(|e| invalid(format!("{e}")))
}

/// Replays annotated games and counts one key per scored ply.
#[derive(Clone, Copy, Debug)]
pub struct PositionKeyEncoder {
    horizon: u32,
}

impl Default for PositionKeyEncoder {
    fn default() -> Self {
        Self::new(PLY_HORIZON)
    }
}

impl PositionKeyEncoder {
    pub fn new(horizon: u32) -> Self {
        Self { horizon }
    }

    pub fn horizon(&self) -> u32 {
        self.horizon
    }

    /// Adds the keys of `game` to `histogram` and returns how many were added.
    ///
    /// Games without a decisive or drawn `Result` contribute nothing. Each
    /// key is taken before its move is played: the mover's own outcome label,
    /// the full-move number of the ply, the material on the board and the
    /// bucketed evaluation from the move's comment. Plies without an
    /// evaluation are skipped, not zero-filled.
    ///
    /// On an unreadable FEN or an unplayable move the game stops there; keys
    /// already added stay in `histogram`.
    pub fn encode(&self, game: &GameRecord, histogram: &mut Histogram) -> Result<u32, EncodeError> {
        let Some(outcome) = game.header("Result").and_then(GameOutcome::from_result) else {
            return Ok(0);
        };

        let mut pos = initial_position(game)?;
        let mut emitted = 0;

        for (ply, mv) in (1..=self.horizon).zip(&game.moves) {
            if let Some(evaluation) = mv.comment.as_deref().and_then(parse_evaluation) {
                histogram.increment(PositionKey {
                    outcome: outcome.for_side(pos.turn()),
                    move_number: move_number_for_ply(ply),
                    material: material_count(pos.board()),
                    score: ScoreBucket::from_score(evaluation.score),
                });
                emitted += 1;
            }

            let m = mv
                .san
                .san
                .to_move(&pos)
                .map_err(|e| EncodeError::IllegalMove {
                    ply,
                    san: mv.san.to_string(),
                    reason: e.to_string(),
                })?;
            pos.play_unchecked(m);
        }

        Ok(emitted)
    }
}
