//! Game-level state around the tracked position: draw offers and claims,
//! resignation, and outcome classification.
//!
//! The position itself lives in the board tracker; this layer only keeps the
//! conversational state and the trail of seen positions needed for
//! repetition rules.

use std::fmt;

use log::debug;
use shakmaty::zobrist::{Zobrist64, ZobristHash};
use shakmaty::{Chess, Color, EnPassantMode, Position};

use crate::error::GameError;

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    // Checkmates
    CheckmateByWhite,
    CheckmateByBlack,
    // Draws
    AgreedDraw,
    Stalemate,
    InsufficientMaterial,
    ForcedSeventyFiveMoves,
    ForcedFivefoldRepetition,
    ClaimedFiftyMoves,
    ClaimedThreefoldRepetition,
    // Resignation
    ResignationByWhite,
    ResignationByBlack,
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            GameOutcome::CheckmateByWhite => "White wins by checkmate",
            GameOutcome::CheckmateByBlack => "Black wins by checkmate",
            GameOutcome::AgreedDraw => "Agreed upon draw",
            GameOutcome::Stalemate => "Stalemate",
            GameOutcome::InsufficientMaterial => "Insufficient material",
            GameOutcome::ForcedSeventyFiveMoves => "Forced 75 move rule draw",
            GameOutcome::ForcedFivefoldRepetition => "Forced 5 fold repetition draw",
            GameOutcome::ClaimedFiftyMoves => "Claimed 50 move rule draw",
            GameOutcome::ClaimedThreefoldRepetition => "Claimed 3 fold repetition draw",
            GameOutcome::ResignationByWhite => "Resignation by white",
            GameOutcome::ResignationByBlack => "Resignation by black",
        };
        f.write_str(text)
    }
}

/// Conversational state of one game.
#[derive(Debug, Clone, Default)]
pub struct Game {
    claim_draw: bool,
    offered_draw: Option<Color>,
    agreed_draw: bool,
    resigned_by: Option<Color>,
    seen_positions: Vec<Zobrist64>,
}

impl Game {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember a position for the repetition rules. Call once for the
    /// initial position and once after every committed move.
    pub fn record_position(&mut self, position: &Chess) {
        let hash: Zobrist64 = position.zobrist_hash(EnPassantMode::Legal);
        self.seen_positions.push(hash);
    }

    fn repetitions(&self, position: &Chess) -> usize {
        let hash: Zobrist64 = position.zobrist_hash(EnPassantMode::Legal);
        self.seen_positions.iter().filter(|h| **h == hash).count()
    }

    /// The outcome of the game, or `None` while it is still in progress.
    pub fn outcome(&self, position: &Chess) -> Option<GameOutcome> {
        if let Some(color) = self.resigned_by {
            return Some(match color {
                Color::White => GameOutcome::ResignationByWhite,
                Color::Black => GameOutcome::ResignationByBlack,
            });
        }
        if self.agreed_draw {
            return Some(GameOutcome::AgreedDraw);
        }
        if position.is_checkmate() {
            // The side to move is the one that got mated
            return Some(match position.turn() {
                Color::White => GameOutcome::CheckmateByBlack,
                Color::Black => GameOutcome::CheckmateByWhite,
            });
        }
        if position.is_stalemate() {
            return Some(GameOutcome::Stalemate);
        }
        if position.is_insufficient_material() {
            return Some(GameOutcome::InsufficientMaterial);
        }
        if position.halfmoves() >= 150 {
            return Some(GameOutcome::ForcedSeventyFiveMoves);
        }
        if self.repetitions(position) >= 5 {
            return Some(GameOutcome::ForcedFivefoldRepetition);
        }
        if self.claim_draw {
            if position.halfmoves() >= 100 {
                return Some(GameOutcome::ClaimedFiftyMoves);
            }
            if self.repetitions(position) >= 3 {
                return Some(GameOutcome::ClaimedThreefoldRepetition);
            }
        }
        None
    }

    pub fn can_claim_draw(&self, position: &Chess) -> bool {
        position.halfmoves() >= 100 || self.repetitions(position) >= 3
    }

    /// Claim a draw under the 50-move or threefold-repetition rule.
    pub fn claim_draw(&mut self, position: &Chess) -> Result<(), GameError> {
        if !self.can_claim_draw(position) {
            return Err(GameError::CannotClaimDraw);
        }
        debug!("{:?} claiming draw", position.turn());
        self.claim_draw = true;
        Ok(())
    }

    /// The color with a pending draw offer, if any.
    pub fn offered_draw(&self) -> Option<Color> {
        self.offered_draw
    }

    pub fn offer_draw(&mut self, color: Color) -> Result<(), GameError> {
        if self.offered_draw.is_some() {
            return Err(GameError::DrawAlreadyOffered);
        }
        debug!("{color:?} offering draw");
        self.offered_draw = Some(color);
        Ok(())
    }

    pub fn accept_offered_draw(&mut self) -> Result<(), GameError> {
        if self.offered_draw.take().is_none() {
            return Err(GameError::NoDrawOffered);
        }
        debug!("draw offer accepted");
        self.agreed_draw = true;
        Ok(())
    }

    pub fn decline_offered_draw(&mut self) -> Result<(), GameError> {
        if self.offered_draw.take().is_none() {
            return Err(GameError::NoDrawOffered);
        }
        debug!("draw offer declined");
        Ok(())
    }

    /// The given player gives up; the other player wins.
    pub fn resign(&mut self, color: Color) {
        debug!("{color:?} resigning");
        self.resigned_by = Some(color);
    }
}
