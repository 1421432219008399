//! Inferring the move played on the physical board.
//!
//! Sensors report occupancy only - no piece identity, no color - so the move
//! has to be reconstructed from which squares changed relative to the tracked
//! position, with a short history of readings to untangle captures. The
//! engine is advisory: it proposes at most one legal move per poll and leaves
//! committing it to the caller.

use log::debug;
use shakmaty::{Bitboard, Chess, File, Move, Position, Role, Square};

use crate::domain::history::SnapshotHistory;
use crate::domain::occupancy::{diff, occupancy_of, starting_occupancy};

/// Outcome of a single inference poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inference {
    /// Nothing to report: the board is settled, mid-gesture, or ambiguous.
    NoCandidate,
    /// A single legal move explains the difference.
    Candidate(Move),
    /// All 32 starting squares appeared on an untracked board; the caller
    /// should reset the position to the standard start.
    SetupComplete,
}

/// Interpret a physical reading against the tracked position.
///
/// Records `physical` into `history` (collapsed) and clears the history when
/// the board is settled or freshly set up. The position itself is never
/// touched here. Failing to find a move is the normal "keep waiting" result,
/// not an error.
pub fn infer(
    position: Option<&Chess>,
    physical: Bitboard,
    history: &mut SnapshotHistory,
) -> Inference {
    let current = position.map_or(Bitboard::EMPTY, occupancy_of);
    let (additions, removals) = diff(current, physical);

    history.record(physical);

    if removals.is_empty() && additions.is_empty() {
        // Board matches the tracked position, nothing pending
        history.clear();
        return Inference::NoCandidate;
    }
    debug!(
        "physical reading differs: {} removals, {} additions, {} history entries",
        removals.count(),
        additions.count(),
        history.len()
    );

    if removals.is_empty() && additions == starting_occupancy() {
        history.clear();
        return Inference::SetupComplete;
    }

    let Some(position) = position else {
        return Inference::NoCandidate;
    };

    if removals.count() == 1 && additions.count() == 1 {
        let (Some(from), Some(to)) = (removals.single_square(), additions.single_square()) else {
            return Inference::NoCandidate;
        };
        if let Some(m) = find_legal_move(position, from, to) {
            return Inference::Candidate(m);
        }
    } else if removals.count() == 1 && additions.is_empty() {
        if let Some(from) = removals.single_square() {
            if let Some(m) = infer_capture(position, from, history) {
                return Inference::Candidate(m);
            }
        }
    }

    Inference::NoCandidate
}

/// Resolve a lifted piece into a capture, using history when several captures
/// share the origin square.
fn infer_capture(position: &Chess, from: Square, history: &SnapshotHistory) -> Option<Move> {
    let captures: Vec<Move> = position
        .legal_moves()
        .iter()
        .filter(|m| m.from() == Some(from) && m.is_capture())
        .cloned()
        .collect();
    debug!("{} legal captures from {}", captures.len(), from);

    match captures.as_slice() {
        [] => None,
        [only] => Some(only.clone()),
        _ => {
            // Several captures could start on this square. The trail of
            // distinct readings recovers the destination: the second-to-last
            // entry caught both pieces airborne, the last one the capturer
            // landing, so their difference is the landing square.
            let entries = history.entries();
            if entries.len() <= 2 {
                return None;
            }
            let landing_reading = entries[entries.len() - 1];
            let both_lifted = entries[entries.len() - 2];
            let to = (landing_reading & !both_lifted).single_square()?;
            find_legal_move(position, from, to)
        }
    }
}

/// Find the legal move matching a from/to pair, if any.
///
/// Castling is matched by the king's two-square displacement, which is what
/// the sensors see when the king is moved first. Promotions resolve to the
/// queen until the player picks otherwise at confirmation time.
pub fn find_legal_move(position: &Chess, from_sq: Square, to_sq: Square) -> Option<Move> {
    for m in &position.legal_moves() {
        let (move_from, move_to) = match m {
            Move::Normal { from, to, .. } => (*from, *to),
            Move::EnPassant { from, to, .. } => (*from, *to),
            Move::Castle { king, rook } => {
                let king_dest = if rook.file() == File::H {
                    Square::from_coords(File::G, rook.rank())
                } else {
                    Square::from_coords(File::C, rook.rank())
                };
                (*king, king_dest)
            }
            Move::Put { .. } => continue,
        };

        if move_from == from_sq && move_to == to_sq {
            if let Move::Normal {
                promotion: Some(role),
                ..
            } = m
            {
                if *role != Role::Queen {
                    continue;
                }
            }
            return Some(m.clone());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::fen::Fen;
    use shakmaty::{CastlingMode, Color};

    fn position(fen: &str) -> Chess {
        fen.parse::<Fen>()
            .unwrap()
            .into_position(CastlingMode::Standard)
            .unwrap()
    }

    fn expect_candidate(inference: Inference) -> Move {
        match inference {
            Inference::Candidate(m) => m,
            other => panic!("expected a candidate move, got {:?}", other),
        }
    }

    #[test]
    fn test_settled_board_yields_nothing_and_clears_history() {
        let start = Chess::default();
        let mut history = SnapshotHistory::new();
        history.record(Bitboard::from(Square::A1));
        for _ in 0..3 {
            let result = infer(Some(&start), occupancy_of(&start), &mut history);
            assert_eq!(result, Inference::NoCandidate);
            assert!(history.is_empty());
        }
    }

    #[test]
    fn test_simple_pawn_move() {
        let start = Chess::default();
        let mut physical = occupancy_of(&start);
        physical.toggle(Square::E2);
        physical.toggle(Square::E4);

        let mut history = SnapshotHistory::new();
        let m = expect_candidate(infer(Some(&start), physical, &mut history));
        assert_eq!(m.from(), Some(Square::E2));
        assert_eq!(m.to(), Square::E4);
    }

    #[test]
    fn test_illegal_difference_yields_nothing() {
        let start = Chess::default();
        let mut physical = occupancy_of(&start);
        physical.toggle(Square::E2);
        physical.toggle(Square::E5); // pawns cannot triple-step
        let mut history = SnapshotHistory::new();
        assert_eq!(
            infer(Some(&start), physical, &mut history),
            Inference::NoCandidate
        );
    }

    #[test]
    fn test_unambiguous_capture_on_lift() {
        // After 1. e4 d5 the only capture from e4 is exd5
        let pos = position("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2");
        let mut physical = occupancy_of(&pos);
        physical.toggle(Square::E4);

        let mut history = SnapshotHistory::new();
        let m = expect_candidate(infer(Some(&pos), physical, &mut history));
        assert_eq!(m.from(), Some(Square::E4));
        assert_eq!(m.to(), Square::D5);
        assert!(m.is_capture());
    }

    #[test]
    fn test_ambiguous_capture_resolved_by_history() {
        // The e5 knight can take on d7 or f7
        let pos = position("k7/3p1p2/8/4N3/8/8/8/K7 w - - 0 1");
        let occ = occupancy_of(&pos);
        let lifted_knight = occ & !Bitboard::from(Square::E5);
        let both_lifted = lifted_knight & !Bitboard::from(Square::F7);
        let landed = lifted_knight; // knight now sits on f7

        let mut history = SnapshotHistory::new();
        assert_eq!(
            infer(Some(&pos), lifted_knight, &mut history),
            Inference::NoCandidate
        );
        assert_eq!(
            infer(Some(&pos), both_lifted, &mut history),
            Inference::NoCandidate
        );
        let m = expect_candidate(infer(Some(&pos), landed, &mut history));
        assert_eq!(m.from(), Some(Square::E5));
        assert_eq!(m.to(), Square::F7);
        assert!(m.is_capture());
    }

    #[test]
    fn test_ambiguous_capture_with_short_history_stays_pending() {
        let pos = position("k7/3p1p2/8/4N3/8/8/8/K7 w - - 0 1");
        let occ = occupancy_of(&pos);
        let lifted_knight = occ & !Bitboard::from(Square::E5);

        // Poll missed the single-lift state: only the final reading arrives
        let mut history = SnapshotHistory::new();
        assert_eq!(
            infer(Some(&pos), lifted_knight, &mut history),
            Inference::NoCandidate
        );
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_initial_setup_detected_on_untracked_board() {
        let mut history = SnapshotHistory::new();
        let result = infer(None, starting_occupancy(), &mut history);
        assert_eq!(result, Inference::SetupComplete);
        assert!(history.is_empty());
    }

    #[test]
    fn test_setup_requires_the_standard_squares() {
        // 32 squares, but one pawn sits on e4 instead of e2
        let mut physical = starting_occupancy();
        physical.toggle(Square::E2);
        physical.toggle(Square::E4);
        assert_eq!(physical.count(), 32);

        let mut history = SnapshotHistory::new();
        assert_eq!(
            infer(None, physical, &mut history),
            Inference::NoCandidate
        );
    }

    #[test]
    fn test_multi_piece_transient_yields_nothing() {
        let start = Chess::default();
        let mut physical = occupancy_of(&start);
        physical.toggle(Square::E2);
        physical.toggle(Square::D2);
        let mut history = SnapshotHistory::new();
        assert_eq!(
            infer(Some(&start), physical, &mut history),
            Inference::NoCandidate
        );
    }

    #[test]
    fn test_stray_addition_yields_nothing() {
        let start = Chess::default();
        let physical = occupancy_of(&start) | Bitboard::from(Square::E4);
        let mut history = SnapshotHistory::new();
        assert_eq!(
            infer(Some(&start), physical, &mut history),
            Inference::NoCandidate
        );
    }

    #[test]
    fn test_castling_matched_by_king_displacement() {
        let pos = position("r1bqk1nr/pppp1ppp/2n5/2b1p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4");
        let mut physical = occupancy_of(&pos);
        physical.toggle(Square::E1);
        physical.toggle(Square::G1);

        let mut history = SnapshotHistory::new();
        let m = expect_candidate(infer(Some(&pos), physical, &mut history));
        assert!(matches!(m, Move::Castle { .. }));
    }

    #[test]
    fn test_promotion_defaults_to_queen() {
        let pos = position("8/P6k/8/8/8/8/8/K7 w - - 0 1");
        let mut physical = occupancy_of(&pos);
        physical.toggle(Square::A7);
        physical.toggle(Square::A8);

        let mut history = SnapshotHistory::new();
        let m = expect_candidate(infer(Some(&pos), physical, &mut history));
        match m {
            Move::Normal { promotion, .. } => assert_eq!(promotion, Some(Role::Queen)),
            other => panic!("expected a promotion, got {:?}", other),
        }
    }

    #[test]
    fn test_find_legal_move_rejects_wrong_side() {
        let start = Chess::default();
        assert_eq!(start.turn(), Color::White);
        // Black pawn move while white is to play
        assert!(find_legal_move(&start, Square::E7, Square::E5).is_none());
    }
}
