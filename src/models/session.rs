//! The game session: a state machine owning the tracker and the game.
//!
//! `Idle -> InProgress -> (GameOver | Idle)`. Only `InProgress` permits
//! polling and move confirmation; everything else is an invalid-state error.
//! The session is a plain value passed by the caller - one session per board,
//! no process-wide state.

use log::debug;
use shakmaty::san::San;
use shakmaty::{Chess, Move, Position, Role};

use crate::error::SessionError;
use crate::models::board::BoardTracker;
use crate::models::game::{Game, GameOutcome};
use crate::models::link::SnapshotSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    InProgress,
    GameOver,
}

pub struct Session<S> {
    state: SessionState,
    tracker: BoardTracker<S>,
    game: Option<Game>,
    candidate: Option<Move>,
}

impl<S: SnapshotSource> Session<S> {
    pub fn new(tracker: BoardTracker<S>) -> Self {
        Self {
            state: SessionState::Idle,
            tracker,
            game: None,
            candidate: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The inferred move awaiting confirmation, if any.
    pub fn candidate(&self) -> Option<&Move> {
        self.candidate.as_ref()
    }

    /// A snapshot of the tracked position.
    pub fn position(&self) -> Option<Chess> {
        self.tracker.position()
    }

    pub fn game(&self) -> Option<&Game> {
        self.game.as_ref()
    }

    pub fn source_mut(&mut self) -> &mut S {
        self.tracker.source_mut()
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        let game = self.game.as_ref()?;
        let position = self.tracker.position()?;
        game.outcome(&position)
    }

    fn invalid_state(&self) -> SessionError {
        SessionError::InvalidState { state: self.state }
    }

    /// Start a new game from the standard position. State must be `Idle`.
    pub fn new_game(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Idle {
            return Err(self.invalid_state());
        }
        debug!("starting new game");
        self.tracker.reset_to_start();
        let mut game = Game::new();
        if let Some(position) = self.tracker.position() {
            game.record_position(&position);
        }
        self.game = Some(game);
        self.candidate = None;
        self.state = SessionState::InProgress;
        Ok(())
    }

    /// Poll the board and refresh the candidate move. Call this on every tick
    /// of the driving loop; outside `InProgress` it does nothing.
    pub fn update(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::InProgress {
            return Ok(());
        }
        self.candidate = self.tracker.poll()?;
        self.check_game_over();
        Ok(())
    }

    fn check_game_over(&mut self) {
        if self.state == SessionState::InProgress {
            if let Some(outcome) = self.outcome() {
                debug!("game over: {outcome}");
                self.state = SessionState::GameOver;
                self.candidate = None;
            }
        }
    }

    /// Confirm the pending candidate move and commit it to the position.
    ///
    /// A confirmation while the opponent's draw offer is pending declines the
    /// offer. `promote_to` overrides the default queen promotion; it is
    /// ignored for non-promoting moves.
    pub fn confirm_move(&mut self, promote_to: Option<Role>) -> Result<Move, SessionError> {
        if self.state != SessionState::InProgress {
            return Err(self.invalid_state());
        }
        let position = self.tracker.position().ok_or_else(|| self.invalid_state())?;
        let game = self.game.as_mut().ok_or(SessionError::InvalidState {
            state: SessionState::InProgress,
        })?;
        let mut m = self.candidate.take().ok_or(SessionError::NoCandidate)?;

        // Answering a draw offer with a move declines it
        if let Some(offerer) = game.offered_draw() {
            if offerer != position.turn() {
                game.decline_offered_draw()?;
            }
        }

        if let Some(role) = promote_to {
            m = with_promotion(m, role);
        }

        let san = San::from_move(&position, m.clone()).to_string();
        self.tracker.commit(&m)?;
        if let Some(position) = self.tracker.position() {
            if let Some(game) = self.game.as_mut() {
                game.record_position(&position);
            }
        }
        debug!("confirmed move {san}");
        self.check_game_over();
        Ok(m)
    }

    /// The current player offers a draw.
    pub fn offer_draw(&mut self) -> Result<(), SessionError> {
        let (game, position) = self.game_in_progress()?;
        game.offer_draw(position.turn())?;
        Ok(())
    }

    pub fn accept_offered_draw(&mut self) -> Result<(), SessionError> {
        let (game, _) = self.game_in_progress()?;
        game.accept_offered_draw()?;
        self.check_game_over();
        Ok(())
    }

    pub fn decline_offered_draw(&mut self) -> Result<(), SessionError> {
        let (game, _) = self.game_in_progress()?;
        game.decline_offered_draw()?;
        Ok(())
    }

    /// Claim a draw under the 50-move or repetition rules.
    pub fn claim_draw(&mut self) -> Result<(), SessionError> {
        let (game, position) = self.game_in_progress()?;
        game.claim_draw(&position)?;
        self.check_game_over();
        Ok(())
    }

    /// The current player resigns.
    pub fn resign(&mut self) -> Result<(), SessionError> {
        let (game, position) = self.game_in_progress()?;
        game.resign(position.turn());
        self.check_game_over();
        Ok(())
    }

    /// Abandon the session and return to `Idle`. Allowed from `InProgress`
    /// and `GameOver`.
    pub fn exit(&mut self) -> Result<(), SessionError> {
        if self.state == SessionState::Idle {
            return Err(self.invalid_state());
        }
        debug!("exiting session");
        self.tracker.clear();
        self.game = None;
        self.candidate = None;
        self.state = SessionState::Idle;
        Ok(())
    }

    fn game_in_progress(&mut self) -> Result<(&mut Game, Chess), SessionError> {
        if self.state != SessionState::InProgress {
            return Err(self.invalid_state());
        }
        let position = self
            .tracker
            .position()
            .ok_or(SessionError::InvalidState {
                state: self.state,
            })?;
        let game = self.game.as_mut().ok_or(SessionError::InvalidState {
            state: SessionState::InProgress,
        })?;
        Ok((game, position))
    }
}

/// Replace the promotion piece of a candidate move. All four promotions from
/// the same squares are legal whenever one is, so the result stays legal.
fn with_promotion(m: Move, role: Role) -> Move {
    match m {
        Move::Normal {
            role: moved,
            from,
            to,
            capture,
            promotion: Some(_),
        } => Move::Normal {
            role: moved,
            from,
            to,
            capture,
            promotion: Some(role),
        },
        other => other,
    }
}
