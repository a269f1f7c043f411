//! Turn controller: owns the one [`GameState`] and moves it between
//! `Active(side)` and `Over(outcome)`.
use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::ai::choose_column;
use crate::board::{Board, COLS};
use crate::{GameError, Outcome, Placement, Side};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    #[serde(rename = "twoPlayer")]
    TwoPlayer,
    #[serde(rename = "ai")]
    VsAutomated,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::TwoPlayer => "twoPlayer",
            Mode::VsAutomated => "ai",
        }
    }

    /// Lenient parsing for client input: an empty value keeps `current`, an
    /// unrecognized one falls back to two players.
    pub fn from_request(raw: &str, current: Mode) -> Mode {
        let raw = raw.trim();
        if raw.is_empty() {
            return current;
        }
        raw.parse().unwrap_or_else(|_| {
            warn!(mode = raw, "unknown mode, falling back to twoPlayer");
            Mode::TwoPlayer
        })
    }
}

impl FromStr for Mode {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "twoPlayer" => Ok(Mode::TwoPlayer),
            "ai" => Ok(Mode::VsAutomated),
            other => Err(GameError::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Active(Side),
    Over(Outcome),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    board: Board,
    current_side: Side,
    mode: Mode,
    game_over: bool,
    winner: Option<Outcome>,
    status_message: String,
    last_move: Option<Placement>,
}

impl GameState {
    pub fn new(mode: Mode) -> Self {
        Self {
            board: Board::new(),
            current_side: Side::First,
            mode,
            game_over: false,
            winner: None,
            status_message: String::new(),
            last_move: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_side(&self) -> Side {
        self.current_side
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_over(&self) -> bool {
        self.game_over
    }

    pub fn winner(&self) -> Option<Outcome> {
        self.winner
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn last_move(&self) -> Option<Placement> {
        self.last_move
    }

    pub fn phase(&self) -> Phase {
        match self.winner {
            Some(outcome) => Phase::Over(outcome),
            None => Phase::Active(self.current_side),
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        self.game_over = true;
        self.winner = Some(outcome);
        self.status_message = match outcome {
            Outcome::First => format!("{} (Player 1) wins!", Side::First.color()),
            Outcome::Second => format!("{} (Player 2) wins!", Side::Second.color()),
            Outcome::Draw => "It's a draw!".to_string(),
        };
    }
}

/// Result of an accepted move: where the piece landed, the automated reply if
/// one was played, and the state after both.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveReport {
    pub placement: Placement,
    pub reply: Option<Placement>,
    pub state: GameState,
}

/// Single owner of the match. Not synchronized; see [`crate::SharedGame`].
#[derive(Debug)]
pub struct Game {
    state: GameState,
    rng: StdRng,
}

impl Game {
    pub fn new(mode: Mode) -> Self {
        Self::with_rng(mode, StdRng::from_entropy())
    }

    /// Reproducible random fallback for the automated side.
    pub fn with_seed(mode: Mode, seed: u64) -> Self {
        Self::with_rng(mode, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(mode: Mode, rng: StdRng) -> Self {
        Self {
            state: GameState::new(mode),
            rng,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Throws the current match away and starts an empty one.
    pub fn new_game(&mut self, mode: Mode) -> &GameState {
        info!(%mode, "new game");
        self.state = GameState::new(mode);
        &self.state
    }

    /// Plays `column` for the side to move. Against the automated opponent the
    /// reply is played before returning, so a human always gets the turn back
    /// unless the game ended.
    pub fn apply_move(&mut self, column: usize) -> Result<MoveReport, GameError> {
        self.ensure_active()?;
        if column >= COLS {
            return Err(self.reject(GameError::invalid_column(column)));
        }
        let placement = self.play(column)?;
        let reply = self.automated_reply();
        Ok(self.report(placement, reply))
    }

    /// Same as [`Game::apply_move`] for a column taken straight from client
    /// input, where negative values are possible.
    pub fn apply_requested_move(&mut self, column: i64) -> Result<MoveReport, GameError> {
        match usize::try_from(column) {
            Ok(column) => self.apply_move(column),
            Err(_) => {
                self.ensure_active()?;
                Err(self.reject(GameError::InvalidColumn { column }))
            }
        }
    }

    /// Lets the heuristic pick a column for whichever side is to move.
    pub fn apply_automated_move(&mut self) -> Result<MoveReport, GameError> {
        self.ensure_active()?;
        let side = self.state.current_side;
        let choice = choose_column(&self.state.board, side, side.opponent(), &mut self.rng)
            .ok_or(GameError::NoMoves)?;
        let placement = self.play(choice.column)?;
        let reply = self.automated_reply();
        Ok(self.report(placement, reply))
    }

    fn ensure_active(&self) -> Result<(), GameError> {
        if self.state.game_over {
            debug!("move rejected, game is over");
            return Err(GameError::MoveAfterGameOver);
        }
        Ok(())
    }

    fn play(&mut self, column: usize) -> Result<Placement, GameError> {
        let side = self.state.current_side;
        let row = match self.state.board.place_piece(column, side) {
            Ok(row) => row,
            Err(err) => return Err(self.reject(err)),
        };
        let placement = Placement { side, row, column };
        debug!(?side, row, column, "piece placed");
        self.state.last_move = Some(placement);

        if let Some(winner) = self.state.board.check_win(row, column) {
            info!(?winner, "game won");
            self.state.finish(winner.into());
        } else if self.state.board.is_full() {
            info!("game drawn");
            self.state.finish(Outcome::Draw);
        } else {
            // Both modes alternate strictly; the automated side never moves twice.
            self.state.current_side = side.opponent();
            self.state.status_message.clear();
        }
        Ok(placement)
    }

    fn automated_reply(&mut self) -> Option<Placement> {
        if self.state.mode != Mode::VsAutomated || self.state.phase() != Phase::Active(Side::Second)
        {
            return None;
        }
        let choice = match choose_column(&self.state.board, Side::Second, Side::First, &mut self.rng)
        {
            Some(choice) => choice,
            None => {
                warn!("automated side has no open column");
                return None;
            }
        };
        match self.play(choice.column) {
            Ok(placement) => Some(placement),
            Err(err) => {
                warn!(%err, "automated move rejected");
                None
            }
        }
    }

    fn reject(&mut self, err: GameError) -> GameError {
        debug!(%err, "move rejected");
        self.state.status_message = match err {
            GameError::ColumnFull { .. } => "Column full!".to_string(),
            GameError::InvalidColumn { .. } => "Invalid column".to_string(),
            _ => err.to_string(),
        };
        err
    }

    fn report(&self, placement: Placement, reply: Option<Placement>) -> MoveReport {
        MoveReport {
            placement,
            reply,
            state: self.state.clone(),
        }
    }
}
