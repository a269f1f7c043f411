//! Connect 4 engine for a single shared match.
//! The board is a 6x7 grid with gravity; a [`Game`] drives turn order, win and
//! draw detection, and, against the automated opponent, answers every human
//! move with a one-ply heuristic reply (win now, block, center, random).
//!
//! The engine is synchronous and assumes one mutation at a time. Servers that
//! share a match between requests should go through [`SharedGame`].
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod ai;
pub mod board;
pub mod game;
pub mod session;

pub use ai::{choose_column, Choice, Rule};
pub use board::{Board, Cell, CENTER_COLUMN, COLS, ROWS, WIN_LENGTH};
pub use game::{Game, GameState, Mode, MoveReport, Phase};
pub use session::SharedGame;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Red, always the human.
    First,
    /// Yellow, the automated side in [`Mode::VsAutomated`].
    Second,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Side::First => "Red",
            Side::Second => "Yellow",
        }
    }
}

/// Terminal result of a match.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    First,
    Second,
    Draw,
}

impl From<Side> for Outcome {
    fn from(side: Side) -> Self {
        match side {
            Side::First => Outcome::First,
            Side::Second => Outcome::Second,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("column {column} is full")]
    ColumnFull { column: usize },
    #[error("column {column} is out of bounds")]
    InvalidColumn { column: i64 },
    #[error("the game is over, start a new one")]
    MoveAfterGameOver,
    #[error("no legal moves remain")]
    NoMoves,
    #[error("unknown game mode {0:?}")]
    UnknownMode(String),
}

impl GameError {
    pub(crate) fn invalid_column(column: usize) -> Self {
        GameError::InvalidColumn {
            column: i64::try_from(column).unwrap_or(i64::MAX),
        }
    }
}

/// One accepted piece on the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub side: Side,
    pub row: usize,
    pub column: usize,
}
