//! The 6x7 grid. Row 0 is the top, row 5 the bottom; pieces settle on the
//! lowest empty cell of a column, so every column is a contiguous stack
//! growing from row 5.
use serde::{Deserialize, Serialize};

use crate::{GameError, Side};

pub const ROWS: usize = 6;
pub const COLS: usize = 7;
pub const WIN_LENGTH: usize = 4;
pub const CENTER_COLUMN: usize = COLS / 2;

/// Horizontal, vertical, and both diagonals as (row step, column step).
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (-1, 1)];

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Cell {
    #[default]
    Empty,
    Occupied(Side),
}

impl Cell {
    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn side(self) -> Option<Side> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(side) => Some(side),
        }
    }
}

impl From<Cell> for u8 {
    fn from(cell: Cell) -> u8 {
        match cell {
            Cell::Empty => 0,
            Cell::Occupied(Side::First) => 1,
            Cell::Occupied(Side::Second) => 2,
        }
    }
}

impl TryFrom<u8> for Cell {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Cell::Empty),
            1 => Ok(Cell::Occupied(Side::First)),
            2 => Ok(Cell::Occupied(Side::Second)),
            other => Err(format!("invalid cell value {other}, expected 0, 1 or 2")),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [[Cell; COLS]; ROWS],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Panics if `row` or `col` is off the grid.
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }

    pub fn rows(&self) -> &[[Cell; COLS]; ROWS] {
        &self.cells
    }

    /// A column has room while its top cell is empty. Out-of-range columns
    /// never have room.
    pub fn has_room(&self, column: usize) -> bool {
        column < COLS && self.cells[0][column].is_empty()
    }

    /// Columns with room, left to right.
    pub fn open_columns(&self) -> Vec<usize> {
        (0..COLS).filter(|&col| self.has_room(col)).collect()
    }

    /// Drops a piece for `side` into `column` and returns the row it landed on.
    /// A full column is an error and leaves the board untouched.
    pub fn place_piece(&mut self, column: usize, side: Side) -> Result<usize, GameError> {
        if column >= COLS {
            return Err(GameError::invalid_column(column));
        }
        for row in (0..ROWS).rev() {
            if self.cells[row][column].is_empty() {
                self.cells[row][column] = Cell::Occupied(side);
                return Ok(row);
            }
        }
        Err(GameError::ColumnFull { column })
    }

    /// Looks for a line of four or more through `(row, col)` only; a new win
    /// can only involve the piece that was just placed.
    pub fn check_win(&self, row: usize, col: usize) -> Option<Side> {
        let side = self.cells.get(row)?.get(col)?.side()?;
        DIRECTIONS
            .iter()
            .any(|&(dr, dc)| {
                1 + self.run_length(row, col, dr, dc, side)
                    + self.run_length(row, col, -dr, -dc, side)
                    >= WIN_LENGTH
            })
            .then_some(side)
    }

    /// Gravity makes a full top row equivalent to a full board.
    pub fn is_full(&self) -> bool {
        self.cells[0].iter().all(|cell| !cell.is_empty())
    }

    /// Whether dropping `side` into `column` would complete a line. Evaluated
    /// on a copy, so `self` is never touched.
    pub fn would_win(&self, column: usize, side: Side) -> bool {
        let mut probe = *self;
        match probe.place_piece(column, side) {
            Ok(row) => probe.check_win(row, column) == Some(side),
            Err(_) => false,
        }
    }

    pub fn piece_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| !cell.is_empty())
            .count()
    }

    /// Matching cells walking away from `(row, col)`, not counting the start.
    fn run_length(&self, row: usize, col: usize, dr: isize, dc: isize, side: Side) -> usize {
        let mut count = 0;
        let (mut r, mut c) = (row as isize + dr, col as isize + dc);
        while (0..ROWS as isize).contains(&r)
            && (0..COLS as isize).contains(&c)
            && self.cells[r as usize][c as usize] == Cell::Occupied(side)
        {
            count += 1;
            r += dr;
            c += dc;
        }
        count
    }

    /// Builds a board from top-to-bottom rows of `.`, `F` and `S`. No gravity
    /// check is made.
    #[cfg(test)]
    pub(crate) fn from_rows(rows: [&str; ROWS]) -> Self {
        let mut board = Board::new();
        for (r, line) in rows.iter().enumerate() {
            for (c, ch) in line.chars().enumerate() {
                board.cells[r][c] = match ch {
                    'F' => Cell::Occupied(Side::First),
                    'S' => Cell::Occupied(Side::Second),
                    _ => Cell::Empty,
                };
            }
        }
        board
    }
}
