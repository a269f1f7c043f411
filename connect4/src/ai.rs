//! Move selection for the automated side.
//!
//! Rules are tried in a fixed order and the first one that applies decides:
//! take an immediate win, block the opponent's immediate win, take the center,
//! otherwise any open column at random. Only the next placement is looked at;
//! there is no search over replies.
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::board::{Board, CENTER_COLUMN};
use crate::Side;

/// Which rule picked the column.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Rule {
    WinNow,
    Block,
    Center,
    Random,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Choice {
    pub column: usize,
    pub rule: Rule,
}

/// Picks a column for `me`. Returns `None` only when no column has room.
pub fn choose_column<R: Rng + ?Sized>(
    board: &Board,
    me: Side,
    opponent: Side,
    rng: &mut R,
) -> Option<Choice> {
    let open = board.open_columns();
    let choice = if let Some(column) = first_winning_column(board, &open, me) {
        Choice {
            column,
            rule: Rule::WinNow,
        }
    } else if let Some(column) = first_winning_column(board, &open, opponent) {
        Choice {
            column,
            rule: Rule::Block,
        }
    } else if board.has_room(CENTER_COLUMN) {
        Choice {
            column: CENTER_COLUMN,
            rule: Rule::Center,
        }
    } else {
        Choice {
            column: *open.choose(rng)?,
            rule: Rule::Random,
        }
    };
    debug!(side = ?me, column = choice.column, rule = ?choice.rule, "automated choice");
    Some(choice)
}

/// Ties go to the lowest column index.
fn first_winning_column(board: &Board, open: &[usize], side: Side) -> Option<usize> {
    open.iter().copied().find(|&col| board.would_win(col, side))
}
