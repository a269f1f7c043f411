//! The one match a process serves, behind a lock.
use std::sync::Arc;

use parking_lot::Mutex;

use crate::game::{Game, GameState};

/// Cloneable handle to the single active [`Game`]. Every access holds the lock
/// for the whole closure, so a move and its automated reply are never
/// interleaved with another request.
#[derive(Clone, Debug)]
pub struct SharedGame {
    inner: Arc<Mutex<Game>>,
}

impl SharedGame {
    pub fn new(game: Game) -> Self {
        Self {
            inner: Arc::new(Mutex::new(game)),
        }
    }

    pub fn with_game<T>(&self, f: impl FnOnce(&mut Game) -> T) -> T {
        let mut game = self.inner.lock();
        f(&mut game)
    }

    pub fn snapshot(&self) -> GameState {
        self.with_game(|game| game.state().clone())
    }
}
