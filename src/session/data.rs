//! Shared in-memory working set for one open board.
//!
//! The session, registry, and queue all hold the same `SharedBoardData`.
//! The mutex is never held across an await point; persistence calls run
//! outside every critical section.

use crate::client::BoardSnapshot;
use crate::types::{Athlete, Position};
use std::sync::{Arc, Mutex};

pub(crate) type SharedBoardData = Arc<Mutex<BoardData>>;

/// The canonical in-memory athlete and position collections
#[derive(Debug, Default)]
pub(crate) struct BoardData {
    pub athletes: Vec<Athlete>,
    pub positions: Vec<Position>,
}

impl BoardData {
    pub fn from_snapshot(snapshot: BoardSnapshot) -> Self {
        Self {
            athletes: snapshot.athletes,
            positions: snapshot.positions,
        }
    }

    /// Replace both collections with an authoritative snapshot
    pub fn replace(&mut self, snapshot: BoardSnapshot) {
        self.athletes = snapshot.athletes;
        self.positions = snapshot.positions;
    }

    pub fn shared(snapshot: BoardSnapshot) -> SharedBoardData {
        Arc::new(Mutex::new(Self::from_snapshot(snapshot)))
    }
}
