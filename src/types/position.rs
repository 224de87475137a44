//! Position (column) type and the board-wide sort rule.

use super::ids::{BoardId, PositionId};
use crate::defaults::is_unassigned;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named, ordered column athletes can be placed in.
///
/// Positions are soft-ended: removal sets `ended_at` rather than deleting
/// the record, preserving history. Only positions with `ended_at == None`
/// participate in name-uniqueness and ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub board_id: BoardId,
    pub name: String,
    pub display_order: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

impl Position {
    /// Create a live position on the given board
    pub fn new(board_id: BoardId, name: impl Into<String>, display_order: i64) -> Self {
        Self {
            id: PositionId::new(),
            board_id,
            name: name.into(),
            display_order,
            ended_at: None,
        }
    }

    /// True while the position has not been ended
    pub fn is_live(&self) -> bool {
        self.ended_at.is_none()
    }
}

/// New display order for one position, as sent to the persistence layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionOrder {
    pub id: PositionId,
    pub display_order: i64,
}

/// Sort positions for display: stable ascending by `display_order`, with
/// any position named `"Unassigned"` forced to the end regardless of its
/// order value. Every read of the position set goes through this rule.
pub fn sort_positions(positions: &mut [Position]) {
    positions.sort_by_key(|p| (is_unassigned(&p.name), p.display_order));
}
