//! Pending rank/position write batches.

use super::ids::AthleteId;
use serde::{Deserialize, Serialize};

/// One athlete's new rank (and optionally new column) inside a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankUpdate {
    pub athlete_id: AthleteId,
    pub rank: i64,
    /// New column name, present only when the athlete changed columns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

impl RankUpdate {
    /// Rank-only update within the athlete's current column
    pub fn rank(athlete_id: AthleteId, rank: i64) -> Self {
        Self {
            athlete_id,
            rank,
            position: None,
        }
    }

    /// Update that also moves the athlete to a new column
    pub fn moved(athlete_id: AthleteId, rank: i64, position: impl Into<String>) -> Self {
        Self {
            athlete_id,
            rank,
            position: Some(position.into()),
        }
    }
}

/// All rank/position changes produced by one user gesture.
///
/// A single drag can displace many cards after the drop point; every
/// affected athlete travels in the same batch so the remote store applies
/// the gesture atomically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingBatch {
    pub updates: Vec<RankUpdate>,
}

impl PendingBatch {
    /// Create a batch from the affected updates, in application order
    pub fn new(updates: Vec<RankUpdate>) -> Self {
        Self { updates }
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }
}
