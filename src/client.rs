//! Persistence seam: the engine's only path to the remote store.
//!
//! The engine never talks to a network or database directly. Everything
//! durable goes through [`PersistenceClient`], and every call the engine
//! issues is bounded by the session's persistence timeout so that a hung
//! backend classifies as an ordinary persistence failure.

use crate::error::{BoardError, Result};
use crate::types::{Athlete, AthleteId, BoardScope, Position, PositionId, PositionOrder, RankUpdate};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Full reconciling read of one board's working set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub athletes: Vec<Athlete>,
    pub positions: Vec<Position>,
}

/// The remote store. Implementations are expected to apply each
/// `update_ranks` batch atomically; the engine treats every batch as
/// all-or-nothing and reconciles through `load_board` after any failure.
#[async_trait]
pub trait PersistenceClient: Send + Sync {
    /// Persist one batch of rank/position changes, in order, as a unit
    async fn update_ranks(&self, scope: BoardScope, updates: &[RankUpdate]) -> Result<()>;

    /// Create a new live position with the given name
    async fn create_position(&self, scope: BoardScope, name: &str) -> Result<Position>;

    /// Soft-end a position
    async fn end_position(&self, scope: BoardScope, id: PositionId) -> Result<()>;

    /// Persist a full display-order assignment for the live positions
    async fn reorder_positions(&self, scope: BoardScope, orders: &[PositionOrder]) -> Result<()>;

    /// Soft-end an athlete card
    async fn end_athlete(&self, id: AthleteId) -> Result<()>;

    /// Remove every athlete on the scoped board, returning the count removed
    async fn clear_board(&self, scope: BoardScope) -> Result<u64>;

    /// Load the authoritative working set for the scoped board
    async fn load_board(&self, scope: BoardScope) -> Result<BoardSnapshot>;
}

/// Run one persistence call under the session timeout, mapping elapse to
/// [`BoardError::PersistenceTimeout`].
pub(crate) async fn bounded<T, F>(limit: Duration, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(BoardError::PersistenceTimeout {
            elapsed_ms: limit.as_millis() as u64,
        }),
    }
}
