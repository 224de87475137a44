//! Position (column) lifecycle: create, soft-end, reorder.

use crate::client::{bounded, PersistenceClient};
use crate::defaults::{is_unassigned, UNASSIGNED};
use crate::error::{BoardError, Result};
use crate::session::data::SharedBoardData;
use crate::types::{sort_positions, BoardScope, Position, PositionId, PositionOrder};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Owns the ordered column set for one open board.
///
/// Name validation happens synchronously before anything touches the store.
/// `create` persists before inserting locally, so a failed create leaves no
/// local-only position behind; `end` and `reorder` apply optimistically and
/// leave reconciliation to the session's reload-on-failure path.
pub struct PositionRegistry {
    data: SharedBoardData,
    client: Arc<dyn PersistenceClient>,
    scope: BoardScope,
    timeout: Duration,
}

impl PositionRegistry {
    pub(crate) fn new(
        data: SharedBoardData,
        client: Arc<dyn PersistenceClient>,
        scope: BoardScope,
        timeout: Duration,
    ) -> Self {
        Self {
            data,
            client,
            scope,
            timeout,
        }
    }

    /// Create a new live position at the end of the column order.
    ///
    /// Rejects empty names and names already used by a live position
    /// (including the reserved `"Unassigned"` sentinel).
    pub async fn create(&self, name: &str) -> Result<Position> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BoardError::EmptyPositionName);
        }
        if name == UNASSIGNED {
            return Err(BoardError::duplicate_position(name));
        }
        let next_order = {
            let data = self.data.lock().expect("board data poisoned");
            if data
                .positions
                .iter()
                .any(|p| p.is_live() && p.name == name)
            {
                return Err(BoardError::duplicate_position(name));
            }
            data.positions
                .iter()
                .filter(|p| p.is_live() && !is_unassigned(&p.name))
                .map(|p| p.display_order)
                .max()
                .unwrap_or(0)
                + 1
        };

        // persist first - a failed create must retain nothing locally
        let mut position =
            bounded(self.timeout, self.client.create_position(self.scope, name)).await?;
        // new columns always land at the end of the live ordering
        position.display_order = next_order;
        info!(position = %position.id, name, display_order = next_order, "created position");
        self.data
            .lock()
            .expect("board data poisoned")
            .positions
            .push(position.clone());
        Ok(position)
    }

    /// Soft-end a position, moving its athletes to `"Unassigned"`.
    ///
    /// Optimistic: local state changes before the persistence call. On a
    /// persistence error the caller reloads to recover ground truth.
    pub async fn end(&self, id: PositionId) -> Result<()> {
        let name = {
            let mut data = self.data.lock().expect("board data poisoned");
            let position = data
                .positions
                .iter_mut()
                .find(|p| p.id == id && p.is_live())
                .ok_or_else(|| BoardError::PositionNotFound { id: id.to_string() })?;
            position.ended_at = Some(Utc::now());
            let name = position.name.clone();

            for athlete in data.athletes.iter_mut().filter(|a| a.position == name) {
                athlete.position = UNASSIGNED.to_string();
            }
            name
        };

        debug!(position = %id, name, "ended position locally, persisting");
        bounded(self.timeout, self.client.end_position(self.scope, id)).await?;
        info!(position = %id, "ended position");
        Ok(())
    }

    /// Assign display order 1..=N following the given id order.
    ///
    /// The `"Unassigned"` sentinel is never part of the persisted ordering;
    /// it sorts last no matter what. Optimistic, like `end`.
    pub async fn reorder(&self, ordered_ids: &[PositionId]) -> Result<()> {
        let orders = {
            let mut data = self.data.lock().expect("board data poisoned");
            for id in ordered_ids {
                if !data.positions.iter().any(|p| p.id == *id && p.is_live()) {
                    return Err(BoardError::PositionNotFound { id: id.to_string() });
                }
            }

            let mut orders = Vec::with_capacity(ordered_ids.len());
            for (index, id) in ordered_ids.iter().enumerate() {
                let display_order = index as i64 + 1;
                if let Some(position) = data.positions.iter_mut().find(|p| p.id == *id) {
                    position.display_order = display_order;
                    if !is_unassigned(&position.name) {
                        orders.push(PositionOrder {
                            id: *id,
                            display_order,
                        });
                    }
                }
            }
            orders
        };

        debug!(count = orders.len(), "reordered positions locally, persisting");
        bounded(
            self.timeout,
            self.client.reorder_positions(self.scope, &orders),
        )
        .await?;
        Ok(())
    }

    /// The live columns in display order, `"Unassigned"` last
    pub fn live_positions(&self) -> Vec<Position> {
        let data = self.data.lock().expect("board data poisoned");
        let mut live: Vec<Position> = data
            .positions
            .iter()
            .filter(|p| p.is_live())
            .cloned()
            .collect();
        sort_positions(&mut live);
        live
    }
}
