//! Board session: the in-memory board state machine for one open board.
//!
//! A session owns the working set loaded from the store, applies every
//! gesture optimistically, and funnels rank writes through its own
//! [`RankUpdateQueue`]. Sessions are constructed per board-open and torn
//! down per board-close; nothing here is process-wide, so several boards
//! (or tabs) can be open at once without sharing queues.
//!
//! Failure policy is uniform: local-first optimism, full reload from the
//! store on any persistence failure, never partial local patching.

pub(crate) mod data;

use crate::client::{bounded, PersistenceClient};
use crate::defaults::{is_unassigned, DEFAULT_PERSISTENCE_TIMEOUT};
use crate::error::{BoardError, Result};
use crate::filter::FilterSpec;
use crate::guard::{NoopNotifier, Notifier};
use crate::queue::RankUpdateQueue;
use crate::registry::PositionRegistry;
use crate::types::{Athlete, AthleteId, Board, BoardScope, PendingBatch, Position, PositionId, RankUpdate};
use data::{BoardData, SharedBoardData};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Per-session configuration, supplied by the host at board-open
#[derive(Clone)]
pub struct SessionConfig {
    /// Upper bound on any single persistence call
    pub persistence_timeout: Duration,
    /// Sink for the saving indicator and failure notifications
    pub notifier: Arc<dyn Notifier>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            persistence_timeout: DEFAULT_PERSISTENCE_TIMEOUT,
            notifier: Arc::new(NoopNotifier),
        }
    }
}

/// One open recruiting board.
pub struct BoardSession {
    board: Board,
    scope: BoardScope,
    client: Arc<dyn PersistenceClient>,
    data: SharedBoardData,
    registry: PositionRegistry,
    queue: RankUpdateQueue,
    filter: FilterSpec,
    source_toggles: Option<BTreeSet<String>>,
    timeout: Duration,
    notifier: Arc<dyn Notifier>,
}

impl BoardSession {
    /// Open a board: perform the initial load and build the session around
    /// the returned working set.
    pub async fn open(
        client: Arc<dyn PersistenceClient>,
        board: Board,
        config: SessionConfig,
    ) -> Result<Self> {
        let scope = board.scope();
        let snapshot = bounded(config.persistence_timeout, client.load_board(scope)).await?;
        let data = BoardData::shared(snapshot);

        let queue = RankUpdateQueue::new(
            client.clone(),
            scope,
            data.clone(),
            config.persistence_timeout,
            config.notifier.clone(),
        );
        let registry = PositionRegistry::new(
            data.clone(),
            client.clone(),
            scope,
            config.persistence_timeout,
        );

        info!(board = %board.id, name = %board.name, "opened board session");
        Ok(Self {
            board,
            scope,
            client,
            data,
            registry,
            queue,
            filter: FilterSpec::new(),
            source_toggles: None,
            timeout: config.persistence_timeout,
            notifier: config.notifier,
        })
    }

    // ------------------------------------------------------------------
    // Gestures
    // ------------------------------------------------------------------

    /// Apply one drag gesture: the moved athlete plus every displaced
    /// sibling, locally and immediately, then enqueue the whole gesture as
    /// a single batch. Atomic from the caller's perspective: either the
    /// batch persists or the reload path restores the pre-gesture
    /// arrangement for all affected athletes.
    pub fn move_athlete(
        &self,
        athlete_id: AthleteId,
        new_position: &str,
        new_rank: i64,
        sibling_reranks: Vec<RankUpdate>,
    ) -> Result<()> {
        {
            let mut data = self.data.lock().expect("board data poisoned");

            if !is_unassigned(new_position)
                && !data
                    .positions
                    .iter()
                    .any(|p| p.is_live() && p.name == new_position)
            {
                return Err(BoardError::unknown_column(new_position));
            }
            if !data.athletes.iter().any(|a| a.id == athlete_id) {
                return Err(BoardError::AthleteNotFound {
                    id: athlete_id.to_string(),
                });
            }

            for athlete in data.athletes.iter_mut() {
                if athlete.id == athlete_id {
                    athlete.position = new_position.to_string();
                    athlete.rank = new_rank;
                } else if let Some(update) =
                    sibling_reranks.iter().find(|u| u.athlete_id == athlete.id)
                {
                    athlete.rank = update.rank;
                    if let Some(position) = &update.position {
                        athlete.position = position.clone();
                    }
                }
            }
        }

        let mut updates = Vec::with_capacity(1 + sibling_reranks.len());
        updates.push(RankUpdate::moved(athlete_id, new_rank, new_position));
        updates.extend(sibling_reranks);

        debug!(athlete = %athlete_id, position = new_position, rank = new_rank, "move applied, batch enqueued");
        self.queue.enqueue(PendingBatch::new(updates));
        Ok(())
    }

    /// Remove an athlete: local removal first, then the persistence call.
    /// On failure the session reloads rather than un-removing in place.
    pub async fn remove_athlete(&self, athlete_id: AthleteId) -> Result<()> {
        {
            let mut data = self.data.lock().expect("board data poisoned");
            let before = data.athletes.len();
            data.athletes.retain(|a| a.id != athlete_id);
            if data.athletes.len() == before {
                return Err(BoardError::AthleteNotFound {
                    id: athlete_id.to_string(),
                });
            }
        }

        match bounded(self.timeout, self.client.end_athlete(athlete_id)).await {
            Ok(()) => {
                info!(athlete = %athlete_id, "removed athlete");
                Ok(())
            }
            Err(err) => {
                self.recover("remove athlete", &err).await;
                Err(err)
            }
        }
    }

    /// Remove every athlete belonging to the current board and customer,
    /// then issue one bulk call scoped the same way. Stale entries from
    /// other boards or customers are never touched or counted.
    pub async fn clear_board(&self) -> Result<u64> {
        {
            let mut data = self.data.lock().expect("board data poisoned");
            data.athletes.retain(|a| {
                a.board_id != self.scope.board_id || a.customer_id != self.scope.customer_id
            });
        }

        match bounded(self.timeout, self.client.clear_board(self.scope)).await {
            Ok(removed) => {
                info!(board = %self.scope.board_id, removed, "cleared board");
                Ok(removed)
            }
            Err(err) => {
                self.recover("clear board", &err).await;
                Err(err)
            }
        }
    }

    // ------------------------------------------------------------------
    // Positions
    // ------------------------------------------------------------------

    /// Create a new column. Validation and persistence failures leave local
    /// state untouched, so no reload is needed here.
    pub async fn create_position(&self, name: &str) -> Result<Position> {
        self.registry.create(name).await
    }

    /// Soft-end a column, reassigning its athletes to `"Unassigned"`
    pub async fn end_position(&self, id: PositionId) -> Result<()> {
        match self.registry.end(id).await {
            Err(err) if err.is_persistence() => {
                self.recover("end position", &err).await;
                Err(err)
            }
            other => other,
        }
    }

    /// Reassign column display order following the given id order
    pub async fn reorder_positions(&self, ordered_ids: &[PositionId]) -> Result<()> {
        match self.registry.reorder(ordered_ids).await {
            Err(err) if err.is_persistence() => {
                self.recover("reorder positions", &err).await;
                Err(err)
            }
            other => other,
        }
    }

    /// The live columns in display order, `"Unassigned"` last
    pub fn positions(&self) -> Vec<Position> {
        self.registry.live_positions()
    }

    // ------------------------------------------------------------------
    // Filtering and views
    // ------------------------------------------------------------------

    /// Replace the applied filter
    pub fn set_filter(&mut self, filter: FilterSpec) {
        self.filter = filter;
    }

    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    /// Restrict visibility to athletes whose source tag is in the set;
    /// `None` removes the restriction.
    pub fn set_source_toggles(&mut self, toggles: Option<BTreeSet<String>>) {
        self.source_toggles = toggles;
    }

    /// The athletes that pass the filter and the source toggles, in
    /// collection order.
    pub fn visible_athletes(&self) -> Vec<Athlete> {
        let data = self.data.lock().expect("board data poisoned");
        data.athletes
            .iter()
            .filter(|a| self.filter.matches(a) && self.source_allows(a))
            .cloned()
            .collect()
    }

    /// Every athlete in the working set, unfiltered
    pub fn athletes(&self) -> Vec<Athlete> {
        self.data
            .lock()
            .expect("board data poisoned")
            .athletes
            .clone()
    }

    fn source_allows(&self, athlete: &Athlete) -> bool {
        match &self.source_toggles {
            None => true,
            Some(set) => athlete
                .source
                .as_deref()
                .is_some_and(|source| set.contains(source)),
        }
    }

    // ------------------------------------------------------------------
    // Reconciliation and status
    // ------------------------------------------------------------------

    /// Replace the working set with the store's authoritative snapshot
    pub async fn reload(&self) -> Result<()> {
        let snapshot = bounded(self.timeout, self.client.load_board(self.scope)).await?;
        self.data
            .lock()
            .expect("board data poisoned")
            .replace(snapshot);
        debug!(board = %self.scope.board_id, "reloaded board from store");
        Ok(())
    }

    async fn recover(&self, operation: &str, err: &BoardError) {
        warn!(%err, operation, "persistence failure; reloading board");
        self.notifier.persistence_failed(&err.to_string());
        if let Err(reload_err) = self.reload().await {
            warn!(%reload_err, "reconciling reload failed; state is stale until the next operation");
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn scope(&self) -> BoardScope {
        self.scope
    }

    /// True while rank writes are queued or in flight
    pub fn pending_writes(&self) -> bool {
        self.queue.pending()
    }

    /// The pending-work signal, for the navigation guard
    pub fn subscribe_pending(&self) -> watch::Receiver<bool> {
        self.queue.subscribe()
    }

    /// Wait for the rank queue to go idle
    pub async fn wait_idle(&self) {
        self.queue.wait_idle().await
    }

    /// The session's rank queue
    pub fn queue(&self) -> &RankUpdateQueue {
        &self.queue
    }
}
