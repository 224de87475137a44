//! Shared test doubles for the integration tests.

#![allow(dead_code)]

use scoutboard::{
    async_trait, Athlete, AthleteId, Board, BoardError, BoardScope, BoardSnapshot,
    PersistenceClient, Position, PositionId, PositionOrder, RankUpdate, Result,
};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One recorded persistence call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    UpdateRanks(Vec<RankUpdate>),
    CreatePosition(String),
    EndPosition(PositionId),
    ReorderPositions(Vec<PositionOrder>),
    EndAthlete(AthleteId),
    ClearBoard(BoardScope),
    LoadBoard,
}

/// In-memory store double: records every call, applies successful writes to
/// its own snapshot (so reloads observe them), tracks call overlap, and can
/// be scripted to fail.
pub struct RecordingClient {
    calls: Mutex<Vec<Call>>,
    snapshot: Mutex<BoardSnapshot>,
    fail_ops: Mutex<BTreeSet<&'static str>>,
    fail_update_on: Mutex<Option<usize>>,
    update_calls: AtomicUsize,
    loads: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl RecordingClient {
    pub fn new(snapshot: BoardSnapshot) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            snapshot: Mutex::new(snapshot),
            fail_ops: Mutex::new(BTreeSet::new()),
            fail_update_on: Mutex::new(None),
            update_calls: AtomicUsize::new(0),
            loads: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        })
    }

    /// Make every call to the named operation fail
    pub fn fail_op(&self, op: &'static str) {
        self.fail_ops.lock().unwrap().insert(op);
    }

    /// Make the n-th `update_ranks` call (1-based) fail
    pub fn fail_update_on(&self, call: usize) {
        *self.fail_update_on.lock().unwrap() = Some(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Payloads of the `update_ranks` calls that succeeded, in order
    pub fn update_payloads(&self) -> Vec<Vec<RankUpdate>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::UpdateRanks(updates) => Some(updates),
                _ => None,
            })
            .collect()
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        self.snapshot.lock().unwrap().clone()
    }

    fn check(&self, op: &'static str) -> Result<()> {
        if self.fail_ops.lock().unwrap().contains(op) {
            return Err(BoardError::persistence(format!("{op} unavailable")));
        }
        Ok(())
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl PersistenceClient for RecordingClient {
    async fn update_ranks(&self, _scope: BoardScope, updates: &[RankUpdate]) -> Result<()> {
        let depth = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(depth, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(2)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let call = self.update_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if *self.fail_update_on.lock().unwrap() == Some(call) {
            return Err(BoardError::persistence("injected update failure"));
        }
        self.check("update_ranks")?;

        let mut snapshot = self.snapshot.lock().unwrap();
        for update in updates {
            if let Some(athlete) = snapshot
                .athletes
                .iter_mut()
                .find(|a| a.id == update.athlete_id)
            {
                athlete.rank = update.rank;
                if let Some(position) = &update.position {
                    athlete.position = position.clone();
                }
            }
        }
        drop(snapshot);
        self.record(Call::UpdateRanks(updates.to_vec()));
        Ok(())
    }

    async fn create_position(&self, scope: BoardScope, name: &str) -> Result<Position> {
        self.check("create_position")?;
        let position = Position::new(scope.board_id, name, 0);
        self.snapshot
            .lock()
            .unwrap()
            .positions
            .push(position.clone());
        self.record(Call::CreatePosition(name.to_string()));
        Ok(position)
    }

    async fn end_position(&self, _scope: BoardScope, id: PositionId) -> Result<()> {
        self.check("end_position")?;
        {
            let mut snapshot = self.snapshot.lock().unwrap();
            let name = snapshot
                .positions
                .iter_mut()
                .find(|p| p.id == id)
                .map(|p| {
                    p.ended_at = Some(chrono::Utc::now());
                    p.name.clone()
                });
            if let Some(name) = name {
                for athlete in snapshot.athletes.iter_mut().filter(|a| a.position == name) {
                    athlete.position = "Unassigned".to_string();
                }
            }
        }
        self.record(Call::EndPosition(id));
        Ok(())
    }

    async fn reorder_positions(&self, _scope: BoardScope, orders: &[PositionOrder]) -> Result<()> {
        self.check("reorder_positions")?;
        {
            let mut snapshot = self.snapshot.lock().unwrap();
            for order in orders {
                if let Some(position) =
                    snapshot.positions.iter_mut().find(|p| p.id == order.id)
                {
                    position.display_order = order.display_order;
                }
            }
        }
        self.record(Call::ReorderPositions(orders.to_vec()));
        Ok(())
    }

    async fn end_athlete(&self, id: AthleteId) -> Result<()> {
        self.check("end_athlete")?;
        self.snapshot.lock().unwrap().athletes.retain(|a| a.id != id);
        self.record(Call::EndAthlete(id));
        Ok(())
    }

    async fn clear_board(&self, scope: BoardScope) -> Result<u64> {
        self.check("clear_board")?;
        let removed = {
            let mut snapshot = self.snapshot.lock().unwrap();
            let before = snapshot.athletes.len();
            snapshot
                .athletes
                .retain(|a| a.board_id != scope.board_id || a.customer_id != scope.customer_id);
            (before - snapshot.athletes.len()) as u64
        };
        self.record(Call::ClearBoard(scope));
        Ok(removed)
    }

    async fn load_board(&self, _scope: BoardScope) -> Result<BoardSnapshot> {
        self.check("load_board")?;
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.record(Call::LoadBoard);
        Ok(self.snapshot.lock().unwrap().clone())
    }
}

/// A board with the given live position names, in order
pub fn board_with_positions(names: &[&str]) -> (Board, BoardSnapshot) {
    let board = Board::new(scoutboard::CustomerId::new(), "Recruiting 2027");
    let positions = names
        .iter()
        .enumerate()
        .map(|(i, name)| Position::new(board.id, *name, i as i64 + 1))
        .collect();
    (
        board,
        BoardSnapshot {
            athletes: Vec::new(),
            positions,
        },
    )
}

/// An athlete card in the given column of the board
pub fn athlete_in(board: &Board, name: &str, position: &str, rank: i64) -> Athlete {
    let mut athlete = Athlete::new(board.id, board.customer_id, name);
    athlete.position = position.to_string();
    athlete.rank = rank;
    athlete
}

/// Poll until the condition holds, with a hard upper bound
pub async fn until(cond: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !cond() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("condition not reached");
}
