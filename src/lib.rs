//! Recruiting-board synchronization engine
//!
//! This crate is the state-machine core of a recruiting-board dashboard:
//! coaches organize athlete cards into named, ordered columns ("positions"),
//! drag cards between them, and filter the visible set by dozens of athlete
//! attributes. Rendering, auth, and the backend store are collaborators
//! behind traits; the engine owns the invariants.
//!
//! ## Overview
//!
//! - **Optimistic state** - every gesture mutates the in-memory board
//!   immediately; durability happens behind it.
//! - **Ordered writes** - each gesture becomes one batch on a FIFO queue
//!   that drains sequentially into the [`PersistenceClient`], with at most
//!   one batch in flight and no reordering or merging.
//! - **Reload on failure** - a failed write discards the remaining queue
//!   and replaces local state with the store's authoritative snapshot.
//!   No partial rollback, no silent divergence.
//! - **Guarded navigation** - while writes are pending, page-leave actions
//!   are intercepted and must be confirmed.
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use scoutboard::{BoardSession, FilterSpec, Predicate, SessionConfig, SetFilter};
//!
//! # async fn example(
//! #     client: std::sync::Arc<dyn scoutboard::PersistenceClient>,
//! #     board: scoutboard::Board,
//! # ) -> scoutboard::Result<()> {
//! // Open a board (performs the initial load)
//! let mut session = BoardSession::open(client, board, SessionConfig::default()).await?;
//!
//! // Show only quarterbacks from Texas
//! session.set_filter(
//!     FilterSpec::new()
//!         .with(Predicate::Position(SetFilter::of(["QB"])))
//!         .with(Predicate::State(SetFilter::of(["TX"]))),
//! );
//! for athlete in session.visible_athletes() {
//!     println!("{} ({})", athlete.name, athlete.position);
//! }
//!
//! // Drag a card: applied locally at once, persisted through the queue
//! let top = session.visible_athletes()[0].id;
//! session.move_athlete(top, "QB", 1, Vec::new())?;
//! session.wait_idle().await;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod defaults;
mod error;
pub mod filter;
pub mod guard;
pub mod queue;
pub mod registry;
mod session;
pub mod types;

// Re-export the async_trait attribute for PersistenceClient implementors
pub use async_trait::async_trait;

pub use client::{BoardSnapshot, PersistenceClient};
pub use error::{BoardError, Result};
pub use filter::{
    DateRange, FilterSpec, HeightRange, HeightSpec, NumericRange, Predicate, SetFilter, TriState,
};
pub use guard::{
    LeavePrompt, NavigationDecision, NavigationGuard, NavigationHost, NavigationKind,
    NoopNotifier, Notifier,
};
pub use queue::RankUpdateQueue;
pub use registry::PositionRegistry;
pub use session::{BoardSession, SessionConfig};

// Re-export commonly used types
pub use types::{
    sort_positions, Athlete, AthleteId, Board, BoardId, BoardScope, CustomerId, PendingBatch,
    Position, PositionId, PositionOrder, RankUpdate,
};
