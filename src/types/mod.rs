//! Core types for the board engine

mod athlete;
mod batch;
mod board;
mod ids;
mod position;

// Re-export all types
pub use athlete::Athlete;
pub use batch::{PendingBatch, RankUpdate};
pub use board::{Board, BoardScope};
pub use ids::{AthleteId, BoardId, CustomerId, PositionId};
pub use position::{sort_positions, Position, PositionOrder};
