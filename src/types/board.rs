//! Board metadata and scoping.

use super::ids::{BoardId, CustomerId};
use serde::{Deserialize, Serialize};

/// A recruiting board - metadata only. Athletes and positions are scoped to
/// the board and loaded when a session opens it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub name: String,
    pub customer_id: CustomerId,
}

impl Board {
    /// Create a new board for the given customer
    pub fn new(customer_id: CustomerId, name: impl Into<String>) -> Self {
        Self {
            id: BoardId::new(),
            name: name.into(),
            customer_id,
        }
    }

    /// The scoping pair every persistence call carries
    pub fn scope(&self) -> BoardScope {
        BoardScope {
            board_id: self.id,
            customer_id: self.customer_id,
        }
    }
}

/// Board + customer scope. Bulk operations are bounded by both, never
/// cross-board or cross-customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardScope {
    pub board_id: BoardId,
    pub customer_id: CustomerId,
}
