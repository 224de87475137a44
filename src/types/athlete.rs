//! Athlete card type and its filterable attribute bag.

use super::ids::{AthleteId, BoardId, CustomerId};
use crate::defaults::UNASSIGNED;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A prospective athlete's card on a recruiting board.
///
/// `position` is the name of the column the card sits in (or the
/// `"Unassigned"` sentinel) and `rank` orders cards within that column.
/// Everything else is an attribute bag consulted only by the filter engine.
/// Height and weight stay as the raw strings the source system provides and
/// are parsed at filter-evaluation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Athlete {
    pub id: AthleteId,
    pub board_id: BoardId,
    pub customer_id: CustomerId,
    pub name: String,

    /// Column name, or `"Unassigned"`
    pub position: String,
    /// Order within the column
    pub rank: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_position: Option<String>,
    /// Formatted feet/inches string, e.g. `6'3"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grad_year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub division: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub honor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Source-category tag (e.g. camp, referral, import)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub survey_completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<NaiveDate>,

    /// Named boolean flags (e.g. transfer-portal, walk-on)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub flags: BTreeMap<String, bool>,
    /// Dynamically keyed numeric stat fields, kept as raw strings
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub stats: BTreeMap<String, String>,
}

impl Athlete {
    /// Create an unassigned athlete on the given board
    pub fn new(board_id: BoardId, customer_id: CustomerId, name: impl Into<String>) -> Self {
        Self {
            id: AthleteId::new(),
            board_id,
            customer_id,
            name: name.into(),
            position: UNASSIGNED.to_string(),
            rank: 0,
            primary_position: None,
            height: None,
            weight: None,
            grad_year: None,
            division: None,
            state: None,
            school_id: None,
            conference: None,
            honor: None,
            status: None,
            source: None,
            survey_completed: None,
            added_at: None,
            updated_at: None,
            flags: BTreeMap::new(),
            stats: BTreeMap::new(),
        }
    }

    /// True when the card sits in the unassigned sentinel column
    pub fn is_unassigned(&self) -> bool {
        crate::defaults::is_unassigned(&self.position)
    }
}
