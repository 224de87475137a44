//! Declarative athlete filters.
//!
//! A [`FilterSpec`] is a list of [`Predicate`]s; an athlete is visible when
//! every predicate passes (AND across predicate kinds, OR within a single
//! kind's value set). The empty spec matches everything: a predicate kind
//! that is absent imposes no constraint, never an implicit match-nothing.
//!
//! Evaluation is pure and total. Malformed athlete values (a weight of
//! `"heavy"`, a height of `"tall"`) fail the predicate that inspects them;
//! they never error or panic.

mod parse;

use crate::types::Athlete;
use chrono::NaiveDate;
use parse::{parse_height_inches, parse_number};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Membership test over a set of discrete values.
///
/// An athlete with no value for the attribute fails the test unless
/// `include_missing` is set - the "null" entry a coach can tick to keep
/// unlabeled athletes visible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetFilter {
    pub values: BTreeSet<String>,
    #[serde(default)]
    pub include_missing: bool,
}

impl SetFilter {
    /// Build a filter from the given values
    pub fn of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
            include_missing: false,
        }
    }

    /// Also match athletes that have no value for the attribute
    pub fn with_missing(mut self) -> Self {
        self.include_missing = true;
        self
    }

    fn matches(&self, value: Option<&str>) -> bool {
        match value {
            Some(v) => self.values.contains(v),
            None => self.include_missing,
        }
    }
}

/// Inclusive comparison over a parsed numeric value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "comparison", rename_all = "kebab-case")]
pub enum NumericRange {
    AtLeast { min: f64 },
    AtMost { max: f64 },
    Between { min: f64, max: f64 },
}

impl NumericRange {
    fn contains(&self, value: f64) -> bool {
        match *self {
            Self::AtLeast { min } => min.is_finite() && value >= min,
            Self::AtMost { max } => max.is_finite() && value <= max,
            Self::Between { min, max } => {
                min.is_finite() && max.is_finite() && value >= min && value <= max
            }
        }
    }
}

/// A height bound expressed the way coaches enter it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightSpec {
    pub feet: u32,
    pub inches: u32,
}

impl HeightSpec {
    pub fn new(feet: u32, inches: u32) -> Self {
        Self { feet, inches }
    }

    fn total_inches(self) -> i64 {
        i64::from(self.feet) * 12 + i64::from(self.inches)
    }
}

/// Inclusive comparison over a parsed height, in total inches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "comparison", rename_all = "kebab-case")]
pub enum HeightRange {
    AtLeast { min: HeightSpec },
    AtMost { max: HeightSpec },
    Between { min: HeightSpec, max: HeightSpec },
}

impl HeightRange {
    fn contains(&self, total_inches: i64) -> bool {
        match *self {
            Self::AtLeast { min } => total_inches >= min.total_inches(),
            Self::AtMost { max } => total_inches <= max.total_inches(),
            Self::Between { min, max } => {
                total_inches >= min.total_inches() && total_inches <= max.total_inches()
            }
        }
    }
}

/// Inclusive date window. Either bound may be open; an athlete with no
/// value for the date fails closed while the window is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<NaiveDate>,
}

impl DateRange {
    fn contains(&self, date: NaiveDate) -> bool {
        if let Some(after) = self.after {
            if date < after {
                return false;
            }
        }
        if let Some(before) = self.before {
            if date > before {
                return false;
            }
        }
        true
    }
}

/// Boolean constraint: true only, false only, or either.
///
/// `Either` is a no-op regardless of the order toggles were clicked in.
/// A missing athlete value counts as false, so "false only" keeps athletes
/// that never answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriState {
    True,
    False,
    Either,
}

impl TriState {
    fn matches(self, value: Option<bool>) -> bool {
        match self {
            Self::Either => true,
            Self::True => value == Some(true),
            Self::False => !value.unwrap_or(false),
        }
    }
}

/// One predicate kind with its parameters.
///
/// Dynamically keyed stat fields get an explicit variant carrying the field
/// key instead of key-prefix sniffing, so every kind is enumerable here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Predicate {
    /// Board-column membership
    Position(SetFilter),
    PrimaryPosition(SetFilter),
    GradYear(SetFilter),
    Division(SetFilter),
    State(SetFilter),
    School(SetFilter),
    Conference(SetFilter),
    Honor(SetFilter),
    Status(SetFilter),
    Source(SetFilter),
    Weight { range: NumericRange },
    /// Dynamically keyed numeric stat field
    Stat { field: String, range: NumericRange },
    Height { range: HeightRange },
    AddedBetween { range: DateRange },
    UpdatedBetween { range: DateRange },
    SurveyCompleted { state: TriState },
    /// Named boolean flag on the athlete
    Flag { key: String, state: TriState },
}

impl Predicate {
    /// Evaluate this predicate against one athlete
    pub fn matches(&self, athlete: &Athlete) -> bool {
        match self {
            Self::Position(f) => f.matches(Some(athlete.position.as_str())),
            Self::PrimaryPosition(f) => f.matches(athlete.primary_position.as_deref()),
            Self::GradYear(f) => f.matches(athlete.grad_year.as_deref()),
            Self::Division(f) => f.matches(athlete.division.as_deref()),
            Self::State(f) => f.matches(athlete.state.as_deref()),
            Self::School(f) => f.matches(athlete.school_id.as_deref()),
            Self::Conference(f) => f.matches(athlete.conference.as_deref()),
            Self::Honor(f) => f.matches(athlete.honor.as_deref()),
            Self::Status(f) => f.matches(athlete.status.as_deref()),
            Self::Source(f) => f.matches(athlete.source.as_deref()),
            Self::Weight { range } => numeric_matches(athlete.weight.as_deref(), range),
            Self::Stat { field, range } => {
                numeric_matches(athlete.stats.get(field).map(String::as_str), range)
            }
            Self::Height { range } => athlete
                .height
                .as_deref()
                .and_then(parse_height_inches)
                .is_some_and(|total| range.contains(total)),
            Self::AddedBetween { range } => {
                athlete.added_at.is_some_and(|date| range.contains(date))
            }
            Self::UpdatedBetween { range } => {
                athlete.updated_at.is_some_and(|date| range.contains(date))
            }
            Self::SurveyCompleted { state } => state.matches(athlete.survey_completed),
            Self::Flag { key, state } => state.matches(athlete.flags.get(key).copied()),
        }
    }
}

fn numeric_matches(raw: Option<&str>, range: &NumericRange) -> bool {
    raw.and_then(parse_number)
        .is_some_and(|value| range.contains(value))
}

/// The full set of predicates currently applied to a board.
///
/// Each present predicate constrains; absent kinds are vacuously true.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub predicates: Vec<Predicate>,
}

impl FilterSpec {
    /// The empty spec - matches every athlete
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predicate (builder style)
    pub fn with(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// True when the athlete passes every configured predicate
    pub fn matches(&self, athlete: &Athlete) -> bool {
        self.predicates.iter().all(|p| p.matches(athlete))
    }
}
