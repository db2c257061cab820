//! Event and heat sheet types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parse::parse_time;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },
}

/// A validated event identifier.
///
/// Event IDs are opaque, externally sourced strings; the only local
/// requirement is that they are non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EventId(String);

impl EventId {
    /// Creates a new ID after validation.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::Empty { field: "event ID" });
        }
        Ok(Self(id))
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EventId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EventId> for String {
    fn from(id: EventId) -> Self {
        id.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for EventId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The two event categories, each with its own inter-heat gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    Individual,
    Relay,
}

impl EventCategory {
    /// Returns true for relay events.
    #[must_use]
    pub const fn is_relay(self) -> bool {
        matches!(self, Self::Relay)
    }

    /// Capitalized form for display output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Individual => "Individual",
            Self::Relay => "Relay",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Individual => "individual",
            Self::Relay => "relay",
        };
        write!(f, "{s}")
    }
}

impl FromStr for EventCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Event records and the heat endpoint use the short forms
        match s {
            "individual" | "ind" => Ok(Self::Individual),
            "relay" | "rel" => Ok(Self::Relay),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

impl Serialize for EventCategory {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for EventCategory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown event category strings.
#[derive(Debug, Clone)]
pub struct UnknownCategory(String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown event category: {}", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

/// One event on the meet program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Opaque identifier, externally sourced.
    pub id: EventId,

    /// Display name, externally sourced.
    pub name: String,

    /// Determines which inter-heat gap applies.
    pub category: EventCategory,
}

/// Finish times grouped by heat number.
///
/// Heat numbers are positive and need not be contiguous; iteration is
/// always by ascending heat number. A heat registered with no times is
/// distinct from an absent heat: it still occupies a slot when deciding
/// whether an inter-heat gap follows it.
///
/// Invariant: every stored time is finite and non-negative. Both insertion
/// paths enforce this, so the estimator can take maxima without re-checking.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HeatSheet(BTreeMap<u32, Vec<f64>>);

impl HeatSheet {
    /// Creates an empty heat sheet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a heat number without any times.
    ///
    /// Returns false (and records nothing) for heat number zero.
    pub fn ensure_heat(&mut self, number: u32) -> bool {
        if number == 0 {
            tracing::debug!("skipping heat number 0");
            return false;
        }
        self.0.entry(number).or_default();
        true
    }

    /// Inserts an already-numeric finish time.
    ///
    /// Returns false (and records nothing) if the heat number is zero or
    /// the value is negative or non-finite.
    pub fn push_time(&mut self, number: u32, seconds: f64) -> bool {
        if number == 0 || !seconds.is_finite() || seconds < 0.0 {
            tracing::debug!(heat = number, seconds, "skipping invalid finish time");
            return false;
        }
        self.0.entry(number).or_default().push(seconds);
        true
    }

    /// Parses and inserts a raw time entry.
    ///
    /// Returns false (and records nothing) if the text does not parse or
    /// the heat number is zero. Callers count these skips so a run can
    /// report how many data points it dropped.
    pub fn push_raw(&mut self, number: u32, text: &str) -> bool {
        if number == 0 {
            tracing::debug!(text, "skipping entry with heat number 0");
            return false;
        }
        match parse_time(text) {
            Ok(seconds) => {
                self.0.entry(number).or_default().push(seconds);
                true
            }
            Err(err) => {
                tracing::debug!(heat = number, text, %err, "skipping unparseable time");
                false
            }
        }
    }

    /// Number of registered heats, including empty ones.
    #[must_use]
    pub fn heat_count(&self) -> usize {
        self.0.len()
    }

    /// True if no heats are registered at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates heats by ascending heat number.
    pub fn heats(&self) -> impl Iterator<Item = (u32, &[f64])> {
        self.0.iter().map(|(number, times)| (*number, times.as_slice()))
    }
}

/// An event paired with its heat data: the estimator's input element.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSchedule {
    pub event: Event,

    pub heats: HeatSheet,

    /// Raw entries dropped while materializing `heats` (unparseable times,
    /// malformed heat numbers). Carried so the estimate can report them.
    pub skipped_times: usize,
}

impl EventSchedule {
    /// Pairs an event with a fully-materialized heat sheet.
    #[must_use]
    pub fn new(event: Event, heats: HeatSheet, skipped_times: usize) -> Self {
        Self {
            event,
            heats,
            skipped_times,
        }
    }
}
