use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier wrapper for exchange participants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub String);

impl ParticipantId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Identifier wrapper for exclusion rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(pub String);

impl RuleId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Someone who both gives and receives exactly one gift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub is_organizer: bool,
}

impl Participant {
    pub fn new(name: impl Into<String>, email: impl Into<String>, is_organizer: bool) -> Self {
        Self {
            id: ParticipantId::generate(),
            name: name.into(),
            email: email.into(),
            is_organizer,
        }
    }
}

/// Forbids `from_id` giving to `to_id`, and the reverse when `symmetric` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExclusionRule {
    pub id: RuleId,
    pub from_id: ParticipantId,
    pub to_id: ParticipantId,
    #[serde(default)]
    pub symmetric: bool,
}

impl ExclusionRule {
    pub fn new(from_id: ParticipantId, to_id: ParticipantId, symmetric: bool) -> Self {
        Self {
            id: RuleId::generate(),
            from_id,
            to_id,
            symmetric,
        }
    }

    /// Whether this rule forbids `giver` giving to `receiver`.
    pub fn forbids(&self, giver: &ParticipantId, receiver: &ParticipantId) -> bool {
        (self.from_id == *giver && self.to_id == *receiver)
            || (self.symmetric && self.from_id == *receiver && self.to_id == *giver)
    }

    pub fn involves(&self, participant: &ParticipantId) -> bool {
        self.from_id == *participant || self.to_id == *participant
    }
}

/// One giver to receiver pairing from a draw.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub giver_id: ParticipantId,
    pub receiver_id: ParticipantId,
}

/// Everything the store keeps for one exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRecord {
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub rules: Vec<ExclusionRule>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drawn_at: Option<DateTime<Utc>>,
}

impl ExchangeRecord {
    pub fn participant(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|participant| participant.id == *id)
    }

    pub fn organizers(&self) -> impl Iterator<Item = &Participant> {
        self.participants
            .iter()
            .filter(|participant| participant.is_organizer)
    }

    pub fn has_draw(&self) -> bool {
        !self.assignments.is_empty()
    }

    /// Drop a draw that no longer matches the roster or rules.
    pub fn invalidate_draw(&mut self) {
        self.assignments.clear();
        self.drawn_at = None;
    }

    /// Promote the first participant when nobody is left organizing.
    pub fn ensure_organizer(&mut self) {
        if !self.participants.iter().any(|p| p.is_organizer) {
            if let Some(first) = self.participants.first_mut() {
                first.is_organizer = true;
            }
        }
    }
}
