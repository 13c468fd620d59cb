use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::domain::{ExchangeRecord, Participant, ParticipantId};

/// Sender identity and link base used when composing messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSettings {
    pub sender: String,
    pub results_url: String,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            sender: "Secret Santa <noreply@localhost>".to_string(),
            results_url: "http://127.0.0.1:3000/results".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Assignment,
    OrganizerSummary,
}

/// A single plain-text message ready for a delivery adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub kind: MessageKind,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Everything one notification run sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationBatch {
    pub participants: Vec<OutboundMessage>,
    pub organizers: Vec<OutboundMessage>,
    pub results_link: String,
}

/// Trait describing outbound delivery hooks (e.g., e-mail or chat adapters).
pub trait Notifier: Send + Sync {
    fn send_batch(&self, messages: &[OutboundMessage]) -> Result<(), NotifyError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("assignment references unknown participant {0}")]
    UnknownParticipant(ParticipantId),
    #[error("notification transport unavailable: {0}")]
    Transport(String),
    #[error("invalid results digest: {0}")]
    Digest(String),
}

/// Compact giver/receiver listing shared with organizers through the results link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsDigest {
    pub assignments: Vec<DigestPair>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestPair {
    pub giver: String,
    pub receiver: String,
}

impl ResultsDigest {
    pub fn from_record(record: &ExchangeRecord) -> Self {
        let assignments = record
            .assignments
            .iter()
            .map(|assignment| DigestPair {
                giver: display_name(record, &assignment.giver_id),
                receiver: display_name(record, &assignment.receiver_id),
            })
            .collect();

        Self {
            assignments,
            event_name: record.event_name.clone(),
        }
    }

    pub fn encode(&self) -> Result<String, NotifyError> {
        let json =
            serde_json::to_vec(self).map_err(|err| NotifyError::Digest(err.to_string()))?;
        Ok(STANDARD.encode(json))
    }

    pub fn decode(raw: &str) -> Result<Self, NotifyError> {
        let bytes = STANDARD
            .decode(raw.trim())
            .map_err(|err| NotifyError::Digest(err.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|err| NotifyError::Digest(err.to_string()))
    }
}

fn display_name(record: &ExchangeRecord, id: &ParticipantId) -> String {
    record
        .participant(id)
        .map(|participant| compact_name(&participant.name))
        .unwrap_or_else(|| "Unknown".to_string())
}

/// First name plus last initial, e.g. "Ada L".
pub fn compact_name(name: &str) -> String {
    let parts: Vec<&str> = name.split_whitespace().collect();
    match parts.as_slice() {
        [] => String::new(),
        [single] => (*single).to_string(),
        [first, .., last] => {
            let initial: String = last.chars().take(1).collect();
            format!("{first} {initial}")
        }
    }
}

/// Build giver messages and organizer summaries for the current draw.
pub fn compose(
    record: &ExchangeRecord,
    settings: &NotificationSettings,
) -> Result<NotificationBatch, NotifyError> {
    let roster: HashMap<&ParticipantId, &Participant> = record
        .participants
        .iter()
        .map(|participant| (&participant.id, participant))
        .collect();
    let lookup = |id: &ParticipantId| {
        roster
            .get(id)
            .copied()
            .ok_or_else(|| NotifyError::UnknownParticipant(id.clone()))
    };
    let event_label = record.event_name.as_deref().unwrap_or("Secret Santa");

    let mut participants = Vec::with_capacity(record.assignments.len());
    for assignment in &record.assignments {
        let giver = lookup(&assignment.giver_id)?;
        let receiver = lookup(&assignment.receiver_id)?;

        participants.push(OutboundMessage {
            kind: MessageKind::Assignment,
            from: settings.sender.clone(),
            to: giver.email.clone(),
            subject: format!("Hey {}! You've been assigned for {event_label}...", giver.name),
            body: format!(
                "Hi {},\n\nYou are the Secret Santa for {} in {event_label}.\n\nKeep it a secret!\n",
                giver.name, receiver.name
            ),
        });
    }

    let digest = ResultsDigest::from_record(record).encode()?;
    let results_link = format!("{}?data={digest}", settings.results_url);

    let organizers = record
        .organizers()
        .map(|organizer| OutboundMessage {
            kind: MessageKind::OrganizerSummary,
            from: settings.sender.clone(),
            to: organizer.email.clone(),
            subject: format!("Admin: {event_label} Results"),
            body: format!(
                "Hi {},\n\nAssignments for {event_label} were sent to {} participants.\nFull results: {results_link}\n",
                organizer.name,
                participants.len()
            ),
        })
        .collect();

    Ok(NotificationBatch {
        participants,
        organizers,
        results_link,
    })
}
