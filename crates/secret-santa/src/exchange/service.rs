use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::domain::{Assignment, ExchangeRecord, ExclusionRule, Participant, ParticipantId, RuleId};
use super::engine::{AssignmentEngine, DrawFailure};
use super::notify::{compose, NotificationSettings, Notifier, NotifyError};
use super::repository::{ExchangeStore, StoreError};
use crate::import::is_valid_email;

/// Payload for adding one participant by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewParticipant {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub is_organizer: bool,
}

/// Payload for adding one exclusion rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRule {
    pub from_id: ParticipantId,
    pub to_id: ParticipantId,
    #[serde(default = "default_symmetric")]
    pub symmetric: bool,
}

fn default_symmetric() -> bool {
    true
}

/// Outcome counts of one notification run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationReport {
    pub participant_count: usize,
    pub organizer_count: usize,
    pub organizer_delivery_failed: bool,
}

/// Organizer workflow over a store: roster and rule editing, draw, notify.
///
/// Every change runs load, edit and save under one write lock.
pub struct SecretSantaService<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
    engine: AssignmentEngine,
    notifications: NotificationSettings,
    writes: Mutex<()>,
}

impl<S, N> SecretSantaService<S, N>
where
    S: ExchangeStore + 'static,
    N: Notifier + 'static,
{
    pub fn new(
        store: Arc<S>,
        notifier: Arc<N>,
        engine: AssignmentEngine,
        notifications: NotificationSettings,
    ) -> Self {
        Self {
            store,
            notifier,
            engine,
            notifications,
            writes: Mutex::new(()),
        }
    }

    pub fn snapshot(&self) -> Result<ExchangeRecord, ExchangeServiceError> {
        Ok(self.store.load()?)
    }

    fn write_lock(&self) -> Result<MutexGuard<'_, ()>, ExchangeServiceError> {
        self.writes.lock().map_err(|_| {
            ExchangeServiceError::Store(StoreError::Unavailable(
                "exchange write lock poisoned".to_string(),
            ))
        })
    }

    /// Apply `edit` to the stored record and persist it; nothing is saved when
    /// `edit` fails.
    fn update<T, F>(&self, edit: F) -> Result<T, ExchangeServiceError>
    where
        F: FnOnce(&mut ExchangeRecord) -> Result<T, ExchangeServiceError>,
    {
        let _guard = self.write_lock()?;
        let mut record = self.store.load()?;
        let value = edit(&mut record)?;
        self.store.save(&record)?;
        Ok(value)
    }

    /// Add a participant; the first one in an exchange becomes organizer.
    pub fn add_participant(
        &self,
        new: NewParticipant,
    ) -> Result<Participant, ExchangeServiceError> {
        let name = new.name.trim();
        let email = new.email.trim();
        if name.is_empty() {
            return Err(ExchangeServiceError::InvalidParticipant(
                "name is required".to_string(),
            ));
        }
        if !is_valid_email(email) {
            return Err(ExchangeServiceError::InvalidParticipant(format!(
                "'{email}' is not a valid e-mail address"
            )));
        }

        let participant = Participant::new(name, email, new.is_organizer);
        let id = participant.id.clone();
        self.update(|record| {
            record.participants.push(participant);
            record.ensure_organizer();
            record.invalidate_draw();
            record
                .participant(&id)
                .cloned()
                .ok_or_else(|| ExchangeServiceError::ParticipantNotFound(id.clone()))
        })
    }

    /// Append imported participants to the roster.
    pub fn import_participants(
        &self,
        participants: Vec<Participant>,
    ) -> Result<Vec<Participant>, ExchangeServiceError> {
        let total = self.update(|record| {
            record.participants.extend(participants.iter().cloned());
            record.ensure_organizer();
            record.invalidate_draw();
            Ok(record.participants.len())
        })?;

        info!(imported = participants.len(), total, "participants imported");
        Ok(participants)
    }

    /// Remove a participant along with every rule that mentions them.
    pub fn remove_participant(&self, id: &ParticipantId) -> Result<(), ExchangeServiceError> {
        self.update(|record| {
            let before = record.participants.len();
            record.participants.retain(|participant| participant.id != *id);
            if record.participants.len() == before {
                return Err(ExchangeServiceError::ParticipantNotFound(id.clone()));
            }

            record.rules.retain(|rule| !rule.involves(id));
            record.ensure_organizer();
            record.invalidate_draw();
            Ok(())
        })
    }

    /// Flip the organizer flag, keeping at least one organizer in the exchange.
    pub fn toggle_organizer(
        &self,
        id: &ParticipantId,
    ) -> Result<Participant, ExchangeServiceError> {
        self.update(|record| {
            let participant = record
                .participants
                .iter_mut()
                .find(|participant| participant.id == *id)
                .ok_or_else(|| ExchangeServiceError::ParticipantNotFound(id.clone()))?;
            participant.is_organizer = !participant.is_organizer;
            record.ensure_organizer();

            record
                .participant(id)
                .cloned()
                .ok_or_else(|| ExchangeServiceError::ParticipantNotFound(id.clone()))
        })
    }

    pub fn add_rule(&self, new: NewRule) -> Result<ExclusionRule, ExchangeServiceError> {
        if new.from_id == new.to_id {
            return Err(ExchangeServiceError::InvalidRule(
                "a participant cannot be excluded from themselves".to_string(),
            ));
        }

        self.update(|record| {
            for id in [&new.from_id, &new.to_id] {
                if record.participant(id).is_none() {
                    return Err(ExchangeServiceError::InvalidRule(format!(
                        "participant {id} is not part of this exchange"
                    )));
                }
            }

            let rule = ExclusionRule::new(new.from_id.clone(), new.to_id.clone(), new.symmetric);
            record.rules.push(rule.clone());
            record.invalidate_draw();
            Ok(rule)
        })
    }

    pub fn remove_rule(&self, id: &RuleId) -> Result<(), ExchangeServiceError> {
        self.update(|record| {
            let before = record.rules.len();
            record.rules.retain(|rule| rule.id != *id);
            if record.rules.len() == before {
                return Err(ExchangeServiceError::RuleNotFound(id.clone()));
            }

            record.invalidate_draw();
            Ok(())
        })
    }

    /// Set the event name; blank clears it.
    pub fn set_event_name(
        &self,
        name: Option<String>,
    ) -> Result<Option<String>, ExchangeServiceError> {
        self.update(|record| {
            record.event_name = name
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty());
            Ok(record.event_name.clone())
        })
    }

    /// Run the engine and persist the assignments only when it succeeds.
    pub fn draw<R>(&self, rng: &mut R) -> Result<Vec<Assignment>, ExchangeServiceError>
    where
        R: Rng + ?Sized,
    {
        self.update(|record| {
            match self.engine.draw(&record.participants, &record.rules, rng) {
                Ok(assignments) => {
                    record.assignments = assignments.clone();
                    record.drawn_at = Some(Utc::now());
                    info!(participants = assignments.len(), "assignments drawn");
                    Ok(assignments)
                }
                Err(failure) => {
                    warn!(reason = %failure, details = %failure.details(), "draw failed");
                    Err(failure.into())
                }
            }
        })
    }

    pub fn clear_assignments(&self) -> Result<(), ExchangeServiceError> {
        self.update(|record| {
            record.invalidate_draw();
            Ok(())
        })
    }

    /// Forget participants, rules, draw, and event name.
    pub fn reset(&self) -> Result<(), ExchangeServiceError> {
        let _guard = self.write_lock()?;
        self.store.clear()?;
        Ok(())
    }

    /// Send every giver their receiver, then send organizers the summary.
    ///
    /// A failed organizer batch is logged and reported; the giver messages have
    /// already gone out at that point.
    pub fn notify(&self) -> Result<NotificationReport, ExchangeServiceError> {
        let record = self.store.load()?;
        if !record.has_draw() {
            return Err(ExchangeServiceError::NoAssignments);
        }

        let batch = compose(&record, &self.notifications)?;
        self.notifier.send_batch(&batch.participants)?;

        let mut organizer_delivery_failed = false;
        if !batch.organizers.is_empty() {
            if let Err(err) = self.notifier.send_batch(&batch.organizers) {
                warn!(error = %err, "failed to send organizer summaries");
                organizer_delivery_failed = true;
            }
        }

        info!(
            participants = batch.participants.len(),
            organizers = batch.organizers.len(),
            "notifications sent"
        );

        Ok(NotificationReport {
            participant_count: batch.participants.len(),
            organizer_count: batch.organizers.len(),
            organizer_delivery_failed,
        })
    }
}

/// Error raised by the exchange service.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Draw(#[from] DrawFailure),
    #[error(transparent)]
    Notify(#[from] NotifyError),
    #[error("participant {0} not found")]
    ParticipantNotFound(ParticipantId),
    #[error("exclusion rule {0} not found")]
    RuleNotFound(RuleId),
    #[error("invalid participant: {0}")]
    InvalidParticipant(String),
    #[error("invalid exclusion rule: {0}")]
    InvalidRule(String),
    #[error("no assignments have been drawn")]
    NoAssignments,
}
