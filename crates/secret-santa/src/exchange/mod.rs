//! Secret Santa exchange: roster, exclusion rules, draw, and notifications.

pub mod domain;
pub mod engine;
pub mod notify;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Assignment, ExchangeRecord, ExclusionRule, Participant, ParticipantId, RuleId,
};
pub use engine::{
    can_assign, generate_assignments, AssignmentEngine, DrawFailure, DEFAULT_MAX_ATTEMPTS,
    MIN_PARTICIPANTS,
};
pub use notify::{
    compact_name, compose, MessageKind, NotificationBatch, NotificationSettings, Notifier,
    NotifyError, OutboundMessage, ResultsDigest,
};
pub use repository::{ExchangeStore, JsonFileStore, StoreError};
pub use router::exchange_router;
pub use service::{
    ExchangeServiceError, NewParticipant, NewRule, NotificationReport, SecretSantaService,
};
