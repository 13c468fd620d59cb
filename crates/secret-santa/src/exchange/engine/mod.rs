//! Exclusion-aware Secret Santa assignment.
//!
//! A draw shuffles the giver order, then runs a backtracking search that tries
//! receivers in random order for each giver. A failed search is retried with a
//! fresh giver order up to the configured attempt cap. When every attempt
//! fails the constraint structure is analyzed to explain why.

mod diagnostics;
mod search;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use super::domain::{Assignment, ExclusionRule, Participant, ParticipantId};
use search::LegalityMatrix;

/// Attempts made before a draw is declared impossible.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 100;

/// Smallest exchange the engine will try to draw.
pub const MIN_PARTICIPANTS: usize = 3;

/// Whether `giver` may be assigned to `receiver` under `rules`.
///
/// Both the search and the failure analysis go through this predicate.
pub fn can_assign(giver: &ParticipantId, receiver: &ParticipantId, rules: &[ExclusionRule]) -> bool {
    giver != receiver && !rules.iter().any(|rule| rule.forbids(giver, receiver))
}

/// Draw with the default attempt cap.
pub fn generate_assignments<R>(
    participants: &[Participant],
    rules: &[ExclusionRule],
    rng: &mut R,
) -> Result<Vec<Assignment>, DrawFailure>
where
    R: Rng + ?Sized,
{
    AssignmentEngine::default().draw(participants, rules, rng)
}

/// Why a draw produced no assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawFailure {
    #[error("Not enough players")]
    TooFewParticipants { count: usize },
    #[error("Cannot find valid assignments")]
    SearchExhausted { attempts: u32, diagnostic: String },
}

impl DrawFailure {
    /// Supporting detail shown under the short message.
    pub fn details(&self) -> String {
        match self {
            DrawFailure::TooFewParticipants { .. } => format!(
                "You need at least {MIN_PARTICIPANTS} players to run Secret Santa"
            ),
            DrawFailure::SearchExhausted { diagnostic, .. } => diagnostic.clone(),
        }
    }
}

/// Stateless engine holding only the attempt cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentEngine {
    max_attempts: u32,
}

impl Default for AssignmentEngine {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl AssignmentEngine {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Produce a full giver to receiver permutation or explain why none was found.
    pub fn draw<R>(
        &self,
        participants: &[Participant],
        rules: &[ExclusionRule],
        rng: &mut R,
    ) -> Result<Vec<Assignment>, DrawFailure>
    where
        R: Rng + ?Sized,
    {
        if participants.len() < MIN_PARTICIPANTS {
            return Err(DrawFailure::TooFewParticipants {
                count: participants.len(),
            });
        }

        let matrix = LegalityMatrix::build(participants, rules);
        let mut giver_order: Vec<usize> = (0..participants.len()).collect();

        for attempt in 1..=self.max_attempts {
            giver_order.shuffle(rng);
            if let Some(receiver_of) = search::find_permutation(&matrix, &giver_order, rng) {
                debug!(attempt, participants = participants.len(), "draw succeeded");
                return Ok(giver_order
                    .iter()
                    .map(|&giver| Assignment {
                        giver_id: participants[giver].id.clone(),
                        receiver_id: participants[receiver_of[giver]].id.clone(),
                    })
                    .collect());
            }
            debug!(attempt, "search attempt exhausted");
        }

        let analysis = diagnostics::analyze(participants, rules);
        Err(DrawFailure::SearchExhausted {
            attempts: self.max_attempts,
            diagnostic: format!(
                "After {} attempts, we couldn't find a valid Secret Santa assignment that satisfies all constraints. {}",
                self.max_attempts, analysis
            ),
        })
    }
}
