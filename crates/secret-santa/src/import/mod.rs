mod normalizer;
mod parser;
mod rules;

use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::exchange::domain::{ExclusionRule, Participant};

pub(crate) use normalizer::is_valid_email;

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Empty,
    MissingColumns { required: &'static str },
    NoValidParticipants,
    UnknownParticipant(String),
    InvalidFlag(String),
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read import file: {}", err),
            ImportError::Csv(err) => write!(f, "failed to parse CSV: {}", err),
            ImportError::Empty => write!(f, "CSV file is empty or contains no valid rows"),
            ImportError::MissingColumns { required } => {
                write!(f, "CSV must contain {} columns", required)
            }
            ImportError::NoValidParticipants => {
                write!(f, "No valid participants found in CSV file")
            }
            ImportError::UnknownParticipant(reference) => {
                write!(f, "exclusion rule references unknown participant '{}'", reference)
            }
            ImportError::InvalidFlag(value) => {
                write!(f, "'{}' is not a valid yes/no value", value)
            }
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Csv(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Builds participants from a CSV roster with `name` and `email` columns.
///
/// Every imported participant gets a fresh id; the first one is marked as
/// organizer.
pub struct ParticipantImporter;

impl ParticipantImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Participant>, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Participant>, ImportError> {
        let participants: Vec<Participant> = parser::parse_participant_rows(reader)?
            .into_iter()
            .enumerate()
            .map(|(index, row)| Participant::new(row.name, row.email, index == 0))
            .collect();

        info!(count = participants.len(), "imported participants");
        Ok(participants)
    }
}

/// Builds exclusion rules from a CSV with `from`, `to` and optional `symmetric`
/// columns, resolving participants by name or e-mail.
pub struct ExclusionRuleImporter;

impl ExclusionRuleImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        participants: &[Participant],
    ) -> Result<Vec<ExclusionRule>, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, participants)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        participants: &[Participant],
    ) -> Result<Vec<ExclusionRule>, ImportError> {
        rules::parse_rules(reader, participants)
    }
}
