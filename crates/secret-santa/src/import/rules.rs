use std::io::Read;

use super::normalizer::find_column;
use super::parser::read_table;
use super::ImportError;
use crate::exchange::domain::{ExclusionRule, Participant, ParticipantId};

const FROM_ALIASES: &[&str] = &["from", "giver", "from name"];
const TO_ALIASES: &[&str] = &["to", "receiver", "to name"];
const SYMMETRIC_ALIASES: &[&str] = &["symmetric", "bidirectional", "mutual"];

pub(super) fn parse_rules<R: Read>(
    reader: R,
    participants: &[Participant],
) -> Result<Vec<ExclusionRule>, ImportError> {
    let (headers, rows) = read_table(reader)?;

    let (Some(from_index), Some(to_index)) = (
        find_column(&headers, FROM_ALIASES),
        find_column(&headers, TO_ALIASES),
    ) else {
        return Err(ImportError::MissingColumns {
            required: "from and to",
        });
    };
    let symmetric_index = find_column(&headers, SYMMETRIC_ALIASES);

    rows.iter()
        .map(|row| -> Result<ExclusionRule, ImportError> {
            let field = |index: usize| row.get(index).map(String::as_str).unwrap_or_default();
            let from_id = resolve(participants, field(from_index))?;
            let to_id = resolve(participants, field(to_index))?;
            let symmetric = match symmetric_index {
                Some(index) => parse_flag(field(index))?,
                None => true,
            };
            Ok(ExclusionRule::new(from_id, to_id, symmetric))
        })
        .collect()
}

fn resolve(participants: &[Participant], reference: &str) -> Result<ParticipantId, ImportError> {
    participants
        .iter()
        .find(|participant| {
            participant.name.eq_ignore_ascii_case(reference)
                || participant.email.eq_ignore_ascii_case(reference)
        })
        .map(|participant| participant.id.clone())
        .ok_or_else(|| ImportError::UnknownParticipant(reference.to_string()))
}

// Blank means symmetric, matching the default for new rules.
fn parse_flag(value: &str) -> Result<bool, ImportError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "true" | "yes" | "y" | "1" => Ok(true),
        "false" | "no" | "n" | "0" => Ok(false),
        _ => Err(ImportError::InvalidFlag(value.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn roster() -> Vec<Participant> {
        vec![
            Participant::new("Ada", "ada@example.com", true),
            Participant::new("Bob", "bob@example.com", false),
            Participant::new("Cy", "cy@example.com", false),
        ]
    }

    #[test]
    fn resolves_names_and_emails() {
        let roster = roster();
        let csv = "from,to,symmetric\nada,Bob,no\ncy@example.com,ADA,\n";
        let rules = parse_rules(Cursor::new(csv), &roster).expect("rules parse");

        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].from_id, roster[0].id);
        assert_eq!(rules[0].to_id, roster[1].id);
        assert!(!rules[0].symmetric);
        assert_eq!(rules[1].from_id, roster[2].id);
        assert!(rules[1].symmetric);
    }

    #[test]
    fn missing_symmetric_column_defaults_to_symmetric() {
        let rules = parse_rules(Cursor::new("Giver,Receiver\nAda,Bob\n"), &roster())
            .expect("rules parse");
        assert!(rules[0].symmetric);
    }

    #[test]
    fn unknown_participants_are_rejected() {
        let result = parse_rules(Cursor::new("from,to\nAda,Zed\n"), &roster());
        assert!(matches!(result, Err(ImportError::UnknownParticipant(name)) if name == "Zed"));
    }

    #[test]
    fn invalid_flags_are_rejected() {
        let result = parse_rules(Cursor::new("from,to,mutual\nAda,Bob,maybe\n"), &roster());
        assert!(matches!(result, Err(ImportError::InvalidFlag(_))));
    }

    #[test]
    fn missing_columns_are_reported() {
        let result = parse_rules(Cursor::new("giver only\nAda\n"), &roster());
        assert!(matches!(result, Err(ImportError::MissingColumns { .. })));
    }
}
