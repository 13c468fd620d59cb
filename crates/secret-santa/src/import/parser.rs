use std::io::Read;

use super::normalizer::{find_column, is_valid_email};
use super::ImportError;

const NAME_ALIASES: &[&str] = &["name", "names", "participant", "participants"];
const EMAIL_ALIASES: &[&str] = &["email", "emails", "e-mail", "e-mail address"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParticipantRow {
    pub(crate) name: String,
    pub(crate) email: String,
}

/// Read a headed table into trimmed string rows.
pub(crate) fn read_table<R: Read>(reader: R) -> Result<(Vec<String>, Vec<Vec<String>>), ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader
        .headers()?
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok((headers, rows))
}

/// Rows with a name and a plausible e-mail address; everything else is skipped.
pub(crate) fn parse_participant_rows<R: Read>(
    reader: R,
) -> Result<Vec<ParticipantRow>, ImportError> {
    let (headers, rows) = read_table(reader)?;
    if rows.is_empty() {
        return Err(ImportError::Empty);
    }

    let (Some(name_index), Some(email_index)) = (
        find_column(&headers, NAME_ALIASES),
        find_column(&headers, EMAIL_ALIASES),
    ) else {
        return Err(ImportError::MissingColumns {
            required: "name and email",
        });
    };

    let parsed: Vec<ParticipantRow> = rows
        .into_iter()
        .filter_map(|row| {
            let name = row.get(name_index)?.trim().to_string();
            let email = row.get(email_index)?.trim().to_string();
            (!name.is_empty() && is_valid_email(&email)).then_some(ParticipantRow { name, email })
        })
        .collect();

    if parsed.is_empty() {
        return Err(ImportError::NoValidParticipants);
    }

    Ok(parsed)
}
