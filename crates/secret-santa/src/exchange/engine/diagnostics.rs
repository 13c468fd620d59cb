use super::can_assign;
use crate::exchange::domain::{ExclusionRule, Participant};

const FALLBACK: &str = "The constraints appear too restrictive to find a valid assignment";

/// Best-effort explanation of why no draw was found.
///
/// This inspects the rules directly rather than proving infeasibility, so the
/// findings are hints for the organizer.
pub(super) fn analyze(participants: &[Participant], rules: &[ExclusionRule]) -> String {
    let mut findings = Vec::new();

    for giver in participants {
        let options: Vec<&Participant> = participants
            .iter()
            .filter(|receiver| can_assign(&giver.id, &receiver.id, rules))
            .collect();

        match options.as_slice() {
            [] => findings.push(format!(
                "{} has no one they can give to (all other participants are excluded by constraints)",
                giver.name
            )),
            [only] if participants.len() > 3 => findings.push(format!(
                "{} can only give to {}, which might make a valid assignment impossible",
                giver.name, only.name
            )),
            _ => {}
        }
    }

    if let [first, second, third] = participants {
        // With three people the only derangements are the two 3-cycles.
        let forward = [(first, second), (second, third), (third, first)];
        let backward = [(first, third), (third, second), (second, first)];

        if cycle_blocked(&forward, rules) && cycle_blocked(&backward, rules) {
            findings.push(
                "With only 3 participants, at least one direction in each possible cycle is blocked"
                    .to_string(),
            );
        }
    }

    if findings.is_empty() {
        FALLBACK.to_string()
    } else {
        findings.join(". ")
    }
}

fn cycle_blocked(cycle: &[(&Participant, &Participant)], rules: &[ExclusionRule]) -> bool {
    cycle
        .iter()
        .any(|(giver, receiver)| !can_assign(&giver.id, &receiver.id, rules))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::domain::ParticipantId;

    fn people(names: &[&str]) -> Vec<Participant> {
        names
            .iter()
            .map(|name| Participant {
                id: ParticipantId::from(*name),
                name: name.to_string(),
                email: String::new(),
                is_organizer: false,
            })
            .collect()
    }

    fn rule(from: &str, to: &str, symmetric: bool) -> ExclusionRule {
        ExclusionRule::new(ParticipantId::from(from), ParticipantId::from(to), symmetric)
    }

    #[test]
    fn names_participants_without_options() {
        let participants = people(&["Ada", "Bob", "Cy"]);
        let rules = vec![rule("Ada", "Bob", false), rule("Ada", "Cy", false)];

        let analysis = analyze(&participants, &rules);
        assert!(analysis.contains("Ada has no one they can give to"));
        assert!(analysis.contains("each possible cycle is blocked"));
        assert!(!analysis.contains("Bob has no one"));
    }

    #[test]
    fn warns_about_single_option_in_larger_groups() {
        let participants = people(&["Ada", "Bob", "Cy", "Di"]);
        let rules = vec![rule("Ada", "Bob", false), rule("Ada", "Cy", false)];

        let analysis = analyze(&participants, &rules);
        assert_eq!(
            analysis,
            "Ada can only give to Di, which might make a valid assignment impossible"
        );
    }

    #[test]
    fn single_option_is_not_flagged_with_three_participants() {
        let participants = people(&["Ada", "Bob", "Cy"]);
        let rules = vec![rule("Ada", "Bob", false)];

        let analysis = analyze(&participants, &rules);
        assert!(!analysis.contains("can only give to"));
    }

    #[test]
    fn three_person_note_needs_both_cycles_blocked() {
        let participants = people(&["Ada", "Bob", "Cy"]);

        let one_cycle = analyze(&participants, &[rule("Ada", "Bob", false)]);
        assert_eq!(one_cycle, FALLBACK);

        let both = analyze(
            &participants,
            &[rule("Ada", "Bob", false), rule("Bob", "Ada", false)],
        );
        assert!(both.contains("each possible cycle is blocked"));
    }

    #[test]
    fn joins_findings_with_periods() {
        let participants = people(&["Ada", "Bob", "Cy", "Di"]);
        let rules = vec![
            rule("Ada", "Bob", true),
            rule("Ada", "Cy", true),
            rule("Ada", "Di", true),
            rule("Bob", "Cy", false),
        ];

        let analysis = analyze(&participants, &rules);
        let parts: Vec<&str> = analysis.split(". ").collect();
        assert_eq!(parts.len(), 2);
        assert!(parts[0].starts_with("Ada has no one"));
        assert_eq!(
            parts[1],
            "Bob can only give to Di, which might make a valid assignment impossible"
        );
    }
}
