use rand::seq::SliceRandom;
use rand::Rng;

use super::can_assign;
use crate::exchange::domain::{ExclusionRule, Participant};

/// `can_assign` evaluated once for every ordered pair of participant positions.
pub(super) struct LegalityMatrix {
    size: usize,
    cells: Vec<bool>,
}

impl LegalityMatrix {
    pub(super) fn build(participants: &[Participant], rules: &[ExclusionRule]) -> Self {
        let size = participants.len();
        let mut cells = Vec::with_capacity(size * size);
        for giver in participants {
            for receiver in participants {
                cells.push(can_assign(&giver.id, &receiver.id, rules));
            }
        }
        Self { size, cells }
    }

    pub(super) fn allows(&self, giver: usize, receiver: usize) -> bool {
        self.cells[giver * self.size + receiver]
    }
}

/// One backtracking pass over `giver_order`.
///
/// Returns the receiver position for every giver position, or `None` when no
/// complete assignment is reachable.
pub(super) fn find_permutation<R>(
    matrix: &LegalityMatrix,
    giver_order: &[usize],
    rng: &mut R,
) -> Option<Vec<usize>>
where
    R: Rng + ?Sized,
{
    let mut search = Backtrack {
        matrix,
        giver_order,
        taken: vec![false; matrix.size],
        receiver_of: vec![usize::MAX; matrix.size],
        rng,
    };

    if search.assign(0) {
        Some(search.receiver_of)
    } else {
        None
    }
}

struct Backtrack<'a, R: ?Sized> {
    matrix: &'a LegalityMatrix,
    giver_order: &'a [usize],
    taken: Vec<bool>,
    receiver_of: Vec<usize>,
    rng: &'a mut R,
}

impl<R> Backtrack<'_, R>
where
    R: Rng + ?Sized,
{
    fn assign(&mut self, depth: usize) -> bool {
        if depth == self.giver_order.len() {
            return true;
        }
        if !self.every_giver_has_an_option(depth) {
            return false;
        }

        let giver = self.giver_order[depth];
        let mut candidates: Vec<usize> = (0..self.matrix.size)
            .filter(|&receiver| !self.taken[receiver] && self.matrix.allows(giver, receiver))
            .collect();
        candidates.shuffle(&mut *self.rng);

        for receiver in candidates {
            self.taken[receiver] = true;
            self.receiver_of[giver] = receiver;

            if self.assign(depth + 1) {
                return true;
            }

            self.taken[receiver] = false;
            self.receiver_of[giver] = usize::MAX;
        }

        false
    }

    // A remaining giver with no free legal receiver dooms the whole branch.
    fn every_giver_has_an_option(&self, depth: usize) -> bool {
        self.giver_order[depth..].iter().all(|&giver| {
            (0..self.matrix.size)
                .any(|receiver| !self.taken[receiver] && self.matrix.allows(giver, receiver))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::domain::ParticipantId;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn people(count: usize) -> Vec<Participant> {
        (0..count)
            .map(|index| Participant {
                id: ParticipantId(format!("p{index}")),
                name: format!("P{index}"),
                email: format!("p{index}@example.com"),
                is_organizer: false,
            })
            .collect()
    }

    #[test]
    fn matrix_forbids_diagonal() {
        let matrix = LegalityMatrix::build(&people(4), &[]);
        for index in 0..4 {
            assert!(!matrix.allows(index, index));
        }
        assert!(matrix.allows(0, 1));
    }

    #[test]
    fn finds_the_only_cycle_left_open() {
        let participants = people(3);
        // p0 -> p2 is blocked, leaving p0 -> p1 -> p2 -> p0 as the only option.
        let rules = vec![ExclusionRule::new(
            participants[0].id.clone(),
            participants[2].id.clone(),
            false,
        )];
        let matrix = LegalityMatrix::build(&participants, &rules);
        let mut rng = StdRng::seed_from_u64(11);

        let receiver_of =
            find_permutation(&matrix, &[2, 0, 1], &mut rng).expect("cycle available");
        assert_eq!(receiver_of, vec![1, 2, 0]);
    }

    #[test]
    fn reports_none_when_a_giver_is_isolated() {
        let participants = people(4);
        let rules: Vec<ExclusionRule> = participants[1..]
            .iter()
            .map(|other| ExclusionRule::new(participants[0].id.clone(), other.id.clone(), false))
            .collect();
        let matrix = LegalityMatrix::build(&participants, &rules);
        let mut rng = StdRng::seed_from_u64(5);

        assert!(find_permutation(&matrix, &[0, 1, 2, 3], &mut rng).is_none());
    }
}
