//! The two-team "war" rule.

use rand::{Rng, RngCore};
use warfield_core::CellValue;
use warfield_space::{Direction, Neighbourhood};

use crate::rule::Rule;

/// Two teams compete for empty ground while blast fronts eat team cells
/// and burn out.
///
/// - Vacant (empty or contested) cells score each team over the four
///   orthogonal neighbours. A score below [`War::CLAIM_MIN`] leaves the
///   cell empty; a strictly higher score claims it; an equal score
///   yields [`CellValue::CONTESTED`].
/// - Team cells become [`CellValue::HAZARD_FAR`] when at least
///   [`War::OVERTAKE_MIN`] Moore neighbours hold it.
/// - Hazard cells age by one per step and return to empty after
///   [`CellValue::HAZARD_CEILING`].
#[derive(Clone, Copy, Debug, Default)]
pub struct War;

impl War {
    /// Directions that contribute to a team's claim on a vacant cell.
    pub const INFLUENCE: [Direction; 4] = Direction::ORTHOGONAL;
    /// Minimum orthogonal score needed to claim a vacant cell.
    pub const CLAIM_MIN: u8 = 2;
    /// Neighbouring blast cells needed to overtake a team cell.
    pub const OVERTAKE_MIN: u8 = 2;

    fn claim(n: &Neighbourhood) -> CellValue {
        let a = n.count_in(&Self::INFLUENCE, CellValue::TEAM_A);
        let b = n.count_in(&Self::INFLUENCE, CellValue::TEAM_B);
        if a.max(b) < Self::CLAIM_MIN {
            CellValue::EMPTY
        } else if a > b {
            CellValue::TEAM_A
        } else if b > a {
            CellValue::TEAM_B
        } else {
            CellValue::CONTESTED
        }
    }
}

impl Rule for War {
    fn name(&self) -> &str {
        "war"
    }

    fn max_value(&self) -> CellValue {
        CellValue::MAX
    }

    fn seed(&self, rng: &mut dyn RngCore) -> CellValue {
        if rng.gen::<bool>() {
            CellValue::TEAM_A
        } else {
            CellValue::TEAM_B
        }
    }

    fn next(&self, own: CellValue, n: &Neighbourhood) -> CellValue {
        if own.is_vacant() {
            return Self::claim(n);
        }
        if own == CellValue::TEAM_A || own == CellValue::TEAM_B {
            if n.count(CellValue::HAZARD_FAR) >= Self::OVERTAKE_MIN {
                return CellValue::HAZARD_FAR;
            }
            return own;
        }
        if own.is_hazard() && own < CellValue::HAZARD_CEILING {
            // Bounded by HAZARD_CEILING, so always representable.
            return CellValue::new(own.get() + 1).unwrap_or(CellValue::EMPTY);
        }
        // Past the ceiling, and any unassigned value written by an edit.
        CellValue::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warfield_space::Direction::*;

    const A: CellValue = CellValue::TEAM_A;
    const B: CellValue = CellValue::TEAM_B;
    const FAR: CellValue = CellValue::HAZARD_FAR;

    // ── Vacant cells ────────────────────────────────────────────

    #[test]
    fn strictly_higher_score_claims() {
        let n = Neighbourhood::with(&[(N, A), (S, A), (W, B)]);
        assert_eq!(War.next(CellValue::EMPTY, &n), A);
    }

    #[test]
    fn equal_scores_are_contested() {
        let n = Neighbourhood::with(&[(N, A), (S, A), (W, B), (E, B)]);
        assert_eq!(War.next(CellValue::EMPTY, &n), CellValue::CONTESTED);
    }

    #[test]
    fn weak_influence_leaves_cell_empty() {
        let n = Neighbourhood::with(&[(N, A), (W, B)]);
        assert_eq!(War.next(CellValue::EMPTY, &n), CellValue::EMPTY);
    }

    #[test]
    fn diagonals_do_not_count_toward_claims() {
        let n = Neighbourhood::with(&[(NW, A), (NE, A), (SW, A), (SE, A)]);
        assert_eq!(War.next(CellValue::EMPTY, &n), CellValue::EMPTY);
    }

    #[test]
    fn contested_cell_can_be_resolved() {
        let n = Neighbourhood::with(&[(N, B), (S, B), (E, B)]);
        assert_eq!(War.next(CellValue::CONTESTED, &n), B);
    }

    // ── Team cells ──────────────────────────────────────────────

    #[test]
    fn team_cell_overtaken_by_blast() {
        let n = Neighbourhood::with(&[(NE, FAR), (SW, FAR)]);
        assert_eq!(War.next(A, &n), FAR);
        assert_eq!(War.next(B, &n), FAR);
    }

    #[test]
    fn single_blast_neighbour_is_not_enough() {
        let n = Neighbourhood::with(&[(N, FAR), (S, B), (E, B), (W, B)]);
        assert_eq!(War.next(A, &n), A);
    }

    // ── Hazards ─────────────────────────────────────────────────

    #[test]
    fn hazards_age_then_burn_out() {
        let n = Neighbourhood::default();
        let mut v = FAR;
        let mut seen = vec![v.get()];
        while v != CellValue::EMPTY {
            v = War.next(v, &n);
            seen.push(v.get());
        }
        assert_eq!(seen, vec![3, 4, 5, 6, 7, 0]);
    }

    #[test]
    fn unassigned_values_clear() {
        let n = Neighbourhood::default();
        assert_eq!(War.next(CellValue::new(12).unwrap(), &n), CellValue::EMPTY);
    }
}
