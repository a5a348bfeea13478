//! Basic COCOMO (organic mode) cost estimate driven by `--avg-wage` /
//! `--cocomo`. An external collaborator consuming the finished summary —
//! not part of the counting pipeline's invariants.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CocomoEstimate {
    pub effort_person_months: f64,
    pub schedule_months: f64,
    pub people_required: f64,
    pub estimated_cost: f64,
}

/// Organic-mode basic COCOMO: `effort = 2.4 * KLOC^1.05`,
/// `schedule = 2.5 * effort^0.38`, `people = effort / schedule`,
/// `cost = effort * avg_wage / 12`.
pub fn estimate(total_code_lines: u64, avg_wage: f64) -> CocomoEstimate {
    let kloc = (total_code_lines as f64) / 1000.0;
    let effort = 2.4 * kloc.powf(1.05);
    let schedule = 2.5 * effort.powf(0.38);
    let people = if schedule > 0.0 { effort / schedule } else { 0.0 };
    let cost = effort * avg_wage / 12.0;

    CocomoEstimate {
        effort_person_months: effort,
        schedule_months: schedule,
        people_required: people,
        estimated_cost: cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_lines_is_zero_effort() {
        let e = estimate(0, 56286.0);
        assert_eq!(e.effort_person_months, 0.0);
        assert_eq!(e.estimated_cost, 0.0);
    }

    #[test]
    fn larger_codebases_cost_more() {
        let small = estimate(1_000, 56286.0);
        let large = estimate(100_000, 56286.0);
        assert!(large.estimated_cost > small.estimated_cost);
        assert!(large.effort_person_months > small.effort_person_months);
    }
}
