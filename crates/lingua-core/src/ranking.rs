//! Popular rankings.
//!
//! Read-only views that order programs and instructors by enrollment. Ties are
//! broken by id so that equal counts always come back in the same order.

use std::collections::HashMap;

use crate::{Instructor, Program};

/// Default number of entries in a popular ranking.
pub const DEFAULT_POPULAR_LIMIT: usize = 6;

/// Upper bound on a caller-supplied ranking size.
pub const MAX_POPULAR_LIMIT: usize = 50;

/// Clamp a caller-supplied ranking size, defaulting when absent.
#[must_use]
pub fn popular_limit(requested: Option<usize>) -> usize {
    requested
        .unwrap_or(DEFAULT_POPULAR_LIMIT)
        .min(MAX_POPULAR_LIMIT)
}

/// The `limit` most enrolled programs, most enrolled first, ties by id.
#[must_use]
pub fn popular_programs(mut programs: Vec<Program>, limit: usize) -> Vec<Program> {
    programs.sort_by(|a, b| b.enrolled.cmp(&a.enrolled).then_with(|| a.id.cmp(&b.id)));
    programs.truncate(limit);
    programs
}

/// An instructor with the enrollment used to rank them.
#[derive(Debug, Clone)]
pub struct RankedInstructor {
    /// The instructor.
    pub instructor: Instructor,

    /// Enrollment summed over programs with a matching `instructor_email`.
    pub total_enrolled: u64,

    /// Number of matching programs.
    pub program_count: usize,
}

/// The `limit` instructors with the most enrolled students.
///
/// An instructor with no matching programs scores zero and sorts after every
/// instructor that has at least one program, including programs with no
/// enrollment. Remaining ties are broken by instructor id.
#[must_use]
pub fn popular_instructors(
    instructors: Vec<Instructor>,
    programs: &[Program],
    limit: usize,
) -> Vec<RankedInstructor> {
    let mut by_email: HashMap<&str, (u64, usize)> = HashMap::new();
    for program in programs {
        let entry = by_email.entry(program.instructor_email.as_str()).or_default();
        entry.0 = entry.0.saturating_add(program.enrolled);
        entry.1 += 1;
    }

    let mut ranked: Vec<RankedInstructor> = instructors
        .into_iter()
        .map(|instructor| {
            let (total_enrolled, program_count) = by_email
                .get(instructor.email.as_str())
                .copied()
                .unwrap_or_default();
            RankedInstructor {
                instructor,
                total_enrolled,
                program_count,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.total_enrolled
            .cmp(&a.total_enrolled)
            .then_with(|| (a.program_count == 0).cmp(&(b.program_count == 0)))
            .then_with(|| a.instructor.id.cmp(&b.instructor.id))
    });
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NewProgram, ProgramId};

    fn program(id: &str, email: &str, enrolled: u64) -> Program {
        let mut p = Program::submit(NewProgram {
            name: format!("Program {id}"),
            image: None,
            instructor_name: "Someone".into(),
            instructor_email: email.into(),
            available_seats: 10,
            price: 10.0,
        });
        p.id = id.parse::<ProgramId>().unwrap();
        p.enrolled = enrolled;
        p
    }

    fn instructor(id: &str, email: &str) -> Instructor {
        Instructor {
            id: id.parse().unwrap(),
            name: id.to_uppercase(),
            email: email.into(),
            image: None,
            profile: serde_json::Map::new(),
        }
    }

    #[test]
    fn programs_sorted_by_enrollment_with_id_tiebreak() {
        let programs = vec![
            program("c", "x@x.com", 5),
            program("a", "x@x.com", 5),
            program("b", "x@x.com", 9),
            program("d", "x@x.com", 0),
        ];

        let ranked = popular_programs(programs, 3);
        let ids: Vec<_> = ranked.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn programs_limit_larger_than_input() {
        let ranked = popular_programs(vec![program("a", "x@x.com", 1)], 6);
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn instructors_without_programs_rank_last() {
        let instructors = vec![
            instructor("i1", "none@x.com"),
            instructor("i2", "busy@x.com"),
            instructor("i0", "also-none@x.com"),
            instructor("i3", "some@x.com"),
        ];
        let programs = vec![
            program("p1", "busy@x.com", 4),
            program("p2", "busy@x.com", 3),
            program("p3", "some@x.com", 1),
        ];

        let ranked = popular_instructors(instructors, &programs, 6);
        let ids: Vec<_> = ranked.iter().map(|r| r.instructor.id.as_str()).collect();
        assert_eq!(ids, vec!["i2", "i3", "i0", "i1"]);
        assert_eq!(ranked[0].total_enrolled, 7);
        assert_eq!(ranked[0].program_count, 2);
        assert_eq!(ranked[3].total_enrolled, 0);
        assert_eq!(ranked[3].program_count, 0);
    }

    #[test]
    fn unenrolled_programs_rank_above_no_programs() {
        let instructors = vec![
            instructor("a0", "idle@x.com"),
            instructor("z9", "fresh@x.com"),
        ];
        let programs = vec![program("p1", "fresh@x.com", 0)];

        let ranked = popular_instructors(instructors, &programs, 6);
        let ids: Vec<_> = ranked.iter().map(|r| r.instructor.id.as_str()).collect();
        assert_eq!(ids, vec!["z9", "a0"]);
        assert_eq!(ranked[0].program_count, 1);
        assert_eq!(ranked[0].total_enrolled, 0);
    }

    #[test]
    fn limit_is_clamped() {
        assert_eq!(popular_limit(None), 6);
        assert_eq!(popular_limit(Some(2)), 2);
        assert_eq!(popular_limit(Some(10_000)), MAX_POPULAR_LIMIT);
    }
}
