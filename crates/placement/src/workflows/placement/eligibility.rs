use super::domain::{Internship, InternshipLevel, Student};

/// Highest year of study treated as early-stage.
pub const EARLY_STAGE_MAX_YEAR: u8 = 2;

/// Single decision point for whether `student` may see or apply to `internship`.
///
/// Early-stage students (year <= 2) are limited to Basic postings; everyone
/// else is eligible for every level.
pub fn is_eligible(student: &Student, internship: &Internship) -> bool {
    student.year > EARLY_STAGE_MAX_YEAR || internship.level == InternshipLevel::Basic
}
