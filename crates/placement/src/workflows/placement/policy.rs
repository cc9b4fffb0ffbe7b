const DEFAULT_INTERNSHIP_QUOTA: usize = 5;
const DEFAULT_ACTIVE_APPLICATION_QUOTA: usize = 3;

/// Quota dials enforced at creation and submission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementPolicy {
    internships_per_representative: usize,
    active_applications_per_student: usize,
}

impl PlacementPolicy {
    pub fn new(internships_per_representative: usize, active_applications_per_student: usize) -> Self {
        let internships_per_representative = if internships_per_representative == 0 {
            DEFAULT_INTERNSHIP_QUOTA
        } else {
            internships_per_representative
        };
        let active_applications_per_student = if active_applications_per_student == 0 {
            DEFAULT_ACTIVE_APPLICATION_QUOTA
        } else {
            active_applications_per_student
        };

        Self {
            internships_per_representative,
            active_applications_per_student,
        }
    }

    pub fn internships_per_representative(&self) -> usize {
        self.internships_per_representative
    }

    pub fn active_applications_per_student(&self) -> usize {
        self.active_applications_per_student
    }
}

impl Default for PlacementPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_INTERNSHIP_QUOTA, DEFAULT_ACTIVE_APPLICATION_QUOTA)
    }
}
