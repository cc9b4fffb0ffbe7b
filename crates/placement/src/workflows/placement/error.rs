use super::domain::{
    ApplicationId, ApplicationStatus, InternshipId, InternshipLevel, InternshipStatus,
    RepresentativeId, StaffId, StudentId, WithdrawalId,
};
use super::store::RepositoryError;

/// Error raised by the lifecycle managers. Every variant is returned before
/// any write reaches the store.
#[derive(Debug, thiserror::Error)]
pub enum PlacementError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),
    #[error(transparent)]
    Capacity(#[from] CapacityError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Malformed caller input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    #[error("opening date must be strictly before closing date")]
    DateOrder,
    #[error("slot count must not be negative (found {found})")]
    NegativeSlots { found: i64 },
    #[error("slot count {found} is too large")]
    SlotsOverflow { found: i64 },
    #[error("year of study must be between 1 and 4 (found {found})")]
    YearOutOfRange { found: u8 },
    #[error("account {0} is already registered")]
    AccountExists(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotFoundError {
    #[error("internship {0} not found")]
    Internship(InternshipId),
    #[error("application {0} not found")]
    Application(ApplicationId),
    #[error("withdrawal request {0} not found")]
    Withdrawal(WithdrawalId),
    #[error("student {0} not found")]
    Student(StudentId),
    #[error("company representative {0} not found")]
    Representative(RepresentativeId),
    #[error("staff member {0} not found")]
    Staff(StaffId),
}

/// Caller does not own the target, or the target's state forbids the action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthorizationError {
    #[error("representative {0} has not been approved by staff")]
    RepresentativeNotApproved(RepresentativeId),
    #[error("internship {0} is owned by another representative")]
    NotOwner(InternshipId),
    #[error("internship {id} is {} and can no longer be edited", status.label())]
    InternshipLocked {
        id: InternshipId,
        status: InternshipStatus,
    },
    #[error("internship {id} has already been decided ({})", status.label())]
    InternshipAlreadyDecided {
        id: InternshipId,
        status: InternshipStatus,
    },
    #[error("internship {0} is not visible to students")]
    InternshipNotVisible(InternshipId),
    #[error("internship {id} is not open for applications ({})", status.label())]
    InternshipNotApproved {
        id: InternshipId,
        status: InternshipStatus,
    },
    #[error("internship {0} closed for applications")]
    InternshipClosed(InternshipId),
    #[error("student {student} is not eligible for {} internship {internship}", level.label())]
    NotEligible {
        student: StudentId,
        internship: InternshipId,
        level: InternshipLevel,
    },
    #[error("student {student} already has an active application for internship {internship}")]
    DuplicateApplication {
        student: StudentId,
        internship: InternshipId,
    },
    #[error("application {0} belongs to another student")]
    NotApplicant(ApplicationId),
    #[error("application {id} is {} and cannot take this action", status.label())]
    ApplicationState {
        id: ApplicationId,
        status: ApplicationStatus,
    },
    #[error("application {0} has already been accepted")]
    AlreadyAccepted(ApplicationId),
    #[error("application {0} already has a pending withdrawal request")]
    WithdrawalPending(ApplicationId),
    #[error("withdrawal request {0} has already been decided")]
    WithdrawalAlreadyDecided(WithdrawalId),
}

/// Fixed quotas exceeded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CapacityError {
    #[error("representative {representative} already owns {limit} internships")]
    InternshipQuota {
        representative: RepresentativeId,
        limit: usize,
    },
    #[error("student {student} already has {limit} active applications")]
    ApplicationQuota { student: StudentId, limit: usize },
}
