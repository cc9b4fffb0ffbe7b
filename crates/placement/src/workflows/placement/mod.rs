//! Placement lifecycle engine: internship postings, student applications, and
//! withdrawal requests, with the slot bookkeeping and eligibility filtering that
//! tie them together.
//!
//! Every manager reads and writes through a [`PlacementStore`]; none of them
//! keeps records of its own.

pub mod accounts;
pub mod applications;
pub(crate) mod capacity;
pub mod clock;
pub(crate) mod context;
pub mod domain;
pub mod eligibility;
pub mod error;
pub mod ids;
pub mod internships;
pub mod notify;
pub mod policy;
pub mod report;
pub mod router;
pub mod services;
pub mod store;
pub mod withdrawals;

#[cfg(test)]
mod tests;

pub use accounts::{AccountManager, RepresentativeRegistration};
pub use applications::ApplicationManager;
pub use clock::{Clock, FixedClock, SystemClock};
pub use domain::{
    Application, ApplicationId, ApplicationOutcome, ApplicationStatus, CompanyId,
    CompanyRepresentative, Internship, InternshipDraft, InternshipId, InternshipLevel,
    InternshipStatus, RepresentativeId, StaffId, StaffMember, Student, StudentId, WithdrawalId,
    WithdrawalRequest, WithdrawalStatus,
};
pub use eligibility::is_eligible;
pub use error::{
    AuthorizationError, CapacityError, NotFoundError, PlacementError, ValidationError,
};
pub use ids::IdSequence;
pub use internships::InternshipManager;
pub use notify::{NotificationSink, NotifyError, TracingNotifier};
pub use policy::PlacementPolicy;
pub use report::{
    generate_summary, summarize, InternshipLine, PlacementSummary, ReportFilters, StatusCount,
};
pub use router::placement_router;
pub use services::PlacementServices;
pub use store::{
    Change, ChangeSet, CsvPlacementStore, InMemoryPlacementStore, PlacementStore,
    RepositoryError, SequenceKind, SequenceMark,
};
pub use withdrawals::WithdrawalManager;
