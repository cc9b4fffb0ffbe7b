use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

identifier!(
    /// Identifier of an internship posting.
    InternshipId
);
identifier!(
    /// Identifier of a student application.
    ApplicationId
);
identifier!(
    /// Identifier of a withdrawal request.
    WithdrawalId
);
identifier!(StudentId);
identifier!(RepresentativeId);
identifier!(CompanyId);
identifier!(StaffId);

/// Difficulty tier of a posting; drives eligibility for early-stage students.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InternshipLevel {
    Basic,
    Intermediate,
    Advanced,
}

impl InternshipLevel {
    pub const fn ordered() -> [Self; 3] {
        [Self::Basic, Self::Intermediate, Self::Advanced]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InternshipStatus {
    Pending,
    Approved,
    Rejected,
    Filled,
}

impl InternshipStatus {
    pub const fn ordered() -> [Self; 4] {
        [Self::Pending, Self::Approved, Self::Rejected, Self::Filled]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Filled => "Filled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Successful,
    Unsuccessful,
    Withdrawn,
}

impl ApplicationStatus {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Pending,
            Self::Successful,
            Self::Unsuccessful,
            Self::Withdrawn,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Successful => "Successful",
            Self::Unsuccessful => "Unsuccessful",
            Self::Withdrawn => "Withdrawn",
        }
    }

    /// Pending and Successful applications count against the student's quota.
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Successful)
    }
}

/// Staff verdict on a pending application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationOutcome {
    Successful,
    Unsuccessful,
}

impl From<ApplicationOutcome> for ApplicationStatus {
    fn from(value: ApplicationOutcome) -> Self {
        match value {
            ApplicationOutcome::Successful => ApplicationStatus::Successful,
            ApplicationOutcome::Unsuccessful => ApplicationStatus::Unsuccessful,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalStatus {
    Pending,
    Approved,
    Rejected,
}

impl WithdrawalStatus {
    pub const fn ordered() -> [Self; 3] {
        [Self::Pending, Self::Approved, Self::Rejected]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }
}

/// Student account. `year` is the academic standing used for eligibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub year: u8,
    pub major: String,
}

/// Company representative account; only approved representatives may post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRepresentative {
    pub id: RepresentativeId,
    pub name: String,
    pub company_id: CompanyId,
    pub company_name: String,
    pub approved: bool,
}

/// Career-center staff member acting on approvals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: StaffId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Internship {
    pub id: InternshipId,
    pub title: String,
    pub description: String,
    pub level: InternshipLevel,
    pub preferred_major: String,
    pub opening_date: NaiveDate,
    pub closing_date: NaiveDate,
    pub status: InternshipStatus,
    pub representative_id: RepresentativeId,
    pub company_id: CompanyId,
    pub company_name: String,
    pub remaining_slots: u32,
    pub visible: bool,
}

impl Internship {
    pub fn is_owned_by(&self, representative: &CompanyRepresentative) -> bool {
        self.representative_id == representative.id
    }

    /// Students only ever see postings that are both visible and approved.
    pub fn is_open_to_students(&self) -> bool {
        self.visible && self.status == InternshipStatus::Approved
    }
}

/// Editable fields of a posting, shared by create and modify.
///
/// `slots` is signed so that a negative capacity from a caller surfaces as a
/// validation error rather than a deserialization failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternshipDraft {
    pub title: String,
    pub description: String,
    pub level: InternshipLevel,
    pub preferred_major: String,
    pub opening_date: NaiveDate,
    pub closing_date: NaiveDate,
    pub slots: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub internship_id: InternshipId,
    pub student_id: StudentId,
    pub status: ApplicationStatus,
    pub submitted_on: NaiveDate,
    pub accepted_by_student: bool,
}

impl Application {
    pub fn belongs_to(&self, student: &Student) -> bool {
        self.student_id == student.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    pub id: WithdrawalId,
    pub application_id: ApplicationId,
    pub student_id: StudentId,
    pub status: WithdrawalStatus,
    pub requested_on: NaiveDate,
}
