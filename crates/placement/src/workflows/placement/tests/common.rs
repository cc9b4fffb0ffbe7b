use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::placement::clock::FixedClock;
use crate::workflows::placement::domain::{
    Application, ApplicationId, ApplicationOutcome, CompanyId, CompanyRepresentative, Internship,
    InternshipDraft, InternshipId, InternshipLevel, InternshipStatus, RepresentativeId, StaffId,
    StaffMember, Student, StudentId, WithdrawalId, WithdrawalRequest,
};
use crate::workflows::placement::notify::{NotificationSink, NotifyError};
use crate::workflows::placement::services::PlacementServices;
use crate::workflows::placement::store::{
    ChangeSet, InMemoryPlacementStore, PlacementStore, RepositoryError, SequenceMark,
};

pub(crate) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(crate) fn today() -> NaiveDate {
    date(2025, 3, 1)
}

pub(crate) fn student(id: &str, year: u8) -> Student {
    Student {
        id: StudentId(id.to_string()),
        name: format!("Student {id}"),
        year,
        major: "Computer Science".to_string(),
    }
}

pub(crate) fn representative(id: &str, company: &str) -> CompanyRepresentative {
    CompanyRepresentative {
        id: RepresentativeId(id.to_string()),
        name: format!("Rep {id}"),
        company_id: CompanyId(company.to_lowercase()),
        company_name: company.to_string(),
        approved: true,
    }
}

pub(crate) fn staff() -> StaffMember {
    StaffMember {
        id: StaffId("staff-1".to_string()),
        name: "Career Office".to_string(),
    }
}

pub(crate) fn draft(title: &str, slots: i64) -> InternshipDraft {
    InternshipDraft {
        title: title.to_string(),
        description: format!("{title} internship"),
        level: InternshipLevel::Basic,
        preferred_major: "Computer Science".to_string(),
        opening_date: date(2025, 1, 1),
        closing_date: date(2025, 12, 31),
        slots,
    }
}

pub(crate) fn internship_record(id: &str, status: InternshipStatus, slots: u32) -> Internship {
    Internship {
        id: InternshipId(id.to_string()),
        title: "Platform Intern".to_string(),
        description: "Build internal tools".to_string(),
        level: InternshipLevel::Basic,
        preferred_major: "Computer Science".to_string(),
        opening_date: date(2025, 1, 1),
        closing_date: date(2025, 12, 31),
        status,
        representative_id: RepresentativeId("rep-1".to_string()),
        company_id: CompanyId("acme".to_string()),
        company_name: "Acme".to_string(),
        remaining_slots: slots,
        visible: status == InternshipStatus::Approved,
    }
}

pub(crate) type TestServices = PlacementServices<InMemoryPlacementStore, RecordingNotifier>;

pub(crate) fn build_services() -> (
    TestServices,
    Arc<InMemoryPlacementStore>,
    Arc<RecordingNotifier>,
) {
    build_services_on(today())
}

pub(crate) fn build_services_on(
    day: NaiveDate,
) -> (
    TestServices,
    Arc<InMemoryPlacementStore>,
    Arc<RecordingNotifier>,
) {
    let store = Arc::new(InMemoryPlacementStore::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let services = PlacementServices::new(
        store.clone(),
        notifier.clone(),
        Arc::new(FixedClock(day)),
    )
    .expect("services build");
    (services, store, notifier)
}

/// Create and approve a posting in one step.
pub(crate) fn approved_internship(
    services: &TestServices,
    owner: &CompanyRepresentative,
    draft: InternshipDraft,
) -> Internship {
    let created = services
        .internships
        .create(owner, draft)
        .expect("internship created");
    services
        .internships
        .decide(&staff(), &created.id, true)
        .expect("internship approved")
}

/// Submit and approve an application in one step.
pub(crate) fn successful_application(
    services: &TestServices,
    applicant: &Student,
    internship_id: &InternshipId,
) -> Application {
    let application = services
        .applications
        .apply(applicant, internship_id)
        .expect("application submitted");
    services
        .applications
        .decide(&staff(), &application.id, ApplicationOutcome::Successful)
        .expect("application approved")
}

pub(crate) fn stored_internship(store: &InMemoryPlacementStore, id: &InternshipId) -> Internship {
    store
        .internship(id)
        .expect("fetch succeeds")
        .expect("internship present")
}

pub(crate) fn stored_application(
    store: &InMemoryPlacementStore,
    id: &ApplicationId,
) -> Application {
    store
        .application(id)
        .expect("fetch succeeds")
        .expect("application present")
}

#[derive(Default, Clone)]
pub(crate) struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub(crate) fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("notifier mutex poisoned").clone()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, message: &str) -> Result<(), NotifyError> {
        self.messages
            .lock()
            .expect("notifier mutex poisoned")
            .push(message.to_string());
        Ok(())
    }
}

pub(crate) struct FailingNotifier;

impl NotificationSink for FailingNotifier {
    fn notify(&self, _message: &str) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("smtp relay offline".to_string()))
    }
}

/// Reads from an inner store but refuses every commit.
#[derive(Default)]
pub(crate) struct ReadOnlyStore {
    pub(crate) inner: InMemoryPlacementStore,
}

impl PlacementStore for ReadOnlyStore {
    fn student(&self, id: &StudentId) -> Result<Option<Student>, RepositoryError> {
        self.inner.student(id)
    }

    fn students(&self) -> Result<Vec<Student>, RepositoryError> {
        self.inner.students()
    }

    fn representative(
        &self,
        id: &RepresentativeId,
    ) -> Result<Option<CompanyRepresentative>, RepositoryError> {
        self.inner.representative(id)
    }

    fn representatives(&self) -> Result<Vec<CompanyRepresentative>, RepositoryError> {
        self.inner.representatives()
    }

    fn staff_member(&self, id: &StaffId) -> Result<Option<StaffMember>, RepositoryError> {
        self.inner.staff_member(id)
    }

    fn staff(&self) -> Result<Vec<StaffMember>, RepositoryError> {
        self.inner.staff()
    }

    fn internship(&self, id: &InternshipId) -> Result<Option<Internship>, RepositoryError> {
        self.inner.internship(id)
    }

    fn internships(&self) -> Result<Vec<Internship>, RepositoryError> {
        self.inner.internships()
    }

    fn application(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        self.inner.application(id)
    }

    fn applications(&self) -> Result<Vec<Application>, RepositoryError> {
        self.inner.applications()
    }

    fn withdrawal(&self, id: &WithdrawalId) -> Result<Option<WithdrawalRequest>, RepositoryError> {
        self.inner.withdrawal(id)
    }

    fn withdrawals(&self) -> Result<Vec<WithdrawalRequest>, RepositoryError> {
        self.inner.withdrawals()
    }

    fn sequence_marks(&self) -> Result<Vec<SequenceMark>, RepositoryError> {
        self.inner.sequence_marks()
    }

    fn commit(&self, _changes: ChangeSet) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }
}

pub(crate) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
