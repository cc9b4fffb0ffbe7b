use std::sync::Arc;

use chrono::NaiveDate;
use placement::workflows::placement::{
    generate_summary, ApplicationOutcome, ChangeSet, CompanyId, CompanyRepresentative,
    CsvPlacementStore, FixedClock, InternshipDraft, InternshipLevel, InternshipStatus,
    PlacementServices, PlacementStore, RepresentativeId, ReportFilters, StaffId, StaffMember,
    Student, StudentId, TracingNotifier,
};
use tempfile::tempdir;

fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn open(dir: &std::path::Path) -> PlacementServices<CsvPlacementStore, TracingNotifier> {
    let store = Arc::new(CsvPlacementStore::open(dir).expect("store opens"));
    PlacementServices::new(
        store,
        Arc::new(TracingNotifier),
        Arc::new(FixedClock(day(2025, 3, 1))),
    )
    .expect("services build")
}

fn staff() -> StaffMember {
    StaffMember {
        id: StaffId::from("staff-1"),
        name: "Career Office".to_string(),
    }
}

fn representative() -> CompanyRepresentative {
    CompanyRepresentative {
        id: RepresentativeId::from("rep-1"),
        name: "Dana".to_string(),
        company_id: CompanyId::from("acme"),
        company_name: "Acme, Inc.".to_string(),
        approved: true,
    }
}

fn student() -> Student {
    Student {
        id: StudentId::from("stu-1"),
        name: "Sam".to_string(),
        year: 4,
        major: "Computer Science".to_string(),
    }
}

fn draft(title: &str) -> InternshipDraft {
    InternshipDraft {
        title: title.to_string(),
        description: "Data pipelines, dashboards and \"on-call\" shadowing".to_string(),
        level: InternshipLevel::Advanced,
        preferred_major: "Computer Science".to_string(),
        opening_date: day(2025, 1, 1),
        closing_date: day(2025, 12, 31),
        slots: 1,
    }
}

#[test]
fn records_survive_reopening_the_directory() {
    let dir = tempdir().expect("temp dir");

    let (internship_id, application_id) = {
        let services = open(dir.path());
        services.accounts.register_staff(staff()).expect("staff");
        services
            .accounts
            .register_student(student())
            .expect("student");
        let created = services
            .internships
            .create(&representative(), draft("Data Intern"))
            .expect("create");
        services
            .internships
            .decide(&staff(), &created.id, true)
            .expect("approve");
        let application = services
            .applications
            .apply(&student(), &created.id)
            .expect("apply");
        services
            .applications
            .decide(&staff(), &application.id, ApplicationOutcome::Successful)
            .expect("decide");
        services
            .applications
            .accept_offer(&student(), &application.id)
            .expect("accept");
        (created.id, application.id)
    };

    let reopened = open(dir.path());
    let internship = reopened.internships.get(&internship_id).expect("get");
    assert_eq!(internship.status, InternshipStatus::Filled);
    assert_eq!(internship.remaining_slots, 0);
    assert_eq!(internship.company_name, "Acme, Inc.");
    assert!(internship.description.contains("\"on-call\""));

    let application = reopened.applications.get(&application_id).expect("get");
    assert!(application.accepted_by_student);
    assert_eq!(
        reopened.accounts.student(&student().id).expect("student"),
        student()
    );

    let next = reopened
        .internships
        .create(&representative(), draft("Second Intern"))
        .expect("create");
    assert_eq!(next.id.as_str(), "int-000002");

    let text = generate_summary(reopened.store().as_ref(), &ReportFilters::default())
        .expect("summary");
    assert!(text.contains("Accepted offers: 1"));
}

#[test]
fn removed_postings_disappear_from_disk() {
    let dir = tempdir().expect("temp dir");
    let services = open(dir.path());
    let created = services
        .internships
        .create(&representative(), draft("Short Lived"))
        .expect("create");
    services
        .internships
        .remove(&representative(), &created.id)
        .expect("remove");

    let store = CsvPlacementStore::open(dir.path()).expect("reopen");
    assert!(store.internships().expect("list").is_empty());
    assert_eq!(store.data_dir(), dir.path());
}

#[test]
fn removing_the_newest_posting_does_not_recycle_its_id() {
    let dir = tempdir().expect("temp dir");
    {
        let services = open(dir.path());
        let first = services
            .internships
            .create(&representative(), draft("Data Intern"))
            .expect("first");
        let second = services
            .internships
            .create(&representative(), draft("Ops Intern"))
            .expect("second");
        assert_eq!(first.id.as_str(), "int-000001");
        assert_eq!(second.id.as_str(), "int-000002");
        services
            .internships
            .remove(&representative(), &second.id)
            .expect("remove");
    }

    let reopened = open(dir.path());
    let next = reopened
        .internships
        .create(&representative(), draft("Platform Intern"))
        .expect("create");
    assert_eq!(next.id.as_str(), "int-000003");
    assert!(dir.path().join("sequences.csv").exists());
}

#[test]
fn commit_writes_only_touched_files() {
    let dir = tempdir().expect("temp dir");
    let store = CsvPlacementStore::open(dir.path()).expect("open");

    store
        .commit(ChangeSet::new().staff(staff()))
        .expect("commit");

    assert!(dir.path().join("staff.csv").exists());
    assert!(!dir.path().join("internships.csv").exists());
    assert!(!dir.path().join("sequences.csv").exists());
    assert!(!dir.path().join("staff.csv.tmp").exists());
}
