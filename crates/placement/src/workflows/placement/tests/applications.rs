use super::common::*;
use crate::workflows::placement::domain::{
    Application, ApplicationId, ApplicationOutcome, ApplicationStatus, InternshipId,
    InternshipLevel, InternshipStatus,
};
use crate::workflows::placement::error::{
    AuthorizationError, CapacityError, NotFoundError, PlacementError,
};
use crate::workflows::placement::store::{ChangeSet, PlacementStore, RepositoryError};
use crate::workflows::placement::{FixedClock, PlacementServices};
use std::sync::Arc;
use std::thread;

#[test]
fn apply_creates_pending_application_dated_today() {
    let (services, store, notifier) = build_services();
    let owner = representative("rep-1", "Acme");
    let internship = approved_internship(&services, &owner, draft("Platform Intern", 2));
    let applicant = student("stu-1", 3);

    let application = services
        .applications
        .apply(&applicant, &internship.id)
        .expect("apply succeeds");

    assert_eq!(application.id.as_str(), "app-000001");
    assert_eq!(application.status, ApplicationStatus::Pending);
    assert_eq!(application.submitted_on, today());
    assert!(!application.accepted_by_student);
    assert_eq!(stored_application(&store, &application.id), application);
    assert!(notifier
        .messages()
        .iter()
        .any(|message| message.contains(application.id.as_str())));
}

#[test]
fn quota_is_checked_before_the_posting_is_looked_up() {
    let (services, _, _) = build_services();
    let owner = representative("rep-1", "Acme");
    let applicant = student("stu-1", 3);
    for index in 0..3 {
        let internship = approved_internship(&services, &owner, draft(&format!("Role {index}"), 1));
        services
            .applications
            .apply(&applicant, &internship.id)
            .expect("within quota");
    }

    match services
        .applications
        .apply(&applicant, &InternshipId::from("int-999999"))
    {
        Err(PlacementError::Capacity(CapacityError::ApplicationQuota { limit, .. })) => {
            assert_eq!(limit, 3)
        }
        other => panic!("expected quota error, got {other:?}"),
    }
}

#[test]
fn fourth_active_application_is_refused() {
    let (services, store, _) = build_services();
    let owner = representative("rep-1", "Acme");
    let applicant = student("stu-1", 3);
    let postings: Vec<_> = (0..4)
        .map(|index| approved_internship(&services, &owner, draft(&format!("Role {index}"), 1)))
        .collect();

    for internship in &postings[..3] {
        services
            .applications
            .apply(&applicant, &internship.id)
            .expect("within quota");
    }

    let refused = services.applications.apply(&applicant, &postings[3].id);
    assert!(matches!(
        refused,
        Err(PlacementError::Capacity(CapacityError::ApplicationQuota { .. }))
    ));
    assert_eq!(store.applications().expect("list").len(), 3);
}

#[test]
fn closed_applications_do_not_count_towards_quota() {
    let (services, _, _) = build_services();
    let owner = representative("rep-1", "Acme");
    let applicant = student("stu-1", 3);
    let postings: Vec<_> = (0..4)
        .map(|index| approved_internship(&services, &owner, draft(&format!("Role {index}"), 1)))
        .collect();

    let first = services
        .applications
        .apply(&applicant, &postings[0].id)
        .expect("apply");
    services
        .applications
        .decide(&staff(), &first.id, ApplicationOutcome::Unsuccessful)
        .expect("reject");

    for internship in &postings[1..] {
        services
            .applications
            .apply(&applicant, &internship.id)
            .expect("unsuccessful application frees a slot in the quota");
    }
}

#[test]
fn apply_reports_missing_posting() {
    let (services, _, _) = build_services();
    let missing = InternshipId::from("int-424242");

    match services.applications.apply(&student("stu-1", 3), &missing) {
        Err(PlacementError::NotFound(NotFoundError::Internship(id))) => assert_eq!(id, missing),
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn hidden_postings_refuse_before_status_is_considered() {
    let (services, _, _) = build_services();
    let owner = representative("rep-1", "Acme");
    let applicant = student("stu-1", 3);
    let hidden = services
        .internships
        .create(&owner, draft("Hidden", 1))
        .expect("create");

    assert!(matches!(
        services.applications.apply(&applicant, &hidden.id),
        Err(PlacementError::Authorization(
            AuthorizationError::InternshipNotVisible(_)
        ))
    ));

    services
        .internships
        .set_visibility(&owner, &hidden.id, true)
        .expect("stage visible");
    match services.applications.apply(&applicant, &hidden.id) {
        Err(PlacementError::Authorization(AuthorizationError::InternshipNotApproved {
            status,
            ..
        })) => assert_eq!(status, InternshipStatus::Pending),
        other => panic!("expected not approved, got {other:?}"),
    }
}

#[test]
fn rejected_postings_are_hidden_from_applicants() {
    let (services, _, _) = build_services();
    let owner = representative("rep-1", "Acme");
    let created = services
        .internships
        .create(&owner, draft("Rejected", 1))
        .expect("create");
    services
        .internships
        .decide(&staff(), &created.id, false)
        .expect("reject");

    assert!(matches!(
        services.applications.apply(&student("stu-1", 3), &created.id),
        Err(PlacementError::Authorization(
            AuthorizationError::InternshipNotVisible(_)
        ))
    ));
}

#[test]
fn closing_date_is_inclusive() {
    let (services, _, _) = build_services();
    let owner = representative("rep-1", "Acme");

    let mut last_day = draft("Closes Today", 1);
    last_day.closing_date = today();
    let open = approved_internship(&services, &owner, last_day);

    let mut yesterday = draft("Closed Yesterday", 1);
    yesterday.closing_date = date(2025, 2, 28);
    let closed = approved_internship(&services, &owner, yesterday);

    let applicant = student("stu-1", 3);
    services
        .applications
        .apply(&applicant, &open.id)
        .expect("closing day still accepts applications");
    assert!(matches!(
        services.applications.apply(&applicant, &closed.id),
        Err(PlacementError::Authorization(
            AuthorizationError::InternshipClosed(_)
        ))
    ));
}

#[test]
fn early_year_students_cannot_apply_above_basic() {
    let (services, store, _) = build_services();
    let owner = representative("rep-1", "Acme");
    let mut advanced = draft("Research Intern", 1);
    advanced.level = InternshipLevel::Advanced;
    let internship = approved_internship(&services, &owner, advanced);

    match services.applications.apply(&student("stu-1", 2), &internship.id) {
        Err(PlacementError::Authorization(AuthorizationError::NotEligible { level, .. })) => {
            assert_eq!(level, InternshipLevel::Advanced)
        }
        other => panic!("expected eligibility error, got {other:?}"),
    }
    assert!(store.applications().expect("list").is_empty());

    services
        .applications
        .apply(&student("stu-2", 3), &internship.id)
        .expect("year three may apply");
}

#[test]
fn duplicate_active_application_is_refused() {
    let (services, _, _) = build_services();
    let owner = representative("rep-1", "Acme");
    let internship = approved_internship(&services, &owner, draft("Platform Intern", 1));
    let applicant = student("stu-1", 3);

    let first = services
        .applications
        .apply(&applicant, &internship.id)
        .expect("apply");
    assert!(matches!(
        services.applications.apply(&applicant, &internship.id),
        Err(PlacementError::Authorization(
            AuthorizationError::DuplicateApplication { .. }
        ))
    ));

    services
        .applications
        .decide(&staff(), &first.id, ApplicationOutcome::Unsuccessful)
        .expect("reject");
    services
        .applications
        .apply(&applicant, &internship.id)
        .expect("reapplying after an unsuccessful outcome is allowed");
}

#[test]
fn staff_decision_leaves_capacity_untouched_and_is_final() {
    let (services, store, _) = build_services();
    let owner = representative("rep-1", "Acme");
    let internship = approved_internship(&services, &owner, draft("Platform Intern", 2));
    let applicant = student("stu-1", 3);

    let approved = successful_application(&services, &applicant, &internship.id);
    assert_eq!(approved.status, ApplicationStatus::Successful);
    assert!(!approved.accepted_by_student);
    assert_eq!(stored_internship(&store, &internship.id).remaining_slots, 2);

    match services
        .applications
        .decide(&staff(), &approved.id, ApplicationOutcome::Unsuccessful)
    {
        Err(PlacementError::Authorization(AuthorizationError::ApplicationState {
            status, ..
        })) => assert_eq!(status, ApplicationStatus::Successful),
        other => panic!("expected state error, got {other:?}"),
    }
}

#[test]
fn accepting_consumes_a_slot_and_withdraws_siblings() {
    let (services, store, _) = build_services();
    let owner = representative("rep-1", "Acme");
    let target = approved_internship(&services, &owner, draft("Target", 2));
    let pending_elsewhere = approved_internship(&services, &owner, draft("Other", 1));
    let rejected_elsewhere = approved_internship(&services, &owner, draft("Rejected", 1));
    let applicant = student("stu-1", 3);

    let offer = successful_application(&services, &applicant, &target.id);
    let pending = services
        .applications
        .apply(&applicant, &pending_elsewhere.id)
        .expect("apply");
    let unsuccessful = services
        .applications
        .apply(&applicant, &rejected_elsewhere.id)
        .expect("apply");
    services
        .applications
        .decide(&staff(), &unsuccessful.id, ApplicationOutcome::Unsuccessful)
        .expect("reject");

    let accepted = services
        .applications
        .accept_offer(&applicant, &offer.id)
        .expect("accept");

    assert!(accepted.accepted_by_student);
    assert_eq!(accepted.status, ApplicationStatus::Successful);
    assert_eq!(
        stored_application(&store, &pending.id).status,
        ApplicationStatus::Withdrawn
    );
    assert_eq!(
        stored_application(&store, &unsuccessful.id).status,
        ApplicationStatus::Unsuccessful
    );

    let after = stored_internship(&store, &target.id);
    assert_eq!(after.remaining_slots, 1);
    assert_eq!(after.status, InternshipStatus::Approved);
}

#[test]
fn last_slot_fills_the_posting_and_never_goes_negative() {
    let (services, store, notifier) = build_services();
    let owner = representative("rep-1", "Acme");
    let internship = approved_internship(&services, &owner, draft("Single Seat", 1));

    let first = student("stu-1", 3);
    let second = student("stu-2", 4);
    let first_offer = successful_application(&services, &first, &internship.id);
    let second_offer = successful_application(&services, &second, &internship.id);

    services
        .applications
        .accept_offer(&first, &first_offer.id)
        .expect("accept");
    let filled = stored_internship(&store, &internship.id);
    assert_eq!(filled.remaining_slots, 0);
    assert_eq!(filled.status, InternshipStatus::Filled);
    assert!(!filled.visible);
    assert!(notifier
        .messages()
        .iter()
        .any(|message| message.contains("now filled")));

    services
        .applications
        .accept_offer(&second, &second_offer.id)
        .expect("outstanding offer can still be accepted");
    let still_filled = stored_internship(&store, &internship.id);
    assert_eq!(still_filled.remaining_slots, 0);
    assert_eq!(still_filled.status, InternshipStatus::Filled);
    assert!(!still_filled.visible);

    assert!(matches!(
        services.applications.apply(&student("stu-3", 3), &internship.id),
        Err(PlacementError::Authorization(
            AuthorizationError::InternshipNotVisible(_)
        ))
    ));
    assert!(services
        .internships
        .visible_for_student(&student("stu-3", 3))
        .expect("listing")
        .is_empty());
}

#[test]
fn accepting_a_second_offer_hands_back_the_first_slot() {
    let (services, store, _) = build_services();
    let owner = representative("rep-1", "Acme");
    let first = approved_internship(&services, &owner, draft("First Seat", 1));
    let second = approved_internship(&services, &owner, draft("Second Seat", 1));
    let applicant = student("stu-1", 3);

    let first_offer = successful_application(&services, &applicant, &first.id);
    services
        .applications
        .accept_offer(&applicant, &first_offer.id)
        .expect("accept first");
    assert_eq!(
        stored_internship(&store, &first.id).status,
        InternshipStatus::Filled
    );

    let second_offer = successful_application(&services, &applicant, &second.id);
    services
        .applications
        .accept_offer(&applicant, &second_offer.id)
        .expect("accept second");

    let released = stored_internship(&store, &first.id);
    assert_eq!(released.status, InternshipStatus::Approved);
    assert_eq!(released.remaining_slots, 1);
    assert!(released.visible);

    let dropped = stored_application(&store, &first_offer.id);
    assert_eq!(dropped.status, ApplicationStatus::Withdrawn);
    assert!(!dropped.accepted_by_student);

    let taken = stored_internship(&store, &second.id);
    assert_eq!(taken.status, InternshipStatus::Filled);
    assert_eq!(taken.remaining_slots, 0);
    assert!(stored_application(&store, &second_offer.id).accepted_by_student);
}

#[test]
fn accept_is_limited_to_the_applicant_and_successful_offers() {
    let (services, store, _) = build_services();
    let owner = representative("rep-1", "Acme");
    let internship = approved_internship(&services, &owner, draft("Platform Intern", 2));
    let applicant = student("stu-1", 3);

    let pending = services
        .applications
        .apply(&applicant, &internship.id)
        .expect("apply");
    assert!(matches!(
        services.applications.accept_offer(&applicant, &pending.id),
        Err(PlacementError::Authorization(
            AuthorizationError::ApplicationState { .. }
        ))
    ));

    services
        .applications
        .decide(&staff(), &pending.id, ApplicationOutcome::Successful)
        .expect("approve");
    assert!(matches!(
        services
            .applications
            .accept_offer(&student("stu-2", 3), &pending.id),
        Err(PlacementError::Authorization(
            AuthorizationError::NotApplicant(_)
        ))
    ));
    assert_eq!(stored_internship(&store, &internship.id).remaining_slots, 2);

    services
        .applications
        .accept_offer(&applicant, &pending.id)
        .expect("accept");
    assert!(matches!(
        services.applications.accept_offer(&applicant, &pending.id),
        Err(PlacementError::Authorization(
            AuthorizationError::AlreadyAccepted(_)
        ))
    ));
    assert_eq!(stored_internship(&store, &internship.id).remaining_slots, 1);
}

#[test]
fn accept_reports_unknown_application() {
    let (services, _, _) = build_services();
    let missing = ApplicationId::from("app-000404");

    match services
        .applications
        .accept_offer(&student("stu-1", 3), &missing)
    {
        Err(PlacementError::NotFound(NotFoundError::Application(id))) => assert_eq!(id, missing),
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn failed_commit_leaves_every_record_untouched() {
    let store = Arc::new(ReadOnlyStore::default());
    let internship = internship_record("int-000001", InternshipStatus::Approved, 1);
    let offer = Application {
        id: ApplicationId::from("app-000001"),
        internship_id: internship.id.clone(),
        student_id: student("stu-1", 3).id,
        status: ApplicationStatus::Successful,
        submitted_on: today(),
        accepted_by_student: false,
    };
    let sibling = Application {
        id: ApplicationId::from("app-000002"),
        internship_id: InternshipId::from("int-000002"),
        status: ApplicationStatus::Pending,
        ..offer.clone()
    };
    store
        .inner
        .commit(
            ChangeSet::new()
                .internship(internship.clone())
                .application(offer.clone())
                .application(sibling.clone()),
        )
        .expect("seed");

    let services = PlacementServices::new(
        store.clone(),
        Arc::new(RecordingNotifier::default()),
        Arc::new(FixedClock(today())),
    )
    .expect("services build");

    match services
        .applications
        .accept_offer(&student("stu-1", 3), &offer.id)
    {
        Err(PlacementError::Repository(RepositoryError::Unavailable(_))) => {}
        other => panic!("expected repository error, got {other:?}"),
    }

    assert_eq!(
        store.internship(&internship.id).expect("fetch"),
        Some(internship)
    );
    assert_eq!(store.application(&offer.id).expect("fetch"), Some(offer));
    assert_eq!(store.application(&sibling.id).expect("fetch"), Some(sibling));
}

#[test]
fn concurrent_submissions_respect_the_active_quota() {
    let (services, store, _) = build_services();
    let first_owner = representative("rep-1", "Acme");
    let second_owner = representative("rep-2", "Globex");
    let mut postings = Vec::new();
    for index in 0..3 {
        postings.push(approved_internship(&services, &first_owner, draft(&format!("A{index}"), 1)).id);
        postings.push(approved_internship(&services, &second_owner, draft(&format!("B{index}"), 1)).id);
    }

    let services = Arc::new(services);
    let applicant = student("stu-1", 3);
    let handles: Vec<_> = postings
        .into_iter()
        .map(|internship_id| {
            let services = Arc::clone(&services);
            let applicant = applicant.clone();
            thread::spawn(move || services.applications.apply(&applicant, &internship_id).is_ok())
        })
        .collect();

    let accepted = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread completes"))
        .filter(|ok| *ok)
        .count();

    assert_eq!(accepted, 3);
    assert_eq!(store.applications().expect("list").len(), 3);
}

#[test]
fn listings_are_scoped_to_their_audience() {
    let (services, _, _) = build_services();
    let owner = representative("rep-1", "Acme");
    let intruder = representative("rep-2", "Globex");
    let internship = approved_internship(&services, &owner, draft("Platform Intern", 2));

    let first = services
        .applications
        .apply(&student("stu-1", 3), &internship.id)
        .expect("apply");
    let second = services
        .applications
        .apply(&student("stu-2", 3), &internship.id)
        .expect("apply");

    let received = services
        .applications
        .for_internship(&owner, &internship.id)
        .expect("owner listing");
    let ids: Vec<_> = received.into_iter().map(|record| record.id).collect();
    assert_eq!(ids, vec![first.id.clone(), second.id.clone()]);

    assert!(matches!(
        services.applications.for_internship(&intruder, &internship.id),
        Err(PlacementError::Authorization(AuthorizationError::NotOwner(_)))
    ));

    let mine = services
        .applications
        .for_student(&student("stu-2", 3))
        .expect("student listing");
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, second.id);

    services
        .applications
        .decide(&staff(), &first.id, ApplicationOutcome::Successful)
        .expect("approve");
    let pending = services
        .applications
        .pending_review(&staff())
        .expect("pending listing");
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, second.id);
}
