use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use tracing::{debug, info};

use super::capacity::{consume_slot, release_slot};
use super::context::LifecycleContext;
use super::domain::{
    Application, ApplicationId, ApplicationOutcome, ApplicationStatus, CompanyRepresentative,
    InternshipId, InternshipStatus, StaffMember, Student,
};
use super::eligibility::is_eligible;
use super::error::{AuthorizationError, CapacityError, NotFoundError, PlacementError};
use super::notify::NotificationSink;
use super::store::{ChangeSet, PlacementStore};

/// Owns submission gating, staff decisions, and offer acceptance.
///
/// Staff approval only makes an application acceptable; the slot is consumed
/// when the student accepts.
pub struct ApplicationManager<S: ?Sized, N: ?Sized> {
    ctx: LifecycleContext<S, N>,
}

impl<S, N> ApplicationManager<S, N>
where
    S: PlacementStore + ?Sized,
    N: NotificationSink + ?Sized,
{
    pub(crate) fn new(ctx: LifecycleContext<S, N>) -> Self {
        Self { ctx }
    }

    /// Submit an application. Gates run in a fixed order so the caller learns
    /// the first reason the submission was refused.
    pub fn apply(
        &self,
        student: &Student,
        internship_id: &InternshipId,
    ) -> Result<Application, PlacementError> {
        let _guard = self.ctx.exclusive();

        let active = self
            .ctx
            .store
            .applications_where(&|record| record.belongs_to(student) && record.status.is_active())?;

        let limit = self.ctx.policy.active_applications_per_student();
        if active.len() >= limit {
            debug!(student = %student.id, active = active.len(), "application quota reached");
            return Err(CapacityError::ApplicationQuota {
                student: student.id.clone(),
                limit,
            }
            .into());
        }

        let internship = self
            .ctx
            .store
            .internship(internship_id)?
            .ok_or_else(|| NotFoundError::Internship(internship_id.clone()))?;

        if !internship.visible {
            return Err(AuthorizationError::InternshipNotVisible(internship.id).into());
        }
        if internship.status != InternshipStatus::Approved {
            return Err(AuthorizationError::InternshipNotApproved {
                id: internship.id,
                status: internship.status,
            }
            .into());
        }

        let today = self.ctx.today();
        if internship.closing_date < today {
            return Err(AuthorizationError::InternshipClosed(internship.id).into());
        }
        // Sits between the closing-date and duplicate checks so an ineligible
        // student is refused before any duplicate is reported.
        if !is_eligible(student, &internship) {
            return Err(AuthorizationError::NotEligible {
                student: student.id.clone(),
                internship: internship.id,
                level: internship.level,
            }
            .into());
        }
        if active
            .iter()
            .any(|record| record.internship_id == internship.id)
        {
            return Err(AuthorizationError::DuplicateApplication {
                student: student.id.clone(),
                internship: internship.id,
            }
            .into());
        }

        let (id, mark) = self.ctx.ids.next_application();
        let application = Application {
            id,
            internship_id: internship.id.clone(),
            student_id: student.id.clone(),
            status: ApplicationStatus::Pending,
            submitted_on: today,
            accepted_by_student: false,
        };

        self.ctx
            .store
            .commit(ChangeSet::new().application(application.clone()).sequence(mark))?;

        info!(application = %application.id, student = %student.id, internship = %internship.id, "application submitted");
        self.ctx.announce(format!(
            "{} applied to {} at {} ({})",
            student.name, internship.title, internship.company_name, application.id
        ));
        Ok(application)
    }

    /// Staff verdict on a Pending application. Capacity is untouched here.
    pub fn decide(
        &self,
        staff: &StaffMember,
        application_id: &ApplicationId,
        outcome: ApplicationOutcome,
    ) -> Result<Application, PlacementError> {
        let _guard = self.ctx.exclusive();

        let mut application = self.fetch(application_id)?;
        if application.status != ApplicationStatus::Pending {
            return Err(AuthorizationError::ApplicationState {
                id: application.id,
                status: application.status,
            }
            .into());
        }

        application.status = outcome.into();
        self.ctx
            .store
            .commit(ChangeSet::new().application(application.clone()))?;

        info!(application = %application.id, staff = %staff.id, status = application.status.label(), "application decided");
        self.ctx.announce(format!(
            "{} marked application {} as {}",
            staff.name,
            application.id,
            application.status.label()
        ));
        Ok(application)
    }

    /// Accept a Successful offer.
    ///
    /// In one commit: the offer is flagged accepted, every other active
    /// application of the student is withdrawn, and the internship gives up a
    /// slot (becoming Filled when none remain).
    pub fn accept_offer(
        &self,
        student: &Student,
        application_id: &ApplicationId,
    ) -> Result<Application, PlacementError> {
        let _guard = self.ctx.exclusive();

        let mut application = self.fetch(application_id)?;
        if !application.belongs_to(student) {
            return Err(AuthorizationError::NotApplicant(application.id).into());
        }
        if application.status != ApplicationStatus::Successful {
            return Err(AuthorizationError::ApplicationState {
                id: application.id,
                status: application.status,
            }
            .into());
        }
        if application.accepted_by_student {
            return Err(AuthorizationError::AlreadyAccepted(application.id).into());
        }

        let target = self
            .ctx
            .store
            .internship(&application.internship_id)?
            .ok_or_else(|| NotFoundError::Internship(application.internship_id.clone()))?;

        let mut siblings = self.ctx.store.applications_where(&|record| {
            record.belongs_to(student) && record.id != application.id && record.status.is_active()
        })?;

        // A previously accepted sibling hands its slot back before the new one is taken.
        let mut internships = BTreeMap::new();
        internships.insert(target.id.clone(), target);
        for sibling in &mut siblings {
            if sibling.accepted_by_student {
                let released = match internships.entry(sibling.internship_id.clone()) {
                    Entry::Occupied(entry) => entry.into_mut(),
                    Entry::Vacant(entry) => {
                        let record = self
                            .ctx
                            .store
                            .internship(&sibling.internship_id)?
                            .ok_or_else(|| NotFoundError::Internship(sibling.internship_id.clone()))?;
                        entry.insert(record)
                    }
                };
                release_slot(released);
                sibling.accepted_by_student = false;
            }
            sibling.status = ApplicationStatus::Withdrawn;
        }

        let Some(internship) = internships.get_mut(&application.internship_id) else {
            return Err(NotFoundError::Internship(application.internship_id.clone()).into());
        };
        consume_slot(internship);
        let internship = internship.clone();

        application.accepted_by_student = true;

        let mut changes = ChangeSet::new().application(application.clone());
        for sibling in siblings.iter().cloned() {
            changes = changes.application(sibling);
        }
        for record in internships.into_values() {
            changes = changes.internship(record);
        }

        self.ctx.store.commit(changes)?;

        info!(
            application = %application.id,
            internship = %internship.id,
            remaining_slots = internship.remaining_slots,
            withdrawn = siblings.len(),
            "offer accepted"
        );
        self.ctx.announce(format!(
            "{} accepted {} at {}; {} other application(s) withdrawn",
            student.name,
            internship.title,
            internship.company_name,
            siblings.len()
        ));
        if internship.status == InternshipStatus::Filled {
            self.ctx
                .announce(format!("internship {} is now filled", internship.id));
        }
        Ok(application)
    }

    pub fn get(&self, application_id: &ApplicationId) -> Result<Application, PlacementError> {
        self.fetch(application_id)
    }

    /// The student's applications, ordered by identifier.
    pub fn for_student(&self, student: &Student) -> Result<Vec<Application>, PlacementError> {
        let mut records = self
            .ctx
            .store
            .applications_where(&|record| record.belongs_to(student))?;
        records.sort_by(|left, right| left.id.cmp(&right.id));
        Ok(records)
    }

    /// Applications received by a posting; visible only to its owner.
    pub fn for_internship(
        &self,
        representative: &CompanyRepresentative,
        internship_id: &InternshipId,
    ) -> Result<Vec<Application>, PlacementError> {
        let internship = self
            .ctx
            .store
            .internship(internship_id)?
            .ok_or_else(|| NotFoundError::Internship(internship_id.clone()))?;
        if !internship.is_owned_by(representative) {
            return Err(AuthorizationError::NotOwner(internship.id).into());
        }

        let mut records = self
            .ctx
            .store
            .applications_where(&|record| record.internship_id == internship.id)?;
        records.sort_by(|left, right| left.id.cmp(&right.id));
        Ok(records)
    }

    /// Applications awaiting a staff verdict, ordered by identifier.
    pub fn pending_review(&self, _staff: &StaffMember) -> Result<Vec<Application>, PlacementError> {
        let mut records = self
            .ctx
            .store
            .applications_where(&|record| record.status == ApplicationStatus::Pending)?;
        records.sort_by(|left, right| left.id.cmp(&right.id));
        Ok(records)
    }

    fn fetch(&self, application_id: &ApplicationId) -> Result<Application, PlacementError> {
        self.ctx
            .store
            .application(application_id)?
            .ok_or_else(|| NotFoundError::Application(application_id.clone()).into())
    }
}
