use tracing::{debug, info};

use super::context::LifecycleContext;
use super::domain::{
    CompanyRepresentative, Internship, InternshipDraft, InternshipId, InternshipStatus,
    RepresentativeId, StaffMember, Student,
};
use super::eligibility::is_eligible;
use super::error::{
    AuthorizationError, CapacityError, NotFoundError, PlacementError, ValidationError,
};
use super::notify::NotificationSink;
use super::store::{ChangeSet, PlacementStore};

/// Owns the Pending -> Approved/Rejected transitions and representative edits.
///
/// Slot counts and the Approved <-> Filled edge are driven by the application
/// and withdrawal managers.
pub struct InternshipManager<S: ?Sized, N: ?Sized> {
    ctx: LifecycleContext<S, N>,
}

impl<S, N> InternshipManager<S, N>
where
    S: PlacementStore + ?Sized,
    N: NotificationSink + ?Sized,
{
    pub(crate) fn new(ctx: LifecycleContext<S, N>) -> Self {
        Self { ctx }
    }

    /// Create a Pending, hidden posting owned by `representative`.
    pub fn create(
        &self,
        representative: &CompanyRepresentative,
        draft: InternshipDraft,
    ) -> Result<Internship, PlacementError> {
        if !representative.approved {
            return Err(
                AuthorizationError::RepresentativeNotApproved(representative.id.clone()).into(),
            );
        }

        let _guard = self.ctx.exclusive();

        let owned = self
            .ctx
            .store
            .internships_where(&|record| record.representative_id == representative.id)?
            .len();
        let limit = self.ctx.policy.internships_per_representative();
        if owned >= limit {
            debug!(representative = %representative.id, owned, "internship quota reached");
            return Err(CapacityError::InternshipQuota {
                representative: representative.id.clone(),
                limit,
            }
            .into());
        }

        let slots = validate_draft(&draft)?;
        let (id, mark) = self.ctx.ids.next_internship();
        let internship = Internship {
            id,
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            level: draft.level,
            preferred_major: draft.preferred_major.trim().to_string(),
            opening_date: draft.opening_date,
            closing_date: draft.closing_date,
            status: InternshipStatus::Pending,
            representative_id: representative.id.clone(),
            company_id: representative.company_id.clone(),
            company_name: representative.company_name.clone(),
            remaining_slots: slots,
            visible: false,
        };

        self.ctx
            .store
            .commit(ChangeSet::new().internship(internship.clone()).sequence(mark))?;

        info!(internship = %internship.id, representative = %representative.id, slots, "internship created");
        self.ctx.announce(format!(
            "{} submitted internship {} ({}) for approval",
            representative.name, internship.id, internship.title
        ));
        Ok(internship)
    }

    /// Staff approval (forces visibility on) or rejection of a Pending posting.
    pub fn decide(
        &self,
        staff: &StaffMember,
        internship_id: &InternshipId,
        approve: bool,
    ) -> Result<Internship, PlacementError> {
        let _guard = self.ctx.exclusive();

        let mut internship = self.fetch(internship_id)?;
        if internship.status != InternshipStatus::Pending {
            return Err(AuthorizationError::InternshipAlreadyDecided {
                id: internship.id,
                status: internship.status,
            }
            .into());
        }

        if approve {
            internship.status = InternshipStatus::Approved;
            internship.visible = true;
        } else {
            internship.status = InternshipStatus::Rejected;
            internship.visible = false;
        }

        self.ctx
            .store
            .commit(ChangeSet::new().internship(internship.clone()))?;

        info!(internship = %internship.id, staff = %staff.id, status = internship.status.label(), "internship decided");
        self.ctx.announce(format!(
            "{} marked internship {} as {}",
            staff.name,
            internship.id,
            internship.status.label()
        ));
        Ok(internship)
    }

    /// Stage visibility on a posting that is still Pending.
    pub fn set_visibility(
        &self,
        representative: &CompanyRepresentative,
        internship_id: &InternshipId,
        visible: bool,
    ) -> Result<Internship, PlacementError> {
        let _guard = self.ctx.exclusive();

        let mut internship = self.editable(representative, internship_id)?;
        internship.visible = visible;

        self.ctx
            .store
            .commit(ChangeSet::new().internship(internship.clone()))?;

        info!(internship = %internship.id, visible, "internship visibility changed");
        self.ctx.announce(format!(
            "{} set internship {} visibility to {}",
            representative.name,
            internship.id,
            if visible { "on" } else { "off" }
        ));
        Ok(internship)
    }

    /// Replace the editable fields of a Pending posting.
    pub fn modify(
        &self,
        representative: &CompanyRepresentative,
        internship_id: &InternshipId,
        draft: InternshipDraft,
    ) -> Result<Internship, PlacementError> {
        let _guard = self.ctx.exclusive();

        let mut internship = self.editable(representative, internship_id)?;
        let slots = validate_draft(&draft)?;

        internship.title = draft.title.trim().to_string();
        internship.description = draft.description.trim().to_string();
        internship.level = draft.level;
        internship.preferred_major = draft.preferred_major.trim().to_string();
        internship.opening_date = draft.opening_date;
        internship.closing_date = draft.closing_date;
        internship.remaining_slots = slots;

        self.ctx
            .store
            .commit(ChangeSet::new().internship(internship.clone()))?;

        info!(internship = %internship.id, "internship modified");
        self.ctx.announce(format!(
            "{} updated internship {} ({})",
            representative.name, internship.id, internship.title
        ));
        Ok(internship)
    }

    /// Delete a Pending posting.
    pub fn remove(
        &self,
        representative: &CompanyRepresentative,
        internship_id: &InternshipId,
    ) -> Result<(), PlacementError> {
        let _guard = self.ctx.exclusive();

        let internship = self.editable(representative, internship_id)?;
        self.ctx
            .store
            .commit(ChangeSet::new().remove_internship(internship.id.clone()))?;

        info!(internship = %internship.id, "internship removed");
        self.ctx.announce(format!(
            "{} withdrew internship {} before review",
            representative.name, internship.id
        ));
        Ok(())
    }

    pub fn get(&self, internship_id: &InternshipId) -> Result<Internship, PlacementError> {
        self.fetch(internship_id)
    }

    /// Postings a student may browse, ordered by title.
    pub fn visible_for_student(&self, student: &Student) -> Result<Vec<Internship>, PlacementError> {
        let mut listings = self
            .ctx
            .store
            .internships_where(&|record| record.is_open_to_students() && is_eligible(student, record))?;
        listings.sort_by(|left, right| {
            left.title
                .cmp(&right.title)
                .then_with(|| left.id.cmp(&right.id))
        });
        Ok(listings)
    }

    /// Every posting owned by the representative, ordered by identifier.
    pub fn by_representative(
        &self,
        representative_id: &RepresentativeId,
    ) -> Result<Vec<Internship>, PlacementError> {
        let mut listings = self
            .ctx
            .store
            .internships_where(&|record| &record.representative_id == representative_id)?;
        listings.sort_by(|left, right| left.id.cmp(&right.id));
        Ok(listings)
    }

    /// Postings awaiting a staff decision, ordered by identifier.
    pub fn pending_review(&self, _staff: &StaffMember) -> Result<Vec<Internship>, PlacementError> {
        let mut listings = self
            .ctx
            .store
            .internships_where(&|record| record.status == InternshipStatus::Pending)?;
        listings.sort_by(|left, right| left.id.cmp(&right.id));
        Ok(listings)
    }

    fn fetch(&self, internship_id: &InternshipId) -> Result<Internship, PlacementError> {
        self.ctx
            .store
            .internship(internship_id)?
            .ok_or_else(|| NotFoundError::Internship(internship_id.clone()).into())
    }

    fn editable(
        &self,
        representative: &CompanyRepresentative,
        internship_id: &InternshipId,
    ) -> Result<Internship, PlacementError> {
        let internship = self.fetch(internship_id)?;
        if !internship.is_owned_by(representative) {
            return Err(AuthorizationError::NotOwner(internship.id).into());
        }
        if internship.status != InternshipStatus::Pending {
            return Err(AuthorizationError::InternshipLocked {
                id: internship.id,
                status: internship.status,
            }
            .into());
        }
        Ok(internship)
    }
}

/// Check a draft and return its slot count as stored.
pub(crate) fn validate_draft(draft: &InternshipDraft) -> Result<u32, ValidationError> {
    if draft.title.trim().is_empty() {
        return Err(ValidationError::EmptyField { field: "title" });
    }
    if draft.description.trim().is_empty() {
        return Err(ValidationError::EmptyField {
            field: "description",
        });
    }
    if draft.opening_date >= draft.closing_date {
        return Err(ValidationError::DateOrder);
    }
    if draft.slots < 0 {
        return Err(ValidationError::NegativeSlots { found: draft.slots });
    }
    u32::try_from(draft.slots).map_err(|_| ValidationError::SlotsOverflow { found: draft.slots })
}
