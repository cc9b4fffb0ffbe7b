use serde::{Deserialize, Serialize};
use tracing::info;

use super::context::LifecycleContext;
use super::domain::{
    CompanyId, CompanyRepresentative, RepresentativeId, StaffId, StaffMember, Student, StudentId,
};
use super::error::{NotFoundError, PlacementError, ValidationError};
use super::notify::NotificationSink;
use super::store::{ChangeSet, PlacementStore};

const MIN_YEAR: u8 = 1;
const MAX_YEAR: u8 = 4;

/// Sign-up details for a company representative; approval is granted by staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepresentativeRegistration {
    pub id: RepresentativeId,
    pub name: String,
    pub company_id: CompanyId,
    pub company_name: String,
}

/// Registry of the actors that call into the lifecycle managers.
pub struct AccountManager<S: ?Sized, N: ?Sized> {
    ctx: LifecycleContext<S, N>,
}

impl<S, N> AccountManager<S, N>
where
    S: PlacementStore + ?Sized,
    N: NotificationSink + ?Sized,
{
    pub(crate) fn new(ctx: LifecycleContext<S, N>) -> Self {
        Self { ctx }
    }

    pub fn register_student(&self, student: Student) -> Result<Student, PlacementError> {
        require("id", student.id.as_str())?;
        require("name", &student.name)?;
        if !(MIN_YEAR..=MAX_YEAR).contains(&student.year) {
            return Err(ValidationError::YearOutOfRange {
                found: student.year,
            }
            .into());
        }

        let _guard = self.ctx.exclusive();
        if self.ctx.store.student(&student.id)?.is_some() {
            return Err(ValidationError::AccountExists(student.id.to_string()).into());
        }

        self.ctx
            .store
            .commit(ChangeSet::new().student(student.clone()))?;
        info!(student = %student.id, year = student.year, "student registered");
        Ok(student)
    }

    pub fn register_representative(
        &self,
        registration: RepresentativeRegistration,
    ) -> Result<CompanyRepresentative, PlacementError> {
        require("id", registration.id.as_str())?;
        require("name", &registration.name)?;
        require("company_id", registration.company_id.as_str())?;
        require("company_name", &registration.company_name)?;

        let _guard = self.ctx.exclusive();
        if self.ctx.store.representative(&registration.id)?.is_some() {
            return Err(ValidationError::AccountExists(registration.id.to_string()).into());
        }

        let representative = CompanyRepresentative {
            id: registration.id,
            name: registration.name,
            company_id: registration.company_id,
            company_name: registration.company_name,
            approved: false,
        };
        self.ctx
            .store
            .commit(ChangeSet::new().representative(representative.clone()))?;

        info!(representative = %representative.id, company = %representative.company_id, "representative registered");
        self.ctx.announce(format!(
            "{} of {} registered and awaits approval",
            representative.name, representative.company_name
        ));
        Ok(representative)
    }

    pub fn register_staff(&self, staff: StaffMember) -> Result<StaffMember, PlacementError> {
        require("id", staff.id.as_str())?;
        require("name", &staff.name)?;

        let _guard = self.ctx.exclusive();
        if self.ctx.store.staff_member(&staff.id)?.is_some() {
            return Err(ValidationError::AccountExists(staff.id.to_string()).into());
        }

        self.ctx.store.commit(ChangeSet::new().staff(staff.clone()))?;
        info!(staff = %staff.id, "staff member registered");
        Ok(staff)
    }

    /// Grant or revoke a representative's permission to post internships.
    pub fn set_representative_approval(
        &self,
        staff: &StaffMember,
        representative_id: &RepresentativeId,
        approved: bool,
    ) -> Result<CompanyRepresentative, PlacementError> {
        let _guard = self.ctx.exclusive();

        let mut representative = self.representative(representative_id)?;
        representative.approved = approved;
        self.ctx
            .store
            .commit(ChangeSet::new().representative(representative.clone()))?;

        info!(representative = %representative.id, staff = %staff.id, approved, "representative approval changed");
        self.ctx.announce(format!(
            "{} {} representative {}",
            staff.name,
            if approved { "approved" } else { "revoked" },
            representative.id
        ));
        Ok(representative)
    }

    pub fn student(&self, id: &StudentId) -> Result<Student, PlacementError> {
        self.ctx
            .store
            .student(id)?
            .ok_or_else(|| NotFoundError::Student(id.clone()).into())
    }

    pub fn representative(
        &self,
        id: &RepresentativeId,
    ) -> Result<CompanyRepresentative, PlacementError> {
        self.ctx
            .store
            .representative(id)?
            .ok_or_else(|| NotFoundError::Representative(id.clone()).into())
    }

    pub fn staff_member(&self, id: &StaffId) -> Result<StaffMember, PlacementError> {
        self.ctx
            .store
            .staff_member(id)?
            .ok_or_else(|| NotFoundError::Staff(id.clone()).into())
    }

    /// Representatives still waiting for staff approval.
    pub fn pending_representatives(
        &self,
        _staff: &StaffMember,
    ) -> Result<Vec<CompanyRepresentative>, PlacementError> {
        Ok(self
            .ctx
            .store
            .representatives()?
            .into_iter()
            .filter(|record| !record.approved)
            .collect())
    }
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(())
}
