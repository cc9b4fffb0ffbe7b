use tracing::info;

use super::capacity::release_slot;
use super::context::LifecycleContext;
use super::domain::{
    ApplicationId, ApplicationStatus, StaffMember, Student, WithdrawalId, WithdrawalRequest,
    WithdrawalStatus,
};
use super::error::{AuthorizationError, NotFoundError, PlacementError};
use super::notify::NotificationSink;
use super::store::{ChangeSet, PlacementStore};

/// Owns withdrawal requests and the unwinding of an approved withdrawal.
pub struct WithdrawalManager<S: ?Sized, N: ?Sized> {
    ctx: LifecycleContext<S, N>,
}

impl<S, N> WithdrawalManager<S, N>
where
    S: PlacementStore + ?Sized,
    N: NotificationSink + ?Sized,
{
    pub(crate) fn new(ctx: LifecycleContext<S, N>) -> Self {
        Self { ctx }
    }

    /// File a Pending request against one of the student's own applications.
    pub fn request(
        &self,
        student: &Student,
        application_id: &ApplicationId,
    ) -> Result<WithdrawalRequest, PlacementError> {
        let _guard = self.ctx.exclusive();

        let application = self
            .ctx
            .store
            .application(application_id)?
            .ok_or_else(|| NotFoundError::Application(application_id.clone()))?;
        if !application.belongs_to(student) {
            return Err(AuthorizationError::NotApplicant(application.id).into());
        }
        if application.status == ApplicationStatus::Withdrawn {
            return Err(AuthorizationError::ApplicationState {
                id: application.id,
                status: application.status,
            }
            .into());
        }

        let open = self.ctx.store.withdrawals_where(&|record| {
            record.application_id == application.id && record.status == WithdrawalStatus::Pending
        })?;
        if !open.is_empty() {
            return Err(AuthorizationError::WithdrawalPending(application.id).into());
        }

        let (id, mark) = self.ctx.ids.next_withdrawal();
        let request = WithdrawalRequest {
            id,
            application_id: application.id.clone(),
            student_id: student.id.clone(),
            status: WithdrawalStatus::Pending,
            requested_on: self.ctx.today(),
        };

        self.ctx
            .store
            .commit(ChangeSet::new().withdrawal(request.clone()).sequence(mark))?;

        info!(withdrawal = %request.id, application = %application.id, "withdrawal requested");
        self.ctx.announce(format!(
            "{} requested withdrawal of application {} ({})",
            student.name, application.id, request.id
        ));
        Ok(request)
    }

    /// Decide a Pending request once.
    ///
    /// Approval withdraws the application; if the student had accepted it,
    /// the slot goes back to the internship and a Filled posting reopens.
    pub fn decide(
        &self,
        staff: &StaffMember,
        withdrawal_id: &WithdrawalId,
        approve: bool,
    ) -> Result<WithdrawalRequest, PlacementError> {
        let _guard = self.ctx.exclusive();

        let mut request = self
            .ctx
            .store
            .withdrawal(withdrawal_id)?
            .ok_or_else(|| NotFoundError::Withdrawal(withdrawal_id.clone()))?;
        if request.status != WithdrawalStatus::Pending {
            return Err(AuthorizationError::WithdrawalAlreadyDecided(request.id).into());
        }

        if !approve {
            request.status = WithdrawalStatus::Rejected;
            self.ctx
                .store
                .commit(ChangeSet::new().withdrawal(request.clone()))?;

            info!(withdrawal = %request.id, staff = %staff.id, "withdrawal rejected");
            self.ctx.announce(format!(
                "{} rejected withdrawal request {}",
                staff.name, request.id
            ));
            return Ok(request);
        }

        let mut application = self
            .ctx
            .store
            .application(&request.application_id)?
            .ok_or_else(|| NotFoundError::Application(request.application_id.clone()))?;

        let mut changes = ChangeSet::new();
        let mut reopened = None;
        if application.accepted_by_student {
            let mut internship = self
                .ctx
                .store
                .internship(&application.internship_id)?
                .ok_or_else(|| NotFoundError::Internship(application.internship_id.clone()))?;
            release_slot(&mut internship);
            reopened = Some((internship.id.clone(), internship.remaining_slots));
            changes = changes.internship(internship);
        }

        request.status = WithdrawalStatus::Approved;
        application.status = ApplicationStatus::Withdrawn;
        application.accepted_by_student = false;
        changes = changes
            .application(application.clone())
            .withdrawal(request.clone());

        self.ctx.store.commit(changes)?;

        info!(
            withdrawal = %request.id,
            application = %application.id,
            staff = %staff.id,
            slot_released = reopened.is_some(),
            "withdrawal approved"
        );
        self.ctx.announce(format!(
            "{} approved withdrawal request {}; application {} withdrawn",
            staff.name, request.id, application.id
        ));
        if let Some((internship_id, remaining)) = reopened {
            self.ctx.announce(format!(
                "internship {internship_id} has {remaining} slot(s) available again"
            ));
        }
        Ok(request)
    }

    pub fn get(&self, withdrawal_id: &WithdrawalId) -> Result<WithdrawalRequest, PlacementError> {
        self.ctx
            .store
            .withdrawal(withdrawal_id)?
            .ok_or_else(|| NotFoundError::Withdrawal(withdrawal_id.clone()).into())
    }

    /// The student's requests, ordered by identifier.
    pub fn for_student(&self, student: &Student) -> Result<Vec<WithdrawalRequest>, PlacementError> {
        let mut records = self
            .ctx
            .store
            .withdrawals_where(&|record| record.student_id == student.id)?;
        records.sort_by(|left, right| left.id.cmp(&right.id));
        Ok(records)
    }

    /// Requests awaiting a staff decision, ordered by identifier.
    pub fn pending_review(
        &self,
        _staff: &StaffMember,
    ) -> Result<Vec<WithdrawalRequest>, PlacementError> {
        let mut records = self
            .ctx
            .store
            .withdrawals_where(&|record| record.status == WithdrawalStatus::Pending)?;
        records.sort_by(|left, right| left.id.cmp(&right.id));
        Ok(records)
    }
}
