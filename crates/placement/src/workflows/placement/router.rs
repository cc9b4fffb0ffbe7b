use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::accounts::RepresentativeRegistration;
use super::domain::{
    ApplicationId, ApplicationOutcome, InternshipDraft, InternshipId, RepresentativeId, StaffId,
    StaffMember, Student, StudentId, WithdrawalId,
};
use super::error::PlacementError;
use super::notify::NotificationSink;
use super::report::ReportFilters;
use super::services::PlacementServices;
use super::store::PlacementStore;
use crate::error::AppError;

type Services<S, N> = State<Arc<PlacementServices<S, N>>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InternshipPayload {
    pub representative_id: RepresentativeId,
    #[serde(flatten)]
    pub draft: InternshipDraft,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerQuery {
    pub representative_id: RepresentativeId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisibilityPayload {
    pub representative_id: RepresentativeId,
    pub visible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffDecisionPayload {
    pub staff_id: StaffId,
    pub approve: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationDecisionPayload {
    pub staff_id: StaffId,
    pub outcome: ApplicationOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyPayload {
    pub student_id: StudentId,
    pub internship_id: InternshipId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentPayload {
    pub student_id: StudentId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalPayload {
    pub student_id: StudentId,
    pub application_id: ApplicationId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalPayload {
    pub staff_id: StaffId,
    pub approved: bool,
}

/// Router builder exposing every lifecycle operation over HTTP.
///
/// Callers identify themselves in each request; the router resolves the
/// actor through the account registry before invoking a manager.
pub fn placement_router<S, N>(services: Arc<PlacementServices<S, N>>) -> Router
where
    S: PlacementStore + ?Sized + 'static,
    N: NotificationSink + ?Sized + 'static,
{
    Router::new()
        .route("/api/v1/students", post(register_student_handler::<S, N>))
        .route(
            "/api/v1/students/:student_id/internships",
            get(student_internships_handler::<S, N>),
        )
        .route(
            "/api/v1/students/:student_id/applications",
            get(student_applications_handler::<S, N>),
        )
        .route(
            "/api/v1/students/:student_id/withdrawals",
            get(student_withdrawals_handler::<S, N>),
        )
        .route(
            "/api/v1/representatives",
            post(register_representative_handler::<S, N>),
        )
        .route(
            "/api/v1/representatives/:representative_id/approval",
            post(representative_approval_handler::<S, N>),
        )
        .route(
            "/api/v1/representatives/:representative_id/internships",
            get(representative_internships_handler::<S, N>),
        )
        .route("/api/v1/staff", post(register_staff_handler::<S, N>))
        .route(
            "/api/v1/staff/:staff_id/review/internships",
            get(review_internships_handler::<S, N>),
        )
        .route(
            "/api/v1/staff/:staff_id/review/applications",
            get(review_applications_handler::<S, N>),
        )
        .route(
            "/api/v1/staff/:staff_id/review/withdrawals",
            get(review_withdrawals_handler::<S, N>),
        )
        .route(
            "/api/v1/staff/:staff_id/review/representatives",
            get(review_representatives_handler::<S, N>),
        )
        .route("/api/v1/internships", post(create_internship_handler::<S, N>))
        .route(
            "/api/v1/internships/:internship_id",
            get(internship_handler::<S, N>)
                .put(modify_internship_handler::<S, N>)
                .delete(remove_internship_handler::<S, N>),
        )
        .route(
            "/api/v1/internships/:internship_id/applications",
            get(internship_applications_handler::<S, N>),
        )
        .route(
            "/api/v1/internships/:internship_id/visibility",
            post(visibility_handler::<S, N>),
        )
        .route(
            "/api/v1/internships/:internship_id/decision",
            post(internship_decision_handler::<S, N>),
        )
        .route("/api/v1/applications", post(apply_handler::<S, N>))
        .route(
            "/api/v1/applications/:application_id",
            get(application_handler::<S, N>),
        )
        .route(
            "/api/v1/applications/:application_id/decision",
            post(application_decision_handler::<S, N>),
        )
        .route(
            "/api/v1/applications/:application_id/acceptance",
            post(accept_offer_handler::<S, N>),
        )
        .route("/api/v1/withdrawals", post(request_withdrawal_handler::<S, N>))
        .route(
            "/api/v1/withdrawals/:withdrawal_id",
            get(withdrawal_handler::<S, N>),
        )
        .route(
            "/api/v1/withdrawals/:withdrawal_id/decision",
            post(withdrawal_decision_handler::<S, N>),
        )
        .route("/api/v1/reports/summary", get(summary_handler::<S, N>))
        .with_state(services)
}

fn respond<T: Serialize>(status: StatusCode, result: Result<T, PlacementError>) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(err) => {
            debug!(error = %err, "placement request refused");
            AppError::from(err).into_response()
        }
    }
}

pub(crate) async fn register_student_handler<S, N>(
    State(services): Services<S, N>,
    Json(student): Json<Student>,
) -> Response
where
    S: PlacementStore + ?Sized + 'static,
    N: NotificationSink + ?Sized + 'static,
{
    respond(
        StatusCode::CREATED,
        services.accounts.register_student(student),
    )
}

pub(crate) async fn register_representative_handler<S, N>(
    State(services): Services<S, N>,
    Json(registration): Json<RepresentativeRegistration>,
) -> Response
where
    S: PlacementStore + ?Sized + 'static,
    N: NotificationSink + ?Sized + 'static,
{
    respond(
        StatusCode::CREATED,
        services.accounts.register_representative(registration),
    )
}

pub(crate) async fn register_staff_handler<S, N>(
    State(services): Services<S, N>,
    Json(staff): Json<StaffMember>,
) -> Response
where
    S: PlacementStore + ?Sized + 'static,
    N: NotificationSink + ?Sized + 'static,
{
    respond(StatusCode::CREATED, services.accounts.register_staff(staff))
}

pub(crate) async fn representative_approval_handler<S, N>(
    State(services): Services<S, N>,
    Path(representative_id): Path<String>,
    Json(payload): Json<ApprovalPayload>,
) -> Response
where
    S: PlacementStore + ?Sized + 'static,
    N: NotificationSink + ?Sized + 'static,
{
    let id = RepresentativeId(representative_id);
    let result = services
        .accounts
        .staff_member(&payload.staff_id)
        .and_then(|staff| {
            services
                .accounts
                .set_representative_approval(&staff, &id, payload.approved)
        });
    respond(StatusCode::OK, result)
}

pub(crate) async fn student_internships_handler<S, N>(
    State(services): Services<S, N>,
    Path(student_id): Path<String>,
) -> Response
where
    S: PlacementStore + ?Sized + 'static,
    N: NotificationSink + ?Sized + 'static,
{
    let result = services
        .accounts
        .student(&StudentId(student_id))
        .and_then(|student| services.internships.visible_for_student(&student));
    respond(StatusCode::OK, result)
}

pub(crate) async fn student_applications_handler<S, N>(
    State(services): Services<S, N>,
    Path(student_id): Path<String>,
) -> Response
where
    S: PlacementStore + ?Sized + 'static,
    N: NotificationSink + ?Sized + 'static,
{
    let result = services
        .accounts
        .student(&StudentId(student_id))
        .and_then(|student| services.applications.for_student(&student));
    respond(StatusCode::OK, result)
}

pub(crate) async fn student_withdrawals_handler<S, N>(
    State(services): Services<S, N>,
    Path(student_id): Path<String>,
) -> Response
where
    S: PlacementStore + ?Sized + 'static,
    N: NotificationSink + ?Sized + 'static,
{
    let result = services
        .accounts
        .student(&StudentId(student_id))
        .and_then(|student| services.withdrawals.for_student(&student));
    respond(StatusCode::OK, result)
}

pub(crate) async fn representative_internships_handler<S, N>(
    State(services): Services<S, N>,
    Path(representative_id): Path<String>,
) -> Response
where
    S: PlacementStore + ?Sized + 'static,
    N: NotificationSink + ?Sized + 'static,
{
    let result = services
        .accounts
        .representative(&RepresentativeId(representative_id))
        .and_then(|representative| services.internships.by_representative(&representative.id));
    respond(StatusCode::OK, result)
}

pub(crate) async fn review_internships_handler<S, N>(
    State(services): Services<S, N>,
    Path(staff_id): Path<String>,
) -> Response
where
    S: PlacementStore + ?Sized + 'static,
    N: NotificationSink + ?Sized + 'static,
{
    let result = services
        .accounts
        .staff_member(&StaffId(staff_id))
        .and_then(|staff| services.internships.pending_review(&staff));
    respond(StatusCode::OK, result)
}

pub(crate) async fn review_applications_handler<S, N>(
    State(services): Services<S, N>,
    Path(staff_id): Path<String>,
) -> Response
where
    S: PlacementStore + ?Sized + 'static,
    N: NotificationSink + ?Sized + 'static,
{
    let result = services
        .accounts
        .staff_member(&StaffId(staff_id))
        .and_then(|staff| services.applications.pending_review(&staff));
    respond(StatusCode::OK, result)
}

pub(crate) async fn review_withdrawals_handler<S, N>(
    State(services): Services<S, N>,
    Path(staff_id): Path<String>,
) -> Response
where
    S: PlacementStore + ?Sized + 'static,
    N: NotificationSink + ?Sized + 'static,
{
    let result = services
        .accounts
        .staff_member(&StaffId(staff_id))
        .and_then(|staff| services.withdrawals.pending_review(&staff));
    respond(StatusCode::OK, result)
}

pub(crate) async fn review_representatives_handler<S, N>(
    State(services): Services<S, N>,
    Path(staff_id): Path<String>,
) -> Response
where
    S: PlacementStore + ?Sized + 'static,
    N: NotificationSink + ?Sized + 'static,
{
    let result = services
        .accounts
        .staff_member(&StaffId(staff_id))
        .and_then(|staff| services.accounts.pending_representatives(&staff));
    respond(StatusCode::OK, result)
}

pub(crate) async fn internship_handler<S, N>(
    State(services): Services<S, N>,
    Path(internship_id): Path<String>,
) -> Response
where
    S: PlacementStore + ?Sized + 'static,
    N: NotificationSink + ?Sized + 'static,
{
    respond(
        StatusCode::OK,
        services.internships.get(&InternshipId(internship_id)),
    )
}

/// Applications received by a posting, for its owning representative.
pub(crate) async fn internship_applications_handler<S, N>(
    State(services): Services<S, N>,
    Path(internship_id): Path<String>,
    Query(owner): Query<OwnerQuery>,
) -> Response
where
    S: PlacementStore + ?Sized + 'static,
    N: NotificationSink + ?Sized + 'static,
{
    let id = InternshipId(internship_id);
    let result = services
        .accounts
        .representative(&owner.representative_id)
        .and_then(|representative| services.applications.for_internship(&representative, &id));
    respond(StatusCode::OK, result)
}

pub(crate) async fn create_internship_handler<S, N>(
    State(services): Services<S, N>,
    Json(payload): Json<InternshipPayload>,
) -> Response
where
    S: PlacementStore + ?Sized + 'static,
    N: NotificationSink + ?Sized + 'static,
{
    let InternshipPayload {
        representative_id,
        draft,
    } = payload;
    let result = services
        .accounts
        .representative(&representative_id)
        .and_then(|representative| services.internships.create(&representative, draft));
    respond(StatusCode::CREATED, result)
}

pub(crate) async fn modify_internship_handler<S, N>(
    State(services): Services<S, N>,
    Path(internship_id): Path<String>,
    Json(payload): Json<InternshipPayload>,
) -> Response
where
    S: PlacementStore + ?Sized + 'static,
    N: NotificationSink + ?Sized + 'static,
{
    let InternshipPayload {
        representative_id,
        draft,
    } = payload;
    let id = InternshipId(internship_id);
    let result = services
        .accounts
        .representative(&representative_id)
        .and_then(|representative| services.internships.modify(&representative, &id, draft));
    respond(StatusCode::OK, result)
}

pub(crate) async fn remove_internship_handler<S, N>(
    State(services): Services<S, N>,
    Path(internship_id): Path<String>,
    Query(owner): Query<OwnerQuery>,
) -> Response
where
    S: PlacementStore + ?Sized + 'static,
    N: NotificationSink + ?Sized + 'static,
{
    let id = InternshipId(internship_id);
    let result = services
        .accounts
        .representative(&owner.representative_id)
        .and_then(|representative| services.internships.remove(&representative, &id));
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn visibility_handler<S, N>(
    State(services): Services<S, N>,
    Path(internship_id): Path<String>,
    Json(payload): Json<VisibilityPayload>,
) -> Response
where
    S: PlacementStore + ?Sized + 'static,
    N: NotificationSink + ?Sized + 'static,
{
    let id = InternshipId(internship_id);
    let result = services
        .accounts
        .representative(&payload.representative_id)
        .and_then(|representative| {
            services
                .internships
                .set_visibility(&representative, &id, payload.visible)
        });
    respond(StatusCode::OK, result)
}

pub(crate) async fn internship_decision_handler<S, N>(
    State(services): Services<S, N>,
    Path(internship_id): Path<String>,
    Json(payload): Json<StaffDecisionPayload>,
) -> Response
where
    S: PlacementStore + ?Sized + 'static,
    N: NotificationSink + ?Sized + 'static,
{
    let id = InternshipId(internship_id);
    let result = services
        .accounts
        .staff_member(&payload.staff_id)
        .and_then(|staff| services.internships.decide(&staff, &id, payload.approve));
    respond(StatusCode::OK, result)
}

pub(crate) async fn apply_handler<S, N>(
    State(services): Services<S, N>,
    Json(payload): Json<ApplyPayload>,
) -> Response
where
    S: PlacementStore + ?Sized + 'static,
    N: NotificationSink + ?Sized + 'static,
{
    let result = services
        .accounts
        .student(&payload.student_id)
        .and_then(|student| services.applications.apply(&student, &payload.internship_id));
    respond(StatusCode::CREATED, result)
}

pub(crate) async fn application_handler<S, N>(
    State(services): Services<S, N>,
    Path(application_id): Path<String>,
) -> Response
where
    S: PlacementStore + ?Sized + 'static,
    N: NotificationSink + ?Sized + 'static,
{
    respond(
        StatusCode::OK,
        services.applications.get(&ApplicationId(application_id)),
    )
}

pub(crate) async fn application_decision_handler<S, N>(
    State(services): Services<S, N>,
    Path(application_id): Path<String>,
    Json(payload): Json<ApplicationDecisionPayload>,
) -> Response
where
    S: PlacementStore + ?Sized + 'static,
    N: NotificationSink + ?Sized + 'static,
{
    let id = ApplicationId(application_id);
    let result = services
        .accounts
        .staff_member(&payload.staff_id)
        .and_then(|staff| services.applications.decide(&staff, &id, payload.outcome));
    respond(StatusCode::OK, result)
}

pub(crate) async fn accept_offer_handler<S, N>(
    State(services): Services<S, N>,
    Path(application_id): Path<String>,
    Json(payload): Json<StudentPayload>,
) -> Response
where
    S: PlacementStore + ?Sized + 'static,
    N: NotificationSink + ?Sized + 'static,
{
    let id = ApplicationId(application_id);
    let result = services
        .accounts
        .student(&payload.student_id)
        .and_then(|student| services.applications.accept_offer(&student, &id));
    respond(StatusCode::OK, result)
}

pub(crate) async fn request_withdrawal_handler<S, N>(
    State(services): Services<S, N>,
    Json(payload): Json<WithdrawalPayload>,
) -> Response
where
    S: PlacementStore + ?Sized + 'static,
    N: NotificationSink + ?Sized + 'static,
{
    let result = services
        .accounts
        .student(&payload.student_id)
        .and_then(|student| {
            services
                .withdrawals
                .request(&student, &payload.application_id)
        });
    respond(StatusCode::CREATED, result)
}

pub(crate) async fn withdrawal_handler<S, N>(
    State(services): Services<S, N>,
    Path(withdrawal_id): Path<String>,
) -> Response
where
    S: PlacementStore + ?Sized + 'static,
    N: NotificationSink + ?Sized + 'static,
{
    respond(
        StatusCode::OK,
        services.withdrawals.get(&WithdrawalId(withdrawal_id)),
    )
}

pub(crate) async fn withdrawal_decision_handler<S, N>(
    State(services): Services<S, N>,
    Path(withdrawal_id): Path<String>,
    Json(payload): Json<StaffDecisionPayload>,
) -> Response
where
    S: PlacementStore + ?Sized + 'static,
    N: NotificationSink + ?Sized + 'static,
{
    let id = WithdrawalId(withdrawal_id);
    let result = services
        .accounts
        .staff_member(&payload.staff_id)
        .and_then(|staff| services.withdrawals.decide(&staff, &id, payload.approve));
    respond(StatusCode::OK, result)
}

pub(crate) async fn summary_handler<S, N>(
    State(services): Services<S, N>,
    Query(filters): Query<ReportFilters>,
) -> Response
where
    S: PlacementStore + ?Sized + 'static,
    N: NotificationSink + ?Sized + 'static,
{
    let result = services.summary(&filters).map_err(PlacementError::from);
    respond(StatusCode::OK, result)
}
