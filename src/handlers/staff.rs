use crate::{
    db,
    errors::{AppError, AppResult},
    extract::{Json, Path, Query},
    models::{
        ActiveOnlyQuery, CreateStaffRequest, PayStaffRequest, Receipt, Staff,
        UpdateStaffRequest, UpdateStaffSalaryRequest,
    },
    response::ApiResponse,
    services::staff,
    state::AppState,
};
use axum::extract::State;
use chrono::Utc;
use uuid::Uuid;

/// Add a trainer, receptionist or other staff member
#[utoipa::path(
    post,
    path = "/api/v1/staff",
    request_body = CreateStaffRequest,
    responses(
        (status = 201, description = "Staff member added", body = Staff),
        (status = 400, description = "Invalid staff details"),
    ),
    tag = "Staff"
)]
pub async fn create_staff(
    State(state): State<AppState>,
    Json(body): Json<CreateStaffRequest>,
) -> AppResult<ApiResponse<Staff>> {
    let staff = staff::create_staff(&state.db, body).await?;
    Ok(ApiResponse::created(staff))
}

#[utoipa::path(
    get,
    path = "/api/v1/staff",
    params(ActiveOnlyQuery),
    responses((status = 200, description = "Staff", body = Vec<Staff>)),
    tag = "Staff"
)]
pub async fn list_staff(
    State(state): State<AppState>,
    Query(query): Query<ActiveOnlyQuery>,
) -> AppResult<ApiResponse<Vec<Staff>>> {
    let staff = db::staff::list(&state.db, query.active_only).await?;
    Ok(ApiResponse::ok(staff))
}

#[utoipa::path(
    get,
    path = "/api/v1/staff/{staff_id}",
    params(("staff_id" = Uuid, Path, description = "Staff ID")),
    responses(
        (status = 200, description = "Staff member", body = Staff),
        (status = 404, description = "Staff member not found"),
    ),
    tag = "Staff"
)]
pub async fn get_staff(
    State(state): State<AppState>,
    Path(staff_id): Path<Uuid>,
) -> AppResult<ApiResponse<Staff>> {
    let staff = db::staff::get(&state.db, staff_id).await?;
    Ok(ApiResponse::ok(staff))
}

#[utoipa::path(
    patch,
    path = "/api/v1/staff/{staff_id}",
    request_body = UpdateStaffRequest,
    params(("staff_id" = Uuid, Path, description = "Staff ID")),
    responses(
        (status = 200, description = "Staff member updated", body = Staff),
        (status = 404, description = "Staff member not found"),
    ),
    tag = "Staff"
)]
pub async fn update_staff(
    State(state): State<AppState>,
    Path(staff_id): Path<Uuid>,
    Json(body): Json<UpdateStaffRequest>,
) -> AppResult<ApiResponse<Staff>> {
    let staff = db::staff::update_profile(&state.db, staff_id, &body, Utc::now())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Staff member {} not found", staff_id)))?;
    Ok(ApiResponse::ok(staff))
}

/// Deactivate a staff member; past receipts and attendance are kept
#[utoipa::path(
    delete,
    path = "/api/v1/staff/{staff_id}",
    params(("staff_id" = Uuid, Path, description = "Staff ID")),
    responses(
        (status = 200, description = "Staff member deactivated", body = Staff),
        (status = 404, description = "Staff member not found"),
    ),
    tag = "Staff"
)]
pub async fn deactivate_staff(
    State(state): State<AppState>,
    Path(staff_id): Path<Uuid>,
) -> AppResult<ApiResponse<Staff>> {
    let staff = staff::deactivate_staff(&state.db, staff_id).await?;
    Ok(ApiResponse::ok(staff))
}

/// Change the monthly salary (`updateStaffSalary`)
#[utoipa::path(
    put,
    path = "/api/v1/staff/{staff_id}/salary",
    request_body = UpdateStaffSalaryRequest,
    params(("staff_id" = Uuid, Path, description = "Staff ID")),
    responses(
        (status = 200, description = "Salary updated", body = Staff),
        (status = 404, description = "Staff member not found"),
    ),
    tag = "Staff"
)]
pub async fn update_staff_salary(
    State(state): State<AppState>,
    Path(staff_id): Path<Uuid>,
    Json(body): Json<UpdateStaffSalaryRequest>,
) -> AppResult<ApiResponse<Staff>> {
    let staff = staff::update_staff_salary(&state.db, staff_id, body).await?;
    Ok(ApiResponse::ok(staff))
}

/// Pay salary or a bonus (`payStaffSalary`)
#[utoipa::path(
    post,
    path = "/api/v1/staff/{staff_id}/payments",
    request_body = PayStaffRequest,
    params(("staff_id" = Uuid, Path, description = "Staff ID")),
    responses(
        (status = 201, description = "Payout recorded", body = Receipt),
        (status = 400, description = "Invalid payout"),
        (status = 404, description = "Staff member not found"),
    ),
    tag = "Staff"
)]
pub async fn pay_staff(
    State(state): State<AppState>,
    Path(staff_id): Path<Uuid>,
    Json(body): Json<PayStaffRequest>,
) -> AppResult<ApiResponse<Receipt>> {
    let receipt = staff::pay_staff_salary(&state, staff_id, body).await?;
    Ok(ApiResponse::created(receipt))
}
