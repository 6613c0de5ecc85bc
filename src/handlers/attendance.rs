use crate::{
    db::{self, attendance::Roster},
    errors::{AppError, AppResult},
    extract::{Path, Query},
    models::{Attendance, AttendanceDateQuery},
    response::ApiResponse,
    services::today,
    state::AppState,
};
use axum::extract::State;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

/// Opens today's interval unless one is already open.
async fn check_in(state: &AppState, roster: Roster, person_id: Uuid) -> AppResult<Attendance> {
    let date = today();
    let mut tx = state.db.begin().await?;
    match roster {
        Roster::Members => {
            db::members::get(&mut *tx, person_id).await?;
        }
        Roster::Staff => {
            let staff = db::staff::get(&mut *tx, person_id).await?;
            if !staff.is_active {
                return Err(AppError::BadRequest(format!(
                    "{} is no longer on staff",
                    staff.full_name
                )));
            }
        }
    }
    if db::attendance::find_open(&mut *tx, roster, person_id, date)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Already checked in today".to_string()));
    }
    let row = db::attendance::insert(&mut *tx, roster, person_id, date, Utc::now()).await?;
    tx.commit().await?;

    info!("{:?} check-in for {} on {}", roster, person_id, date);
    Ok(row)
}

async fn check_out(state: &AppState, roster: Roster, person_id: Uuid) -> AppResult<Attendance> {
    let mut tx = state.db.begin().await?;
    let open = db::attendance::find_open(&mut *tx, roster, person_id, today())
        .await?
        .ok_or_else(|| AppError::BadRequest("No open check-in for today".to_string()))?;
    let row = db::attendance::close(&mut *tx, roster, open.id, Utc::now()).await?;
    tx.commit().await?;
    Ok(row)
}

// ─── Members ──────────────────────────────────────────────────────────────────

#[utoipa::path(
    post,
    path = "/api/v1/members/{member_id}/check-in",
    params(("member_id" = Uuid, Path, description = "Member ID")),
    responses(
        (status = 201, description = "Checked in", body = Attendance),
        (status = 404, description = "Member not found"),
        (status = 409, description = "Already checked in today"),
    ),
    tag = "Attendance"
)]
pub async fn check_in_member(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
) -> AppResult<ApiResponse<Attendance>> {
    let row = check_in(&state, Roster::Members, member_id).await?;
    Ok(ApiResponse::created(row))
}

#[utoipa::path(
    post,
    path = "/api/v1/members/{member_id}/check-out",
    params(("member_id" = Uuid, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Checked out", body = Attendance),
        (status = 400, description = "No open check-in"),
    ),
    tag = "Attendance"
)]
pub async fn check_out_member(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
) -> AppResult<ApiResponse<Attendance>> {
    let row = check_out(&state, Roster::Members, member_id).await?;
    Ok(ApiResponse::ok(row))
}

/// Member check-ins for one day (`getAttendanceByDate`)
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(AttendanceDateQuery),
    responses((status = 200, description = "Attendance", body = Vec<Attendance>)),
    tag = "Attendance"
)]
pub async fn member_attendance_by_date(
    State(state): State<AppState>,
    Query(query): Query<AttendanceDateQuery>,
) -> AppResult<ApiResponse<Vec<Attendance>>> {
    let date = query.date.unwrap_or_else(today);
    let rows = db::attendance::list_by_date(&state.db, Roster::Members, date).await?;
    Ok(ApiResponse::ok(rows))
}

#[utoipa::path(
    get,
    path = "/api/v1/members/{member_id}/attendance",
    params(("member_id" = Uuid, Path, description = "Member ID")),
    responses((status = 200, description = "Attendance", body = Vec<Attendance>)),
    tag = "Attendance"
)]
pub async fn member_attendance(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
) -> AppResult<ApiResponse<Vec<Attendance>>> {
    let rows = db::attendance::list_for_person(&state.db, Roster::Members, member_id).await?;
    Ok(ApiResponse::ok(rows))
}

// ─── Staff ────────────────────────────────────────────────────────────────────

#[utoipa::path(
    post,
    path = "/api/v1/staff/{staff_id}/check-in",
    params(("staff_id" = Uuid, Path, description = "Staff ID")),
    responses(
        (status = 201, description = "Checked in", body = Attendance),
        (status = 404, description = "Staff member not found"),
        (status = 409, description = "Already checked in today"),
    ),
    tag = "Attendance"
)]
pub async fn check_in_staff(
    State(state): State<AppState>,
    Path(staff_id): Path<Uuid>,
) -> AppResult<ApiResponse<Attendance>> {
    let row = check_in(&state, Roster::Staff, staff_id).await?;
    Ok(ApiResponse::created(row))
}

#[utoipa::path(
    post,
    path = "/api/v1/staff/{staff_id}/check-out",
    params(("staff_id" = Uuid, Path, description = "Staff ID")),
    responses(
        (status = 200, description = "Checked out", body = Attendance),
        (status = 400, description = "No open check-in"),
    ),
    tag = "Attendance"
)]
pub async fn check_out_staff(
    State(state): State<AppState>,
    Path(staff_id): Path<Uuid>,
) -> AppResult<ApiResponse<Attendance>> {
    let row = check_out(&state, Roster::Staff, staff_id).await?;
    Ok(ApiResponse::ok(row))
}

#[utoipa::path(
    get,
    path = "/api/v1/staff-attendance",
    params(AttendanceDateQuery),
    responses((status = 200, description = "Staff attendance", body = Vec<Attendance>)),
    tag = "Attendance"
)]
pub async fn staff_attendance_by_date(
    State(state): State<AppState>,
    Query(query): Query<AttendanceDateQuery>,
) -> AppResult<ApiResponse<Vec<Attendance>>> {
    let date = query.date.unwrap_or_else(today);
    let rows = db::attendance::list_by_date(&state.db, Roster::Staff, date).await?;
    Ok(ApiResponse::ok(rows))
}

#[utoipa::path(
    get,
    path = "/api/v1/staff/{staff_id}/attendance",
    params(("staff_id" = Uuid, Path, description = "Staff ID")),
    responses((status = 200, description = "Staff attendance", body = Vec<Attendance>)),
    tag = "Attendance"
)]
pub async fn staff_attendance(
    State(state): State<AppState>,
    Path(staff_id): Path<Uuid>,
) -> AppResult<ApiResponse<Vec<Attendance>>> {
    let rows = db::attendance::list_for_person(&state.db, Roster::Staff, staff_id).await?;
    Ok(ApiResponse::ok(rows))
}
