use crate::{
    errors::AppResult,
    extract::Query,
    models::{AsOfQuery, DashboardSummary, ReminderCandidate},
    response::ApiResponse,
    services::{reports, today},
    state::AppState,
};
use axum::extract::State;

/// Active members whose subscription ends within the expiring-soon window
#[utoipa::path(
    get,
    path = "/api/v1/reminders/expiring",
    params(AsOfQuery),
    responses((status = 200, description = "Members to remind", body = Vec<ReminderCandidate>)),
    tag = "Reports"
)]
pub async fn expiring_members(
    State(state): State<AppState>,
    Query(query): Query<AsOfQuery>,
) -> AppResult<ApiResponse<Vec<ReminderCandidate>>> {
    let as_of = query.as_of.unwrap_or_else(today);
    let rows = reports::expiring_members(&state.db, as_of, state.config.expiring_soon_days).await?;
    Ok(ApiResponse::ok(rows))
}

/// Active members who have not checked in lately
#[utoipa::path(
    get,
    path = "/api/v1/reminders/absent",
    params(AsOfQuery),
    responses((status = 200, description = "Members to remind", body = Vec<ReminderCandidate>)),
    tag = "Reports"
)]
pub async fn absent_members(
    State(state): State<AppState>,
    Query(query): Query<AsOfQuery>,
) -> AppResult<ApiResponse<Vec<ReminderCandidate>>> {
    let as_of = query.as_of.unwrap_or_else(today);
    let rows = reports::absent_members(&state.db, as_of, state.config.absent_reminder_days).await?;
    Ok(ApiResponse::ok(rows))
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    params(AsOfQuery),
    responses((status = 200, description = "Front desk summary", body = DashboardSummary)),
    tag = "Reports"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<AsOfQuery>,
) -> AppResult<ApiResponse<DashboardSummary>> {
    let as_of = query.as_of.unwrap_or_else(today);
    let summary = reports::dashboard(&state.db, as_of, state.config.expiring_soon_days).await?;
    Ok(ApiResponse::ok(summary))
}
