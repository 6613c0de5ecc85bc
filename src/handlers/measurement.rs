use crate::{
    db,
    errors::{AppError, AppResult},
    extract::{Json, Path},
    models::{BodyMeasurement, MasterKind, RecordMeasurementRequest},
    response::ApiResponse,
    services::today,
    state::AppState,
};
use axum::extract::State;
use uuid::Uuid;

/// Record one body measurement for a member
#[utoipa::path(
    post,
    path = "/api/v1/members/{member_id}/measurements",
    request_body = RecordMeasurementRequest,
    params(("member_id" = Uuid, Path, description = "Member ID")),
    responses(
        (status = 201, description = "Measurement recorded", body = BodyMeasurement),
        (status = 400, description = "Value is required or field inactive"),
        (status = 404, description = "Member or field not found"),
    ),
    tag = "Members"
)]
pub async fn record_measurement(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
    Json(body): Json<RecordMeasurementRequest>,
) -> AppResult<ApiResponse<BodyMeasurement>> {
    let value = body.value.trim();
    if value.is_empty() {
        return Err(AppError::Validation("value is required".to_string()));
    }

    let mut tx = state.db.begin().await?;
    db::members::get(&mut *tx, member_id).await?;
    let field =
        db::master::get_item(&mut *tx, MasterKind::BodyMeasurementFields, body.field_id).await?;
    if !field.is_active {
        return Err(AppError::BadRequest(format!(
            "Measurement field '{}' is inactive",
            field.name
        )));
    }
    let measured_on = body.measured_on.unwrap_or_else(today);
    let row = db::measurements::insert(&mut tx, member_id, field.id, value, measured_on).await?;
    tx.commit().await?;

    Ok(ApiResponse::created(row))
}

#[utoipa::path(
    get,
    path = "/api/v1/members/{member_id}/measurements",
    params(("member_id" = Uuid, Path, description = "Member ID")),
    responses((status = 200, description = "Measurements", body = Vec<BodyMeasurement>)),
    tag = "Members"
)]
pub async fn list_measurements(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
) -> AppResult<ApiResponse<Vec<BodyMeasurement>>> {
    let rows = db::measurements::list_for_member(&state.db, member_id).await?;
    Ok(ApiResponse::ok(rows))
}
