use crate::{
    db,
    errors::{AppError, AppResult},
    extract::{Json, Path, Query},
    models::{
        ConvertEnquiryRequest, CreateEnquiryRequest, Enquiry, EnquiryConversion,
        EnquiryListQuery, EnquiryStatus, UpdateEnquiryRequest,
    },
    response::ApiResponse,
    services::members,
    state::AppState,
};
use axum::extract::State;
use chrono::Utc;
use uuid::Uuid;

/// Log a walk-in or phone lead
#[utoipa::path(
    post,
    path = "/api/v1/enquiries",
    request_body = CreateEnquiryRequest,
    responses(
        (status = 201, description = "Enquiry saved", body = Enquiry),
        (status = 400, description = "Name and phone are required"),
    ),
    tag = "Enquiries"
)]
pub async fn create_enquiry(
    State(state): State<AppState>,
    Json(body): Json<CreateEnquiryRequest>,
) -> AppResult<ApiResponse<Enquiry>> {
    if body.full_name.trim().is_empty() || body.phone.trim().is_empty() {
        return Err(AppError::Validation(
            "fullName and phone are required".to_string(),
        ));
    }

    let enquiry = Enquiry {
        id: Uuid::new_v4(),
        full_name: body.full_name.trim().to_string(),
        phone: body.phone.trim().to_string(),
        email: body.email,
        interested_package_id: body.interested_package_id,
        source: body.source,
        notes: body.notes,
        follow_up_date: body.follow_up_date,
        status: EnquiryStatus::Open,
        converted_to_member_id: None,
        created_at: Utc::now(),
    };
    let enquiry = db::enquiries::insert(&state.db, &enquiry).await?;
    Ok(ApiResponse::created(enquiry))
}

#[utoipa::path(
    get,
    path = "/api/v1/enquiries",
    params(EnquiryListQuery),
    responses((status = 200, description = "Enquiries", body = Vec<Enquiry>)),
    tag = "Enquiries"
)]
pub async fn list_enquiries(
    State(state): State<AppState>,
    Query(query): Query<EnquiryListQuery>,
) -> AppResult<ApiResponse<Vec<Enquiry>>> {
    let enquiries = db::enquiries::list(&state.db, query.status).await?;
    Ok(ApiResponse::ok(enquiries))
}

#[utoipa::path(
    get,
    path = "/api/v1/enquiries/{enquiry_id}",
    params(("enquiry_id" = Uuid, Path, description = "Enquiry ID")),
    responses(
        (status = 200, description = "Enquiry", body = Enquiry),
        (status = 404, description = "Enquiry not found"),
    ),
    tag = "Enquiries"
)]
pub async fn get_enquiry(
    State(state): State<AppState>,
    Path(enquiry_id): Path<Uuid>,
) -> AppResult<ApiResponse<Enquiry>> {
    let enquiry = db::enquiries::get(&state.db, enquiry_id).await?;
    Ok(ApiResponse::ok(enquiry))
}

#[utoipa::path(
    patch,
    path = "/api/v1/enquiries/{enquiry_id}",
    request_body = UpdateEnquiryRequest,
    params(("enquiry_id" = Uuid, Path, description = "Enquiry ID")),
    responses(
        (status = 200, description = "Enquiry updated", body = Enquiry),
        (status = 404, description = "Enquiry not found"),
    ),
    tag = "Enquiries"
)]
pub async fn update_enquiry(
    State(state): State<AppState>,
    Path(enquiry_id): Path<Uuid>,
    Json(body): Json<UpdateEnquiryRequest>,
) -> AppResult<ApiResponse<Enquiry>> {
    let enquiry = db::enquiries::update(&state.db, enquiry_id, &body)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Enquiry {} not found", enquiry_id)))?;
    Ok(ApiResponse::ok(enquiry))
}

/// Mark a lead as lost
#[utoipa::path(
    post,
    path = "/api/v1/enquiries/{enquiry_id}/close",
    params(("enquiry_id" = Uuid, Path, description = "Enquiry ID")),
    responses(
        (status = 200, description = "Enquiry closed", body = Enquiry),
        (status = 404, description = "Enquiry not found"),
        (status = 409, description = "Enquiry already converted"),
    ),
    tag = "Enquiries"
)]
pub async fn close_enquiry(
    State(state): State<AppState>,
    Path(enquiry_id): Path<Uuid>,
) -> AppResult<ApiResponse<Enquiry>> {
    let enquiry = db::enquiries::get(&state.db, enquiry_id).await?;
    if enquiry.status == EnquiryStatus::Converted {
        return Err(AppError::Conflict(
            "Enquiry has already been converted".to_string(),
        ));
    }
    let enquiry =
        db::enquiries::set_status(&state.db, enquiry_id, EnquiryStatus::Closed, None).await?;
    Ok(ApiResponse::ok(enquiry))
}

/// Turn a lead into a partial member (`convertEnquiryToMember`)
#[utoipa::path(
    post,
    path = "/api/v1/enquiries/{enquiry_id}/convert",
    request_body = ConvertEnquiryRequest,
    params(("enquiry_id" = Uuid, Path, description = "Enquiry ID")),
    responses(
        (status = 201, description = "Member created from enquiry", body = EnquiryConversion),
        (status = 404, description = "Enquiry not found"),
        (status = 409, description = "Enquiry is not open"),
    ),
    tag = "Enquiries"
)]
pub async fn convert_enquiry(
    State(state): State<AppState>,
    Path(enquiry_id): Path<Uuid>,
    Json(body): Json<ConvertEnquiryRequest>,
) -> AppResult<ApiResponse<EnquiryConversion>> {
    let conversion = members::convert_enquiry(&state.db, enquiry_id, body).await?;
    Ok(ApiResponse::created(conversion))
}
