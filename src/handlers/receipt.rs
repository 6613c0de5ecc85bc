use crate::{
    db,
    errors::AppResult,
    extract::{Json, Path, Query},
    models::{
        CreateReceiptRequest, MemberReceipt, Receipt, ReceiptListQuery, SupersedeReceiptRequest,
    },
    response::ApiResponse,
    services::billing,
    state::AppState,
};
use axum::extract::State;
use uuid::Uuid;

/// Record a member payment as a standalone receipt (`createReceipt`)
#[utoipa::path(
    post,
    path = "/api/v1/receipts",
    request_body = CreateReceiptRequest,
    responses(
        (status = 201, description = "Receipt created", body = MemberReceipt),
        (status = 404, description = "Member not found"),
        (status = 422, description = "Amount exceeds due"),
    ),
    tag = "Receipts"
)]
pub async fn create_receipt(
    State(state): State<AppState>,
    Json(body): Json<CreateReceiptRequest>,
) -> AppResult<ApiResponse<MemberReceipt>> {
    let created = billing::create_receipt(&state, body).await?;
    Ok(ApiResponse::created(created))
}

/// Current versions only (`getAllReceipts`)
#[utoipa::path(
    get,
    path = "/api/v1/receipts",
    params(ReceiptListQuery),
    responses((status = 200, description = "Receipts", body = Vec<Receipt>)),
    tag = "Receipts"
)]
pub async fn list_receipts(
    State(state): State<AppState>,
    Query(query): Query<ReceiptListQuery>,
) -> AppResult<ApiResponse<Vec<Receipt>>> {
    let receipts = db::receipts::list_current(&state.db, query.member_id, query.staff_id).await?;
    Ok(ApiResponse::ok(receipts))
}

#[utoipa::path(
    get,
    path = "/api/v1/receipts/{receipt_id}",
    params(("receipt_id" = Uuid, Path, description = "Receipt ID")),
    responses(
        (status = 200, description = "Receipt", body = Receipt),
        (status = 404, description = "Receipt not found"),
    ),
    tag = "Receipts"
)]
pub async fn get_receipt(
    State(state): State<AppState>,
    Path(receipt_id): Path<Uuid>,
) -> AppResult<ApiResponse<Receipt>> {
    let receipt = db::receipts::get(&state.db, receipt_id).await?;
    Ok(ApiResponse::ok(receipt))
}

/// Every version of the receipt, oldest first (`getReceiptHistory`)
#[utoipa::path(
    get,
    path = "/api/v1/receipts/{receipt_id}/history",
    params(("receipt_id" = Uuid, Path, description = "Any version of the receipt")),
    responses(
        (status = 200, description = "Versions", body = Vec<Receipt>),
        (status = 404, description = "Receipt not found"),
    ),
    tag = "Receipts"
)]
pub async fn receipt_history(
    State(state): State<AppState>,
    Path(receipt_id): Path<Uuid>,
) -> AppResult<ApiResponse<Vec<Receipt>>> {
    let receipt = db::receipts::get(&state.db, receipt_id).await?;
    let versions = db::receipts::history(&state.db, &receipt.receipt_number).await?;
    Ok(ApiResponse::ok(versions))
}

/// Correct a receipt by issuing a new version (`createReceiptVersion`)
#[utoipa::path(
    post,
    path = "/api/v1/receipts/{receipt_id}/supersede",
    request_body = SupersedeReceiptRequest,
    params(("receipt_id" = Uuid, Path, description = "Current version of the receipt")),
    responses(
        (status = 201, description = "New version issued", body = Receipt),
        (status = 404, description = "Receipt not found"),
        (status = 409, description = "Receipt already superseded"),
    ),
    tag = "Receipts"
)]
pub async fn supersede_receipt(
    State(state): State<AppState>,
    Path(receipt_id): Path<Uuid>,
    Json(body): Json<SupersedeReceiptRequest>,
) -> AppResult<ApiResponse<Receipt>> {
    let receipt = billing::supersede_receipt(&state, receipt_id, body).await?;
    Ok(ApiResponse::created(receipt))
}
