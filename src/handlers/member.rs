use crate::{
    db,
    errors::AppResult,
    extract::{Json, Path, Query},
    models::{
        AsOfQuery, BatchResult, CompleteMembershipRequest, CreateMemberRequest,
        CreatePartialMemberRequest, DeleteMemberRequest, DeletedMember, Invoice, Member,
        MemberDue, MemberListQuery, MemberReceipt, MemberTotals, PayDueRequest,
        RenewMembershipRequest, SetMemberStatusRequest, UpdateMemberFeesRequest,
        UpdateMemberRequest,
    },
    response::ApiResponse,
    services::{billing, members, today},
    state::AppState,
};
use axum::extract::State;
use uuid::Uuid;

/// Register a member with plan and fees (`createMember`)
#[utoipa::path(
    post,
    path = "/api/v1/members",
    request_body = CreateMemberRequest,
    responses(
        (status = 201, description = "Member registered", body = MemberReceipt),
        (status = 400, description = "Invalid member details"),
        (status = 409, description = "Member ID already taken"),
        (status = 422, description = "Initial payment exceeds the fees"),
    ),
    tag = "Members"
)]
pub async fn create_member(
    State(state): State<AppState>,
    Json(body): Json<CreateMemberRequest>,
) -> AppResult<ApiResponse<MemberReceipt>> {
    let registered = members::register_member(&state, body, today()).await?;
    Ok(ApiResponse::created(registered))
}

/// Save identity only, membership pending (`createPartialMember`)
#[utoipa::path(
    post,
    path = "/api/v1/members/partial",
    request_body = CreatePartialMemberRequest,
    responses(
        (status = 201, description = "Partial member saved", body = Member),
        (status = 409, description = "Member ID already taken"),
    ),
    tag = "Members"
)]
pub async fn create_partial_member(
    State(state): State<AppState>,
    Json(body): Json<CreatePartialMemberRequest>,
) -> AppResult<ApiResponse<Member>> {
    let member = members::register_partial_member(&state.db, body).await?;
    Ok(ApiResponse::created(member))
}

/// Add plan and fees to a partial member (`completeMembership`)
#[utoipa::path(
    post,
    path = "/api/v1/members/{member_id}/complete",
    request_body = CompleteMembershipRequest,
    params(("member_id" = Uuid, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Membership completed", body = MemberReceipt),
        (status = 404, description = "Member not found"),
        (status = 409, description = "Member already has a membership"),
    ),
    tag = "Members"
)]
pub async fn complete_membership(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
    Json(body): Json<CompleteMembershipRequest>,
) -> AppResult<ApiResponse<MemberReceipt>> {
    let completed = members::complete_membership(&state, member_id, body, today()).await?;
    Ok(ApiResponse::ok(completed))
}

/// List members, optionally by lifecycle status (`getAllMembers`)
#[utoipa::path(
    get,
    path = "/api/v1/members",
    params(MemberListQuery),
    responses((status = 200, description = "Members", body = Vec<Member>)),
    tag = "Members"
)]
pub async fn list_members(
    State(state): State<AppState>,
    Query(query): Query<MemberListQuery>,
) -> AppResult<ApiResponse<Vec<Member>>> {
    let rows = db::members::list(&state.db, query.status).await?;
    Ok(ApiResponse::ok(rows))
}

/// Get one member (`getMember`)
#[utoipa::path(
    get,
    path = "/api/v1/members/{member_id}",
    params(("member_id" = Uuid, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Member detail", body = Member),
        (status = 404, description = "Member not found"),
    ),
    tag = "Members"
)]
pub async fn get_member(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
) -> AppResult<ApiResponse<Member>> {
    let member = db::members::get(&state.db, member_id).await?;
    Ok(ApiResponse::ok(member))
}

/// Edit profile fields (`updateMember`)
#[utoipa::path(
    patch,
    path = "/api/v1/members/{member_id}",
    request_body = UpdateMemberRequest,
    params(("member_id" = Uuid, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Member updated", body = Member),
        (status = 404, description = "Member not found"),
    ),
    tag = "Members"
)]
pub async fn update_member(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
    Json(body): Json<UpdateMemberRequest>,
) -> AppResult<ApiResponse<Member>> {
    let member = members::update_profile(&state.db, member_id, &body).await?;
    Ok(ApiResponse::ok(member))
}

/// Set active / inactive / frozen (`setMemberStatus`)
#[utoipa::path(
    put,
    path = "/api/v1/members/{member_id}/status",
    request_body = SetMemberStatusRequest,
    params(("member_id" = Uuid, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Status changed", body = Member),
        (status = 400, description = "Status not allowed"),
        (status = 404, description = "Member not found"),
    ),
    tag = "Members"
)]
pub async fn set_member_status(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
    Json(body): Json<SetMemberStatusRequest>,
) -> AppResult<ApiResponse<Member>> {
    let member = members::set_status(&state.db, member_id, body.status).await?;
    Ok(ApiResponse::ok(member))
}

/// Archive and delete a member (`deleteMember`)
#[utoipa::path(
    delete,
    path = "/api/v1/members/{member_id}",
    params(("member_id" = Uuid, Path, description = "Member ID"), DeleteMemberRequest),
    responses(
        (status = 200, description = "Member archived", body = DeletedMember),
        (status = 404, description = "Member not found"),
    ),
    tag = "Members"
)]
pub async fn delete_member(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
    Query(query): Query<DeleteMemberRequest>,
) -> AppResult<ApiResponse<DeletedMember>> {
    let archived = members::delete_member(&state.db, member_id, query.deleted_by).await?;
    Ok(ApiResponse::ok(archived))
}

/// Archive of deleted members (`getDeletedMembers`)
#[utoipa::path(
    get,
    path = "/api/v1/members/deleted",
    responses((status = 200, description = "Deleted members", body = Vec<DeletedMember>)),
    tag = "Members"
)]
pub async fn list_deleted_members(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<DeletedMember>>> {
    let rows = db::members::list_deleted(&state.db).await?;
    Ok(ApiResponse::ok(rows))
}

/// Members with an outstanding current-term invoice (`getMembersWithDue`)
#[utoipa::path(
    get,
    path = "/api/v1/members/with-due",
    responses((status = 200, description = "Members owing money", body = Vec<MemberDue>)),
    tag = "Members"
)]
pub async fn list_members_with_due(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<MemberDue>>> {
    let rows = db::members::list_with_due(&state.db).await?;
    Ok(ApiResponse::ok(rows))
}

/// Invoices of every term
#[utoipa::path(
    get,
    path = "/api/v1/members/{member_id}/invoices",
    params(("member_id" = Uuid, Path, description = "Member ID")),
    responses((status = 200, description = "Invoices", body = Vec<Invoice>)),
    tag = "Members"
)]
pub async fn list_member_invoices(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
) -> AppResult<ApiResponse<Vec<Invoice>>> {
    db::members::get(&state.db, member_id).await?;
    let invoices = db::invoices::list_for_member(&state.db, member_id).await?;
    Ok(ApiResponse::ok(invoices))
}

// ─── Billing ──────────────────────────────────────────────────────────────────

/// Pay against the outstanding due (`payMemberDueAmount`)
#[utoipa::path(
    post,
    path = "/api/v1/members/{member_id}/payments",
    request_body = PayDueRequest,
    params(("member_id" = Uuid, Path, description = "Member ID")),
    responses(
        (status = 201, description = "Payment recorded", body = MemberReceipt),
        (status = 400, description = "Amount must be positive"),
        (status = 404, description = "Member not found"),
        (status = 422, description = "Amount exceeds due"),
    ),
    tag = "Billing"
)]
pub async fn pay_member_due(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
    Json(body): Json<PayDueRequest>,
) -> AppResult<ApiResponse<MemberReceipt>> {
    let paid = billing::record_payment(&state, member_id, body).await?;
    Ok(ApiResponse::created(paid))
}

/// Start a new term (`renewMembership`)
#[utoipa::path(
    post,
    path = "/api/v1/members/{member_id}/renew",
    request_body = RenewMembershipRequest,
    params(("member_id" = Uuid, Path, description = "Member ID")),
    responses(
        (status = 201, description = "Membership renewed", body = MemberReceipt),
        (status = 400, description = "Invalid plan or fees"),
        (status = 404, description = "Member not found"),
    ),
    tag = "Billing"
)]
pub async fn renew_membership(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
    Json(body): Json<RenewMembershipRequest>,
) -> AppResult<ApiResponse<MemberReceipt>> {
    let renewed = billing::renew_membership(&state, member_id, body, today()).await?;
    Ok(ApiResponse::created(renewed))
}

/// Change registration fee, package fee or discount (`updateMemberFees`)
#[utoipa::path(
    put,
    path = "/api/v1/members/{member_id}/fees",
    request_body = UpdateMemberFeesRequest,
    params(("member_id" = Uuid, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Fees updated", body = Member),
        (status = 400, description = "Fees below amount already paid"),
        (status = 404, description = "Member not found"),
    ),
    tag = "Billing"
)]
pub async fn update_member_fees(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
    Json(body): Json<UpdateMemberFeesRequest>,
) -> AppResult<ApiResponse<Member>> {
    let member = billing::update_member_fees(&state.db, member_id, body).await?;
    Ok(ApiResponse::ok(member))
}

/// Re-derive paid and due from receipts (`recalculateMemberTotals`)
#[utoipa::path(
    post,
    path = "/api/v1/members/{member_id}/recalculate",
    params(("member_id" = Uuid, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Totals", body = MemberTotals),
        (status = 404, description = "Member not found"),
    ),
    tag = "Billing"
)]
pub async fn recalculate_member_totals(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
) -> AppResult<ApiResponse<MemberTotals>> {
    let totals = billing::recalculate_member_totals(&state.db, member_id).await?;
    Ok(ApiResponse::ok(totals))
}

/// Resync every member from receipts (`refreshAllMemberDueAmounts`)
#[utoipa::path(
    post,
    path = "/api/v1/members/refresh-due",
    responses((status = 200, description = "Batch result", body = BatchResult)),
    tag = "Billing"
)]
pub async fn refresh_all_member_due_amounts(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<BatchResult>> {
    let result = billing::refresh_all_member_due_amounts(&state.db).await?;
    Ok(ApiResponse::ok(result))
}

/// Recompute subscription statuses from dates (`updateAllSubscriptionStatuses`)
#[utoipa::path(
    post,
    path = "/api/v1/members/subscription-statuses",
    params(AsOfQuery),
    responses((status = 200, description = "Batch result", body = BatchResult)),
    tag = "Billing"
)]
pub async fn update_subscription_statuses(
    State(state): State<AppState>,
    Query(query): Query<AsOfQuery>,
) -> AppResult<ApiResponse<BatchResult>> {
    let as_of = query.as_of.unwrap_or_else(today);
    let result =
        billing::update_subscription_statuses(&state.db, as_of, state.config.expiring_soon_days)
            .await?;
    Ok(ApiResponse::ok(result))
}
