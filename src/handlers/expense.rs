use crate::{
    db,
    errors::{AppError, AppResult},
    extract::{Json, Path, Query},
    models::{CreateExpenseRequest, DateRangeQuery, Expense, MasterKind},
    response::ApiResponse,
    services::today,
    state::AppState,
};
use axum::extract::State;
use chrono::Utc;
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/api/v1/expenses",
    request_body = CreateExpenseRequest,
    responses(
        (status = 201, description = "Expense recorded", body = Expense),
        (status = 400, description = "Invalid expense"),
        (status = 404, description = "Expense category not found"),
    ),
    tag = "Expenses"
)]
pub async fn create_expense(
    State(state): State<AppState>,
    Json(body): Json<CreateExpenseRequest>,
) -> AppResult<ApiResponse<Expense>> {
    if body.description.trim().is_empty() {
        return Err(AppError::Validation("description is required".to_string()));
    }
    if !body.amount.is_positive() {
        return Err(AppError::Validation(
            "Expense amount must be greater than zero".to_string(),
        ));
    }
    if let Some(category_id) = body.category_id {
        db::master::get_item(&state.db, MasterKind::ExpenseCategories, category_id).await?;
    }

    let expense = Expense {
        id: Uuid::new_v4(),
        category_id: body.category_id,
        description: body.description.trim().to_string(),
        amount: body.amount,
        expense_date: body.expense_date.unwrap_or_else(today),
        payment_type: body.payment_type,
        created_by: body.created_by,
        created_at: Utc::now(),
    };
    let expense = db::expenses::insert(&state.db, &expense).await?;

    info!("Expense of {} recorded: {}", expense.amount, expense.description);
    Ok(ApiResponse::created(expense))
}

/// Expenses, optionally within an inclusive date range
#[utoipa::path(
    get,
    path = "/api/v1/expenses",
    params(DateRangeQuery),
    responses((status = 200, description = "Expenses", body = Vec<Expense>)),
    tag = "Expenses"
)]
pub async fn list_expenses(
    State(state): State<AppState>,
    Query(query): Query<DateRangeQuery>,
) -> AppResult<ApiResponse<Vec<Expense>>> {
    let expenses = db::expenses::list(&state.db, query.from, query.to).await?;
    Ok(ApiResponse::ok(expenses))
}

#[utoipa::path(
    delete,
    path = "/api/v1/expenses/{expense_id}",
    params(("expense_id" = Uuid, Path, description = "Expense ID")),
    responses(
        (status = 200, description = "Expense deleted"),
        (status = 404, description = "Expense not found"),
    ),
    tag = "Expenses"
)]
pub async fn delete_expense(
    State(state): State<AppState>,
    Path(expense_id): Path<Uuid>,
) -> AppResult<ApiResponse<Value>> {
    if db::expenses::delete(&state.db, expense_id).await? == 0 {
        return Err(AppError::NotFound(format!("Expense {} not found", expense_id)));
    }
    Ok(ApiResponse::ok(json!({ "deleted": expense_id })))
}
