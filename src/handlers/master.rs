//! Reference data the front desk picks from: packages, tax settings and the
//! simple named lists keyed by [`MasterKind`].

use crate::{
    db,
    errors::{AppError, AppResult},
    extract::{Json, Path, Query},
    models::{
        ActiveOnlyQuery, MasterItem, MasterKind, Money, Package, TaxSetting, TaxSettingView,
        UpsertMasterItemRequest, UpsertPackageRequest, UpsertTaxSettingRequest,
    },
    response::ApiResponse,
    state::AppState,
};
use axum::extract::State;
use chrono::Utc;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use uuid::Uuid;

fn required_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }
    Ok(name.to_string())
}

fn validate_package(body: &UpsertPackageRequest) -> AppResult<String> {
    let name = required_name(&body.name)?;
    if body.duration_months < 1 {
        return Err(AppError::Validation(
            "durationMonths must be at least 1".to_string(),
        ));
    }
    if body.price < Money::ZERO {
        return Err(AppError::Validation("price cannot be negative".to_string()));
    }
    Ok(name)
}

/// Percent with up to two decimals, stored as basis points.
fn rate_bps(rate_percent: Decimal) -> AppResult<i64> {
    if rate_percent < Decimal::ZERO || rate_percent > Decimal::ONE_HUNDRED {
        return Err(AppError::Validation(
            "ratePercent must be between 0 and 100".to_string(),
        ));
    }
    (rate_percent * Decimal::ONE_HUNDRED)
        .round()
        .to_i64()
        .ok_or_else(|| AppError::Validation("ratePercent is out of range".to_string()))
}

// ─── Packages ─────────────────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/api/v1/master/packages",
    params(ActiveOnlyQuery),
    responses((status = 200, description = "Packages", body = Vec<Package>)),
    tag = "Master Data"
)]
pub async fn list_packages(
    State(state): State<AppState>,
    Query(query): Query<ActiveOnlyQuery>,
) -> AppResult<ApiResponse<Vec<Package>>> {
    let packages = db::master::list_packages(&state.db, query.active_only).await?;
    Ok(ApiResponse::ok(packages))
}

#[utoipa::path(
    post,
    path = "/api/v1/master/packages",
    request_body = UpsertPackageRequest,
    responses(
        (status = 201, description = "Package created", body = Package),
        (status = 409, description = "Package name already exists"),
    ),
    tag = "Master Data"
)]
pub async fn create_package(
    State(state): State<AppState>,
    Json(body): Json<UpsertPackageRequest>,
) -> AppResult<ApiResponse<Package>> {
    let package = Package {
        id: Uuid::new_v4(),
        name: validate_package(&body)?,
        duration_months: body.duration_months,
        price: body.price,
        is_active: true,
        created_at: Utc::now(),
    };
    let package = db::master::insert_package(&state.db, &package).await?;
    Ok(ApiResponse::created(package))
}

/// Existing members keep the fees they signed up with
#[utoipa::path(
    put,
    path = "/api/v1/master/packages/{package_id}",
    request_body = UpsertPackageRequest,
    params(("package_id" = Uuid, Path, description = "Package ID")),
    responses(
        (status = 200, description = "Package updated", body = Package),
        (status = 404, description = "Package not found"),
    ),
    tag = "Master Data"
)]
pub async fn update_package(
    State(state): State<AppState>,
    Path(package_id): Path<Uuid>,
    Json(body): Json<UpsertPackageRequest>,
) -> AppResult<ApiResponse<Package>> {
    let current = db::master::find_package(&state.db, package_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Package {} not found", package_id)))?;
    let package = Package {
        name: validate_package(&body)?,
        duration_months: body.duration_months,
        price: body.price,
        ..current
    };
    let package = db::master::update_package(&state.db, &package).await?;
    Ok(ApiResponse::ok(package))
}

#[utoipa::path(
    post,
    path = "/api/v1/master/packages/{package_id}/toggle",
    params(("package_id" = Uuid, Path, description = "Package ID")),
    responses(
        (status = 200, description = "Active flag flipped", body = Package),
        (status = 404, description = "Package not found"),
    ),
    tag = "Master Data"
)]
pub async fn toggle_package(
    State(state): State<AppState>,
    Path(package_id): Path<Uuid>,
) -> AppResult<ApiResponse<Package>> {
    let package = db::master::toggle_package(&state.db, package_id).await?;
    Ok(ApiResponse::ok(package))
}

// ─── Tax settings ─────────────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/api/v1/master/tax-settings",
    params(ActiveOnlyQuery),
    responses((status = 200, description = "Tax settings", body = Vec<TaxSettingView>)),
    tag = "Master Data"
)]
pub async fn list_tax_settings(
    State(state): State<AppState>,
    Query(query): Query<ActiveOnlyQuery>,
) -> AppResult<ApiResponse<Vec<TaxSettingView>>> {
    let rows = db::master::list_tax_settings(&state.db, query.active_only).await?;
    Ok(ApiResponse::ok(rows.into_iter().map(TaxSettingView::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/v1/master/tax-settings",
    request_body = UpsertTaxSettingRequest,
    responses(
        (status = 201, description = "Tax setting created", body = TaxSettingView),
        (status = 400, description = "Rate out of range"),
        (status = 409, description = "Tax setting name already exists"),
    ),
    tag = "Master Data"
)]
pub async fn create_tax_setting(
    State(state): State<AppState>,
    Json(body): Json<UpsertTaxSettingRequest>,
) -> AppResult<ApiResponse<TaxSettingView>> {
    let tax = TaxSetting {
        id: Uuid::new_v4(),
        name: required_name(&body.name)?,
        rate_bps: rate_bps(body.rate_percent)?,
        is_active: true,
        created_at: Utc::now(),
    };
    let tax = db::master::insert_tax_setting(&state.db, &tax).await?;
    Ok(ApiResponse::created(tax.into()))
}

#[utoipa::path(
    put,
    path = "/api/v1/master/tax-settings/{tax_id}",
    request_body = UpsertTaxSettingRequest,
    params(("tax_id" = Uuid, Path, description = "Tax setting ID")),
    responses(
        (status = 200, description = "Tax setting updated", body = TaxSettingView),
        (status = 404, description = "Tax setting not found"),
    ),
    tag = "Master Data"
)]
pub async fn update_tax_setting(
    State(state): State<AppState>,
    Path(tax_id): Path<Uuid>,
    Json(body): Json<UpsertTaxSettingRequest>,
) -> AppResult<ApiResponse<TaxSettingView>> {
    let name = required_name(&body.name)?;
    let bps = rate_bps(body.rate_percent)?;
    let tax = db::master::update_tax_setting(&state.db, tax_id, &name, bps).await?;
    Ok(ApiResponse::ok(tax.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/master/tax-settings/{tax_id}/toggle",
    params(("tax_id" = Uuid, Path, description = "Tax setting ID")),
    responses(
        (status = 200, description = "Active flag flipped", body = TaxSettingView),
        (status = 404, description = "Tax setting not found"),
    ),
    tag = "Master Data"
)]
pub async fn toggle_tax_setting(
    State(state): State<AppState>,
    Path(tax_id): Path<Uuid>,
) -> AppResult<ApiResponse<TaxSettingView>> {
    let tax = db::master::toggle_tax_setting(&state.db, tax_id).await?;
    Ok(ApiResponse::ok(tax.into()))
}

// ─── Named lists ──────────────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/api/v1/master/{kind}",
    params(("kind" = MasterKind, Path, description = "Which list"), ActiveOnlyQuery),
    responses((status = 200, description = "Items", body = Vec<MasterItem>)),
    tag = "Master Data"
)]
pub async fn list_items(
    State(state): State<AppState>,
    Path(kind): Path<MasterKind>,
    Query(query): Query<ActiveOnlyQuery>,
) -> AppResult<ApiResponse<Vec<MasterItem>>> {
    let items = db::master::list_items(&state.db, kind, query.active_only).await?;
    Ok(ApiResponse::ok(items))
}

#[utoipa::path(
    post,
    path = "/api/v1/master/{kind}",
    request_body = UpsertMasterItemRequest,
    params(("kind" = MasterKind, Path, description = "Which list")),
    responses(
        (status = 201, description = "Item created", body = MasterItem),
        (status = 409, description = "Name already exists"),
    ),
    tag = "Master Data"
)]
pub async fn create_item(
    State(state): State<AppState>,
    Path(kind): Path<MasterKind>,
    Json(body): Json<UpsertMasterItemRequest>,
) -> AppResult<ApiResponse<MasterItem>> {
    let name = required_name(&body.name)?;
    let item =
        db::master::insert_item(&state.db, kind, &name, body.unit.as_deref(), Utc::now()).await?;
    Ok(ApiResponse::created(item))
}

#[utoipa::path(
    put,
    path = "/api/v1/master/{kind}/{item_id}",
    request_body = UpsertMasterItemRequest,
    params(
        ("kind" = MasterKind, Path, description = "Which list"),
        ("item_id" = Uuid, Path, description = "Item ID"),
    ),
    responses(
        (status = 200, description = "Item updated", body = MasterItem),
        (status = 404, description = "Item not found"),
    ),
    tag = "Master Data"
)]
pub async fn update_item(
    State(state): State<AppState>,
    Path((kind, item_id)): Path<(MasterKind, Uuid)>,
    Json(body): Json<UpsertMasterItemRequest>,
) -> AppResult<ApiResponse<MasterItem>> {
    let name = required_name(&body.name)?;
    let item =
        db::master::update_item(&state.db, kind, item_id, &name, body.unit.as_deref()).await?;
    Ok(ApiResponse::ok(item))
}

#[utoipa::path(
    post,
    path = "/api/v1/master/{kind}/{item_id}/toggle",
    params(
        ("kind" = MasterKind, Path, description = "Which list"),
        ("item_id" = Uuid, Path, description = "Item ID"),
    ),
    responses(
        (status = 200, description = "Active flag flipped", body = MasterItem),
        (status = 404, description = "Item not found"),
    ),
    tag = "Master Data"
)]
pub async fn toggle_item(
    State(state): State<AppState>,
    Path((kind, item_id)): Path<(MasterKind, Uuid)>,
) -> AppResult<ApiResponse<MasterItem>> {
    let item = db::master::toggle_item(&state.db, kind, item_id).await?;
    Ok(ApiResponse::ok(item))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn rate_percent_to_basis_points() {
        assert_eq!(rate_bps(Decimal::from_str("18").unwrap()).unwrap(), 1800);
        assert_eq!(rate_bps(Decimal::from_str("2.5").unwrap()).unwrap(), 250);
        assert_eq!(rate_bps(Decimal::ZERO).unwrap(), 0);
        assert!(rate_bps(Decimal::from_str("100.01").unwrap()).is_err());
        assert!(rate_bps(Decimal::from_str("-1").unwrap()).is_err());
    }
}
