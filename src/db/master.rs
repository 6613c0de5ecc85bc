//! Reference lists. The simple named lists share one set of statements
//! parameterized by [`MasterKind`], whose table names are compile-time
//! constants.

use crate::{
    errors::{AppError, AppResult},
    models::{MasterItem, MasterKind, Package, TaxSetting},
};
use chrono::{DateTime, Utc};
use sqlx::SqliteExecutor;
use uuid::Uuid;

// ─── Simple lists ─────────────────────────────────────────────────────────────

pub async fn list_items(
    conn: impl SqliteExecutor<'_>,
    kind: MasterKind,
    active_only: bool,
) -> AppResult<Vec<MasterItem>> {
    let sql = format!(
        "SELECT * FROM {} WHERE (?1 = 0 OR is_active = 1) ORDER BY name COLLATE NOCASE",
        kind.table()
    );
    let rows = sqlx::query_as::<_, MasterItem>(&sql)
        .bind(active_only)
        .fetch_all(conn)
        .await?;
    Ok(rows)
}

pub async fn get_item(conn: impl SqliteExecutor<'_>, kind: MasterKind, id: Uuid) -> AppResult<MasterItem> {
    let sql = format!("SELECT * FROM {} WHERE id = ?", kind.table());
    sqlx::query_as::<_, MasterItem>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {} not found", kind.label(), id)))
}

pub async fn insert_item(
    conn: impl SqliteExecutor<'_>,
    kind: MasterKind,
    name: &str,
    unit: Option<&str>,
    now: DateTime<Utc>,
) -> AppResult<MasterItem> {
    let sql = format!(
        "INSERT INTO {} (id, name, unit, is_active, created_at) VALUES (?, ?, ?, 1, ?) RETURNING *",
        kind.table()
    );
    sqlx::query_as::<_, MasterItem>(&sql)
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(unit)
        .bind(now)
        .fetch_one(conn)
        .await
        .map_err(|e| AppError::unique_or(e, format!("{} '{}' already exists", kind.label(), name)))
}

pub async fn update_item(
    conn: impl SqliteExecutor<'_>,
    kind: MasterKind,
    id: Uuid,
    name: &str,
    unit: Option<&str>,
) -> AppResult<MasterItem> {
    let sql = format!(
        "UPDATE {} SET name = ?, unit = ? WHERE id = ? RETURNING *",
        kind.table()
    );
    sqlx::query_as::<_, MasterItem>(&sql)
        .bind(name)
        .bind(unit)
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(|e| AppError::unique_or(e, format!("{} '{}' already exists", kind.label(), name)))?
        .ok_or_else(|| AppError::NotFound(format!("{} {} not found", kind.label(), id)))
}

/// Flip `is_active`; historical rows that reference the item are untouched.
pub async fn toggle_item(conn: impl SqliteExecutor<'_>, kind: MasterKind, id: Uuid) -> AppResult<MasterItem> {
    let sql = format!(
        "UPDATE {} SET is_active = 1 - is_active WHERE id = ? RETURNING *",
        kind.table()
    );
    sqlx::query_as::<_, MasterItem>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {} not found", kind.label(), id)))
}

// ─── Packages ─────────────────────────────────────────────────────────────────

pub async fn list_packages(conn: impl SqliteExecutor<'_>, active_only: bool) -> AppResult<Vec<Package>> {
    let rows = sqlx::query_as::<_, Package>(
        "SELECT * FROM master_packages WHERE (?1 = 0 OR is_active = 1) ORDER BY duration_months, name",
    )
    .bind(active_only)
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

pub async fn find_package(conn: impl SqliteExecutor<'_>, id: Uuid) -> AppResult<Option<Package>> {
    let row = sqlx::query_as::<_, Package>("SELECT * FROM master_packages WHERE id = ?")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(row)
}

pub async fn insert_package(conn: impl SqliteExecutor<'_>, p: &Package) -> AppResult<Package> {
    sqlx::query_as::<_, Package>(
        r#"INSERT INTO master_packages (id, name, duration_months, price, is_active, created_at)
           VALUES (?, ?, ?, ?, ?, ?)
           RETURNING *"#,
    )
    .bind(p.id)
    .bind(&p.name)
    .bind(p.duration_months)
    .bind(p.price)
    .bind(p.is_active)
    .bind(p.created_at)
    .fetch_one(conn)
    .await
    .map_err(|e| AppError::unique_or(e, format!("Package '{}' already exists", p.name)))
}

pub async fn update_package(conn: impl SqliteExecutor<'_>, p: &Package) -> AppResult<Package> {
    sqlx::query_as::<_, Package>(
        r#"UPDATE master_packages SET name = ?, duration_months = ?, price = ?
           WHERE id = ?
           RETURNING *"#,
    )
    .bind(&p.name)
    .bind(p.duration_months)
    .bind(p.price)
    .bind(p.id)
    .fetch_optional(conn)
    .await
    .map_err(|e| AppError::unique_or(e, format!("Package '{}' already exists", p.name)))?
    .ok_or_else(|| AppError::NotFound(format!("Package {} not found", p.id)))
}

pub async fn toggle_package(conn: impl SqliteExecutor<'_>, id: Uuid) -> AppResult<Package> {
    sqlx::query_as::<_, Package>(
        "UPDATE master_packages SET is_active = 1 - is_active WHERE id = ? RETURNING *",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Package {} not found", id)))
}

// ─── Tax settings ─────────────────────────────────────────────────────────────

pub async fn list_tax_settings(
    conn: impl SqliteExecutor<'_>,
    active_only: bool,
) -> AppResult<Vec<TaxSetting>> {
    let rows = sqlx::query_as::<_, TaxSetting>(
        "SELECT * FROM master_tax_settings WHERE (?1 = 0 OR is_active = 1) ORDER BY name",
    )
    .bind(active_only)
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

pub async fn insert_tax_setting(conn: impl SqliteExecutor<'_>, t: &TaxSetting) -> AppResult<TaxSetting> {
    sqlx::query_as::<_, TaxSetting>(
        r#"INSERT INTO master_tax_settings (id, name, rate_bps, is_active, created_at)
           VALUES (?, ?, ?, ?, ?)
           RETURNING *"#,
    )
    .bind(t.id)
    .bind(&t.name)
    .bind(t.rate_bps)
    .bind(t.is_active)
    .bind(t.created_at)
    .fetch_one(conn)
    .await
    .map_err(|e| AppError::unique_or(e, format!("Tax setting '{}' already exists", t.name)))
}

pub async fn update_tax_setting(
    conn: impl SqliteExecutor<'_>,
    id: Uuid,
    name: &str,
    rate_bps: i64,
) -> AppResult<TaxSetting> {
    sqlx::query_as::<_, TaxSetting>(
        "UPDATE master_tax_settings SET name = ?, rate_bps = ? WHERE id = ? RETURNING *",
    )
    .bind(name)
    .bind(rate_bps)
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(|e| AppError::unique_or(e, format!("Tax setting '{}' already exists", name)))?
    .ok_or_else(|| AppError::NotFound(format!("Tax setting {} not found", id)))
}

pub async fn toggle_tax_setting(conn: impl SqliteExecutor<'_>, id: Uuid) -> AppResult<TaxSetting> {
    sqlx::query_as::<_, TaxSetting>(
        "UPDATE master_tax_settings SET is_active = 1 - is_active WHERE id = ? RETURNING *",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Tax setting {} not found", id)))
}
