use super::next_sequence;
use crate::{
    errors::{AppError, AppResult},
    models::{Money, NewReceipt, Receipt},
};
use chrono::{NaiveDate, Utc};
use sqlx::{SqliteConnection, SqliteExecutor};
use uuid::Uuid;

pub fn format_receipt_number(seq: i64) -> String {
    format!("RCP-{:06}", seq)
}

/// Insert the first version of a new receipt under a fresh receipt number.
pub async fn insert(conn: &mut SqliteConnection, new: &NewReceipt) -> AppResult<Receipt> {
    let receipt_number = format_receipt_number(next_sequence(&mut *conn, "receipt").await?);
    insert_version(conn, new, &receipt_number, None, 1).await
}

/// Insert a row carrying an explicit number and version.
pub async fn insert_version(
    conn: &mut SqliteConnection,
    new: &NewReceipt,
    receipt_number: &str,
    original_receipt_id: Option<Uuid>,
    version_number: i64,
) -> AppResult<Receipt> {
    let receipt = sqlx::query_as::<_, Receipt>(
        r#"INSERT INTO receipts (
            id, receipt_number, member_id, staff_id, payer_name, term,
            amount, amount_paid, due_amount, payment_type, receipt_category, transaction_type,
            notes, created_by, pdf_path, original_receipt_id, version_number, is_current_version,
            created_at
        ) VALUES (?,?,?,?,?,?,?,?,?,?,?,?,?,?,NULL,?,?,1,?)
        RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(receipt_number)
    .bind(new.member_id)
    .bind(new.staff_id)
    .bind(&new.payer_name)
    .bind(new.term)
    .bind(new.amount)
    .bind(new.amount_paid)
    .bind(new.amount.saturating_due(new.amount_paid))
    .bind(&new.payment_type)
    .bind(new.receipt_category)
    .bind(new.transaction_type)
    .bind(&new.notes)
    .bind(&new.created_by)
    .bind(original_receipt_id)
    .bind(version_number)
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| AppError::unique_or(e, format!("Receipt {} already exists", receipt_number)))?;

    Ok(receipt)
}

pub async fn find(conn: impl SqliteExecutor<'_>, id: Uuid) -> AppResult<Option<Receipt>> {
    let receipt = sqlx::query_as::<_, Receipt>("SELECT * FROM receipts WHERE id = ?")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(receipt)
}

pub async fn get(conn: impl SqliteExecutor<'_>, id: Uuid) -> AppResult<Receipt> {
    find(conn, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Receipt {} not found", id)))
}

/// Current versions only, newest first. Both filters are optional.
pub async fn list_current(
    conn: impl SqliteExecutor<'_>,
    member_id: Option<Uuid>,
    staff_id: Option<Uuid>,
) -> AppResult<Vec<Receipt>> {
    let receipts = sqlx::query_as::<_, Receipt>(
        r#"SELECT * FROM receipts
           WHERE is_current_version = 1
             AND (?1 IS NULL OR member_id = ?1)
             AND (?2 IS NULL OR staff_id = ?2)
           ORDER BY created_at DESC, receipt_number DESC"#,
    )
    .bind(member_id)
    .bind(staff_id)
    .fetch_all(conn)
    .await?;
    Ok(receipts)
}

/// Every version sharing `receipt_number`, oldest first.
pub async fn history(
    conn: impl SqliteExecutor<'_>,
    receipt_number: &str,
) -> AppResult<Vec<Receipt>> {
    let receipts = sqlx::query_as::<_, Receipt>(
        "SELECT * FROM receipts WHERE receipt_number = ? ORDER BY version_number",
    )
    .bind(receipt_number)
    .fetch_all(conn)
    .await?;
    Ok(receipts)
}

pub async fn mark_superseded(conn: impl SqliteExecutor<'_>, id: Uuid) -> AppResult<u64> {
    let result = sqlx::query(
        "UPDATE receipts SET is_current_version = 0 WHERE id = ? AND is_current_version = 1",
    )
    .bind(id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

/// Σ amount_paid over a member's current, member-category receipts for `term`.
pub async fn sum_member_paid(
    conn: impl SqliteExecutor<'_>,
    member_id: Uuid,
    term: i64,
) -> AppResult<Money> {
    let paid: i64 = sqlx::query_scalar(
        r#"SELECT COALESCE(SUM(amount_paid), 0) FROM receipts
           WHERE member_id = ?
             AND term = ?
             AND is_current_version = 1
             AND (receipt_category IS NULL OR receipt_category = 'member')"#,
    )
    .bind(member_id)
    .bind(term)
    .fetch_one(conn)
    .await?;
    Ok(Money::from_minor(paid))
}

pub async fn set_pdf_path(conn: impl SqliteExecutor<'_>, id: Uuid, path: &str) -> AppResult<()> {
    sqlx::query("UPDATE receipts SET pdf_path = ? WHERE id = ?")
        .bind(path)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Member money received on `day` (UTC calendar date of `created_at`).
pub async fn collected_on(conn: impl SqliteExecutor<'_>, day: NaiveDate) -> AppResult<Money> {
    let total: i64 = sqlx::query_scalar(
        r#"SELECT COALESCE(SUM(amount_paid), 0) FROM receipts
           WHERE is_current_version = 1
             AND (receipt_category IS NULL OR receipt_category = 'member')
             AND substr(created_at, 1, 10) = ?"#,
    )
    .bind(day.format("%Y-%m-%d").to_string())
    .fetch_one(conn)
    .await?;
    Ok(Money::from_minor(total))
}
