use super::next_sequence;
use crate::{
    errors::AppResult,
    models::{Invoice, Money, PaymentStatus},
};
use chrono::Utc;
use sqlx::{SqliteConnection, SqliteExecutor};
use uuid::Uuid;

/// Create the invoice for a member term, or reset its total if one already
/// exists for that term.
pub async fn upsert_for_term(
    conn: &mut SqliteConnection,
    member_id: Uuid,
    term: i64,
    total_amount: Money,
) -> AppResult<Invoice> {
    if let Some(existing) = find_for_term(&mut *conn, member_id, term).await? {
        return set_total(conn, existing.id, total_amount).await;
    }

    let invoice_number = format!("INV-{:06}", next_sequence(&mut *conn, "invoice").await?);
    let now = Utc::now();
    let invoice = sqlx::query_as::<_, Invoice>(
        r#"INSERT INTO invoices (id, member_id, term, invoice_number, total_amount, paid_amount, status, created_at, updated_at)
           VALUES (?, ?, ?, ?, ?, 0, ?, ?, ?)
           RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(member_id)
    .bind(term)
    .bind(&invoice_number)
    .bind(total_amount)
    .bind(PaymentStatus::derive(total_amount, Money::ZERO))
    .bind(now)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    Ok(invoice)
}

pub async fn find_for_term(
    conn: impl SqliteExecutor<'_>,
    member_id: Uuid,
    term: i64,
) -> AppResult<Option<Invoice>> {
    let invoice =
        sqlx::query_as::<_, Invoice>("SELECT * FROM invoices WHERE member_id = ? AND term = ?")
            .bind(member_id)
            .bind(term)
            .fetch_optional(conn)
            .await?;
    Ok(invoice)
}

pub async fn list_for_member(
    conn: impl SqliteExecutor<'_>,
    member_id: Uuid,
) -> AppResult<Vec<Invoice>> {
    let invoices =
        sqlx::query_as::<_, Invoice>("SELECT * FROM invoices WHERE member_id = ? ORDER BY term")
            .bind(member_id)
            .fetch_all(conn)
            .await?;
    Ok(invoices)
}

async fn set_total(
    conn: &mut SqliteConnection,
    invoice_id: Uuid,
    total_amount: Money,
) -> AppResult<Invoice> {
    let invoice = sqlx::query_as::<_, Invoice>(
        r#"UPDATE invoices SET total_amount = ?1,
               status = CASE
                   WHEN paid_amount >= ?1 THEN 'paid'
                   WHEN paid_amount > 0 THEN 'partial'
                   ELSE 'unpaid'
               END,
               updated_at = ?2
           WHERE id = ?3
           RETURNING *"#,
    )
    .bind(total_amount)
    .bind(Utc::now())
    .bind(invoice_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(invoice)
}

/// Write the paid projection for a member term. Returns rows changed.
pub async fn set_paid(
    conn: impl SqliteExecutor<'_>,
    member_id: Uuid,
    term: i64,
    paid_amount: Money,
    status: PaymentStatus,
) -> AppResult<u64> {
    let result = sqlx::query(
        r#"UPDATE invoices SET paid_amount = ?1, status = ?2, updated_at = ?3
           WHERE member_id = ?4 AND term = ?5
             AND (paid_amount <> ?1 OR status <> ?2)"#,
    )
    .bind(paid_amount)
    .bind(status)
    .bind(Utc::now())
    .bind(member_id)
    .bind(term)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

/// Record the balance of a closed term that renewal moved into the next one.
pub async fn set_carried(
    conn: impl SqliteExecutor<'_>,
    member_id: Uuid,
    term: i64,
    carried_amount: Money,
) -> AppResult<u64> {
    let result = sqlx::query(
        r#"UPDATE invoices SET carried_amount = ?1, updated_at = ?2
           WHERE member_id = ?3 AND term = ?4"#,
    )
    .bind(carried_amount)
    .bind(Utc::now())
    .bind(member_id)
    .bind(term)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

/// Σ outstanding over current-term invoices. Balances of closed terms are
/// already part of their successor's total.
pub async fn total_outstanding(conn: impl SqliteExecutor<'_>) -> AppResult<Money> {
    let total: i64 = sqlx::query_scalar(
        r#"SELECT COALESCE(SUM(MAX(i.total_amount - i.paid_amount, 0)), 0)
           FROM invoices i
           INNER JOIN members m ON m.id = i.member_id AND m.current_term = i.term"#,
    )
    .fetch_one(conn)
    .await?;
    Ok(Money::from_minor(total))
}
