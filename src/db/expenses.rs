use crate::{errors::AppResult, models::Expense};
use chrono::NaiveDate;
use sqlx::SqliteExecutor;
use uuid::Uuid;

pub async fn insert(conn: impl SqliteExecutor<'_>, e: &Expense) -> AppResult<Expense> {
    let expense = sqlx::query_as::<_, Expense>(
        r#"INSERT INTO expenses (id, category_id, description, amount, expense_date, payment_type, created_by, created_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?)
           RETURNING *"#,
    )
    .bind(e.id)
    .bind(e.category_id)
    .bind(&e.description)
    .bind(e.amount)
    .bind(e.expense_date)
    .bind(&e.payment_type)
    .bind(&e.created_by)
    .bind(e.created_at)
    .fetch_one(conn)
    .await?;
    Ok(expense)
}

/// Both bounds are inclusive and optional.
pub async fn list(
    conn: impl SqliteExecutor<'_>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> AppResult<Vec<Expense>> {
    let rows = sqlx::query_as::<_, Expense>(
        r#"SELECT * FROM expenses
           WHERE (?1 IS NULL OR expense_date >= ?1)
             AND (?2 IS NULL OR expense_date <= ?2)
           ORDER BY expense_date DESC, created_at DESC"#,
    )
    .bind(from)
    .bind(to)
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

pub async fn delete(conn: impl SqliteExecutor<'_>, id: Uuid) -> AppResult<u64> {
    let result = sqlx::query("DELETE FROM expenses WHERE id = ?")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}
