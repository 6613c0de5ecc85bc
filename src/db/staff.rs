use crate::{
    errors::{AppError, AppResult},
    models::{Money, Staff, UpdateStaffRequest},
};
use chrono::{DateTime, Utc};
use sqlx::SqliteExecutor;
use uuid::Uuid;

pub async fn insert(conn: impl SqliteExecutor<'_>, s: &Staff) -> AppResult<Staff> {
    let staff = sqlx::query_as::<_, Staff>(
        r#"INSERT INTO staff (id, full_name, phone, email, role, salary, joining_date, is_active, created_at, updated_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
           RETURNING *"#,
    )
    .bind(s.id)
    .bind(&s.full_name)
    .bind(&s.phone)
    .bind(&s.email)
    .bind(&s.role)
    .bind(s.salary)
    .bind(s.joining_date)
    .bind(s.is_active)
    .bind(s.created_at)
    .bind(s.updated_at)
    .fetch_one(conn)
    .await?;
    Ok(staff)
}

pub async fn get(conn: impl SqliteExecutor<'_>, id: Uuid) -> AppResult<Staff> {
    sqlx::query_as::<_, Staff>("SELECT * FROM staff WHERE id = ?")
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Staff member {} not found", id)))
}

pub async fn list(conn: impl SqliteExecutor<'_>, active_only: bool) -> AppResult<Vec<Staff>> {
    let staff = sqlx::query_as::<_, Staff>(
        "SELECT * FROM staff WHERE (?1 = 0 OR is_active = 1) ORDER BY full_name COLLATE NOCASE",
    )
    .bind(active_only)
    .fetch_all(conn)
    .await?;
    Ok(staff)
}

pub async fn update_profile(
    conn: impl SqliteExecutor<'_>,
    id: Uuid,
    body: &UpdateStaffRequest,
    now: DateTime<Utc>,
) -> AppResult<Option<Staff>> {
    let staff = sqlx::query_as::<_, Staff>(
        r#"UPDATE staff SET
            full_name = COALESCE(?, full_name),
            phone = COALESCE(?, phone),
            email = COALESCE(?, email),
            role = COALESCE(?, role),
            updated_at = ?
           WHERE id = ?
           RETURNING *"#,
    )
    .bind(&body.full_name)
    .bind(&body.phone)
    .bind(&body.email)
    .bind(&body.role)
    .bind(now)
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(staff)
}

pub async fn set_salary(
    conn: impl SqliteExecutor<'_>,
    id: Uuid,
    salary: Money,
    now: DateTime<Utc>,
) -> AppResult<Option<Staff>> {
    let staff = sqlx::query_as::<_, Staff>(
        "UPDATE staff SET salary = ?, updated_at = ? WHERE id = ? RETURNING *",
    )
    .bind(salary)
    .bind(now)
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(staff)
}

pub async fn deactivate(
    conn: impl SqliteExecutor<'_>,
    id: Uuid,
    now: DateTime<Utc>,
) -> AppResult<u64> {
    let result = sqlx::query("UPDATE staff SET is_active = 0, updated_at = ? WHERE id = ?")
        .bind(now)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}
