use crate::{
    errors::{AppError, AppResult},
    models::{Enquiry, EnquiryStatus, UpdateEnquiryRequest},
};
use sqlx::SqliteExecutor;
use uuid::Uuid;

pub async fn insert(conn: impl SqliteExecutor<'_>, e: &Enquiry) -> AppResult<Enquiry> {
    let enquiry = sqlx::query_as::<_, Enquiry>(
        r#"INSERT INTO enquiries (
            id, full_name, phone, email, interested_package_id, source, notes,
            follow_up_date, status, converted_to_member_id, created_at
        ) VALUES (?,?,?,?,?,?,?,?,?,?,?)
        RETURNING *"#,
    )
    .bind(e.id)
    .bind(&e.full_name)
    .bind(&e.phone)
    .bind(&e.email)
    .bind(e.interested_package_id)
    .bind(&e.source)
    .bind(&e.notes)
    .bind(e.follow_up_date)
    .bind(e.status)
    .bind(e.converted_to_member_id)
    .bind(e.created_at)
    .fetch_one(conn)
    .await?;
    Ok(enquiry)
}

pub async fn get(conn: impl SqliteExecutor<'_>, id: Uuid) -> AppResult<Enquiry> {
    sqlx::query_as::<_, Enquiry>("SELECT * FROM enquiries WHERE id = ?")
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Enquiry {} not found", id)))
}

pub async fn list(
    conn: impl SqliteExecutor<'_>,
    status: Option<EnquiryStatus>,
) -> AppResult<Vec<Enquiry>> {
    let rows = sqlx::query_as::<_, Enquiry>(
        "SELECT * FROM enquiries WHERE (?1 IS NULL OR status = ?1) ORDER BY created_at DESC",
    )
    .bind(status)
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

pub async fn update(
    conn: impl SqliteExecutor<'_>,
    id: Uuid,
    body: &UpdateEnquiryRequest,
) -> AppResult<Option<Enquiry>> {
    let row = sqlx::query_as::<_, Enquiry>(
        r#"UPDATE enquiries SET
            full_name = COALESCE(?, full_name),
            phone = COALESCE(?, phone),
            email = COALESCE(?, email),
            interested_package_id = COALESCE(?, interested_package_id),
            source = COALESCE(?, source),
            notes = COALESCE(?, notes),
            follow_up_date = COALESCE(?, follow_up_date)
           WHERE id = ?
           RETURNING *"#,
    )
    .bind(&body.full_name)
    .bind(&body.phone)
    .bind(&body.email)
    .bind(body.interested_package_id)
    .bind(&body.source)
    .bind(&body.notes)
    .bind(body.follow_up_date)
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(row)
}

pub async fn set_status(
    conn: impl SqliteExecutor<'_>,
    id: Uuid,
    status: EnquiryStatus,
    converted_to_member_id: Option<Uuid>,
) -> AppResult<Enquiry> {
    let row = sqlx::query_as::<_, Enquiry>(
        r#"UPDATE enquiries SET status = ?, converted_to_member_id = COALESCE(?, converted_to_member_id)
           WHERE id = ?
           RETURNING *"#,
    )
    .bind(status)
    .bind(converted_to_member_id)
    .bind(id)
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Enquiry {} not found", id)))?;
    Ok(row)
}
