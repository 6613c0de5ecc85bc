use crate::{errors::AppResult, models::BodyMeasurement};
use chrono::NaiveDate;
use sqlx::{SqliteConnection, SqliteExecutor};
use uuid::Uuid;

pub async fn insert(
    conn: &mut SqliteConnection,
    member_id: Uuid,
    field_id: Uuid,
    value: &str,
    measured_on: NaiveDate,
) -> AppResult<BodyMeasurement> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"INSERT INTO body_measurements (id, member_id, field_id, value, measured_on)
           VALUES (?, ?, ?, ?, ?)"#,
    )
    .bind(id)
    .bind(member_id)
    .bind(field_id)
    .bind(value)
    .bind(measured_on)
    .execute(&mut *conn)
    .await?;

    let row = sqlx::query_as::<_, BodyMeasurement>(
        r#"SELECT b.id, b.member_id, b.field_id, f.name AS field_name, f.unit, b.value, b.measured_on
           FROM body_measurements b
           INNER JOIN master_body_measurement_fields f ON f.id = b.field_id
           WHERE b.id = ?"#,
    )
    .bind(id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(row)
}

pub async fn list_for_member(
    conn: impl SqliteExecutor<'_>,
    member_id: Uuid,
) -> AppResult<Vec<BodyMeasurement>> {
    let rows = sqlx::query_as::<_, BodyMeasurement>(
        r#"SELECT b.id, b.member_id, b.field_id, f.name AS field_name, f.unit, b.value, b.measured_on
           FROM body_measurements b
           INNER JOIN master_body_measurement_fields f ON f.id = b.field_id
           WHERE b.member_id = ?
           ORDER BY b.measured_on DESC, f.name"#,
    )
    .bind(member_id)
    .fetch_all(conn)
    .await?;
    Ok(rows)
}
