//! Check-in / check-out statements for both members and staff.
//!
//! The two tables share a shape and differ only in the owning column, so the
//! statements are written once per [`Roster`] with fixed table names.

use crate::{
    errors::AppResult,
    models::{Attendance, ReminderCandidate},
};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqliteExecutor;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Roster {
    Members,
    Staff,
}

impl Roster {
    fn insert_sql(self) -> &'static str {
        match self {
            Roster::Members => {
                r#"INSERT INTO attendance (id, member_id, attendance_date, check_in_at, check_out_at)
                   VALUES (?, ?, ?, ?, NULL)
                   RETURNING id, member_id AS person_id, attendance_date, check_in_at, check_out_at"#
            }
            Roster::Staff => {
                r#"INSERT INTO staff_attendance (id, staff_id, attendance_date, check_in_at, check_out_at)
                   VALUES (?, ?, ?, ?, NULL)
                   RETURNING id, staff_id AS person_id, attendance_date, check_in_at, check_out_at"#
            }
        }
    }

    fn open_sql(self) -> &'static str {
        match self {
            Roster::Members => {
                r#"SELECT id, member_id AS person_id, attendance_date, check_in_at, check_out_at
                   FROM attendance
                   WHERE member_id = ? AND attendance_date = ? AND check_out_at IS NULL
                   ORDER BY check_in_at DESC LIMIT 1"#
            }
            Roster::Staff => {
                r#"SELECT id, staff_id AS person_id, attendance_date, check_in_at, check_out_at
                   FROM staff_attendance
                   WHERE staff_id = ? AND attendance_date = ? AND check_out_at IS NULL
                   ORDER BY check_in_at DESC LIMIT 1"#
            }
        }
    }

    fn close_sql(self) -> &'static str {
        match self {
            Roster::Members => {
                r#"UPDATE attendance SET check_out_at = ? WHERE id = ?
                   RETURNING id, member_id AS person_id, attendance_date, check_in_at, check_out_at"#
            }
            Roster::Staff => {
                r#"UPDATE staff_attendance SET check_out_at = ? WHERE id = ?
                   RETURNING id, staff_id AS person_id, attendance_date, check_in_at, check_out_at"#
            }
        }
    }

    fn by_date_sql(self) -> &'static str {
        match self {
            Roster::Members => {
                r#"SELECT id, member_id AS person_id, attendance_date, check_in_at, check_out_at
                   FROM attendance WHERE attendance_date = ? ORDER BY check_in_at"#
            }
            Roster::Staff => {
                r#"SELECT id, staff_id AS person_id, attendance_date, check_in_at, check_out_at
                   FROM staff_attendance WHERE attendance_date = ? ORDER BY check_in_at"#
            }
        }
    }

    fn by_person_sql(self) -> &'static str {
        match self {
            Roster::Members => {
                r#"SELECT id, member_id AS person_id, attendance_date, check_in_at, check_out_at
                   FROM attendance WHERE member_id = ? ORDER BY check_in_at DESC"#
            }
            Roster::Staff => {
                r#"SELECT id, staff_id AS person_id, attendance_date, check_in_at, check_out_at
                   FROM staff_attendance WHERE staff_id = ? ORDER BY check_in_at DESC"#
            }
        }
    }
}

pub async fn insert(
    conn: impl SqliteExecutor<'_>,
    roster: Roster,
    person_id: Uuid,
    date: NaiveDate,
    at: DateTime<Utc>,
) -> AppResult<Attendance> {
    let row = sqlx::query_as::<_, Attendance>(roster.insert_sql())
        .bind(Uuid::new_v4())
        .bind(person_id)
        .bind(date)
        .bind(at)
        .fetch_one(conn)
        .await?;
    Ok(row)
}

pub async fn find_open(
    conn: impl SqliteExecutor<'_>,
    roster: Roster,
    person_id: Uuid,
    date: NaiveDate,
) -> AppResult<Option<Attendance>> {
    let row = sqlx::query_as::<_, Attendance>(roster.open_sql())
        .bind(person_id)
        .bind(date)
        .fetch_optional(conn)
        .await?;
    Ok(row)
}

pub async fn close(
    conn: impl SqliteExecutor<'_>,
    roster: Roster,
    id: Uuid,
    at: DateTime<Utc>,
) -> AppResult<Attendance> {
    let row = sqlx::query_as::<_, Attendance>(roster.close_sql())
        .bind(at)
        .bind(id)
        .fetch_one(conn)
        .await?;
    Ok(row)
}

pub async fn list_by_date(
    conn: impl SqliteExecutor<'_>,
    roster: Roster,
    date: NaiveDate,
) -> AppResult<Vec<Attendance>> {
    let rows = sqlx::query_as::<_, Attendance>(roster.by_date_sql())
        .bind(date)
        .fetch_all(conn)
        .await?;
    Ok(rows)
}

pub async fn list_for_person(
    conn: impl SqliteExecutor<'_>,
    roster: Roster,
    person_id: Uuid,
) -> AppResult<Vec<Attendance>> {
    let rows = sqlx::query_as::<_, Attendance>(roster.by_person_sql())
        .bind(person_id)
        .fetch_all(conn)
        .await?;
    Ok(rows)
}

pub async fn count_member_check_ins(conn: impl SqliteExecutor<'_>, date: NaiveDate) -> AppResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM attendance WHERE attendance_date = ?")
        .bind(date)
        .fetch_one(conn)
        .await?;
    Ok(count)
}

/// Active members with no check-in on or after `since`.
pub async fn list_absent_members(
    conn: impl SqliteExecutor<'_>,
    since: NaiveDate,
) -> AppResult<Vec<ReminderCandidate>> {
    let rows = sqlx::query_as::<_, ReminderCandidate>(
        r#"SELECT m.id AS member_id, m.member_code, m.full_name, m.phone,
                  m.subscription_end_date,
                  (SELECT MAX(a.attendance_date) FROM attendance a WHERE a.member_id = m.id)
                      AS last_attendance_date
           FROM members m
           WHERE m.status = 'active'
             AND NOT EXISTS (
                 SELECT 1 FROM attendance a
                 WHERE a.member_id = m.id AND a.attendance_date >= ?
             )
           ORDER BY last_attendance_date, m.full_name"#,
    )
    .bind(since)
    .fetch_all(conn)
    .await?;
    Ok(rows)
}
