use crate::{
    errors::{AppError, AppResult},
    models::{
        DeletedMember, Member, MemberDue, MemberStatus, Money, PaymentStatus, ReminderCandidate,
        SubscriptionStatus, UpdateMemberRequest,
    },
};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqliteExecutor;
use uuid::Uuid;

pub async fn insert(conn: impl SqliteExecutor<'_>, m: &Member) -> AppResult<()> {
    sqlx::query(
        r#"INSERT INTO members (
            id, member_code, full_name, phone, email, gender, date_of_birth, address,
            occupation, emergency_contact, notes, package_id, plan_type, plan_months,
            registration_fee, package_fee, discount, arrears_amount, membership_fees, paid_amount,
            due_amount, payment_status, subscription_start_date, subscription_end_date,
            subscription_status, status, current_term, created_at, updated_at
        ) VALUES (?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?)"#,
    )
    .bind(m.id)
    .bind(&m.member_code)
    .bind(&m.full_name)
    .bind(&m.phone)
    .bind(&m.email)
    .bind(&m.gender)
    .bind(m.date_of_birth)
    .bind(&m.address)
    .bind(&m.occupation)
    .bind(&m.emergency_contact)
    .bind(&m.notes)
    .bind(m.package_id)
    .bind(m.plan_type)
    .bind(m.plan_months)
    .bind(m.registration_fee)
    .bind(m.package_fee)
    .bind(m.discount)
    .bind(m.arrears_amount)
    .bind(m.membership_fees)
    .bind(m.paid_amount)
    .bind(m.due_amount)
    .bind(m.payment_status)
    .bind(m.subscription_start_date)
    .bind(m.subscription_end_date)
    .bind(m.subscription_status)
    .bind(m.status)
    .bind(m.current_term)
    .bind(m.created_at)
    .bind(m.updated_at)
    .execute(conn)
    .await
    .map_err(|e| AppError::unique_or(e, format!("Member ID '{}' is already taken", m.member_code)))?;

    Ok(())
}

pub async fn find(conn: impl SqliteExecutor<'_>, id: Uuid) -> AppResult<Option<Member>> {
    let member = sqlx::query_as::<_, Member>("SELECT * FROM members WHERE id = ?")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(member)
}

/// Like [`find`] but a missing row is an error.
pub async fn get(conn: impl SqliteExecutor<'_>, id: Uuid) -> AppResult<Member> {
    find(conn, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Member {} not found", id)))
}

pub async fn code_exists(conn: impl SqliteExecutor<'_>, member_code: &str) -> AppResult<bool> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM members WHERE member_code = ?)")
            .bind(member_code)
            .fetch_one(conn)
            .await?;
    Ok(exists)
}

pub async fn list(
    conn: impl SqliteExecutor<'_>,
    status: Option<MemberStatus>,
) -> AppResult<Vec<Member>> {
    let members = sqlx::query_as::<_, Member>(
        "SELECT * FROM members WHERE (?1 IS NULL OR status = ?1) ORDER BY created_at DESC",
    )
    .bind(status)
    .fetch_all(conn)
    .await?;
    Ok(members)
}

pub async fn list_ids(conn: impl SqliteExecutor<'_>) -> AppResult<Vec<Uuid>> {
    let ids: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM members ORDER BY created_at")
        .fetch_all(conn)
        .await?;
    Ok(ids)
}

/// Members whose subscription status is derived from dates.
pub async fn list_with_end_date(conn: impl SqliteExecutor<'_>) -> AppResult<Vec<Member>> {
    let members = sqlx::query_as::<_, Member>(
        r#"SELECT * FROM members
           WHERE subscription_end_date IS NOT NULL
             AND status IN ('active', 'inactive')
           ORDER BY created_at"#,
    )
    .fetch_all(conn)
    .await?;
    Ok(members)
}

/// Absent fields keep their stored value.
pub async fn update_profile(
    conn: impl SqliteExecutor<'_>,
    id: Uuid,
    body: &UpdateMemberRequest,
    now: DateTime<Utc>,
) -> AppResult<u64> {
    let result = sqlx::query(
        r#"UPDATE members SET
            full_name = COALESCE(?, full_name),
            phone = COALESCE(?, phone),
            email = COALESCE(?, email),
            gender = COALESCE(?, gender),
            date_of_birth = COALESCE(?, date_of_birth),
            address = COALESCE(?, address),
            occupation = COALESCE(?, occupation),
            emergency_contact = COALESCE(?, emergency_contact),
            notes = COALESCE(?, notes),
            updated_at = ?
           WHERE id = ?"#,
    )
    .bind(&body.full_name)
    .bind(&body.phone)
    .bind(&body.email)
    .bind(&body.gender)
    .bind(body.date_of_birth)
    .bind(&body.address)
    .bind(&body.occupation)
    .bind(&body.emergency_contact)
    .bind(&body.notes)
    .bind(now)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

/// Write every plan, fee and subscription column of `m`.
pub async fn save_membership(conn: impl SqliteExecutor<'_>, m: &Member) -> AppResult<()> {
    sqlx::query(
        r#"UPDATE members SET
            package_id = ?, plan_type = ?, plan_months = ?,
            registration_fee = ?, package_fee = ?, discount = ?, arrears_amount = ?,
            membership_fees = ?,
            paid_amount = ?, due_amount = ?, payment_status = ?,
            subscription_start_date = ?, subscription_end_date = ?, subscription_status = ?,
            status = ?, current_term = ?, updated_at = ?
           WHERE id = ?"#,
    )
    .bind(m.package_id)
    .bind(m.plan_type)
    .bind(m.plan_months)
    .bind(m.registration_fee)
    .bind(m.package_fee)
    .bind(m.discount)
    .bind(m.arrears_amount)
    .bind(m.membership_fees)
    .bind(m.paid_amount)
    .bind(m.due_amount)
    .bind(m.payment_status)
    .bind(m.subscription_start_date)
    .bind(m.subscription_end_date)
    .bind(m.subscription_status)
    .bind(m.status)
    .bind(m.current_term)
    .bind(m.updated_at)
    .bind(m.id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Write the paid/due projection. Returns rows changed, zero when the stored
/// values already match.
pub async fn set_totals(
    conn: impl SqliteExecutor<'_>,
    id: Uuid,
    paid_amount: Money,
    due_amount: Money,
    payment_status: PaymentStatus,
    now: DateTime<Utc>,
) -> AppResult<u64> {
    let result = sqlx::query(
        r#"UPDATE members SET paid_amount = ?1, due_amount = ?2, payment_status = ?3, updated_at = ?4
           WHERE id = ?5
             AND (paid_amount <> ?1 OR due_amount <> ?2 OR payment_status <> ?3)"#,
    )
    .bind(paid_amount)
    .bind(due_amount)
    .bind(payment_status)
    .bind(now)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

pub async fn set_status(
    conn: impl SqliteExecutor<'_>,
    id: Uuid,
    status: MemberStatus,
    now: DateTime<Utc>,
) -> AppResult<u64> {
    let result = sqlx::query("UPDATE members SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(now)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

/// Only touches the row when the status actually differs.
pub async fn set_subscription_status(
    conn: impl SqliteExecutor<'_>,
    id: Uuid,
    status: SubscriptionStatus,
    now: DateTime<Utc>,
) -> AppResult<u64> {
    let result = sqlx::query(
        r#"UPDATE members SET subscription_status = ?1, updated_at = ?2
           WHERE id = ?3 AND (subscription_status IS NULL OR subscription_status <> ?1)"#,
    )
    .bind(status)
    .bind(now)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete(conn: impl SqliteExecutor<'_>, id: Uuid) -> AppResult<u64> {
    let result = sqlx::query("DELETE FROM members WHERE id = ?")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

/// Member-list "due amount" view: current-term invoices with money outstanding.
/// A renewed member's unpaid balance lives in the current term as arrears.
pub async fn list_with_due(conn: impl SqliteExecutor<'_>) -> AppResult<Vec<MemberDue>> {
    let rows = sqlx::query_as::<_, MemberDue>(
        r#"SELECT m.id AS member_id, m.member_code, m.full_name, m.phone,
                  i.invoice_number, i.total_amount, i.paid_amount,
                  MAX(i.total_amount - i.paid_amount, 0) AS due_amount,
                  i.status
           FROM invoices i
           INNER JOIN members m ON m.id = i.member_id AND m.current_term = i.term
           WHERE i.status <> ?
           ORDER BY due_amount DESC, m.full_name"#,
    )
    .bind(PaymentStatus::Paid)
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

pub async fn count_by_status(conn: impl SqliteExecutor<'_>) -> AppResult<Vec<(MemberStatus, i64)>> {
    let rows = sqlx::query_as::<_, (MemberStatus, i64)>(
        "SELECT status, COUNT(*) FROM members GROUP BY status",
    )
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

/// Active members whose subscription ends within `[from, to]`.
pub async fn list_expiring(
    conn: impl SqliteExecutor<'_>,
    from: NaiveDate,
    to: NaiveDate,
) -> AppResult<Vec<ReminderCandidate>> {
    let rows = sqlx::query_as::<_, ReminderCandidate>(
        r#"SELECT m.id AS member_id, m.member_code, m.full_name, m.phone,
                  m.subscription_end_date,
                  (SELECT MAX(a.attendance_date) FROM attendance a WHERE a.member_id = m.id)
                      AS last_attendance_date
           FROM members m
           WHERE m.status = 'active'
             AND m.subscription_end_date BETWEEN ? AND ?
           ORDER BY m.subscription_end_date, m.full_name"#,
    )
    .bind(from)
    .bind(to)
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

// ─── Archive ──────────────────────────────────────────────────────────────────

pub async fn insert_deleted(conn: impl SqliteExecutor<'_>, row: &DeletedMember) -> AppResult<()> {
    sqlx::query(
        r#"INSERT INTO deleted_members (id, member_id, member_code, full_name, snapshot, deleted_by, deleted_at)
           VALUES (?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(row.id)
    .bind(row.member_id)
    .bind(&row.member_code)
    .bind(&row.full_name)
    .bind(&row.snapshot)
    .bind(&row.deleted_by)
    .bind(row.deleted_at)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn list_deleted(conn: impl SqliteExecutor<'_>) -> AppResult<Vec<DeletedMember>> {
    let rows = sqlx::query_as::<_, DeletedMember>(
        "SELECT * FROM deleted_members ORDER BY deleted_at DESC",
    )
    .fetch_all(conn)
    .await?;
    Ok(rows)
}
