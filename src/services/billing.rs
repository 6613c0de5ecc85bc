// src/services/billing.rs

//! Fee and due-amount reconciliation.
//!
//! Receipts are the only authoritative record of money received. The paid /
//! due / status columns on `members` and `invoices` are projections of the
//! current-version receipts of a term and are rewritten inside the same
//! transaction as every receipt write.

use crate::{
    db,
    errors::{AppError, AppResult},
    models::{
        BatchResult, CreateReceiptRequest, Member, MemberReceipt, MemberStatus, MemberTotals,
        Money, NewReceipt, PayDueRequest, PaymentStatus, Receipt, ReceiptCategory,
        RenewMembershipRequest, SubscriptionStatus, SupersedeReceiptRequest, TransactionType,
        UpdateMemberFeesRequest,
    },
    services::pdf::{self, DocumentKind},
    state::AppState,
};
use chrono::{Datelike, Months, NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

// ─── Pure rules ───────────────────────────────────────────────────────────────

/// `max(0, registration_fee + package_fee - discount)`
pub fn compute_total_fees(registration_fee: Money, package_fee: Money, discount: Money) -> Money {
    (registration_fee + package_fee - discount).clamp_zero()
}

/// Calendar month addition. Days past the end of the target month clamp to
/// its last day, and a start on the last day of a month always lands on the
/// last day of the target month.
pub fn add_months_preserving_month_end(start: NaiveDate, months: u32) -> Option<NaiveDate> {
    let end = start.checked_add_months(Months::new(months))?;
    if is_last_day_of_month(start) {
        last_day_of_month(end)
    } else {
        Some(end)
    }
}

fn is_last_day_of_month(date: NaiveDate) -> bool {
    date.succ_opt().is_none_or(|next| next.month() != date.month())
}

fn last_day_of_month(date: NaiveDate) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
}

/// Subscription state as a function of dates only.
pub fn classify_subscription(end: NaiveDate, as_of: NaiveDate, window_days: i64) -> SubscriptionStatus {
    let remaining = (end - as_of).num_days();
    if remaining < 0 {
        SubscriptionStatus::Expired
    } else if remaining <= window_days {
        SubscriptionStatus::ExpiringSoon
    } else {
        SubscriptionStatus::Active
    }
}

/// Trimmed payment type. Required whenever money actually changes hands.
pub(crate) fn payment_type_for(payment_type: Option<&str>, amount_paid: Money) -> AppResult<String> {
    match payment_type.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => Ok(value.to_string()),
        None if amount_paid.is_positive() => Err(AppError::Validation(
            "paymentType is required when an amount is paid".to_string(),
        )),
        None => Ok("none".to_string()),
    }
}

pub(crate) fn member_details(member: &Member) -> Vec<(String, String)> {
    let mut details = vec![
        ("Member ID".to_string(), member.member_code.clone()),
        ("Phone".to_string(), member.phone.clone()),
        ("Term".to_string(), member.current_term.to_string()),
    ];
    if let (Some(start), Some(end)) = (member.subscription_start_date, member.subscription_end_date) {
        details.push(("Membership".to_string(), format!("{start} to {end}")));
    }
    if member.arrears_amount.is_positive() {
        details.push(("Previous balance".to_string(), member.arrears_amount.to_string()));
    }
    details.push(("Total fees".to_string(), member.membership_fees.to_string()));
    details
}

// ─── Projections ──────────────────────────────────────────────────────────────

/// Re-derive the paid projection of one invoice. Returns rows changed.
async fn sync_invoice(conn: &mut SqliteConnection, member_id: Uuid, term: i64) -> AppResult<u64> {
    let Some(invoice) = db::invoices::find_for_term(&mut *conn, member_id, term).await? else {
        return Ok(0);
    };
    let paid = db::receipts::sum_member_paid(&mut *conn, member_id, term).await?;
    let status = PaymentStatus::derive(invoice.total_amount, paid);
    db::invoices::set_paid(&mut *conn, member_id, term, paid, status).await
}

/// Re-derive member and invoice totals for the member's current term.
/// The flag reports whether any stored value changed.
pub(crate) async fn sync_member_totals(
    conn: &mut SqliteConnection,
    member_id: Uuid,
) -> AppResult<(MemberTotals, bool)> {
    let member = db::members::get(&mut *conn, member_id).await?;
    let paid = db::receipts::sum_member_paid(&mut *conn, member.id, member.current_term).await?;
    let due = member.membership_fees.saturating_due(paid);
    let status = PaymentStatus::derive(member.membership_fees, paid);

    let member_rows =
        db::members::set_totals(&mut *conn, member.id, paid, due, status, Utc::now()).await?;
    let invoice_rows = sync_invoice(conn, member.id, member.current_term).await?;

    let totals = MemberTotals {
        member_id: member.id,
        membership_fees: member.membership_fees,
        paid_amount: paid,
        due_amount: due,
        payment_status: status,
    };
    Ok((totals, member_rows + invoice_rows > 0))
}

/// Create the invoice for a member's current term and, when something was
/// paid at the desk, the receipt that goes with it.
pub(crate) async fn open_term(
    conn: &mut SqliteConnection,
    member: &Member,
    amount_paid: Money,
    payment_type: Option<&str>,
    transaction_type: TransactionType,
    created_by: Option<String>,
    always_receipt: bool,
) -> AppResult<Option<Receipt>> {
    if amount_paid > member.membership_fees {
        return Err(AppError::PaymentExceedsDue {
            amount: amount_paid.to_string(),
            due: member.membership_fees.to_string(),
        });
    }
    if amount_paid < Money::ZERO {
        return Err(AppError::Validation("Amount paid cannot be negative".to_string()));
    }
    let payment_type = payment_type_for(payment_type, amount_paid)?;

    db::invoices::upsert_for_term(&mut *conn, member.id, member.current_term, member.membership_fees)
        .await?;

    let receipt = if always_receipt || amount_paid.is_positive() {
        let new = NewReceipt {
            member_id: Some(member.id),
            staff_id: None,
            payer_name: member.full_name.clone(),
            term: member.current_term,
            amount: member.membership_fees,
            amount_paid,
            payment_type,
            receipt_category: ReceiptCategory::Member,
            transaction_type,
            notes: None,
            created_by,
        };
        Some(db::receipts::insert(&mut *conn, &new).await?)
    } else {
        None
    };

    sync_member_totals(conn, member.id).await?;
    Ok(receipt)
}

// ─── Operations ───────────────────────────────────────────────────────────────

/// Take money against the member's outstanding due (bridge: `payMemberDueAmount`).
///
/// Settling the due moves `payment_status` to paid and reactivates a partial
/// or inactive member. `subscription_status` is left alone; it follows the
/// subscription dates only.
pub async fn record_payment(
    state: &AppState,
    member_id: Uuid,
    body: PayDueRequest,
) -> AppResult<MemberReceipt> {
    if !body.amount.is_positive() {
        return Err(AppError::Validation(
            "Payment amount must be greater than zero".to_string(),
        ));
    }
    let payment_type = payment_type_for(Some(body.payment_type.as_str()), body.amount)?;

    let mut tx = state.db.begin().await?;
    let member = db::members::get(&mut *tx, member_id).await?;
    let paid = db::receipts::sum_member_paid(&mut *tx, member.id, member.current_term).await?;
    let prior_due = member.membership_fees.saturating_due(paid);

    if body.amount > prior_due {
        return Err(AppError::PaymentExceedsDue {
            amount: body.amount.to_string(),
            due: prior_due.to_string(),
        });
    }

    let new = NewReceipt {
        member_id: Some(member.id),
        staff_id: None,
        payer_name: member.full_name.clone(),
        term: member.current_term,
        amount: prior_due,
        amount_paid: body.amount,
        payment_type,
        receipt_category: ReceiptCategory::Member,
        transaction_type: TransactionType::Payment,
        notes: body.notes,
        created_by: body.created_by,
    };
    let mut receipt = db::receipts::insert(&mut *tx, &new).await?;

    let (totals, _) = sync_member_totals(&mut *tx, member.id).await?;
    if totals.due_amount == Money::ZERO
        && matches!(member.status, MemberStatus::Partial | MemberStatus::Inactive)
    {
        db::members::set_status(&mut *tx, member.id, MemberStatus::Active, Utc::now()).await?;
    }
    let member = db::members::get(&mut *tx, member.id).await?;
    tx.commit().await?;

    info!(
        "Payment {} of {} recorded for member {} (due now {})",
        receipt.receipt_number, body.amount, member.member_code, member.due_amount
    );

    pdf::store_receipt_pdf(state, &mut receipt, DocumentKind::Receipt, member_details(&member)).await;

    Ok(MemberReceipt {
        member,
        receipt: Some(receipt),
    })
}

/// Manual member receipt; same rules as a payment.
pub async fn create_receipt(state: &AppState, body: CreateReceiptRequest) -> AppResult<MemberReceipt> {
    let payment = PayDueRequest {
        amount: body.amount_paid,
        payment_type: body.payment_type,
        notes: body.notes,
        created_by: body.created_by,
    };
    record_payment(state, body.member_id, payment).await
}

/// Authoritative resync from receipts. Safe to call repeatedly.
pub async fn recalculate_member_totals(pool: &SqlitePool, member_id: Uuid) -> AppResult<MemberTotals> {
    let mut tx = pool.begin().await?;
    let (totals, changed) = sync_member_totals(&mut *tx, member_id).await?;
    tx.commit().await?;

    if changed {
        debug!("Member {} totals corrected to due {}", member_id, totals.due_amount);
    }
    Ok(totals)
}

/// Resync every member, one transaction each.
pub async fn refresh_all_member_due_amounts(pool: &SqlitePool) -> AppResult<BatchResult> {
    let ids = db::members::list_ids(pool).await?;
    let mut updated = 0;

    for id in &ids {
        let mut tx = pool.begin().await?;
        let (_, changed) = sync_member_totals(&mut *tx, *id).await?;
        tx.commit().await?;
        if changed {
            updated += 1;
        }
    }

    info!("Refreshed due amounts: {} members, {} updated", ids.len(), updated);
    Ok(BatchResult {
        processed: ids.len() as u64,
        updated,
    })
}

/// Re-derive `subscription_status` for active and inactive members.
pub async fn update_subscription_statuses(
    pool: &SqlitePool,
    as_of: NaiveDate,
    window_days: i64,
) -> AppResult<BatchResult> {
    let members = db::members::list_with_end_date(pool).await?;
    let now = Utc::now();
    let mut updated = 0;

    for member in &members {
        let Some(end) = member.subscription_end_date else {
            continue;
        };
        let status = classify_subscription(end, as_of, window_days);
        updated += db::members::set_subscription_status(pool, member.id, status, now).await?;
    }

    info!(
        "Subscription statuses as of {}: {} members, {} changed",
        as_of,
        members.len(),
        updated
    );
    Ok(BatchResult {
        processed: members.len() as u64,
        updated,
    })
}

/// Start a new billing term from `today`.
///
/// Whatever the closing term still owes is carried into the new term as
/// `arrears_amount` and recorded on the old invoice as `carried_amount`, so
/// the balance stays collectable through the current term.
pub async fn renew_membership(
    state: &AppState,
    member_id: Uuid,
    body: RenewMembershipRequest,
    today: NaiveDate,
) -> AppResult<MemberReceipt> {
    let months = body.plan_type.months(body.plan_months).ok_or_else(|| {
        AppError::Validation("Custom plans need planMonths of at least 1".to_string())
    })?;
    let end = add_months_preserving_month_end(today, months)
        .ok_or_else(|| AppError::Validation("Renewal end date is out of range".to_string()))?;
    let fees = compute_total_fees(Money::ZERO, body.fees.package_fee, body.fees.discount);

    let mut tx = state.db.begin().await?;
    let mut member = db::members::get(&mut *tx, member_id).await?;
    if member.status == MemberStatus::Partial {
        return Err(AppError::BadRequest(format!(
            "Member {} has no membership to renew yet",
            member.member_code
        )));
    }
    if let Some(package_id) = body.package_id {
        ensure_active_package(&mut tx, package_id).await?;
        member.package_id = Some(package_id);
    }

    let closing_paid =
        db::receipts::sum_member_paid(&mut *tx, member.id, member.current_term).await?;
    let arrears = member.membership_fees.saturating_due(closing_paid);
    db::invoices::set_carried(&mut *tx, member.id, member.current_term, arrears).await?;
    let total = fees + arrears;

    member.current_term += 1;
    member.plan_type = Some(body.plan_type);
    member.plan_months = Some(i64::from(months));
    member.registration_fee = Money::ZERO;
    member.package_fee = body.fees.package_fee;
    member.discount = body.fees.discount;
    member.arrears_amount = arrears;
    member.membership_fees = total;
    member.paid_amount = Money::ZERO;
    member.due_amount = total;
    member.payment_status = PaymentStatus::derive(total, Money::ZERO);
    member.subscription_start_date = Some(today);
    member.subscription_end_date = Some(end);
    member.subscription_status = Some(classify_subscription(
        end,
        today,
        state.config.expiring_soon_days,
    ));
    member.status = MemberStatus::Active;
    member.updated_at = Utc::now();
    db::members::save_membership(&mut *tx, &member).await?;

    let mut receipt = open_term(
        &mut tx,
        &member,
        body.fees.amount_paid,
        body.fees.payment_type.as_deref(),
        TransactionType::Renewal,
        body.created_by,
        true,
    )
    .await?;
    let member = db::members::get(&mut *tx, member.id).await?;
    tx.commit().await?;

    info!(
        "Member {} renewed for term {} until {} (carried {})",
        member.member_code, member.current_term, end, arrears
    );

    if let Some(receipt) = receipt.as_mut() {
        pdf::store_receipt_pdf(state, receipt, DocumentKind::Receipt, member_details(&member)).await;
    }
    Ok(MemberReceipt { member, receipt })
}

/// Change the fee structure of the current term.
pub async fn update_member_fees(
    pool: &SqlitePool,
    member_id: Uuid,
    body: UpdateMemberFeesRequest,
) -> AppResult<Member> {
    let mut tx = pool.begin().await?;
    let mut member = db::members::get(&mut *tx, member_id).await?;
    if member.status == MemberStatus::Partial {
        return Err(AppError::BadRequest(format!(
            "Member {} has no membership yet",
            member.member_code
        )));
    }
    let total = compute_total_fees(body.registration_fee, body.package_fee, body.discount)
        + member.arrears_amount;
    let paid = db::receipts::sum_member_paid(&mut *tx, member.id, member.current_term).await?;
    if total < paid {
        return Err(AppError::Validation(format!(
            "New total {} is below the {} already paid this term",
            total, paid
        )));
    }

    member.registration_fee = body.registration_fee;
    member.package_fee = body.package_fee;
    member.discount = body.discount;
    member.membership_fees = total;
    member.updated_at = Utc::now();
    db::members::save_membership(&mut *tx, &member).await?;
    db::invoices::upsert_for_term(&mut *tx, member.id, member.current_term, total).await?;
    sync_member_totals(&mut *tx, member.id).await?;

    let member = db::members::get(&mut *tx, member.id).await?;
    tx.commit().await?;

    info!("Fees for member {} set to {}", member.member_code, total);
    Ok(member)
}

/// Replace a receipt with a corrected version under the same number.
pub async fn supersede_receipt(
    state: &AppState,
    receipt_id: Uuid,
    body: SupersedeReceiptRequest,
) -> AppResult<Receipt> {
    if body.amount_paid < Money::ZERO {
        return Err(AppError::Validation("Amount paid cannot be negative".to_string()));
    }

    let mut tx = state.db.begin().await?;
    let old = db::receipts::get(&mut *tx, receipt_id).await?;
    if !old.is_current_version {
        return Err(AppError::Conflict(format!(
            "Version {} of receipt {} has already been superseded",
            old.version_number, old.receipt_number
        )));
    }

    let category = old.receipt_category.unwrap_or(ReceiptCategory::Member);
    let amount = match category {
        ReceiptCategory::Member => old.amount,
        ReceiptCategory::StaffSalary | ReceiptCategory::StaffBonus => body.amount_paid,
        ReceiptCategory::StaffSalaryUpdate => {
            return Err(AppError::BadRequest(
                "Salary change records cannot be superseded".to_string(),
            ));
        }
    };

    let member_id = old.member_id.filter(|_| category == ReceiptCategory::Member);
    if let Some(member_id) = member_id {
        let member = db::members::get(&mut *tx, member_id).await?;
        if old.term < member.current_term {
            return Err(AppError::Conflict(format!(
                "Receipt {} belongs to term {}, which closed when member {} renewed",
                old.receipt_number, old.term, member.member_code
            )));
        }
        let paid = db::receipts::sum_member_paid(&mut *tx, member_id, old.term).await?;
        let limit = db::invoices::find_for_term(&mut *tx, member_id, old.term)
            .await?
            .map(|invoice| invoice.total_amount)
            .unwrap_or(old.amount);
        let others = paid - old.amount_paid;
        if others + body.amount_paid > limit {
            return Err(AppError::PaymentExceedsDue {
                amount: body.amount_paid.to_string(),
                due: limit.saturating_due(others).to_string(),
            });
        }
    }

    db::receipts::mark_superseded(&mut *tx, old.id).await?;
    let new = NewReceipt {
        member_id: old.member_id,
        staff_id: old.staff_id,
        payer_name: old.payer_name.clone(),
        term: old.term,
        amount,
        amount_paid: body.amount_paid,
        payment_type: body
            .payment_type
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| old.payment_type.clone()),
        receipt_category: category,
        transaction_type: old.transaction_type,
        notes: body.notes.or_else(|| old.notes.clone()),
        created_by: body.created_by.or_else(|| old.created_by.clone()),
    };
    let root_id = old.original_receipt_id.unwrap_or(old.id);
    let mut receipt = db::receipts::insert_version(
        &mut *tx,
        &new,
        &old.receipt_number,
        Some(root_id),
        old.version_number + 1,
    )
    .await?;

    let mut details = vec![(
        "Replaces".to_string(),
        format!("{} version {}", old.receipt_number, old.version_number),
    )];
    if let Some(member_id) = member_id {
        sync_member_totals(&mut *tx, member_id).await?;
        let member = db::members::get(&mut *tx, member_id).await?;
        details.push(("Member ID".to_string(), member.member_code));
    }
    tx.commit().await?;

    info!(
        "Receipt {} superseded by version {}",
        receipt.receipt_number, receipt.version_number
    );

    let kind = match category {
        ReceiptCategory::Member => DocumentKind::Receipt,
        _ => DocumentKind::SalarySlip,
    };
    pdf::store_receipt_pdf(state, &mut receipt, kind, details).await;
    Ok(receipt)
}

pub(crate) async fn ensure_active_package(conn: &mut SqliteConnection, package_id: Uuid) -> AppResult<()> {
    match db::master::find_package(conn, package_id).await? {
        Some(package) if package.is_active => Ok(()),
        Some(package) => Err(AppError::Validation(format!(
            "Package '{}' is no longer offered",
            package.name
        ))),
        None => Err(AppError::Validation(format!(
            "Package {} does not exist",
            package_id
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{PlanType, RenewalFees},
        services::test_support::{register, test_state},
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn pay(amount: i64) -> PayDueRequest {
        PayDueRequest {
            amount: Money::from_major(amount),
            payment_type: "cash".to_string(),
            notes: None,
            created_by: Some("desk".to_string()),
        }
    }

    #[test]
    fn total_fees_clamp_at_zero() {
        let m = Money::from_major;
        assert_eq!(compute_total_fees(m(500), m(1500), m(100)), m(1900));
        assert_eq!(compute_total_fees(m(0), m(0), m(0)), Money::ZERO);
        assert_eq!(compute_total_fees(m(500), m(1500), m(2000)), Money::ZERO);
        assert_eq!(compute_total_fees(m(500), m(1500), m(2500)), Money::ZERO);
        for (r, p, d) in [(0, 999, 1), (250, 0, 250), (1, 2, 4), (1200, 300, 0)] {
            let expected = Money::from_major((r + p - d).max(0));
            assert_eq!(compute_total_fees(m(r), m(p), m(d)), expected);
        }

        let huge = Money::from_minor(i64::MAX);
        assert_eq!(compute_total_fees(huge, huge, Money::ZERO), huge);
        assert_eq!(compute_total_fees(Money::ZERO, Money::ZERO, huge), Money::ZERO);
    }

    #[test]
    fn month_addition_keeps_month_end() {
        assert_eq!(add_months_preserving_month_end(date(2025, 1, 31), 1), Some(date(2025, 2, 28)));
        assert_eq!(add_months_preserving_month_end(date(2024, 1, 31), 1), Some(date(2024, 2, 29)));
        assert_eq!(add_months_preserving_month_end(date(2024, 2, 29), 1), Some(date(2024, 3, 31)));
        assert_eq!(add_months_preserving_month_end(date(2025, 4, 30), 1), Some(date(2025, 5, 31)));
        assert_eq!(add_months_preserving_month_end(date(2025, 1, 30), 1), Some(date(2025, 2, 28)));
        assert_eq!(add_months_preserving_month_end(date(2025, 1, 15), 3), Some(date(2025, 4, 15)));
        assert_eq!(add_months_preserving_month_end(date(2025, 8, 31), 6), Some(date(2026, 2, 28)));
        assert_eq!(add_months_preserving_month_end(date(2025, 3, 10), 12), Some(date(2026, 3, 10)));
    }

    #[test]
    fn subscription_classification_uses_window() {
        let today = date(2025, 6, 10);
        assert_eq!(classify_subscription(date(2025, 6, 9), today, 7), SubscriptionStatus::Expired);
        assert_eq!(classify_subscription(today, today, 7), SubscriptionStatus::ExpiringSoon);
        assert_eq!(classify_subscription(date(2025, 6, 17), today, 7), SubscriptionStatus::ExpiringSoon);
        assert_eq!(classify_subscription(date(2025, 6, 18), today, 7), SubscriptionStatus::Active);
        assert_eq!(classify_subscription(date(2025, 6, 18), today, 30), SubscriptionStatus::ExpiringSoon);
    }

    #[tokio::test]
    async fn full_payment_clears_due() {
        let state = test_state().await;
        let member = register(&state, "Asha Rao", 500, 1500, 100, date(2025, 1, 1)).await;
        assert_eq!(member.membership_fees, Money::from_major(1900));
        assert_eq!(member.due_amount, Money::from_major(1900));
        assert_eq!(member.payment_status, PaymentStatus::Unpaid);

        let paid = record_payment(&state, member.id, pay(1900)).await.unwrap();

        assert_eq!(paid.member.due_amount, Money::ZERO);
        assert_eq!(paid.member.paid_amount, Money::from_major(1900));
        assert_eq!(paid.member.payment_status, PaymentStatus::Paid);
        assert_eq!(paid.member.status, MemberStatus::Active);
        let receipt = paid.receipt.unwrap();
        assert_eq!(receipt.amount, Money::from_major(1900));
        assert_eq!(receipt.due_amount, Money::ZERO);
        assert_eq!(receipt.transaction_type, TransactionType::Payment);
        // The test renderer always fails; the payment must still stand.
        assert!(receipt.pdf_path.is_none());
    }

    #[tokio::test]
    async fn partial_payments_step_down_due() {
        let state = test_state().await;
        let member = register(&state, "Ravi Kumar", 500, 1500, 100, date(2025, 1, 1)).await;

        let first = record_payment(&state, member.id, pay(1000)).await.unwrap();
        assert_eq!(first.member.due_amount, Money::from_major(900));
        assert_eq!(first.member.paid_amount, Money::from_major(1000));
        assert_eq!(first.member.payment_status, PaymentStatus::Partial);
        assert_eq!(first.receipt.unwrap().due_amount, Money::from_major(900));

        let second = record_payment(&state, member.id, pay(900)).await.unwrap();
        assert_eq!(second.member.due_amount, Money::ZERO);
        assert_eq!(second.member.paid_amount, Money::from_major(1900));
        assert_eq!(second.member.payment_status, PaymentStatus::Paid);

        let invoice = db::invoices::find_for_term(&state.db, member.id, 1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(invoice.paid_amount, Money::from_major(1900));
        assert_eq!(invoice.status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn rejected_payments_change_nothing() {
        let state = test_state().await;
        let member = register(&state, "Meera Iyer", 500, 1500, 100, date(2025, 1, 1)).await;

        let err = record_payment(&state, member.id, pay(2000)).await.unwrap_err();
        assert!(matches!(err, AppError::PaymentExceedsDue { .. }));
        let err = record_payment(&state, member.id, pay(0)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let err = record_payment(&state, member.id, pay(-5)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let after = db::members::get(&state.db, member.id).await.unwrap();
        assert_eq!(after.paid_amount, Money::ZERO);
        assert_eq!(after.due_amount, Money::from_major(1900));
        let receipts = db::receipts::list_current(&state.db, Some(member.id), None).await.unwrap();
        assert!(receipts.is_empty());
    }

    #[tokio::test]
    async fn recalculation_restores_tampered_totals() {
        let state = test_state().await;
        let member = register(&state, "Kiran Das", 0, 3000, 0, date(2025, 1, 1)).await;
        record_payment(&state, member.id, pay(1200)).await.unwrap();

        sqlx::query("UPDATE members SET paid_amount = 0, due_amount = 3000 WHERE id = ?")
            .bind(member.id)
            .execute(&state.db)
            .await
            .unwrap();

        let first = recalculate_member_totals(&state.db, member.id).await.unwrap();
        let second = recalculate_member_totals(&state.db, member.id).await.unwrap();

        assert_eq!(first.paid_amount, Money::from_major(1200));
        assert_eq!(first.due_amount, Money::from_major(1800));
        assert_eq!(first.payment_status, PaymentStatus::Partial);
        assert_eq!(second.paid_amount, first.paid_amount);
        assert_eq!(second.due_amount, first.due_amount);

        let stored = db::members::get(&state.db, member.id).await.unwrap();
        assert_eq!(stored.paid_amount, Money::from_major(1200));
        assert_eq!(stored.due_amount, Money::from_major(1800));
    }

    #[tokio::test]
    async fn refresh_all_reports_only_real_changes() {
        let state = test_state().await;
        let a = register(&state, "A One", 0, 1000, 0, date(2025, 1, 1)).await;
        let b = register(&state, "B Two", 0, 2000, 0, date(2025, 1, 1)).await;
        record_payment(&state, a.id, pay(400)).await.unwrap();

        sqlx::query("UPDATE members SET due_amount = 0, payment_status = 'paid'")
            .execute(&state.db)
            .await
            .unwrap();

        let first = refresh_all_member_due_amounts(&state.db).await.unwrap();
        assert_eq!(first.processed, 2);
        assert_eq!(first.updated, 2);

        let second = refresh_all_member_due_amounts(&state.db).await.unwrap();
        assert_eq!(second.updated, 0);

        let b = db::members::get(&state.db, b.id).await.unwrap();
        assert_eq!(b.due_amount, Money::from_major(2000));
        assert_eq!(b.payment_status, PaymentStatus::Unpaid);
    }

    #[tokio::test]
    async fn lapsed_subscription_expires_once() {
        let state = test_state().await;
        // Monthly from 2025-01-10 ends 2025-02-10.
        let lapsed = register(&state, "Lapsed", 0, 1000, 0, date(2025, 1, 10)).await;
        let current = register(&state, "Current", 0, 1000, 0, date(2025, 2, 5)).await;
        let frozen = register(&state, "Frozen", 0, 1000, 0, date(2025, 1, 10)).await;
        db::members::set_status(&state.db, frozen.id, MemberStatus::Frozen, Utc::now())
            .await
            .unwrap();

        let as_of = date(2025, 2, 11);
        let first = update_subscription_statuses(&state.db, as_of, 7).await.unwrap();
        assert_eq!(first.processed, 2);

        let lapsed = db::members::get(&state.db, lapsed.id).await.unwrap();
        assert_eq!(lapsed.subscription_status, Some(SubscriptionStatus::Expired));
        let current = db::members::get(&state.db, current.id).await.unwrap();
        assert_eq!(current.subscription_status, Some(SubscriptionStatus::Active));
        let frozen_after = db::members::get(&state.db, frozen.id).await.unwrap();
        assert_eq!(frozen_after.subscription_status, frozen.subscription_status);

        let second = update_subscription_statuses(&state.db, as_of, 7).await.unwrap();
        assert_eq!(second.updated, 0);
    }

    #[tokio::test]
    async fn renewal_opens_a_new_term() {
        let state = test_state().await;
        let member = register(&state, "Neha Shah", 500, 1500, 100, date(2025, 1, 1)).await;
        record_payment(&state, member.id, pay(1000)).await.unwrap();

        let renewal = RenewMembershipRequest {
            plan_type: PlanType::Monthly,
            plan_months: None,
            package_id: None,
            fees: RenewalFees {
                package_fee: Money::from_major(1500),
                discount: Money::from_major(200),
                amount_paid: Money::from_major(1000),
                payment_type: Some("upi".to_string()),
            },
            created_by: None,
        };
        let renewed = renew_membership(&state, member.id, renewal, date(2025, 1, 31))
            .await
            .unwrap();

        let m = &renewed.member;
        assert_eq!(m.current_term, 2);
        assert_eq!(m.subscription_start_date, Some(date(2025, 1, 31)));
        assert_eq!(m.subscription_end_date, Some(date(2025, 2, 28)));
        assert_eq!(m.subscription_status, Some(SubscriptionStatus::Active));
        assert_eq!(m.status, MemberStatus::Active);
        assert_eq!(m.registration_fee, Money::ZERO);
        assert_eq!(m.arrears_amount, Money::from_major(900));
        assert_eq!(m.membership_fees, Money::from_major(2200));
        assert_eq!(m.paid_amount, Money::from_major(1000));
        assert_eq!(m.due_amount, Money::from_major(1200));

        let receipt = renewed.receipt.unwrap();
        assert_eq!(receipt.transaction_type, TransactionType::Renewal);
        assert_eq!(receipt.term, 2);
        assert_eq!(receipt.amount, Money::from_major(2200));

        let old = db::invoices::find_for_term(&state.db, member.id, 1).await.unwrap().unwrap();
        assert_eq!(old.status, PaymentStatus::Partial);
        assert_eq!(old.carried_amount, Money::from_major(900));
        let new = db::invoices::find_for_term(&state.db, member.id, 2).await.unwrap().unwrap();
        assert_eq!(new.total_amount, Money::from_major(2200));
        assert_eq!(new.carried_amount, Money::ZERO);
    }

    #[tokio::test]
    async fn unpaid_balance_survives_renewal() {
        let state = test_state().await;
        let member = register(&state, "Ravi Iyer", 500, 1500, 100, date(2025, 1, 1)).await;
        let first = record_payment(&state, member.id, pay(1000)).await.unwrap();
        assert_eq!(
            db::invoices::total_outstanding(&state.db).await.unwrap(),
            Money::from_major(900)
        );

        // New term paid in full at the desk; term 1 still owes 900.
        let renewal = RenewMembershipRequest {
            plan_type: PlanType::Monthly,
            plan_months: None,
            package_id: None,
            fees: RenewalFees {
                package_fee: Money::from_major(1500),
                discount: Money::ZERO,
                amount_paid: Money::from_major(1500),
                payment_type: Some("cash".to_string()),
            },
            created_by: None,
        };
        let renewed = renew_membership(&state, member.id, renewal, date(2025, 2, 1))
            .await
            .unwrap();
        assert_eq!(renewed.member.due_amount, Money::from_major(900));
        assert_eq!(renewed.member.payment_status, PaymentStatus::Partial);

        assert_eq!(
            db::invoices::total_outstanding(&state.db).await.unwrap(),
            Money::from_major(900)
        );
        let owing = db::members::list_with_due(&state.db).await.unwrap();
        assert_eq!(owing.len(), 1);
        assert_eq!(owing[0].due_amount, Money::from_major(900));

        // Closed-term receipts are frozen once their balance has moved on.
        let correction = SupersedeReceiptRequest {
            amount_paid: Money::from_major(1900),
            payment_type: None,
            notes: None,
            created_by: None,
        };
        let err = supersede_receipt(&state, first.receipt.unwrap().id, correction)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let settled = record_payment(&state, member.id, pay(900)).await.unwrap();
        assert_eq!(settled.member.due_amount, Money::ZERO);
        assert_eq!(settled.member.payment_status, PaymentStatus::Paid);
        assert_eq!(settled.receipt.unwrap().term, 2);
        assert_eq!(
            db::invoices::total_outstanding(&state.db).await.unwrap(),
            Money::ZERO
        );
        assert!(db::members::list_with_due(&state.db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn renewal_rejects_bad_custom_plan() {
        let state = test_state().await;
        let member = register(&state, "Custom", 0, 1000, 0, date(2025, 1, 1)).await;
        let renewal = RenewMembershipRequest {
            plan_type: PlanType::Custom,
            plan_months: Some(0),
            package_id: None,
            fees: RenewalFees {
                package_fee: Money::from_major(1000),
                discount: Money::ZERO,
                amount_paid: Money::ZERO,
                payment_type: None,
            },
            created_by: None,
        };
        let err = renew_membership(&state, member.id, renewal, date(2025, 2, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(db::members::get(&state.db, member.id).await.unwrap().current_term, 1);
    }

    #[tokio::test]
    async fn fee_change_cannot_undercut_payments() {
        let state = test_state().await;
        let member = register(&state, "Fee Change", 500, 1500, 0, date(2025, 1, 1)).await;
        record_payment(&state, member.id, pay(1500)).await.unwrap();

        let too_low = UpdateMemberFeesRequest {
            registration_fee: Money::ZERO,
            package_fee: Money::from_major(1500),
            discount: Money::from_major(100),
        };
        let err = update_member_fees(&state.db, member.id, too_low).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let ok = UpdateMemberFeesRequest {
            registration_fee: Money::ZERO,
            package_fee: Money::from_major(1500),
            discount: Money::ZERO,
        };
        let updated = update_member_fees(&state.db, member.id, ok).await.unwrap();
        assert_eq!(updated.membership_fees, Money::from_major(1500));
        assert_eq!(updated.due_amount, Money::ZERO);
        assert_eq!(updated.payment_status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn superseding_keeps_history_and_totals() {
        let state = test_state().await;
        let member = register(&state, "Sam Paul", 500, 1500, 100, date(2025, 1, 1)).await;
        let paid = record_payment(&state, member.id, pay(1000)).await.unwrap();
        let original = paid.receipt.unwrap();

        let correction = SupersedeReceiptRequest {
            amount_paid: Money::from_major(500),
            payment_type: None,
            notes: Some("entered twice".to_string()),
            created_by: None,
        };
        let revised = supersede_receipt(&state, original.id, correction.clone()).await.unwrap();
        assert_eq!(revised.receipt_number, original.receipt_number);
        assert_eq!(revised.version_number, 2);
        assert_eq!(revised.original_receipt_id, Some(original.id));
        assert_eq!(revised.payment_type, "cash");

        let member = db::members::get(&state.db, member.id).await.unwrap();
        assert_eq!(member.paid_amount, Money::from_major(500));
        assert_eq!(member.due_amount, Money::from_major(1400));

        let history = db::receipts::history(&state.db, &original.receipt_number).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(!history[0].is_current_version);
        assert!(history[1].is_current_version);

        let err = supersede_receipt(&state, original.id, correction).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let too_much = SupersedeReceiptRequest {
            amount_paid: Money::from_major(2000),
            payment_type: None,
            notes: None,
            created_by: None,
        };
        let err = supersede_receipt(&state, revised.id, too_much).await.unwrap_err();
        assert!(matches!(err, AppError::PaymentExceedsDue { .. }));
    }
}
