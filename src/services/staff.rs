// src/services/staff.rs

use crate::{
    db,
    errors::{AppError, AppResult},
    models::{
        CreateStaffRequest, Money, NewReceipt, PayStaffRequest, Receipt, ReceiptCategory, Staff,
        TransactionType, UpdateStaffSalaryRequest,
    },
    services::{
        billing,
        pdf::{self, DocumentKind},
        today,
    },
    state::AppState,
};
use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

pub async fn create_staff(pool: &SqlitePool, body: CreateStaffRequest) -> AppResult<Staff> {
    if body.full_name.trim().is_empty() || body.phone.trim().is_empty() || body.role.trim().is_empty()
    {
        return Err(AppError::Validation(
            "fullName, phone and role are required".to_string(),
        ));
    }
    if body.salary < Money::ZERO {
        return Err(AppError::Validation("Salary cannot be negative".to_string()));
    }

    let now = Utc::now();
    let staff = Staff {
        id: Uuid::new_v4(),
        full_name: body.full_name.trim().to_string(),
        phone: body.phone.trim().to_string(),
        email: body.email,
        role: body.role.trim().to_string(),
        salary: body.salary,
        joining_date: body.joining_date.unwrap_or_else(today),
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    let staff = db::staff::insert(pool, &staff).await?;

    info!("Staff member {} added as {}", staff.full_name, staff.role);
    Ok(staff)
}

/// "YYYY-MM" pay period check.
fn validate_pay_period(period: &str) -> AppResult<()> {
    NaiveDate::parse_from_str(&format!("{period}-01"), "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| AppError::Validation(format!("Pay period '{}' must look like 2025-01", period)))
}

/// Record a salary or bonus payout and print its slip.
pub async fn pay_staff_salary(
    state: &AppState,
    staff_id: Uuid,
    body: PayStaffRequest,
) -> AppResult<Receipt> {
    if !body.amount.is_positive() {
        return Err(AppError::Validation(
            "Payment amount must be greater than zero".to_string(),
        ));
    }
    let category = body.category.unwrap_or(ReceiptCategory::StaffSalary);
    if !matches!(category, ReceiptCategory::StaffSalary | ReceiptCategory::StaffBonus) {
        return Err(AppError::Validation(
            "category must be staff_salary or staff_bonus".to_string(),
        ));
    }
    if let Some(period) = &body.pay_period {
        validate_pay_period(period)?;
    }
    let payment_type = billing::payment_type_for(Some(body.payment_type.as_str()), body.amount)?;

    let staff = db::staff::get(&state.db, staff_id).await?;
    if !staff.is_active {
        return Err(AppError::BadRequest(format!(
            "{} is no longer on staff",
            staff.full_name
        )));
    }

    let label = match category {
        ReceiptCategory::StaffBonus => "Bonus",
        _ => "Salary",
    };
    let notes = body.pay_period.as_deref().map(|p| format!("{label} for {p}"));

    let new = NewReceipt {
        member_id: None,
        staff_id: Some(staff.id),
        payer_name: staff.full_name.clone(),
        term: 1,
        amount: body.amount,
        amount_paid: body.amount,
        payment_type,
        receipt_category: category,
        transaction_type: TransactionType::Salary,
        notes,
        created_by: body.created_by,
    };
    let mut tx = state.db.begin().await?;
    let mut receipt = db::receipts::insert(&mut tx, &new).await?;
    tx.commit().await?;

    info!(
        "{} {} of {} paid to {}",
        label, receipt.receipt_number, body.amount, staff.full_name
    );

    let mut details = vec![
        ("Role".to_string(), staff.role.clone()),
        ("Monthly salary".to_string(), staff.salary.to_string()),
    ];
    if let Some(period) = body.pay_period {
        details.push(("Pay period".to_string(), period));
    }
    pdf::store_receipt_pdf(state, &mut receipt, DocumentKind::SalarySlip, details).await;
    Ok(receipt)
}

/// Change the monthly salary and leave a zero-amount receipt as the audit trail.
pub async fn update_staff_salary(
    pool: &SqlitePool,
    staff_id: Uuid,
    body: UpdateStaffSalaryRequest,
) -> AppResult<Staff> {
    if body.salary < Money::ZERO {
        return Err(AppError::Validation("Salary cannot be negative".to_string()));
    }

    let mut tx = pool.begin().await?;
    let before = db::staff::get(&mut *tx, staff_id).await?;
    let staff = db::staff::set_salary(&mut *tx, staff_id, body.salary, Utc::now())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Staff member {} not found", staff_id)))?;

    let audit = NewReceipt {
        member_id: None,
        staff_id: Some(staff.id),
        payer_name: staff.full_name.clone(),
        term: 1,
        amount: Money::ZERO,
        amount_paid: Money::ZERO,
        payment_type: "none".to_string(),
        receipt_category: ReceiptCategory::StaffSalaryUpdate,
        transaction_type: TransactionType::Adjustment,
        notes: Some(format!("Salary changed from {} to {}", before.salary, staff.salary)),
        created_by: body.created_by,
    };
    db::receipts::insert(&mut tx, &audit).await?;
    tx.commit().await?;

    info!(
        "Salary of {} changed from {} to {}",
        staff.full_name, before.salary, staff.salary
    );
    Ok(staff)
}

pub async fn deactivate_staff(pool: &SqlitePool, staff_id: Uuid) -> AppResult<Staff> {
    if db::staff::deactivate(pool, staff_id, Utc::now()).await? == 0 {
        return Err(AppError::NotFound(format!("Staff member {} not found", staff_id)));
    }
    let staff = db::staff::get(pool, staff_id).await?;
    info!("Staff member {} deactivated", staff.full_name);
    Ok(staff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::test_state;

    fn hire(salary: i64) -> CreateStaffRequest {
        CreateStaffRequest {
            full_name: "Vikram Trainer".to_string(),
            phone: "9833333333".to_string(),
            email: None,
            role: "trainer".to_string(),
            salary: Money::from_major(salary),
            joining_date: None,
        }
    }

    fn payout(amount: i64, category: Option<ReceiptCategory>) -> PayStaffRequest {
        PayStaffRequest {
            amount: Money::from_major(amount),
            payment_type: "bank".to_string(),
            category,
            pay_period: Some("2025-01".to_string()),
            created_by: None,
        }
    }

    #[tokio::test]
    async fn salary_and_bonus_receipts() {
        let state = test_state().await;
        let staff = create_staff(&state.db, hire(20000)).await.unwrap();

        let salary = pay_staff_salary(&state, staff.id, payout(20000, None)).await.unwrap();
        assert_eq!(salary.receipt_category, Some(ReceiptCategory::StaffSalary));
        assert_eq!(salary.staff_id, Some(staff.id));
        assert_eq!(salary.due_amount, Money::ZERO);
        assert_eq!(salary.notes.as_deref(), Some("Salary for 2025-01"));

        let bonus = pay_staff_salary(&state, staff.id, payout(2500, Some(ReceiptCategory::StaffBonus)))
            .await
            .unwrap();
        assert_eq!(bonus.receipt_category, Some(ReceiptCategory::StaffBonus));

        let listed = db::receipts::list_current(&state.db, None, Some(staff.id)).await.unwrap();
        assert_eq!(listed.len(), 2);
    }

    #[tokio::test]
    async fn payouts_are_validated() {
        let state = test_state().await;
        let staff = create_staff(&state.db, hire(20000)).await.unwrap();

        let err = pay_staff_salary(&state, staff.id, payout(0, None)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = pay_staff_salary(&state, staff.id, payout(100, Some(ReceiptCategory::Member)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let mut bad_period = payout(100, None);
        bad_period.pay_period = Some("January".to_string());
        let err = pay_staff_salary(&state, staff.id, bad_period).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        deactivate_staff(&state.db, staff.id).await.unwrap();
        let err = pay_staff_salary(&state, staff.id, payout(100, None)).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn salary_change_leaves_audit_receipt() {
        let state = test_state().await;
        let staff = create_staff(&state.db, hire(18000)).await.unwrap();

        let updated = update_staff_salary(
            &state.db,
            staff.id,
            UpdateStaffSalaryRequest {
                salary: Money::from_major(21000),
                created_by: Some("owner".to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.salary, Money::from_major(21000));

        let receipts = db::receipts::list_current(&state.db, None, Some(staff.id)).await.unwrap();
        assert_eq!(receipts.len(), 1);
        let audit = &receipts[0];
        assert_eq!(audit.receipt_category, Some(ReceiptCategory::StaffSalaryUpdate));
        assert_eq!(audit.amount, Money::ZERO);
        assert_eq!(audit.notes.as_deref(), Some("Salary changed from 18000.00 to 21000.00"));
    }
}
