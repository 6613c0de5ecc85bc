use super::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

// ─── Plans ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    Monthly,
    Quarterly,
    HalfYearly,
    Yearly,
    /// Length given explicitly in `planMonths`.
    Custom,
}

impl PlanType {
    /// Subscription length in months. `custom_months` is only read for
    /// [`PlanType::Custom`] and must be at least one.
    pub fn months(self, custom_months: Option<i64>) -> Option<u32> {
        match self {
            PlanType::Monthly => Some(1),
            PlanType::Quarterly => Some(3),
            PlanType::HalfYearly => Some(6),
            PlanType::Yearly => Some(12),
            PlanType::Custom => custom_months
                .filter(|m| *m >= 1)
                .and_then(|m| u32::try_from(m).ok()),
        }
    }
}

// ─── Payment status ───────────────────────────────────────────────────────────

/// Shared by members and invoices.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Partial,
    Paid,
}

impl PaymentStatus {
    pub fn derive(total: Money, paid: Money) -> Self {
        if total.saturating_due(paid) == Money::ZERO {
            PaymentStatus::Paid
        } else if paid.is_positive() {
            PaymentStatus::Partial
        } else {
            PaymentStatus::Unpaid
        }
    }
}

// ─── Receipt ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReceiptCategory {
    Member,
    StaffSalary,
    StaffBonus,
    StaffSalaryUpdate,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Registration,
    Payment,
    Renewal,
    Salary,
    Adjustment,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub id: Uuid,
    /// Shared by every version of the same receipt.
    pub receipt_number: String,
    pub member_id: Option<Uuid>,
    pub staff_id: Option<Uuid>,
    pub payer_name: String,
    pub term: i64,
    /// Total attributable to this transaction.
    pub amount: Money,
    pub amount_paid: Money,
    /// `max(0, amount - amount_paid)`
    pub due_amount: Money,
    pub payment_type: String,
    /// `None` is read as [`ReceiptCategory::Member`].
    pub receipt_category: Option<ReceiptCategory>,
    pub transaction_type: TransactionType,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub pdf_path: Option<String>,
    pub original_receipt_id: Option<Uuid>,
    pub version_number: i64,
    pub is_current_version: bool,
    pub created_at: DateTime<Utc>,
}

/// Everything needed to insert a receipt row; ids, numbering and versioning
/// are filled in by the statement module.
#[derive(Debug, Clone)]
pub struct NewReceipt {
    pub member_id: Option<Uuid>,
    pub staff_id: Option<Uuid>,
    pub payer_name: String,
    pub term: i64,
    pub amount: Money,
    pub amount_paid: Money,
    pub payment_type: String,
    pub receipt_category: ReceiptCategory,
    pub transaction_type: TransactionType,
    pub notes: Option<String>,
    pub created_by: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReceiptRequest {
    pub member_id: Uuid,
    pub amount_paid: Money,
    pub payment_type: String,
    pub notes: Option<String>,
    pub created_by: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupersedeReceiptRequest {
    pub amount_paid: Money,
    pub payment_type: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReceiptListQuery {
    pub member_id: Option<Uuid>,
    pub staff_id: Option<Uuid>,
}

// ─── Invoice ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Uuid,
    pub member_id: Uuid,
    pub term: i64,
    pub invoice_number: String,
    pub total_amount: Money,
    pub paid_amount: Money,
    /// Balance moved into the next term's fees when the member renewed.
    pub carried_amount: Money,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ─── Reconciliation results ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberTotals {
    pub member_id: Uuid,
    pub membership_fees: Money,
    pub paid_amount: Money,
    pub due_amount: Money,
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    /// Members visited.
    pub processed: u64,
    /// Rows whose stored values changed.
    pub updated: u64,
}
