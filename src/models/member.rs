use super::{Money, PaymentStatus, PlanType};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

// ─── Statuses ─────────────────────────────────────────────────────────────────

/// Lifecycle of the member record itself.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Active,
    Inactive,
    Frozen,
    /// Identity saved, membership and fee details still pending.
    Partial,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    ExpiringSoon,
    Expired,
}

// ─── Member ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: Uuid,
    pub member_code: String,
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub occupation: Option<String>,
    pub emergency_contact: Option<String>,
    pub notes: Option<String>,
    pub package_id: Option<Uuid>,
    pub plan_type: Option<PlanType>,
    pub plan_months: Option<i64>,
    pub registration_fee: Money,
    pub package_fee: Money,
    pub discount: Money,
    /// Unpaid balance of the previous term, carried in on renewal.
    pub arrears_amount: Money,
    /// `max(0, registration_fee + package_fee - discount) + arrears_amount`
    /// for the current term.
    pub membership_fees: Money,
    pub paid_amount: Money,
    pub due_amount: Money,
    pub payment_status: PaymentStatus,
    pub subscription_start_date: Option<NaiveDate>,
    pub subscription_end_date: Option<NaiveDate>,
    pub subscription_status: Option<SubscriptionStatus>,
    pub status: MemberStatus,
    pub current_term: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Identity fields shared by full and partial registration.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberProfile {
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub occupation: Option<String>,
    pub emergency_contact: Option<String>,
    pub notes: Option<String>,
}

/// Membership and fee details, supplied at registration or when completing a
/// partial member.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MembershipDetails {
    pub package_id: Option<Uuid>,
    pub plan_type: PlanType,
    pub plan_months: Option<i64>,
    #[serde(default)]
    pub registration_fee: Money,
    #[serde(default)]
    pub package_fee: Money,
    #[serde(default)]
    pub discount: Money,
    /// Defaults to today.
    pub subscription_start_date: Option<NaiveDate>,
    /// Paid at the desk together with registration.
    #[serde(default)]
    pub initial_payment: Money,
    pub payment_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemberRequest {
    /// Operator-visible member ID; generated when omitted.
    pub member_code: Option<String>,
    #[serde(flatten)]
    pub profile: MemberProfile,
    pub membership: MembershipDetails,
    pub created_by: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePartialMemberRequest {
    pub member_code: Option<String>,
    #[serde(flatten)]
    pub profile: MemberProfile,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteMembershipRequest {
    pub membership: MembershipDetails,
    pub created_by: Option<String>,
}

/// Profile edit; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberRequest {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub occupation: Option<String>,
    pub emergency_contact: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberFeesRequest {
    pub registration_fee: Money,
    pub package_fee: Money,
    pub discount: Money,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetMemberStatusRequest {
    pub status: MemberStatus,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MemberListQuery {
    pub status: Option<MemberStatus>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DeleteMemberRequest {
    pub deleted_by: Option<String>,
}

// ─── Payments & Renewal ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayDueRequest {
    pub amount: Money,
    pub payment_type: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_by: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenewalFees {
    pub package_fee: Money,
    #[serde(default)]
    pub discount: Money,
    #[serde(default)]
    pub amount_paid: Money,
    pub payment_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenewMembershipRequest {
    pub plan_type: PlanType,
    pub plan_months: Option<i64>,
    pub package_id: Option<Uuid>,
    pub fees: RenewalFees,
    pub created_by: Option<String>,
}

/// A member together with the receipt written by the same operation.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberReceipt {
    pub member: Member,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<super::Receipt>,
}

/// Row of the member-list "due amount" view, read from invoices.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberDue {
    pub member_id: Uuid,
    pub member_code: String,
    pub full_name: String,
    pub phone: String,
    pub invoice_number: String,
    pub total_amount: Money,
    pub paid_amount: Money,
    pub due_amount: Money,
    pub status: PaymentStatus,
}

// ─── Archive ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletedMember {
    pub id: Uuid,
    pub member_id: Uuid,
    pub member_code: String,
    pub full_name: String,
    /// JSON copy of the member row at deletion time.
    pub snapshot: String,
    pub deleted_by: Option<String>,
    pub deleted_at: DateTime<Utc>,
}
