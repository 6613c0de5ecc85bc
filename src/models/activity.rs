use super::Money;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

// ─── Attendance ───────────────────────────────────────────────────────────────

/// One check-in interval. `person_id` is a member id for member attendance and
/// a staff id for staff attendance.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: Uuid,
    pub person_id: Uuid,
    pub attendance_date: NaiveDate,
    pub check_in_at: DateTime<Utc>,
    /// `None` while the interval is still open.
    pub check_out_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AttendanceDateQuery {
    /// Defaults to today.
    pub date: Option<NaiveDate>,
}

// ─── Enquiry ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EnquiryStatus {
    Open,
    Converted,
    Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Enquiry {
    pub id: Uuid,
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub interested_package_id: Option<Uuid>,
    pub source: Option<String>,
    pub notes: Option<String>,
    pub follow_up_date: Option<NaiveDate>,
    pub status: EnquiryStatus,
    pub converted_to_member_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEnquiryRequest {
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub interested_package_id: Option<Uuid>,
    pub source: Option<String>,
    pub notes: Option<String>,
    pub follow_up_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEnquiryRequest {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub interested_package_id: Option<Uuid>,
    pub source: Option<String>,
    pub notes: Option<String>,
    pub follow_up_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConvertEnquiryRequest {
    pub member_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnquiryConversion {
    pub enquiry: Enquiry,
    pub member: super::Member,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct EnquiryListQuery {
    pub status: Option<EnquiryStatus>,
}

// ─── Expense ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,
    pub category_id: Option<Uuid>,
    pub description: String,
    pub amount: Money,
    pub expense_date: NaiveDate,
    pub payment_type: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseRequest {
    pub category_id: Option<Uuid>,
    pub description: String,
    pub amount: Money,
    pub expense_date: Option<NaiveDate>,
    pub payment_type: Option<String>,
    pub created_by: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DateRangeQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

// ─── Body measurements ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BodyMeasurement {
    pub id: Uuid,
    pub member_id: Uuid,
    pub field_id: Uuid,
    pub field_name: String,
    pub unit: Option<String>,
    pub value: String,
    pub measured_on: NaiveDate,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordMeasurementRequest {
    pub field_id: Uuid,
    pub value: String,
    pub measured_on: Option<NaiveDate>,
}
