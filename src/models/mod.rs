// src/models/mod.rs

mod activity;
mod billing;
mod master;
mod member;
mod money;
mod staff;

pub use activity::*;
pub use billing::*;
pub use master::*;
pub use member::*;
pub use money::Money;
pub use staff::*;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

// ─── Reminders & Dashboard ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReminderCandidate {
    pub member_id: Uuid,
    pub member_code: String,
    pub full_name: String,
    pub phone: String,
    pub subscription_end_date: Option<NaiveDate>,
    pub last_attendance_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub as_of: NaiveDate,
    pub total_members: i64,
    pub active_members: i64,
    pub frozen_members: i64,
    pub partial_members: i64,
    pub expiring_soon: i64,
    pub expired: i64,
    pub total_due: Money,
    pub collected_today: Money,
    pub check_ins_today: i64,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AsOfQuery {
    /// Defaults to today.
    pub as_of: Option<NaiveDate>,
}
