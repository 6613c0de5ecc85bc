use super::Money;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Reference lists that are nothing more than a name plus an active flag.
/// Each kind maps to its own fixed table; the name never comes from input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum MasterKind {
    Occupations,
    PaymentTypes,
    BodyMeasurementFields,
    ExpenseCategories,
}

impl MasterKind {
    pub fn table(self) -> &'static str {
        match self {
            MasterKind::Occupations => "master_occupations",
            MasterKind::PaymentTypes => "master_payment_types",
            MasterKind::BodyMeasurementFields => "master_body_measurement_fields",
            MasterKind::ExpenseCategories => "master_expense_categories",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MasterKind::Occupations => "Occupation",
            MasterKind::PaymentTypes => "Payment type",
            MasterKind::BodyMeasurementFields => "Body measurement field",
            MasterKind::ExpenseCategories => "Expense category",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MasterItem {
    pub id: Uuid,
    pub name: String,
    /// Only used by body measurement fields (e.g. "cm", "kg").
    pub unit: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertMasterItemRequest {
    pub name: String,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub id: Uuid,
    pub name: String,
    pub duration_months: i64,
    pub price: Money,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertPackageRequest {
    pub name: String,
    pub duration_months: i64,
    pub price: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaxSetting {
    pub id: Uuid,
    pub name: String,
    /// Percentage stored in basis points: 1800 means 18.00%.
    #[serde(skip)]
    pub rate_bps: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl TaxSetting {
    pub fn rate_percent(&self) -> Decimal {
        Decimal::new(self.rate_bps, 2)
    }
}

/// Bridge shape of [`TaxSetting`] with the rate as a percentage.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaxSettingView {
    pub id: Uuid,
    pub name: String,
    pub rate_percent: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<TaxSetting> for TaxSettingView {
    fn from(tax: TaxSetting) -> Self {
        TaxSettingView {
            rate_percent: tax.rate_percent(),
            id: tax.id,
            name: tax.name,
            is_active: tax.is_active,
            created_at: tax.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertTaxSettingRequest {
    pub name: String,
    pub rate_percent: Decimal,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ActiveOnlyQuery {
    #[serde(default)]
    pub active_only: bool,
}
