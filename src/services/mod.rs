pub mod billing;
pub mod members;
pub mod pdf;
pub mod reports;
pub mod staff;

use chrono::{NaiveDate, Utc};

/// Calendar date used for "today" in date-driven rules.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::{
        config::Config,
        db,
        errors::{AppError, AppResult},
        models::{CreateMemberRequest, Member, MemberProfile, MembershipDetails, Money, PlanType},
        services::pdf::{ReceiptDocument, ReceiptRenderer},
        state::AppState,
    };
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::{path::PathBuf, sync::Arc};

    /// Renderer that always fails, so tests also prove PDF errors are non-fatal.
    pub struct FailingRenderer;

    #[async_trait]
    impl ReceiptRenderer for FailingRenderer {
        async fn render(&self, _document: ReceiptDocument) -> AppResult<PathBuf> {
            Err(AppError::Pdf("rendering disabled".to_string()))
        }
    }

    pub async fn test_state() -> AppState {
        AppState::with_renderer(db::test_pool().await, Config::default(), Arc::new(FailingRenderer))
    }

    /// Register a monthly member starting on `start` with nothing paid.
    pub async fn register(
        state: &AppState,
        name: &str,
        registration_fee: i64,
        package_fee: i64,
        discount: i64,
        start: NaiveDate,
    ) -> Member {
        let request = CreateMemberRequest {
            member_code: None,
            profile: MemberProfile {
                full_name: name.to_string(),
                phone: "9800000000".to_string(),
                ..Default::default()
            },
            membership: MembershipDetails {
                package_id: None,
                plan_type: PlanType::Monthly,
                plan_months: None,
                registration_fee: Money::from_major(registration_fee),
                package_fee: Money::from_major(package_fee),
                discount: Money::from_major(discount),
                subscription_start_date: Some(start),
                initial_payment: Money::ZERO,
                payment_type: None,
            },
            created_by: None,
        };
        super::members::register_member(state, request, start)
            .await
            .unwrap()
            .member
    }
}
