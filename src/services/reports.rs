// src/services/reports.rs

use crate::{
    db,
    errors::AppResult,
    models::{DashboardSummary, MemberStatus, ReminderCandidate, SubscriptionStatus},
    services::billing,
};
use chrono::{Days, NaiveDate};
use sqlx::SqlitePool;

fn days(n: i64) -> Days {
    Days::new(u64::try_from(n).unwrap_or(0))
}

/// Active members whose subscription ends between `as_of` and the end of the
/// expiring-soon window.
pub async fn expiring_members(
    pool: &SqlitePool,
    as_of: NaiveDate,
    window_days: i64,
) -> AppResult<Vec<ReminderCandidate>> {
    let until = as_of.checked_add_days(days(window_days)).unwrap_or(NaiveDate::MAX);
    db::members::list_expiring(pool, as_of, until).await
}

/// Active members with no check-in during the last `window_days` days
/// (today included).
pub async fn absent_members(
    pool: &SqlitePool,
    as_of: NaiveDate,
    window_days: i64,
) -> AppResult<Vec<ReminderCandidate>> {
    let since = as_of
        .checked_sub_days(days(window_days.saturating_sub(1)))
        .unwrap_or(NaiveDate::MIN);
    db::attendance::list_absent_members(pool, since).await
}

pub async fn dashboard(pool: &SqlitePool, as_of: NaiveDate, window_days: i64) -> AppResult<DashboardSummary> {
    let mut summary = DashboardSummary {
        as_of,
        total_members: 0,
        active_members: 0,
        frozen_members: 0,
        partial_members: 0,
        expiring_soon: 0,
        expired: 0,
        total_due: db::invoices::total_outstanding(pool).await?,
        collected_today: db::receipts::collected_on(pool, as_of).await?,
        check_ins_today: db::attendance::count_member_check_ins(pool, as_of).await?,
    };

    for (status, count) in db::members::count_by_status(pool).await? {
        summary.total_members += count;
        match status {
            MemberStatus::Active => summary.active_members = count,
            MemberStatus::Frozen => summary.frozen_members = count,
            MemberStatus::Partial => summary.partial_members = count,
            MemberStatus::Inactive => {}
        }
    }

    // Derived from dates rather than the stored column, which may lag.
    for member in db::members::list_with_end_date(pool).await? {
        let Some(end) = member.subscription_end_date else {
            continue;
        };
        match billing::classify_subscription(end, as_of, window_days) {
            SubscriptionStatus::ExpiringSoon => summary.expiring_soon += 1,
            SubscriptionStatus::Expired => summary.expired += 1,
            SubscriptionStatus::Active => {}
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::attendance::Roster,
        models::{Money, PayDueRequest},
        services::{
            billing::record_payment,
            test_support::{register, test_state},
        },
    };
    use chrono::{TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn reminders_pick_expiring_and_absent_members() {
        let state = test_state().await;
        // Monthly: ends 2025-03-05 and 2025-04-01.
        let soon = register(&state, "Ends Soon", 0, 1000, 0, date(2025, 2, 5)).await;
        let later = register(&state, "Ends Later", 0, 1000, 0, date(2025, 3, 1)).await;

        let as_of = date(2025, 3, 1);
        let expiring = expiring_members(&state.db, as_of, 7).await.unwrap();
        assert_eq!(expiring.len(), 1);
        assert_eq!(expiring[0].member_id, soon.id);

        let at = Utc.with_ymd_and_hms(2025, 2, 27, 7, 0, 0).unwrap();
        db::attendance::insert(&state.db, Roster::Members, later.id, date(2025, 2, 27), at)
            .await
            .unwrap();

        let absent = absent_members(&state.db, as_of, 7).await.unwrap();
        assert_eq!(absent.len(), 1);
        assert_eq!(absent[0].member_id, soon.id);
        assert_eq!(absent[0].last_attendance_date, None);
    }

    #[tokio::test]
    async fn dashboard_counts() {
        let state = test_state().await;
        let a = register(&state, "Paid Up", 0, 1000, 0, date(2025, 1, 1)).await;
        register(&state, "Owes", 0, 1500, 0, date(2025, 1, 25)).await;
        let payment = PayDueRequest {
            amount: Money::from_major(1000),
            payment_type: "cash".to_string(),
            notes: None,
            created_by: None,
        };
        record_payment(&state, a.id, payment).await.unwrap();

        let summary = dashboard(&state.db, date(2025, 2, 14), 7).await.unwrap();
        assert_eq!(summary.total_members, 2);
        assert_eq!(summary.active_members, 2);
        assert_eq!(summary.expired, 1);
        assert_eq!(summary.expiring_soon, 0);
        assert_eq!(summary.total_due, Money::from_major(1500));
    }
}
