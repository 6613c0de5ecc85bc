// src/services/members.rs

use crate::{
    db::{self, next_sequence},
    errors::{AppError, AppResult},
    models::{
        CompleteMembershipRequest, ConvertEnquiryRequest, CreateMemberRequest,
        CreatePartialMemberRequest, DeletedMember, EnquiryConversion, EnquiryStatus, Member,
        MemberProfile, MemberReceipt, MemberStatus, MembershipDetails, Money, PaymentStatus,
        TransactionType, UpdateMemberRequest,
    },
    services::{
        billing,
        pdf::{self, DocumentKind},
    },
    state::AppState,
};
use chrono::{NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;
use uuid::Uuid;

const MAX_MEMBER_CODE_LEN: usize = 32;

// ─── Validation ───────────────────────────────────────────────────────────────

pub fn validate_member_code(raw: &str) -> AppResult<String> {
    let code = raw.trim();
    let well_formed = !code.is_empty()
        && code.len() <= MAX_MEMBER_CODE_LEN
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !well_formed {
        return Err(AppError::Validation(format!(
            "Member ID '{}' must be 1-{} letters, digits, '-' or '_'",
            code, MAX_MEMBER_CODE_LEN
        )));
    }
    Ok(code.to_string())
}

fn validate_profile(profile: &MemberProfile) -> AppResult<()> {
    if profile.full_name.trim().is_empty() {
        return Err(AppError::Validation("fullName is required".to_string()));
    }
    if profile.phone.trim().is_empty() {
        return Err(AppError::Validation("phone is required".to_string()));
    }
    Ok(())
}

/// Use the operator's member ID if given, otherwise hand out the next free
/// `M0001`-style code.
async fn resolve_member_code(conn: &mut SqliteConnection, requested: Option<&str>) -> AppResult<String> {
    if let Some(requested) = requested.map(str::trim).filter(|c| !c.is_empty()) {
        let code = validate_member_code(requested)?;
        if db::members::code_exists(&mut *conn, &code).await? {
            return Err(AppError::Conflict(format!("Member ID '{}' is already taken", code)));
        }
        return Ok(code);
    }

    loop {
        let code = format!("M{:04}", next_sequence(&mut *conn, "member").await?);
        if !db::members::code_exists(&mut *conn, &code).await? {
            return Ok(code);
        }
    }
}

// ─── Building rows ────────────────────────────────────────────────────────────

fn new_partial_member(member_code: String, profile: MemberProfile) -> Member {
    let now = Utc::now();
    Member {
        id: Uuid::new_v4(),
        member_code,
        full_name: profile.full_name.trim().to_string(),
        phone: profile.phone.trim().to_string(),
        email: profile.email,
        gender: profile.gender,
        date_of_birth: profile.date_of_birth,
        address: profile.address,
        occupation: profile.occupation,
        emergency_contact: profile.emergency_contact,
        notes: profile.notes,
        package_id: None,
        plan_type: None,
        plan_months: None,
        registration_fee: Money::ZERO,
        package_fee: Money::ZERO,
        discount: Money::ZERO,
        arrears_amount: Money::ZERO,
        membership_fees: Money::ZERO,
        paid_amount: Money::ZERO,
        due_amount: Money::ZERO,
        payment_status: PaymentStatus::derive(Money::ZERO, Money::ZERO),
        subscription_start_date: None,
        subscription_end_date: None,
        subscription_status: None,
        status: MemberStatus::Partial,
        current_term: 1,
        created_at: now,
        updated_at: now,
    }
}

/// Fill plan, fee and subscription fields for a first term.
fn apply_membership(
    member: &mut Member,
    details: &MembershipDetails,
    today: NaiveDate,
    window_days: i64,
) -> AppResult<()> {
    let months = details.plan_type.months(details.plan_months).ok_or_else(|| {
        AppError::Validation("Custom plans need planMonths of at least 1".to_string())
    })?;
    let start = details.subscription_start_date.unwrap_or(today);
    let end = billing::add_months_preserving_month_end(start, months)
        .ok_or_else(|| AppError::Validation("Subscription end date is out of range".to_string()))?;
    let total =
        billing::compute_total_fees(details.registration_fee, details.package_fee, details.discount);

    member.package_id = details.package_id;
    member.plan_type = Some(details.plan_type);
    member.plan_months = Some(i64::from(months));
    member.registration_fee = details.registration_fee;
    member.package_fee = details.package_fee;
    member.discount = details.discount;
    member.membership_fees = total;
    member.paid_amount = Money::ZERO;
    member.due_amount = total;
    member.payment_status = PaymentStatus::derive(total, Money::ZERO);
    member.subscription_start_date = Some(start);
    member.subscription_end_date = Some(end);
    member.subscription_status = Some(billing::classify_subscription(end, today, window_days));
    member.status = MemberStatus::Active;
    member.updated_at = Utc::now();
    Ok(())
}

async fn insert_partial(
    conn: &mut SqliteConnection,
    requested_code: Option<&str>,
    profile: MemberProfile,
) -> AppResult<Member> {
    validate_profile(&profile)?;
    let code = resolve_member_code(conn, requested_code).await?;
    let member = new_partial_member(code, profile);
    db::members::insert(&mut *conn, &member).await?;
    Ok(member)
}

// ─── Operations ───────────────────────────────────────────────────────────────

/// Full registration: profile, plan, fees and an optional payment at the desk.
pub async fn register_member(
    state: &AppState,
    body: CreateMemberRequest,
    today: NaiveDate,
) -> AppResult<MemberReceipt> {
    validate_profile(&body.profile)?;

    let mut tx = state.db.begin().await?;
    let code = resolve_member_code(&mut tx, body.member_code.as_deref()).await?;
    if let Some(package_id) = body.membership.package_id {
        billing::ensure_active_package(&mut tx, package_id).await?;
    }

    let mut member = new_partial_member(code, body.profile);
    apply_membership(&mut member, &body.membership, today, state.config.expiring_soon_days)?;
    db::members::insert(&mut *tx, &member).await?;

    let mut receipt = billing::open_term(
        &mut tx,
        &member,
        body.membership.initial_payment,
        body.membership.payment_type.as_deref(),
        TransactionType::Registration,
        body.created_by,
        false,
    )
    .await?;
    let member = db::members::get(&mut *tx, member.id).await?;
    tx.commit().await?;

    info!(
        "Member {} registered: fees {}, due {}",
        member.member_code, member.membership_fees, member.due_amount
    );

    if let Some(receipt) = receipt.as_mut() {
        pdf::store_receipt_pdf(state, receipt, DocumentKind::Receipt, billing::member_details(&member))
            .await;
    }
    Ok(MemberReceipt { member, receipt })
}

/// Save identity only; membership is completed later.
pub async fn register_partial_member(
    pool: &SqlitePool,
    body: CreatePartialMemberRequest,
) -> AppResult<Member> {
    let mut tx = pool.begin().await?;
    let member = insert_partial(&mut tx, body.member_code.as_deref(), body.profile).await?;
    tx.commit().await?;

    info!("Partial member {} saved", member.member_code);
    Ok(member)
}

pub async fn complete_membership(
    state: &AppState,
    member_id: Uuid,
    body: CompleteMembershipRequest,
    today: NaiveDate,
) -> AppResult<MemberReceipt> {
    let mut tx = state.db.begin().await?;
    let mut member = db::members::get(&mut *tx, member_id).await?;
    if member.status != MemberStatus::Partial {
        return Err(AppError::Conflict(format!(
            "Member {} already has a membership",
            member.member_code
        )));
    }
    if let Some(package_id) = body.membership.package_id {
        billing::ensure_active_package(&mut tx, package_id).await?;
    }

    apply_membership(&mut member, &body.membership, today, state.config.expiring_soon_days)?;
    db::members::save_membership(&mut *tx, &member).await?;

    let mut receipt = billing::open_term(
        &mut tx,
        &member,
        body.membership.initial_payment,
        body.membership.payment_type.as_deref(),
        TransactionType::Registration,
        body.created_by,
        false,
    )
    .await?;
    let member = db::members::get(&mut *tx, member.id).await?;
    tx.commit().await?;

    info!("Membership completed for {}", member.member_code);

    if let Some(receipt) = receipt.as_mut() {
        pdf::store_receipt_pdf(state, receipt, DocumentKind::Receipt, billing::member_details(&member))
            .await;
    }
    Ok(MemberReceipt { member, receipt })
}

pub async fn update_profile(
    pool: &SqlitePool,
    member_id: Uuid,
    body: &UpdateMemberRequest,
) -> AppResult<Member> {
    let blank = |value: &Option<String>| value.as_deref().is_some_and(|v| v.trim().is_empty());
    if blank(&body.full_name) || blank(&body.phone) {
        return Err(AppError::Validation(
            "fullName and phone cannot be blank".to_string(),
        ));
    }

    if db::members::update_profile(pool, member_id, body, Utc::now()).await? == 0 {
        return Err(AppError::NotFound(format!("Member {} not found", member_id)));
    }
    db::members::get(pool, member_id).await
}

/// Move between active, inactive and frozen.
pub async fn set_status(pool: &SqlitePool, member_id: Uuid, status: MemberStatus) -> AppResult<Member> {
    if status == MemberStatus::Partial {
        return Err(AppError::Validation(
            "A member cannot be moved back to partial".to_string(),
        ));
    }
    let member = db::members::get(pool, member_id).await?;
    if member.status == MemberStatus::Partial {
        return Err(AppError::BadRequest(format!(
            "Complete the membership of {} first",
            member.member_code
        )));
    }

    db::members::set_status(pool, member_id, status, Utc::now()).await?;
    info!("Member {} is now {:?}", member.member_code, status);
    db::members::get(pool, member_id).await
}

/// Archive a snapshot of the row, then remove it.
pub async fn delete_member(
    pool: &SqlitePool,
    member_id: Uuid,
    deleted_by: Option<String>,
) -> AppResult<DeletedMember> {
    let mut tx = pool.begin().await?;
    let member = db::members::get(&mut *tx, member_id).await?;
    let snapshot = serde_json::to_string(&member)
        .map_err(|e| AppError::Internal(format!("Could not snapshot member: {e}")))?;

    let archived = DeletedMember {
        id: Uuid::new_v4(),
        member_id: member.id,
        member_code: member.member_code.clone(),
        full_name: member.full_name.clone(),
        snapshot,
        deleted_by,
        deleted_at: Utc::now(),
    };
    db::members::insert_deleted(&mut *tx, &archived).await?;
    db::members::delete(&mut *tx, member.id).await?;
    tx.commit().await?;

    info!("Member {} archived and deleted", archived.member_code);
    Ok(archived)
}

/// Turn an open lead into a partial member.
pub async fn convert_enquiry(
    pool: &SqlitePool,
    enquiry_id: Uuid,
    body: ConvertEnquiryRequest,
) -> AppResult<EnquiryConversion> {
    let mut tx = pool.begin().await?;
    let enquiry = db::enquiries::get(&mut *tx, enquiry_id).await?;
    match enquiry.status {
        EnquiryStatus::Open => {}
        EnquiryStatus::Converted => {
            return Err(AppError::Conflict(
                "Enquiry has already been converted".to_string(),
            ));
        }
        EnquiryStatus::Closed => {
            return Err(AppError::Conflict("Enquiry is closed".to_string()));
        }
    }

    let profile = MemberProfile {
        full_name: enquiry.full_name.clone(),
        phone: enquiry.phone.clone(),
        email: enquiry.email.clone(),
        notes: enquiry.notes.clone(),
        ..Default::default()
    };
    let member = insert_partial(&mut tx, body.member_code.as_deref(), profile).await?;
    let enquiry =
        db::enquiries::set_status(&mut *tx, enquiry.id, EnquiryStatus::Converted, Some(member.id))
            .await?;
    tx.commit().await?;

    info!("Enquiry {} converted to member {}", enquiry.id, member.member_code);
    Ok(EnquiryConversion { enquiry, member })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{Enquiry, PlanType},
        services::test_support::{register, test_state},
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn profile(name: &str) -> MemberProfile {
        MemberProfile {
            full_name: name.to_string(),
            phone: "9811111111".to_string(),
            ..Default::default()
        }
    }

    fn details(initial_payment: i64) -> MembershipDetails {
        MembershipDetails {
            package_id: None,
            plan_type: PlanType::Quarterly,
            plan_months: None,
            registration_fee: Money::from_major(500),
            package_fee: Money::from_major(1500),
            discount: Money::from_major(100),
            subscription_start_date: None,
            initial_payment: Money::from_major(initial_payment),
            payment_type: Some("cash".to_string()),
        }
    }

    #[test]
    fn member_codes_are_checked() {
        assert_eq!(validate_member_code(" GYM-01 ").unwrap(), "GYM-01");
        assert!(validate_member_code("").is_err());
        assert!(validate_member_code("has space").is_err());
        assert!(validate_member_code(&"X".repeat(33)).is_err());
    }

    #[tokio::test]
    async fn codes_are_generated_and_unique() {
        let state = test_state().await;
        let first = register(&state, "One", 0, 100, 0, date(2025, 1, 1)).await;
        let second = register(&state, "Two", 0, 100, 0, date(2025, 1, 1)).await;
        assert_eq!(first.member_code, "M0001");
        assert_eq!(second.member_code, "M0002");

        let taken = CreatePartialMemberRequest {
            member_code: Some("M0002".to_string()),
            profile: profile("Three"),
        };
        let err = register_partial_member(&state.db, taken).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // An operator-chosen code is skipped by the generator.
        let chosen = CreatePartialMemberRequest {
            member_code: Some("M0003".to_string()),
            profile: profile("Chosen"),
        };
        register_partial_member(&state.db, chosen).await.unwrap();
        let next = register(&state, "Four", 0, 100, 0, date(2025, 1, 1)).await;
        assert_eq!(next.member_code, "M0004");
    }

    #[tokio::test]
    async fn registration_with_initial_payment() {
        let state = test_state().await;
        let request = CreateMemberRequest {
            member_code: Some("G-100".to_string()),
            profile: profile("Asha Rao"),
            membership: details(1000),
            created_by: Some("desk".to_string()),
        };

        let registered = register_member(&state, request, date(2025, 1, 31)).await.unwrap();
        let member = registered.member;
        assert_eq!(member.member_code, "G-100");
        assert_eq!(member.subscription_end_date, Some(date(2025, 4, 30)));
        assert_eq!(member.paid_amount, Money::from_major(1000));
        assert_eq!(member.due_amount, Money::from_major(900));
        assert_eq!(member.payment_status, PaymentStatus::Partial);

        let receipt = registered.receipt.unwrap();
        assert_eq!(receipt.transaction_type, TransactionType::Registration);
        assert_eq!(receipt.amount, Money::from_major(1900));
        assert_eq!(receipt.due_amount, Money::from_major(900));
    }

    #[tokio::test]
    async fn overpaid_registration_is_rolled_back() {
        let state = test_state().await;
        let request = CreateMemberRequest {
            member_code: Some("G-200".to_string()),
            profile: profile("Too Much"),
            membership: details(5000),
            created_by: None,
        };

        let err = register_member(&state, request, date(2025, 1, 1)).await.unwrap_err();
        assert!(matches!(err, AppError::PaymentExceedsDue { .. }));
        assert!(!db::members::code_exists(&state.db, "G-200").await.unwrap());
    }

    #[tokio::test]
    async fn partial_member_is_completed_once() {
        let state = test_state().await;
        let partial = register_partial_member(
            &state.db,
            CreatePartialMemberRequest {
                member_code: None,
                profile: profile("Later"),
            },
        )
        .await
        .unwrap();
        assert_eq!(partial.status, MemberStatus::Partial);
        assert_eq!(partial.plan_type, None);

        let complete = CompleteMembershipRequest {
            membership: details(0),
            created_by: None,
        };
        let done = complete_membership(&state, partial.id, complete.clone(), date(2025, 3, 1))
            .await
            .unwrap();
        assert_eq!(done.member.status, MemberStatus::Active);
        assert_eq!(done.member.due_amount, Money::from_major(1900));
        assert!(done.receipt.is_none());

        let err = complete_membership(&state, partial.id, complete, date(2025, 3, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn partial_members_cannot_be_activated_directly() {
        let state = test_state().await;
        let partial = register_partial_member(
            &state.db,
            CreatePartialMemberRequest {
                member_code: None,
                profile: profile("Pending"),
            },
        )
        .await
        .unwrap();

        let err = set_status(&state.db, partial.id, MemberStatus::Active).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        let err = set_status(&state.db, partial.id, MemberStatus::Partial).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn deleting_archives_and_keeps_receipts() {
        let state = test_state().await;
        let request = CreateMemberRequest {
            member_code: None,
            profile: profile("Leaving"),
            membership: details(1900),
            created_by: None,
        };
        let registered = register_member(&state, request, date(2025, 1, 1)).await.unwrap();
        let receipt = registered.receipt.unwrap();

        let archived = delete_member(&state.db, registered.member.id, Some("admin".to_string()))
            .await
            .unwrap();
        assert_eq!(archived.full_name, "Leaving");
        let snapshot: serde_json::Value = serde_json::from_str(&archived.snapshot).unwrap();
        assert_eq!(snapshot["memberCode"], archived.member_code.as_str());

        assert!(db::members::find(&state.db, registered.member.id).await.unwrap().is_none());
        assert_eq!(db::members::list_deleted(&state.db).await.unwrap().len(), 1);

        let kept = db::receipts::get(&state.db, receipt.id).await.unwrap();
        assert_eq!(kept.member_id, None);
        assert_eq!(kept.payer_name, "Leaving");
    }

    #[tokio::test]
    async fn enquiry_converts_once() {
        let state = test_state().await;
        let enquiry = db::enquiries::insert(
            &state.db,
            &Enquiry {
                id: Uuid::new_v4(),
                full_name: "Lead Person".to_string(),
                phone: "9822222222".to_string(),
                email: None,
                interested_package_id: None,
                source: Some("walk-in".to_string()),
                notes: None,
                follow_up_date: None,
                status: EnquiryStatus::Open,
                converted_to_member_id: None,
                created_at: Utc::now(),
            },
        )
        .await
        .unwrap();

        let converted = convert_enquiry(&state.db, enquiry.id, ConvertEnquiryRequest::default())
            .await
            .unwrap();
        assert_eq!(converted.member.status, MemberStatus::Partial);
        assert_eq!(converted.member.full_name, "Lead Person");
        assert_eq!(converted.enquiry.status, EnquiryStatus::Converted);
        assert_eq!(converted.enquiry.converted_to_member_id, Some(converted.member.id));

        let err = convert_enquiry(&state.db, enquiry.id, ConvertEnquiryRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
