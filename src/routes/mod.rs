// src/routes/mod.rs

use crate::{
    handlers::{
        attendance, enquiry, expense, master, measurement, member, receipt, report, staff,
    },
    state::AppState,
};
use axum::{
    Router,
    routing::{delete, get, post, put},
};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // ─── Members ──────────────────────────────────────────
        .route(
            "/members",
            post(member::create_member).get(member::list_members),
        )
        .route("/members/partial", post(member::create_partial_member))
        .route("/members/with-due", get(member::list_members_with_due))
        .route("/members/deleted", get(member::list_deleted_members))
        .route(
            "/members/{member_id}",
            get(member::get_member)
                .patch(member::update_member)
                .delete(member::delete_member),
        )
        .route(
            "/members/{member_id}/complete",
            post(member::complete_membership),
        )
        .route("/members/{member_id}/status", put(member::set_member_status))
        .route("/members/{member_id}/invoices", get(member::list_member_invoices))
        .route(
            "/members/{member_id}/measurements",
            post(measurement::record_measurement).get(measurement::list_measurements),
        )
        // ─── Billing ──────────────────────────────────────────
        .route("/members/{member_id}/payments", post(member::pay_member_due))
        .route("/members/{member_id}/renew", post(member::renew_membership))
        .route("/members/{member_id}/fees", put(member::update_member_fees))
        .route(
            "/members/{member_id}/recalculate",
            post(member::recalculate_member_totals),
        )
        .route(
            "/members/refresh-due",
            post(member::refresh_all_member_due_amounts),
        )
        .route(
            "/members/subscription-statuses",
            post(member::update_subscription_statuses),
        )
        // ─── Receipts ─────────────────────────────────────────
        .route(
            "/receipts",
            post(receipt::create_receipt).get(receipt::list_receipts),
        )
        .route("/receipts/{receipt_id}", get(receipt::get_receipt))
        .route("/receipts/{receipt_id}/history", get(receipt::receipt_history))
        .route(
            "/receipts/{receipt_id}/supersede",
            post(receipt::supersede_receipt),
        )
        // ─── Enquiries ────────────────────────────────────────
        .route(
            "/enquiries",
            post(enquiry::create_enquiry).get(enquiry::list_enquiries),
        )
        .route(
            "/enquiries/{enquiry_id}",
            get(enquiry::get_enquiry).patch(enquiry::update_enquiry),
        )
        .route("/enquiries/{enquiry_id}/close", post(enquiry::close_enquiry))
        .route(
            "/enquiries/{enquiry_id}/convert",
            post(enquiry::convert_enquiry),
        )
        // ─── Attendance ───────────────────────────────────────
        .route("/attendance", get(attendance::member_attendance_by_date))
        .route(
            "/members/{member_id}/check-in",
            post(attendance::check_in_member),
        )
        .route(
            "/members/{member_id}/check-out",
            post(attendance::check_out_member),
        )
        .route(
            "/members/{member_id}/attendance",
            get(attendance::member_attendance),
        )
        .route("/staff-attendance", get(attendance::staff_attendance_by_date))
        .route("/staff/{staff_id}/check-in", post(attendance::check_in_staff))
        .route("/staff/{staff_id}/check-out", post(attendance::check_out_staff))
        .route("/staff/{staff_id}/attendance", get(attendance::staff_attendance))
        // ─── Staff ────────────────────────────────────────────
        .route("/staff", post(staff::create_staff).get(staff::list_staff))
        .route(
            "/staff/{staff_id}",
            get(staff::get_staff)
                .patch(staff::update_staff)
                .delete(staff::deactivate_staff),
        )
        .route("/staff/{staff_id}/salary", put(staff::update_staff_salary))
        .route("/staff/{staff_id}/payments", post(staff::pay_staff))
        // ─── Expenses ─────────────────────────────────────────
        .route(
            "/expenses",
            post(expense::create_expense).get(expense::list_expenses),
        )
        .route("/expenses/{expense_id}", delete(expense::delete_expense))
        // ─── Master Data ──────────────────────────────────────
        .route(
            "/master/packages",
            get(master::list_packages).post(master::create_package),
        )
        .route("/master/packages/{package_id}", put(master::update_package))
        .route(
            "/master/packages/{package_id}/toggle",
            post(master::toggle_package),
        )
        .route(
            "/master/tax-settings",
            get(master::list_tax_settings).post(master::create_tax_setting),
        )
        .route("/master/tax-settings/{tax_id}", put(master::update_tax_setting))
        .route(
            "/master/tax-settings/{tax_id}/toggle",
            post(master::toggle_tax_setting),
        )
        .route(
            "/master/{kind}",
            get(master::list_items).post(master::create_item),
        )
        .route("/master/{kind}/{item_id}", put(master::update_item))
        .route("/master/{kind}/{item_id}/toggle", post(master::toggle_item))
        // ─── Reports ──────────────────────────────────────────
        .route("/reminders/expiring", get(report::expiring_members))
        .route("/reminders/absent", get(report::absent_members))
        .route("/dashboard", get(report::dashboard))
}
