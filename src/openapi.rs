// src/openapi.rs

use crate::models::{
    Attendance, BatchResult, BodyMeasurement, CompleteMembershipRequest, ConvertEnquiryRequest,
    CreateEnquiryRequest, CreateExpenseRequest, CreateMemberRequest, CreatePartialMemberRequest,
    CreateReceiptRequest, CreateStaffRequest, DashboardSummary, DeletedMember, Enquiry,
    EnquiryConversion, EnquiryStatus, Expense, Invoice, MasterItem, MasterKind, Member, MemberDue,
    MemberProfile, MemberReceipt, MemberStatus, MemberTotals, MembershipDetails, Money, Package,
    PayDueRequest, PayStaffRequest, PaymentStatus, PlanType, Receipt, ReceiptCategory,
    RecordMeasurementRequest, ReminderCandidate, RenewMembershipRequest, RenewalFees,
    SetMemberStatusRequest, Staff, SubscriptionStatus, SupersedeReceiptRequest, TaxSettingView,
    TransactionType, UpdateEnquiryRequest, UpdateMemberFeesRequest, UpdateMemberRequest,
    UpdateStaffRequest, UpdateStaffSalaryRequest, UpsertMasterItemRequest, UpsertPackageRequest,
    UpsertTaxSettingRequest,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Gym Desk API",
        version = "0.1.0",
        description = "Local bridge for a single-gym front desk: member registration, \
            fee and due reconciliation, versioned receipts, attendance, staff payouts, \
            enquiries, expenses and reference data. Every response is wrapped as \
            `{success, data}` or `{success: false, error}`.",
        license(name = "MIT")
    ),
    paths(
        // Members
        crate::handlers::member::create_member,
        crate::handlers::member::create_partial_member,
        crate::handlers::member::complete_membership,
        crate::handlers::member::list_members,
        crate::handlers::member::get_member,
        crate::handlers::member::update_member,
        crate::handlers::member::set_member_status,
        crate::handlers::member::delete_member,
        crate::handlers::member::list_deleted_members,
        crate::handlers::member::list_members_with_due,
        crate::handlers::member::list_member_invoices,
        crate::handlers::measurement::record_measurement,
        crate::handlers::measurement::list_measurements,
        // Billing
        crate::handlers::member::pay_member_due,
        crate::handlers::member::renew_membership,
        crate::handlers::member::update_member_fees,
        crate::handlers::member::recalculate_member_totals,
        crate::handlers::member::refresh_all_member_due_amounts,
        crate::handlers::member::update_subscription_statuses,
        // Receipts
        crate::handlers::receipt::create_receipt,
        crate::handlers::receipt::list_receipts,
        crate::handlers::receipt::get_receipt,
        crate::handlers::receipt::receipt_history,
        crate::handlers::receipt::supersede_receipt,
        // Enquiries
        crate::handlers::enquiry::create_enquiry,
        crate::handlers::enquiry::list_enquiries,
        crate::handlers::enquiry::get_enquiry,
        crate::handlers::enquiry::update_enquiry,
        crate::handlers::enquiry::close_enquiry,
        crate::handlers::enquiry::convert_enquiry,
        // Attendance
        crate::handlers::attendance::check_in_member,
        crate::handlers::attendance::check_out_member,
        crate::handlers::attendance::member_attendance_by_date,
        crate::handlers::attendance::member_attendance,
        crate::handlers::attendance::check_in_staff,
        crate::handlers::attendance::check_out_staff,
        crate::handlers::attendance::staff_attendance_by_date,
        crate::handlers::attendance::staff_attendance,
        // Staff
        crate::handlers::staff::create_staff,
        crate::handlers::staff::list_staff,
        crate::handlers::staff::get_staff,
        crate::handlers::staff::update_staff,
        crate::handlers::staff::deactivate_staff,
        crate::handlers::staff::update_staff_salary,
        crate::handlers::staff::pay_staff,
        // Expenses
        crate::handlers::expense::create_expense,
        crate::handlers::expense::list_expenses,
        crate::handlers::expense::delete_expense,
        // Master data
        crate::handlers::master::list_packages,
        crate::handlers::master::create_package,
        crate::handlers::master::update_package,
        crate::handlers::master::toggle_package,
        crate::handlers::master::list_tax_settings,
        crate::handlers::master::create_tax_setting,
        crate::handlers::master::update_tax_setting,
        crate::handlers::master::toggle_tax_setting,
        crate::handlers::master::list_items,
        crate::handlers::master::create_item,
        crate::handlers::master::update_item,
        crate::handlers::master::toggle_item,
        // Reports
        crate::handlers::report::expiring_members,
        crate::handlers::report::absent_members,
        crate::handlers::report::dashboard,
    ),
    components(
        schemas(
            Money,
            Member, MemberStatus, SubscriptionStatus, PlanType, PaymentStatus,
            MemberProfile, MembershipDetails, CreateMemberRequest, CreatePartialMemberRequest,
            CompleteMembershipRequest, UpdateMemberRequest, SetMemberStatusRequest,
            MemberReceipt, MemberDue, DeletedMember,
            PayDueRequest, RenewalFees, RenewMembershipRequest, UpdateMemberFeesRequest,
            MemberTotals, BatchResult, Invoice,
            Receipt, ReceiptCategory, TransactionType, CreateReceiptRequest,
            SupersedeReceiptRequest,
            Enquiry, EnquiryStatus, CreateEnquiryRequest, UpdateEnquiryRequest,
            ConvertEnquiryRequest, EnquiryConversion,
            Attendance, BodyMeasurement, RecordMeasurementRequest,
            Staff, CreateStaffRequest, UpdateStaffRequest, UpdateStaffSalaryRequest,
            PayStaffRequest,
            Expense, CreateExpenseRequest,
            MasterKind, MasterItem, UpsertMasterItemRequest, Package, UpsertPackageRequest,
            TaxSettingView, UpsertTaxSettingRequest,
            ReminderCandidate, DashboardSummary,
        )
    ),
    tags(
        (name = "Members", description = "Register members and manage their profiles"),
        (name = "Billing", description = "Payments, renewals and due reconciliation"),
        (name = "Receipts", description = "Receipt listing, history and corrections"),
        (name = "Enquiries", description = "Leads and their conversion to members"),
        (name = "Attendance", description = "Check-in and check-out for members and staff"),
        (name = "Staff", description = "Staff records, salary changes and payouts"),
        (name = "Expenses", description = "Gym running costs"),
        (name = "Master Data", description = "Packages, tax settings and reference lists"),
        (name = "Reports", description = "Reminders and the front desk dashboard"),
    )
)]
pub struct ApiDoc;
