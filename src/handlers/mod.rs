pub mod attendance;
pub mod enquiry;
pub mod expense;
pub mod general;
pub mod master;
pub mod measurement;
pub mod member;
pub mod receipt;
pub mod report;
pub mod staff;
