pub mod dashboard;
pub mod database_validator;
pub mod health;
pub mod lead_filter;
pub mod rbac;
pub mod sample_leads;
pub mod sample_users;
pub mod store;
pub mod validation;
