pub mod access;
pub mod api_key;
pub mod plans;
