pub(crate) mod audit_logs;
pub(crate) mod error;

pub use error::ApiError;
