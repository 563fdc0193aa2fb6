//! Audit log repository implementations.

#[cfg(test)]
mod mock;
mod postgres;

#[cfg(test)]
pub use mock::{MockAuditLogRepository, RecordedCall};
pub use postgres::PgAuditLogRepository;
