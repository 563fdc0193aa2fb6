use std::sync::Arc;

use crate::domain::search::AuditLogRepository;

#[derive(Clone)]
pub struct AppState {
    pub audit_logs: Arc<dyn AuditLogRepository>,
}

impl AppState {
    pub fn new(audit_logs: impl AuditLogRepository + 'static) -> Self {
        Self {
            audit_logs: Arc::new(audit_logs),
        }
    }
}
