//! ListAuditLogsHandler - Query handler for the admin audit log view.

use std::sync::Arc;

use crate::domain::audit::AuditLogEntry;
use crate::domain::foundation::{Caller, DomainError};
use crate::ports::AuditLogRepository;

const MAX_LIMIT: u32 = 500;

#[derive(Debug, Clone, Default)]
pub struct ListAuditLogsQuery {
    /// Restrict to one resource; otherwise the most recent entries overall.
    pub resource_id: Option<String>,
    pub limit: Option<u32>,
}

pub struct ListAuditLogsHandler {
    repository: Arc<dyn AuditLogRepository>,
}

impl ListAuditLogsHandler {
    pub fn new(repository: Arc<dyn AuditLogRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        caller: &Caller,
        query: ListAuditLogsQuery,
    ) -> Result<Vec<AuditLogEntry>, DomainError> {
        caller.require_administrator()?;
        let limit = query.limit.unwrap_or(50).clamp(1, MAX_LIMIT);

        match query.resource_id {
            Some(resource_id) => {
                let mut entries = self.repository.list_for_resource(&resource_id).await?;
                entries.truncate(limit as usize);
                Ok(entries)
            }
            None => self.repository.list_recent(limit).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::in_memory::InMemoryAuditLog;
    use crate::domain::audit::AuditAction;
    use crate::domain::foundation::{ErrorCode, Role, UserId};
    use serde_json::Map;

    fn admin() -> Caller {
        Caller::administrator(UserId::new("admin-1").unwrap())
    }

    #[tokio::test]
    async fn members_cannot_list() {
        let handler = ListAuditLogsHandler::new(Arc::new(InMemoryAuditLog::new()));
        let member = Caller::new(UserId::new("m-1").unwrap(), Role::Member);

        let err = handler
            .handle(&member, ListAuditLogsQuery::default())
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn filters_by_resource_and_limits() {
        let log = InMemoryAuditLog::new();
        for resource in ["a", "a", "a", "b"] {
            log.append(&AuditLogEntry::new(
                None,
                AuditAction::SubscriptionRenew,
                resource,
                Map::new(),
            ))
            .await
            .unwrap();
        }
        let handler = ListAuditLogsHandler::new(Arc::new(log));

        let entries = handler
            .handle(
                &admin(),
                ListAuditLogsQuery {
                    resource_id: Some("a".into()),
                    limit: Some(2),
                },
            )
            .await
            .unwrap();

        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.resource_id == "a"));
    }
}
