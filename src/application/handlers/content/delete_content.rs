//! DeleteContentHandler - Command handler for logical deletion of content.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::application::handlers::audit::AuditRecorder;
use crate::domain::audit::AuditAction;
use crate::domain::content::{ContentItem, ContentKind, FlagPatch};
use crate::domain::foundation::{Caller, ContentId, DomainError, Timestamp};
use crate::ports::ContentRepository;

#[derive(Debug, Clone)]
pub struct DeleteContentCommand {
    pub kind: ContentKind,
    pub id: ContentId,
}

/// Sets the logical-delete flag. Deleting an already deleted item is a no-op
/// and writes no audit entry.
pub struct DeleteContentHandler {
    content: Arc<dyn ContentRepository>,
    audit: AuditRecorder,
}

impl DeleteContentHandler {
    pub fn new(content: Arc<dyn ContentRepository>, audit: AuditRecorder) -> Self {
        Self { content, audit }
    }

    pub async fn handle(
        &self,
        caller: &Caller,
        cmd: DeleteContentCommand,
    ) -> Result<ContentItem, DomainError> {
        caller.require_administrator()?;

        let mut item = self
            .content
            .find_by_id(&cmd.id)
            .await?
            .filter(|item| item.kind == cmd.kind)
            .ok_or_else(|| DomainError::not_found(cmd.kind.as_str(), cmd.id))?;
        if item.is_deleted {
            return Ok(item);
        }

        item.apply(
            &FlagPatch {
                is_deleted: Some(true),
                ..FlagPatch::default()
            },
            Timestamp::now(),
        );
        self.content.save(&item).await?;

        tracing::info!(
            content_id = %item.id,
            kind = %item.kind,
            user_id = %caller.user_id,
            "Content deleted"
        );

        let mut metadata = Map::new();
        metadata.insert("title".to_string(), Value::String(item.title.clone()));
        self.audit
            .record_best_effort(
                Some(caller.user_id.clone()),
                AuditAction::content_delete(item.kind),
                item.id.to_string(),
                metadata,
            )
            .await;

        Ok(item)
    }
}
