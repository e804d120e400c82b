//! UpdateContentFlagsHandler - Command handler for publish/cancel flag changes.
//!
//! The requested patch is diffed against the stored item. Only fields that
//! actually change are written, and exactly those fields are captured in the
//! `before` snapshot of the audit entry, which is what makes the update
//! reversible.

use std::sync::Arc;

use crate::application::handlers::audit::AuditRecorder;
use crate::domain::audit::{AuditAction, AuditLogEntry, ContentSnapshot};
use crate::domain::content::{ContentItem, ContentKind, FlagPatch};
use crate::domain::foundation::{Caller, ContentId, DomainError, Timestamp};
use crate::ports::ContentRepository;

#[derive(Debug, Clone)]
pub struct UpdateContentFlagsCommand {
    pub kind: ContentKind,
    pub id: ContentId,
    pub patch: FlagPatch,
}

#[derive(Debug, Clone)]
pub struct UpdateContentFlagsResult {
    pub item: ContentItem,
    /// False when the patch matched the stored values and nothing was written.
    pub changed: bool,
}

pub struct UpdateContentFlagsHandler {
    content: Arc<dyn ContentRepository>,
    audit: AuditRecorder,
}

impl UpdateContentFlagsHandler {
    pub fn new(content: Arc<dyn ContentRepository>, audit: AuditRecorder) -> Self {
        Self { content, audit }
    }

    pub async fn handle(
        &self,
        caller: &Caller,
        cmd: UpdateContentFlagsCommand,
    ) -> Result<UpdateContentFlagsResult, DomainError> {
        caller.require_administrator()?;

        if cmd.patch.is_deleted.is_some() {
            return Err(DomainError::validation(
                "is_deleted",
                "Use the delete operation to remove content",
            ));
        }
        if cmd.patch.is_empty() {
            return Err(DomainError::validation("patch", "No flags to update"));
        }
        cmd.patch.validate_for(cmd.kind)?;

        let mut item = self
            .content
            .find_by_id(&cmd.id)
            .await?
            .filter(|item| item.kind == cmd.kind)
            .ok_or_else(|| DomainError::not_found(cmd.kind.as_str(), cmd.id))?;
        if item.is_deleted {
            return Err(DomainError::invalid_state(format!(
                "{} {} is deleted",
                cmd.kind, cmd.id
            )));
        }

        let Some(snapshot) = ContentSnapshot::capture(&item, &cmd.patch) else {
            return Ok(UpdateContentFlagsResult {
                item,
                changed: false,
            });
        };

        let metadata = AuditLogEntry::update_metadata(&snapshot, &item.title)?;
        item.apply(&cmd.patch.effective_against(&item), Timestamp::now());
        self.content.save(&item).await?;

        tracing::info!(
            content_id = %item.id,
            kind = %item.kind,
            user_id = %caller.user_id,
            "Content flags updated"
        );

        self.audit
            .record_best_effort(
                Some(caller.user_id.clone()),
                AuditAction::content_update(item.kind),
                item.id.to_string(),
                metadata,
            )
            .await;

        Ok(UpdateContentFlagsResult {
            item,
            changed: true,
        })
    }
}
