//! Clone orchestrator
//!
//! Drives one operation end-to-end through the phase machine:
//! fetch snapshot, create target, clone roles, clone channels, clone
//! emojis, clone webhooks, finalize. Phase ordering is load-bearing:
//! roles must exist before channel overwrites can be translated,
//! categories before their children, channels before webhooks.
//!
//! A single entity's failure is logged and skipped; partial structural
//! fidelity beats aborting an otherwise-successful run. Phase-level
//! failures and cancellation abort the run and trigger rollback.

use crate::client::WorkspaceClient;
use crate::error::CloneError;
use crate::events::CloneEvent;
use crate::governor::RateGovernor;
use crate::operation::CloneOperation;
use crate::permissions::translate_overwrites;
use crate::phase::Phase;
use crate::rollback::{run_rollback, CreatedEntity};
use guildsmith_types::{
    ChannelId, ChannelKind, ChannelSnapshot, CreateChannelSpec, CreateEmojiSpec, CreateRoleSpec,
    CreateWebhookSpec, CreateWorkspaceSpec, InviteCode, WorkspaceId, WorkspaceSettings,
    WorkspaceSnapshot,
};
use std::sync::Arc;

/// Drives a single clone operation to a terminal phase
pub struct CloneOrchestrator {
    client: Arc<dyn WorkspaceClient>,
    governor: Arc<RateGovernor>,
}

impl CloneOrchestrator {
    /// Create an orchestrator over a client and a shared rate governor
    #[inline]
    #[must_use]
    pub fn new(client: Arc<dyn WorkspaceClient>, governor: Arc<RateGovernor>) -> Self {
        Self { client, governor }
    }

    /// Run the operation to completion, failure, or cancellation
    ///
    /// Always returns the operation in a terminal phase; errors are
    /// reported through the event channel, never to the caller. On
    /// failure or cancellation the target workspace is rolled back
    /// before the terminal event fires.
    pub async fn run(self, mut op: CloneOperation) -> CloneOperation {
        tracing::info!(
            operation = %op.id(),
            correlation = %op.correlation(),
            source = %op.source(),
            "starting clone run"
        );

        match self.execute(&mut op).await {
            Ok((workspace, invite)) => {
                self.force_terminal(&mut op, Phase::Completed);
                op.set_progress(100);
                tracing::info!(operation = %op.id(), %workspace, "clone completed");
                op.finish(CloneEvent::Completed { workspace, invite });
            }
            Err(CloneError::Cancelled { phase }) => {
                tracing::info!(operation = %op.id(), %phase, "clone cancelled, rolling back");
                run_rollback(
                    self.client.as_ref(),
                    op.target_workspace(),
                    op.rollback_log(),
                )
                .await;
                self.force_terminal(&mut op, Phase::Cancelled);
                op.finish(CloneEvent::Cancelled { phase });
            }
            Err(err) => {
                let phase = op.phase();
                tracing::error!(operation = %op.id(), %phase, error = %err, "clone failed, rolling back");
                run_rollback(
                    self.client.as_ref(),
                    op.target_workspace(),
                    op.rollback_log(),
                )
                .await;
                self.force_terminal(&mut op, Phase::Failed);
                op.finish(CloneEvent::Failed {
                    phase,
                    reason: err.to_string(),
                });
            }
        }

        op
    }

    async fn execute(
        &self,
        op: &mut CloneOperation,
    ) -> Result<(WorkspaceId, Option<InviteCode>), CloneError> {
        op.publish_progress("fetching source snapshot");
        let snapshot = self
            .client
            .fetch_snapshot(op.source())
            .await
            .map_err(CloneError::SourceUnavailable)?;
        snapshot.validate()?;
        tracing::debug!(
            operation = %op.id(),
            roles = snapshot.roles.len(),
            channels = snapshot.channels.len(),
            emojis = snapshot.emojis.len(),
            webhooks = snapshot.webhooks.len(),
            "source snapshot fetched"
        );

        check_cancel(op, Phase::Initializing)?;
        op.transition(Phase::Creating)?;
        op.publish_progress("creating target workspace");
        self.governor.throttle().await;
        let name = op
            .options()
            .name
            .clone()
            .unwrap_or_else(|| snapshot.name.clone());
        let target = self
            .client
            .create_workspace(CreateWorkspaceSpec::new(name))
            .await
            .map_err(CloneError::CreationFailed)?;
        op.set_target_workspace(target);
        op.set_progress(Phase::Creating.progress_span().1);
        op.publish_progress("target workspace created");

        if op.options().include_roles {
            self.clone_roles(op, &snapshot, target).await?;
        }

        let mut first_text_channel = None;
        if op.options().include_channels {
            first_text_channel = self.clone_channels(op, &snapshot, target).await?;
        }

        if op.options().include_emojis {
            self.clone_emojis(op, &snapshot, target).await?;
        }

        if op.options().include_webhooks {
            self.clone_webhooks(op, &snapshot, target).await?;
        }

        let invite = self
            .finalize(op, &snapshot, target, first_text_channel)
            .await?;

        Ok((target, invite))
    }

    async fn clone_roles(
        &self,
        op: &mut CloneOperation,
        snapshot: &WorkspaceSnapshot,
        target: WorkspaceId,
    ) -> Result<(), CloneError> {
        op.transition(Phase::Roles)?;
        let span = Phase::Roles.progress_span();
        op.set_progress(span.0);
        op.publish_progress("cloning roles");
        check_cancel(op, Phase::Roles)?;

        let total = snapshot.roles.len();
        for (index, role) in snapshot.roles.iter().enumerate() {
            check_cancel(op, Phase::Roles)?;
            self.governor.throttle().await;

            match self
                .client
                .create_role(target, CreateRoleSpec::from(role))
                .await
            {
                Ok(created) => {
                    op.rollback_log_mut().record(CreatedEntity::Role(created));
                    op.mapper_mut().record_role(role.id, created);
                    op.set_progress(progress_at(span, index + 1, total));
                    op.publish_progress(format!("created role {}", role.name));
                }
                Err(err) if err.is_phase_fatal() => {
                    return Err(CloneError::PhaseFailed {
                        phase: Phase::Roles,
                        source: err,
                    });
                }
                Err(err) => {
                    tracing::warn!(role = %role.name, error = %err, "skipping role that failed to clone");
                }
            }
        }

        Ok(())
    }

    async fn clone_channels(
        &self,
        op: &mut CloneOperation,
        snapshot: &WorkspaceSnapshot,
        target: WorkspaceId,
    ) -> Result<Option<ChannelId>, CloneError> {
        op.transition(Phase::Channels)?;
        let span = Phase::Channels.progress_span();
        op.set_progress(span.0);
        op.publish_progress("cloning channels");
        check_cancel(op, Phase::Channels)?;

        // Categories first so child channels can resolve their parents.
        let mut categories: Vec<&ChannelSnapshot> = snapshot.categories().collect();
        categories.sort_by_key(|c| c.position);
        let mut leaves: Vec<&ChannelSnapshot> = snapshot.leaf_channels().collect();
        leaves.sort_by_key(|c| c.position);

        let mut ordered = categories;
        ordered.extend(leaves);

        let total = ordered.len();
        let mut first_text_channel = None;
        for (index, channel) in ordered.into_iter().enumerate() {
            check_cancel(op, Phase::Channels)?;
            self.governor.throttle().await;

            let parent = channel.parent_id.and_then(|p| op.mapper().map_channel(p));
            if channel.parent_id.is_some() && parent.is_none() {
                tracing::warn!(
                    channel = %channel.name,
                    "parent category missing in target, creating at top level"
                );
            }
            let overwrites = translate_overwrites(&channel.overwrites, op.mapper());
            let spec = CreateChannelSpec::from_snapshot(channel, parent, overwrites);

            match self.client.create_channel(target, spec).await {
                Ok(created) => {
                    op.rollback_log_mut()
                        .record(CreatedEntity::Channel(created));
                    op.mapper_mut().record_channel(channel.id, created);
                    if first_text_channel.is_none() && channel.kind == ChannelKind::Text {
                        first_text_channel = Some(created);
                    }
                    op.set_progress(progress_at(span, index + 1, total));
                    op.publish_progress(format!("created channel {}", channel.name));
                }
                Err(err) if err.is_phase_fatal() => {
                    return Err(CloneError::PhaseFailed {
                        phase: Phase::Channels,
                        source: err,
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        channel = %channel.name,
                        error = %err,
                        "skipping channel that failed to clone"
                    );
                }
            }
        }

        Ok(first_text_channel)
    }

    async fn clone_emojis(
        &self,
        op: &mut CloneOperation,
        snapshot: &WorkspaceSnapshot,
        target: WorkspaceId,
    ) -> Result<(), CloneError> {
        op.transition(Phase::Emojis)?;
        let span = Phase::Emojis.progress_span();
        op.set_progress(span.0);
        op.publish_progress("cloning emojis");
        check_cancel(op, Phase::Emojis)?;

        let total = snapshot.emojis.len();
        for (index, emoji) in snapshot.emojis.iter().enumerate() {
            check_cancel(op, Phase::Emojis)?;
            self.governor.throttle().await;

            match self
                .client
                .create_emoji(target, CreateEmojiSpec::from(emoji))
                .await
            {
                Ok(created) => {
                    op.rollback_log_mut().record(CreatedEntity::Emoji(created));
                    op.set_progress(progress_at(span, index + 1, total));
                    op.publish_progress(format!("created emoji {}", emoji.name));
                }
                Err(err) if err.is_phase_fatal() => {
                    return Err(CloneError::PhaseFailed {
                        phase: Phase::Emojis,
                        source: err,
                    });
                }
                Err(err) => {
                    tracing::warn!(emoji = %emoji.name, error = %err, "skipping emoji that failed to clone");
                }
            }
        }

        Ok(())
    }

    async fn clone_webhooks(
        &self,
        op: &mut CloneOperation,
        snapshot: &WorkspaceSnapshot,
        target: WorkspaceId,
    ) -> Result<(), CloneError> {
        op.transition(Phase::Webhooks)?;
        let span = Phase::Webhooks.progress_span();
        op.set_progress(span.0);
        op.publish_progress("cloning webhooks");
        check_cancel(op, Phase::Webhooks)?;

        let total = snapshot.webhooks.len();
        for (index, webhook) in snapshot.webhooks.iter().enumerate() {
            check_cancel(op, Phase::Webhooks)?;

            // A webhook must bind to a channel that made it across.
            let Some(channel) = op.mapper().map_channel(webhook.channel_id) else {
                tracing::warn!(
                    webhook = %webhook.name,
                    "bound channel missing in target, skipping webhook"
                );
                continue;
            };

            self.governor.throttle().await;
            match self
                .client
                .create_webhook(target, CreateWebhookSpec::from_snapshot(webhook, channel))
                .await
            {
                Ok(created) => {
                    op.rollback_log_mut()
                        .record(CreatedEntity::Webhook(created));
                    op.set_progress(progress_at(span, index + 1, total));
                    op.publish_progress(format!("created webhook {}", webhook.name));
                }
                Err(err) if err.is_phase_fatal() => {
                    return Err(CloneError::PhaseFailed {
                        phase: Phase::Webhooks,
                        source: err,
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        webhook = %webhook.name,
                        error = %err,
                        "skipping webhook that failed to clone"
                    );
                }
            }
        }

        Ok(())
    }

    async fn finalize(
        &self,
        op: &mut CloneOperation,
        snapshot: &WorkspaceSnapshot,
        target: WorkspaceId,
        first_text_channel: Option<ChannelId>,
    ) -> Result<Option<InviteCode>, CloneError> {
        op.transition(Phase::Finalizing)?;
        op.set_progress(Phase::Finalizing.progress_span().0);
        op.publish_progress("finalizing workspace");
        check_cancel(op, Phase::Finalizing)?;

        if snapshot.icon_url.is_some() {
            let settings = WorkspaceSettings {
                name: None,
                icon_url: snapshot.icon_url.clone(),
            };
            self.governor.throttle().await;
            if let Err(err) = self.client.update_settings(target, settings).await {
                tracing::warn!(error = %err, "cosmetic settings update failed");
            }
        }

        // Best-effort invite; absence is not a failure.
        let invite = match first_text_channel {
            Some(channel) => {
                self.governor.throttle().await;
                match self.client.create_invite(target, channel).await {
                    Ok(code) => code,
                    Err(err) => {
                        tracing::warn!(error = %err, "invite creation failed");
                        None
                    }
                }
            }
            None => None,
        };

        Ok(invite)
    }

    fn force_terminal(&self, op: &mut CloneOperation, terminal: Phase) {
        if let Err(err) = op.transition(terminal) {
            tracing::error!(operation = %op.id(), error = %err, "terminal transition rejected");
        }
    }
}

fn check_cancel(op: &CloneOperation, phase: Phase) -> Result<(), CloneError> {
    if op.cancel_requested() {
        Err(CloneError::Cancelled { phase })
    } else {
        Ok(())
    }
}

fn progress_at((start, end): (u8, u8), done: usize, total: usize) -> u8 {
    if total == 0 {
        return end;
    }
    let width = u32::from(end - start);
    let done = done.min(total) as u32;
    start + (width * done / total as u32) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_linear_within_a_span() {
        let span = (40, 70);
        assert_eq!(progress_at(span, 0, 3), 40);
        assert_eq!(progress_at(span, 1, 3), 50);
        assert_eq!(progress_at(span, 3, 3), 70);
    }

    #[test]
    fn empty_phase_jumps_to_span_end() {
        assert_eq!(progress_at((15, 40), 0, 0), 40);
    }

    #[test]
    fn progress_never_exceeds_span() {
        assert_eq!(progress_at((85, 95), 9, 3), 95);
    }
}
