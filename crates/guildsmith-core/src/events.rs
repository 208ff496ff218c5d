//! Typed progress events, fanned out per operation
//!
//! Each operation owns one broadcast channel. Subscribers may attach
//! or detach at any time; delivery is at-most-once per transition with
//! no replay buffer, so a late subscriber falls back to `status`.

use crate::phase::Phase;
use guildsmith_types::{InviteCode, WorkspaceId};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Events published over an operation's channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CloneEvent {
    /// Phase and percentage update
    Progress {
        /// Phase currently running
        phase: Phase,
        /// Overall progress, 0-100, non-decreasing within a run
        percent: u8,
        /// Human-readable status line
        message: String,
    },
    /// Terminal: the clone finished
    Completed {
        /// The new workspace
        workspace: WorkspaceId,
        /// Best-effort invite; absence is not a failure
        invite: Option<InviteCode>,
    },
    /// Terminal: the clone aborted on an error, target rolled back
    Failed {
        /// Phase at which the run stopped
        phase: Phase,
        /// Human-readable reason
        reason: String,
    },
    /// Terminal: the clone was cancelled, target rolled back
    Cancelled {
        /// Phase at which the flag was observed
        phase: Phase,
    },
}

impl CloneEvent {
    /// Check if this event ends the stream
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CloneEvent::Progress { .. })
    }
}

/// Per-operation event fan-out
#[derive(Debug)]
pub(crate) struct EventChannel {
    sender: broadcast::Sender<CloneEvent>,
}

impl EventChannel {
    /// Create a channel with the given buffer capacity
    pub(crate) fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Attach a new subscriber; it sees only events published after
    /// this call
    pub(crate) fn subscribe(&self) -> broadcast::Receiver<CloneEvent> {
        self.sender.subscribe()
    }

    /// Publish to all current subscribers; a send with no subscribers
    /// is not an error
    pub(crate) fn publish(&self, event: CloneEvent) {
        let _ = self.sender.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_classification() {
        let progress = CloneEvent::Progress {
            phase: Phase::Roles,
            percent: 20,
            message: "cloning roles".to_string(),
        };
        assert!(!progress.is_terminal());

        let cancelled = CloneEvent::Cancelled {
            phase: Phase::Channels,
        };
        assert!(cancelled.is_terminal());
    }

    #[test]
    fn events_serialize_with_a_tag() {
        let event = CloneEvent::Failed {
            phase: Phase::Webhooks,
            reason: "remote api unavailable".to_string(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "failed");
        assert_eq!(json["phase"], "webhooks");

        let back: CloneEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_ok() {
        let channel = EventChannel::new(8);
        channel.publish(CloneEvent::Cancelled {
            phase: Phase::Roles,
        });
    }

    #[tokio::test]
    async fn late_subscriber_misses_prior_events() {
        let channel = EventChannel::new(8);

        channel.publish(CloneEvent::Progress {
            phase: Phase::Creating,
            percent: 5,
            message: "early".to_string(),
        });

        let mut rx = channel.subscribe();
        channel.publish(CloneEvent::Progress {
            phase: Phase::Roles,
            percent: 20,
            message: "late".to_string(),
        });

        let event = rx.recv().await.unwrap();
        assert!(matches!(
            event,
            CloneEvent::Progress {
                phase: Phase::Roles,
                ..
            }
        ));
        assert!(rx.try_recv().is_err());
    }
}
