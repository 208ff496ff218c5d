//! Guildsmith Core - workspace replication engine
//!
//! Drives the multi-phase clone of a remote collaborative workspace:
//! fetch a source snapshot, create a target workspace, and repopulate
//! roles, channel hierarchy, permission overwrites, emojis, and
//! webhooks, with live progress events, cooperative cancellation, and
//! best-effort compensating rollback.
//!
//! # Example
//!
//! ```ignore
//! use guildsmith_core::{CoreConfig, OperationRegistry};
//! use guildsmith_types::{CloneOptions, UserId, WorkspaceId};
//!
//! let registry = OperationRegistry::new(client, CoreConfig::default());
//! let id = registry.start(
//!     WorkspaceId(42),
//!     UserId(7),
//!     CloneOptions::new().with_emojis(),
//! )?;
//!
//! let mut events = registry.subscribe(id)?;
//! while let Ok(event) = events.recv().await {
//!     println!("{event:?}");
//! }
//! ```

#![warn(missing_docs)]

mod client;
mod config;
mod error;
mod events;
mod governor;
mod mapper;
mod operation;
mod orchestrator;
mod permissions;
mod phase;
mod registry;
mod rollback;

pub use client::WorkspaceClient;
pub use config::{CoreConfig, DEFAULT_MUTATION_INTERVAL_MS};
pub use error::{ClientError, CloneError, RegistryError};
pub use events::CloneEvent;
pub use governor::RateGovernor;
pub use mapper::IdentityMapper;
pub use operation::{CloneOperation, CorrelationId, OperationHandle, OperationId, StatusSnapshot};
pub use orchestrator::CloneOrchestrator;
pub use permissions::translate_overwrites;
pub use phase::{allowed_transitions, validate_transition, Phase, PhaseError};
pub use registry::OperationRegistry;
pub use rollback::{run_rollback, CreatedEntity, RollbackLog};
