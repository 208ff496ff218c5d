//! Testing utilities for the Guildsmith workspace
//!
//! Shared fixtures and an in-memory mock of the remote workspace
//! client, with scripted failures for exercising partial-failure and
//! rollback paths.

#![allow(missing_docs)]

use async_trait::async_trait;
use guildsmith_core::{ClientError, WorkspaceClient};
use guildsmith_types::{
    ChannelId, ChannelKind, ChannelSnapshot, CreateChannelSpec, CreateEmojiSpec, CreateRoleSpec,
    CreateWebhookSpec, CreateWorkspaceSpec, EmojiId, EmojiSnapshot, InviteCode, PermissionBits,
    PermissionOverwrite, RoleId, RoleSnapshot, SubjectId, UserId, WebhookId, WebhookSnapshot,
    WorkspaceId, WorkspaceSettings, WorkspaceSnapshot,
};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

/// Initialize test logging once; safe to call from every test
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}

/// Everything the mock recorded about one created workspace
#[derive(Debug, Clone)]
pub struct CreatedWorkspace {
    pub spec: CreateWorkspaceSpec,
    pub roles: Vec<(RoleId, CreateRoleSpec)>,
    pub channels: Vec<(ChannelId, CreateChannelSpec)>,
    pub emojis: Vec<(EmojiId, CreateEmojiSpec)>,
    pub webhooks: Vec<(WebhookId, CreateWebhookSpec)>,
    pub settings: Vec<WorkspaceSettings>,
}

impl CreatedWorkspace {
    fn new(spec: CreateWorkspaceSpec) -> Self {
        Self {
            spec,
            roles: Vec::new(),
            channels: Vec::new(),
            emojis: Vec::new(),
            webhooks: Vec::new(),
            settings: Vec::new(),
        }
    }
}

type CallHook = Box<dyn Fn(&str) + Send + Sync>;

#[derive(Default)]
struct MockState {
    snapshots: HashMap<WorkspaceId, WorkspaceSnapshot>,
    workspaces: HashMap<WorkspaceId, CreatedWorkspace>,
    deleted: Vec<WorkspaceId>,
    next_id: u64,
    fail_role_names: HashSet<String>,
    fail_channel_names: HashSet<String>,
    fail_workspace_create: bool,
    roles_unavailable: bool,
    invites: Vec<(WorkspaceId, ChannelId)>,
}

/// In-memory mock of the remote workspace client
///
/// Allocates sequential target-space IDs, records every creation, and
/// can be scripted to fail specific entities by name. A call hook
/// fires after each mutation, which lets tests trigger cancellation
/// mid-phase.
pub struct MockWorkspaceClient {
    state: Mutex<MockState>,
    hook: Mutex<Option<CallHook>>,
}

impl MockWorkspaceClient {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                next_id: 1000,
                ..MockState::default()
            }),
            hook: Mutex::new(None),
        }
    }

    /// Register a source snapshot, keyed by its workspace ID
    pub fn insert_snapshot(&self, snapshot: WorkspaceSnapshot) {
        let mut state = self.state.lock();
        state.snapshots.insert(snapshot.id, snapshot);
    }

    /// Make `create_role` fail with an API error for this role name
    pub fn fail_role_named(&self, name: impl Into<String>) {
        self.state.lock().fail_role_names.insert(name.into());
    }

    /// Make `create_channel` fail with an API error for this channel name
    pub fn fail_channel_named(&self, name: impl Into<String>) {
        self.state.lock().fail_channel_names.insert(name.into());
    }

    /// Make `create_workspace` fail
    pub fn fail_workspace_creation(&self) {
        self.state.lock().fail_workspace_create = true;
    }

    /// Make every `create_role` call report the API as unavailable
    pub fn set_roles_unavailable(&self) {
        self.state.lock().roles_unavailable = true;
    }

    /// Fire `hook` after every mutation call, with a `method:name` label
    pub fn set_call_hook(&self, hook: impl Fn(&str) + Send + Sync + 'static) {
        *self.hook.lock() = Some(Box::new(hook));
    }

    /// Whether a created workspace still exists (not deleted)
    pub fn workspace_exists(&self, id: WorkspaceId) -> bool {
        self.state.lock().workspaces.contains_key(&id)
    }

    /// Workspaces deleted so far, in deletion order
    pub fn deleted_workspaces(&self) -> Vec<WorkspaceId> {
        self.state.lock().deleted.clone()
    }

    /// Recorded contents of a created workspace
    pub fn created(&self, id: WorkspaceId) -> Option<CreatedWorkspace> {
        self.state.lock().workspaces.get(&id).cloned()
    }

    /// Invites minted so far
    pub fn minted_invites(&self) -> Vec<(WorkspaceId, ChannelId)> {
        self.state.lock().invites.clone()
    }

    fn allocate(state: &mut MockState) -> u64 {
        let id = state.next_id;
        state.next_id += 1;
        id
    }

    fn fire_hook(&self, label: &str) {
        if let Some(hook) = self.hook.lock().as_ref() {
            hook(label);
        }
    }

    fn missing_workspace(target: WorkspaceId) -> ClientError {
        ClientError::Api {
            status: 404,
            message: format!("workspace {target} not found"),
        }
    }
}

impl Default for MockWorkspaceClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkspaceClient for MockWorkspaceClient {
    async fn fetch_snapshot(&self, source: WorkspaceId) -> Result<WorkspaceSnapshot, ClientError> {
        self.state
            .lock()
            .snapshots
            .get(&source)
            .cloned()
            .ok_or_else(|| ClientError::Unavailable(format!("no snapshot for {source}")))
    }

    async fn create_workspace(
        &self,
        spec: CreateWorkspaceSpec,
    ) -> Result<WorkspaceId, ClientError> {
        let id = {
            let mut state = self.state.lock();
            if state.fail_workspace_create {
                return Err(ClientError::Api {
                    status: 403,
                    message: "workspace creation denied".to_string(),
                });
            }
            let id = WorkspaceId(Self::allocate(&mut state));
            state.workspaces.insert(id, CreatedWorkspace::new(spec));
            id
        };
        self.fire_hook("create_workspace");
        Ok(id)
    }

    async fn delete_workspace(&self, target: WorkspaceId) -> Result<(), ClientError> {
        {
            let mut state = self.state.lock();
            if state.workspaces.remove(&target).is_none() {
                return Err(Self::missing_workspace(target));
            }
            state.deleted.push(target);
        }
        self.fire_hook("delete_workspace");
        Ok(())
    }

    async fn create_role(
        &self,
        target: WorkspaceId,
        spec: CreateRoleSpec,
    ) -> Result<RoleId, ClientError> {
        let label = format!("create_role:{}", spec.name);
        let id = {
            let mut state = self.state.lock();
            if state.roles_unavailable {
                return Err(ClientError::Unavailable("role endpoint down".to_string()));
            }
            if state.fail_role_names.contains(&spec.name) {
                return Err(ClientError::Api {
                    status: 400,
                    message: format!("rejected role {}", spec.name),
                });
            }
            let id = RoleId(Self::allocate(&mut state));
            state
                .workspaces
                .get_mut(&target)
                .ok_or_else(|| Self::missing_workspace(target))?
                .roles
                .push((id, spec));
            id
        };
        self.fire_hook(&label);
        Ok(id)
    }

    async fn create_channel(
        &self,
        target: WorkspaceId,
        spec: CreateChannelSpec,
    ) -> Result<ChannelId, ClientError> {
        let label = format!("create_channel:{}", spec.name);
        let id = {
            let mut state = self.state.lock();
            if state.fail_channel_names.contains(&spec.name) {
                return Err(ClientError::Api {
                    status: 400,
                    message: format!("rejected channel {}", spec.name),
                });
            }
            let id = ChannelId(Self::allocate(&mut state));
            state
                .workspaces
                .get_mut(&target)
                .ok_or_else(|| Self::missing_workspace(target))?
                .channels
                .push((id, spec));
            id
        };
        self.fire_hook(&label);
        Ok(id)
    }

    async fn create_emoji(
        &self,
        target: WorkspaceId,
        spec: CreateEmojiSpec,
    ) -> Result<EmojiId, ClientError> {
        let label = format!("create_emoji:{}", spec.name);
        let id = {
            let mut state = self.state.lock();
            let id = EmojiId(Self::allocate(&mut state));
            state
                .workspaces
                .get_mut(&target)
                .ok_or_else(|| Self::missing_workspace(target))?
                .emojis
                .push((id, spec));
            id
        };
        self.fire_hook(&label);
        Ok(id)
    }

    async fn create_webhook(
        &self,
        target: WorkspaceId,
        spec: CreateWebhookSpec,
    ) -> Result<WebhookId, ClientError> {
        let label = format!("create_webhook:{}", spec.name);
        let id = {
            let mut state = self.state.lock();
            let id = WebhookId(Self::allocate(&mut state));
            state
                .workspaces
                .get_mut(&target)
                .ok_or_else(|| Self::missing_workspace(target))?
                .webhooks
                .push((id, spec));
            id
        };
        self.fire_hook(&label);
        Ok(id)
    }

    async fn update_settings(
        &self,
        target: WorkspaceId,
        settings: WorkspaceSettings,
    ) -> Result<(), ClientError> {
        {
            let mut state = self.state.lock();
            state
                .workspaces
                .get_mut(&target)
                .ok_or_else(|| Self::missing_workspace(target))?
                .settings
                .push(settings);
        }
        self.fire_hook("update_settings");
        Ok(())
    }

    async fn create_invite(
        &self,
        target: WorkspaceId,
        channel: ChannelId,
    ) -> Result<Option<InviteCode>, ClientError> {
        {
            let mut state = self.state.lock();
            if !state.workspaces.contains_key(&target) {
                return Err(Self::missing_workspace(target));
            }
            state.invites.push((target, channel));
        }
        self.fire_hook("create_invite");
        Ok(Some(InviteCode::new(format!("inv-{target}-{channel}"))))
    }
}

fn role(id: u64, name: &str, position: i32) -> RoleSnapshot {
    RoleSnapshot {
        id: RoleId(id),
        name: name.to_string(),
        permissions: PermissionBits::new(0x400 | id),
        color: 0x336699,
        hoist: position > 1,
        mentionable: true,
        position,
    }
}

fn text_channel(id: u64, name: &str, parent: Option<u64>, position: i32) -> ChannelSnapshot {
    ChannelSnapshot {
        id: ChannelId(id),
        name: name.to_string(),
        kind: ChannelKind::Text,
        position,
        parent_id: parent.map(ChannelId),
        topic: Some(format!("{name} topic")),
        bitrate: None,
        user_limit: None,
        overwrites: Vec::new(),
    }
}

fn category(id: u64, name: &str, position: i32) -> ChannelSnapshot {
    ChannelSnapshot {
        id: ChannelId(id),
        name: name.to_string(),
        kind: ChannelKind::Category,
        position,
        parent_id: None,
        topic: None,
        bitrate: None,
        user_limit: None,
        overwrites: Vec::new(),
    }
}

/// Snapshot with 3 roles and 1 category holding 2 text channels
///
/// Channel overwrites reference two live roles, one dangling role
/// (absent from the role list, dropped at translation time), and one
/// user (passed through unchanged).
pub fn basic_snapshot(source: WorkspaceId) -> WorkspaceSnapshot {
    let mut snapshot = WorkspaceSnapshot::new(source, "acme guild");
    snapshot.roles = vec![
        role(1, "admins", 3),
        role(2, "mods", 2),
        role(3, "members", 1),
    ];

    let mut chat = text_channel(11, "chat", Some(10), 0);
    chat.overwrites = vec![
        PermissionOverwrite::new(
            SubjectId::Role(RoleId(1)),
            PermissionBits::new(0x3f),
            PermissionBits::NONE,
        ),
        PermissionOverwrite::new(
            SubjectId::User(UserId(500)),
            PermissionBits::new(0x01),
            PermissionBits::new(0x02),
        ),
    ];

    let mut dev = text_channel(12, "dev", Some(10), 1);
    dev.overwrites = vec![
        PermissionOverwrite::new(
            SubjectId::Role(RoleId(2)),
            PermissionBits::new(0x07),
            PermissionBits::NONE,
        ),
        // References a role the snapshot does not carry; the
        // translator must drop it.
        PermissionOverwrite::new(
            SubjectId::Role(RoleId(99)),
            PermissionBits::new(0xff),
            PermissionBits::NONE,
        ),
    ];

    snapshot.channels = vec![category(10, "general", 0), chat, dev];
    snapshot
}

/// `basic_snapshot` plus emojis, a voice channel, and webhooks
///
/// One webhook is bound to a channel missing from the snapshot's
/// channel list, so the webhooks phase must skip it.
pub fn rich_snapshot(source: WorkspaceId) -> WorkspaceSnapshot {
    let mut snapshot = basic_snapshot(source);
    snapshot.icon_url = Some("https://cdn.example/acme.png".to_string());

    snapshot.channels.push(ChannelSnapshot {
        id: ChannelId(13),
        name: "lounge".to_string(),
        kind: ChannelKind::Voice,
        position: 2,
        parent_id: Some(ChannelId(10)),
        topic: None,
        bitrate: Some(64_000),
        user_limit: Some(8),
        overwrites: Vec::new(),
    });

    snapshot.emojis = vec![
        EmojiSnapshot {
            id: EmojiId(21),
            name: "partyparrot".to_string(),
            image_url: "https://cdn.example/parrot.gif".to_string(),
            animated: true,
        },
        EmojiSnapshot {
            id: EmojiId(22),
            name: "shipit".to_string(),
            image_url: "https://cdn.example/shipit.png".to_string(),
            animated: false,
        },
    ];

    snapshot.webhooks = vec![
        WebhookSnapshot {
            id: WebhookId(31),
            name: "deploys".to_string(),
            channel_id: ChannelId(11),
            avatar_url: None,
        },
        WebhookSnapshot {
            id: WebhookId(32),
            name: "orphan".to_string(),
            channel_id: ChannelId(999),
            avatar_url: None,
        },
    ];

    snapshot
}
