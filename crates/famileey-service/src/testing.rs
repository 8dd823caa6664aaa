//! In-memory wiring of every service for unit tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use famileey_auth::{PasswordValidator, StoreIdentityProvider};
use famileey_core::config::{AuthConfig, FeedConfig};
use famileey_core::error::AppError;
use famileey_core::result::AppResult;
use famileey_core::traits::push::{PushMessage, PushSender, PushTicket};
use famileey_core::types::id::UserId;
use famileey_database::repositories::{
    ChatRepository, CommentRepository, FollowRepository, FollowRequestRepository,
    GroupRepository, LikeRepository, NotificationRepository, PostRepository, PresenceRepository,
    PushTokenRepository, UserRepository, ViewRepository,
};
use famileey_database::store::MemoryStore;
use famileey_database::StoreManager;
use famileey_entity::user::{UserProfile, UserRole};

use crate::account::{AccountService, ProfileReader};
use crate::admin::AdminService;
use crate::family::{FeedService, GraphService};
use crate::messaging::{ChatService, GroupService};
use crate::notification::{NotificationService, is_expo_push_token};
use crate::post::{EngagementReader, PostService};

pub(crate) const VALID_TOKEN: &str = "ExponentPushToken[test-device]";

/// Push sink that records every message it accepts.
#[derive(Debug, Default)]
pub(crate) struct RecordingPushSender {
    sent: Mutex<Vec<PushMessage>>,
    fail_next: AtomicBool,
}

impl RecordingPushSender {
    pub(crate) fn sent(&self) -> Vec<PushMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl PushSender for RecordingPushSender {
    fn is_valid_token(&self, token: &str) -> bool {
        is_expo_push_token(token)
    }

    async fn send(&self, message: PushMessage) -> AppResult<PushTicket> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(AppError::upstream("push service unavailable"));
        }
        self.sent.lock().unwrap().push(message);
        Ok(PushTicket {
            status: "ok".into(),
            id: None,
            message: None,
        })
    }
}

pub(crate) struct Harness {
    pub store: StoreManager,
    pub push: Arc<RecordingPushSender>,
    pub user_repo: Arc<UserRepository>,
    pub follows: Arc<FollowRepository>,
    pub requests: Arc<FollowRequestRepository>,
    pub tokens: Arc<PushTokenRepository>,
    pub chat_repo: Arc<ChatRepository>,
    pub group_repo: Arc<GroupRepository>,
    pub accounts: AccountService,
    pub notifications: NotificationService,
    pub feed: FeedService,
    pub graph: GraphService,
    pub posts: PostService,
    pub chats: ChatService,
    pub groups: GroupService,
    pub admin: AdminService,
}

impl Harness {
    pub(crate) async fn new() -> Self {
        let store = StoreManager::from_store(Arc::new(MemoryStore::new()));
        let auth = AuthConfig::default();
        let push = Arc::new(RecordingPushSender::default());

        let user_repo = Arc::new(UserRepository::new(store.clone()));
        let follows = Arc::new(FollowRepository::new(store.clone()));
        let requests = Arc::new(FollowRequestRepository::new(store.clone()));
        let posts_repo = Arc::new(PostRepository::new(store.clone()));
        let likes = Arc::new(LikeRepository::new(store.clone()));
        let comments = Arc::new(CommentRepository::new(store.clone()));
        let views = Arc::new(ViewRepository::new(store.clone()));
        let chat_repo = Arc::new(ChatRepository::new(store.clone()));
        let group_repo = Arc::new(GroupRepository::new(store.clone()));
        let presence = Arc::new(PresenceRepository::new(store.clone()));
        let notification_repo = Arc::new(NotificationRepository::new(store.clone()));
        let tokens = Arc::new(PushTokenRepository::new(store.clone()));

        let profiles = ProfileReader::new(user_repo.clone(), follows.clone());
        let identity = Arc::new(StoreIdentityProvider::new(store.clone(), &auth));
        let notifications = NotificationService::new(
            store.clone(),
            notification_repo,
            user_repo.clone(),
            tokens.clone(),
            push.clone(),
            "Famileey",
        );
        let engagement = EngagementReader::new(
            likes.clone(),
            comments.clone(),
            views.clone(),
            profiles.clone(),
            FeedConfig::default(),
        );

        Self {
            accounts: AccountService::new(
                identity,
                user_repo.clone(),
                profiles.clone(),
                PasswordValidator::new(&auth),
            ),
            feed: FeedService::new(
                user_repo.clone(),
                posts_repo.clone(),
                likes.clone(),
                comments.clone(),
                views,
                follows.clone(),
                engagement.clone(),
            ),
            graph: GraphService::new(
                store.clone(),
                user_repo.clone(),
                follows.clone(),
                requests.clone(),
                notifications.clone(),
            ),
            posts: PostService::new(
                posts_repo,
                likes,
                comments,
                profiles,
                engagement,
                notifications.clone(),
            ),
            chats: ChatService::new(
                store.clone(),
                user_repo.clone(),
                chat_repo.clone(),
                group_repo.clone(),
                presence,
                notifications.clone(),
            ),
            groups: GroupService::new(
                store.clone(),
                user_repo.clone(),
                group_repo.clone(),
                follows.clone(),
                notifications.clone(),
            ),
            admin: AdminService::new(user_repo.clone(), notifications.clone()),
            notifications,
            store,
            push,
            user_repo,
            follows,
            requests,
            tokens,
            chat_repo,
            group_repo,
        }
    }

    /// Writes a profile directly and returns its id.
    pub(crate) async fn user(&self, uid: &str, family_name: &str) -> UserId {
        self.user_with_role(uid, family_name, UserRole::User).await
    }

    pub(crate) async fn admin_user(&self, uid: &str, family_name: &str) -> UserId {
        self.user_with_role(uid, family_name, UserRole::Admin).await
    }

    async fn user_with_role(&self, uid: &str, family_name: &str, role: UserRole) -> UserId {
        let uid = UserId::from(uid);
        let profile = UserProfile {
            family_name: family_name.to_string(),
            role,
            ..UserProfile::default()
        };
        self.user_repo.create(&uid, &profile).await.unwrap();
        uid
    }
}
