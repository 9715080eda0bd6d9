#![allow(dead_code)]

use inbox_dashboard::{
    api::router::create_router,
    config::Config,
    domain::models::{
        auth::{AuthTokens, Claims, Credentials, NewAccount},
        conversation::{Conversation, ConversationPatch, Direction, Message},
        file::{FileUpload, KnowledgeFile, ProcessedFile},
        integration::Channel,
        subscription::{Limits, Subscription, Tier, Usage, UsageField},
        tag::Tag,
        tenant::{Company, Invitation, InvitationStatus, MemberRole, Membership},
        user::Principal,
    },
    domain::ports::{
        AuthGateway, Backend, ChannelSenders, CompanyRepository, ConversationRepository,
        FileProcessor, FileRepository, IntegrationStore, MessageSender, OAuthExchange,
        SubscriptionRepository, TagRepository, TeamRepository, UsageRepository,
    },
    error::AppError,
    infra::factory::build_state,
    state::AppState,
};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

pub const JWT_SECRET: &str = "test-jwt-secret-with-enough-entropy";

pub fn mint_token(sub: &str, email: &str) -> String {
    let now = Utc::now();
    let claims = Claims {
        sub: sub.to_string(),
        aud: "authenticated".to_string(),
        exp: (now + ChronoDuration::hours(1)).timestamp() as usize,
        iat: now.timestamp() as usize,
        email: Some(email.to_string()),
        role: Some("authenticated".to_string()),
        session_id: Some(Uuid::new_v4().to_string()),
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(JWT_SECRET.as_bytes())).unwrap()
}

/// In-memory stand-in for the whole backend-as-a-service. Every call is
/// logged by name, and any call can be made to fail with [`FakeBackend::fail`].
#[derive(Default)]
pub struct FakeBackend {
    pub accounts: Mutex<HashMap<String, (Principal, String)>>,
    pub tokens: Mutex<HashMap<String, Principal>>,
    pub companies: Mutex<HashMap<String, Company>>,
    pub members: Mutex<Vec<Membership>>,
    pub invitations: Mutex<Vec<Invitation>>,
    pub subscriptions: Mutex<HashMap<String, Subscription>>,
    pub usage: Mutex<HashMap<String, Usage>>,
    pub integrations: Mutex<HashMap<(Channel, String), Value>>,
    pub conversations: Mutex<Vec<Conversation>>,
    pub tags: Mutex<Vec<Tag>>,
    pub files: Mutex<Vec<KnowledgeFile>>,
    pub remote_files: Mutex<Vec<String>>,
    pub sent: Mutex<Vec<(Channel, String, String)>>,
    pub calls: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
    pub exchange_delay: Mutex<Option<Duration>>,
    pub upload_delay: Mutex<Option<Duration>>,
    pub membership_delay: Mutex<Option<Duration>>,
    active_exchanges: AtomicUsize,
    pub max_concurrent_exchanges: AtomicUsize,
}

impl FakeBackend {
    pub fn fail(&self, op: &str) {
        self.failing.lock().insert(op.to_string());
    }

    pub fn heal(&self, op: &str) {
        self.failing.lock().remove(op);
    }

    pub fn calls_to(&self, op: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.as_str() == op).count()
    }

    pub fn calls_with_prefix(&self, prefix: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    fn call(&self, op: &str) -> Result<(), AppError> {
        self.calls.lock().push(op.to_string());
        if self.failing.lock().contains(op) {
            return Err(AppError::Remote(format!("{} failed", op)));
        }
        Ok(())
    }

    pub fn add_account(&self, email: &str, password: &str, name: &str) -> Principal {
        let principal = Principal {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            display_name: Some(name.to_string()),
            phone: None,
        };
        self.accounts
            .lock()
            .insert(email.to_string(), (principal.clone(), password.to_string()));
        principal
    }

    fn issue(&self, principal: &Principal) -> AuthTokens {
        let token = mint_token(&principal.id, &principal.email);
        self.tokens.lock().insert(token.clone(), principal.clone());
        AuthTokens {
            access_token: token,
            refresh_token: Some(Uuid::new_v4().to_string()),
            expires_at: Some(Utc::now() + ChronoDuration::hours(1)),
            principal: principal.clone(),
        }
    }

    pub fn token_for(&self, principal: &Principal) -> String {
        self.issue(principal).access_token
    }

    pub fn usage_of(&self, company_id: &str) -> Usage {
        self.usage.lock().get(company_id).cloned().unwrap()
    }

    pub fn set_used(&self, company_id: &str, field: UsageField, used: i64) {
        let mut usage = self.usage.lock();
        let row = usage.get_mut(company_id).unwrap();
        match field {
            UsageField::Messages => row.messages_used = used,
            UsageField::Files => row.files_used = used,
            UsageField::TeamMembers => row.team_members_used = used,
        }
    }

    pub fn add_conversation(&self, company_id: &str, channel: &str, contact: &str) -> Conversation {
        let id = Uuid::new_v4().to_string();
        let conversation = Conversation {
            id: id.clone(),
            company_id: company_id.to_string(),
            channel: channel.to_string(),
            contact_id: format!("contact-{}", contact),
            contact_name: Some(contact.to_string()),
            contact_tags: vec![],
            notes: None,
            is_pinned: false,
            auto_respond: false,
            last_message_at: Some(Utc::now()),
            messages: vec![Message {
                id: Uuid::new_v4().to_string(),
                conversation_id: id,
                direction: Direction::Inbound,
                content: format!("Hello from {}", contact),
                created_at: Utc::now(),
            }],
        };
        self.conversations.lock().push(conversation.clone());
        conversation
    }

    pub fn add_global_tag(&self, name: &str) -> Tag {
        let tag = Tag {
            id: Uuid::new_v4().to_string(),
            company_id: String::new(),
            name: name.to_string(),
            color: "#000000".to_string(),
            is_global: true,
            created_at: Some(Utc::now()),
        };
        self.tags.lock().push(tag.clone());
        tag
    }

    pub fn add_company_tag(&self, company_id: &str, name: &str, color: &str) -> Tag {
        let tag = Tag {
            id: Uuid::new_v4().to_string(),
            company_id: company_id.to_string(),
            name: name.to_string(),
            color: color.to_string(),
            is_global: false,
            created_at: Some(Utc::now()),
        };
        self.tags.lock().push(tag.clone());
        tag
    }

    pub fn seed_integration(&self, channel: Channel, company_id: &str, row: Value) {
        self.integrations.lock().insert((channel, company_id.to_string()), row);
    }
}

#[async_trait]
impl AuthGateway for FakeBackend {
    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthTokens, AppError> {
        self.call("auth.sign_in")?;
        let principal = match self.accounts.lock().get(&credentials.email) {
            Some((principal, password)) if *password == credentials.password => principal.clone(),
            _ => return Err(AppError::Remote("Invalid login credentials".into())),
        };
        Ok(self.issue(&principal))
    }

    async fn sign_up(&self, account: &NewAccount) -> Result<AuthTokens, AppError> {
        self.call("auth.sign_up")?;
        if self.accounts.lock().contains_key(&account.email) {
            return Err(AppError::Remote("User already registered".into()));
        }
        let principal = self.add_account(
            &account.email,
            &account.password,
            account.full_name.as_deref().unwrap_or_default(),
        );
        Ok(self.issue(&principal))
    }

    async fn current_user(&self, access_token: &str) -> Result<Principal, AppError> {
        self.call("auth.current_user")?;
        self.tokens.lock().get(access_token).cloned().ok_or(AppError::Unauthorized)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AppError> {
        self.call("auth.sign_out")?;
        self.tokens.lock().remove(access_token);
        Ok(())
    }
}

#[async_trait]
impl CompanyRepository for FakeBackend {
    async fn create(&self, company: &Company) -> Result<Company, AppError> {
        self.call("companies.create")?;
        self.companies.lock().insert(company.id.clone(), company.clone());
        Ok(company.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Company>, AppError> {
        self.call("companies.find")?;
        Ok(self.companies.lock().get(id).cloned())
    }
}

#[async_trait]
impl TeamRepository for FakeBackend {
    async fn create(&self, membership: &Membership) -> Result<Membership, AppError> {
        self.call("team.create")?;
        self.members.lock().push(membership.clone());
        Ok(membership.clone())
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Option<Membership>, AppError> {
        self.call("team.find_by_user")?;
        let delay = *self.membership_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.members.lock().iter().find(|m| m.user_id == user_id).cloned())
    }

    async fn list_by_company(&self, company_id: &str) -> Result<Vec<Membership>, AppError> {
        self.call("team.list")?;
        Ok(self.members.lock().iter().filter(|m| m.company_id == company_id).cloned().collect())
    }

    async fn delete(&self, company_id: &str, user_id: &str) -> Result<(), AppError> {
        self.call("team.delete")?;
        let mut members = self.members.lock();
        let before = members.len();
        members.retain(|m| !(m.company_id == company_id && m.user_id == user_id));
        if members.len() == before {
            return Err(AppError::NotFound("Member not found".into()));
        }
        Ok(())
    }

    async fn create_invitation(&self, invitation: &Invitation) -> Result<Invitation, AppError> {
        self.call("invitations.create")?;
        self.invitations.lock().push(invitation.clone());
        Ok(invitation.clone())
    }

    async fn find_invitation(&self, token: &str) -> Result<Option<Invitation>, AppError> {
        self.call("invitations.find")?;
        Ok(self.invitations.lock().iter().find(|i| i.token == token).cloned())
    }

    async fn list_invitations(&self, company_id: &str) -> Result<Vec<Invitation>, AppError> {
        self.call("invitations.list")?;
        Ok(self.invitations.lock().iter().filter(|i| i.company_id == company_id).cloned().collect())
    }

    async fn set_invitation_status(&self, id: &str, status: InvitationStatus) -> Result<(), AppError> {
        self.call("invitations.update")?;
        let mut invitations = self.invitations.lock();
        let invitation = invitations
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| AppError::NotFound("Invitation not found".into()))?;
        invitation.status = status;
        Ok(())
    }
}

#[async_trait]
impl SubscriptionRepository for FakeBackend {
    async fn create(&self, subscription: &Subscription) -> Result<Subscription, AppError> {
        self.call("subscriptions.create")?;
        self.subscriptions.lock().insert(subscription.company_id.clone(), subscription.clone());
        Ok(subscription.clone())
    }

    async fn find_by_company(&self, company_id: &str) -> Result<Option<Subscription>, AppError> {
        self.call("subscriptions.find")?;
        Ok(self.subscriptions.lock().get(company_id).cloned())
    }

    async fn update(&self, subscription: &Subscription) -> Result<Subscription, AppError> {
        self.call("subscriptions.update")?;
        self.subscriptions.lock().insert(subscription.company_id.clone(), subscription.clone());
        Ok(subscription.clone())
    }
}

#[async_trait]
impl UsageRepository for FakeBackend {
    async fn create(&self, usage: &Usage) -> Result<Usage, AppError> {
        self.call("usage.create")?;
        self.usage.lock().insert(usage.company_id.clone(), usage.clone());
        Ok(usage.clone())
    }

    async fn find_by_company(&self, company_id: &str) -> Result<Option<Usage>, AppError> {
        self.call("usage.find")?;
        Ok(self.usage.lock().get(company_id).cloned())
    }

    async fn increment(&self, company_id: &str, field: UsageField, delta: i64) -> Result<Usage, AppError> {
        self.call("usage.increment")?;
        let mut usage = self.usage.lock();
        let row = usage
            .get_mut(company_id)
            .ok_or_else(|| AppError::NotFound("No usage record found for this company".into()))?;
        match field {
            UsageField::Messages => row.messages_used += delta,
            UsageField::Files => row.files_used += delta,
            UsageField::TeamMembers => row.team_members_used += delta,
        }
        Ok(row.clone())
    }

    async fn set_limits(&self, company_id: &str, limits: Limits) -> Result<Usage, AppError> {
        self.call("usage.set_limits")?;
        let mut usage = self.usage.lock();
        let row = usage
            .get_mut(company_id)
            .ok_or_else(|| AppError::NotFound("No usage record found for this company".into()))?;
        row.apply_limits(limits);
        Ok(row.clone())
    }
}

#[async_trait]
impl IntegrationStore for FakeBackend {
    async fn fetch(&self, channel: Channel, company_id: &str) -> Result<Option<Value>, AppError> {
        self.call("integrations.fetch")?;
        Ok(self.integrations.lock().get(&(channel, company_id.to_string())).cloned())
    }

    async fn upsert(&self, channel: Channel, row: &Value) -> Result<Value, AppError> {
        self.call("integrations.upsert")?;
        let company_id = row["company_id"].as_str().unwrap_or_default().to_string();
        let mut stored = row.clone();
        stored["id"] = json!(format!("{}-{}", channel, company_id));
        self.integrations.lock().insert((channel, company_id), stored.clone());
        Ok(stored)
    }

    async fn delete(&self, channel: Channel, company_id: &str) -> Result<(), AppError> {
        self.call("integrations.delete")?;
        self.integrations.lock().remove(&(channel, company_id.to_string()));
        Ok(())
    }
}

#[async_trait]
impl OAuthExchange for FakeBackend {
    async fn exchange(&self, channel: Channel, code: &str) -> Result<Value, AppError> {
        self.call("oauth.exchange")?;
        let active = self.active_exchanges.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_concurrent_exchanges.fetch_max(active, Ordering::SeqCst);

        let delay = *self.exchange_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.active_exchanges.fetch_sub(1, Ordering::SeqCst);

        if code == "bad" {
            return Err(AppError::Remote("Invalid verification code format.".into()));
        }
        Ok(match channel {
            Channel::WhatsApp => json!({
                "phone_number_id": format!("pn-{}", code),
                "business_account_id": "waba-1",
                "display_phone_number": "+1 555 0100",
                "access_token": format!("wa-token-{}", code),
            }),
            Channel::Instagram => json!({
                "instagram_account_id": format!("ig-{}", code),
                "page_id": "page-1",
                "username": "shop",
                "access_token": format!("ig-token-{}", code),
            }),
            Channel::Facebook => json!({
                "page_id": format!("page-{}", code),
                "page_name": "Shop",
                "access_token": format!("fb-token-{}", code),
            }),
        })
    }
}

#[async_trait]
impl ConversationRepository for FakeBackend {
    async fn list(&self, company_id: &str) -> Result<Vec<Conversation>, AppError> {
        self.call("conversations.list")?;
        Ok(self
            .conversations
            .lock()
            .iter()
            .filter(|c| c.company_id == company_id)
            .cloned()
            .collect())
    }

    async fn update(&self, company_id: &str, id: &str, patch: &ConversationPatch) -> Result<(), AppError> {
        self.call("conversations.update")?;
        let mut conversations = self.conversations.lock();
        let conversation = conversations
            .iter_mut()
            .find(|c| c.id == id && c.company_id == company_id)
            .ok_or_else(|| AppError::NotFound("Conversation not found".into()))?;
        if let Some(name) = &patch.contact_name {
            conversation.contact_name = Some(name.clone());
        }
        if let Some(notes) = &patch.notes {
            conversation.notes = Some(notes.clone());
        }
        if let Some(pinned) = patch.is_pinned {
            conversation.is_pinned = pinned;
        }
        if let Some(auto) = patch.auto_respond {
            conversation.auto_respond = auto;
        }
        if let Some(tags) = &patch.contact_tags {
            conversation.contact_tags = tags.clone();
        }
        Ok(())
    }

    async fn insert_message(&self, message: &Message) -> Result<Message, AppError> {
        self.call("messages.insert")?;
        let mut conversations = self.conversations.lock();
        let conversation = conversations
            .iter_mut()
            .find(|c| c.id == message.conversation_id)
            .ok_or_else(|| AppError::NotFound("Conversation not found".into()))?;
        conversation.messages.push(message.clone());
        conversation.last_message_at = Some(message.created_at);
        Ok(message.clone())
    }
}

#[async_trait]
impl TagRepository for FakeBackend {
    async fn list(&self, company_id: &str) -> Result<Vec<Tag>, AppError> {
        self.call("tags.list")?;
        let mut tags: Vec<Tag> = self
            .tags
            .lock()
            .iter()
            .filter(|t| t.is_global || t.company_id == company_id)
            .cloned()
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn create(&self, tag: &Tag) -> Result<Tag, AppError> {
        self.call("tags.create")?;
        self.tags.lock().push(tag.clone());
        Ok(tag.clone())
    }

    async fn update(&self, tag: &Tag) -> Result<Tag, AppError> {
        self.call("tags.update")?;
        let mut tags = self.tags.lock();
        let existing = tags
            .iter_mut()
            .find(|t| t.id == tag.id)
            .ok_or_else(|| AppError::NotFound("Tag not found".into()))?;
        *existing = tag.clone();
        Ok(tag.clone())
    }

    async fn delete(&self, company_id: &str, id: &str) -> Result<(), AppError> {
        self.call("tags.delete")?;
        self.tags.lock().retain(|t| !(t.id == id && t.company_id == company_id));
        Ok(())
    }
}

#[async_trait]
impl FileRepository for FakeBackend {
    async fn list(&self, company_id: &str) -> Result<Vec<KnowledgeFile>, AppError> {
        self.call("files.list")?;
        Ok(self.files.lock().iter().filter(|f| f.company_id == company_id).cloned().collect())
    }

    async fn find_by_id(&self, company_id: &str, id: &str) -> Result<Option<KnowledgeFile>, AppError> {
        self.call("files.find")?;
        Ok(self
            .files
            .lock()
            .iter()
            .find(|f| f.id == id && f.company_id == company_id)
            .cloned())
    }

    async fn insert(&self, file: &KnowledgeFile) -> Result<KnowledgeFile, AppError> {
        self.call("files.insert")?;
        self.files.lock().push(file.clone());
        Ok(file.clone())
    }

    async fn delete(&self, company_id: &str, id: &str) -> Result<(), AppError> {
        self.call("files.delete")?;
        self.files.lock().retain(|f| !(f.id == id && f.company_id == company_id));
        Ok(())
    }
}

#[async_trait]
impl FileProcessor for FakeBackend {
    async fn upload(&self, _company_id: &str, upload: &FileUpload) -> Result<ProcessedFile, AppError> {
        self.call("rag.upload")?;
        let delay = *self.upload_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let remote_id = format!("rag-{}", upload.file_name);
        self.remote_files.lock().push(remote_id.clone());
        Ok(ProcessedFile { remote_id, chunks: Some(1) })
    }

    async fn delete(&self, _company_id: &str, remote_id: &str) -> Result<(), AppError> {
        self.call("rag.delete")?;
        self.remote_files.lock().retain(|r| r != remote_id);
        Ok(())
    }
}

pub struct FakeSender {
    channel: Channel,
    backend: Arc<FakeBackend>,
}

#[async_trait]
impl MessageSender for FakeSender {
    async fn send(&self, _company_id: &str, conversation: &Conversation, content: &str) -> Result<(), AppError> {
        self.backend.call(&format!("send.{}", self.channel))?;
        self.backend
            .sent
            .lock()
            .push((self.channel, conversation.id.clone(), content.to_string()));
        Ok(())
    }
}

pub fn backend_ports(fake: &Arc<FakeBackend>) -> Backend {
    let sender = |channel: Channel| -> Arc<dyn MessageSender> {
        Arc::new(FakeSender { channel, backend: fake.clone() })
    };
    Backend {
        auth: fake.clone(),
        companies: fake.clone(),
        team: fake.clone(),
        subscriptions: fake.clone(),
        usage: fake.clone(),
        integrations: fake.clone(),
        oauth: fake.clone(),
        conversations: fake.clone(),
        senders: ChannelSenders {
            whatsapp: sender(Channel::WhatsApp),
            instagram: sender(Channel::Instagram),
            facebook: sender(Channel::Facebook),
        },
        tags: fake.clone(),
        files: fake.clone(),
        file_processor: fake.clone(),
    }
}

pub fn test_config() -> Config {
    Config {
        backend_url: "http://backend.test".to_string(),
        backend_api_key: "anon-key".to_string(),
        backend_jwt_secret: JWT_SECRET.to_string(),
        port: 0,
        oauth_redirect_delay: Duration::from_millis(3000),
        backend_timeout: None,
        cookie_secure: false,
        log_dir: "./logs".to_string(),
    }
}

/// A seeded company with its owner.
pub struct Seeded {
    pub owner: Principal,
    pub company: Company,
    pub token: String,
}

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub backend: Arc<FakeBackend>,
}

impl TestApp {
    pub async fn new() -> Self {
        let backend = Arc::new(FakeBackend::default());
        let state = Arc::new(build_state(&test_config(), backend_ports(&backend)).unwrap());
        let router = create_router(state.clone());
        Self { router, state, backend }
    }

    /// Company on `tier` with an owner account, rows as signup would create them.
    pub fn seed_company(&self, tier: Tier) -> Seeded {
        let email = format!("owner-{}@example.com", Uuid::new_v4());
        let owner = self.backend.add_account(&email, "password123", "Owner");
        let company = Company::new("Acme".to_string());
        self.backend.companies.lock().insert(company.id.clone(), company.clone());
        self.backend.members.lock().push(Membership::new(
            owner.id.clone(),
            company.id.clone(),
            MemberRole::Owner,
        ));

        let mut subscription = Subscription::free(company.id.clone());
        subscription.tier = tier.as_str().to_string();
        self.backend.subscriptions.lock().insert(company.id.clone(), subscription);
        self.backend
            .usage
            .lock()
            .insert(company.id.clone(), Usage::fresh(company.id.clone(), tier.limits()));

        let token = self.backend.token_for(&owner);
        Seeded { owner, company, token }
    }

    pub fn add_member(&self, company_id: &str, role: MemberRole) -> (Principal, String) {
        let email = format!("member-{}@example.com", Uuid::new_v4());
        let principal = self.backend.add_account(&email, "password123", "Member");
        self.backend.members.lock().push(Membership::new(
            principal.id.clone(),
            company_id.to_string(),
            role,
        ));
        let token = self.backend.token_for(&principal);
        (principal, token)
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn request(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("access_token={}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = self.send(builder.body(body).unwrap()).await;
        let status = response.status();
        (status, body_json(response).await)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request("GET", uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request("POST", uri, Some(token), Some(body)).await
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8_lossy(&bytes).to_string()
}

/// `name=value` pairs of every `Set-Cookie` header, joined for a `Cookie` header.
pub fn returned_cookies(response: &Response<Body>) -> String {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .map(str::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
