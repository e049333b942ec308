//! In-memory journal store
//!
//! Keeps every document in process memory behind a single async lock.
//! Mirrors the PostgreSQL store's semantics (unique emails, per-user thought
//! scoping, idempotent revocation) so handler tests exercise real behavior.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use thoughtlog_core::{
    JournalStore, NewReason, NewThought, NewUser, Reason, StoreError, StoreResult, Thought,
    ThoughtUpdate, User,
};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Collections {
    users: HashMap<Uuid, User>,
    /// Insertion order doubles as creation order
    thoughts: Vec<Thought>,
    revoked_tokens: HashSet<String>,
}

impl Collections {
    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }

    fn thought_mut(&mut self, user_id: Uuid, thought_id: Uuid) -> Option<&mut Thought> {
        self.thoughts
            .iter_mut()
            .find(|t| t.id == thought_id && t.user == user_id)
    }
}

/// In-memory store implementation
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JournalStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut db = self.inner.write().await;
        if db.email_taken(&user.email, None) {
            return Err(StoreError::DuplicateEmail(user.email));
        }

        let record = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            admin: false,
            date_created: Utc::now(),
        };
        db.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let db = self.inner.read().await;
        Ok(db.users.values().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let db = self.inner.read().await;
        let mut users: Vec<User> = db.users.values().cloned().collect();
        users.sort_by(|a, b| a.date_created.cmp(&b.date_created).then(a.id.cmp(&b.id)));
        Ok(users)
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.inner.write().await.users.remove(&id))
    }

    async fn update_user_name(&self, id: Uuid, name: &str) -> StoreResult<Option<User>> {
        let mut db = self.inner.write().await;
        Ok(db.users.get_mut(&id).map(|u| {
            u.name = name.to_string();
            u.clone()
        }))
    }

    async fn update_user_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> StoreResult<Option<User>> {
        let mut db = self.inner.write().await;
        Ok(db.users.get_mut(&id).map(|u| {
            u.password_hash = password_hash.to_string();
            u.clone()
        }))
    }

    async fn update_user_email(&self, id: Uuid, email: &str) -> StoreResult<Option<User>> {
        let mut db = self.inner.write().await;
        if !db.users.contains_key(&id) {
            return Ok(None);
        }
        if db.email_taken(email, Some(id)) {
            return Err(StoreError::DuplicateEmail(email.to_string()));
        }
        Ok(db.users.get_mut(&id).map(|u| {
            u.email = email.to_string();
            u.clone()
        }))
    }

    async fn set_user_admin(&self, id: Uuid, admin: bool) -> StoreResult<Option<User>> {
        let mut db = self.inner.write().await;
        Ok(db.users.get_mut(&id).map(|u| {
            u.admin = admin;
            u.clone()
        }))
    }

    async fn create_thought(&self, thought: NewThought) -> StoreResult<Thought> {
        let record = Thought::new(thought);
        self.inner.write().await.thoughts.push(record.clone());
        Ok(record)
    }

    async fn list_thoughts(&self, user_id: Uuid) -> StoreResult<Vec<Thought>> {
        let db = self.inner.read().await;
        Ok(db
            .thoughts
            .iter()
            .filter(|t| t.user == user_id)
            .cloned()
            .collect())
    }

    async fn find_thought(&self, user_id: Uuid, thought_id: Uuid) -> StoreResult<Option<Thought>> {
        let db = self.inner.read().await;
        Ok(db
            .thoughts
            .iter()
            .find(|t| t.id == thought_id && t.user == user_id)
            .cloned())
    }

    async fn update_thought(
        &self,
        user_id: Uuid,
        thought_id: Uuid,
        update: ThoughtUpdate,
    ) -> StoreResult<Option<Thought>> {
        let mut db = self.inner.write().await;
        Ok(db.thought_mut(user_id, thought_id).map(|t| {
            t.apply(update);
            t.clone()
        }))
    }

    async fn delete_thought(
        &self,
        user_id: Uuid,
        thought_id: Uuid,
    ) -> StoreResult<Option<Thought>> {
        let mut db = self.inner.write().await;
        let position = db
            .thoughts
            .iter()
            .position(|t| t.id == thought_id && t.user == user_id);
        Ok(position.map(|i| db.thoughts.remove(i)))
    }

    async fn delete_thoughts_for_user(&self, user_id: Uuid) -> StoreResult<u64> {
        let mut db = self.inner.write().await;
        let before = db.thoughts.len();
        db.thoughts.retain(|t| t.user != user_id);
        Ok((before - db.thoughts.len()) as u64)
    }

    async fn add_reason(
        &self,
        user_id: Uuid,
        thought_id: Uuid,
        reason: NewReason,
    ) -> StoreResult<Option<Reason>> {
        let mut db = self.inner.write().await;
        Ok(db.thought_mut(user_id, thought_id).map(|t| {
            let reason = Reason::new(reason);
            t.reasons.push(reason.clone());
            reason
        }))
    }

    async fn remove_reason(
        &self,
        user_id: Uuid,
        thought_id: Uuid,
        reason_id: Uuid,
    ) -> StoreResult<bool> {
        let mut db = self.inner.write().await;
        Ok(db
            .thought_mut(user_id, thought_id)
            .map(|t| t.reasons.retain(|r| r.id != reason_id))
            .is_some())
    }

    async fn clear_reasons(&self, user_id: Uuid, thought_id: Uuid) -> StoreResult<bool> {
        let mut db = self.inner.write().await;
        Ok(db
            .thought_mut(user_id, thought_id)
            .map(|t| t.reasons.clear())
            .is_some())
    }

    async fn revoke_token(&self, token: &str) -> StoreResult<()> {
        self.inner
            .write()
            .await
            .revoked_tokens
            .insert(token.to_string());
        Ok(())
    }

    async fn is_token_revoked(&self, token: &str) -> StoreResult<bool> {
        Ok(self.inner.read().await.revoked_tokens.contains(token))
    }

    async fn count_revoked_tokens(&self) -> StoreResult<u64> {
        Ok(self.inner.read().await.revoked_tokens.len() as u64)
    }
}
