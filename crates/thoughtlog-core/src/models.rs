//! Journal data models
//!
//! This module defines the documents Thoughtlog persists:
//! - User: account, credentials and admin flag
//! - Thought: a journal entry owned by exactly one user
//! - Reason: a supporting reason embedded in a thought
//!
//! Serialized field names follow the public JSON API (`_id`, `dateCreated`,
//! `isPositive`), so the same types are returned by the HTTP handlers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// User account model
///
/// The password hash is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user identifier
    #[serde(rename = "_id")]
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address (unique, used for login)
    pub email: String,

    /// Hashed password (PHC string)
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Whether the user may call admin-only routes
    #[serde(default)]
    pub admin: bool,

    /// Account creation timestamp
    pub date_created: DateTime<Utc>,
}

impl User {
    /// Projection used by admin listings
    pub fn to_summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            admin: self.admin,
        }
    }

    /// Projection used for the caller's own profile
    pub fn to_profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            date_created: self.date_created,
        }
    }

    /// Projection visible to other authenticated users
    pub fn to_public(&self) -> PublicProfile {
        PublicProfile {
            id: self.id,
            name: self.name.clone(),
            date_created: self.date_created,
        }
    }
}

/// Fields required to create a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// `_id name email admin`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub admin: bool,
}

/// `_id name email dateCreated`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub date_created: DateTime<Utc>,
}

/// `_id name dateCreated`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub date_created: DateTime<Utc>,
}

/// A reason supporting or undermining a thought
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reason {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub description: String,
    #[serde(default)]
    pub is_positive: bool,
}

impl Reason {
    pub fn new(reason: NewReason) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: reason.description,
            is_positive: reason.is_positive,
        }
    }
}

/// Fields required to append a reason
#[derive(Debug, Clone)]
pub struct NewReason {
    pub description: String,
    pub is_positive: bool,
}

/// Journal entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Thought {
    #[serde(rename = "_id")]
    pub id: Uuid,

    /// Short description of the feeling
    pub feeling: String,

    /// What caused it
    pub cause: String,

    /// Whether the feeling was justified
    #[serde(default)]
    pub justified: bool,

    /// Embedded reasons, in insertion order
    #[serde(default)]
    pub reasons: Vec<Reason>,

    /// Owning user id
    pub user: Uuid,

    pub date_created: DateTime<Utc>,
}

impl Thought {
    pub fn new(thought: NewThought) -> Self {
        Self {
            id: Uuid::new_v4(),
            feeling: thought.feeling,
            cause: thought.cause,
            justified: thought.justified,
            reasons: Vec::new(),
            user: thought.user_id,
            date_created: Utc::now(),
        }
    }

    /// Apply an update in place; `justified` is left alone when absent
    pub fn apply(&mut self, update: ThoughtUpdate) {
        self.feeling = update.feeling;
        self.cause = update.cause;
        if let Some(justified) = update.justified {
            self.justified = justified;
        }
    }
}

/// Fields required to create a thought
#[derive(Debug, Clone)]
pub struct NewThought {
    pub user_id: Uuid,
    pub feeling: String,
    pub cause: String,
    pub justified: bool,
}

/// Replacement values for an existing thought
#[derive(Debug, Clone)]
pub struct ThoughtUpdate {
    pub feeling: String,
    pub cause: String,
    pub justified: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            password_hash: "secret_hash".to_string(),
            admin: false,
            date_created: Utc::now(),
        }
    }

    #[test]
    fn test_user_never_serializes_password_hash() {
        let json = serde_json::to_string(&sample_user()).unwrap();
        assert!(!json.contains("secret_hash"));
        assert!(!json.contains("password"));
        assert!(json.contains("\"_id\""));
        assert!(json.contains("\"dateCreated\""));
    }

    #[test]
    fn test_user_projections() {
        let user = sample_user();

        let summary = serde_json::to_value(user.to_summary()).unwrap();
        assert_eq!(summary["email"], "test@example.com");
        assert_eq!(summary["admin"], false);
        assert!(summary.get("dateCreated").is_none());

        let public = serde_json::to_value(user.to_public()).unwrap();
        assert_eq!(public["name"], "Test User");
        assert!(public.get("email").is_none());

        let profile = serde_json::to_value(user.to_profile()).unwrap();
        assert_eq!(profile["_id"], user.id.to_string());
        assert!(profile.get("dateCreated").is_some());
    }

    #[test]
    fn test_thought_apply_keeps_justified_when_absent() {
        let mut thought = Thought::new(NewThought {
            user_id: Uuid::new_v4(),
            feeling: "angry".to_string(),
            cause: "missed the bus".to_string(),
            justified: true,
        });

        thought.apply(ThoughtUpdate {
            feeling: "calm".to_string(),
            cause: "caught the next one".to_string(),
            justified: None,
        });

        assert_eq!(thought.feeling, "calm");
        assert!(thought.justified);

        thought.apply(ThoughtUpdate {
            feeling: "calm".to_string(),
            cause: "caught the next one".to_string(),
            justified: Some(false),
        });
        assert!(!thought.justified);
    }

    #[test]
    fn test_reason_json_shape() {
        let reason = Reason::new(NewReason {
            description: "it was raining".to_string(),
            is_positive: true,
        });

        let json = serde_json::to_value(&reason).unwrap();
        assert_eq!(json["isPositive"], true);
        assert_eq!(json["description"], "it was raining");

        let back: Reason = serde_json::from_value(json).unwrap();
        assert_eq!(back, reason);
    }
}
