use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Stored account row. Never serialized directly: it carries the password hash.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_verified: bool,
    pub show_liked_blogs: bool,
    pub show_saved_blogs: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Account fields safe to expose to any client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicAccount {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for PublicAccount {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            name: account.name.clone(),
            username: account.username.clone(),
            email: account.email.clone(),
            is_verified: account.is_verified,
            created_at: account.created_at,
        }
    }
}

/// Follow edges and post memberships of one account, derived by query
#[derive(Debug, Clone, Default)]
pub struct AccountRelations {
    pub followers: Vec<Uuid>,
    pub following: Vec<Uuid>,
    pub blogs: Vec<Uuid>,
    pub liked_blogs: Vec<Uuid>,
    pub saved_blogs: Vec<Uuid>,
}

/// Public profile with relations. Liked/saved lists are omitted when hidden.
#[derive(Debug, Clone, Serialize)]
pub struct AccountProfile {
    #[serde(flatten)]
    pub account: PublicAccount,
    pub show_liked_blogs: bool,
    pub show_saved_blogs: bool,
    pub followers: Vec<Uuid>,
    pub following: Vec<Uuid>,
    pub blogs: Vec<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liked_blogs: Option<Vec<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_blogs: Option<Vec<Uuid>>,
}

impl AccountProfile {
    /// Build a profile; `is_self` reveals lists the owner chose to hide
    pub fn new(account: &Account, relations: AccountRelations, is_self: bool) -> Self {
        let show_liked = is_self || account.show_liked_blogs;
        let show_saved = is_self || account.show_saved_blogs;

        Self {
            account: PublicAccount::from(account),
            show_liked_blogs: account.show_liked_blogs,
            show_saved_blogs: account.show_saved_blogs,
            followers: relations.followers,
            following: relations.following,
            blogs: relations.blogs,
            liked_blogs: show_liked.then_some(relations.liked_blogs),
            saved_blogs: show_saved.then_some(relations.saved_blogs),
        }
    }
}

/// Data required to insert a new account
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 3, max = 30, message = "Username must be 3-30 characters"))]
    pub username: String,
    #[validate(
        email(message = "A valid email is required"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    pub email: String,
    #[validate(length(min = 6, max = 128, message = "Password must be at least 6 characters"))]
    pub password: String,
}

impl SignupRequest {
    /// Trim whitespace and lower-case the email before validation
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            username: self.username.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            password: self.password,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub show_liked_blogs: Option<bool>,
    pub show_saved_blogs: Option<bool>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.show_liked_blogs.is_none() && self.show_saved_blogs.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(show_liked: bool) -> Account {
        Account {
            id: Uuid::new_v4(),
            name: "Alice".into(),
            username: "alice".into(),
            email: "alice@x.com".into(),
            password_hash: "$argon2id$...".into(),
            is_verified: true,
            show_liked_blogs: show_liked,
            show_saved_blogs: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_profile_hides_liked_for_others() {
        let relations = AccountRelations {
            liked_blogs: vec![Uuid::new_v4()],
            ..Default::default()
        };
        let profile = AccountProfile::new(&account(false), relations.clone(), false);
        assert!(profile.liked_blogs.is_none());
        assert!(profile.saved_blogs.is_some());

        let own = AccountProfile::new(&account(false), relations, true);
        assert_eq!(own.liked_blogs.map(|v| v.len()), Some(1));
    }

    #[test]
    fn test_profile_never_serializes_hash() {
        let profile = AccountProfile::new(&account(true), AccountRelations::default(), true);
        let json = serde_json::to_string(&profile).unwrap();
        assert!(!json.contains("password"));
        assert!(json.contains("\"username\":\"alice\""));
    }

    #[test]
    fn test_signup_normalization() {
        let req = SignupRequest {
            name: "  Alice ".into(),
            username: " alice ".into(),
            email: " Alice@X.com ".into(),
            password: "secret123".into(),
        }
        .normalized();

        assert_eq!(req.name, "Alice");
        assert_eq!(req.username, "alice");
        assert_eq!(req.email, "alice@x.com");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_signup_blank_name_invalid() {
        let req = SignupRequest {
            name: "   ".into(),
            username: "alice".into(),
            email: "alice@x.com".into(),
            password: "secret123".into(),
        }
        .normalized();

        assert!(req.validate().is_err());
    }
}
