//! Authentication and authorization utilities
//!
//! Provides:
//! - Viewer sessions carried in a bearer JWT
//! - Viewer roles per tree and the access level they map to
//! - CSRF tokens for block configuration forms

use crate::errors::{AppError, Result};
use crate::privacy::AccessLevel;
use crate::store::{SettingStore, USER_INDIVIDUAL, USER_IS_ADMIN, USER_ROLE};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Role of a user in one tree (`canedit` preference).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeRole {
    None,
    Access,
    Edit,
    Accept,
    Admin,
}

impl TreeRole {
    pub fn parse(value: &str) -> Self {
        match value {
            "access" => TreeRole::Access,
            "edit" => TreeRole::Edit,
            "accept" => TreeRole::Accept,
            "admin" => TreeRole::Admin,
            _ => TreeRole::None,
        }
    }
}

/// The person looking at a page, resolved against one tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: Option<i32>,
    pub role: TreeRole,
    pub is_admin: bool,
    /// The user's own individual in this tree (`gedcomid`).
    pub individual_xref: Option<String>,
}

impl Viewer {
    /// Anonymous visitor
    pub fn visitor() -> Self {
        Self {
            user_id: None,
            role: TreeRole::None,
            is_admin: false,
            individual_xref: None,
        }
    }

    /// Load a signed-in user's role and individual for a tree.
    pub async fn load(settings: &dyn SettingStore, user_id: Option<i32>, tree_id: i32) -> Result<Self> {
        let Some(user_id) = user_id else {
            return Ok(Self::visitor());
        };

        let is_admin = settings
            .user_preference(user_id, USER_IS_ADMIN)
            .await?
            .map(|value| value == "1")
            .unwrap_or(false);

        let role = settings
            .user_tree_preference(user_id, tree_id, USER_ROLE)
            .await?
            .map(|value| TreeRole::parse(&value))
            .unwrap_or(TreeRole::None);

        let individual_xref = settings
            .user_tree_preference(user_id, tree_id, USER_INDIVIDUAL)
            .await?;

        Ok(Self {
            user_id: Some(user_id),
            role,
            is_admin,
            individual_xref,
        })
    }

    pub fn is_signed_in(&self) -> bool {
        self.user_id.is_some()
    }

    pub fn is_member(&self) -> bool {
        self.is_admin || self.role >= TreeRole::Access
    }

    pub fn is_manager(&self) -> bool {
        self.is_admin || self.role >= TreeRole::Admin
    }

    pub fn access_level(&self) -> AccessLevel {
        if self.is_manager() {
            AccessLevel::Manager
        } else if self.is_member() {
            AccessLevel::Member
        } else {
            AccessLevel::Visitor
        }
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user ID)
    pub sub: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// JWT token manager
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration_secs: i64,
}

impl JwtManager {
    /// Create a new JWT manager with the given secret
    pub fn new(secret: &str, expiration_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiration_secs: expiration_secs as i64,
        }
    }

    /// Issue a token for a user
    pub fn generate_token(&self, user_id: i32) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.expiration_secs);

        let claims = JwtClaims {
            sub: user_id.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal {
                message: format!("Failed to generate token: {}", e)
            })
    }

    /// Validate and decode a JWT token
    pub fn validate_token(&self, token: &str) -> Result<JwtClaims> {
        decode::<JwtClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::ExpiredToken
                    }
                    _ => AppError::InvalidToken,
                }
            })
    }

    /// User ID carried by a valid token
    pub fn user_id(&self, token: &str) -> Result<i32> {
        self.validate_token(token)?
            .sub
            .parse()
            .map_err(|_| AppError::InvalidToken)
    }
}

/// Extract the token from an `Authorization: Bearer` header
pub fn extract_bearer(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ").filter(|token| !token.is_empty())
}

/// Who is asking, before any tree is known. No header means a visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Session {
    pub user_id: Option<i32>,
}

/// Axum extractor for Session
impl<S> FromRequestParts<S> for Session
where
    Arc<JwtManager>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let Some(auth_header) = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
        else {
            return Ok(Session::default());
        };

        let token = extract_bearer(auth_header).ok_or_else(|| AppError::Unauthorized {
            message: "Authorization header must be a bearer token".to_string(),
        })?;

        let jwt = Arc::<JwtManager>::from_ref(state);
        let user_id = jwt.user_id(token)?;

        Ok(Session { user_id: Some(user_id) })
    }
}

/// Issues and checks the anti-forgery token embedded in configuration forms.
pub struct CsrfGuard {
    secret: String,
}

impl CsrfGuard {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.to_string(),
        }
    }

    /// Token for a user; visitors share one.
    pub fn token(&self, user_id: Option<i32>) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_bytes());
        hasher.update(b"\x00");
        hasher.update(user_id.map(|id| id.to_string()).unwrap_or_default().as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn verify(&self, user_id: Option<i32>, token: &str) -> bool {
        !token.is_empty() && self.token(user_id) == token
    }
}

/// Generate a random secret for tokens
pub fn generate_secret() -> String {
    let random_bytes: [u8; 32] = rand::random();
    hex::encode(random_bytes)
}
