//! Authentication and authorization utilities
//!
//! Provides:
//! - JWT token generation and validation
//! - Caller identity extraction (`AuthContext`, `Admin`)
//! - The two-tier access policy shared by every resource

use crate::errors::{AppError, Result};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Kind of operation being attempted on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// list / retrieve
    Read,
    /// create / update / delete
    Write,
}

/// Extracted authentication context available to handlers
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Authenticated user
    pub user_id: i32,

    /// Staff users may mutate reference data and see every order
    pub is_staff: bool,
}

/// Ownership restriction applied to order queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderScope {
    /// Only orders of this user are visible
    pub owner: Option<i32>,

    /// Additional owning-user filter requested by the caller
    pub user: Option<i32>,
}

impl AuthContext {
    /// Reference data and flights: any authenticated caller reads, staff writes
    pub fn authorize(&self, operation: Operation) -> Result<()> {
        match operation {
            Operation::Read => Ok(()),
            Operation::Write if self.is_staff => Ok(()),
            Operation::Write => Err(AppError::Forbidden {
                message: "You do not have permission to perform this action.".to_string(),
            }),
        }
    }

    /// Orders: non-staff callers are pinned to their own orders
    pub fn order_scope(&self, requested_user: Option<i32>) -> OrderScope {
        OrderScope {
            owner: (!self.is_staff).then_some(self.user_id),
            user: requested_user,
        }
    }
}

/// Authenticated caller holding the staff role
#[derive(Debug, Clone)]
pub struct Admin(pub AuthContext);

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user ID)
    pub sub: String,

    /// Staff flag
    #[serde(default)]
    pub is_staff: bool,

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

    /// Generate a new JWT token
    pub fn generate_token(&self, user_id: i32, is_staff: bool) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.expiration_secs);

        let claims = JwtClaims {
            sub: user_id.to_string(),
            is_staff,
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

    /// Resolve a bearer token into a caller identity
    pub fn authenticate(&self, token: &str) -> Result<AuthContext> {
        let claims = self.validate_token(token)?;
        let user_id = claims.sub.parse().map_err(|_| AppError::InvalidToken)?;

        Ok(AuthContext {
            user_id,
            is_staff: claims.is_staff,
        })
    }
}

/// Extract bearer token from Authorization header
pub fn extract_bearer(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Axum extractor for AuthContext
impl<S> FromRequestParts<S> for AuthContext
where
    Arc<JwtManager>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized {
                message: "Authentication credentials were not provided.".to_string(),
            })?;

        let token = extract_bearer(auth_header).ok_or_else(|| AppError::Unauthorized {
            message: "Expected a Bearer token".to_string(),
        })?;

        let jwt = Arc::<JwtManager>::from_ref(state);
        jwt.authenticate(token)
    }
}

/// Axum extractor for Admin
impl<S> FromRequestParts<S> for Admin
where
    Arc<JwtManager>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let auth = AuthContext::from_request_parts(parts, state).await?;
        auth.authorize(Operation::Write)?;
        Ok(Admin(auth))
    }
}
