//! Password hashing, signed access tokens and the request extractors that
//! turn a `Authorization: Bearer` header into a user.
//!
//! Tokens are compact HS256 JWTs carrying `sub` (user id), `admin` and
//! `exp` (Unix seconds). The literal token `demo-token` is accepted as a
//! non-admin demo user so the dashboard works without registration.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::api::AppState;
use crate::db::{Database, DbError, User};
use crate::error::ApiError;

pub const DEMO_TOKEN: &str = "demo-token";

const SALT_BYTES: usize = 16;
const HASH_ITERATIONS: u32 = 100_000;
const TOKEN_HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Not authenticated")]
    MissingToken,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("User not found or inactive")]
    UnknownUser,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Account deactivated")]
    Deactivated,
    #[error("Admin privileges required")]
    Forbidden,
    #[error("Token encoding failed: {0}")]
    Encode(String),
    #[error(transparent)]
    Database(#[from] DbError),
}

/// Random hex salt.
pub fn generate_salt() -> String {
    let mut bytes = [0u8; SALT_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Iterated, salted SHA-256, hex encoded.
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hash = Sha256::new();
    hash.update(salt.as_bytes());
    hash.update(password.as_bytes());
    let mut result = hash.finalize();

    for _ in 1..HASH_ITERATIONS {
        let mut h = Sha256::new();
        h.update(result);
        h.update(salt.as_bytes());
        result = h.finalize();
    }

    hex::encode(result)
}

pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    constant_time_eq(
        hash_password(password, salt).as_bytes(),
        expected_hash.as_bytes(),
    )
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub admin: bool,
    pub exp: i64,
}

/// Issues and verifies access tokens with a shared secret.
pub struct TokenSigner {
    secret: Vec<u8>,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: &str, expire_minutes: i64) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
            ttl: Duration::minutes(expire_minutes.max(1)),
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        self.issue_at(user, Utc::now())
    }

    fn issue_at(&self, user: &User, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = Claims {
            sub: user.id.clone(),
            admin: user.is_admin,
            exp: (now + self.ttl).timestamp(),
        };
        let payload = serde_json::to_vec(&claims).map_err(|e| AuthError::Encode(e.to_string()))?;

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(TOKEN_HEADER),
            URL_SAFE_NO_PAD.encode(payload)
        );
        let signature = self.mac(&signing_input)?.finalize().into_bytes();
        Ok(format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature)))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, Utc::now())
    }

    fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let (signing_input, signature) = token.rsplit_once('.').ok_or(AuthError::InvalidToken)?;
        let (header, payload) = signing_input
            .split_once('.')
            .ok_or(AuthError::InvalidToken)?;

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AuthError::InvalidToken)?;
        self.mac(signing_input)?
            .verify_slice(&signature)
            .map_err(|_| AuthError::InvalidToken)?;

        let header = URL_SAFE_NO_PAD
            .decode(header)
            .map_err(|_| AuthError::InvalidToken)?;
        let header: serde_json::Value =
            serde_json::from_slice(&header).map_err(|_| AuthError::InvalidToken)?;
        if header["alg"] != "HS256" {
            return Err(AuthError::InvalidToken);
        }

        let payload = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| AuthError::InvalidToken)?;
        let claims: Claims =
            serde_json::from_slice(&payload).map_err(|_| AuthError::InvalidToken)?;
        if claims.exp <= now.timestamp() {
            return Err(AuthError::InvalidToken);
        }
        Ok(claims)
    }

    fn mac(&self, signing_input: &str) -> Result<HmacSha256, AuthError> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| AuthError::Encode(e.to_string()))?;
        mac.update(signing_input.as_bytes());
        Ok(mac)
    }
}

fn demo_user() -> User {
    User {
        id: "demo-user".to_string(),
        username: "demo".to_string(),
        email: "demo@voicebot.local".to_string(),
        is_admin: false,
        is_active: true,
        created_at: Utc::now(),
    }
}

/// Resolve a bearer token to an active user.
pub fn authenticate(db: &Database, signer: &TokenSigner, token: &str) -> Result<User, AuthError> {
    if token == DEMO_TOKEN {
        return Ok(demo_user());
    }

    let claims = signer.verify(token)?;
    match db.get_user(&claims.sub)? {
        Some(user) if user.is_active => Ok(user),
        _ => Err(AuthError::UnknownUser),
    }
}

/// Check a username and password. Inactive accounts are rejected after the
/// password matches.
pub fn login(db: &Database, username: &str, password: &str) -> Result<User, AuthError> {
    let Some(creds) = db.credentials_by_username(username)? else {
        // Hash anyway so unknown usernames take as long as wrong passwords.
        let _ = hash_password(password, "0000000000000000");
        return Err(AuthError::InvalidCredentials);
    };

    if !verify_password(password, &creds.salt, &creds.password_hash) {
        return Err(AuthError::InvalidCredentials);
    }
    if !creds.user.is_active {
        return Err(AuthError::Deactivated);
    }
    Ok(creds.user)
}

pub fn register(db: &Database, username: &str, email: &str, password: &str) -> Result<User, AuthError> {
    let salt = generate_salt();
    let hash = hash_password(password, &salt);
    Ok(db.create_user(username, email, &hash, &salt)?)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Any authenticated, active user.
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AuthError::MissingToken)?;
        let user = authenticate(&state.db, &state.tokens, token)?;
        Ok(Self(user))
    }
}

/// An authenticated user with admin rights.
pub struct AdminUser(pub User);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin {
            tracing::warn!(user_id = %user.id, "Admin route refused");
            return Err(AuthError::Forbidden.into());
        }
        Ok(Self(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new("test-secret", 60)
    }

    #[test]
    fn password_hash_round_trip() {
        let salt = generate_salt();
        assert_eq!(salt.len(), SALT_BYTES * 2);
        let hash = hash_password("hunter22", &salt);
        assert!(verify_password("hunter22", &salt, &hash));
        assert!(!verify_password("hunter23", &salt, &hash));
        assert_ne!(hash, hash_password("hunter22", &generate_salt()));
    }

    #[test]
    fn constant_time_eq_works() {
        assert!(constant_time_eq(b"hello", b"hello"));
        assert!(!constant_time_eq(b"hello", b"world"));
        assert!(!constant_time_eq(b"short", b"longer"));
    }

    #[test]
    fn token_carries_claims() {
        let user = demo_user();
        let token = signer().issue(&user).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let claims = signer().verify(&token).unwrap();
        assert_eq!(claims.sub, "demo-user");
        assert!(!claims.admin);
    }

    #[test]
    fn tampered_or_foreign_tokens_are_rejected() {
        let token = signer().issue(&demo_user()).unwrap();
        let other = TokenSigner::new("another-secret", 60);
        assert!(matches!(other.verify(&token), Err(AuthError::InvalidToken)));

        let mut forged = token.clone();
        forged.insert(forged.find('.').unwrap() + 2, 'x');
        assert!(matches!(signer().verify(&forged), Err(AuthError::InvalidToken)));
        assert!(matches!(signer().verify("garbage"), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let issued = Utc::now() - Duration::hours(2);
        let token = signer().issue_at(&demo_user(), issued).unwrap();
        assert!(matches!(signer().verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn login_checks_password_and_activity() {
        let db = Database::in_memory().unwrap();
        let user = register(&db, "alice", "a@example.com", "secret1").unwrap();

        assert_eq!(login(&db, "alice", "secret1").unwrap().id, user.id);
        assert!(matches!(
            login(&db, "alice", "wrong"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            login(&db, "nobody", "secret1"),
            Err(AuthError::InvalidCredentials)
        ));

        db.set_user_active(&user.id, false).unwrap();
        assert!(matches!(login(&db, "alice", "secret1"), Err(AuthError::Deactivated)));
    }

    #[test]
    fn authenticate_resolves_users() {
        let db = Database::in_memory().unwrap();
        let signer = signer();
        let user = register(&db, "alice", "a@example.com", "secret1").unwrap();
        let token = signer.issue(&user).unwrap();

        assert_eq!(authenticate(&db, &signer, &token).unwrap(), user);
        assert_eq!(authenticate(&db, &signer, DEMO_TOKEN).unwrap().username, "demo");

        db.set_user_active(&user.id, false).unwrap();
        assert!(matches!(
            authenticate(&db, &signer, &token),
            Err(AuthError::UnknownUser)
        ));
    }

    #[test]
    fn bearer_header_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);
        headers.insert("authorization", "Bearer abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc"));
        headers.insert("authorization", "Basic abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);
    }
}
