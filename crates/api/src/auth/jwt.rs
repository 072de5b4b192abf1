//! JWT credential issue and validation.
//!
//! Access and refresh tokens are both HS256-signed JWTs carrying a [`Claims`]
//! payload. Every issuance mints a fresh session id (`sid`, UUID v4), so an
//! access token and the refresh token issued alongside it are revocable
//! independently of each other: revocation stores session ids, never tokens.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use assetdesk_core::principal::Principal;
use assetdesk_core::roles::Role;
use assetdesk_core::types::DbId;

/// Token-type claim value for access tokens.
pub const TOKEN_TYPE_ACCESS: &str = "access";
/// Token-type claim value for refresh tokens.
pub const TOKEN_TYPE_REFRESH: &str = "refresh";

/// JWT claims embedded in every credential.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's internal database id.
    pub sub: DbId,
    /// The user's role name (`"admin"` or `"staff"`).
    pub role: String,
    /// The location the user belongs to.
    pub location_id: DbId,
    /// Session id (UUID v4), fresh per issuance. The revocation key.
    pub sid: String,
    /// Token type: `"access"` or `"refresh"`.
    pub typ: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
}

/// Why a credential was rejected.
///
/// Internal taxonomy only: the authorization gate collapses every variant
/// into a generic `Unauthorized` so responses never reveal which check
/// failed.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    /// Bad structure, missing or unknown claims, or the wrong token type.
    #[error("malformed credential")]
    Malformed,
    /// The credential's `exp` is in the past.
    #[error("expired credential")]
    Expired,
    /// Signature did not verify against the configured secret.
    #[error("invalid credential signature")]
    InvalidSignature,
}

/// Configuration for credential issue and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Access token lifetime in minutes (default: 15).
    pub access_token_expiry_mins: i64,
    /// Refresh token lifetime in days (default: 7).
    pub refresh_token_expiry_days: i64,
}

/// Default access token expiry in minutes.
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 15;
/// Default refresh token expiry in days.
const DEFAULT_REFRESH_EXPIRY_DAYS: i64 = 7;

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var                    | Required | Default |
    /// |----------------------------|----------|---------|
    /// | `JWT_SECRET`               | **yes**  | --      |
    /// | `JWT_ACCESS_EXPIRY_MINS`   | no       | `15`    |
    /// | `JWT_REFRESH_EXPIRY_DAYS`  | no       | `7`     |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let access_token_expiry_mins: i64 = std::env::var("JWT_ACCESS_EXPIRY_MINS")
            .unwrap_or_else(|_| DEFAULT_ACCESS_EXPIRY_MINS.to_string())
            .parse()
            .expect("JWT_ACCESS_EXPIRY_MINS must be a valid i64");

        let refresh_token_expiry_days: i64 = std::env::var("JWT_REFRESH_EXPIRY_DAYS")
            .unwrap_or_else(|_| DEFAULT_REFRESH_EXPIRY_DAYS.to_string())
            .parse()
            .expect("JWT_REFRESH_EXPIRY_DAYS must be a valid i64");

        Self {
            secret,
            access_token_expiry_mins,
            refresh_token_expiry_days,
        }
    }

    /// Access token lifetime in seconds (the `expires_in` reported to
    /// clients, and the upper bound on an access session's revocation TTL).
    pub fn access_token_expiry_secs(&self) -> i64 {
        self.access_token_expiry_mins * 60
    }
}

/// Issue an HS256 access token for the given user with a fresh session id.
pub fn issue_access_token(
    user_id: DbId,
    role: Role,
    location_id: DbId,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let lifetime_secs = config.access_token_expiry_mins * 60;
    issue_token(user_id, role, location_id, TOKEN_TYPE_ACCESS, lifetime_secs, config)
}

/// Issue an HS256 refresh token for the given user with a fresh session id.
pub fn issue_refresh_token(
    user_id: DbId,
    role: Role,
    location_id: DbId,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let lifetime_secs = config.refresh_token_expiry_days * 24 * 60 * 60;
    issue_token(user_id, role, location_id, TOKEN_TYPE_REFRESH, lifetime_secs, config)
}

fn issue_token(
    user_id: DbId,
    role: Role,
    location_id: DbId,
    token_type: &str,
    lifetime_secs: i64,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();

    let claims = Claims {
        sub: user_id,
        role: role.as_str().to_string(),
        location_id,
        sid: Uuid::new_v4().to_string(),
        typ: token_type.to_string(),
        exp: now + lifetime_secs,
        iat: now,
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate a credential of the expected type, returning its raw [`Claims`].
///
/// Checks the signature, expiry, and token-type claim. The refresh and logout
/// flows use this directly because they need the `exp` claim to size
/// revocation TTLs; everything else goes through [`validate_access_token`].
pub fn validate_claims(
    token: &str,
    expected_type: &str,
    config: &JwtConfig,
) -> Result<Claims, TokenError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(), // HS256, validates exp
    )
    .map_err(|err| match err.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        _ => TokenError::Malformed,
    })?;

    if token_data.claims.typ != expected_type {
        return Err(TokenError::Malformed);
    }
    Ok(token_data.claims)
}

/// Validate an access credential and reconstruct the [`Principal`] it carries.
///
/// A role outside the known set is rejected as malformed rather than being
/// treated as an unprivileged user.
pub fn validate_access_token(token: &str, config: &JwtConfig) -> Result<Principal, TokenError> {
    let claims = validate_claims(token, TOKEN_TYPE_ACCESS, config)?;
    principal_from_claims(&claims)
}

/// Build a [`Principal`] from validated claims.
fn principal_from_claims(claims: &Claims) -> Result<Principal, TokenError> {
    let role = Role::parse(&claims.role).ok_or(TokenError::Malformed)?;
    Ok(Principal {
        subject_id: claims.sub,
        role,
        session_id: claims.sid.clone(),
        location_id: claims.location_id,
    })
}
