pub(crate) use crate::auth::dto::{Claims, JwtKeys, TokenKind};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo::{DuplicateEmail, UserStore};
use crate::auth::repo_types::{NewUser, User};
use crate::config::JwtConfig;
use crate::error::AppError;
use crate::state::AppState;
use anyhow::Context;
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use lazy_static::lazy_static;
use regex::Regex;
use std::time::Duration;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Trims the address and lowercases its domain part. The local part is kept
/// as typed since mailbox names may be case-sensitive.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Creates a regular account: normalizes the email, hashes the password and
/// persists. Fails with a validation error when the email is blank.
pub async fn create_user(
    users: &dyn UserStore,
    email: &str,
    password: &str,
    name: &str,
) -> Result<User, AppError> {
    let email = normalize_email(email);
    if email.is_empty() {
        return Err(AppError::Validation(
            "User must have a valid email address".into(),
        ));
    }

    if users.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let password_hash = hash_password(password)?;
    let user = users
        .insert(NewUser {
            email,
            name: name.trim().to_string(),
            password_hash,
        })
        .await
        .map_err(|e| {
            if e.is::<DuplicateEmail>() {
                warn!("email registered concurrently");
                AppError::Conflict("Email already registered".into())
            } else {
                AppError::Internal(e)
            }
        })?;

    info!(user_id = %user.id, email = %user.email, "user created");
    Ok(user)
}

/// `create_user` followed by elevation to staff and superuser.
pub async fn create_superuser(
    users: &dyn UserStore,
    email: &str,
    password: &str,
    name: &str,
) -> Result<User, AppError> {
    let user = create_user(users, email, password, name).await?;
    let user = users
        .set_privileges(user.id, true, true)
        .await?
        .context("created user disappeared before elevation")?;
    info!(user_id = %user.id, "user elevated to superuser");
    Ok(user)
}

/// Checks credentials. Unknown email, wrong password and inactive account all
/// produce the same error.
pub async fn authenticate(
    users: &dyn UserStore,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    let invalid = || AppError::Unauthorized("Invalid credentials".into());
    let email = normalize_email(email);

    let Some(user) = users.find_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(invalid());
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(invalid());
    }

    if !user.is_active {
        warn!(user_id = %user.id, "login inactive account");
        return Err(invalid());
    }

    Ok(user)
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        JwtKeys::from_config(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            access_ttl: Duration::from_secs((cfg.ttl_minutes as u64) * 60),
            refresh_ttl: Duration::from_secs((cfg.refresh_ttl_minutes as u64) * 60),
        }
    }

    fn sign_with_kind(&self, user_id: Uuid, kind: TokenKind) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let exp = now + TimeDuration::seconds(ttl.as_secs() as i64);
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            kind,
        };
        let token = encode(&Header::default(), &claims, &self.encoding).context("sign jwt")?;
        debug!(user_id = %user_id, kind = ?kind, "jwt signed");
        Ok(token)
    }

    pub fn sign_access(&self, user_id: Uuid) -> anyhow::Result<String> {
        self.sign_with_kind(user_id, TokenKind::Access)
    }

    pub fn sign_refresh(&self, user_id: Uuid) -> anyhow::Result<String> {
        self.sign_with_kind(user_id, TokenKind::Refresh)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, kind = ?data.claims.kind, "jwt verified");
        Ok(data.claims)
    }

    pub fn verify_refresh(&self, token: &str) -> anyhow::Result<Claims> {
        let claims = self.verify(token)?;
        if claims.kind != TokenKind::Refresh {
            anyhow::bail!("not a refresh token");
        }
        Ok(claims)
    }
}

/// Caller identity taken from a `Bearer` access token.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization header".into()))?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            AppError::Unauthorized("Invalid or expired token".into())
        })?;

        if claims.kind != TokenKind::Access {
            return Err(AppError::Unauthorized("Access token required".into()));
        }

        Ok(AuthUser(claims.sub))
    }
}

/// Loads the token subject, refusing accounts that were deleted or deactivated
/// after the token was issued.
pub async fn load_active_user(users: &dyn UserStore, user_id: Uuid) -> Result<User, AppError> {
    match users.find_by_id(user_id).await? {
        Some(user) if user.is_active => Ok(user),
        _ => {
            warn!(%user_id, "token subject missing or inactive");
            Err(AppError::Unauthorized("User not found".into()))
        }
    }
}

/// `AuthUser` whose account still exists and is active.
pub struct ActiveUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for ActiveUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user_id) = AuthUser::from_request_parts(parts, state).await?;
        let user = load_active_user(state.users.as_ref(), user_id).await?;
        Ok(ActiveUser(user))
    }
}
