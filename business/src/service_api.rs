//! Typed client helpers for the hosted identity/data service.
//!
//! The boundary is PostgREST/GoTrue shaped: session endpoints under
//! `/auth/v1`, row endpoints under `/rest/v1` with `id=in.(…)` filters.
//! Any backing store exposing equivalent primitives can substitute; tests
//! substitute a `wiremock` server.
//!
//! These helpers perform network IO and are intended to be called from
//! commands only. Callers map results into compute updates.

use serde::{Deserialize, Serialize};
use ustr::Ustr;

use crate::BusinessConfig;
use crate::directory::{UserRow, UserStatus};
use crate::http::{Client, RequestBuilder, Response};

/// Failure taxonomy for the service boundary.
///
/// Each variant is terminal for the user-triggered action it came from;
/// nothing here is retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// Directory read failed. Callers degrade to an empty list and log.
    #[error("directory query failed: {0}")]
    Query(String),

    /// A block/unblock/delete request was rejected; service-side state
    /// stands as returned.
    #[error("mutation rejected: {0}")]
    Mutation(String),

    /// The second phase of delete failed on one id; remaining identity
    /// deletions were not attempted.
    #[error("identity deletion failed for {user_id}: {message}")]
    IdentityDeletion { user_id: Ustr, message: String },

    /// Sign-in or session lookup rejected.
    #[error("sign-in rejected: {0}")]
    Auth(String),
}

/// A typed service result.
pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Clone, Serialize)]
pub struct PasswordGrantRequest {
    pub email: String,
    pub password: String,
}

/// The acting session's identity record, as the service reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Ustr,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordGrantResponse {
    pub access_token: String,
    pub user: SessionUser,
}

/// Error payloads differ per service component; probe the common fields.
#[derive(Debug, Clone, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

fn error_text(response: &Response) -> String {
    let body: ErrorBody = response.json().unwrap_or_default();
    body.error_description
        .or(body.msg)
        .or(body.message)
        .unwrap_or_else(|| format!("service returned status {}", response.status))
}

fn with_keys(mut request: RequestBuilder, api_key: Option<&str>, bearer: Option<&str>) -> RequestBuilder {
    if let Some(key) = api_key {
        request = request.header("apikey", key);
    }
    if let Some(token) = bearer {
        request = request.header("Authorization", format!("Bearer {token}"));
    }
    request
}

/// PostgREST membership filter: `id=in.(a,b,c)`.
fn id_filter(ids: &[Ustr]) -> String {
    let joined = ids.iter().map(Ustr::as_str).collect::<Vec<_>>().join(",");
    format!("id=in.({joined})")
}

/// POST `{auth}/token?grant_type=password`
pub async fn sign_in(
    config: &BusinessConfig,
    email: &str,
    password: &str,
) -> ServiceResult<PasswordGrantResponse> {
    let url = format!("{}/token?grant_type=password", config.auth_url());

    let request = Client::post(&url)
        .json(&PasswordGrantRequest {
            email: email.to_owned(),
            password: password.to_owned(),
        })
        .map_err(|e| ServiceError::Auth(format!("failed to serialize request: {e}")))?;
    let request = with_keys(request, config.anon_key(), None);

    let response = request
        .send()
        .await
        .map_err(|e| ServiceError::Auth(e.to_string()))?;

    if !response.is_success() {
        return Err(ServiceError::Auth(error_text(&response)));
    }

    response
        .json()
        .map_err(|e| ServiceError::Auth(format!("failed to parse sign-in response: {e}")))
}

/// GET `{auth}/user` — the acting session's identity, if the token is live.
pub async fn fetch_session(config: &BusinessConfig, token: &str) -> ServiceResult<SessionUser> {
    let url = format!("{}/user", config.auth_url());

    let response = with_keys(Client::get(&url), config.anon_key(), Some(token))
        .send()
        .await
        .map_err(|e| ServiceError::Auth(e.to_string()))?;

    if !response.is_success() {
        return Err(ServiceError::Auth(error_text(&response)));
    }

    response
        .json()
        .map_err(|e| ServiceError::Auth(format!("failed to parse session response: {e}")))
}

/// POST `{auth}/logout`
pub async fn sign_out(config: &BusinessConfig, token: &str) -> ServiceResult<()> {
    let url = format!("{}/logout", config.auth_url());

    let response = with_keys(Client::post(&url), config.anon_key(), Some(token))
        .send()
        .await
        .map_err(|e| ServiceError::Auth(e.to_string()))?;

    if !response.is_success() {
        return Err(ServiceError::Auth(error_text(&response)));
    }

    Ok(())
}

/// GET `{rest}/users?select=*&order=last_login.desc`
///
/// Ordering is the service's; null `last_login` placement follows its
/// default and is passed through untouched.
pub async fn list_users(
    config: &BusinessConfig,
    token: Option<&str>,
) -> ServiceResult<Vec<UserRow>> {
    let url = format!("{}/users?select=*&order=last_login.desc", config.rest_url());

    let response = with_keys(Client::get(&url), config.anon_key(), token)
        .send()
        .await
        .map_err(|e| ServiceError::Query(e.to_string()))?;

    if !response.is_success() {
        return Err(ServiceError::Query(error_text(&response)));
    }

    response
        .json()
        .map_err(|e| ServiceError::Query(format!("failed to parse user rows: {e}")))
}

/// PATCH `{rest}/users?id=in.(…)` — one status write for the whole set.
pub async fn update_status(
    config: &BusinessConfig,
    ids: &[Ustr],
    status: UserStatus,
) -> ServiceResult<()> {
    let url = format!("{}/users?{}", config.rest_url(), id_filter(ids));

    let request = Client::patch(&url)
        .header("Prefer", "return=minimal")
        .json(&serde_json::json!({ "status": status }))
        .map_err(|e| ServiceError::Mutation(format!("failed to serialize request: {e}")))?;
    let request = with_keys(request, config.service_role_key(), config.service_role_key());

    let response = request
        .send()
        .await
        .map_err(|e| ServiceError::Mutation(e.to_string()))?;

    if !response.is_success() {
        return Err(ServiceError::Mutation(error_text(&response)));
    }

    Ok(())
}

/// DELETE `{rest}/users?id=in.(…)` — one row delete for the whole set.
pub async fn delete_rows(config: &BusinessConfig, ids: &[Ustr]) -> ServiceResult<()> {
    let url = format!("{}/users?{}", config.rest_url(), id_filter(ids));

    let request = with_keys(
        Client::delete(&url).header("Prefer", "return=minimal"),
        config.service_role_key(),
        config.service_role_key(),
    );

    let response = request
        .send()
        .await
        .map_err(|e| ServiceError::Mutation(e.to_string()))?;

    if !response.is_success() {
        return Err(ServiceError::Mutation(error_text(&response)));
    }

    Ok(())
}

/// DELETE `{auth}/admin/users/{id}` — one identity record.
///
/// Not idempotent: deleting an already-deleted identity errors upstream.
pub async fn delete_identity(config: &BusinessConfig, id: Ustr) -> ServiceResult<()> {
    let url = format!("{}/admin/users/{id}", config.auth_url());

    let response = with_keys(
        Client::delete(&url),
        config.service_role_key(),
        config.service_role_key(),
    )
    .send()
    .await
    .map_err(|e| ServiceError::IdentityDeletion {
        user_id: id,
        message: e.to_string(),
    })?;

    if !response.is_success() {
        return Err(ServiceError::IdentityDeletion {
            user_id: id,
            message: error_text(&response),
        });
    }

    Ok(())
}
