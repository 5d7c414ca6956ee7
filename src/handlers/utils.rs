use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::app::AppState;
use crate::database::models::{Id, User};
use crate::database::StoreError;
use crate::error::{ApiError, StoreResultExt};

/// JSON request body whose every failure (unreadable body, malformed JSON,
/// wrong field types, unknown fields) becomes `400 invalid json body`.
///
/// The `Content-Type` header is not inspected.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            debug!(%rejection, "Unreadable request body");
            ApiError::invalid_json()
        })?;

        serde_json::from_slice(&bytes).map(JsonBody).map_err(|err| {
            debug!(error = %err, "Rejected request body");
            ApiError::invalid_json()
        })
    }
}

/// Parse a path segment as a positive id; anything else is `invalid {name}`.
pub fn parse_id(raw: &str, name: &str) -> Result<Id, ApiError> {
    match raw.parse::<Id>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::bad_request(format!("invalid {}", name))),
    }
}

/// `?q=` with surrounding whitespace removed; blank means no filter.
pub fn search_term(q: Option<&str>) -> Option<&str> {
    q.map(str::trim).filter(|q| !q.is_empty())
}

/// Load the user a request claims to act as. An unknown id is the caller's
/// mistake, so it is a 400 rather than a 404.
pub async fn load_actor(state: &AppState, user_id: Id) -> Result<User, ApiError> {
    state
        .store
        .find_user(user_id)
        .await
        .or_internal("db error checking user")?
        .ok_or_else(|| ApiError::bad_request("user not found"))
}

/// Unique violations become a 409 with `conflict`; everything else is masked.
pub fn conflict_or_internal(err: StoreError, conflict: &'static str, internal: &'static str) -> ApiError {
    if err.is_conflict() {
        return ApiError::conflict(conflict);
    }
    error!(error = %err, "{}", internal);
    ApiError::internal_server_error(internal)
}
