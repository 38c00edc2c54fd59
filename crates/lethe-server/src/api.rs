//! HTTP surface of the custodian.
//!
//! Two JSON routes over the encryptor service. Domain errors map onto the
//! closed wire taxonomy; anything unexpected is logged in full here and
//! crosses the wire as a generic internal error.

use axum::Router;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Json;
use lethe_core::{
    Clock, DataProtection, Encryptor, EncryptorError, KeyRepository, KeyStoreError,
};
use lethe_proto::{
    EncryptRequest, EncryptResponse, ErrorCode, ErrorResponse, KeyMetadata, NewKeyRequest,
    NewKeyResponse,
};
use uuid::Uuid;

/// Shared state behind both routes.
#[derive(Clone)]
pub struct AppState<R, P, C> {
    encryptor: Encryptor<R, P, C>,
    clock: C,
}

/// Build the custodian router.
pub fn router<R, P, C>(encryptor: Encryptor<R, P, C>, clock: C) -> Router
where
    R: KeyRepository,
    P: DataProtection,
    C: Clock,
{
    Router::new()
        .route("/new-key", post(new_key::<R, P, C>))
        .route("/encrypt", post(encrypt::<R, P, C>))
        .with_state(AppState { encryptor, clock })
}

/// An HTTP error: status code plus the wire error body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    fn bad_request(detail: impl std::fmt::Display) -> Self {
        let detail = detail.to_string();
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorResponse::new(ErrorCode::BadRequest, format!("request failed: {detail}"))
                .with_data("error", detail),
        }
    }

    fn key_not_found(key_id: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            body: ErrorResponse::new(ErrorCode::KeyNotFound, format!("key not found: {key_id}"))
                .with_data("key_id", key_id),
        }
    }

    fn key_expired(key_id: &str, expiration: chrono::DateTime<chrono::Utc>) -> Self {
        let expiration = expiration.to_rfc3339();
        Self {
            status: StatusCode::NOT_FOUND,
            body: ErrorResponse::new(
                ErrorCode::KeyExpired,
                format!("key {key_id} expired at {expiration}"),
            )
            .with_data("key_id", key_id)
            .with_data("expiration", expiration),
        }
    }

    /// Full detail stays in the log; the wire gets a generic message.
    fn internal(err: impl std::fmt::Display) -> Self {
        tracing::error!(error = %err, "internal error");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorResponse::new(ErrorCode::InternalServerError, "internal server error"),
        }
    }

    fn from_encryptor(err: EncryptorError) -> Self {
        match err {
            EncryptorError::KeyStore(KeyStoreError::NotFound { key_id }) => {
                Self::key_not_found(&key_id)
            },
            EncryptorError::KeyStore(KeyStoreError::Expired { key_id, expiration }) => {
                Self::key_expired(&key_id, expiration)
            },
            other => Self::internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

async fn new_key<R, P, C>(
    State(state): State<AppState<R, P, C>>,
    request: Result<Json<NewKeyRequest>, JsonRejection>,
) -> Result<Json<NewKeyResponse>, ApiError>
where
    R: KeyRepository,
    P: DataProtection,
    C: Clock,
{
    let Json(request) = request.map_err(ApiError::bad_request)?;
    request.validate(state.clock.now()).map_err(ApiError::bad_request)?;

    tracing::debug!(expiration = %request.expiration, "creating new key");

    // Key generation is seconds of CPU; keep it off the async workers.
    let encryptor = state.encryptor.clone();
    let result = tokio::task::spawn_blocking(move || {
        encryptor.create_new_key_and_encrypt(&request.content, request.expiration)
    })
    .await
    .map_err(ApiError::internal)?
    .map_err(ApiError::from_encryptor)?;

    tracing::info!(key_id = %result.key_id, expiration = %result.expiration, "new key created");

    Ok(Json(NewKeyResponse {
        encrypted_content: result.encrypted_content,
        metadata: KeyMetadata {
            key_id: result.key_id,
            expiration: result.expiration,
            verification_key: result.verification_key,
        },
    }))
}

async fn encrypt<R, P, C>(
    State(state): State<AppState<R, P, C>>,
    request: Result<Json<EncryptRequest>, JsonRejection>,
) -> Result<Json<EncryptResponse>, ApiError>
where
    R: KeyRepository,
    P: DataProtection,
    C: Clock,
{
    let Json(request) = request.map_err(ApiError::bad_request)?;
    request.validate().map_err(ApiError::bad_request)?;
    Uuid::parse_str(&request.key_id).map_err(ApiError::bad_request)?;

    tracing::debug!(key_id = %request.key_id, "re-encrypting under existing key");

    let encryptor = state.encryptor.clone();
    let encrypted_content = tokio::task::spawn_blocking(move || {
        encryptor.encrypt_with_existing(&request.content, &request.key_id)
    })
    .await
    .map_err(ApiError::internal)?
    .map_err(ApiError::from_encryptor)?;

    Ok(Json(EncryptResponse { encrypted_content }))
}
