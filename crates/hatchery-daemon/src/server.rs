//! HTTP surface: the metadata endpoint observers resolve token art through,
//! and the signature endpoint the dashboard calls to obtain a claim
//! authorization. Both translate typed component errors into structured
//! JSON; raw error text never leaves the `details` field.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use alloy_primitives::Address;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use hatchery_core::art;

use crate::ledger::LedgerReader;
use crate::signer::AuthorizationSigner;
use crate::telemetry::Telemetry;

const MAX_BODY_BYTES: usize = 16_384;

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn LedgerReader>,
    pub signer: Arc<AuthorizationSigner>,
    pub telemetry: Telemetry,
}

impl AppState {
    pub fn new(
        ledger: Arc<dyn LedgerReader>,
        signer: Arc<AuthorizationSigner>,
        telemetry: Telemetry,
    ) -> Self {
        Self {
            ledger,
            signer,
            telemetry,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/metadata", get(metadata))
        .route("/authorize", post(authorize))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn serve(
    listener: tokio::net::TcpListener,
    state: AppState,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    error: &'static str,
    details: Option<String>,
    outcome: &'static str,
}

impl ApiError {
    fn bad_request(error: &'static str, details: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
            details: Some(details.into()),
            outcome: "bad_request",
        }
    }

    fn internal(error: &'static str, details: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error,
            details: Some(details.into()),
            outcome: "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.error,
            "details": self.details,
        });
        (self.status, Json(body)).into_response()
    }
}

async fn metadata(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let outcome = metadata_impl(&state, &params).await;
    match outcome {
        Ok(body) => {
            state.telemetry.record_metadata_request("ok");
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => {
            state.telemetry.record_metadata_request(err.outcome);
            tracing::warn!(error = err.error, details = ?err.details, "metadata request failed");
            err.into_response()
        }
    }
}

async fn metadata_impl(
    state: &AppState,
    params: &HashMap<String, String>,
) -> Result<Value, ApiError> {
    let raw = params
        .get("profileId")
        .ok_or_else(|| ApiError::bad_request("missing parameter", "profileId is required"))?;
    let profile_id = raw.parse::<u64>().map_err(|_| {
        ApiError::bad_request("invalid parameter", "profileId must be an unsigned integer")
    })?;

    let score = state.ledger.score(profile_id).await.map_err(|e| {
        state.telemetry.record_oracle_failure();
        ApiError::internal("ledger unavailable", e.to_string())
    })?;

    let rendered = art::render(profile_id, score);
    tracing::info!(
        profile_id,
        score,
        stage = rendered.stage_name,
        "rendered metadata"
    );

    let mut attributes = vec![
        json!({"trait_type": "Score", "value": rendered.score_at_generation}),
        json!({"trait_type": "Stage", "value": rendered.stage_name}),
    ];
    if let Some(next) = rendered.next_stage_at {
        attributes.push(json!({"trait_type": "Next Stage At", "value": next}));
    }

    Ok(json!({
        "name": format!("Hatchery Creature #{profile_id}"),
        "description": format!(
            "An evolving Hatchery collectible, rendered deterministically from its on-chain score. Currently at the {} stage.",
            rendered.stage_name
        ),
        "image": rendered.image_data_uri,
        "attributes": attributes,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthorizeRequest {
    user: Option<String>,
    profile_owner: Option<String>,
    template_id: Option<u64>,
}

#[derive(Debug, Serialize)]
struct AuthorizeResponse {
    nonce: String,
    signature: String,
    signer: String,
}

async fn authorize(State(state): State<AppState>, body: axum::body::Bytes) -> Response {
    match authorize_impl(&state, &body) {
        Ok(resp) => {
            state.telemetry.record_authorize_request("ok");
            (StatusCode::OK, Json(resp)).into_response()
        }
        Err(err) => {
            state.telemetry.record_authorize_request(err.outcome);
            tracing::warn!(error = err.error, details = ?err.details, "authorize request failed");
            err.into_response()
        }
    }
}

fn authorize_impl(state: &AppState, body: &[u8]) -> Result<AuthorizeResponse, ApiError> {
    let request: AuthorizeRequest = serde_json::from_slice(body)
        .map_err(|e| ApiError::bad_request("invalid request body", e.to_string()))?;

    let user = parse_address("user", request.user)?;
    let profile_owner = parse_address("profileOwner", request.profile_owner)?;
    let template_id = request
        .template_id
        .ok_or_else(|| ApiError::bad_request("missing field", "templateId is required"))?;

    let auth = state
        .signer
        .issue(user, profile_owner, template_id)
        .map_err(|e| ApiError::internal("signing failed", e.to_string()))?;

    tracing::info!(
        user = %auth.user,
        template_id,
        "issued claim authorization"
    );

    Ok(AuthorizeResponse {
        nonce: auth.nonce.to_string(),
        signature: format!("0x{}", hex::encode(&auth.signature)),
        signer: format!("{:#x}", auth.signer),
    })
}

fn parse_address(field: &'static str, raw: Option<String>) -> Result<Address, ApiError> {
    let raw = raw.ok_or_else(|| {
        ApiError::bad_request("missing field", format!("{field} is required"))
    })?;
    Address::from_str(&raw).map_err(|_| {
        ApiError::bad_request("invalid field", format!("{field} is not a valid address"))
    })
}
