//! Custom request extractors.

use std::net::SocketAddr;

use axum::{
    Form, Json,
    extract::{ConnectInfo, FromRequest, FromRequestParts, Request},
    http::{header, request::Parts},
};
use std::convert::Infallible;
use tracing::warn;
use validator::Validate;

use crate::api::dto::shorten::ShortenRequest;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::{UNKNOWN_CLIENT, extract_client_ip};

/// Identifier of the client a request is accounted to for rate limiting.
///
/// Taken from the socket peer, or from proxy headers when the service runs
/// with `BEHIND_PROXY`. Requires the router to be served with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientId(pub String);

impl FromRequestParts<AppState> for ClientId {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        let client = extract_client_ip(&parts.headers, peer, state.behind_proxy);
        if client == UNKNOWN_CLIENT {
            warn!("Client address unavailable; request accounted to the shared quota");
        }

        Ok(ClientId(client))
    }
}

/// Validated [`ShortenRequest`] read from a form or JSON body.
///
/// `application/json` bodies are parsed as JSON; anything else as
/// `application/x-www-form-urlencoded`. Malformed bodies and failed
/// validation are rejected with `400`.
#[derive(Debug)]
pub struct ShortenPayload(pub ShortenRequest);

impl<S> FromRequest<S> for ShortenPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        let payload = if is_json {
            let Json(payload) = Json::<ShortenRequest>::from_request(req, state)
                .await
                .map_err(|e| AppError::bad_request(e.body_text()))?;
            payload
        } else {
            let Form(payload) = Form::<ShortenRequest>::from_request(req, state)
                .await
                .map_err(|e| AppError::bad_request(e.body_text()))?;
            payload
        };

        let payload = payload.normalized();
        payload.validate()?;

        Ok(ShortenPayload(payload))
    }
}
