// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Caller identity extraction for the server.
//!
//! The caller names itself with the `X-Actor-Id` header; the role comes
//! from the member directory. `X-Request-Id`, when present, becomes the
//! audit cause identifier.

use axum::{extract::FromRequestParts, http::request::Parts};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};
use waste_billing_api::{ApiError, AuthenticatedActor, AuthenticationService};
use waste_billing_audit::Cause;

use crate::AppState;
use crate::error::HttpError;

/// Header naming the calling member.
pub const ACTOR_HEADER: &str = "x-actor-id";

/// Header carrying a caller-supplied request identifier.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Extractor for the authenticated caller and the cause of its request.
///
/// # Usage
///
/// ```ignore
/// async fn my_handler(
///     Identity { actor, cause }: Identity,
/// ) -> Result<Json<Response>, HttpError> {
///     // actor: AuthenticatedActor
///     // cause: Cause
/// }
/// ```
///
/// # Errors
///
/// Rejects with HTTP 401 if the header is missing, malformed, or names a
/// member that is not registered.
pub struct Identity {
    pub actor: AuthenticatedActor,
    pub cause: Cause,
}

impl FromRequestParts<AppState> for Identity {
    type Rejection = HttpError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw: &str = parts
            .headers
            .get(ACTOR_HEADER)
            .ok_or_else(|| {
                debug!("Missing X-Actor-Id header");
                HttpError::unauthenticated("Missing X-Actor-Id header")
            })?
            .to_str()
            .map_err(|_| {
                warn!("Invalid X-Actor-Id header encoding");
                HttpError::unauthenticated("Invalid X-Actor-Id header")
            })?;

        let mut persistence = state.persistence.lock().await;
        let actor: AuthenticatedActor =
            AuthenticationService::authenticate_header(&mut persistence, raw)
                .map_err(ApiError::from)?;
        drop(persistence);

        debug!(member_id = actor.member_id, role = %actor.role, "Caller identified");

        Ok(Self {
            actor,
            cause: request_cause(parts),
        })
    }
}

fn request_cause(parts: &Parts) -> Cause {
    let id: String = parts
        .headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map_or_else(
            || format!("http-{}", REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed)),
            ToString::to_string,
        );
    Cause::new(id, format!("{} {}", parts.method, parts.uri.path()))
}
