// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! User handlers.

use axum::extract::State;

use gatehouse_core::UserRecord;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{Auth, UserIdPath};
use crate::response::{ApiResponse, PrincipalData};
use crate::state::AppState;

/// GET /api/private/user/me
pub async fn current_user(Auth(principal): Auth) -> ApiResponse<PrincipalData> {
    ApiResponse::ok(PrincipalData {
        user_id: principal.user_id,
    })
}

/// GET /api/protected/user/{id}
///
/// Returns the stored record, minus its password hash.
pub async fn get_user(
    State(state): State<AppState>,
    UserIdPath(user_id): UserIdPath,
) -> ApiResult<ApiResponse<UserRecord>> {
    let user = state
        .directory()
        .find_by_id(user_id)
        .await
        .map_err(|e| ApiError::internal(format!("User lookup failed: {}", e)))?
        .ok_or_else(|| ApiError::not_found(format!("User {}", user_id)))?;

    Ok(ApiResponse::ok(user))
}
