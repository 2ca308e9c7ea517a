// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authenticated principal attached to each request.

use serde::Serialize;
use uuid::Uuid;

use gatehouse_core::{SessionIdentifier, UserId};

/// The identity a request was authenticated as.
///
/// Inserted into request extensions by the auth middleware and read by
/// handlers through the [`Auth`](crate::extractors::Auth) extractor. The
/// session identifier is the one minted by this request's rotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    /// User ID.
    pub user_id: UserId,
    /// Identifier of the live session after rotation.
    #[serde(skip)]
    pub session_identifier: SessionIdentifier,
    /// Request ID, recorded on the span the handler runs in.
    pub request_id: Uuid,
}

impl Principal {
    /// Creates a principal for a freshly rotated session.
    pub fn new(user_id: UserId, session_identifier: SessionIdentifier) -> Self {
        Self {
            user_id,
            session_identifier,
            request_id: Uuid::now_v7(),
        }
    }
}
