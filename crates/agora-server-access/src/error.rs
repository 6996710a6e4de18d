// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use agora_access_core::AccessError;

#[derive(Debug, thiserror::Error)]
pub enum AccessServerError {
	#[error(transparent)]
	Access(#[from] AccessError),

	#[error("Database error: {0}")]
	Sqlx(#[from] sqlx::Error),

	#[error("Internal: {0}")]
	Internal(String),

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AccessServerError>;
