// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error taxonomy for access evaluation and permission writes.
//!
//! Read paths never produce an error to signal "no access"; they return
//! empty flag sets or empty id lists. Errors are reserved for malformed
//! requests, missing resources, and rejected mutations.

use crate::types::PostCategoryId;

#[derive(Debug, thiserror::Error)]
pub enum AccessError {
	/// The request itself is malformed (empty batch, mixed spaces,
	/// unknown space id).
	#[error("Invalid input: {0}")]
	InvalidInput(String),

	/// A referenced resource does not exist.
	#[error("Not found: {0}")]
	NotFound(String),

	/// The target post category does not exist.
	#[error("Post category not found: {0}")]
	PostCategoryNotFound(PostCategoryId),

	/// The mutation is well-formed but disallowed by policy.
	#[error("Undesirable operation: {0}")]
	UndesirableOperation(String),

	/// The mutation would widen access beyond what its scope allows.
	#[error("Insecure operation: {0}")]
	InsecureOperation(String),

	/// The assignee shape cannot receive this kind of assignment.
	#[error("Assignment not permitted: {0}")]
	AssignmentNotPermitted(String),
}

pub type Result<T> = std::result::Result<T, AccessError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn category_not_found_names_the_category() {
		let id = PostCategoryId::generate();
		let err = AccessError::PostCategoryNotFound(id);
		assert!(err.to_string().contains(&id.to_string()));
	}

	#[test]
	fn variants_carry_context() {
		let err = AccessError::InvalidInput("categories span multiple spaces".to_string());
		assert!(err.to_string().starts_with("Invalid input"));
	}
}
