// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Validated writes to the category permission table.
//!
//! Evaluation tolerates any stored row, so the writer is the single choke
//! point that keeps unassignable levels and malformed assignees out of
//! storage. Validation runs before any write; the storage upsert keeps one
//! row per `(category, assignee)` shape.

use agora_access_core::{
	AccessError, CategoryPermissionGrant, PermissionAssignee, PermissionId, PostCategoryId,
	PostCategoryPermissionLevel,
};

use crate::error::Result;
use crate::store::AccessStore;

/// A requested grant assignment.
#[derive(Debug, Clone)]
pub struct PermissionAssignmentInput {
	pub post_category_id: PostCategoryId,
	pub permission_level: PostCategoryPermissionLevel,
	pub assignee: PermissionAssignee,
}

/// Create or update a category grant after validating the request.
///
/// # Errors
/// * `AccessError::PostCategoryNotFound` when the category does not exist.
/// * `AccessError::UndesirableOperation` for levels that cannot be assigned.
/// * `AccessError::AssignmentNotPermitted` for assignee shapes categories
///   never store.
/// * `AccessError::InsecureOperation` for public grants above `view`, and
///   for space or role assignees outside the category's space.
/// * `AccessError::NotFound` when a role assignee does not exist.
#[tracing::instrument(level = "debug", skip(store, input), fields(category_id = %input.post_category_id))]
pub async fn upsert_post_category_permission(
	store: &dyn AccessStore,
	input: &PermissionAssignmentInput,
) -> Result<CategoryPermissionGrant> {
	let category = store
		.get_post_category(&input.post_category_id)
		.await?
		.ok_or(AccessError::PostCategoryNotFound(input.post_category_id))?;

	if !input.permission_level.is_assignable() {
		return Err(AccessError::UndesirableOperation(format!(
			"cannot assign the {} permission level",
			input.permission_level
		))
		.into());
	}

	match &input.assignee {
		PermissionAssignee::User { .. }
		| PermissionAssignee::SpaceMember
		| PermissionAssignee::AllReviewers => {
			return Err(AccessError::AssignmentNotPermitted(format!(
				"category permissions cannot target the {} group",
				input.assignee.group()
			))
			.into());
		}
		PermissionAssignee::Public => {
			if input.permission_level != PostCategoryPermissionLevel::View {
				return Err(AccessError::InsecureOperation(
					"public category grants are limited to the view level".to_string(),
				)
				.into());
			}
		}
		PermissionAssignee::Space { id } => {
			if *id != category.space_id {
				return Err(AccessError::InsecureOperation(
					"space assignee does not match the category's space".to_string(),
				)
				.into());
			}
		}
		PermissionAssignee::Role { id } => {
			let role = store
				.get_role(id)
				.await?
				.ok_or_else(|| AccessError::NotFound(format!("role not found: {id}")))?;
			if role.space_id != category.space_id {
				return Err(AccessError::InsecureOperation(
					"role assignee belongs to a different space".to_string(),
				)
				.into());
			}
		}
	}

	store
		.upsert_category_permission(
			&input.post_category_id,
			input.permission_level,
			&input.assignee,
		)
		.await
}

/// Delete a category grant. Deleting a row that does not exist is a no-op.
///
/// # Errors
/// Returns `AccessError::UndesirableOperation` for rows holding levels the
/// writer cannot manage.
#[tracing::instrument(level = "debug", skip(store), fields(permission_id = %permission_id))]
pub async fn delete_post_category_permission(
	store: &dyn AccessStore,
	permission_id: &PermissionId,
) -> Result<()> {
	let Some(grant) = store.get_category_permission(permission_id).await? else {
		return Ok(());
	};

	if matches!(
		grant.permission_level,
		PostCategoryPermissionLevel::CategoryAdmin | PostCategoryPermissionLevel::Moderator
	) {
		return Err(AccessError::UndesirableOperation(format!(
			"cannot delete a {} grant",
			grant.permission_level
		))
		.into());
	}

	store.delete_category_permission(permission_id).await?;
	Ok(())
}
