// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Storage abstraction for the access engines.
//!
//! [`AccessStore`] is the seam between the evaluation engines and the
//! database. Read methods return `Option` for missing rows; translating a
//! missing row into the right typed error is the caller's concern.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use agora_access_core::{
	CategoryPermissionGrant, PermissionAssignee, PermissionId, PostCategoryId,
	PostCategoryPermissionLevel, ProposalAttrs, RoleId, SpaceId, SpaceRole, UserId,
};

use crate::error::Result;

/// The space-level operation that confers forum-wide moderation.
pub const MODERATE_FORUMS: &str = "moderate_forums";

/// A space row, as the access engines see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
	pub id: SpaceId,
	pub name: String,
	/// Payment-tier downgrade signal; read paths retain view access only.
	pub readonly: bool,
	/// Space-level toggle, read but not consulted by the evaluation-based
	/// proposal resolver.
	pub public_proposals: bool,
	pub created_at: DateTime<Utc>,
}

/// A forum post category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostCategory {
	pub id: PostCategoryId,
	pub space_id: SpaceId,
	pub name: String,
	pub created_at: DateTime<Utc>,
}

/// A role group within a space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
	pub id: RoleId,
	pub space_id: SpaceId,
	pub name: String,
}

#[async_trait]
pub trait AccessStore: Send + Sync {
	async fn get_space(&self, space_id: &SpaceId) -> Result<Option<Space>>;

	async fn get_space_role(
		&self,
		space_id: &SpaceId,
		user_id: &UserId,
	) -> Result<Option<SpaceRole>>;

	/// Role ids the user holds within the space, confirmed memberships only.
	async fn list_role_ids_for_user(
		&self,
		space_id: &SpaceId,
		user_id: &UserId,
	) -> Result<Vec<RoleId>>;

	/// Whether a space-level grant confers `moderate_forums` on a member
	/// holding the given roles. Space-assigned grants (no role) count for
	/// every member.
	async fn has_space_wide_forum_moderator(
		&self,
		space_id: &SpaceId,
		role_ids: &[RoleId],
	) -> Result<bool>;

	async fn get_role(&self, role_id: &RoleId) -> Result<Option<Role>>;

	async fn get_post_category(
		&self,
		category_id: &PostCategoryId,
	) -> Result<Option<PostCategory>>;

	/// All stored grants for the given categories, fetched in one query.
	async fn list_category_permissions(
		&self,
		category_ids: &[PostCategoryId],
	) -> Result<Vec<CategoryPermissionGrant>>;

	async fn get_category_permission(
		&self,
		permission_id: &PermissionId,
	) -> Result<Option<CategoryPermissionGrant>>;

	/// Insert or update the grant for `(category, assignee)`, keeping at
	/// most one row per assignee shape.
	async fn upsert_category_permission(
		&self,
		category_id: &PostCategoryId,
		level: PostCategoryPermissionLevel,
		assignee: &PermissionAssignee,
	) -> Result<CategoryPermissionGrant>;

	/// Delete a stored grant. Returns false if no row existed.
	async fn delete_category_permission(&self, permission_id: &PermissionId) -> Result<bool>;

	/// All proposals in the space with their ordered evaluation steps,
	/// reviewers, and step permissions.
	async fn list_proposals_in_space(&self, space_id: &SpaceId) -> Result<Vec<ProposalAttrs>>;
}
