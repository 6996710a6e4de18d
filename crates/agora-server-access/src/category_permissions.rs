// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Storage-backed computation of post category permissions.
//!
//! Two entry points: [`compute_post_category_permissions`] for a single
//! category and [`get_permissioned_categories`] for a same-space batch.
//! Both resolve the actor once, load the stored grants, and delegate the
//! actual aggregation to [`evaluate_category_permissions`].

use std::collections::HashMap;

use agora_access_core::{
	evaluate_category_permissions, AccessError, ActorAttrs, CategoryPermissionGrant,
	PostCategoryId, PostCategoryOperation, PostCategoryPermissionFlags, SpaceId, UserId,
};

use crate::error::Result;
use crate::membership::resolve_membership;
use crate::store::{AccessStore, PostCategory};

/// Compute the aggregated flags one user holds on one category.
///
/// # Errors
/// Returns `AccessError::PostCategoryNotFound` when the category does not
/// exist.
#[tracing::instrument(level = "debug", skip(store), fields(category_id = %category_id))]
pub async fn compute_post_category_permissions(
	store: &dyn AccessStore,
	category_id: &PostCategoryId,
	user_id: Option<&UserId>,
) -> Result<PostCategoryPermissionFlags> {
	let category = store
		.get_post_category(category_id)
		.await?
		.ok_or(AccessError::PostCategoryNotFound(*category_id))?;

	let membership = resolve_membership(store, &category.space_id, user_id, None).await?;
	let has_moderator = space_wide_moderator(store, &category.space_id, &membership.actor).await?;

	let rows = store.list_category_permissions(&[*category_id]).await?;
	Ok(evaluate_category_permissions(
		&membership.actor,
		&rows,
		has_moderator,
		membership.readonly,
	))
}

/// A category paired with the flags the requesting user holds on it.
#[derive(Debug, Clone)]
pub struct PermissionedCategory {
	pub category: PostCategory,
	pub permissions: PostCategoryPermissionFlags,
}

/// Evaluate a batch of categories from a single space for one user,
/// returning only the categories the user can view.
///
/// The batch shares one membership resolution, one space-wide moderator
/// check, and one grant query across all categories.
///
/// # Errors
/// Returns `AccessError::InvalidInput` when the batch is empty or spans
/// more than one space.
#[tracing::instrument(level = "debug", skip(store, categories), fields(categories = categories.len()))]
pub async fn get_permissioned_categories(
	store: &dyn AccessStore,
	categories: &[PostCategory],
	user_id: Option<&UserId>,
) -> Result<Vec<PermissionedCategory>> {
	let space_id = single_space_id(categories)?;
	let membership = resolve_membership(store, &space_id, user_id, None).await?;
	let has_moderator = space_wide_moderator(store, &space_id, &membership.actor).await?;

	let category_ids: Vec<PostCategoryId> = categories.iter().map(|c| c.id).collect();
	let rows = store.list_category_permissions(&category_ids).await?;
	let mut by_category: HashMap<PostCategoryId, Vec<CategoryPermissionGrant>> = HashMap::new();
	for row in rows {
		by_category.entry(row.post_category_id).or_default().push(row);
	}

	let empty: Vec<CategoryPermissionGrant> = Vec::new();
	let mut permissioned = Vec::new();
	for category in categories {
		let rows = by_category.get(&category.id).unwrap_or(&empty);
		let flags = evaluate_category_permissions(
			&membership.actor,
			rows,
			has_moderator,
			membership.readonly,
		);
		if flags.has(PostCategoryOperation::ViewPosts) {
			permissioned.push(PermissionedCategory {
				category: category.clone(),
				permissions: flags,
			});
		}
	}
	Ok(permissioned)
}

/// The space-wide moderator check only matters for non-admin members;
/// every other standing short-circuits inside the policy.
async fn space_wide_moderator(
	store: &dyn AccessStore,
	space_id: &SpaceId,
	actor: &ActorAttrs,
) -> Result<bool> {
	if actor.is_member() && !actor.is_admin() {
		store
			.has_space_wide_forum_moderator(space_id, &actor.role_ids)
			.await
	} else {
		Ok(false)
	}
}

fn single_space_id(categories: &[PostCategory]) -> Result<SpaceId> {
	let mut space_ids = categories.iter().map(|c| c.space_id);
	let first = space_ids.next().ok_or_else(|| {
		AccessError::InvalidInput("empty category batch".to_string())
	})?;
	if space_ids.any(|id| id != first) {
		return Err(AccessError::InvalidInput(
			"category batch spans multiple spaces".to_string(),
		)
		.into());
	}
	Ok(first)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::repository::SqliteAccessStore;
	use crate::store::MODERATE_FORUMS;
	use crate::testing::*;
	use agora_access_core::{PermissionAssignee, PostCategoryPermissionLevel};

	mod single_category {
		use super::*;

		#[tokio::test]
		async fn test_missing_category_is_not_found() {
			let pool = create_access_test_pool().await;
			let store = SqliteAccessStore::new(pool);

			let result = compute_post_category_permissions(
				&store,
				&PostCategoryId::generate(),
				None,
			)
			.await;
			assert!(matches!(
				result,
				Err(crate::error::AccessServerError::Access(
					AccessError::PostCategoryNotFound(_)
				))
			));
		}

		#[tokio::test]
		async fn test_admin_receives_full_flags() {
			let pool = create_access_test_pool().await;
			let space_id = generate_space(&pool, false).await;
			let admin_id = generate_space_user(&pool, &space_id, true, false).await;
			let category_id = generate_post_category(&pool, &space_id).await;
			let store = SqliteAccessStore::new(pool);

			let flags =
				compute_post_category_permissions(&store, &category_id, Some(&admin_id))
					.await
					.unwrap();
			assert_eq!(flags, PostCategoryPermissionFlags::full());
		}

		#[tokio::test]
		async fn test_member_unions_role_and_public_grants() {
			let pool = create_access_test_pool().await;
			let space_id = generate_space(&pool, false).await;
			let user_id = generate_space_user(&pool, &space_id, false, false).await;
			let role_id = generate_role(&pool, &space_id, &[user_id]).await;
			let category_id = generate_post_category(&pool, &space_id).await;
			generate_category_permission(
				&pool,
				&category_id,
				PostCategoryPermissionLevel::FullAccess,
				&PermissionAssignee::Role { id: role_id },
			)
			.await;
			generate_category_permission(
				&pool,
				&category_id,
				PostCategoryPermissionLevel::View,
				&PermissionAssignee::Public,
			)
			.await;
			let store = SqliteAccessStore::new(pool);

			let flags =
				compute_post_category_permissions(&store, &category_id, Some(&user_id))
					.await
					.unwrap();
			assert!(flags.has(PostCategoryOperation::CreatePost));
			assert!(flags.has(PostCategoryOperation::ViewPosts));
			assert!(!flags.has(PostCategoryOperation::ManagePermissions));
		}

		#[tokio::test]
		async fn test_anonymous_sees_public_grants_only() {
			let pool = create_access_test_pool().await;
			let space_id = generate_space(&pool, false).await;
			let category_id = generate_post_category(&pool, &space_id).await;
			generate_category_permission(
				&pool,
				&category_id,
				PostCategoryPermissionLevel::View,
				&PermissionAssignee::Public,
			)
			.await;
			generate_category_permission(
				&pool,
				&category_id,
				PostCategoryPermissionLevel::FullAccess,
				&PermissionAssignee::Space { id: space_id },
			)
			.await;
			let store = SqliteAccessStore::new(pool);

			let flags = compute_post_category_permissions(&store, &category_id, None)
				.await
				.unwrap();
			assert!(flags.has(PostCategoryOperation::ViewPosts));
			assert!(!flags.has(PostCategoryOperation::CreatePost));
		}

		#[tokio::test]
		async fn test_space_wide_moderation_grant_applies() {
			let pool = create_access_test_pool().await;
			let space_id = generate_space(&pool, false).await;
			let user_id = generate_space_user(&pool, &space_id, false, false).await;
			generate_space_permission(&pool, &space_id, None, &[MODERATE_FORUMS]).await;
			let category_id = generate_post_category(&pool, &space_id).await;
			let store = SqliteAccessStore::new(pool);

			let flags =
				compute_post_category_permissions(&store, &category_id, Some(&user_id))
					.await
					.unwrap();
			assert!(flags.has(PostCategoryOperation::ViewPosts));
			assert!(flags.has(PostCategoryOperation::CreatePost));
			assert!(!flags.has(PostCategoryOperation::EditCategory));
		}

		#[tokio::test]
		async fn test_readonly_space_downgrades_flags() {
			let pool = create_access_test_pool().await;
			let space_id = generate_space(&pool, true).await;
			let user_id = generate_space_user(&pool, &space_id, false, false).await;
			let category_id = generate_post_category(&pool, &space_id).await;
			generate_category_permission(
				&pool,
				&category_id,
				PostCategoryPermissionLevel::FullAccess,
				&PermissionAssignee::Space { id: space_id },
			)
			.await;
			let store = SqliteAccessStore::new(pool);

			let flags =
				compute_post_category_permissions(&store, &category_id, Some(&user_id))
					.await
					.unwrap();
			assert!(flags.has(PostCategoryOperation::ViewPosts));
			assert!(!flags.has(PostCategoryOperation::CreatePost));
			assert!(!flags.has(PostCategoryOperation::CommentPosts));
		}
	}

	mod batches {
		use super::*;

		async fn category(store: &SqliteAccessStore, id: &PostCategoryId) -> PostCategory {
			store.get_post_category(id).await.unwrap().unwrap()
		}

		#[tokio::test]
		async fn test_empty_batch_is_invalid_input() {
			let pool = create_access_test_pool().await;
			let store = SqliteAccessStore::new(pool);

			let result = get_permissioned_categories(&store, &[], None).await;
			assert!(matches!(
				result,
				Err(crate::error::AccessServerError::Access(
					AccessError::InvalidInput(_)
				))
			));
		}

		#[tokio::test]
		async fn test_mixed_space_batch_is_invalid_input() {
			let pool = create_access_test_pool().await;
			let space_a = generate_space(&pool, false).await;
			let space_b = generate_space(&pool, false).await;
			let cat_a = generate_post_category(&pool, &space_a).await;
			let cat_b = generate_post_category(&pool, &space_b).await;
			let store = SqliteAccessStore::new(pool);

			let categories = vec![
				category(&store, &cat_a).await,
				category(&store, &cat_b).await,
			];
			let result = get_permissioned_categories(&store, &categories, None).await;
			assert!(matches!(
				result,
				Err(crate::error::AccessServerError::Access(
					AccessError::InvalidInput(_)
				))
			));
		}

		#[tokio::test]
		async fn test_admin_sees_every_category_with_full_flags() {
			let pool = create_access_test_pool().await;
			let space_id = generate_space(&pool, false).await;
			let admin_id = generate_space_user(&pool, &space_id, true, false).await;
			let cat_a = generate_post_category(&pool, &space_id).await;
			let cat_b = generate_post_category(&pool, &space_id).await;
			let store = SqliteAccessStore::new(pool);

			let categories = vec![
				category(&store, &cat_a).await,
				category(&store, &cat_b).await,
			];
			let permissioned =
				get_permissioned_categories(&store, &categories, Some(&admin_id))
					.await
					.unwrap();
			assert_eq!(permissioned.len(), 2);
			for entry in &permissioned {
				assert_eq!(entry.permissions, PostCategoryPermissionFlags::full());
			}
		}

		#[tokio::test]
		async fn test_member_only_keeps_viewable_categories() {
			let pool = create_access_test_pool().await;
			let space_id = generate_space(&pool, false).await;
			let user_id = generate_space_user(&pool, &space_id, false, false).await;
			let visible = generate_post_category(&pool, &space_id).await;
			let hidden = generate_post_category(&pool, &space_id).await;
			generate_category_permission(
				&pool,
				&visible,
				PostCategoryPermissionLevel::CommentVote,
				&PermissionAssignee::Space { id: space_id },
			)
			.await;
			let store = SqliteAccessStore::new(pool);

			let categories = vec![
				category(&store, &visible).await,
				category(&store, &hidden).await,
			];
			let permissioned =
				get_permissioned_categories(&store, &categories, Some(&user_id))
					.await
					.unwrap();
			assert_eq!(permissioned.len(), 1);
			assert_eq!(permissioned[0].category.id, visible);
			assert!(permissioned[0]
				.permissions
				.has(PostCategoryOperation::CommentPosts));
		}

		#[tokio::test]
		async fn test_anonymous_keeps_publicly_viewable_categories() {
			let pool = create_access_test_pool().await;
			let space_id = generate_space(&pool, false).await;
			let public_cat = generate_post_category(&pool, &space_id).await;
			let members_cat = generate_post_category(&pool, &space_id).await;
			generate_category_permission(
				&pool,
				&public_cat,
				PostCategoryPermissionLevel::View,
				&PermissionAssignee::Public,
			)
			.await;
			generate_category_permission(
				&pool,
				&members_cat,
				PostCategoryPermissionLevel::FullAccess,
				&PermissionAssignee::Space { id: space_id },
			)
			.await;
			let store = SqliteAccessStore::new(pool);

			let categories = vec![
				category(&store, &public_cat).await,
				category(&store, &members_cat).await,
			];
			let permissioned = get_permissioned_categories(&store, &categories, None)
				.await
				.unwrap();
			assert_eq!(permissioned.len(), 1);
			assert_eq!(permissioned[0].category.id, public_cat);
		}
	}
}
