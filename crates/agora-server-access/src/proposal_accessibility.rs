// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Space-wide proposal accessibility queries.
//!
//! [`get_accessible_proposal_ids`] loads every proposal in a space with its
//! evaluation tree in one pass, resolves the requesting actor once, and
//! filters through [`evaluate_proposal_access`].

use agora_access_core::{evaluate_proposal_access, ProposalId, SpaceId, UserId};

use crate::error::Result;
use crate::membership::resolve_membership;
use crate::store::AccessStore;

/// Parameters for a proposal accessibility query.
#[derive(Debug, Clone)]
pub struct ProposalAccessQuery {
	pub space_id: SpaceId,
	/// `None` evaluates the space as an anonymous caller.
	pub user_id: Option<UserId>,
	/// Restrict the result to proposals where the caller is the author or a
	/// current-step reviewer.
	pub only_assigned: bool,
}

/// Return the ids of proposals the caller may see, in storage order.
///
/// # Errors
/// Returns `AccessError::InvalidInput` when the space does not exist.
#[tracing::instrument(level = "debug", skip(store, query), fields(space_id = %query.space_id, only_assigned = query.only_assigned))]
pub async fn get_accessible_proposal_ids(
	store: &dyn AccessStore,
	query: &ProposalAccessQuery,
) -> Result<Vec<ProposalId>> {
	let membership =
		resolve_membership(store, &query.space_id, query.user_id.as_ref(), None).await?;
	let proposals = store.list_proposals_in_space(&query.space_id).await?;

	let ids = proposals
		.iter()
		.filter(|proposal| {
			evaluate_proposal_access(proposal, &membership.actor).permits(query.only_assigned)
		})
		.map(|proposal| proposal.id)
		.collect();
	Ok(ids)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::repository::SqliteAccessStore;
	use crate::testing::*;
	use agora_access_core::{
		AccessError, EvaluationOperation, EvaluationOutcome, PermissionAssignee, ProposalStatus,
		ReviewerAssignee,
	};

	fn query(space_id: SpaceId, user_id: Option<UserId>, only_assigned: bool) -> ProposalAccessQuery {
		ProposalAccessQuery {
			space_id,
			user_id,
			only_assigned,
		}
	}

	#[tokio::test]
	async fn test_unknown_space_is_invalid_input() {
		let pool = create_access_test_pool().await;
		let store = SqliteAccessStore::new(pool);

		let result =
			get_accessible_proposal_ids(&store, &query(SpaceId::generate(), None, false)).await;
		assert!(matches!(
			result,
			Err(crate::error::AccessServerError::Access(
				AccessError::InvalidInput(_)
			))
		));
	}

	#[tokio::test]
	async fn test_admin_sees_every_proposal_in_the_space() {
		let pool = create_access_test_pool().await;
		let space_id = generate_space(&pool, false).await;
		let admin_id = generate_space_user(&pool, &space_id, true, false).await;
		let author_id = generate_space_user(&pool, &space_id, false, false).await;
		let draft =
			generate_proposal(&pool, &space_id, &author_id, ProposalStatus::Draft).await;
		let published =
			generate_proposal(&pool, &space_id, &author_id, ProposalStatus::Published).await;
		let store = SqliteAccessStore::new(pool);

		let mut ids =
			get_accessible_proposal_ids(&store, &query(space_id, Some(admin_id), false))
				.await
				.unwrap();
		ids.sort_by_key(|id| id.to_string());
		let mut expected = vec![draft, published];
		expected.sort_by_key(|id| id.to_string());
		assert_eq!(ids, expected);
	}

	#[tokio::test]
	async fn test_drafts_are_author_only() {
		let pool = create_access_test_pool().await;
		let space_id = generate_space(&pool, false).await;
		let author_id = generate_space_user(&pool, &space_id, false, false).await;
		let other_id = generate_space_user(&pool, &space_id, false, false).await;
		let draft =
			generate_proposal(&pool, &space_id, &author_id, ProposalStatus::Draft).await;
		let store = SqliteAccessStore::new(pool);

		let author_view =
			get_accessible_proposal_ids(&store, &query(space_id, Some(author_id), false))
				.await
				.unwrap();
		assert_eq!(author_view, vec![draft]);

		let other_view =
			get_accessible_proposal_ids(&store, &query(space_id, Some(other_id), false))
				.await
				.unwrap();
		assert!(other_view.is_empty());
	}

	#[tokio::test]
	async fn test_current_step_reviewer_sees_the_proposal() {
		let pool = create_access_test_pool().await;
		let space_id = generate_space(&pool, false).await;
		let author_id = generate_space_user(&pool, &space_id, false, false).await;
		let reviewer_id = generate_space_user(&pool, &space_id, false, false).await;
		let bystander_id = generate_space_user(&pool, &space_id, false, false).await;
		let proposal_id =
			generate_proposal(&pool, &space_id, &author_id, ProposalStatus::Published).await;
		let passed = generate_evaluation(&pool, &proposal_id, 0, Some(EvaluationOutcome::Pass))
			.await;
		generate_evaluation_reviewer(
			&pool,
			&passed,
			&ReviewerAssignee::User { id: bystander_id },
		)
		.await;
		let current = generate_evaluation(&pool, &proposal_id, 1, None).await;
		generate_evaluation_reviewer(
			&pool,
			&current,
			&ReviewerAssignee::User { id: reviewer_id },
		)
		.await;
		let store = SqliteAccessStore::new(pool);

		let reviewer_view =
			get_accessible_proposal_ids(&store, &query(space_id, Some(reviewer_id), true))
				.await
				.unwrap();
		assert_eq!(reviewer_view, vec![proposal_id]);

		// The step-0 reviewer already resolved their step; with
		// only_assigned they no longer qualify.
		let bystander_view =
			get_accessible_proposal_ids(&store, &query(space_id, Some(bystander_id), true))
				.await
				.unwrap();
		assert!(bystander_view.is_empty());
	}

	#[tokio::test]
	async fn test_only_assigned_excludes_view_grant_holders() {
		let pool = create_access_test_pool().await;
		let space_id = generate_space(&pool, false).await;
		let author_id = generate_space_user(&pool, &space_id, false, false).await;
		let member_id = generate_space_user(&pool, &space_id, false, false).await;
		let proposal_id =
			generate_proposal(&pool, &space_id, &author_id, ProposalStatus::Published).await;
		let current = generate_evaluation(&pool, &proposal_id, 0, None).await;
		generate_evaluation_permission(
			&pool,
			&current,
			&PermissionAssignee::SpaceMember,
			EvaluationOperation::View,
		)
		.await;
		let store = SqliteAccessStore::new(pool);

		let visible =
			get_accessible_proposal_ids(&store, &query(space_id, Some(member_id), false))
				.await
				.unwrap();
		assert_eq!(visible, vec![proposal_id]);

		let assigned =
			get_accessible_proposal_ids(&store, &query(space_id, Some(member_id), true))
				.await
				.unwrap();
		assert!(assigned.is_empty());
	}

	#[tokio::test]
	async fn test_anonymous_sees_public_view_grants_only() {
		let pool = create_access_test_pool().await;
		let space_id = generate_space(&pool, false).await;
		let author_id = generate_space_user(&pool, &space_id, false, false).await;
		let public_proposal =
			generate_proposal(&pool, &space_id, &author_id, ProposalStatus::Published).await;
		let public_step = generate_evaluation(&pool, &public_proposal, 0, None).await;
		generate_evaluation_permission(
			&pool,
			&public_step,
			&PermissionAssignee::Public,
			EvaluationOperation::View,
		)
		.await;
		let private_proposal =
			generate_proposal(&pool, &space_id, &author_id, ProposalStatus::Published).await;
		generate_evaluation(&pool, &private_proposal, 0, None).await;
		let store = SqliteAccessStore::new(pool);

		let ids = get_accessible_proposal_ids(&store, &query(space_id, None, false))
			.await
			.unwrap();
		assert_eq!(ids, vec![public_proposal]);
	}

	#[tokio::test]
	async fn test_proposals_from_other_spaces_are_excluded() {
		let pool = create_access_test_pool().await;
		let space_id = generate_space(&pool, false).await;
		let other_space = generate_space(&pool, false).await;
		let admin_id = generate_space_user(&pool, &space_id, true, false).await;
		let foreign_author = generate_space_user(&pool, &other_space, false, false).await;
		generate_proposal(&pool, &other_space, &foreign_author, ProposalStatus::Published)
			.await;
		let store = SqliteAccessStore::new(pool);

		let ids = get_accessible_proposal_ids(&store, &query(space_id, Some(admin_id), false))
			.await
			.unwrap();
		assert!(ids.is_empty());
	}
}
