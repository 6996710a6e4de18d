// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Space membership resolution.
//!
//! Every storage-backed evaluation starts here: the requesting user is
//! turned into an [`ActorAttrs`] snapshot plus the space's readonly flag,
//! and the pure policies take it from there.

use agora_access_core::{AccessError, ActorAttrs, SpaceId, UserId};

use crate::error::Result;
use crate::store::AccessStore;

/// A resolved actor within a space, paired with the space's payment
/// standing.
#[derive(Debug, Clone)]
pub struct SpaceMembership {
	pub actor: ActorAttrs,
	/// True when the space has been downgraded to read-only access.
	pub readonly: bool,
}

/// Resolve the requesting user's standing within a space.
///
/// `pre_computed` lets callers that already resolved the actor (batch
/// paths, middleware) skip the membership and role queries; the space
/// row is still fetched so the readonly flag stays authoritative.
///
/// # Errors
/// Returns `AccessError::InvalidInput` when the space does not exist.
#[tracing::instrument(level = "debug", skip(store, pre_computed), fields(space_id = %space_id))]
pub async fn resolve_membership(
	store: &dyn AccessStore,
	space_id: &SpaceId,
	user_id: Option<&UserId>,
	pre_computed: Option<&ActorAttrs>,
) -> Result<SpaceMembership> {
	let space = store
		.get_space(space_id)
		.await?
		.ok_or_else(|| AccessError::InvalidInput(format!("space not found: {space_id}")))?;

	if let Some(actor) = pre_computed {
		return Ok(SpaceMembership {
			actor: actor.clone(),
			readonly: space.readonly,
		});
	}

	let actor = match user_id {
		None => ActorAttrs::anonymous(),
		Some(user_id) => match store.get_space_role(space_id, user_id).await? {
			None => ActorAttrs::outsider(*user_id),
			Some(space_role) => {
				let role_ids = store.list_role_ids_for_user(space_id, user_id).await?;
				ActorAttrs::member(space_role, role_ids)
			}
		},
	};

	Ok(SpaceMembership {
		actor,
		readonly: space.readonly,
	})
}
