// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Pre-loaded actor attributes for policy evaluation.
//!
//! Policies never touch storage. Callers resolve the actor's standing in a
//! space once (membership row plus confirmed role memberships) and hand the
//! result to every evaluation in the request. Batch engines build one
//! [`ActorAttrs`] and reuse it across items.

use serde::{Deserialize, Serialize};

use crate::types::{RoleId, SpaceRole, UserId};

/// Everything the policies need to know about the calling actor within one
/// space.
///
/// `user_id` is `None` for anonymous callers. `space_role` is `None` when the
/// user is not a member of the space under evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorAttrs {
	pub user_id: Option<UserId>,
	pub space_role: Option<SpaceRole>,
	pub role_ids: Vec<RoleId>,
}

impl ActorAttrs {
	/// An unauthenticated caller.
	pub fn anonymous() -> Self {
		Self::default()
	}

	/// An authenticated caller with no membership in the space.
	pub fn outsider(user_id: UserId) -> Self {
		Self {
			user_id: Some(user_id),
			space_role: None,
			role_ids: Vec::new(),
		}
	}

	/// A space member with the given membership row and confirmed roles.
	pub fn member(space_role: SpaceRole, role_ids: Vec<RoleId>) -> Self {
		Self {
			user_id: Some(space_role.user_id),
			space_role: Some(space_role),
			role_ids,
		}
	}

	/// Returns true if the actor is a space admin.
	pub fn is_admin(&self) -> bool {
		self.space_role.map(|r| r.is_admin).unwrap_or(false)
	}

	/// Returns true if the actor is a full (non-guest) member of the space.
	pub fn is_member(&self) -> bool {
		self.space_role.map(|r| !r.is_guest).unwrap_or(false)
	}

	/// Returns true if the actor holds a guest membership.
	pub fn is_guest(&self) -> bool {
		self.space_role.map(|r| r.is_guest).unwrap_or(false)
	}

	/// Returns true if the actor holds the given role.
	pub fn holds_role(&self, role_id: RoleId) -> bool {
		self.role_ids.contains(&role_id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::SpaceId;

	#[test]
	fn anonymous_has_no_standing() {
		let actor = ActorAttrs::anonymous();
		assert!(actor.user_id.is_none());
		assert!(!actor.is_admin());
		assert!(!actor.is_member());
		assert!(!actor.is_guest());
	}

	#[test]
	fn outsider_is_not_a_member() {
		let actor = ActorAttrs::outsider(UserId::generate());
		assert!(actor.user_id.is_some());
		assert!(!actor.is_member());
	}

	#[test]
	fn member_carries_user_id_from_role() {
		let role = SpaceRole::member(UserId::generate(), SpaceId::generate());
		let actor = ActorAttrs::member(role, vec![]);
		assert_eq!(actor.user_id, Some(role.user_id));
		assert!(actor.is_member());
		assert!(!actor.is_admin());
	}

	#[test]
	fn guest_is_not_a_full_member() {
		let role = SpaceRole::guest(UserId::generate(), SpaceId::generate());
		let actor = ActorAttrs::member(role, vec![]);
		assert!(actor.is_guest());
		assert!(!actor.is_member());
	}

	#[test]
	fn admin_is_also_a_member() {
		let role = SpaceRole::admin(UserId::generate(), SpaceId::generate());
		let actor = ActorAttrs::member(role, vec![]);
		assert!(actor.is_admin());
		assert!(actor.is_member());
	}

	#[test]
	fn holds_role_checks_confirmed_roles() {
		let role_id = RoleId::generate();
		let space_role = SpaceRole::member(UserId::generate(), SpaceId::generate());
		let actor = ActorAttrs::member(space_role, vec![role_id]);
		assert!(actor.holds_role(role_id));
		assert!(!actor.holds_role(RoleId::generate()));
	}
}
