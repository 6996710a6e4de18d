// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Permission assignee model.
//!
//! Every stored grant names exactly one assignee: a concrete principal (a
//! user, a role group, a whole space) or a contextual group resolved at
//! evaluation time (`public`, `space_member`, `all_reviewers`). The closed
//! enums here force every evaluation site to handle every shape.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{RoleId, SpaceId, UserId};

/// The assignee of a permission grant.
///
/// Serialized with a `group` tag, so a user grant reads as
/// `{"group":"user","id":"..."}` and a public grant as `{"group":"public"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "group", rename_all = "snake_case")]
pub enum PermissionAssignee {
	/// A single user.
	User { id: UserId },
	/// Every holder of a role group.
	Role { id: RoleId },
	/// Every member of a space.
	Space { id: SpaceId },
	/// Everyone, including unauthenticated callers.
	Public,
	/// Any non-guest member of the containing space.
	SpaceMember,
	/// Any reviewer of the containing proposal, across all steps.
	AllReviewers,
}

impl PermissionAssignee {
	/// The wire name of this assignee's group, for diagnostics.
	pub fn group(&self) -> &'static str {
		match self {
			PermissionAssignee::User { .. } => "user",
			PermissionAssignee::Role { .. } => "role",
			PermissionAssignee::Space { .. } => "space",
			PermissionAssignee::Public => "public",
			PermissionAssignee::SpaceMember => "space_member",
			PermissionAssignee::AllReviewers => "all_reviewers",
		}
	}
}

impl fmt::Display for PermissionAssignee {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PermissionAssignee::User { id } => write!(f, "user:{id}"),
			PermissionAssignee::Role { id } => write!(f, "role:{id}"),
			PermissionAssignee::Space { id } => write!(f, "space:{id}"),
			PermissionAssignee::Public => write!(f, "public"),
			PermissionAssignee::SpaceMember => write!(f, "space_member"),
			PermissionAssignee::AllReviewers => write!(f, "all_reviewers"),
		}
	}
}

/// Error returned when an assignee shape cannot act as a reviewer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("assignee group '{group}' cannot be a reviewer")]
pub struct NotAReviewerGroup {
	pub group: &'static str,
}

/// An evaluation step reviewer.
///
/// Reviewers are restricted to shapes that resolve to concrete people:
/// a user, a role group, or the space membership at large.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "group", rename_all = "snake_case")]
pub enum ReviewerAssignee {
	/// A single user.
	User { id: UserId },
	/// Every holder of a role group.
	Role { id: RoleId },
	/// Any non-guest member of the containing space.
	SpaceMember,
}

impl TryFrom<PermissionAssignee> for ReviewerAssignee {
	type Error = NotAReviewerGroup;

	fn try_from(assignee: PermissionAssignee) -> Result<Self, Self::Error> {
		match assignee {
			PermissionAssignee::User { id } => Ok(ReviewerAssignee::User { id }),
			PermissionAssignee::Role { id } => Ok(ReviewerAssignee::Role { id }),
			PermissionAssignee::SpaceMember => Ok(ReviewerAssignee::SpaceMember),
			other => Err(NotAReviewerGroup {
				group: other.group(),
			}),
		}
	}
}

impl From<ReviewerAssignee> for PermissionAssignee {
	fn from(reviewer: ReviewerAssignee) -> Self {
		match reviewer {
			ReviewerAssignee::User { id } => PermissionAssignee::User { id },
			ReviewerAssignee::Role { id } => PermissionAssignee::Role { id },
			ReviewerAssignee::SpaceMember => PermissionAssignee::SpaceMember,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	mod serialization {
		use super::*;

		#[test]
		fn user_serializes_with_group_tag() {
			let assignee = PermissionAssignee::User {
				id: UserId::generate(),
			};
			let json = serde_json::to_string(&assignee).unwrap();
			assert!(json.contains("\"group\":\"user\""), "got: {json}");
			assert!(json.contains("\"id\""), "got: {json}");
		}

		#[test]
		fn public_serializes_without_id() {
			let json = serde_json::to_string(&PermissionAssignee::Public).unwrap();
			assert_eq!(json, "{\"group\":\"public\"}");
		}

		#[test]
		fn space_member_roundtrips() {
			let json = "{\"group\":\"space_member\"}";
			let assignee: PermissionAssignee = serde_json::from_str(json).unwrap();
			assert_eq!(assignee, PermissionAssignee::SpaceMember);
		}

		#[test]
		fn all_reviewers_roundtrips() {
			let json = serde_json::to_string(&PermissionAssignee::AllReviewers).unwrap();
			let back: PermissionAssignee = serde_json::from_str(&json).unwrap();
			assert_eq!(back, PermissionAssignee::AllReviewers);
		}
	}

	mod reviewer_conversion {
		use super::*;

		#[test]
		fn user_converts_to_reviewer() {
			let id = UserId::generate();
			let reviewer = ReviewerAssignee::try_from(PermissionAssignee::User { id }).unwrap();
			assert_eq!(reviewer, ReviewerAssignee::User { id });
		}

		#[test]
		fn role_converts_to_reviewer() {
			let id = RoleId::generate();
			let reviewer = ReviewerAssignee::try_from(PermissionAssignee::Role { id }).unwrap();
			assert_eq!(reviewer, ReviewerAssignee::Role { id });
		}

		#[test]
		fn space_member_converts_to_reviewer() {
			let reviewer = ReviewerAssignee::try_from(PermissionAssignee::SpaceMember).unwrap();
			assert_eq!(reviewer, ReviewerAssignee::SpaceMember);
		}

		#[test]
		fn public_is_not_a_reviewer_group() {
			let err = ReviewerAssignee::try_from(PermissionAssignee::Public).unwrap_err();
			assert_eq!(err.group, "public");
		}

		#[test]
		fn space_is_not_a_reviewer_group() {
			let err = ReviewerAssignee::try_from(PermissionAssignee::Space {
				id: SpaceId::generate(),
			})
			.unwrap_err();
			assert_eq!(err.group, "space");
		}

		#[test]
		fn all_reviewers_is_not_a_reviewer_group() {
			let err = ReviewerAssignee::try_from(PermissionAssignee::AllReviewers).unwrap_err();
			assert_eq!(err.group, "all_reviewers");
		}

		#[test]
		fn reviewer_back_to_assignee_preserves_shape() {
			let id = UserId::generate();
			let assignee: PermissionAssignee = ReviewerAssignee::User { id }.into();
			assert_eq!(assignee, PermissionAssignee::User { id });
		}
	}
}
