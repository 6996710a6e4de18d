// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Pure aggregation of post category permissions.
//!
//! [`evaluate_category_permissions`] folds a category's stored grants into
//! one flag set for an actor. All inputs are pre-loaded; the function has no
//! side effects and never errors. Missing access shows up as empty flags.
//!
//! Precedence:
//! 1. Space admins receive every operation.
//! 2. Non-members (anonymous callers, outsiders, guests) receive the union
//!    of public grants only.
//! 3. Members holding a space-wide forum moderation grant receive the
//!    moderator mapping.
//! 4. Other members receive the union of grants addressed to them (their
//!    space, their roles, or public).
//!
//! A read-only space downgrade applies last, to every path.

use serde::{Deserialize, Serialize};

use crate::actor::ActorAttrs;
use crate::assignee::PermissionAssignee;
use crate::mapping::{PostCategoryPermissionFlags, PostCategoryPermissionLevel};
use crate::types::{PermissionId, PostCategoryId};

/// A stored permission grant on a post category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPermissionGrant {
	pub id: PermissionId,
	pub post_category_id: PostCategoryId,
	pub permission_level: PostCategoryPermissionLevel,
	pub assignee: PermissionAssignee,
}

/// Compute the aggregated category flags for one actor.
///
/// `rows` must contain only grants for the category under evaluation;
/// `has_space_wide_moderator` reflects a `moderate_forums` grant at the
/// space level; `readonly` is the space's payment-tier standing.
#[tracing::instrument(level = "debug", skip(actor, rows), fields(rows = rows.len()))]
pub fn evaluate_category_permissions(
	actor: &ActorAttrs,
	rows: &[CategoryPermissionGrant],
	has_space_wide_moderator: bool,
	readonly: bool,
) -> PostCategoryPermissionFlags {
	let flags = aggregate(actor, rows, has_space_wide_moderator);
	if readonly {
		flags.downgrade_to_readonly()
	} else {
		flags
	}
}

fn aggregate(
	actor: &ActorAttrs,
	rows: &[CategoryPermissionGrant],
	has_space_wide_moderator: bool,
) -> PostCategoryPermissionFlags {
	if actor.is_admin() {
		return PostCategoryPermissionFlags::full();
	}

	let mut flags = PostCategoryPermissionFlags::empty();

	// Guests and non-members only ever match public grants.
	if !actor.is_member() {
		for row in rows {
			if matches!(row.assignee, PermissionAssignee::Public) {
				flags.add_level(row.permission_level);
			}
		}
		return flags;
	}

	if has_space_wide_moderator {
		flags.add_level(PostCategoryPermissionLevel::Moderator);
		return flags;
	}

	for row in rows {
		if grant_applies(actor, &row.assignee) {
			flags.add_level(row.permission_level);
		}
	}
	flags
}

fn grant_applies(actor: &ActorAttrs, assignee: &PermissionAssignee) -> bool {
	match assignee {
		PermissionAssignee::Public => true,
		// Cross-space rows are inert, a failsafe against bad data.
		PermissionAssignee::Space { id } => {
			actor.space_role.map(|r| r.space_id) == Some(*id)
		}
		PermissionAssignee::Role { id } => actor.holds_role(*id),
		// These shapes are never stored against categories.
		PermissionAssignee::User { .. }
		| PermissionAssignee::SpaceMember
		| PermissionAssignee::AllReviewers => false,
	}
}
