// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core type definitions for the access control system.
//!
//! This module defines the foundational types used throughout the access
//! engine:
//!
//! - **ID newtypes**: Type-safe wrappers around UUIDs for different entity
//!   types ([`UserId`], [`SpaceId`], [`RoleId`], etc.) preventing accidental
//!   mixing
//! - **Membership records**: A user's standing within a space ([`SpaceRole`])
//! - **Proposal lifecycle**: Publication state ([`ProposalStatus`]) and
//!   evaluation step outcomes ([`EvaluationOutcome`])
//!
//! All ID types implement transparent serde serialization (as UUID strings)
//! and provide conversion to/from [`uuid::Uuid`].

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(Uuid);

		impl $name {
			/// Create a new ID from a UUID.
			pub fn new(id: Uuid) -> Self {
				Self(id)
			}

			/// Generate a new random ID.
			pub fn generate() -> Self {
				Self(Uuid::new_v4())
			}

			/// Get the inner UUID value.
			pub fn into_inner(self) -> Uuid {
				self.0
			}

			/// Get a reference to the inner UUID.
			pub fn as_uuid(&self) -> &Uuid {
				&self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<Uuid> for $name {
			fn from(id: Uuid) -> Self {
				Self(id)
			}
		}

		impl From<$name> for Uuid {
			fn from(id: $name) -> Self {
				id.0
			}
		}
	};
}

define_id_type!(UserId, "Unique identifier for a user.");
define_id_type!(SpaceId, "Unique identifier for a space.");
define_id_type!(RoleId, "Unique identifier for a space role group.");
define_id_type!(PostCategoryId, "Unique identifier for a post category.");
define_id_type!(ProposalId, "Unique identifier for a proposal.");
define_id_type!(EvaluationId, "Unique identifier for a proposal evaluation step.");
define_id_type!(PermissionId, "Unique identifier for a stored permission assignment.");

// =============================================================================
// Space Membership
// =============================================================================

/// A user's membership record within a space.
///
/// Absence of a record means the user is not a member. Guests hold a record
/// with `is_guest` set and receive only public-level access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceRole {
	pub user_id: UserId,
	pub space_id: SpaceId,
	pub is_admin: bool,
	pub is_guest: bool,
}

impl SpaceRole {
	/// Create a standard (non-admin, non-guest) membership.
	pub fn member(user_id: UserId, space_id: SpaceId) -> Self {
		Self {
			user_id,
			space_id,
			is_admin: false,
			is_guest: false,
		}
	}

	/// Create an admin membership.
	pub fn admin(user_id: UserId, space_id: SpaceId) -> Self {
		Self {
			user_id,
			space_id,
			is_admin: true,
			is_guest: false,
		}
	}

	/// Create a guest membership.
	pub fn guest(user_id: UserId, space_id: SpaceId) -> Self {
		Self {
			user_id,
			space_id,
			is_admin: false,
			is_guest: true,
		}
	}
}

// =============================================================================
// Proposal Lifecycle
// =============================================================================

/// Publication state of a proposal.
///
/// Drafts are visible only to their author and space admins, regardless of
/// any reviewer or step permission grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
	Draft,
	Published,
}

impl fmt::Display for ProposalStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ProposalStatus::Draft => write!(f, "draft"),
			ProposalStatus::Published => write!(f, "published"),
		}
	}
}

/// Recorded outcome of a resolved evaluation step.
///
/// A step's stored result is `Option<EvaluationOutcome>`; `None` marks the
/// step as current (awaiting review).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationOutcome {
	Pass,
	Fail,
}

impl fmt::Display for EvaluationOutcome {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			EvaluationOutcome::Pass => write!(f, "pass"),
			EvaluationOutcome::Fail => write!(f, "fail"),
		}
	}
}
