// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types and policies for the Agora access control system.
//!
//! This crate provides the shared domain model and the pure evaluation
//! policies for forum post categories and governance proposals. It is used
//! by the server-side engines (`agora-server-access`); nothing here touches
//! storage.
//!
//! # Overview
//!
//! The access system supports:
//! - Typed permission assignees (users, roles, spaces, public, contextual
//!   groups) stored one shape per grant
//! - Permission levels expanded through static operation mappings
//! - Category permission aggregation with admin, moderator, and guest
//!   precedence and a read-only space downgrade
//! - Proposal visibility driven by ordered evaluation steps, their
//!   reviewers, and step-scoped permission grants
//!
//! # Design Principles
//!
//! - **Immutable evaluation**: policies take pre-loaded attribute structs
//!   and return decisions; no database access
//! - **Deny by default**: read paths express missing access as empty flag
//!   sets, never as errors
//!
//! # Example
//!
//! ```
//! use agora_access_core::{
//!     evaluate_category_permissions, ActorAttrs, CategoryPermissionGrant,
//!     PermissionAssignee, PostCategoryId, PostCategoryPermissionLevel,
//!     PermissionId, SpaceId, SpaceRole, UserId,
//! };
//!
//! let space_id = SpaceId::generate();
//! let actor = ActorAttrs::member(SpaceRole::member(UserId::generate(), space_id), vec![]);
//! let rows = [CategoryPermissionGrant {
//!     id: PermissionId::generate(),
//!     post_category_id: PostCategoryId::generate(),
//!     permission_level: PostCategoryPermissionLevel::FullAccess,
//!     assignee: PermissionAssignee::Space { id: space_id },
//! }];
//!
//! let flags = evaluate_category_permissions(&actor, &rows, false, false);
//! assert!(flags.create_post);
//! assert!(!flags.manage_permissions);
//! ```

pub mod actor;
pub mod assignee;
pub mod category_policy;
pub mod error;
pub mod mapping;
pub mod proposal_policy;
pub mod types;

pub use actor::ActorAttrs;
pub use assignee::{NotAReviewerGroup, PermissionAssignee, ReviewerAssignee};
pub use category_policy::{evaluate_category_permissions, CategoryPermissionGrant};
pub use error::{AccessError, Result};
pub use mapping::{
	PostCategoryOperation, PostCategoryPermissionFlags, PostCategoryPermissionLevel,
	PostOperation, PostPermissionFlags,
};
pub use proposal_policy::{
	evaluate_proposal_access, EvaluationAttrs, EvaluationOperation, EvaluationPermissionGrant,
	ProposalAccess, ProposalAttrs,
};
pub use types::{
	EvaluationId, EvaluationOutcome, PermissionId, PostCategoryId, ProposalId, ProposalStatus,
	RoleId, SpaceId, SpaceRole, UserId,
};
