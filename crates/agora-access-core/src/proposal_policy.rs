// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Pure evaluation of proposal visibility and assignment.
//!
//! A proposal moves through ordered evaluation steps. Each step carries its
//! own reviewers and permission grants; the step whose stored result is
//! still empty is the current step, and only the current step's reviewers
//! and grants open the proposal to non-authors.
//!
//! [`evaluate_proposal_access`] answers two questions at once: can the actor
//! see the proposal at all, and is the actor assigned to it (author or
//! current-step reviewer). All inputs are pre-loaded; the function has no
//! side effects and never errors.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::actor::ActorAttrs;
use crate::assignee::{PermissionAssignee, ReviewerAssignee};
use crate::types::{EvaluationId, EvaluationOutcome, ProposalId, ProposalStatus, SpaceId, UserId};

// =============================================================================
// Evaluation Step Attributes
// =============================================================================

/// Operations grantable on an evaluation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationOperation {
	View,
	Comment,
	Edit,
}

impl fmt::Display for EvaluationOperation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			EvaluationOperation::View => write!(f, "view"),
			EvaluationOperation::Comment => write!(f, "comment"),
			EvaluationOperation::Edit => write!(f, "edit"),
		}
	}
}

/// A permission grant scoped to one evaluation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationPermissionGrant {
	pub assignee: PermissionAssignee,
	pub operation: EvaluationOperation,
}

/// One evaluation step of a proposal, with its reviewers and grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationAttrs {
	pub id: EvaluationId,
	/// Position in the proposal's step sequence.
	pub index: u32,
	/// `None` while the step is awaiting review.
	pub result: Option<EvaluationOutcome>,
	pub reviewers: Vec<ReviewerAssignee>,
	pub permissions: Vec<EvaluationPermissionGrant>,
}

/// Everything the policy needs to know about one proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalAttrs {
	pub id: ProposalId,
	pub space_id: SpaceId,
	pub created_by: UserId,
	pub status: ProposalStatus,
	pub evaluations: Vec<EvaluationAttrs>,
}

impl ProposalAttrs {
	/// The step currently awaiting review: the lowest-index step without a
	/// recorded result.
	pub fn current_evaluation(&self) -> Option<&EvaluationAttrs> {
		self.evaluations
			.iter()
			.filter(|e| e.result.is_none())
			.min_by_key(|e| e.index)
	}
}

// =============================================================================
// Access Decision
// =============================================================================

/// The outcome of evaluating one proposal for one actor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalAccess {
	/// The actor may see the proposal.
	pub visible: bool,
	/// The actor is the author or a current-step reviewer.
	pub assigned: bool,
}

impl ProposalAccess {
	/// No access.
	pub fn none() -> Self {
		Self::default()
	}

	/// Returns true if this decision admits the proposal into a result set,
	/// optionally narrowed to assigned proposals.
	pub fn permits(&self, only_assigned: bool) -> bool {
		self.visible && (!only_assigned || self.assigned)
	}
}

/// Evaluate one actor's access to one proposal.
#[tracing::instrument(
	level = "debug",
	skip(proposal, actor),
	fields(proposal_id = %proposal.id)
)]
pub fn evaluate_proposal_access(proposal: &ProposalAttrs, actor: &ActorAttrs) -> ProposalAccess {
	let is_author = actor.user_id == Some(proposal.created_by);
	let is_current_reviewer = proposal
		.current_evaluation()
		.map(|step| reviews_step(actor, proposal.space_id, step))
		.unwrap_or(false);

	// Admin standing only counts within the proposal's own space.
	let is_admin =
		actor.is_admin() && actor.space_role.map(|r| r.space_id) == Some(proposal.space_id);
	if is_admin {
		return ProposalAccess {
			visible: true,
			assigned: is_author || is_current_reviewer,
		};
	}

	if is_author {
		return ProposalAccess {
			visible: true,
			assigned: true,
		};
	}

	// Drafts stay private to the author, overriding every stored grant.
	if proposal.status == ProposalStatus::Draft {
		return ProposalAccess::none();
	}

	if is_current_reviewer {
		return ProposalAccess {
			visible: true,
			assigned: true,
		};
	}

	let Some(step) = proposal.current_evaluation() else {
		return ProposalAccess::none();
	};

	let can_view = step
		.permissions
		.iter()
		.filter(|grant| grant.operation == EvaluationOperation::View)
		.any(|grant| view_grant_applies(actor, proposal, &grant.assignee));

	if can_view {
		return ProposalAccess {
			visible: true,
			assigned: false,
		};
	}

	ProposalAccess::none()
}

fn is_member_of(actor: &ActorAttrs, space_id: SpaceId) -> bool {
	actor
		.space_role
		.map(|r| !r.is_guest && r.space_id == space_id)
		.unwrap_or(false)
}

fn reviews_step(actor: &ActorAttrs, space_id: SpaceId, step: &EvaluationAttrs) -> bool {
	step.reviewers.iter().any(|reviewer| match reviewer {
		ReviewerAssignee::User { id } => actor.user_id == Some(*id),
		ReviewerAssignee::Role { id } => actor.holds_role(*id),
		ReviewerAssignee::SpaceMember => is_member_of(actor, space_id),
	})
}

/// Reviewer standing across every step, resolved and current alike. Matches
/// by user id or role; `space_member` reviewers are scoped to their own step
/// and do not widen `all_reviewers`.
fn is_reviewer_on_any_step(actor: &ActorAttrs, proposal: &ProposalAttrs) -> bool {
	proposal.evaluations.iter().any(|step| {
		step.reviewers.iter().any(|reviewer| match reviewer {
			ReviewerAssignee::User { id } => actor.user_id == Some(*id),
			ReviewerAssignee::Role { id } => actor.holds_role(*id),
			ReviewerAssignee::SpaceMember => false,
		})
	})
}

fn view_grant_applies(
	actor: &ActorAttrs,
	proposal: &ProposalAttrs,
	assignee: &PermissionAssignee,
) -> bool {
	match assignee {
		PermissionAssignee::Public => true,
		PermissionAssignee::User { id } => actor.user_id == Some(*id),
		PermissionAssignee::Role { id } => actor.holds_role(*id),
		PermissionAssignee::SpaceMember => is_member_of(actor, proposal.space_id),
		PermissionAssignee::AllReviewers => is_reviewer_on_any_step(actor, proposal),
		// Space-shaped grants are never stored against evaluation steps.
		PermissionAssignee::Space { .. } => false,
	}
}
