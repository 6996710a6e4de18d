// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Permission levels and their operation mappings.
//!
//! A stored grant carries a single [`PostCategoryPermissionLevel`]; the
//! tables here expand each level into the concrete category-scoped and
//! post-scoped operations it confers. The mappings are total: every level
//! maps to a fixed operation set, with `custom` mapping to nothing.
//!
//! Aggregated grants are carried as flag structs
//! ([`PostCategoryPermissionFlags`], [`PostPermissionFlags`]) that serialize
//! as plain `{ operation: bool }` objects.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Permission Levels
// =============================================================================

/// Permission level attached to a stored category grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostCategoryPermissionLevel {
	/// Full control of the category, including permission management.
	CategoryAdmin,
	/// Content moderation across the category.
	Moderator,
	/// Create posts, comment, and vote.
	FullAccess,
	/// Comment and vote on existing posts.
	CommentVote,
	/// Read-only access.
	View,
	/// Placeholder for externally-managed grants; confers nothing.
	Custom,
}

impl PostCategoryPermissionLevel {
	/// Returns all permission levels.
	pub fn all() -> &'static [PostCategoryPermissionLevel] {
		&[
			PostCategoryPermissionLevel::CategoryAdmin,
			PostCategoryPermissionLevel::Moderator,
			PostCategoryPermissionLevel::FullAccess,
			PostCategoryPermissionLevel::CommentVote,
			PostCategoryPermissionLevel::View,
			PostCategoryPermissionLevel::Custom,
		]
	}

	/// Returns true if this level can be assigned through the writer API.
	///
	/// `category_admin` and `moderator` are computed from space-level
	/// standing rather than assigned directly; `custom` is reserved for
	/// external management.
	pub fn is_assignable(&self) -> bool {
		matches!(
			self,
			PostCategoryPermissionLevel::FullAccess
				| PostCategoryPermissionLevel::CommentVote
				| PostCategoryPermissionLevel::View
		)
	}

	/// Category-scoped operations conferred by this level.
	pub fn category_operations(&self) -> &'static [PostCategoryOperation] {
		match self {
			PostCategoryPermissionLevel::CategoryAdmin => PostCategoryOperation::all(),
			PostCategoryPermissionLevel::Moderator | PostCategoryPermissionLevel::FullAccess => &[
				PostCategoryOperation::CreatePost,
				PostCategoryOperation::CommentPosts,
				PostCategoryOperation::ViewPosts,
			],
			PostCategoryPermissionLevel::CommentVote => &[
				PostCategoryOperation::CommentPosts,
				PostCategoryOperation::ViewPosts,
			],
			PostCategoryPermissionLevel::View => &[PostCategoryOperation::ViewPosts],
			PostCategoryPermissionLevel::Custom => &[],
		}
	}

	/// Post-scoped operations conferred by this level.
	pub fn post_operations(&self) -> &'static [PostOperation] {
		match self {
			PostCategoryPermissionLevel::CategoryAdmin => PostOperation::all(),
			// Moderators act on any post except rewriting its content.
			PostCategoryPermissionLevel::Moderator => &[
				PostOperation::DeletePost,
				PostOperation::ViewPost,
				PostOperation::AddComment,
				PostOperation::DeleteComments,
				PostOperation::PinPost,
				PostOperation::LockPost,
				PostOperation::Upvote,
				PostOperation::Downvote,
			],
			PostCategoryPermissionLevel::FullAccess | PostCategoryPermissionLevel::CommentVote => &[
				PostOperation::ViewPost,
				PostOperation::AddComment,
				PostOperation::Upvote,
				PostOperation::Downvote,
			],
			PostCategoryPermissionLevel::View => &[PostOperation::ViewPost],
			PostCategoryPermissionLevel::Custom => &[],
		}
	}
}

impl fmt::Display for PostCategoryPermissionLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PostCategoryPermissionLevel::CategoryAdmin => write!(f, "category_admin"),
			PostCategoryPermissionLevel::Moderator => write!(f, "moderator"),
			PostCategoryPermissionLevel::FullAccess => write!(f, "full_access"),
			PostCategoryPermissionLevel::CommentVote => write!(f, "comment_vote"),
			PostCategoryPermissionLevel::View => write!(f, "view"),
			PostCategoryPermissionLevel::Custom => write!(f, "custom"),
		}
	}
}

// =============================================================================
// Operations
// =============================================================================

/// Operations scoped to a post category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostCategoryOperation {
	CreatePost,
	EditCategory,
	DeleteCategory,
	ManagePermissions,
	CommentPosts,
	ViewPosts,
}

impl PostCategoryOperation {
	/// Returns all category-scoped operations.
	pub fn all() -> &'static [PostCategoryOperation] {
		&[
			PostCategoryOperation::CreatePost,
			PostCategoryOperation::EditCategory,
			PostCategoryOperation::DeleteCategory,
			PostCategoryOperation::ManagePermissions,
			PostCategoryOperation::CommentPosts,
			PostCategoryOperation::ViewPosts,
		]
	}
}

impl fmt::Display for PostCategoryOperation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PostCategoryOperation::CreatePost => write!(f, "create_post"),
			PostCategoryOperation::EditCategory => write!(f, "edit_category"),
			PostCategoryOperation::DeleteCategory => write!(f, "delete_category"),
			PostCategoryOperation::ManagePermissions => write!(f, "manage_permissions"),
			PostCategoryOperation::CommentPosts => write!(f, "comment_posts"),
			PostCategoryOperation::ViewPosts => write!(f, "view_posts"),
		}
	}
}

/// Operations scoped to an individual post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostOperation {
	EditPost,
	DeletePost,
	ViewPost,
	AddComment,
	DeleteComments,
	PinPost,
	LockPost,
	Upvote,
	Downvote,
}

impl PostOperation {
	/// Returns all post-scoped operations.
	pub fn all() -> &'static [PostOperation] {
		&[
			PostOperation::EditPost,
			PostOperation::DeletePost,
			PostOperation::ViewPost,
			PostOperation::AddComment,
			PostOperation::DeleteComments,
			PostOperation::PinPost,
			PostOperation::LockPost,
			PostOperation::Upvote,
			PostOperation::Downvote,
		]
	}
}

impl fmt::Display for PostOperation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PostOperation::EditPost => write!(f, "edit_post"),
			PostOperation::DeletePost => write!(f, "delete_post"),
			PostOperation::ViewPost => write!(f, "view_post"),
			PostOperation::AddComment => write!(f, "add_comment"),
			PostOperation::DeleteComments => write!(f, "delete_comments"),
			PostOperation::PinPost => write!(f, "pin_post"),
			PostOperation::LockPost => write!(f, "lock_post"),
			PostOperation::Upvote => write!(f, "upvote"),
			PostOperation::Downvote => write!(f, "downvote"),
		}
	}
}

// =============================================================================
// Aggregated Flags
// =============================================================================

/// Aggregated category-scoped grants for one actor and category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostCategoryPermissionFlags {
	pub create_post: bool,
	pub edit_category: bool,
	pub delete_category: bool,
	pub manage_permissions: bool,
	pub comment_posts: bool,
	pub view_posts: bool,
}

impl PostCategoryPermissionFlags {
	/// No operations granted.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Every operation granted.
	pub fn full() -> Self {
		let mut flags = Self::empty();
		for op in PostCategoryOperation::all() {
			flags.add(*op);
		}
		flags
	}

	/// Returns true if no operation is granted.
	pub fn is_empty(&self) -> bool {
		*self == Self::empty()
	}

	/// Returns true if the given operation is granted.
	pub fn has(&self, operation: PostCategoryOperation) -> bool {
		match operation {
			PostCategoryOperation::CreatePost => self.create_post,
			PostCategoryOperation::EditCategory => self.edit_category,
			PostCategoryOperation::DeleteCategory => self.delete_category,
			PostCategoryOperation::ManagePermissions => self.manage_permissions,
			PostCategoryOperation::CommentPosts => self.comment_posts,
			PostCategoryOperation::ViewPosts => self.view_posts,
		}
	}

	/// Grant a single operation. Grants are additive and idempotent.
	pub fn add(&mut self, operation: PostCategoryOperation) {
		match operation {
			PostCategoryOperation::CreatePost => self.create_post = true,
			PostCategoryOperation::EditCategory => self.edit_category = true,
			PostCategoryOperation::DeleteCategory => self.delete_category = true,
			PostCategoryOperation::ManagePermissions => self.manage_permissions = true,
			PostCategoryOperation::CommentPosts => self.comment_posts = true,
			PostCategoryOperation::ViewPosts => self.view_posts = true,
		}
	}

	/// Grant every operation conferred by a permission level.
	pub fn add_level(&mut self, level: PostCategoryPermissionLevel) {
		for op in level.category_operations() {
			self.add(*op);
		}
	}

	/// The granted operations, in declaration order.
	pub fn operations(&self) -> Vec<PostCategoryOperation> {
		PostCategoryOperation::all()
			.iter()
			.copied()
			.filter(|op| self.has(*op))
			.collect()
	}

	/// Strip everything except the view operation.
	///
	/// Applied when the containing space is in read-only standing; the
	/// downgrade applies after every other grant, admins included.
	pub fn downgrade_to_readonly(&self) -> Self {
		Self {
			view_posts: self.view_posts,
			..Self::empty()
		}
	}
}

/// Aggregated post-scoped grants for one actor and category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPermissionFlags {
	pub edit_post: bool,
	pub delete_post: bool,
	pub view_post: bool,
	pub add_comment: bool,
	pub delete_comments: bool,
	pub pin_post: bool,
	pub lock_post: bool,
	pub upvote: bool,
	pub downvote: bool,
}

impl PostPermissionFlags {
	/// No operations granted.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Every operation granted.
	pub fn full() -> Self {
		let mut flags = Self::empty();
		for op in PostOperation::all() {
			flags.add(*op);
		}
		flags
	}

	/// Returns true if no operation is granted.
	pub fn is_empty(&self) -> bool {
		*self == Self::empty()
	}

	/// Returns true if the given operation is granted.
	pub fn has(&self, operation: PostOperation) -> bool {
		match operation {
			PostOperation::EditPost => self.edit_post,
			PostOperation::DeletePost => self.delete_post,
			PostOperation::ViewPost => self.view_post,
			PostOperation::AddComment => self.add_comment,
			PostOperation::DeleteComments => self.delete_comments,
			PostOperation::PinPost => self.pin_post,
			PostOperation::LockPost => self.lock_post,
			PostOperation::Upvote => self.upvote,
			PostOperation::Downvote => self.downvote,
		}
	}

	/// Grant a single operation. Grants are additive and idempotent.
	pub fn add(&mut self, operation: PostOperation) {
		match operation {
			PostOperation::EditPost => self.edit_post = true,
			PostOperation::DeletePost => self.delete_post = true,
			PostOperation::ViewPost => self.view_post = true,
			PostOperation::AddComment => self.add_comment = true,
			PostOperation::DeleteComments => self.delete_comments = true,
			PostOperation::PinPost => self.pin_post = true,
			PostOperation::LockPost => self.lock_post = true,
			PostOperation::Upvote => self.upvote = true,
			PostOperation::Downvote => self.downvote = true,
		}
	}

	/// Grant every operation conferred by a permission level.
	pub fn add_level(&mut self, level: PostCategoryPermissionLevel) {
		for op in level.post_operations() {
			self.add(*op);
		}
	}

	/// The granted operations, in declaration order.
	pub fn operations(&self) -> Vec<PostOperation> {
		PostOperation::all()
			.iter()
			.copied()
			.filter(|op| self.has(*op))
			.collect()
	}

	/// Strip everything except the view operation.
	pub fn downgrade_to_readonly(&self) -> Self {
		Self {
			view_post: self.view_post,
			..Self::empty()
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn arb_level() -> impl Strategy<Value = PostCategoryPermissionLevel> {
		prop::sample::select(PostCategoryPermissionLevel::all().to_vec())
	}

	mod level_mappings {
		use super::*;

		#[test]
		fn category_admin_confers_everything() {
			let mut category = PostCategoryPermissionFlags::empty();
			category.add_level(PostCategoryPermissionLevel::CategoryAdmin);
			assert_eq!(category, PostCategoryPermissionFlags::full());

			let mut post = PostPermissionFlags::empty();
			post.add_level(PostCategoryPermissionLevel::CategoryAdmin);
			assert_eq!(post, PostPermissionFlags::full());
		}

		#[test]
		fn moderator_cannot_edit_category_or_posts() {
			let mut category = PostCategoryPermissionFlags::empty();
			category.add_level(PostCategoryPermissionLevel::Moderator);
			assert!(category.create_post);
			assert!(category.comment_posts);
			assert!(category.view_posts);
			assert!(!category.edit_category);
			assert!(!category.delete_category);
			assert!(!category.manage_permissions);

			let mut post = PostPermissionFlags::empty();
			post.add_level(PostCategoryPermissionLevel::Moderator);
			assert!(!post.edit_post);
			assert!(post.delete_post);
			assert!(post.delete_comments);
			assert!(post.pin_post);
			assert!(post.lock_post);
		}

		#[test]
		fn full_access_grants_member_post_operations() {
			let mut post = PostPermissionFlags::empty();
			post.add_level(PostCategoryPermissionLevel::FullAccess);
			assert_eq!(
				post.operations(),
				vec![
					PostOperation::ViewPost,
					PostOperation::AddComment,
					PostOperation::Upvote,
					PostOperation::Downvote,
				]
			);
		}

		#[test]
		fn comment_vote_cannot_create_posts() {
			let mut category = PostCategoryPermissionFlags::empty();
			category.add_level(PostCategoryPermissionLevel::CommentVote);
			assert!(!category.create_post);
			assert!(category.comment_posts);
			assert!(category.view_posts);
		}

		#[test]
		fn view_is_read_only() {
			let mut category = PostCategoryPermissionFlags::empty();
			category.add_level(PostCategoryPermissionLevel::View);
			assert_eq!(category.operations(), vec![PostCategoryOperation::ViewPosts]);

			let mut post = PostPermissionFlags::empty();
			post.add_level(PostCategoryPermissionLevel::View);
			assert_eq!(post.operations(), vec![PostOperation::ViewPost]);
		}

		#[test]
		fn custom_confers_nothing() {
			let mut category = PostCategoryPermissionFlags::empty();
			category.add_level(PostCategoryPermissionLevel::Custom);
			assert!(category.is_empty());

			let mut post = PostPermissionFlags::empty();
			post.add_level(PostCategoryPermissionLevel::Custom);
			assert!(post.is_empty());
		}

		#[test]
		fn only_member_levels_are_assignable() {
			assert!(!PostCategoryPermissionLevel::CategoryAdmin.is_assignable());
			assert!(!PostCategoryPermissionLevel::Moderator.is_assignable());
			assert!(PostCategoryPermissionLevel::FullAccess.is_assignable());
			assert!(PostCategoryPermissionLevel::CommentVote.is_assignable());
			assert!(PostCategoryPermissionLevel::View.is_assignable());
			assert!(!PostCategoryPermissionLevel::Custom.is_assignable());
		}

		#[test]
		fn level_serializes_snake_case() {
			let json = serde_json::to_string(&PostCategoryPermissionLevel::FullAccess).unwrap();
			assert_eq!(json, "\"full_access\"");
		}
	}

	mod flags {
		use super::*;

		#[test]
		fn empty_grants_nothing() {
			let flags = PostCategoryPermissionFlags::empty();
			for op in PostCategoryOperation::all() {
				assert!(!flags.has(*op));
			}
		}

		#[test]
		fn full_grants_everything() {
			let flags = PostPermissionFlags::full();
			for op in PostOperation::all() {
				assert!(flags.has(*op));
			}
		}

		#[test]
		fn readonly_downgrade_keeps_view_only() {
			let downgraded = PostCategoryPermissionFlags::full().downgrade_to_readonly();
			assert_eq!(downgraded.operations(), vec![PostCategoryOperation::ViewPosts]);

			let downgraded = PostPermissionFlags::full().downgrade_to_readonly();
			assert_eq!(downgraded.operations(), vec![PostOperation::ViewPost]);
		}

		#[test]
		fn readonly_downgrade_of_empty_stays_empty() {
			assert!(PostCategoryPermissionFlags::empty()
				.downgrade_to_readonly()
				.is_empty());
		}

		#[test]
		fn serializes_as_operation_booleans() {
			let mut flags = PostCategoryPermissionFlags::empty();
			flags.add(PostCategoryOperation::ViewPosts);
			let json = serde_json::to_value(&flags).unwrap();
			assert_eq!(json["view_posts"], true);
			assert_eq!(json["create_post"], false);
		}
	}

	proptest! {
		#[test]
		fn add_level_is_subset_of_full(level in arb_level()) {
			let mut category = PostCategoryPermissionFlags::empty();
			category.add_level(level);
			for op in category.operations() {
				prop_assert!(PostCategoryPermissionFlags::full().has(op));
			}
		}

		#[test]
		fn add_level_is_idempotent(level in arb_level()) {
			let mut once = PostPermissionFlags::empty();
			once.add_level(level);
			let mut twice = once;
			twice.add_level(level);
			prop_assert_eq!(once, twice);
		}

		#[test]
		fn add_is_monotonic(level in arb_level(), extra in prop::sample::select(PostOperation::all().to_vec())) {
			let mut flags = PostPermissionFlags::empty();
			flags.add_level(level);
			let before = flags.operations();
			flags.add(extra);
			for op in before {
				prop_assert!(flags.has(op));
			}
			prop_assert!(flags.has(extra));
		}

		#[test]
		fn downgrade_never_grants(level in arb_level()) {
			let mut flags = PostCategoryPermissionFlags::empty();
			flags.add_level(level);
			let downgraded = flags.downgrade_to_readonly();
			for op in downgraded.operations() {
				prop_assert!(flags.has(op));
				prop_assert_eq!(op, PostCategoryOperation::ViewPosts);
			}
		}

		#[test]
		fn flags_serde_roundtrip(level in arb_level()) {
			let mut flags = PostPermissionFlags::empty();
			flags.add_level(level);
			let json = serde_json::to_string(&flags).unwrap();
			let back: PostPermissionFlags = serde_json::from_str(&json).unwrap();
			prop_assert_eq!(flags, back);
		}
	}
}
