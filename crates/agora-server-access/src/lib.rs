// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Access evaluation server implementation for Agora.
//!
//! This crate provides the storage-backed side of the access system,
//! including SQLite persistence, membership resolution, category permission
//! aggregation, validated permission writes, and proposal accessibility
//! queries.
//!
//! # Architecture
//!
//! - `store` - Storage trait the engines evaluate against
//! - `repository` - SQLite implementation of the store
//! - `membership` - Actor resolution within a space
//! - `category_permissions` - Single and batch category permission queries
//! - `permission_writer` - Validated writes to the category grant table
//! - `proposal_accessibility` - Space-wide proposal visibility queries
//!
//! # Example
//!
//! ```ignore
//! use agora_server_access::{
//!     compute_post_category_permissions, create_pool, SqliteAccessStore,
//! };
//!
//! let pool = create_pool("sqlite:./agora.db").await?;
//! let store = SqliteAccessStore::new(pool);
//!
//! let flags = compute_post_category_permissions(&store, &category_id, Some(&user_id)).await?;
//! if flags.view_posts {
//!     // render the category
//! }
//! ```

pub mod category_permissions;
pub mod error;
pub mod membership;
pub mod permission_writer;
pub mod pool;
pub mod proposal_accessibility;
pub mod repository;
pub mod store;
pub mod testing;

pub use category_permissions::{
	compute_post_category_permissions, get_permissioned_categories, PermissionedCategory,
};
pub use error::{AccessServerError, Result};
pub use membership::{resolve_membership, SpaceMembership};
pub use permission_writer::{
	delete_post_category_permission, upsert_post_category_permission, PermissionAssignmentInput,
};
pub use pool::create_pool;
pub use proposal_accessibility::{get_accessible_proposal_ids, ProposalAccessQuery};
pub use repository::SqliteAccessStore;
pub use store::{AccessStore, PostCategory, Role, Space, MODERATE_FORUMS};

// Re-export core types for convenience
pub use agora_access_core::*;
