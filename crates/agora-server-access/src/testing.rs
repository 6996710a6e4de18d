// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::Utc;
use sqlx::sqlite::SqlitePool;
use uuid::Uuid;

use agora_access_core::{
	EvaluationId, EvaluationOperation, EvaluationOutcome, PermissionAssignee, PermissionId,
	PostCategoryId, PostCategoryPermissionLevel, ProposalId, ProposalStatus, ReviewerAssignee,
	RoleId, SpaceId, UserId,
};

pub async fn create_test_pool() -> SqlitePool {
	SqlitePool::connect(":memory:").await.unwrap()
}

pub async fn create_spaces_table(pool: &SqlitePool) {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS spaces (
			id TEXT PRIMARY KEY,
			name TEXT NOT NULL,
			readonly INTEGER NOT NULL DEFAULT 0,
			public_proposals INTEGER NOT NULL DEFAULT 0,
			created_at TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await
	.unwrap();
}

pub async fn create_space_roles_table(pool: &SqlitePool) {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS space_roles (
			user_id TEXT NOT NULL,
			space_id TEXT NOT NULL REFERENCES spaces(id) ON DELETE CASCADE,
			is_admin INTEGER NOT NULL DEFAULT 0,
			is_guest INTEGER NOT NULL DEFAULT 0,
			created_at TEXT NOT NULL,
			PRIMARY KEY (user_id, space_id)
		)
		"#,
	)
	.execute(pool)
	.await
	.unwrap();
}

pub async fn create_roles_table(pool: &SqlitePool) {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS roles (
			id TEXT PRIMARY KEY,
			space_id TEXT NOT NULL REFERENCES spaces(id) ON DELETE CASCADE,
			name TEXT NOT NULL,
			created_at TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await
	.unwrap();
}

pub async fn create_role_memberships_table(pool: &SqlitePool) {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS role_memberships (
			role_id TEXT NOT NULL REFERENCES roles(id) ON DELETE CASCADE,
			user_id TEXT NOT NULL,
			PRIMARY KEY (role_id, user_id)
		)
		"#,
	)
	.execute(pool)
	.await
	.unwrap();
}

pub async fn create_space_permissions_table(pool: &SqlitePool) {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS space_permissions (
			id TEXT PRIMARY KEY,
			space_id TEXT NOT NULL REFERENCES spaces(id) ON DELETE CASCADE,
			role_id TEXT,
			operations TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await
	.unwrap();
}

pub async fn create_post_categories_table(pool: &SqlitePool) {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS post_categories (
			id TEXT PRIMARY KEY,
			space_id TEXT NOT NULL REFERENCES spaces(id) ON DELETE CASCADE,
			name TEXT NOT NULL,
			created_at TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await
	.unwrap();
}

pub async fn create_post_category_permissions_table(pool: &SqlitePool) {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS post_category_permissions (
			id TEXT PRIMARY KEY,
			post_category_id TEXT NOT NULL REFERENCES post_categories(id) ON DELETE CASCADE,
			permission_level TEXT NOT NULL,
			role_id TEXT,
			space_id TEXT,
			public INTEGER
		)
		"#,
	)
	.execute(pool)
	.await
	.unwrap();

	// One row per (category, assignee shape).
	sqlx::query(
		r#"
		CREATE UNIQUE INDEX IF NOT EXISTS idx_category_permission_role
		ON post_category_permissions (post_category_id, role_id)
		WHERE role_id IS NOT NULL
		"#,
	)
	.execute(pool)
	.await
	.unwrap();
	sqlx::query(
		r#"
		CREATE UNIQUE INDEX IF NOT EXISTS idx_category_permission_space
		ON post_category_permissions (post_category_id, space_id)
		WHERE space_id IS NOT NULL
		"#,
	)
	.execute(pool)
	.await
	.unwrap();
	sqlx::query(
		r#"
		CREATE UNIQUE INDEX IF NOT EXISTS idx_category_permission_public
		ON post_category_permissions (post_category_id)
		WHERE public = 1
		"#,
	)
	.execute(pool)
	.await
	.unwrap();
}

pub async fn create_proposals_table(pool: &SqlitePool) {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS proposals (
			id TEXT PRIMARY KEY,
			space_id TEXT NOT NULL REFERENCES spaces(id) ON DELETE CASCADE,
			created_by TEXT NOT NULL,
			status TEXT NOT NULL,
			created_at TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await
	.unwrap();
}

pub async fn create_proposal_evaluations_table(pool: &SqlitePool) {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS proposal_evaluations (
			id TEXT PRIMARY KEY,
			proposal_id TEXT NOT NULL REFERENCES proposals(id) ON DELETE CASCADE,
			idx INTEGER NOT NULL,
			result TEXT
		)
		"#,
	)
	.execute(pool)
	.await
	.unwrap();
}

pub async fn create_evaluation_reviewers_table(pool: &SqlitePool) {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS evaluation_reviewers (
			id TEXT PRIMARY KEY,
			evaluation_id TEXT NOT NULL REFERENCES proposal_evaluations(id) ON DELETE CASCADE,
			assignee_group TEXT NOT NULL,
			user_id TEXT,
			role_id TEXT
		)
		"#,
	)
	.execute(pool)
	.await
	.unwrap();
}

pub async fn create_evaluation_permissions_table(pool: &SqlitePool) {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS evaluation_permissions (
			id TEXT PRIMARY KEY,
			evaluation_id TEXT NOT NULL REFERENCES proposal_evaluations(id) ON DELETE CASCADE,
			assignee_group TEXT NOT NULL,
			user_id TEXT,
			role_id TEXT,
			operation TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await
	.unwrap();
}

pub async fn create_access_test_pool() -> SqlitePool {
	let pool = create_test_pool().await;
	create_spaces_table(&pool).await;
	create_space_roles_table(&pool).await;
	create_roles_table(&pool).await;
	create_role_memberships_table(&pool).await;
	create_space_permissions_table(&pool).await;
	create_post_categories_table(&pool).await;
	create_post_category_permissions_table(&pool).await;
	create_proposals_table(&pool).await;
	create_proposal_evaluations_table(&pool).await;
	create_evaluation_reviewers_table(&pool).await;
	create_evaluation_permissions_table(&pool).await;
	pool
}

// =============================================================================
// Seed helpers
// =============================================================================

pub async fn generate_space(pool: &SqlitePool, readonly: bool) -> SpaceId {
	let id = SpaceId::generate();
	sqlx::query(
		r#"
		INSERT INTO spaces (id, name, readonly, public_proposals, created_at)
		VALUES (?, ?, ?, 0, ?)
		"#,
	)
	.bind(id.to_string())
	.bind(format!("space-{id}"))
	.bind(readonly as i32)
	.bind(Utc::now().to_rfc3339())
	.execute(pool)
	.await
	.unwrap();
	id
}

pub async fn generate_space_user(
	pool: &SqlitePool,
	space_id: &SpaceId,
	is_admin: bool,
	is_guest: bool,
) -> UserId {
	let user_id = UserId::generate();
	sqlx::query(
		r#"
		INSERT INTO space_roles (user_id, space_id, is_admin, is_guest, created_at)
		VALUES (?, ?, ?, ?, ?)
		"#,
	)
	.bind(user_id.to_string())
	.bind(space_id.to_string())
	.bind(is_admin as i32)
	.bind(is_guest as i32)
	.bind(Utc::now().to_rfc3339())
	.execute(pool)
	.await
	.unwrap();
	user_id
}

pub async fn generate_role(pool: &SqlitePool, space_id: &SpaceId, members: &[UserId]) -> RoleId {
	let role_id = RoleId::generate();
	sqlx::query(
		r#"
		INSERT INTO roles (id, space_id, name, created_at)
		VALUES (?, ?, ?, ?)
		"#,
	)
	.bind(role_id.to_string())
	.bind(space_id.to_string())
	.bind(format!("role-{role_id}"))
	.bind(Utc::now().to_rfc3339())
	.execute(pool)
	.await
	.unwrap();

	for user_id in members {
		sqlx::query("INSERT INTO role_memberships (role_id, user_id) VALUES (?, ?)")
			.bind(role_id.to_string())
			.bind(user_id.to_string())
			.execute(pool)
			.await
			.unwrap();
	}
	role_id
}

pub async fn generate_space_permission(
	pool: &SqlitePool,
	space_id: &SpaceId,
	role_id: Option<&RoleId>,
	operations: &[&str],
) {
	sqlx::query(
		r#"
		INSERT INTO space_permissions (id, space_id, role_id, operations)
		VALUES (?, ?, ?, ?)
		"#,
	)
	.bind(Uuid::new_v4().to_string())
	.bind(space_id.to_string())
	.bind(role_id.map(|r| r.to_string()))
	.bind(serde_json::to_string(operations).unwrap())
	.execute(pool)
	.await
	.unwrap();
}

pub async fn generate_post_category(pool: &SqlitePool, space_id: &SpaceId) -> PostCategoryId {
	let id = PostCategoryId::generate();
	sqlx::query(
		r#"
		INSERT INTO post_categories (id, space_id, name, created_at)
		VALUES (?, ?, ?, ?)
		"#,
	)
	.bind(id.to_string())
	.bind(space_id.to_string())
	.bind(format!("category-{id}"))
	.bind(Utc::now().to_rfc3339())
	.execute(pool)
	.await
	.unwrap();
	id
}

/// Insert a category grant directly, bypassing writer validation.
pub async fn generate_category_permission(
	pool: &SqlitePool,
	category_id: &PostCategoryId,
	level: PostCategoryPermissionLevel,
	assignee: &PermissionAssignee,
) -> PermissionId {
	let id = PermissionId::generate();
	let (role_id, space_id, public) = match assignee {
		PermissionAssignee::Role { id } => (Some(id.to_string()), None, None),
		PermissionAssignee::Space { id } => (None, Some(id.to_string()), None),
		PermissionAssignee::Public => (None, None, Some(1)),
		other => panic!("assignee shape {other} is not storable on categories"),
	};
	sqlx::query(
		r#"
		INSERT INTO post_category_permissions (id, post_category_id, permission_level, role_id, space_id, public)
		VALUES (?, ?, ?, ?, ?, ?)
		"#,
	)
	.bind(id.to_string())
	.bind(category_id.to_string())
	.bind(level.to_string())
	.bind(role_id)
	.bind(space_id)
	.bind(public)
	.execute(pool)
	.await
	.unwrap();
	id
}

pub async fn generate_proposal(
	pool: &SqlitePool,
	space_id: &SpaceId,
	created_by: &UserId,
	status: ProposalStatus,
) -> ProposalId {
	let id = ProposalId::generate();
	sqlx::query(
		r#"
		INSERT INTO proposals (id, space_id, created_by, status, created_at)
		VALUES (?, ?, ?, ?, ?)
		"#,
	)
	.bind(id.to_string())
	.bind(space_id.to_string())
	.bind(created_by.to_string())
	.bind(status.to_string())
	.bind(Utc::now().to_rfc3339())
	.execute(pool)
	.await
	.unwrap();
	id
}

pub async fn generate_evaluation(
	pool: &SqlitePool,
	proposal_id: &ProposalId,
	idx: u32,
	result: Option<EvaluationOutcome>,
) -> EvaluationId {
	let id = EvaluationId::generate();
	sqlx::query(
		r#"
		INSERT INTO proposal_evaluations (id, proposal_id, idx, result)
		VALUES (?, ?, ?, ?)
		"#,
	)
	.bind(id.to_string())
	.bind(proposal_id.to_string())
	.bind(idx as i64)
	.bind(result.map(|r| r.to_string()))
	.execute(pool)
	.await
	.unwrap();
	id
}

pub async fn generate_evaluation_reviewer(
	pool: &SqlitePool,
	evaluation_id: &EvaluationId,
	reviewer: &ReviewerAssignee,
) {
	let (group, user_id, role_id) = match reviewer {
		ReviewerAssignee::User { id } => ("user", Some(id.to_string()), None),
		ReviewerAssignee::Role { id } => ("role", None, Some(id.to_string())),
		ReviewerAssignee::SpaceMember => ("space_member", None, None),
	};
	sqlx::query(
		r#"
		INSERT INTO evaluation_reviewers (id, evaluation_id, assignee_group, user_id, role_id)
		VALUES (?, ?, ?, ?, ?)
		"#,
	)
	.bind(Uuid::new_v4().to_string())
	.bind(evaluation_id.to_string())
	.bind(group)
	.bind(user_id)
	.bind(role_id)
	.execute(pool)
	.await
	.unwrap();
}

pub async fn generate_evaluation_permission(
	pool: &SqlitePool,
	evaluation_id: &EvaluationId,
	assignee: &PermissionAssignee,
	operation: EvaluationOperation,
) {
	let (group, user_id, role_id) = match assignee {
		PermissionAssignee::User { id } => ("user", Some(id.to_string()), None),
		PermissionAssignee::Role { id } => ("role", None, Some(id.to_string())),
		PermissionAssignee::SpaceMember => ("space_member", None, None),
		PermissionAssignee::AllReviewers => ("all_reviewers", None, None),
		PermissionAssignee::Public => ("public", None, None),
		other => panic!("assignee shape {other} is not storable on evaluations"),
	};
	sqlx::query(
		r#"
		INSERT INTO evaluation_permissions (id, evaluation_id, assignee_group, user_id, role_id, operation)
		VALUES (?, ?, ?, ?, ?, ?)
		"#,
	)
	.bind(Uuid::new_v4().to_string())
	.bind(evaluation_id.to_string())
	.bind(group)
	.bind(user_id)
	.bind(role_id)
	.bind(operation.to_string())
	.execute(pool)
	.await
	.unwrap();
}
