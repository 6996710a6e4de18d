// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite implementation of the access store.
//!
//! All IDs are UUIDs stored as strings. Assignee shapes map onto nullable
//! columns (`role_id`, `space_id`, `public`); partial unique indexes keep at
//! most one grant per `(category, assignee)` and back the upsert's conflict
//! targets.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use std::collections::HashMap;
use uuid::Uuid;

use agora_access_core::{
	CategoryPermissionGrant, EvaluationAttrs, EvaluationId, EvaluationOperation,
	EvaluationOutcome, EvaluationPermissionGrant, PermissionAssignee, PermissionId,
	PostCategoryId, PostCategoryPermissionLevel, ProposalAttrs, ProposalId, ProposalStatus,
	ReviewerAssignee, RoleId, SpaceId, SpaceRole, UserId,
};

use crate::error::{AccessServerError, Result};
use crate::store::{AccessStore, PostCategory, Role, Space, MODERATE_FORUMS};

/// Repository for access control database operations.
#[derive(Clone)]
pub struct SqliteAccessStore {
	pool: SqlitePool,
}

impl SqliteAccessStore {
	/// Create a new repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	fn row_to_space(&self, row: &SqliteRow) -> Result<Space> {
		Ok(Space {
			id: SpaceId::new(parse_uuid(&row.get::<String, _>("id"), "space id")?),
			name: row.get("name"),
			readonly: row.get::<i64, _>("readonly") != 0,
			public_proposals: row.get::<i64, _>("public_proposals") != 0,
			created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
		})
	}

	fn row_to_post_category(&self, row: &SqliteRow) -> Result<PostCategory> {
		Ok(PostCategory {
			id: PostCategoryId::new(parse_uuid(&row.get::<String, _>("id"), "category id")?),
			space_id: SpaceId::new(parse_uuid(&row.get::<String, _>("space_id"), "space id")?),
			name: row.get("name"),
			created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
		})
	}

	fn row_to_category_permission(&self, row: &SqliteRow) -> Result<CategoryPermissionGrant> {
		let assignee = match (
			row.get::<Option<String>, _>("role_id"),
			row.get::<Option<String>, _>("space_id"),
			row.get::<Option<i64>, _>("public"),
		) {
			(Some(role_id), None, None) => PermissionAssignee::Role {
				id: RoleId::new(parse_uuid(&role_id, "role id")?),
			},
			(None, Some(space_id), None) => PermissionAssignee::Space {
				id: SpaceId::new(parse_uuid(&space_id, "space id")?),
			},
			(None, None, Some(1)) => PermissionAssignee::Public,
			_ => {
				return Err(AccessServerError::Internal(
					"category permission row has no single assignee".to_string(),
				))
			}
		};
		Ok(CategoryPermissionGrant {
			id: PermissionId::new(parse_uuid(&row.get::<String, _>("id"), "permission id")?),
			post_category_id: PostCategoryId::new(parse_uuid(
				&row.get::<String, _>("post_category_id"),
				"category id",
			)?),
			permission_level: parse_permission_level(&row.get::<String, _>("permission_level"))?,
			assignee,
		})
	}

	fn row_to_reviewer(&self, row: &SqliteRow) -> Result<ReviewerAssignee> {
		let group: String = row.get("assignee_group");
		match group.as_str() {
			"user" => {
				let user_id = row
					.get::<Option<String>, _>("user_id")
					.ok_or_else(|| missing_column("user reviewer", "user_id"))?;
				Ok(ReviewerAssignee::User {
					id: UserId::new(parse_uuid(&user_id, "user id")?),
				})
			}
			"role" => {
				let role_id = row
					.get::<Option<String>, _>("role_id")
					.ok_or_else(|| missing_column("role reviewer", "role_id"))?;
				Ok(ReviewerAssignee::Role {
					id: RoleId::new(parse_uuid(&role_id, "role id")?),
				})
			}
			"space_member" => Ok(ReviewerAssignee::SpaceMember),
			other => Err(AccessServerError::Internal(format!(
				"unknown reviewer group: {other}"
			))),
		}
	}

	fn row_to_evaluation_permission(&self, row: &SqliteRow) -> Result<EvaluationPermissionGrant> {
		let group: String = row.get("assignee_group");
		let assignee = match group.as_str() {
			"user" => {
				let user_id = row
					.get::<Option<String>, _>("user_id")
					.ok_or_else(|| missing_column("user grant", "user_id"))?;
				PermissionAssignee::User {
					id: UserId::new(parse_uuid(&user_id, "user id")?),
				}
			}
			"role" => {
				let role_id = row
					.get::<Option<String>, _>("role_id")
					.ok_or_else(|| missing_column("role grant", "role_id"))?;
				PermissionAssignee::Role {
					id: RoleId::new(parse_uuid(&role_id, "role id")?),
				}
			}
			"space_member" => PermissionAssignee::SpaceMember,
			"all_reviewers" => PermissionAssignee::AllReviewers,
			"public" => PermissionAssignee::Public,
			other => {
				return Err(AccessServerError::Internal(format!(
					"unknown evaluation grant group: {other}"
				)))
			}
		};
		Ok(EvaluationPermissionGrant {
			assignee,
			operation: parse_evaluation_operation(&row.get::<String, _>("operation"))?,
		})
	}
}

#[async_trait]
impl AccessStore for SqliteAccessStore {
	#[tracing::instrument(skip(self), fields(space_id = %space_id))]
	async fn get_space(&self, space_id: &SpaceId) -> Result<Option<Space>> {
		let row = sqlx::query(
			r#"
			SELECT id, name, readonly, public_proposals, created_at
			FROM spaces
			WHERE id = ?
			"#,
		)
		.bind(space_id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| self.row_to_space(&r)).transpose()
	}

	#[tracing::instrument(skip(self), fields(space_id = %space_id, user_id = %user_id))]
	async fn get_space_role(
		&self,
		space_id: &SpaceId,
		user_id: &UserId,
	) -> Result<Option<SpaceRole>> {
		let row = sqlx::query(
			r#"
			SELECT user_id, space_id, is_admin, is_guest
			FROM space_roles
			WHERE space_id = ? AND user_id = ?
			"#,
		)
		.bind(space_id.to_string())
		.bind(user_id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| {
			Ok(SpaceRole {
				user_id: UserId::new(parse_uuid(&r.get::<String, _>("user_id"), "user id")?),
				space_id: SpaceId::new(parse_uuid(&r.get::<String, _>("space_id"), "space id")?),
				is_admin: r.get::<i64, _>("is_admin") != 0,
				is_guest: r.get::<i64, _>("is_guest") != 0,
			})
		})
		.transpose()
	}

	#[tracing::instrument(skip(self), fields(space_id = %space_id, user_id = %user_id))]
	async fn list_role_ids_for_user(
		&self,
		space_id: &SpaceId,
		user_id: &UserId,
	) -> Result<Vec<RoleId>> {
		let rows = sqlx::query(
			r#"
			SELECT r.id
			FROM roles r
			JOIN role_memberships rm ON rm.role_id = r.id
			WHERE r.space_id = ? AND rm.user_id = ?
			"#,
		)
		.bind(space_id.to_string())
		.bind(user_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows.iter()
			.map(|r| {
				Ok(RoleId::new(parse_uuid(
					&r.get::<String, _>("id"),
					"role id",
				)?))
			})
			.collect()
	}

	#[tracing::instrument(skip(self, role_ids), fields(space_id = %space_id))]
	async fn has_space_wide_forum_moderator(
		&self,
		space_id: &SpaceId,
		role_ids: &[RoleId],
	) -> Result<bool> {
		let rows = sqlx::query(
			r#"
			SELECT role_id, operations
			FROM space_permissions
			WHERE space_id = ?
			"#,
		)
		.bind(space_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		for row in rows {
			let operations: Vec<String> =
				serde_json::from_str(&row.get::<String, _>("operations"))?;
			if !operations.iter().any(|op| op == MODERATE_FORUMS) {
				continue;
			}
			match row.get::<Option<String>, _>("role_id") {
				None => return Ok(true),
				Some(role_id) => {
					let role_id = RoleId::new(parse_uuid(&role_id, "role id")?);
					if role_ids.contains(&role_id) {
						return Ok(true);
					}
				}
			}
		}
		Ok(false)
	}

	#[tracing::instrument(skip(self), fields(role_id = %role_id))]
	async fn get_role(&self, role_id: &RoleId) -> Result<Option<Role>> {
		let row = sqlx::query(
			r#"
			SELECT id, space_id, name
			FROM roles
			WHERE id = ?
			"#,
		)
		.bind(role_id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| {
			Ok(Role {
				id: RoleId::new(parse_uuid(&r.get::<String, _>("id"), "role id")?),
				space_id: SpaceId::new(parse_uuid(&r.get::<String, _>("space_id"), "space id")?),
				name: r.get("name"),
			})
		})
		.transpose()
	}

	#[tracing::instrument(skip(self), fields(category_id = %category_id))]
	async fn get_post_category(
		&self,
		category_id: &PostCategoryId,
	) -> Result<Option<PostCategory>> {
		let row = sqlx::query(
			r#"
			SELECT id, space_id, name, created_at
			FROM post_categories
			WHERE id = ?
			"#,
		)
		.bind(category_id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| self.row_to_post_category(&r)).transpose()
	}

	#[tracing::instrument(skip(self, category_ids), fields(categories = category_ids.len()))]
	async fn list_category_permissions(
		&self,
		category_ids: &[PostCategoryId],
	) -> Result<Vec<CategoryPermissionGrant>> {
		if category_ids.is_empty() {
			return Ok(Vec::new());
		}

		let placeholders = vec!["?"; category_ids.len()].join(", ");
		let sql = format!(
			"SELECT id, post_category_id, permission_level, role_id, space_id, public \
			 FROM post_category_permissions \
			 WHERE post_category_id IN ({placeholders})"
		);
		let mut query = sqlx::query(&sql);
		for id in category_ids {
			query = query.bind(id.to_string());
		}
		let rows = query.fetch_all(&self.pool).await?;

		rows.iter()
			.map(|r| self.row_to_category_permission(r))
			.collect()
	}

	#[tracing::instrument(skip(self), fields(permission_id = %permission_id))]
	async fn get_category_permission(
		&self,
		permission_id: &PermissionId,
	) -> Result<Option<CategoryPermissionGrant>> {
		let row = sqlx::query(
			r#"
			SELECT id, post_category_id, permission_level, role_id, space_id, public
			FROM post_category_permissions
			WHERE id = ?
			"#,
		)
		.bind(permission_id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| self.row_to_category_permission(&r)).transpose()
	}

	#[tracing::instrument(
		skip(self),
		fields(category_id = %category_id, level = %level, assignee = %assignee)
	)]
	async fn upsert_category_permission(
		&self,
		category_id: &PostCategoryId,
		level: PostCategoryPermissionLevel,
		assignee: &PermissionAssignee,
	) -> Result<CategoryPermissionGrant> {
		let select = r#"
			SELECT id, post_category_id, permission_level, role_id, space_id, public
			FROM post_category_permissions
			"#;

		let row = match assignee {
			PermissionAssignee::Role { id: role_id } => {
				sqlx::query(
					r#"
					INSERT INTO post_category_permissions (id, post_category_id, permission_level, role_id, space_id, public)
					VALUES (?, ?, ?, ?, NULL, NULL)
					ON CONFLICT (post_category_id, role_id) WHERE role_id IS NOT NULL
					DO UPDATE SET permission_level = excluded.permission_level
					"#,
				)
				.bind(PermissionId::generate().to_string())
				.bind(category_id.to_string())
				.bind(level.to_string())
				.bind(role_id.to_string())
				.execute(&self.pool)
				.await?;

				sqlx::query(&format!(
					"{select} WHERE post_category_id = ? AND role_id = ?"
				))
				.bind(category_id.to_string())
				.bind(role_id.to_string())
				.fetch_one(&self.pool)
				.await?
			}
			PermissionAssignee::Space { id: space_id } => {
				sqlx::query(
					r#"
					INSERT INTO post_category_permissions (id, post_category_id, permission_level, role_id, space_id, public)
					VALUES (?, ?, ?, NULL, ?, NULL)
					ON CONFLICT (post_category_id, space_id) WHERE space_id IS NOT NULL
					DO UPDATE SET permission_level = excluded.permission_level
					"#,
				)
				.bind(PermissionId::generate().to_string())
				.bind(category_id.to_string())
				.bind(level.to_string())
				.bind(space_id.to_string())
				.execute(&self.pool)
				.await?;

				sqlx::query(&format!(
					"{select} WHERE post_category_id = ? AND space_id = ?"
				))
				.bind(category_id.to_string())
				.bind(space_id.to_string())
				.fetch_one(&self.pool)
				.await?
			}
			PermissionAssignee::Public => {
				sqlx::query(
					r#"
					INSERT INTO post_category_permissions (id, post_category_id, permission_level, role_id, space_id, public)
					VALUES (?, ?, ?, NULL, NULL, 1)
					ON CONFLICT (post_category_id) WHERE public = 1
					DO UPDATE SET permission_level = excluded.permission_level
					"#,
				)
				.bind(PermissionId::generate().to_string())
				.bind(category_id.to_string())
				.bind(level.to_string())
				.execute(&self.pool)
				.await?;

				sqlx::query(&format!(
					"{select} WHERE post_category_id = ? AND public = 1"
				))
				.bind(category_id.to_string())
				.fetch_one(&self.pool)
				.await?
			}
			other => {
				return Err(AccessServerError::Internal(format!(
					"assignee shape {other} cannot be stored on a category"
				)))
			}
		};

		let grant = self.row_to_category_permission(&row)?;
		tracing::debug!(permission_id = %grant.id, "category permission stored");
		Ok(grant)
	}

	#[tracing::instrument(skip(self), fields(permission_id = %permission_id))]
	async fn delete_category_permission(&self, permission_id: &PermissionId) -> Result<bool> {
		let result = sqlx::query("DELETE FROM post_category_permissions WHERE id = ?")
			.bind(permission_id.to_string())
			.execute(&self.pool)
			.await?;

		Ok(result.rows_affected() > 0)
	}

	#[tracing::instrument(skip(self), fields(space_id = %space_id))]
	async fn list_proposals_in_space(&self, space_id: &SpaceId) -> Result<Vec<ProposalAttrs>> {
		let proposal_rows = sqlx::query(
			r#"
			SELECT id, space_id, created_by, status
			FROM proposals
			WHERE space_id = ?
			ORDER BY created_at
			"#,
		)
		.bind(space_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		let evaluation_rows = sqlx::query(
			r#"
			SELECT e.id, e.proposal_id, e.idx, e.result
			FROM proposal_evaluations e
			JOIN proposals p ON p.id = e.proposal_id
			WHERE p.space_id = ?
			ORDER BY e.idx
			"#,
		)
		.bind(space_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		let reviewer_rows = sqlx::query(
			r#"
			SELECT r.evaluation_id, r.assignee_group, r.user_id, r.role_id
			FROM evaluation_reviewers r
			JOIN proposal_evaluations e ON e.id = r.evaluation_id
			JOIN proposals p ON p.id = e.proposal_id
			WHERE p.space_id = ?
			"#,
		)
		.bind(space_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		let permission_rows = sqlx::query(
			r#"
			SELECT g.evaluation_id, g.assignee_group, g.user_id, g.role_id, g.operation
			FROM evaluation_permissions g
			JOIN proposal_evaluations e ON e.id = g.evaluation_id
			JOIN proposals p ON p.id = e.proposal_id
			WHERE p.space_id = ?
			"#,
		)
		.bind(space_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		let mut reviewers_by_step: HashMap<String, Vec<ReviewerAssignee>> = HashMap::new();
		for row in &reviewer_rows {
			reviewers_by_step
				.entry(row.get("evaluation_id"))
				.or_default()
				.push(self.row_to_reviewer(row)?);
		}

		let mut grants_by_step: HashMap<String, Vec<EvaluationPermissionGrant>> = HashMap::new();
		for row in &permission_rows {
			grants_by_step
				.entry(row.get("evaluation_id"))
				.or_default()
				.push(self.row_to_evaluation_permission(row)?);
		}

		// idx ordering from the query carries through each proposal's vec.
		let mut steps_by_proposal: HashMap<String, Vec<EvaluationAttrs>> = HashMap::new();
		for row in &evaluation_rows {
			let evaluation_id: String = row.get("id");
			let result = row
				.get::<Option<String>, _>("result")
				.map(|r| parse_outcome(&r))
				.transpose()?;
			let step = EvaluationAttrs {
				id: EvaluationId::new(parse_uuid(&evaluation_id, "evaluation id")?),
				index: row.get::<i64, _>("idx") as u32,
				result,
				reviewers: reviewers_by_step.remove(&evaluation_id).unwrap_or_default(),
				permissions: grants_by_step.remove(&evaluation_id).unwrap_or_default(),
			};
			steps_by_proposal
				.entry(row.get("proposal_id"))
				.or_default()
				.push(step);
		}

		proposal_rows
			.iter()
			.map(|row| {
				let proposal_id: String = row.get("id");
				Ok(ProposalAttrs {
					id: ProposalId::new(parse_uuid(&proposal_id, "proposal id")?),
					space_id: SpaceId::new(parse_uuid(
						&row.get::<String, _>("space_id"),
						"space id",
					)?),
					created_by: UserId::new(parse_uuid(
						&row.get::<String, _>("created_by"),
						"user id",
					)?),
					status: parse_proposal_status(&row.get::<String, _>("status"))?,
					evaluations: steps_by_proposal.remove(&proposal_id).unwrap_or_default(),
				})
			})
			.collect()
	}
}

fn parse_uuid(value: &str, what: &str) -> Result<Uuid> {
	Uuid::parse_str(value)
		.map_err(|e| AccessServerError::Internal(format!("invalid {what}: {e}")))
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
	DateTime::parse_from_rfc3339(value)
		.map(|dt| dt.with_timezone(&Utc))
		.map_err(|e| AccessServerError::Internal(format!("invalid timestamp: {e}")))
}

fn parse_permission_level(value: &str) -> Result<PostCategoryPermissionLevel> {
	match value {
		"category_admin" => Ok(PostCategoryPermissionLevel::CategoryAdmin),
		"moderator" => Ok(PostCategoryPermissionLevel::Moderator),
		"full_access" => Ok(PostCategoryPermissionLevel::FullAccess),
		"comment_vote" => Ok(PostCategoryPermissionLevel::CommentVote),
		"view" => Ok(PostCategoryPermissionLevel::View),
		"custom" => Ok(PostCategoryPermissionLevel::Custom),
		other => Err(AccessServerError::Internal(format!(
			"unknown permission level: {other}"
		))),
	}
}

fn parse_proposal_status(value: &str) -> Result<ProposalStatus> {
	match value {
		"draft" => Ok(ProposalStatus::Draft),
		"published" => Ok(ProposalStatus::Published),
		other => Err(AccessServerError::Internal(format!(
			"unknown proposal status: {other}"
		))),
	}
}

fn parse_outcome(value: &str) -> Result<EvaluationOutcome> {
	match value {
		"pass" => Ok(EvaluationOutcome::Pass),
		"fail" => Ok(EvaluationOutcome::Fail),
		other => Err(AccessServerError::Internal(format!(
			"unknown evaluation result: {other}"
		))),
	}
}

fn parse_evaluation_operation(value: &str) -> Result<EvaluationOperation> {
	match value {
		"view" => Ok(EvaluationOperation::View),
		"comment" => Ok(EvaluationOperation::Comment),
		"edit" => Ok(EvaluationOperation::Edit),
		other => Err(AccessServerError::Internal(format!(
			"unknown evaluation operation: {other}"
		))),
	}
}

fn missing_column(what: &str, column: &str) -> AccessServerError {
	AccessServerError::Internal(format!("{what} row is missing {column}"))
}
