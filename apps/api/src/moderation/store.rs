//! Persistence for content records.
//!
//! Commits use an optimistic version check: the UPDATE is conditional on the
//! version the caller read the record at, so two concurrent decisions on the
//! same record cannot both succeed. Callers re-read, re-run the engine
//! against the fresh state, then commit.

use anyhow::anyhow;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::content::{ContentRecord, ContentRecordRow};

/// Inserts a freshly submitted record.
pub async fn insert(pool: &PgPool, record: &ContentRecord) -> Result<(), AppError> {
    let notes = serde_json::to_value(&record.reviewer_notes)
        .map_err(|e| AppError::Internal(anyhow!("failed to encode reviewer notes: {e}")))?;

    sqlx::query(
        r#"
        INSERT INTO content_records
            (id, title, body, author, content_type, status,
             cultural_sensitivity_level, requires_elder_review, elder_approval_status,
             priority, featured, reviewer_notes, version, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        "#,
    )
    .bind(record.id)
    .bind(&record.title)
    .bind(&record.body)
    .bind(&record.author)
    .bind(record.content_type.as_str())
    .bind(record.status.as_str())
    .bind(record.sensitivity.as_str())
    .bind(record.requires_elder_review)
    .bind(record.elder_approval.as_str())
    .bind(record.priority.as_str())
    .bind(record.featured)
    .bind(&notes)
    .bind(record.version)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(pool)
    .await?;

    info!(
        "Inserted content record {} ({}, {})",
        record.id,
        record.content_type.as_str(),
        record.status
    );
    Ok(())
}

/// Fetches one record by id.
pub async fn fetch(pool: &PgPool, id: Uuid) -> Result<ContentRecord, AppError> {
    let row: Option<ContentRecordRow> =
        sqlx::query_as("SELECT * FROM content_records WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

    row.ok_or_else(|| AppError::NotFound(format!("content record {id} not found")))?
        .try_into()
}

/// Returns all records, oldest first. The queue projection filters, sorts,
/// and paginates in-process so its visibility rules live in exactly one place.
pub async fn list_all(pool: &PgPool) -> Result<Vec<ContentRecord>, AppError> {
    let rows: Vec<ContentRecordRow> =
        sqlx::query_as("SELECT * FROM content_records ORDER BY created_at ASC")
            .fetch_all(pool)
            .await?;

    rows.into_iter().map(TryInto::try_into).collect()
}

/// Commits a transitioned record, conditional on the version the caller
/// read it at. Zero rows updated means someone else committed first (or the
/// record vanished); the caller must re-read and resubmit.
pub async fn commit(
    pool: &PgPool,
    record: &ContentRecord,
    expected_version: i32,
) -> Result<ContentRecord, AppError> {
    let notes = serde_json::to_value(&record.reviewer_notes)
        .map_err(|e| AppError::Internal(anyhow!("failed to encode reviewer notes: {e}")))?;

    let result = sqlx::query(
        r#"
        UPDATE content_records
        SET status = $1,
            cultural_sensitivity_level = $2,
            requires_elder_review = $3,
            elder_approval_status = $4,
            priority = $5,
            featured = $6,
            reviewer_notes = $7,
            updated_at = $8,
            version = version + 1
        WHERE id = $9 AND version = $10
        "#,
    )
    .bind(record.status.as_str())
    .bind(record.sensitivity.as_str())
    .bind(record.requires_elder_review)
    .bind(record.elder_approval.as_str())
    .bind(record.priority.as_str())
    .bind(record.featured)
    .bind(&notes)
    .bind(record.updated_at)
    .bind(record.id)
    .bind(expected_version)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::Conflict(format!(
            "content record {} was modified concurrently; re-read and resubmit",
            record.id
        )));
    }

    info!(
        "Committed content record {} at version {} (status: {})",
        record.id,
        expected_version + 1,
        record.status
    );

    let mut committed = record.clone();
    committed.version = expected_version + 1;
    Ok(committed)
}
